//! Integration tests for the cycle controller driven through its public API.

use saturn_core::{
    ChannelListener, ChannelSnoozePrompt, Config, CycleConfig, CycleController, CycleEvent,
    Phase, StatusLine, Tick,
};
use tokio::sync::mpsc;

fn tick_n(cycle: &mut CycleController, n: u64) -> usize {
    (0..n).filter(|_| cycle.tick().is_completed()).count()
}

#[test]
fn test_default_round_end_to_end() {
    let config = CycleConfig::new(4, 1500, 300, 600, 300).unwrap();
    let mut cycle = CycleController::new(config);
    cycle.reset();

    assert!(cycle.resume());
    assert_eq!(cycle.phase(), Phase::Working);
    assert_eq!(cycle.time_left(), 1500);

    assert_eq!(tick_n(&mut cycle, 1500), 1);
    assert_eq!(cycle.cycles_completed(), 1);
    assert_eq!(cycle.phase(), Phase::Break);
    assert_eq!(cycle.time_left(), 300);

    // Rest of the round: three short breaks in total, then the long one.
    tick_n(&mut cycle, 300);
    for _ in 0..2 {
        tick_n(&mut cycle, 1500);
        tick_n(&mut cycle, 300);
    }
    tick_n(&mut cycle, 1500);
    assert_eq!(cycle.cycles_completed(), 4);
    assert_eq!(cycle.time_left(), 600);

    tick_n(&mut cycle, 600);
    assert_eq!(cycle.cycles_completed(), 0);
    assert_eq!(cycle.phase(), Phase::Working);
    assert_eq!(cycle.time_left(), 1500);
}

#[test]
fn test_round_length_matches_config() {
    let config = CycleConfig::new(3, 5, 2, 4, 1).unwrap();
    let mut cycle = CycleController::new(config);
    cycle.resume();

    let completions = tick_n(&mut cycle, config.round_secs());
    assert_eq!(completions, 6);
    assert_eq!(cycle.phase(), Phase::Working);
    assert_eq!(cycle.cycles_completed(), 0);
}

#[test]
fn test_channel_host_answers_snooze_later() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut cycle = CycleController::new(CycleConfig::new(2, 3, 1, 2, 4).unwrap());
    cycle.set_listener(Box::new(ChannelListener::new(tx.clone())));
    cycle.set_snooze_prompt(Box::new(ChannelSnoozePrompt::new(tx)));

    cycle.resume();
    assert_eq!(tick_n(&mut cycle, 3), 1);

    let mut request = None;
    while let Ok(event) = rx.try_recv() {
        if let CycleEvent::SnoozeRequested {
            phase,
            cycles_completed,
            ..
        } = event
        {
            request = Some((phase, cycles_completed));
        }
    }
    let (phase, cycles_completed) = request.expect("snooze should have been requested");
    assert_eq!((phase, cycles_completed), (Phase::Working, 0));

    // Nothing moves while the host thinks about it.
    assert_eq!(cycle.tick(), Tick::Idle);
    assert_eq!(cycle.cycles_completed(), 0);

    assert!(cycle.snooze(phase, cycles_completed));
    assert_eq!(cycle.time_left(), 4);
    assert_eq!(cycle.phase(), Phase::Working);

    // After the snooze the prompt fires again; this time the host declines.
    assert_eq!(tick_n(&mut cycle, 4), 1);
    assert!(cycle.decline_snooze());
    assert_eq!(cycle.phase(), Phase::Break);
    assert_eq!(cycle.cycles_completed(), 1);

    let progress: Vec<(u32, u32)> = std::iter::from_fn(|| rx.try_recv().ok())
        .filter_map(|event| match event {
            CycleEvent::Progress { completed, total, .. } => Some((completed, total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(0, 2), (1, 2)]);
}

#[test]
fn test_config_drives_controller_and_status_line() {
    let mut config = Config::default();
    config.set("timer.cycles", "2").unwrap();
    config.set("timer.work_minutes", "1").unwrap();

    let mut cycle = CycleController::new(config.cycle_config().unwrap());
    cycle.resume();
    tick_n(&mut cycle, 60);

    let line = StatusLine::new(
        &cycle.snapshot(),
        &config.display.filled_mark,
        &config.display.empty_mark,
    );
    assert_eq!(line.to_string(), "⏸ 05:00 ●○ Break");
}
