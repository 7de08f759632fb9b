//! Interactive timer session.
//!
//! Ticks the cycle controller once per second and reads one-letter commands
//! from stdin. Controller notifications arrive over a channel and are drained
//! after every step, so output always reflects the state after that step.

use std::io::Write;
use std::time::Duration;

use clap::Args;
use saturn_core::timer::TICK_SECS;
use saturn_core::{
    ChannelListener, ChannelSnoozePrompt, Config, CycleController, CycleEvent, Phase,
    SnoozePrompt, SnoozeRequest, SnoozeResponse, StatusLine, TaskList,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

const HELP: &str = "\
commands:
  p        pause / resume
  r        reset the round
  y / n    answer a snooze prompt
  a TEXT   add a task
  d N      mark task N done / not done
  x N      remove task N
  l        list tasks
  c        reload config from disk (resets the round)
  s        print status
  q        quit";

#[derive(Args)]
pub struct RunArgs {
    /// Print controller events as JSON lines instead of a status line
    #[arg(long)]
    json: bool,
    /// Snooze every phase once without asking
    #[arg(long, conflicts_with = "no_snooze")]
    auto_snooze: bool,
    /// Never offer to snooze
    #[arg(long)]
    no_snooze: bool,
    /// Start the first work phase immediately
    #[arg(long)]
    start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Toggle,
    Reset,
    Snooze(bool),
    AddTask(String),
    ToggleTask(usize),
    RemoveTask(usize),
    ListTasks,
    Reload,
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let command = match head {
            "p" | "pause" | "resume" => SessionCommand::Toggle,
            "r" | "reset" => SessionCommand::Reset,
            "y" | "yes" => SessionCommand::Snooze(true),
            "n" | "no" => SessionCommand::Snooze(false),
            "a" | "add" => SessionCommand::AddTask(rest.to_string()),
            "d" | "done" => SessionCommand::ToggleTask(parse_task_number(rest)?),
            "x" | "rm" => SessionCommand::RemoveTask(parse_task_number(rest)?),
            "l" | "list" => SessionCommand::ListTasks,
            "c" | "reload" => SessionCommand::Reload,
            "s" | "status" => SessionCommand::Status,
            "h" | "help" | "?" => SessionCommand::Help,
            "q" | "quit" => SessionCommand::Quit,
            "" => return Err("empty command".into()),
            other => return Err(format!("unknown command '{other}' (h for help)")),
        };
        Ok(command)
    }
}

/// Task numbers are 1-based on screen.
fn parse_task_number(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a task number, got '{arg}'")),
    }
}

/// Accepts the first prompt of each phase and declines the one that follows
/// its snooze, so the round keeps moving.
#[derive(Debug, Default)]
struct AutoSnooze {
    last: Option<SnoozeRequest>,
}

impl SnoozePrompt for AutoSnooze {
    fn prompt(&mut self, request: SnoozeRequest) -> SnoozeResponse {
        if self.last.replace(request) == Some(request) {
            self.last = None;
            SnoozeResponse::Decline
        } else {
            SnoozeResponse::Accept
        }
    }
}

struct Session {
    cycle: CycleController,
    events: UnboundedReceiver<CycleEvent>,
    tasks: TaskList,
    config: Config,
    json: bool,
}

impl Session {
    fn new(config: Config, args: &RunArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let (tx, events) = mpsc::unbounded_channel();
        let mut cycle = CycleController::new(config.cycle_config()?);
        cycle.set_listener(Box::new(ChannelListener::new(tx.clone())));
        if args.auto_snooze {
            cycle.set_snooze_prompt(Box::new(AutoSnooze::default()));
        } else if !args.no_snooze {
            cycle.set_snooze_prompt(Box::new(ChannelSnoozePrompt::new(tx)));
        }
        Ok(Self {
            cycle,
            events,
            tasks: TaskList::new(),
            config,
            json: args.json,
        })
    }

    fn status_line(&self) -> StatusLine {
        StatusLine::new(
            &self.cycle.snapshot(),
            &self.config.display.filled_mark,
            &self.config.display.empty_mark,
        )
    }

    fn redraw(&self) {
        if self.json {
            return;
        }
        let mut line = self.status_line().to_string();
        if self.config.display.show_tasks && !self.tasks.is_empty() {
            line.push_str(&format!("  [{} open]", self.tasks.pending_count()));
        }
        let mut stdout = std::io::stdout().lock();
        // Rewrite the current terminal line in place.
        let _ = write!(stdout, "\r\x1b[K{line}");
        let _ = stdout.flush();
    }

    fn say(&self, message: &str) {
        if self.json {
            let value = serde_json::json!({ "type": "Message", "message": message });
            println!("{value}");
        } else {
            println!("\r\x1b[K{message}");
        }
    }

    /// Print everything the controller emitted since the last drain.
    fn drain_events(&mut self) {
        let mut redraw = false;
        while let Ok(event) = self.events.try_recv() {
            if self.json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::error!("failed to encode event: {e}"),
                }
                continue;
            }
            match event {
                CycleEvent::Tick { .. } => redraw = true,
                CycleEvent::Progress { completed, total, .. } => {
                    debug!(completed, total, "progress");
                    redraw = true;
                }
                CycleEvent::PhaseChanged { from, to, .. } => {
                    info!(from = from.label(), to = to.label(), "phase changed");
                    redraw = true;
                }
                CycleEvent::SnoozeRequested { phase, .. } => {
                    let what = match phase {
                        Phase::Break => "Break is over.",
                        _ => "Time for a break.",
                    };
                    self.say(&format!("{what} Snooze? [y/n]"));
                    redraw = true;
                }
            }
        }
        if redraw {
            self.redraw();
        }
    }

    /// Apply one command. Returns `false` when the session should end.
    fn apply(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Toggle => {
                let changed = match self.cycle.phase() {
                    Phase::Paused => self.cycle.resume(),
                    Phase::Working | Phase::Break => self.cycle.pause(),
                };
                if !changed {
                    let reason = match (self.cycle.pending_snooze(), self.cycle.phase()) {
                        (Some(_), _) => "answer the snooze prompt first (y/n)",
                        (None, Phase::Break) => "breaks run to completion",
                        _ => "nothing to toggle",
                    };
                    self.say(reason);
                }
            }
            SessionCommand::Reset => self.cycle.reset(),
            SessionCommand::Snooze(accept) => {
                let answered = match self.cycle.pending_snooze() {
                    Some(request) if accept => {
                        self.cycle.snooze(request.phase, request.cycles_completed)
                    }
                    Some(_) => self.cycle.decline_snooze(),
                    None => false,
                };
                if !answered {
                    self.say("no snooze prompt is waiting");
                }
            }
            SessionCommand::AddTask(title) => {
                let message = match self.tasks.add(&title).map(|task| task.title.clone()) {
                    Ok(added) => format!("added #{}: {added}", self.tasks.len()),
                    Err(e) => e.to_string(),
                };
                self.say(&message);
            }
            SessionCommand::ToggleTask(index) => match self.tasks.toggle_done(index) {
                Ok(true) => self.say(&format!("#{} done", index + 1)),
                Ok(false) => self.say(&format!("#{} reopened", index + 1)),
                Err(e) => self.say(&e.to_string()),
            },
            SessionCommand::RemoveTask(index) => match self.tasks.remove(index) {
                Ok(task) => self.say(&format!("removed: {}", task.title)),
                Err(e) => self.say(&e.to_string()),
            },
            SessionCommand::ListTasks => {
                if self.tasks.is_empty() {
                    self.say("no tasks");
                }
                let lines: Vec<String> = self
                    .tasks
                    .list()
                    .iter()
                    .enumerate()
                    .map(|(i, task)| format!("{:>3}. {task}", i + 1))
                    .collect();
                for line in lines {
                    self.say(&line);
                }
            }
            SessionCommand::Reload => self.reload(),
            SessionCommand::Status => match serde_json::to_string(&self.cycle.snapshot()) {
                Ok(json) if self.json => println!("{json}"),
                _ => self.say(&self.status_line().to_string()),
            },
            SessionCommand::Help => self.say(HELP),
            SessionCommand::Quit => return false,
        }
        true
    }

    fn reload(&mut self) {
        let loaded = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                self.say(&format!("config not reloaded: {e}"));
                return;
            }
        };
        match loaded.cycle_config() {
            Ok(cycle) => {
                self.cycle.reconfigure(cycle);
                self.config = loaded;
                self.say("config reloaded");
            }
            Err(e) => self.say(&format!("config not reloaded: {e}")),
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(config, args))
}

async fn session(config: Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(config, &args)?;
    info!(config = ?session.cycle.config(), "session started");
    if args.start {
        session.cycle.resume();
    }
    if !session.json {
        session.say("h for help");
    }
    session.drain_events();
    session.redraw();

    let mut interval = tokio::time::interval(Duration::from_secs(TICK_SECS));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately.
    interval.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session.cycle.tick();
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match SessionCommand::parse(&line) {
                        Ok(command) => {
                            if !session.apply(command) {
                                break;
                            }
                        }
                        Err(message) => session.say(&message),
                    },
                    None => {
                        debug!("stdin closed, timer keeps running");
                        stdin_open = false;
                    }
                }
            }
            _ = &mut ctrl_c => {
                break;
            }
        }
        session.drain_events();
    }

    if !session.json {
        println!();
    }
    info!(snapshot = ?session.cycle.snapshot(), "session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_letter_commands() {
        assert_eq!(SessionCommand::parse("p"), Ok(SessionCommand::Toggle));
        assert_eq!(SessionCommand::parse(" r "), Ok(SessionCommand::Reset));
        assert_eq!(SessionCommand::parse("y"), Ok(SessionCommand::Snooze(true)));
        assert_eq!(SessionCommand::parse("no"), Ok(SessionCommand::Snooze(false)));
        assert_eq!(SessionCommand::parse("q"), Ok(SessionCommand::Quit));
    }

    #[test]
    fn parses_task_commands() {
        assert_eq!(
            SessionCommand::parse("a Send a text to Mom"),
            Ok(SessionCommand::AddTask("Send a text to Mom".into()))
        );
        assert_eq!(SessionCommand::parse("d 2"), Ok(SessionCommand::ToggleTask(1)));
        assert_eq!(SessionCommand::parse("x 1"), Ok(SessionCommand::RemoveTask(0)));
        assert!(SessionCommand::parse("d 0").is_err());
        assert!(SessionCommand::parse("x").is_err());
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert!(SessionCommand::parse("").is_err());
        assert!(SessionCommand::parse("zzz").is_err());
    }

    fn session(args: RunArgs) -> Session {
        Session::new(Config::default(), &args).unwrap()
    }

    fn args() -> RunArgs {
        RunArgs {
            json: true,
            auto_snooze: false,
            no_snooze: false,
            start: false,
        }
    }

    #[test]
    fn toggle_resumes_then_pauses() {
        let mut s = session(args());
        assert!(s.apply(SessionCommand::Toggle));
        assert_eq!(s.cycle.phase(), Phase::Working);
        s.apply(SessionCommand::Toggle);
        assert_eq!(s.cycle.phase(), Phase::Paused);
        assert!(!s.apply(SessionCommand::Quit));
    }

    #[test]
    fn yes_snoozes_pending_completion() {
        let mut s = session(args());
        s.apply(SessionCommand::Toggle);
        for _ in 0..1500 {
            s.cycle.tick();
        }
        assert!(s.cycle.pending_snooze().is_some());
        s.apply(SessionCommand::Snooze(true));
        assert_eq!(s.cycle.phase(), Phase::Working);
        assert_eq!(s.cycle.time_left(), 300);
    }

    #[test]
    fn auto_snooze_snoozes_each_phase_once() {
        let mut s = session(RunArgs {
            auto_snooze: true,
            ..args()
        });
        s.apply(SessionCommand::Toggle);
        for _ in 0..1500 {
            s.cycle.tick();
        }
        assert!(s.cycle.pending_snooze().is_none());
        assert_eq!(s.cycle.phase(), Phase::Working);
        assert_eq!(s.cycle.time_left(), 300);
        assert_eq!(s.cycle.cycles_completed(), 0);

        // The snooze runs out and the round moves on.
        for _ in 0..300 {
            s.cycle.tick();
        }
        assert_eq!(s.cycle.phase(), Phase::Break);
        assert_eq!(s.cycle.cycles_completed(), 1);

        // Short break, its snooze, then back to work.
        for _ in 0..600 {
            s.cycle.tick();
        }
        assert_eq!(s.cycle.phase(), Phase::Working);
        assert_eq!(s.cycle.cycles_completed(), 1);
        assert_eq!(s.cycle.time_left(), 1500);
    }

    #[test]
    fn auto_snooze_declines_repeat_request() {
        let mut prompt = AutoSnooze::default();
        let work = SnoozeRequest {
            phase: Phase::Working,
            cycles_completed: 2,
        };
        let rest = SnoozeRequest {
            phase: Phase::Break,
            cycles_completed: 3,
        };
        assert_eq!(prompt.prompt(work), SnoozeResponse::Accept);
        assert_eq!(prompt.prompt(work), SnoozeResponse::Decline);
        assert_eq!(prompt.prompt(rest), SnoozeResponse::Accept);
        assert_eq!(prompt.prompt(rest), SnoozeResponse::Decline);
        assert_eq!(prompt.prompt(rest), SnoozeResponse::Accept);
    }

    #[test]
    fn no_snooze_advances_straight_to_break() {
        let mut s = session(RunArgs {
            no_snooze: true,
            ..args()
        });
        s.apply(SessionCommand::Toggle);
        for _ in 0..1500 {
            s.cycle.tick();
        }
        assert_eq!(s.cycle.phase(), Phase::Break);
        assert_eq!(s.cycle.cycles_completed(), 1);
    }

    #[test]
    fn task_commands_edit_list() {
        let mut s = session(args());
        s.apply(SessionCommand::AddTask("Stretch".into()));
        s.apply(SessionCommand::AddTask("Walk".into()));
        s.apply(SessionCommand::ToggleTask(0));
        assert!(s.tasks.list()[0].done);
        s.apply(SessionCommand::RemoveTask(1));
        assert_eq!(s.tasks.len(), 1);
        s.apply(SessionCommand::RemoveTask(5));
        assert_eq!(s.tasks.len(), 1);
    }
}
