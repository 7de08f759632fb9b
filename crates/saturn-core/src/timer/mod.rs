mod countdown;
mod engine;
mod listener;
mod schedule;

pub use countdown::{format_clock, RunState, Tick, Timer, TICK_SECS};
pub use engine::{CycleController, CycleSnapshot};
pub use listener::{
    ChannelListener, ChannelSnoozePrompt, CycleListener, SnoozePrompt, SnoozeRequest,
    SnoozeResponse, TickSnapshot,
};
pub use schedule::{CycleConfig, Phase, MAX_CYCLES_LIMIT};
