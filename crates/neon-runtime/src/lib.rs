//! Neon Runtime - Game loop infrastructure
//!
//! Provides the building blocks the gameplay crate is wired from:
//! - `EventBus` — named broadcast channels with re-entrancy-safe raising
//! - `Variable` — shared typed cells read and written by many components
//! - `CommandStream` — FIFO of player commands decoupling input from the player
//! - `InputState` — edge-triggered action bindings
//! - `Scheduler` / `TaskGroup` — cooperative timed routines with cancellation
//! - `GameClock` — fixed-timestep accumulator with pause support
//! - `LifecycleEvent` / `GameStateResponder` — the five-event game lifecycle
//! - `SettingsStore` — persisted float settings (volume levels)

mod clock;
mod command;
mod event_bus;
mod input;
mod lifecycle;
mod settings;
mod task;
mod variable;

pub use clock::GameClock;
pub use command::{Command, CommandStream, CommandTarget};
pub use event_bus::{listen, ChannelId, EventBus, ListenerId, Outbox};
pub use input::{InputConfig, InputState, ACTION_ASCEND, ACTION_PAUSE, ACTION_RESTART};
pub use lifecycle::{
    subscribe_responder, GameStateResponder, LifecycleChannels, LifecycleEvent, LifecyclePhase,
    PhaseTracker, Subscription,
};
pub use settings::{
    mixer_attenuation_db, SettingsStore, DEFAULT_MUSIC_VOLUME, DEFAULT_SFX_VOLUME, MUSIC_VOLUME_KEY,
    SFX_VOLUME_KEY,
};
pub use task::{CancelToken, Routine, Scheduler, Sequence, Step, TaskGroup, TaskState};
pub use variable::{
    BoolVariable, ColorVariable, FloatVariable, IntVariable, StringVariable, Variable,
    Vec2Variable,
};
