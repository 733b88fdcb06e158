//! Game lifecycle events
//!
//! The session moves through five broadcast events. There is no central state
//! machine: every component subscribes to the events it cares about and
//! derives its own behaviour. [`PhaseTracker`] is a passive observer that
//! records the phase those events imply.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{info, warn};

use crate::event_bus::{ChannelId, EventBus, ListenerId, Outbox};

/// One of the five lifecycle broadcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    GameStart,
    GameReset,
    GameOver,
    PlayerDied,
    TutorialEnd,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 5] = [
        LifecycleEvent::GameStart,
        LifecycleEvent::GameReset,
        LifecycleEvent::GameOver,
        LifecycleEvent::PlayerDied,
        LifecycleEvent::TutorialEnd,
    ];

    /// Bus channel name for this event
    pub fn channel_name(self) -> &'static str {
        match self {
            LifecycleEvent::GameStart => "game_start",
            LifecycleEvent::GameReset => "game_reset",
            LifecycleEvent::GameOver => "game_over",
            LifecycleEvent::PlayerDied => "player_died",
            LifecycleEvent::TutorialEnd => "tutorial_end",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel_name())
    }
}

/// The bus channels of the five lifecycle events
#[derive(Debug, Clone, Copy)]
pub struct LifecycleChannels {
    pub game_start: ChannelId,
    pub game_reset: ChannelId,
    pub game_over: ChannelId,
    pub player_died: ChannelId,
    pub tutorial_end: ChannelId,
}

impl LifecycleChannels {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            game_start: bus.channel(LifecycleEvent::GameStart.channel_name()),
            game_reset: bus.channel(LifecycleEvent::GameReset.channel_name()),
            game_over: bus.channel(LifecycleEvent::GameOver.channel_name()),
            player_died: bus.channel(LifecycleEvent::PlayerDied.channel_name()),
            tutorial_end: bus.channel(LifecycleEvent::TutorialEnd.channel_name()),
        }
    }

    pub fn get(&self, event: LifecycleEvent) -> ChannelId {
        match event {
            LifecycleEvent::GameStart => self.game_start,
            LifecycleEvent::GameReset => self.game_reset,
            LifecycleEvent::GameOver => self.game_over,
            LifecycleEvent::PlayerDied => self.player_died,
            LifecycleEvent::TutorialEnd => self.tutorial_end,
        }
    }
}

/// A component that reacts to lifecycle events.
///
/// Every method defaults to doing nothing. Raises pushed into the outbox are
/// delivered once the component is no longer borrowed.
pub trait GameStateResponder {
    fn on_game_start(&mut self, _out: &mut Outbox) {}
    fn on_game_reset(&mut self, _out: &mut Outbox) {}
    fn on_game_over(&mut self, _out: &mut Outbox) {}
    fn on_player_died(&mut self, _out: &mut Outbox) {}
    fn on_tutorial_end(&mut self, _out: &mut Outbox) {}

    /// Route an event to the matching method
    fn dispatch(&mut self, event: LifecycleEvent, out: &mut Outbox) {
        match event {
            LifecycleEvent::GameStart => self.on_game_start(out),
            LifecycleEvent::GameReset => self.on_game_reset(out),
            LifecycleEvent::GameOver => self.on_game_over(out),
            LifecycleEvent::PlayerDied => self.on_player_died(out),
            LifecycleEvent::TutorialEnd => self.on_tutorial_end(out),
        }
    }
}

/// Listeners registered by [`subscribe_responder`]
#[derive(Debug)]
#[must_use = "dropping a Subscription leaves the responder registered"]
pub struct Subscription {
    listeners: Vec<(ChannelId, ListenerId)>,
}

impl Subscription {
    /// Unregister every listener of this subscription
    pub fn cancel(self, bus: &EventBus) {
        for (channel, listener) in self.listeners {
            bus.unregister(channel, listener);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Register `responder` on all five lifecycle channels
pub fn subscribe_responder<R>(
    bus: &EventBus,
    channels: &LifecycleChannels,
    responder: Rc<RefCell<R>>,
) -> Subscription
where
    R: GameStateResponder + 'static,
{
    let listeners = LifecycleEvent::ALL
        .iter()
        .map(|&event| {
            let channel = channels.get(event);
            let target = Rc::clone(&responder);
            let id = bus.register(channel, move |bus| {
                let mut outbox = Outbox::new();
                target.borrow_mut().dispatch(event, &mut outbox);
                outbox.flush(bus);
            });
            (channel, id)
        })
        .collect();
    Subscription { listeners }
}

/// Session phase implied by the lifecycle events seen so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    Reset,
    Tutorial,
    Playing,
    Died,
    GameOver,
}

impl LifecyclePhase {
    /// Phase an event leads to
    pub fn entered_by(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::GameStart => LifecyclePhase::Tutorial,
            LifecycleEvent::TutorialEnd => LifecyclePhase::Playing,
            LifecycleEvent::PlayerDied => LifecyclePhase::Died,
            LifecycleEvent::GameOver => LifecyclePhase::GameOver,
            LifecycleEvent::GameReset => LifecyclePhase::Reset,
        }
    }

    /// Whether `event` is a normal transition out of this phase.
    /// A reset is accepted from anywhere.
    pub fn accepts(self, event: LifecycleEvent) -> bool {
        matches!(
            (self, event),
            (_, LifecycleEvent::GameReset)
                | (LifecyclePhase::Reset, LifecycleEvent::GameStart)
                | (LifecyclePhase::Tutorial, LifecycleEvent::TutorialEnd)
                | (LifecyclePhase::Tutorial, LifecycleEvent::PlayerDied)
                | (LifecyclePhase::Playing, LifecycleEvent::PlayerDied)
                | (LifecyclePhase::Died, LifecycleEvent::GameOver)
        )
    }
}

/// Records the current phase and every event seen
#[derive(Debug, Default)]
pub struct PhaseTracker {
    phase: LifecyclePhase,
    history: Vec<LifecycleEvent>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn history(&self) -> &[LifecycleEvent] {
        &self.history
    }

    fn observe(&mut self, event: LifecycleEvent) {
        if !self.phase.accepts(event) {
            warn!(phase = ?self.phase, %event, "unexpected lifecycle event");
        }
        let next = LifecyclePhase::entered_by(event);
        info!(from = ?self.phase, to = ?next, "lifecycle transition");
        self.phase = next;
        self.history.push(event);
    }
}

impl GameStateResponder for PhaseTracker {
    fn dispatch(&mut self, event: LifecycleEvent, _out: &mut Outbox) {
        self.observe(event);
    }
}
