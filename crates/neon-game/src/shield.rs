//! Player shield
//!
//! While the shield is active the player takes no damage. Activating it
//! again restarts the countdown. Shortly before it drops the shield raises
//! `shield_deactivated` and blinks so the player can see it ending.

use std::rc::Rc;

use neon_runtime::{
    BoolVariable, ChannelId, EventBus, FloatVariable, Outbox, Routine, Scheduler, Step, TaskGroup,
};
use tracing::debug;

use crate::channels::GameChannels;
use crate::config::ShieldConfig;
use crate::state::SharedState;

pub struct Shield {
    active: BoolVariable,
    alpha: FloatVariable,
    deactivation_time: FloatVariable,
    num_blinks: u32,
    channels: GameChannels,
    tasks: TaskGroup,
}

impl Shield {
    pub fn new(
        config: &ShieldConfig,
        state: &SharedState,
        channels: GameChannels,
        scheduler: Rc<Scheduler>,
    ) -> Self {
        Self {
            active: state.shield_active.clone(),
            alpha: state.shield_alpha.clone(),
            deactivation_time: state.shield_deactivation_time.clone(),
            num_blinks: config.num_blinks.max(1),
            channels,
            tasks: TaskGroup::new(scheduler, "shield"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Make the owner invulnerable for `secs` seconds
    pub fn activate(&mut self, secs: f32, out: &mut Outbox) {
        debug!(secs, "shield activated");
        self.active.set(true);
        self.alpha.set(1.0);
        out.raise(self.channels.shield_activated);

        let deactivation_time = self.deactivation_time.get().max(0.0);
        self.tasks.restart(ShieldCountdown {
            phase: Phase::Start,
            hold: secs - deactivation_time,
            blink_half: deactivation_time / (2.0 * self.num_blinks as f32),
            num_blinks: self.num_blinks,
            active: self.active.clone(),
            alpha: self.alpha.clone(),
            deactivated: self.channels.shield_deactivated,
        });
    }

    /// Drop the shield immediately without raising anything
    pub fn reset(&mut self) {
        self.tasks.stop_all();
        self.active.set(false);
        self.alpha.set(0.0);
    }
}

enum Phase {
    Start,
    Holding,
    Blink { left: u32, shown: bool },
}

struct ShieldCountdown {
    phase: Phase,
    hold: f32,
    blink_half: f32,
    num_blinks: u32,
    active: BoolVariable,
    alpha: FloatVariable,
    deactivated: ChannelId,
}

impl Routine for ShieldCountdown {
    fn resume(&mut self, bus: &EventBus) -> Step {
        loop {
            match self.phase {
                Phase::Start => {
                    self.phase = Phase::Holding;
                    return Step::Wait(self.hold);
                }
                Phase::Holding => {
                    bus.raise(self.deactivated);
                    self.phase = Phase::Blink {
                        left: self.num_blinks,
                        shown: false,
                    };
                }
                Phase::Blink { left, shown: false } => {
                    self.alpha.set(1.0);
                    self.phase = Phase::Blink { left, shown: true };
                    return Step::Wait(self.blink_half);
                }
                Phase::Blink { left, shown: true } => {
                    self.alpha.set(0.0);
                    if left <= 1 {
                        self.active.set(false);
                        return Step::Done;
                    }
                    self.phase = Phase::Blink {
                        left: left - 1,
                        shown: false,
                    };
                    return Step::Wait(self.blink_half);
                }
            }
        }
    }
}
