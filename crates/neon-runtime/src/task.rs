//! Cooperative timed routines
//!
//! A [`Routine`] is resumed by the [`Scheduler`] and answers with the
//! [`Step`] it wants next: sleep for some seconds, yield for one frame, or
//! finish. Every routine carries a [`CancelToken`]; cancelled routines are
//! dropped the next time the scheduler reaches them and are never resumed
//! again. Owners keep their routines in a [`TaskGroup`] so starting a new
//! sequence can cancel every older one first.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

use crate::event_bus::EventBus;

/// What a routine wants after a resume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Resume again after this many seconds of game time
    Wait(f32),
    /// Resume on the next tick
    NextFrame,
    /// The routine is finished
    Done,
}

/// A suspendable sequence of game logic
pub trait Routine {
    fn resume(&mut self, bus: &EventBus) -> Step;
}

/// Lifecycle of a scheduled routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Cancelled,
    Finished,
}

/// Shared cancellation flag for one scheduled routine
#[derive(Debug, Clone)]
pub struct CancelToken(Rc<Cell<TaskState>>);

impl CancelToken {
    fn new() -> Self {
        Self(Rc::new(Cell::new(TaskState::Running)))
    }

    /// Cancel the routine. Finished routines stay finished.
    pub fn cancel(&self) {
        if self.0.get() == TaskState::Running {
            self.0.set(TaskState::Cancelled);
        }
    }

    pub fn state(&self) -> TaskState {
        self.0.get()
    }

    pub fn is_running(&self) -> bool {
        self.0.get() == TaskState::Running
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get() == TaskState::Cancelled
    }

    fn finish(&self) {
        self.0.set(TaskState::Finished);
    }
}

struct Task {
    label: &'static str,
    token: CancelToken,
    routine: Box<dyn Routine>,
    /// Seconds until the next resume; carries overshoot from the last tick
    remaining: f32,
}

/// Resumes routines against game time
pub struct Scheduler {
    tasks: RefCell<Vec<Task>>,
    /// Routines started since the last tick began
    pending: RefCell<Vec<Task>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Schedule a routine. It is first resumed by the next call to [`tick`].
    ///
    /// [`tick`]: Scheduler::tick
    pub fn start(&self, label: &'static str, routine: impl Routine + 'static) -> CancelToken {
        let token = CancelToken::new();
        trace!(label, "routine started");
        self.pending.borrow_mut().push(Task {
            label,
            token: token.clone(),
            routine: Box::new(routine),
            remaining: 0.0,
        });
        token
    }

    /// Advance every live routine by `dt` seconds
    pub fn tick(&self, dt: f32, bus: &EventBus) {
        let mut tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        tasks.append(&mut self.pending.borrow_mut());

        tasks.retain_mut(|task| Self::advance(task, dt, bus));

        // Anything started during this tick is already queued in `pending`.
        let mut slot = self.tasks.borrow_mut();
        tasks.append(&mut slot);
        *slot = tasks;
    }

    fn advance(task: &mut Task, dt: f32, bus: &EventBus) -> bool {
        if !task.token.is_running() {
            trace!(label = task.label, "routine dropped");
            return false;
        }
        task.remaining -= dt;
        while task.remaining <= 0.0 {
            match task.routine.resume(bus) {
                Step::Wait(secs) if secs > 0.0 => task.remaining += secs,
                Step::Wait(_) | Step::NextFrame => {
                    task.remaining = 0.0;
                    break;
                }
                Step::Done => {
                    task.token.finish();
                    trace!(label = task.label, "routine finished");
                    return false;
                }
            }
            if !task.token.is_running() {
                return false;
            }
        }
        task.token.is_running()
    }

    /// Number of routines that are scheduled and not cancelled
    pub fn active_count(&self) -> usize {
        let live = |tasks: &Vec<Task>| tasks.iter().filter(|t| t.token.is_running()).count();
        live(&self.tasks.borrow()) + live(&self.pending.borrow())
    }

    /// Cancel and drop every routine
    pub fn clear(&self) {
        for task in self
            .tasks
            .borrow_mut()
            .drain(..)
            .chain(self.pending.borrow_mut().drain(..))
        {
            task.token.cancel();
        }
    }
}

/// The routines started by one owner.
///
/// [`restart`](TaskGroup::restart) is the "stop all, then start new" protocol.
pub struct TaskGroup {
    scheduler: Rc<Scheduler>,
    label: &'static str,
    tokens: Vec<CancelToken>,
}

impl TaskGroup {
    pub fn new(scheduler: Rc<Scheduler>, label: &'static str) -> Self {
        Self {
            scheduler,
            label,
            tokens: Vec::new(),
        }
    }

    pub fn start(&mut self, routine: impl Routine + 'static) -> CancelToken {
        self.tokens.retain(CancelToken::is_running);
        let token = self.scheduler.start(self.label, routine);
        self.tokens.push(token.clone());
        token
    }

    /// Cancel every routine this group started
    pub fn stop_all(&mut self) {
        for token in self.tokens.drain(..) {
            token.cancel();
        }
    }

    /// Cancel every routine of this group, then start `routine`
    pub fn restart(&mut self, routine: impl Routine + 'static) -> CancelToken {
        self.stop_all();
        self.start(routine)
    }

    pub fn is_running(&self) -> bool {
        self.tokens.iter().any(CancelToken::is_running)
    }
}

enum SeqStep {
    Wait(f32),
    Run(Box<dyn FnOnce(&EventBus)>),
}

/// A linear routine built from waits and one-shot actions
#[derive(Default)]
pub struct Sequence {
    steps: VecDeque<SeqStep>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(mut self, secs: f32) -> Self {
        self.steps.push_back(SeqStep::Wait(secs));
        self
    }

    pub fn then(mut self, action: impl FnOnce(&EventBus) + 'static) -> Self {
        self.steps.push_back(SeqStep::Run(Box::new(action)));
        self
    }
}

impl Routine for Sequence {
    fn resume(&mut self, bus: &EventBus) -> Step {
        while let Some(step) = self.steps.pop_front() {
            match step {
                SeqStep::Wait(secs) => return Step::Wait(secs),
                SeqStep::Run(action) => action(bus),
            }
        }
        Step::Done
    }
}
