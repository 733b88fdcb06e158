//! Event bus for broadcasting game events
//!
//! Channels are interned by name and carry no payload. Raising a channel
//! synchronously calls every listener registered on it at the moment of the
//! raise, newest first. Listeners receive the bus itself so they may raise
//! other channels or unregister listeners while a raise is in flight.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

/// Handle to a named broadcast channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(usize);

/// Handle returned by [`EventBus::register`], used to unregister later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Rc<dyn Fn(&EventBus)>;

struct Listener {
    id: ListenerId,
    callback: Callback,
}

/// Named broadcast channels with synchronous fan-out
pub struct EventBus {
    names: RefCell<Vec<String>>,
    listeners: RefCell<HashMap<ChannelId, Vec<Listener>>>,
    next_listener: Cell<u64>,
    depth: Cell<u32>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            names: RefCell::new(Vec::new()),
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(1),
            depth: Cell::new(0),
        }
    }

    /// Get the channel with the given name, creating it on first use
    pub fn channel(&self, name: &str) -> ChannelId {
        let mut names = self.names.borrow_mut();
        if let Some(idx) = names.iter().position(|n| n == name) {
            return ChannelId(idx);
        }
        names.push(name.to_string());
        ChannelId(names.len() - 1)
    }

    /// Look up a channel without creating it
    pub fn find_channel(&self, name: &str) -> Option<ChannelId> {
        self.names
            .borrow()
            .iter()
            .position(|n| n == name)
            .map(ChannelId)
    }

    /// Name a channel was created with
    pub fn channel_name(&self, channel: ChannelId) -> Option<String> {
        self.names.borrow().get(channel.0).cloned()
    }

    /// Append a listener. Registering the same closure twice yields two
    /// independent listeners.
    pub fn register<F>(&self, channel: ChannelId, callback: F) -> ListenerId
    where
        F: Fn(&EventBus) + 'static,
    {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(Listener {
                id,
                callback: Rc::new(callback),
            });
        id
    }

    /// Remove a listener if present. Unknown ids are ignored.
    pub fn unregister(&self, channel: ChannelId, listener: ListenerId) {
        if let Some(list) = self.listeners.borrow_mut().get_mut(&channel) {
            list.retain(|l| l.id != listener);
        }
    }

    /// Whether `listener` is currently registered on `channel`
    pub fn is_registered(&self, channel: ChannelId, listener: ListenerId) -> bool {
        self.listeners
            .borrow()
            .get(&channel)
            .map(|list| list.iter().any(|l| l.id == listener))
            .unwrap_or(false)
    }

    /// Number of listeners currently registered on a channel
    pub fn listener_count(&self, channel: ChannelId) -> usize {
        self.listeners
            .borrow()
            .get(&channel)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Notify every listener registered on `channel`.
    ///
    /// Iterates a snapshot in reverse registration order. Each entry is
    /// re-checked before it is called, so a listener removed by an earlier
    /// callback in the same raise is not called. Listeners added during the
    /// raise are first called by the next raise.
    pub fn raise(&self, channel: ChannelId) {
        let snapshot: Vec<(ListenerId, Callback)> = match self.listeners.borrow().get(&channel) {
            Some(list) => list.iter().map(|l| (l.id, l.callback.clone())).collect(),
            None => Vec::new(),
        };

        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        if depth > 1 {
            trace!(channel = channel.0, depth, "nested raise");
        }
        debug!(
            channel = %self.channel_name(channel).unwrap_or_default(),
            listeners = snapshot.len(),
            "raise"
        );

        for (id, callback) in snapshot.into_iter().rev() {
            if self.is_registered(channel, id) {
                callback(self);
            }
        }

        self.depth.set(depth - 1);
    }
}

/// Channels queued by a listener while it holds a borrow of its component.
///
/// [`listen`] and lifecycle subscriptions flush the outbox after the borrow
/// is released, so a component can trigger channels that loop back to itself.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<ChannelId>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raise
    pub fn raise(&mut self, channel: ChannelId) {
        self.pending.push(channel);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Raise every queued channel in queue order
    pub fn flush(self, bus: &EventBus) {
        for channel in self.pending {
            bus.raise(channel);
        }
    }
}

/// Register a component method as a listener on `channel`.
///
/// The component is borrowed mutably for the duration of `handler`; anything
/// the handler pushes into the [`Outbox`] is raised afterwards.
pub fn listen<T: 'static>(
    bus: &EventBus,
    channel: ChannelId,
    target: Rc<RefCell<T>>,
    handler: fn(&mut T, &mut Outbox),
) -> ListenerId {
    bus.register(channel, move |bus| {
        let mut outbox = Outbox::new();
        handler(&mut *target.borrow_mut(), &mut outbox);
        outbox.flush(bus);
    })
}
