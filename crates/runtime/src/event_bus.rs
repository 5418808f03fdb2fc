/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

type Subscriber<E> = Box<dyn FnMut(&E)>;

/// Single-threaded publish/subscribe bus.
///
/// `emit` notifies every subscriber synchronously, in subscription order, and
/// also appends the event to a pending queue that a dispatcher can `drain`.
pub struct EventBus<E> {
    pending: Vec<E>,
    subscribers: Vec<(SubscriptionId, Subscriber<E>)>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `true` if a subscriber was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn emit(&mut self, event: E) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
        self.pending.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.pending)
    }
}
