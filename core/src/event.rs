use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifies one registration on an [`EventBus`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(T)>>;

struct Registry<T> {
    next_id: u64,
    handlers: Vec<(SubscriberId, Handler<T>)>,
}

impl<T> Registry<T> {
    fn contains(&self, id: SubscriberId) -> bool {
        self.handlers.iter().any(|(handler_id, _)| *handler_id == id)
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, id: SubscriberId) -> bool;
    fn is_subscribed(&self, id: SubscriberId) -> bool;
}

impl<T> Unsubscribe for RefCell<Registry<T>> {
    fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut registry = self.borrow_mut();
        let before = registry.handlers.len();
        registry.handlers.retain(|(handler_id, _)| *handler_id != id);
        registry.handlers.len() != before
    }

    fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.borrow().contains(id)
    }
}

/// Ordered, synchronous, single-threaded publish/subscribe channel.
///
/// Handlers run in registration order, each at most once per emission. The
/// handler list is snapshotted when an emission starts: handlers added during
/// it are not called, handlers removed during it are skipped.
pub struct EventBus<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: Clone + 'static> EventBus<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Registers `handler`; it stays registered until the returned
    /// [`Subscription`] is dropped or detached.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, handler: impl FnMut(T) + 'static) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriberId(registry.next_id);
        registry.next_id += 1;
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        registry.handlers.push((id, handler));
        log::trace!("subscriber {:?} registered", id);

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            id,
            registry: weak,
        }
    }

    /// Delivers `payload` to every current subscriber, returning how many
    /// handlers were called.
    pub fn emit(&self, payload: T) -> usize {
        let snapshot: Vec<_> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(payload.clone());
                    delivered += 1;
                }
                Err(_) => {
                    log::warn!("subscriber {:?} re-entered its own emission, skipped", id);
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }
}

impl<T: Clone + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.registry.borrow().handlers.len())
            .finish()
    }
}

/// Scoped registration on an [`EventBus`]; unsubscribes on drop.
///
/// Outliving the bus is fine: the subscription then simply reports itself as
/// detached.
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<dyn Unsubscribe>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_attached(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.is_subscribed(self.id))
    }

    /// Unsubscribes now rather than at the end of scope.
    pub fn detach(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.unsubscribe(self.id) {
                log::trace!("subscriber {:?} removed", self.id);
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}
