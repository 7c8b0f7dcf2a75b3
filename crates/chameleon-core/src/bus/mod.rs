//! Event bus for the Chameleon framework.
//!
//! The [`EventBus`] owns the listener registry and delivers every dispatched
//! event to the listeners whose selector accepts it.
//!
//! # Dispatch order
//!
//! 1. Listeners are ordered by priority weight, lowest first
//! 2. Listeners with equal priority run in registration order
//! 3. Every accepting listener runs; cancellation never short-circuits, so a
//!    [`Priority::Monitor`] listener always sees the final state
//! 4. A listener that returns an error or panics is logged and skipped over
//!
//! ```rust,ignore
//! use chameleon_core::{EventBus, Priority, UserChatEvent};
//!
//! let bus = EventBus::new();
//! bus.subscribe(Priority::First, |event: &mut UserChatEvent| {
//!     event.set_cancelled(event.message().contains("spam"))
//! });
//!
//! let event = bus.dispatch(UserChatEvent::new(user, "hello"));
//! if event.is_cancelled() {
//!     // drop the native chat packet
//! }
//! ```
//!
//! # Concurrency
//!
//! Dispatch is synchronous and runs on the caller's thread. The registry is a
//! copy-on-write snapshot behind a lock: registering or unregistering swaps in
//! a new list, while dispatchers iterate the snapshot they took at the start.
//! Listeners may therefore (un)register from inside a handler without
//! deadlocking, and the change applies from the next dispatch on.

pub mod listener;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{Level, debug, error, span, trace};

use crate::error::EventResult;
use crate::foundation::{Cancellable, Event, Priority};
use crate::handler::{IntoHandlerResult, guarded};

pub use listener::{ErasedHandler, EventSelector, Listener, ListenerHandle};

use listener::Binding;

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Number of listeners the event was delivered to.
    pub delivered: usize,
    /// Number of those listeners that failed.
    pub faulted: usize,
}

#[derive(Default)]
struct Registry {
    /// Sorted by `(priority weight, id)`.
    bindings: Arc<Vec<Arc<Binding>>>,
    next_id: u64,
}

impl Registry {
    fn insert(&mut self, binding: Binding) -> ListenerHandle {
        debug!(
            listener = binding.label(),
            selector = %binding.selector,
            priority = %binding.priority,
            "Registered listener"
        );

        let handle = binding.handle();
        let bindings = Arc::make_mut(&mut self.bindings);
        // Ids grow monotonically, so ties stay in registration order.
        let index = bindings.partition_point(|b| b.priority <= binding.priority);
        bindings.insert(index, Arc::new(binding));
        handle
    }
}

/// The central event bus.
///
/// `EventBus` is `Send + Sync` and is meant to be shared (usually through the
/// application handle) by every thread the host dispatches from.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidListener`](crate::EventError::InvalidListener)
    /// when the listener has no selector or no handler.
    pub fn register(&self, listener: Listener) -> EventResult<ListenerHandle> {
        let mut registry = self.registry.write();
        let binding = listener.into_binding(registry.next_id)?;
        registry.next_id += 1;
        Ok(registry.insert(binding))
    }

    /// Registers a handler for exactly the event type `E`.
    pub fn subscribe<E, F, R>(&self, priority: Priority, f: F) -> ListenerHandle
    where
        E: Event,
        F: Fn(&mut E) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.register_complete(Listener::new().priority(priority).on(f))
    }

    /// Registers a handler for every cancellable event.
    pub fn subscribe_cancellable<F, R>(&self, priority: Priority, f: F) -> ListenerHandle
    where
        F: Fn(&mut dyn Cancellable) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.register_complete(Listener::new().priority(priority).on_cancellable(f))
    }

    /// Registers a handler for every event.
    pub fn subscribe_all<F, R>(&self, priority: Priority, f: F) -> ListenerHandle
    where
        F: Fn(&mut dyn Event) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.register_complete(Listener::new().priority(priority).on_any(f))
    }

    /// Registers a listener built by one of the typed `on*` methods, which
    /// always carries both a selector and a handler.
    fn register_complete(&self, listener: Listener) -> ListenerHandle {
        let mut registry = self.registry.write();
        let id = registry.next_id;
        registry.next_id += 1;

        match listener.into_binding(id) {
            Ok(binding) => registry.insert(binding),
            Err(err) => {
                error!(error = %err, "Typed listener was incomplete, it will never run");
                ListenerHandle(id)
            }
        }
    }

    /// Removes a listener.
    ///
    /// Returns `false` if the listener was already removed.
    pub fn unregister(&self, handle: ListenerHandle) -> bool {
        let mut registry = self.registry.write();
        let Some(index) = registry.bindings.iter().position(|b| b.id == handle.0) else {
            return false;
        };

        let removed = Arc::make_mut(&mut registry.bindings).remove(index);
        debug!(listener = removed.label(), "Unregistered listener");
        true
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.read().bindings.len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.read().bindings.is_empty()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        let mut registry = self.registry.write();
        registry.bindings = Arc::new(Vec::new());
    }

    /// Dispatches `event` and hands it back for inspection.
    pub fn dispatch<E: Event>(&self, mut event: E) -> E {
        self.dispatch_in_place(&mut event);
        event
    }

    /// Dispatches an event the caller keeps ownership of.
    ///
    /// Never panics and never returns a listener's error: faults are logged
    /// and counted in the summary.
    pub fn dispatch_in_place(&self, event: &mut dyn Event) -> DispatchSummary {
        let event_name = event.event_name();
        let span = span!(Level::DEBUG, "dispatch", event = %event_name);
        let _enter = span.enter();

        let snapshot = Arc::clone(&self.registry.read().bindings);
        let mut summary = DispatchSummary::default();

        for binding in snapshot.iter() {
            if !binding.selector.accepts(&*event) {
                continue;
            }

            trace!(
                listener = binding.label(),
                priority = %binding.priority,
                "Invoking listener"
            );
            summary.delivered += 1;

            if let Err(fault) = guarded(|| (binding.handler)(&mut *event)) {
                summary.faulted += 1;
                error!(
                    event = event_name,
                    listener = binding.label(),
                    priority = %binding.priority,
                    error = %fault,
                    "Event listener failed, continuing dispatch"
                );
            }
        }

        trace!(
            delivered = summary.delivered,
            faulted = summary.faulted,
            "Dispatch finished"
        );
        summary
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::error::BoxError;
    use crate::foundation::CancelState;

    struct TestEvent {
        state: CancelState,
    }

    crate::cancellable_event!(TestEvent, "test", state);

    impl TestEvent {
        fn new() -> Self {
            Self {
                state: CancelState::default(),
            }
        }
    }

    struct OtherEvent;

    impl Event for OtherEvent {}

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_dispatch_no_listeners() {
        let bus = EventBus::new();
        let mut event = TestEvent::new();
        let summary = bus.dispatch_in_place(&mut event);
        assert_eq!(summary, DispatchSummary::default());
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let bus = EventBus::new();
        let log = recorder();

        let plan = [
            (Priority::Monitor, "monitor"),
            (Priority::Third, "third-a"),
            (Priority::First, "first-a"),
            (Priority::Third, "third-b"),
            (Priority::Fifth, "fifth"),
            (Priority::First, "first-b"),
            (Priority::Second, "second"),
            (Priority::Fourth, "fourth"),
            (Priority::Third, "third-c"),
        ];

        for (priority, label) in plan {
            let log = Arc::clone(&log);
            bus.subscribe(priority, move |_: &mut TestEvent| {
                log.lock().push(label.to_string());
            });
        }

        bus.dispatch(TestEvent::new());

        assert_eq!(
            *log.lock(),
            vec![
                "first-a", "first-b", "second", "third-a", "third-b", "third-c", "fourth",
                "fifth", "monitor",
            ]
        );
    }

    #[test]
    fn test_register_and_subscribe_share_ordering() {
        let bus = EventBus::new();
        let log = recorder();

        let l1 = Arc::clone(&log);
        bus.register(
            Listener::new()
                .priority(Priority::Second)
                .on(move |_: &mut TestEvent| l1.lock().push("registered".to_string())),
        )
        .unwrap();

        let l2 = Arc::clone(&log);
        bus.subscribe(Priority::Second, move |_: &mut TestEvent| {
            l2.lock().push("subscribed".to_string());
        });

        bus.dispatch(TestEvent::new());
        assert_eq!(*log.lock(), vec!["registered", "subscribed"]);
    }

    #[test]
    fn test_cancellation_does_not_short_circuit() {
        let bus = EventBus::new();
        let observed = Arc::new(Mutex::new(None));

        bus.subscribe(Priority::First, |event: &mut TestEvent| {
            event.set_cancelled(true)
        });

        let seen = Arc::clone(&observed);
        bus.subscribe(Priority::Monitor, move |event: &mut TestEvent| {
            *seen.lock() = Some(event.is_cancelled());
        });

        let event = bus.dispatch(TestEvent::new());

        assert!(event.is_cancelled());
        assert_eq!(*observed.lock(), Some(true));
    }

    #[test]
    fn test_fault_isolation() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Priority::First, |_: &mut TestEvent| -> Result<(), BoxError> {
            Err("first listener failed".into())
        });
        for _ in 0..2 {
            let c = Arc::clone(&counter);
            bus.subscribe(Priority::Second, move |_: &mut TestEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        let mut event = TestEvent::new();
        let summary = bus.dispatch_in_place(&mut event);

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(
            summary,
            DispatchSummary {
                delivered: 3,
                faulted: 1
            }
        );
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Priority::First, |_: &mut TestEvent| -> Result<(), BoxError> {
            panic!("listener exploded");
        });
        let c = Arc::clone(&counter);
        bus.subscribe(Priority::Monitor, move |_: &mut TestEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let mut event = TestEvent::new();
        let summary = bus.dispatch_in_place(&mut event);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(summary.faulted, 1);
    }

    #[test]
    fn test_denied_cancellation_is_reported_not_thrown() {
        let bus = EventBus::new();
        let denial = Arc::new(Mutex::new(None));

        let d = Arc::clone(&denial);
        bus.subscribe(Priority::First, move |event: &mut TestEvent| {
            *d.lock() = Some(event.set_cancelled(true));
        });

        let event = bus.dispatch(TestEvent {
            state: CancelState::frozen(false),
        });

        assert!(!event.is_cancelled());
        assert!(matches!(
            *denial.lock(),
            Some(Err(crate::EventError::CancellationDenied { event: "test" }))
        ));
    }

    #[test]
    fn test_selectors() {
        let bus = EventBus::new();
        let log = recorder();

        let l = Arc::clone(&log);
        bus.subscribe(Priority::First, move |_: &mut TestEvent| {
            l.lock().push("exact".to_string());
        });
        let l = Arc::clone(&log);
        bus.subscribe_cancellable(Priority::Second, move |_: &mut dyn Cancellable| {
            l.lock().push("cancellable".to_string());
        });
        let l = Arc::clone(&log);
        bus.subscribe_all(Priority::Third, move |event: &mut dyn Event| {
            l.lock().push(format!("all:{}", event.is_cancellable()));
        });

        bus.dispatch(OtherEvent);
        assert_eq!(*log.lock(), vec!["all:false"]);

        log.lock().clear();
        bus.dispatch(TestEvent::new());
        assert_eq!(*log.lock(), vec!["exact", "cancellable", "all:true"]);
    }

    #[test]
    fn test_register_rejects_incomplete_listener() {
        let bus = EventBus::new();
        let result = bus.register(Listener::new().priority(Priority::First));
        assert!(matches!(
            result,
            Err(crate::EventError::InvalidListener { .. })
        ));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_unregister() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let handle = bus.subscribe(Priority::First, move |_: &mut TestEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.dispatch(TestEvent::new());
        assert!(bus.unregister(handle));
        assert!(!bus.unregister(handle));
        bus.dispatch(TestEvent::new());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_registration_inside_listener_applies_next_dispatch() {
        let bus = Arc::new(EventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_bus = Arc::clone(&bus);
        let c = Arc::clone(&counter);
        bus.subscribe(Priority::First, move |_: &mut OtherEvent| {
            let c = Arc::clone(&c);
            inner_bus.subscribe(Priority::Second, move |_: &mut OtherEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });

        bus.dispatch(OtherEvent);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        bus.dispatch(OtherEvent);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_dispatch() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for priority in Priority::ALL {
            let c = Arc::clone(&counter);
            bus.subscribe(priority, move |_: &mut TestEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        bus.dispatch(TestEvent::new());
                    }
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 8 * 100 * Priority::ALL.len());
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();
        bus.subscribe(Priority::First, |_: &mut TestEvent| {});
        bus.subscribe_all(Priority::First, |_: &mut dyn Event| {});
        assert_eq!(bus.listener_count(), 2);

        bus.clear();
        assert_eq!(bus.listener_count(), 0);
    }
}
