//! In-process publish/subscribe bus with bounded history.
//!
//! Handlers run synchronously in subscription order for a given event name.
//! A panicking handler is caught and logged so one faulty subscriber cannot
//! block the rest. An event published from inside a handler is queued and
//! delivered to every subscriber as soon as the current dispatch completes.
//! `publish_deferred` queues events for a later `drain_deferred` pass, the
//! cooperative equivalent of microtask dispatch.

use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::id::new_event_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: String,
    pub name: String,
    pub payload: serde_json::Value,
    pub timestamp: i64,
}

impl BusEvent {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: new_event_id(),
            name: name.into(),
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubscribeOptions {
    /// Remove the handler after its first delivery.
    pub once: bool,
    /// Immediately deliver the most recent event with this name, if any.
    pub replay_last: bool,
}

/// Token returned by `subscribe`; pass it to `unsubscribe` to remove the
/// handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusStats {
    pub total_listeners: usize,
    pub event_names: Vec<EventNameStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventNameStats {
    pub name: String,
    pub listeners: usize,
}

type Handler = Box<dyn FnMut(&BusEvent) + Send>;

struct HandlerEntry {
    id: u64,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    handlers: HashMap<String, Vec<HandlerEntry>>,
    all_handlers: Vec<HandlerEntry>,
    history: VecDeque<BusEvent>,
    deferred: VecDeque<BusEvent>,
    /// Events published from inside a handler, delivered after the current
    /// dispatch completes.
    nested: VecDeque<BusEvent>,
    /// Ids of the handlers currently checked out for dispatch.
    checked_out: HashSet<u64>,
    /// Unsubscribes issued while the affected handler was checked out for
    /// dispatch. Applied when handlers are merged back.
    tombstones: HashSet<u64>,
    dispatching: u32,
    next_id: u64,
}

pub struct EventBus {
    inner: Mutex<BusInner>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus whose history retains at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(BusInner::default()),
            capacity,
        }
    }

    /// Register a handler for events with the given name. Returns a token
    /// for `unsubscribe`.
    pub fn subscribe(
        &self,
        name: impl Into<String>,
        handler: impl FnMut(&BusEvent) + Send + 'static,
        options: SubscribeOptions,
    ) -> SubscriptionId {
        let name = name.into();
        let mut handler: Handler = Box::new(handler);

        let replayed = if options.replay_last {
            let last = {
                let inner = self.inner.lock().unwrap();
                inner
                    .history
                    .iter()
                    .rev()
                    .find(|e| e.name == name)
                    .cloned()
            };
            match last {
                Some(event) => {
                    Self::run_handler(&mut handler, &event);
                    true
                }
                None => false,
            }
        } else {
            false
        };

        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;

        // A once-subscription satisfied by replay never goes live.
        if !(options.once && replayed) {
            inner.handlers.entry(name).or_default().push(HandlerEntry {
                id,
                once: options.once,
                handler,
            });
        }
        SubscriptionId(id)
    }

    /// Register a handler that receives every event, regardless of name.
    pub fn subscribe_all(
        &self,
        handler: impl FnMut(&BusEvent) + Send + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.all_handlers.push(HandlerEntry {
            id,
            once: false,
            handler: Box::new(handler),
        });
        SubscriptionId(id)
    }

    /// Remove a previously registered handler. Returns `false` for tokens
    /// that are not (or no longer) registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        for entries in inner.handlers.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id.0) {
                entries.remove(pos);
                return true;
            }
        }
        if let Some(pos) = inner.all_handlers.iter().position(|e| e.id == id.0) {
            inner.all_handlers.remove(pos);
            return true;
        }
        // The handler may be checked out for dispatch right now; mark it so
        // the merge-back drops it.
        if inner.checked_out.contains(&id.0) {
            inner.tombstones.insert(id.0);
            return true;
        }
        false
    }

    /// Publish an event synchronously. Returns the number of handlers
    /// invoked. A publish from inside a handler is queued until the current
    /// dispatch completes and returns 0.
    pub fn publish(&self, name: impl Into<String>, payload: serde_json::Value) -> usize {
        self.dispatch(BusEvent::new(name, payload))
    }

    /// Queue an event for a later `drain_deferred` pass.
    pub fn publish_deferred(&self, name: impl Into<String>, payload: serde_json::Value) {
        let mut inner = self.inner.lock().unwrap();
        let event = BusEvent::new(name, payload);
        inner.deferred.push_back(event);
    }

    /// Dispatch all queued deferred events in order. Returns how many were
    /// dispatched.
    pub fn drain_deferred(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.inner.lock().unwrap().deferred.pop_front();
            match next {
                Some(event) => {
                    self.dispatch(event);
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Events currently retained, oldest first. `name` filters by event
    /// name; `limit` keeps only the most recent `limit` matches.
    pub fn history(&self, name: Option<&str>, limit: Option<usize>) -> Vec<BusEvent> {
        let inner = self.inner.lock().unwrap();
        let mut events: Vec<BusEvent> = match name {
            Some(n) => inner.history.iter().filter(|e| e.name == n).cloned().collect(),
            None => inner.history.iter().cloned().collect(),
        };
        if let Some(limit) = limit {
            if events.len() > limit {
                events.drain(..events.len() - limit);
            }
        }
        events
    }

    pub fn clear_history(&self) {
        self.inner.lock().unwrap().history.clear();
    }

    pub fn stats(&self) -> BusStats {
        let inner = self.inner.lock().unwrap();
        let mut event_names: Vec<EventNameStats> = inner
            .handlers
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(name, entries)| EventNameStats {
                name: name.clone(),
                listeners: entries.len(),
            })
            .collect();
        event_names.sort_by(|a, b| a.name.cmp(&b.name));
        let total_listeners = inner.all_handlers.len()
            + event_names.iter().map(|s| s.listeners).sum::<usize>();
        BusStats {
            total_listeners,
            event_names,
        }
    }

    fn dispatch(&self, event: BusEvent) -> usize {
        let invoked = self.dispatch_event(event, true);
        // Deliver anything the handlers above published, in publish order.
        // Only the outermost dispatch drains; a nested publish leaves the
        // queue for the frame that checked the handlers out.
        loop {
            let next = {
                let mut inner = self.inner.lock().unwrap();
                if inner.dispatching > 0 {
                    break;
                }
                inner.nested.pop_front()
            };
            match next {
                Some(nested) => {
                    self.dispatch_event(nested, false);
                }
                None => break,
            }
        }
        invoked
    }

    fn dispatch_event(&self, event: BusEvent, record_history: bool) -> usize {
        // Check the handlers out of the bus so user code runs without the
        // lock held. A handler publishing anything, its own event name
        // included, queues the event for delivery after this dispatch.
        let (mut named, mut all) = {
            let mut inner = self.inner.lock().unwrap();
            if record_history {
                inner.history.push_back(event.clone());
                while inner.history.len() > self.capacity {
                    inner.history.pop_front();
                }
            }
            if inner.dispatching > 0 {
                inner.nested.push_back(event);
                return 0;
            }
            inner.dispatching += 1;
            let named = inner.handlers.remove(&event.name).unwrap_or_default();
            let all = std::mem::take(&mut inner.all_handlers);
            for entry in named.iter().chain(all.iter()) {
                inner.checked_out.insert(entry.id);
            }
            (named, all)
        };

        let mut invoked = 0;
        let mut fired_once: Vec<u64> = Vec::new();
        for entry in named.iter_mut() {
            Self::run_handler(&mut entry.handler, &event);
            invoked += 1;
            if entry.once {
                fired_once.push(entry.id);
            }
        }
        for entry in all.iter_mut() {
            Self::run_handler(&mut entry.handler, &event);
            invoked += 1;
        }

        let mut inner = self.inner.lock().unwrap();
        inner.dispatching -= 1;
        inner.checked_out.clear();
        let tombstones = std::mem::take(&mut inner.tombstones);
        named.retain(|e| !fired_once.contains(&e.id) && !tombstones.contains(&e.id));
        all.retain(|e| !tombstones.contains(&e.id));

        // Handlers subscribed during dispatch landed in fresh vecs; keep the
        // survivors ahead of them to preserve subscription order.
        if !named.is_empty() {
            let newly = inner.handlers.remove(&event.name).unwrap_or_default();
            named.extend(newly);
            inner.handlers.insert(event.name.clone(), named);
        }
        let newly_all = std::mem::take(&mut inner.all_handlers);
        all.extend(newly_all);
        inner.all_handlers = all;

        invoked
    }

    fn run_handler(handler: &mut Handler, event: &BusEvent) {
        let result = catch_unwind(AssertUnwindSafe(|| handler(event)));
        if result.is_err() {
            warn!(event = %event.name, "event handler panicked; continuing dispatch");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn collector() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&BusEvent) + Send) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = move |e: &BusEvent| sink.lock().unwrap().push(e.name.clone());
        (seen, handler)
    }

    #[test]
    fn publish_reaches_subscriber() {
        let bus = EventBus::new(16);
        let (seen, handler) = collector();
        bus.subscribe("window:opened", handler, SubscribeOptions::default());

        let count = bus.publish("window:opened", json!({"id": "card-rust"}));
        assert_eq!(count, 1);
        assert_eq!(seen.lock().unwrap().as_slice(), ["window:opened"]);
    }

    #[test]
    fn publish_with_no_subscribers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish("nobody:listens", json!(null)), 0);
    }

    #[test]
    fn handlers_fire_in_subscription_order() {
        let bus = EventBus::new(16);
        let order = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.subscribe(
                "x",
                move |_| order.lock().unwrap().push(tag),
                SubscribeOptions::default(),
            );
        }
        bus.publish("x", json!(null));
        assert_eq!(order.lock().unwrap().as_slice(), ["first", "second", "third"]);
    }

    #[test]
    fn once_handler_fires_exactly_once() {
        let bus = EventBus::new(16);
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        bus.subscribe(
            "x",
            move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            },
            SubscribeOptions {
                once: true,
                ..Default::default()
            },
        );

        bus.publish("x", json!(1));
        bus.publish("x", json!(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replay_last_delivers_most_recent() {
        let bus = EventBus::new(16);
        bus.publish("status", json!("starting"));
        bus.publish("status", json!("ready"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(
            "status",
            move |e| sink.lock().unwrap().push(e.payload.clone()),
            SubscribeOptions {
                replay_last: true,
                ..Default::default()
            },
        );

        assert_eq!(seen.lock().unwrap().as_slice(), [json!("ready")]);
    }

    #[test]
    fn replay_last_with_once_never_goes_live() {
        let bus = EventBus::new(16);
        bus.publish("status", json!("ready"));

        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        bus.subscribe(
            "status",
            move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            },
            SubscribeOptions {
                once: true,
                replay_last: true,
            },
        );

        bus.publish("status", json!("again"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new(16);
        let (seen, handler) = collector();
        let sub = bus.subscribe("x", handler, SubscribeOptions::default());

        bus.publish("x", json!(1));
        assert!(bus.unsubscribe(sub));
        bus.publish("x", json!(2));

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!bus.unsubscribe(sub));
    }

    #[test]
    fn subscribe_all_sees_every_name() {
        let bus = EventBus::new(16);
        let (seen, handler) = collector();
        bus.subscribe_all(handler);

        bus.publish("a", json!(null));
        bus.publish("b", json!(null));
        assert_eq!(seen.lock().unwrap().as_slice(), ["a", "b"]);
    }

    #[test]
    fn panicking_handler_does_not_block_others() {
        let bus = EventBus::new(16);
        bus.subscribe(
            "x",
            |_| panic!("faulty subscriber"),
            SubscribeOptions::default(),
        );
        let (seen, handler) = collector();
        bus.subscribe("x", handler, SubscribeOptions::default());

        let count = bus.publish("x", json!(null));
        assert_eq!(count, 2);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn history_evicts_oldest_first() {
        let bus = EventBus::new(3);
        for i in 0..5 {
            bus.publish("x", json!(i));
        }

        let history = bus.history(None, None);
        assert_eq!(history.len(), 3);
        let payloads: Vec<_> = history.iter().map(|e| e.payload.clone()).collect();
        assert_eq!(payloads, vec![json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn history_filters_by_name_and_limit() {
        let bus = EventBus::new(16);
        bus.publish("a", json!(1));
        bus.publish("b", json!(2));
        bus.publish("a", json!(3));

        let only_a = bus.history(Some("a"), None);
        assert_eq!(only_a.len(), 2);

        let last_a = bus.history(Some("a"), Some(1));
        assert_eq!(last_a.len(), 1);
        assert_eq!(last_a[0].payload, json!(3));
    }

    #[test]
    fn clear_history_empties_ring() {
        let bus = EventBus::new(16);
        bus.publish("x", json!(null));
        bus.clear_history();
        assert!(bus.history(None, None).is_empty());
    }

    #[test]
    fn deferred_events_dispatch_on_drain_in_order() {
        let bus = EventBus::new(16);
        let (seen, handler) = collector();
        bus.subscribe_all(handler);

        bus.publish_deferred("a", json!(null));
        bus.publish_deferred("b", json!(null));
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(bus.drain_deferred(), 2);
        assert_eq!(seen.lock().unwrap().as_slice(), ["a", "b"]);
    }

    #[test]
    fn stats_counts_listeners() {
        let bus = EventBus::new(16);
        bus.subscribe("a", |_| {}, SubscribeOptions::default());
        bus.subscribe("a", |_| {}, SubscribeOptions::default());
        bus.subscribe("b", |_| {}, SubscribeOptions::default());
        bus.subscribe_all(|_| {});

        let stats = bus.stats();
        assert_eq!(stats.total_listeners, 4);
        assert_eq!(stats.event_names.len(), 2);
        assert_eq!(stats.event_names[0].name, "a");
        assert_eq!(stats.event_names[0].listeners, 2);
    }

    #[test]
    fn events_carry_id_and_timestamp() {
        let bus = EventBus::new(16);
        bus.publish("x", json!(null));
        let history = bus.history(None, None);
        assert!(!history[0].id.is_empty());
        assert!(history[0].timestamp > 0);
    }

    #[test]
    fn publish_from_handler_reaches_all_subscribers() {
        let bus = Arc::new(EventBus::new(16));
        let (seen, handler) = collector();
        bus.subscribe_all(handler);

        let bus2 = bus.clone();
        bus.subscribe(
            "outer",
            move |_| {
                bus2.publish("inner", json!("follow-up"));
            },
            SubscribeOptions::default(),
        );
        let (inner_seen, inner_handler) = collector();
        bus.subscribe("inner", inner_handler, SubscribeOptions::default());

        bus.publish("outer", json!(null));

        // Delivered after the outer dispatch completes, to named and
        // subscribe-all handlers alike.
        assert_eq!(seen.lock().unwrap().as_slice(), ["outer", "inner"]);
        assert_eq!(inner_seen.lock().unwrap().as_slice(), ["inner"]);
    }

    #[test]
    fn chained_handler_publishes_all_deliver() {
        let bus = Arc::new(EventBus::new(16));
        let (seen, handler) = collector();
        bus.subscribe_all(handler);

        let bus2 = bus.clone();
        bus.subscribe(
            "a",
            move |_| {
                bus2.publish("b", json!(null));
            },
            SubscribeOptions::default(),
        );
        let bus3 = bus.clone();
        bus.subscribe(
            "b",
            move |_| {
                bus3.publish("c", json!(null));
            },
            SubscribeOptions::default(),
        );

        bus.publish("a", json!(null));
        assert_eq!(seen.lock().unwrap().as_slice(), ["a", "b", "c"]);
        // History saw them all, in publish order.
        let names: Vec<_> = bus.history(None, None).iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn unsubscribe_unknown_token_is_false_even_mid_dispatch() {
        let bus = Arc::new(EventBus::new(16));
        let bus2 = bus.clone();
        let result = Arc::new(Mutex::new(None));
        let slot = result.clone();
        bus.subscribe(
            "x",
            move |_| {
                *slot.lock().unwrap() = Some(bus2.unsubscribe(SubscriptionId(9999)));
            },
            SubscribeOptions::default(),
        );

        bus.publish("x", json!(null));
        assert_eq!(*result.lock().unwrap(), Some(false));
    }

    #[test]
    fn unsubscribe_during_own_dispatch_takes_effect() {
        let bus = Arc::new(EventBus::new(16));
        let hits = Arc::new(AtomicUsize::new(0));

        let bus2 = bus.clone();
        let h = hits.clone();
        let sub_slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
        let slot = sub_slot.clone();
        let sub = bus.subscribe(
            "x",
            move |_| {
                h.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *slot.lock().unwrap() {
                    bus2.unsubscribe(id);
                }
            },
            SubscribeOptions::default(),
        );
        *sub_slot.lock().unwrap() = Some(sub);

        bus.publish("x", json!(1));
        bus.publish("x", json!(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
