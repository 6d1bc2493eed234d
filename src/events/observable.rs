//! The handler registry
//!
//! `Observable` maps event names to ordered handler lists. It is a shared
//! handle: clones point at the same registry, which is what lets a `once`
//! wrapper remove itself while a trigger is running.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::error::EventError;
use super::handler::{EventArgs, Handler, HandlerId};

type HandlerMap = IndexMap<String, Vec<Handler>>;

/// Registry of named events and their handlers.
///
/// Single-threaded by construction (`Rc<RefCell<..>>`); handlers run on the
/// caller's stack in registration order.
#[derive(Clone, Default)]
pub struct Observable {
    events: Rc<RefCell<HandlerMap>>,
}

impl Observable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event with a copy of its handler list
    pub fn get_all_handlers(&self) -> IndexMap<String, Vec<Handler>> {
        self.events.borrow().clone()
    }

    /// Copy of the handlers registered for `event` (empty if unknown)
    pub fn get_handlers(&self, event: &str) -> Vec<Handler> {
        self.events.borrow().get(event).cloned().unwrap_or_default()
    }

    /// Whether `handler` is registered for `event`
    pub fn is_registered(&self, event: &str, handler: &Handler) -> bool {
        self.events
            .borrow()
            .get(event)
            .is_some_and(|handlers| handlers.contains(handler))
    }

    /// Register `handler` for `event` and hand it back
    pub fn on(&self, event: impl Into<String>, handler: Handler) -> Handler {
        self.append(event.into(), vec![handler.clone()]);
        handler
    }

    /// Register several handlers for `event`, in order. Returns the first,
    /// or `None` (registering nothing) when `handlers` is empty.
    pub fn on_many<I>(&self, event: impl Into<String>, handlers: I) -> Option<Handler>
    where
        I: IntoIterator<Item = Handler>,
    {
        let handlers: Vec<Handler> = handlers.into_iter().collect();
        let first = handlers.first().cloned()?;
        self.append(event.into(), handlers);
        Some(first)
    }

    /// A registrar that adds handlers to `event` later
    pub fn deferred_on(&self, event: impl Into<String>) -> Registrar {
        Registrar {
            observable: self.clone(),
            event: event.into(),
            once: false,
        }
    }

    /// Register `handler` to run on the next trigger of `event` only.
    ///
    /// Returns the wrapper that is actually stored; use it with `off` or
    /// `is_registered`.
    pub fn once(&self, event: impl Into<String>, handler: Handler) -> Handler {
        let event = event.into();
        let wrapper = self.once_wrapper(&event, vec![handler]);
        self.on(event, wrapper)
    }

    /// Register one wrapper that runs all `handlers`, in order, on the next
    /// trigger of `event`. `None` when `handlers` is empty.
    pub fn once_many<I>(&self, event: impl Into<String>, handlers: I) -> Option<Handler>
    where
        I: IntoIterator<Item = Handler>,
    {
        let handlers: Vec<Handler> = handlers.into_iter().collect();
        if handlers.is_empty() {
            return None;
        }
        let event = event.into();
        let wrapper = self.once_wrapper(&event, handlers);
        Some(self.on(event, wrapper))
    }

    /// A registrar that adds one-shot handlers to `event` later
    pub fn deferred_once(&self, event: impl Into<String>) -> Registrar {
        Registrar {
            observable: self.clone(),
            event: event.into(),
            once: true,
        }
    }

    /// Unregister handlers.
    ///
    /// - `event` is `None` or empty: clear the whole registry
    /// - `handlers` is empty: drop the event's entry
    /// - otherwise: drop every occurrence of each handler, in order,
    ///   failing on the first one that isn't registered
    pub fn off(&self, event: Option<&str>, handlers: &[Handler]) -> Result<(), EventError> {
        let mut events = self.events.borrow_mut();

        let event = match event {
            Some(event) if !event.is_empty() => event,
            _ => {
                log::debug!("Clearing all {} events", events.len());
                events.clear();
                return Ok(());
            }
        };

        let Some(registered) = events.get_mut(event) else {
            return Err(EventError::EventNotFound {
                event: event.to_string(),
            });
        };

        if handlers.is_empty() {
            events.shift_remove(event);
            log::debug!("Removed event: {}", event);
            return Ok(());
        }

        for handler in handlers {
            if !registered.contains(handler) {
                return Err(EventError::HandlerNotFound {
                    event: event.to_string(),
                    handler: handler.to_string(),
                    id: handler.id(),
                });
            }
            registered.retain(|h| h != handler);
            log::debug!("Removed handler {} from event {}", handler, event);
        }

        Ok(())
    }

    /// Remove every event and handler
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Call every handler registered for `event`, in order, with `args`.
    ///
    /// Works on a snapshot, so handlers may register or unregister freely
    /// (including themselves). The first handler error stops the dispatch
    /// and is returned as-is. Returns whether any handler was registered.
    pub fn trigger(&self, event: &str, args: &EventArgs) -> eyre::Result<bool> {
        let callbacks = self.get_handlers(event);
        if callbacks.is_empty() {
            log::trace!("No handlers for event: {}", event);
            return Ok(false);
        }

        log::debug!("Triggering event {} on {} handler(s)", event, callbacks.len());
        for callback in &callbacks {
            callback.call(args)?;
        }
        Ok(true)
    }

    fn append(&self, event: String, handlers: Vec<Handler>) {
        log::debug!("Registering {} handler(s) for event: {}", handlers.len(), event);
        self.events.borrow_mut().entry(event).or_default().extend(handlers);
    }

    fn once_wrapper(&self, event: &str, handlers: Vec<Handler>) -> Handler {
        let id = HandlerId::next();
        let name: Option<Rc<str>> = handlers[0].name().map(Rc::from);
        let registry: Weak<RefCell<HandlerMap>> = Rc::downgrade(&self.events);
        let event = event.to_string();

        Handler::with_id(id, name.clone(), move |args| {
            if let Some(events) = registry.upgrade() {
                let this = Handler::with_id(id, name.clone(), |_| Ok(()));
                Observable { events }.off(Some(&event), std::slice::from_ref(&this))?;
            }
            for handler in &handlers {
                handler.call(args)?;
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events = self.events.borrow();
        f.debug_map()
            .entries(events.iter().map(|(event, handlers)| (event, handlers.len())))
            .finish()
    }
}

/// Adds handlers to one event on demand, like a decorator waiting for its
/// target.
#[derive(Clone, Debug)]
pub struct Registrar {
    observable: Observable,
    event: String,
    once: bool,
}

impl Registrar {
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Register `handler` and return what was stored: the handler itself,
    /// or its one-shot wrapper.
    pub fn register(&self, handler: Handler) -> Handler {
        if self.once {
            self.observable.once(self.event.clone(), handler)
        } else {
            self.observable.on(self.event.clone(), handler)
        }
    }

    /// Register several handlers at once; see `Observable::on_many` and
    /// `Observable::once_many`.
    pub fn register_many<I>(&self, handlers: I) -> Option<Handler>
    where
        I: IntoIterator<Item = Handler>,
    {
        if self.once {
            self.observable.once_many(self.event.clone(), handlers)
        } else {
            self.observable.on_many(self.event.clone(), handlers)
        }
    }
}
