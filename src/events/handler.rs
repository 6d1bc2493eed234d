//! Handlers and the argument bundle they receive

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a registered handler. Clones of a `Handler` share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// Arguments passed to handlers on trigger: ordered positional values plus
/// named values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventArgs {
    pub args: Vec<Value>,
    pub kwargs: IndexMap<String, Value>,
}

impl EventArgs {
    /// An empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle with positional values only
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            args: values.into_iter().map(Into::into).collect(),
            kwargs: IndexMap::new(),
        }
    }

    /// Append a positional value
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a named value
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    /// Positional value at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Named value
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }
}

type HandlerFn = dyn Fn(&EventArgs) -> eyre::Result<()>;

/// A callable registered against an event.
///
/// Equality is identity: two handlers are equal only if one is a clone of
/// the other, no matter what their closures do.
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    name: Option<Rc<str>>,
    func: Rc<HandlerFn>,
}

impl Handler {
    /// Wrap a closure as a new handler with a fresh identity
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&EventArgs) -> eyre::Result<()> + 'static,
    {
        Self {
            id: HandlerId::next(),
            name: None,
            func: Rc::new(func),
        }
    }

    /// Like `new`, with a name shown in errors and logs
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&EventArgs) -> eyre::Result<()> + 'static,
    {
        let name: String = name.into();
        Self {
            id: HandlerId::next(),
            name: Some(Rc::from(name)),
            func: Rc::new(func),
        }
    }

    /// Build a handler around a pre-allocated identity, so the closure can
    /// refer to the handler it becomes.
    pub(crate) fn with_id<F>(id: HandlerId, name: Option<Rc<str>>, func: F) -> Self
    where
        F: Fn(&EventArgs) -> eyre::Result<()> + 'static,
    {
        Self {
            id,
            name,
            func: Rc::new(func),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the handler
    pub fn call(&self, args: &EventArgs) -> eyre::Result<()> {
        (self.func)(args)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handler {}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.id),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
