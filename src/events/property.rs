//! Observable properties
//!
//! An `ObservableProperty` wraps the getter/setter/deleter of one logical
//! field on an owner type and announces every access on a registry:
//!
//! | access   | before               | after                        |
//! |----------|----------------------|------------------------------|
//! | `read`   | `before_get_<name>`  | `after_get_<name>` (value)   |
//! | `write`  | `before_set_<name>` (value) | `after_set_<name>` (value) |
//! | `delete` | `before_del_<name>`  | `after_del_<name>`           |
//!
//! `<name>` is the property's event override, or else the name given to the
//! accessor that runs. The registry is located fresh on every access.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::error::PropertyError;
use super::handler::EventArgs;
use super::observable::Observable;

/// Types that may own observable properties.
///
/// Return `Some` when the owner itself acts as the registry (it holds an
/// `Observable` and forwards to it). The default says it does not, which
/// makes `Locator::Owner` fail with `PropertyError::NoObservable`.
pub trait ObservableOwner {
    fn observable(&self) -> Option<&Observable> {
        None
    }
}

impl ObservableOwner for Observable {
    fn observable(&self) -> Option<&Observable> {
        Some(self)
    }
}

type FieldFn<O> = dyn for<'a> Fn(&'a O) -> &'a Observable;

/// Where a property finds the registry to emit on
pub enum Locator<O> {
    /// A fixed registry
    Direct(Observable),
    /// A named registry field of the owner
    Field { name: String, get: Rc<FieldFn<O>> },
    /// The owner itself, through `ObservableOwner`
    Owner,
}

impl<O> Locator<O> {
    pub fn direct(observable: &Observable) -> Self {
        Locator::Direct(observable.clone())
    }

    pub fn field<F>(name: impl Into<String>, get: F) -> Self
    where
        F: for<'a> Fn(&'a O) -> &'a Observable + 'static,
    {
        Locator::Field {
            name: name.into(),
            get: Rc::new(get),
        }
    }

    /// Field name for `Locator::Field`
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Locator::Field { name, .. } => Some(name),
            _ => None,
        }
    }

    fn resolve(&self, owner: &O) -> Result<Observable, PropertyError>
    where
        O: ObservableOwner,
    {
        match self {
            Locator::Direct(observable) => Ok(observable.clone()),
            Locator::Field { get, .. } => Ok(get(owner).clone()),
            Locator::Owner => owner.observable().cloned().ok_or(PropertyError::NoObservable),
        }
    }
}

impl<O> Clone for Locator<O> {
    fn clone(&self) -> Self {
        match self {
            Locator::Direct(observable) => Locator::Direct(observable.clone()),
            Locator::Field { name, get } => Locator::Field {
                name: name.clone(),
                get: get.clone(),
            },
            Locator::Owner => Locator::Owner,
        }
    }
}

impl<O> fmt::Debug for Locator<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Direct(observable) => f.debug_tuple("Direct").field(observable).finish(),
            Locator::Field { name, .. } => f.debug_struct("Field").field("name", name).finish_non_exhaustive(),
            Locator::Owner => write!(f, "Owner"),
        }
    }
}

/// A named accessor function
struct Accessor<F: ?Sized> {
    name: Rc<str>,
    func: Rc<F>,
}

impl<F: ?Sized> Clone for Accessor<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: self.func.clone(),
        }
    }
}

type GetFn<O, V> = dyn Fn(&O) -> V;
type SetFn<O, V> = dyn Fn(&mut O, V);
type DelFn<O> = dyn Fn(&mut O);

/// A field accessor of `O` holding a `V`, emitting events around each access
pub struct ObservableProperty<O, V> {
    getter: Option<Accessor<GetFn<O, V>>>,
    setter: Option<Accessor<SetFn<O, V>>>,
    deleter: Option<Accessor<DelFn<O>>>,
    event: Option<String>,
    locator: Locator<O>,
}

impl<O, V> ObservableProperty<O, V> {
    /// A property with no accessors, emitting on the owner
    pub fn new() -> Self {
        Self {
            getter: None,
            setter: None,
            deleter: None,
            event: None,
            locator: Locator::Owner,
        }
    }

    /// Preset factory with the event override and locator already applied
    pub fn create_with(event: Option<&str>, locator: Option<Locator<O>>) -> PropertyPreset<O, V> {
        PropertyPreset {
            event: event.map(str::to_string),
            locator: locator.unwrap_or(Locator::Owner),
            _value: PhantomData,
        }
    }

    /// Derive a property reading through `func`; `name` names the get events
    /// unless an override is set.
    pub fn getter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&O) -> V + 'static,
    {
        self.getter = Some(Accessor {
            name: Rc::from(name),
            func: Rc::new(func),
        });
        self
    }

    /// Derive a property writing through `func`
    pub fn setter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&mut O, V) + 'static,
    {
        self.setter = Some(Accessor {
            name: Rc::from(name),
            func: Rc::new(func),
        });
        self
    }

    /// Derive a property deleting through `func`
    pub fn deleter<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&mut O) + 'static,
    {
        self.deleter = Some(Accessor {
            name: Rc::from(name),
            func: Rc::new(func),
        });
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_locator(mut self, locator: Locator<O>) -> Self {
        self.locator = locator;
        self
    }

    /// The event name override, if any
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn locator(&self) -> &Locator<O> {
        &self.locator
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_deletable(&self) -> bool {
        self.deleter.is_some()
    }

    fn event_name(&self, action: &str, accessor: &str) -> String {
        format!("{}_{}", action, self.event.as_deref().unwrap_or(accessor))
    }
}

impl<O, V> ObservableProperty<O, V>
where
    O: ObservableOwner,
    V: Serialize,
{
    /// Read the value, emitting `before_get_*` and `after_get_*`
    pub fn read(&self, owner: &O) -> eyre::Result<V> {
        let getter = self.getter.as_ref().ok_or(PropertyError::NotReadable)?;

        self.emit(owner, &self.event_name("before_get", &getter.name), EventArgs::new())?;
        let value = (getter.func)(owner);
        let payload = serde_json::to_value(&value)?;
        self.emit(owner, &self.event_name("after_get", &getter.name), EventArgs::new().arg(payload))?;

        Ok(value)
    }

    /// Write `value`, emitting `before_set_*` and `after_set_*` with it
    pub fn write(&self, owner: &mut O, value: V) -> eyre::Result<()> {
        let setter = self.setter.as_ref().ok_or(PropertyError::NotWritable)?;
        let payload: Value = serde_json::to_value(&value)?;

        self.emit(owner, &self.event_name("before_set", &setter.name), EventArgs::new().arg(payload.clone()))?;
        (setter.func)(owner, value);
        self.emit(owner, &self.event_name("after_set", &setter.name), EventArgs::new().arg(payload))?;

        Ok(())
    }

    /// Delete the value, emitting `before_del_*` and `after_del_*`
    pub fn delete(&self, owner: &mut O) -> eyre::Result<()> {
        let deleter = self.deleter.as_ref().ok_or(PropertyError::NotDeletable)?;

        self.emit(owner, &self.event_name("before_del", &deleter.name), EventArgs::new())?;
        (deleter.func)(owner);
        self.emit(owner, &self.event_name("after_del", &deleter.name), EventArgs::new())?;

        Ok(())
    }

    fn emit(&self, owner: &O, event: &str, args: EventArgs) -> eyre::Result<()> {
        let observable = self.locator.resolve(owner)?;
        observable.trigger(event, &args)?;
        Ok(())
    }
}

impl<O, V> Default for ObservableProperty<O, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, V> Clone for ObservableProperty<O, V> {
    fn clone(&self) -> Self {
        Self {
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            deleter: self.deleter.clone(),
            event: self.event.clone(),
            locator: self.locator.clone(),
        }
    }
}

impl<O, V> fmt::Debug for ObservableProperty<O, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableProperty")
            .field("getter", &self.getter.as_ref().map(|a| &a.name))
            .field("setter", &self.setter.as_ref().map(|a| &a.name))
            .field("deleter", &self.deleter.as_ref().map(|a| &a.name))
            .field("event", &self.event)
            .field("locator", &self.locator)
            .finish()
    }
}

/// Builds properties that share an event override and locator
pub struct PropertyPreset<O, V> {
    event: Option<String>,
    locator: Locator<O>,
    // `V` only flows into the properties this preset builds
    _value: PhantomData<fn() -> V>,
}

impl<O, V> PropertyPreset<O, V> {
    /// A fresh property with no accessors
    pub fn build(&self) -> ObservableProperty<O, V> {
        ObservableProperty {
            getter: None,
            setter: None,
            deleter: None,
            event: self.event.clone(),
            locator: self.locator.clone(),
        }
    }

    /// A fresh property around `func`
    pub fn getter<F>(&self, name: &str, func: F) -> ObservableProperty<O, V>
    where
        F: Fn(&O) -> V + 'static,
    {
        self.build().getter(name, func)
    }
}

impl<O, V> Clone for PropertyPreset<O, V> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            locator: self.locator.clone(),
            _value: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Handler;
    use serde_json::json;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

    /// Owner that is itself a registry, by composition
    struct TestObject {
        events: Observable,
        value: i64,
    }

    impl TestObject {
        fn new(value: i64) -> Self {
            Self {
                events: Observable::new(),
                value,
            }
        }
    }

    impl ObservableOwner for TestObject {
        fn observable(&self) -> Option<&Observable> {
            Some(&self.events)
        }
    }

    /// Owner with a registry field but not a registry itself
    struct Plain {
        obs: Observable,
    }

    impl ObservableOwner for Plain {}

    fn prop() -> ObservableProperty<TestObject, i64> {
        ObservableProperty::new()
            .getter("prop", |o: &TestObject| o.value)
            .setter("prop", |o: &mut TestObject, v| o.value = v)
            .deleter("prop", |o: &mut TestObject| o.value = 0)
    }

    fn record(observable: &Observable, events: &[&str]) -> Log {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        for event in events {
            let log = log.clone();
            let name = event.to_string();
            observable.on(
                *event,
                Handler::new(move |args| {
                    log.borrow_mut().push((name.clone(), args.args.clone()));
                    Ok(())
                }),
            );
        }
        log
    }

    #[test]
    fn test_getter_events() {
        let obj = TestObject::new(1);
        let log = record(&obj.events, &["before_get_prop", "after_get_prop"]);

        assert_eq!(prop().read(&obj).unwrap(), 1);

        assert_eq!(
            *log.borrow(),
            vec![
                ("before_get_prop".to_string(), vec![]),
                ("after_get_prop".to_string(), vec![json!(1)]),
            ]
        );
    }

    #[test]
    fn test_setter_events() {
        let mut obj = TestObject::new(1);
        let log = record(&obj.events, &["before_set_prop", "after_set_prop"]);

        prop().write(&mut obj, 42).unwrap();

        assert_eq!(obj.value, 42);
        assert_eq!(
            *log.borrow(),
            vec![
                ("before_set_prop".to_string(), vec![json!(42)]),
                ("after_set_prop".to_string(), vec![json!(42)]),
            ]
        );
    }

    #[test]
    fn test_setter_runs_between_events() {
        let mut obj = TestObject::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        obj.events.on(
            "before_set_prop",
            Handler::new(move |_| {
                seen2.borrow_mut().push("before");
                Ok(())
            }),
        );
        let seen3 = seen.clone();
        obj.events.on(
            "after_set_prop",
            Handler::new(move |_| {
                seen3.borrow_mut().push("after");
                Ok(())
            }),
        );

        prop().write(&mut obj, 5).unwrap();
        assert_eq!(*seen.borrow(), vec!["before", "after"]);
    }

    #[test]
    fn test_deleter_events() {
        let mut obj = TestObject::new(1);
        let log = record(&obj.events, &["before_del_prop", "after_del_prop"]);

        prop().delete(&mut obj).unwrap();

        assert_eq!(obj.value, 0);
        assert_eq!(
            *log.borrow(),
            vec![
                ("before_del_prop".to_string(), vec![]),
                ("after_del_prop".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_unsupported_actions() {
        let mut obj = TestObject::new(1);
        let log = record(
            &obj.events,
            &["before_get_prop", "after_get_prop", "before_set_prop", "before_del_prop"],
        );
        let bare: ObservableProperty<TestObject, i64> = ObservableProperty::new();

        let err = bare.read(&obj).unwrap_err();
        assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::NotReadable));

        let err = bare.write(&mut obj, 42).unwrap_err();
        assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::NotWritable));

        let err = bare.delete(&mut obj).unwrap_err();
        assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::NotDeletable));

        assert!(log.borrow().is_empty());
        assert_eq!(obj.value, 1);
    }

    #[test]
    fn test_create_with() {
        let preset: PropertyPreset<Plain, ()> =
            ObservableProperty::create_with(Some("evt"), Some(Locator::field("obs", |p: &Plain| &p.obs)));
        let prop = preset.build();

        assert_eq!(prop.event(), Some("evt"));
        assert_eq!(prop.locator().field_name(), Some("obs"));
        assert!(!prop.is_readable());
    }

    #[test]
    fn test_custom_event() {
        let obj = TestObject::new(3);
        let log = record(&obj.events, &["before_get_evt", "after_get_evt", "before_get_prop"]);

        let prop = ObservableProperty::create_with(Some("evt"), None).getter("prop", |o: &TestObject| o.value);
        prop.read(&obj).unwrap();

        let names: Vec<String> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["before_get_evt", "after_get_evt"]);
    }

    #[test]
    fn test_custom_observable_obj() {
        let obs = Observable::new();
        let log = record(&obs, &["before_get_prop"]);
        let owner = Plain { obs: Observable::new() };

        let prop: ObservableProperty<Plain, ()> =
            ObservableProperty::create_with(None, Some(Locator::direct(&obs))).getter("prop", |_: &Plain| ());
        prop.read(&owner).unwrap();

        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_custom_observable_field() {
        let owner = Plain { obs: Observable::new() };
        let log = record(&owner.obs, &["before_get_prop"]);

        let prop: ObservableProperty<Plain, ()> = ObservableProperty::create_with(
            None,
            Some(Locator::field("obs", |p: &Plain| &p.obs)),
        )
        .getter("prop", |_: &Plain| ());
        prop.read(&owner).unwrap();

        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_no_observable() {
        let owner = Plain { obs: Observable::new() };
        let prop: ObservableProperty<Plain, ()> = ObservableProperty::new().getter("prop", |_: &Plain| ());

        let err = prop.read(&owner).unwrap_err();
        assert_eq!(err.downcast_ref::<PropertyError>(), Some(&PropertyError::NoObservable));
    }

    #[test]
    fn test_accessor_names_differ() {
        let mut obj = TestObject::new(1);
        let log = record(&obj.events, &["before_get_value", "before_set_update", "before_del_reset"]);

        let prop = ObservableProperty::new()
            .getter("value", |o: &TestObject| o.value)
            .setter("update", |o: &mut TestObject, v| o.value = v)
            .deleter("reset", |o: &mut TestObject| o.value = 0);

        prop.read(&obj).unwrap();
        prop.write(&mut obj, 2).unwrap();
        prop.delete(&mut obj).unwrap();

        let names: Vec<String> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["before_get_value", "before_set_update", "before_del_reset"]);
    }

    #[test]
    fn test_builder_preserves_settings() {
        let obs = Observable::new();
        let prop: ObservableProperty<Plain, i64> = ObservableProperty::create_with(Some("evt"), Some(Locator::direct(&obs)))
            .getter("a", |_: &Plain| 1)
            .setter("b", |_: &mut Plain, _| {})
            .deleter("c", |_: &mut Plain| {});

        assert_eq!(prop.event(), Some("evt"));
        assert!(matches!(prop.locator(), Locator::Direct(_)));
        assert!(prop.is_readable() && prop.is_writable() && prop.is_deletable());
    }

    #[test]
    fn test_handler_error_stops_access() {
        let mut obj = TestObject::new(1);
        obj.events
            .on("before_set_prop", Handler::new(|_| Err(eyre::eyre!("rejected"))));

        let err = prop().write(&mut obj, 9).unwrap_err();

        assert_eq!(err.to_string(), "rejected");
        assert_eq!(obj.value, 1);
    }

    #[test]
    fn test_owner_as_registry() {
        let obs = Observable::new();
        let log = record(&obs, &["after_get_len"]);
        let prop: ObservableProperty<Observable, usize> =
            ObservableProperty::new().getter("len", |o: &Observable| o.get_all_handlers().len());

        assert_eq!(prop.read(&obs).unwrap(), 1);
        assert_eq!(log.borrow()[0].1, vec![json!(1)]);
    }
}
