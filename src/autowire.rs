use alloc::{
    boxed::Box,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::fmt::{self, Debug, Formatter};
use tracing::{debug, debug_span, error};

use crate::{
    any::Instance,
    arguments::{Argument, Arguments},
    errors::{ContainerErrorKind, ResolveErrorKind},
    factory::Factory,
    reflection::{Parameter, ParameterType, Reflection},
    resolver::Resolver,
    Container,
};

/// Builds a class by resolving each of its constructor parameters from a [`Resolver`].
///
/// Every call produces a new instance; caching is up to the definition wrapping the factory.
///
/// Parameters are resolved in declaration order, first match wins:
/// 1. the service named after the parameter type (class or interface) or, for untyped, builtin and callable
///    parameters, after the parameter itself, if the resolver has it;
/// 2. the default value;
/// 3. null, if the parameter is optional;
/// 4. null, if the type is nullable.
///
/// Variadic parameters are skipped and never populated.
#[derive(Clone)]
pub struct AutowireFactory {
    class: String,
    reflection: Arc<dyn Reflection>,
}

impl AutowireFactory {
    /// # Errors
    /// Returns [`ContainerErrorKind::NotConstructible`] if `class` isn't a class known to `reflection`.
    pub fn for_type(reflection: Arc<dyn Reflection>, class: impl Into<String>) -> Result<Self, ContainerErrorKind> {
        let class = class.into();
        if !reflection.class_exists(&class) {
            let err = ContainerErrorKind::NotConstructible { name: class };
            error!("{}", err);
            return Err(err);
        }

        Ok(Self { class, reflection })
    }

    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// # Errors
    /// - [`ContainerErrorKind::Reflection`] if the class can't be reflected
    /// - [`ContainerErrorKind::UnresolvedParameter`] for the first parameter no policy branch resolves
    /// - [`ContainerErrorKind::Dependency`] if the resolver fails with something else than not-found
    /// - [`ContainerErrorKind::Instantiate`] if the constructor fails
    pub fn create<R: Resolver + ?Sized>(&self, resolver: &R) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("autowire", class = %self.class);
        let _guard = span.enter();

        let class = self.reflection.reflect(&self.class).map_err(|source| {
            let err = ContainerErrorKind::Reflection {
                class: self.class.clone(),
                source,
            };
            error!("{}", err);
            err
        })?;

        let arguments = match class.constructor() {
            None => {
                debug!("No constructor");
                Arguments::default()
            }
            Some(parameters) => {
                let mut arguments = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    if parameter.is_variadic() {
                        continue;
                    }
                    arguments.push(self.resolve_parameter(resolver, parameter)?);
                }
                Arguments::new(arguments)
            }
        };

        class.new_instance(&arguments).map_err(|source| {
            let err = ContainerErrorKind::Instantiate {
                class: self.class.clone(),
                source,
            };
            error!("{}", err);
            err.into()
        })
    }

    /// Wraps the factory so it can be stored in a service definition.
    #[must_use]
    pub fn into_factory(self) -> Factory {
        Factory::from_instance_fn(move |container: &Container| self.create(container))
    }

    fn resolve_parameter<R: Resolver + ?Sized>(&self, resolver: &R, parameter: &Parameter) -> Result<Argument, ResolveErrorKind> {
        let span = debug_span!("parameter", position = parameter.position(), name = parameter.name());
        let _guard = span.enter();

        let mut not_found = None;
        if let Some(service) = self.service_name(parameter) {
            if resolver.has(service) {
                match resolver.get(service) {
                    Ok(dependency) => {
                        debug!(service, "Resolved from container");
                        return Ok(Argument::Value(dependency));
                    }
                    Err(err) if err.is_not_found() => {
                        debug!(service, "Not found in container");
                        not_found = Some(Box::new(err));
                    }
                    Err(err) => {
                        let err = ContainerErrorKind::Dependency {
                            id: service.to_string(),
                            source: Box::new(err),
                        };
                        error!("{}", err);
                        return Err(err.into());
                    }
                }
            }
        }

        if let Some(default) = parameter.default_value() {
            debug!("Default value used");
            return Ok(default.clone());
        }
        if parameter.is_optional() || parameter.allows_null() {
            debug!("Null used");
            return Ok(Argument::Null);
        }

        let err = ContainerErrorKind::UnresolvedParameter {
            position: parameter.position(),
            name: parameter.name().to_string(),
            class: self.class.clone(),
            expected: parameter.ty().map(ToString::to_string),
            source: not_found,
        };
        error!("{}", err);
        Err(err.into())
    }

    /// Service identifier to look the parameter up with, if any.
    fn service_name<'a>(&self, parameter: &'a Parameter) -> Option<&'a str> {
        match parameter.ty() {
            None | Some(ParameterType::Builtin(_) | ParameterType::Callable(_)) => Some(parameter.name()),
            Some(ParameterType::Named(ty)) => {
                if self.reflection.interface_exists(ty) || self.reflection.class_exists(ty) {
                    Some(ty.as_str())
                } else {
                    None
                }
            }
        }
    }
}

impl Debug for AutowireFactory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutowireFactory").field("class", &self.class).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::{
        borrow::ToOwned,
        collections::BTreeMap,
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec::Vec,
    };
    use core::cell::RefCell;
    use tracing_test::traced_test;

    use super::AutowireFactory;
    use crate::{
        any::{instance, Instance},
        arguments::{Argument, Arguments},
        errors::{ContainerErrorKind, ReflectionErrorKind, ResolveErrorKind},
        reflection::{Class, Parameter, ParameterType, Reflection},
        resolver::Resolver,
        TypeCatalog,
    };

    struct Foo;

    #[allow(dead_code)]
    struct Bar {
        foo: Arc<Foo>,
        boo: Option<Arc<String>>,
        num: Option<Arc<i64>>,
        check: bool,
    }

    struct DefaultValue;
    struct OptionalClosure(bool);
    struct RequiredClosure;

    fn catalog() -> Arc<dyn Reflection> {
        Arc::new(
            TypeCatalog::new()
                .class(Class::new("Foo", |_: &Arguments| Ok(Foo)))
                .class(
                    Class::new("Bar", |arguments: &Arguments| {
                        Ok(Bar {
                            foo: arguments.get(0)?,
                            boo: arguments.optional(1)?,
                            num: arguments.optional(2)?,
                            check: arguments.cloned(3)?,
                        })
                    })
                    .with_constructor([
                        Parameter::new("foo").with_type(ParameterType::named("Foo")),
                        Parameter::new("boo").with_type(ParameterType::builtin("string")).nullable(),
                        Parameter::new("num")
                            .with_type(ParameterType::builtin("int"))
                            .with_default(Argument::Null),
                        Parameter::new("check")
                            .with_type(ParameterType::builtin("bool"))
                            .with_default(Argument::value(true)),
                        Parameter::new("meme").variadic(),
                    ]),
                )
                .class(Class::new("DefaultValue", |_: &Arguments| Ok(DefaultValue)).with_constructor([Parameter::new("hello")]))
                .class(
                    Class::new("OptionalClosure", |arguments: &Arguments| {
                        Ok(OptionalClosure(arguments.optional::<Instance>(0)?.is_none()))
                    })
                    .with_constructor([Parameter::new("closure")
                        .with_type(ParameterType::callable("Closure"))
                        .with_default(Argument::Null)]),
                )
                .class(
                    Class::new("RequiredClosure", |_: &Arguments| Ok(RequiredClosure))
                        .with_constructor([Parameter::new("closure").with_type(ParameterType::callable("Closure"))]),
                )
                .class(
                    Class::new("Unknown", |_: &Arguments| Ok(DefaultValue))
                        .with_constructor([Parameter::new("service").with_type(ParameterType::named("Missing"))]),
                )
                .abstract_class("Base"),
        )
    }

    enum Answer {
        Value(Instance),
        NotFound(&'static str),
        Failed,
    }

    /// Records every call and answers from fixed maps.
    #[derive(Default)]
    struct Recorder {
        has: BTreeMap<&'static str, bool>,
        get: BTreeMap<&'static str, Answer>,
        calls: RefCell<Vec<String>>,
    }

    impl Resolver for Recorder {
        fn has(&self, id: &str) -> bool {
            self.calls.borrow_mut().push(format!("has:{id}"));
            self.has.get(id).copied().unwrap_or(false)
        }

        fn get(&self, id: &str) -> Result<Instance, ResolveErrorKind> {
            self.calls.borrow_mut().push(format!("get:{id}"));
            match self.get.get(id) {
                Some(Answer::Value(dependency)) => Ok(dependency.clone()),
                Some(Answer::NotFound(missing)) => Err(ResolveErrorKind::not_found(*missing)),
                Some(Answer::Failed) => Err(ContainerErrorKind::NotConstructible { name: id.to_owned() }.into()),
                None => Err(ResolveErrorKind::not_found(id)),
            }
        }
    }

    #[test]
    #[traced_test]
    fn test_resolves_no_constructor() {
        let resolver = Recorder::default();

        let instance = AutowireFactory::for_type(catalog(), "Foo").unwrap().create(&resolver).unwrap();

        assert!(instance.downcast::<Foo>().is_ok());
        assert!(resolver.calls.borrow().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_resolves_from_container() {
        let resolver = Recorder {
            has: BTreeMap::from([("Foo", true)]),
            get: BTreeMap::from([("Foo", Answer::Value(instance(Foo)))]),
            ..Default::default()
        };

        let bar = AutowireFactory::for_type(catalog(), "Bar")
            .unwrap()
            .create(&resolver)
            .unwrap()
            .downcast::<Bar>()
            .unwrap();

        assert_eq!(
            *resolver.calls.borrow(),
            ["has:Foo", "get:Foo", "has:boo", "has:num", "has:check"].map(ToOwned::to_owned)
        );
        assert!(bar.boo.is_none());
        assert!(bar.num.is_none());
        assert!(bar.check);
    }

    #[test]
    #[traced_test]
    fn test_injects_scalar_by_parameter_name() {
        let resolver = Recorder {
            has: BTreeMap::from([("Foo", true), ("boo", true), ("num", true)]),
            get: BTreeMap::from([
                ("Foo", Answer::Value(instance(Foo))),
                ("boo", Answer::Value(instance(String::from("boo")))),
                ("num", Answer::Value(instance(5i64))),
            ]),
            ..Default::default()
        };

        let bar = AutowireFactory::for_type(catalog(), "Bar")
            .unwrap()
            .create(&resolver)
            .unwrap()
            .downcast::<Bar>()
            .unwrap();

        assert_eq!(bar.boo.as_deref().map(String::as_str), Some("boo"));
        assert_eq!(bar.num.as_deref().copied(), Some(5));
    }

    #[test]
    #[traced_test]
    fn test_fails_when_not_found_in_container() {
        let resolver = Recorder {
            has: BTreeMap::from([("Foo", true)]),
            ..Default::default()
        };

        let err = AutowireFactory::for_type(catalog(), "Bar").unwrap().create(&resolver).unwrap_err();

        match err {
            ResolveErrorKind::Container(ContainerErrorKind::UnresolvedParameter {
                position,
                name,
                class,
                expected,
                source,
            }) => {
                assert_eq!(position, 0);
                assert_eq!(name, "foo");
                assert_eq!(class, "Bar");
                assert_eq!(expected.as_deref(), Some("Foo"));
                assert!(source.unwrap().is_not_found_of("Foo"));
            }
            err => panic!("unexpected error: {err}"),
        }
        assert_eq!(*resolver.calls.borrow(), ["has:Foo", "get:Foo"].map(ToOwned::to_owned));
    }

    #[test]
    #[traced_test]
    fn test_falls_through_on_nested_not_found() {
        let resolver = Recorder {
            has: BTreeMap::from([("Foo", true)]),
            get: BTreeMap::from([("Foo", Answer::NotFound("Baz"))]),
            ..Default::default()
        };

        let err = AutowireFactory::for_type(catalog(), "Bar").unwrap().create(&resolver).unwrap_err();

        match err {
            ResolveErrorKind::Container(ContainerErrorKind::UnresolvedParameter { position, source, .. }) => {
                assert_eq!(position, 0);
                assert!(source.unwrap().is_not_found_of("Baz"));
            }
            err => panic!("unexpected error: {err}"),
        }
        assert_eq!(*resolver.calls.borrow(), ["has:Foo", "get:Foo"].map(ToOwned::to_owned));
    }

    #[test]
    #[traced_test]
    fn test_propagates_dependency_failure() {
        let resolver = Recorder {
            has: BTreeMap::from([("Foo", true)]),
            get: BTreeMap::from([("Foo", Answer::Failed)]),
            ..Default::default()
        };

        let err = AutowireFactory::for_type(catalog(), "Bar").unwrap().create(&resolver).unwrap_err();

        assert!(matches!(
            err,
            ResolveErrorKind::Container(ContainerErrorKind::Dependency { ref id, .. }) if id == "Foo"
        ));
        assert_eq!(*resolver.calls.borrow(), ["has:Foo", "get:Foo"].map(ToOwned::to_owned));
    }

    #[test]
    #[traced_test]
    fn test_fails_when_no_info_provided() {
        let resolver = Recorder::default();

        let err = AutowireFactory::for_type(catalog(), "DefaultValue")
            .unwrap()
            .create(&resolver)
            .unwrap_err();

        assert!(err.to_string().contains("Try type-hinting arguments"));
        assert_eq!(*resolver.calls.borrow(), ["has:hello"].map(ToOwned::to_owned));
    }

    #[test]
    #[traced_test]
    fn test_ignores_optional_closure() {
        let resolver = Recorder::default();

        let optional = AutowireFactory::for_type(catalog(), "OptionalClosure")
            .unwrap()
            .create(&resolver)
            .unwrap()
            .downcast::<OptionalClosure>()
            .unwrap();

        assert!(optional.0);
        assert_eq!(*resolver.calls.borrow(), ["has:closure"].map(ToOwned::to_owned));
    }

    #[test]
    #[traced_test]
    fn test_fails_on_required_closure() {
        let resolver = Recorder::default();

        let err = AutowireFactory::for_type(catalog(), "RequiredClosure")
            .unwrap()
            .create(&resolver)
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveErrorKind::Container(ContainerErrorKind::UnresolvedParameter { ref name, .. }) if name == "closure"
        ));
        assert_eq!(*resolver.calls.borrow(), ["has:closure"].map(ToOwned::to_owned));
    }

    #[test]
    #[traced_test]
    fn test_skips_lookup_of_unknown_type() {
        let resolver = Recorder::default();

        let err = AutowireFactory::for_type(catalog(), "Unknown")
            .unwrap()
            .create(&resolver)
            .unwrap_err();

        assert!(err.to_string().contains("Cannot find a service of id \"Missing\""));
        assert!(resolver.calls.borrow().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_rejects_unknown_type() {
        let err = AutowireFactory::for_type(catalog(), "Missing").unwrap_err();

        assert!(matches!(err, ContainerErrorKind::NotConstructible { ref name } if name == "Missing"));
    }

    #[test]
    #[traced_test]
    fn test_fails_on_abstract_class() {
        let resolver = Recorder::default();

        let err = AutowireFactory::for_type(catalog(), "Base").unwrap().create(&resolver).unwrap_err();

        assert!(matches!(
            err,
            ResolveErrorKind::Container(ContainerErrorKind::Reflection {
                source: ReflectionErrorKind::Abstract { .. },
                ..
            })
        ));
    }

    #[test]
    #[traced_test]
    fn test_passes_constructor_error() {
        let reflection: Arc<dyn Reflection> = Arc::new(TypeCatalog::new().class(Class::new("Broken", |_: &Arguments| {
            Err::<Foo, _>(anyhow::anyhow!("boom"))
        })));

        let err = AutowireFactory::for_type(reflection, "Broken")
            .unwrap()
            .create(&Recorder::default())
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveErrorKind::Container(ContainerErrorKind::Instantiate { ref class, .. }) if class == "Broken"
        ));
    }

    #[test]
    fn test_variadic_is_never_populated() {
        let reflection: Arc<dyn Reflection> = Arc::new(TypeCatalog::new().class(
            Class::new("Variadic", |arguments: &Arguments| Ok(arguments.len()))
                .with_constructor([Parameter::new("items").variadic()]),
        ));

        let len = AutowireFactory::for_type(reflection, "Variadic")
            .unwrap()
            .create(&Recorder::default())
            .unwrap()
            .downcast::<usize>()
            .unwrap();

        assert_eq!(*len, 0);
    }
}
