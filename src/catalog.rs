use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::{String, ToString as _},
};

use crate::{
    errors::ReflectionErrorKind,
    reflection::{Class, Reflection},
};

#[derive(Clone)]
enum Entry {
    Concrete(Class),
    Abstract,
    PrivateConstructor,
}

/// In-memory [`Reflection`]: every type the container may autowire is declared up front.
///
/// # Examples
/// ```rust
/// use wirebox::{Arguments, Class, Parameter, ParameterType, TypeCatalog};
///
/// struct Foo;
/// struct Bar(std::sync::Arc<Foo>);
///
/// let catalog = TypeCatalog::new()
///     .class(Class::new("Foo", |_: &Arguments| Ok(Foo)))
///     .class(
///         Class::new("Bar", |arguments: &Arguments| Ok(Bar(arguments.get(0)?)))
///             .with_constructor([Parameter::new("foo").with_type(ParameterType::named("Foo"))]),
///     );
/// ```
#[derive(Clone, Default)]
pub struct TypeCatalog {
    classes: BTreeMap<String, Entry>,
    interfaces: BTreeSet<String>,
}

impl TypeCatalog {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            interfaces: BTreeSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn class(mut self, class: Class) -> Self {
        self.classes.insert(class.name().to_string(), Entry::Concrete(class));
        self
    }

    /// Declares a class that exists but can't be instantiated.
    #[inline]
    #[must_use]
    pub fn abstract_class(mut self, name: impl Into<String>) -> Self {
        self.classes.insert(name.into(), Entry::Abstract);
        self
    }

    /// Declares a class whose constructor is not accessible from the container.
    #[inline]
    #[must_use]
    pub fn private_class(mut self, name: impl Into<String>) -> Self {
        self.classes.insert(name.into(), Entry::PrivateConstructor);
        self
    }

    #[inline]
    #[must_use]
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.insert(name.into());
        self
    }
}

impl Reflection for TypeCatalog {
    #[inline]
    fn class_exists(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    #[inline]
    fn interface_exists(&self, name: &str) -> bool {
        self.interfaces.contains(name)
    }

    fn reflect(&self, name: &str) -> Result<Class, ReflectionErrorKind> {
        match self.classes.get(name) {
            Some(Entry::Concrete(class)) => Ok(class.clone()),
            Some(Entry::Abstract) => Err(ReflectionErrorKind::Abstract { name: name.to_string() }),
            Some(Entry::PrivateConstructor) => Err(ReflectionErrorKind::PrivateConstructor { name: name.to_string() }),
            None => Err(ReflectionErrorKind::UnknownType { name: name.to_string() }),
        }
    }
}
