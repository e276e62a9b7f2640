//! Constructor introspection consumed by the autowire factory.
//!
//! The container never inspects types itself: it asks a [`Reflection`] implementation whether a name denotes a class
//! or an interface, and for the constructor signature of a class. [`crate::TypeCatalog`] is the bundled implementation.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt::{self, Debug, Display, Formatter};

use crate::{
    any::Instance,
    arguments::{Argument, Arguments},
    errors::ReflectionErrorKind,
};

pub trait Reflection: Send + Sync + 'static {
    /// Whether `name` denotes a class, including abstract ones and ones with an inaccessible constructor.
    #[must_use]
    fn class_exists(&self, name: &str) -> bool;

    #[must_use]
    fn interface_exists(&self, name: &str) -> bool;

    /// Describes an instantiable class.
    ///
    /// # Errors
    /// Fails if the class is unknown, abstract or its constructor is not accessible.
    fn reflect(&self, name: &str) -> Result<Class, ReflectionErrorKind>;
}

impl<R: Reflection + ?Sized> Reflection for Arc<R> {
    #[inline]
    fn class_exists(&self, name: &str) -> bool {
        (**self).class_exists(name)
    }

    #[inline]
    fn interface_exists(&self, name: &str) -> bool {
        (**self).interface_exists(name)
    }

    #[inline]
    fn reflect(&self, name: &str) -> Result<Class, ReflectionErrorKind> {
        (**self).reflect(name)
    }
}

type BoxedInstantiate = Arc<dyn Fn(&Arguments) -> anyhow::Result<Instance> + Send + Sync>;

/// An instantiable class: its constructor signature and the function building it from positional arguments.
#[derive(Clone)]
pub struct Class {
    name: String,
    constructor: Option<Vec<Parameter>>,
    instantiate: BoxedInstantiate,
}

impl Class {
    /// Class without a declared constructor, `instantiate` receives no arguments.
    #[must_use]
    pub fn new<T, F>(name: impl Into<String>, instantiate: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: None,
            instantiate: Arc::new(move |arguments: &Arguments| instantiate(arguments).map(|instance| Arc::new(instance) as Instance)),
        }
    }

    /// Declares the constructor parameters. Positions follow the iteration order.
    #[must_use]
    pub fn with_constructor(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.constructor = Some(
            parameters
                .into_iter()
                .enumerate()
                .map(|(position, parameter)| Parameter { position, ..parameter })
                .collect(),
        );
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` if the class has no declared constructor.
    #[inline]
    #[must_use]
    pub fn constructor(&self) -> Option<&[Parameter]> {
        self.constructor.as_deref()
    }

    /// # Errors
    /// Propagates the error of the instantiate function.
    #[inline]
    pub fn new_instance(&self, arguments: &Arguments) -> anyhow::Result<Instance> {
        (self.instantiate)(arguments)
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("constructor", &self.constructor)
            .finish_non_exhaustive()
    }
}

/// Declared type of a constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterType {
    /// Scalar or other built-in type, e.g. `int` or `string`.
    Builtin(String),
    /// A class or interface.
    Named(String),
    /// Anonymous or closure-like type. Resolved by parameter name like builtins.
    Callable(String),
}

impl ParameterType {
    #[inline]
    #[must_use]
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::Builtin(name.into())
    }

    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[inline]
    #[must_use]
    pub fn callable(name: impl Into<String>) -> Self {
        Self::Callable(name.into())
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(name) | Self::Named(name) | Self::Callable(name) => name,
        }
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub struct Parameter {
    name: String,
    position: usize,
    ty: Option<ParameterType>,
    nullable: bool,
    optional: bool,
    variadic: bool,
    default: Option<Argument>,
}

impl Parameter {
    /// Untyped, required parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 0,
            ty: None,
            nullable: false,
            optional: false,
            variadic: false,
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_type(mut self, ty: ParameterType) -> Self {
        self.ty = Some(ty);
        self
    }

    /// The declared type accepts null.
    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The parameter can be omitted and is then bound to null.
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self.optional = true;
        self
    }

    /// A default value makes the parameter optional. A null default also makes its type nullable.
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: Argument) -> Self {
        if default.is_null() {
            self.nullable = true;
        }
        self.default = Some(default);
        self.optional = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub const fn ty(&self) -> Option<&ParameterType> {
        self.ty.as_ref()
    }

    /// Untyped parameters never report null as allowed.
    #[inline]
    #[must_use]
    pub const fn allows_null(&self) -> bool {
        self.ty.is_some() && self.nullable
    }

    #[inline]
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    #[inline]
    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        self.variadic
    }

    #[inline]
    #[must_use]
    pub const fn default_value(&self) -> Option<&Argument> {
        self.default.as_ref()
    }
}
