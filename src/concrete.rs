use alloc::{string::String, sync::Arc};

use crate::{any::Instance, factory::Factory};

/// What an identifier is registered to, decided once at registration time.
#[derive(Clone)]
pub enum Concrete {
    /// Resolution function.
    Factory(Factory),
    /// Already built value, returned as is on every resolution.
    Value(Instance),
    /// Type name. With lazy binding it's autowired if it denotes a known class, otherwise it's a plain string value.
    Type(String),
    /// Nothing yet. With lazy binding the identifier itself is autowired if it denotes a known class,
    /// otherwise only the name is reserved.
    Absent,
}

impl Concrete {
    #[inline]
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn type_name(name: impl Into<String>) -> Self {
        Self::Type(name.into())
    }
}

impl From<Factory> for Concrete {
    #[inline]
    fn from(factory: Factory) -> Self {
        Self::Factory(factory)
    }
}

impl From<Instance> for Concrete {
    #[inline]
    fn from(instance: Instance) -> Self {
        Self::Value(instance)
    }
}

impl<T: Into<Concrete>> From<Option<T>> for Concrete {
    #[inline]
    fn from(concrete: Option<T>) -> Self {
        concrete.map_or(Self::Absent, Into::into)
    }
}
