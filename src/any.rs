use alloc::{sync::Arc, vec::Vec};
use core::any::{type_name, Any};

/// A resolved, type-erased service shared by everything that resolved it.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Value of a tag: the resolved services in tagging order.
pub type Services = Vec<Instance>;

#[inline]
#[must_use]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    Arc::new(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TypeInfo {
    pub(crate) name: &'static str,
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub(crate) fn of<T: ?Sized + 'static>() -> Self {
        Self { name: type_name::<T>() }
    }

    #[inline]
    #[must_use]
    pub(crate) fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}
