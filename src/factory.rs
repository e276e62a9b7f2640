use alloc::{boxed::Box, sync::Arc};
use tracing::debug;

use crate::{
    any::Instance,
    errors::ResolveErrorKind,
    service::{service_fn, BoxCloneService, Service as _},
    Container,
};

pub(crate) type BoxedCloneFactory = BoxCloneService<Container, Instance, ResolveErrorKind>;

/// Resolution function of a service definition.
///
/// Factories receive the container they are resolved from, so they can fetch their own dependencies.
#[derive(Clone)]
pub struct Factory {
    inner: BoxedCloneFactory,
}

impl Factory {
    /// Wraps a function returning an owned value. Every call produces a fresh [`Instance`].
    ///
    /// Each resolution calls a fresh clone of `factory`, so state captured by value is reset on every call.
    /// Share it through an `Arc` to keep it between resolutions.
    #[inline]
    #[must_use]
    pub fn new<F, T>(mut factory: F) -> Self
    where
        F: FnMut(&Container) -> Result<T, ResolveErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::shared(move |container: &Container| factory(container).map(Arc::new))
    }

    /// Wraps a function returning an already shared value, keeping its identity.
    #[inline]
    #[must_use]
    pub fn shared<F, T>(mut factory: F) -> Self
    where
        F: FnMut(&Container) -> Result<Arc<T>, ResolveErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::from_instance_fn(move |container: &Container| factory(container).map(|dependency| dependency as Instance))
    }

    #[must_use]
    pub(crate) fn from_instance_fn<F>(mut factory: F) -> Self
    where
        F: FnMut(&Container) -> Result<Instance, ResolveErrorKind> + Clone + Send + Sync + 'static,
    {
        Self {
            inner: BoxCloneService(Box::new(service_fn(move |container: Container| {
                let dependency = factory(&container)?;

                debug!("Resolved");

                Ok(dependency)
            }))),
        }
    }

    /// Factory returning the same instance on every call.
    #[inline]
    #[must_use]
    pub(crate) fn constant(instance: Instance) -> Self {
        Self::from_instance_fn(move |_: &Container| Ok(instance.clone()))
    }

    #[inline]
    pub(crate) fn call(&self, container: &Container) -> Result<Instance, ResolveErrorKind> {
        self.inner.clone().call(container.clone())
    }
}
