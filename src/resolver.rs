use crate::{any::Instance, errors::ResolveErrorKind};

/// Read side of the container, the only thing the autowire factory needs to resolve constructor parameters.
pub trait Resolver {
    /// Must agree with [`Resolver::get`]: when this returns `true`, `get` may only fail with a not-found error of `id`
    /// if registrations changed in between.
    #[must_use]
    fn has(&self, id: &str) -> bool;

    /// # Errors
    /// Returns [`ResolveErrorKind::NotFound`] if nothing can be resolved for `id`,
    /// or a [`ResolveErrorKind::Container`] error if resolution itself failed.
    fn get(&self, id: &str) -> Result<Instance, ResolveErrorKind>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    #[inline]
    fn has(&self, id: &str) -> bool {
        (**self).has(id)
    }

    #[inline]
    fn get(&self, id: &str) -> Result<Instance, ResolveErrorKind> {
        (**self).get(id)
    }
}
