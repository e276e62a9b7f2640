use alloc::{boxed::Box, string::String, sync::Arc};
use core::any::type_name;

use crate::{
    any::Instance,
    errors::{ContainerErrorKind, ResolveErrorKind},
    service::{service_fn, BoxCloneService},
    Container,
};

/// Replaces an instance with another one, usually a wrapper around it.
pub(crate) type BoxedCloneDecorator = BoxCloneService<(Instance, Container), Instance, ResolveErrorKind>;

#[must_use]
pub(crate) fn boxed_decorator<Dep, Out, F>(id: String, mut decorator: F) -> BoxedCloneDecorator
where
    Dep: Send + Sync + 'static,
    Out: Send + Sync + 'static,
    F: FnMut(Arc<Dep>, &Container) -> Result<Arc<Out>, ResolveErrorKind> + Clone + Send + Sync + 'static,
{
    boxed_instance_decorator(move |dependency: Instance, container: &Container| {
        let dependency = dependency.downcast::<Dep>().map_err(|_| ContainerErrorKind::IncorrectType {
            id: id.clone(),
            expected: type_name::<Dep>(),
        })?;
        decorator(dependency, container).map(|decorated| decorated as Instance)
    })
}

#[must_use]
pub(crate) fn boxed_instance_decorator<F>(mut decorator: F) -> BoxedCloneDecorator
where
    F: FnMut(Instance, &Container) -> Result<Instance, ResolveErrorKind> + Clone + Send + Sync + 'static,
{
    BoxCloneService(Box::new(service_fn(move |(dependency, container): (Instance, Container)| {
        decorator(dependency, &container)
    })))
}
