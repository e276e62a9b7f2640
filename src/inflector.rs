use alloc::{boxed::Box, string::String};
use core::any::type_name;

use crate::{
    any::Instance,
    errors::{ContainerErrorKind, ResolveErrorKind},
    service::{service_fn, BoxCloneService},
    Container,
};

/// Observes or mutates a freshly created instance in place. The return value of the service is discarded.
pub(crate) type BoxedCloneInflector = BoxCloneService<(Instance, Container), (), ResolveErrorKind>;

#[must_use]
pub(crate) fn boxed_inflector<Dep, F>(id: String, mut inflector: F) -> BoxedCloneInflector
where
    Dep: Send + Sync + 'static,
    F: FnMut(&Dep, &Container) -> Result<(), ResolveErrorKind> + Clone + Send + Sync + 'static,
{
    BoxCloneService(Box::new(service_fn(move |(dependency, container): (Instance, Container)| {
        let Some(dependency) = dependency.downcast_ref::<Dep>() else {
            return Err(ContainerErrorKind::IncorrectType {
                id: id.clone(),
                expected: type_name::<Dep>(),
            }
            .into());
        };
        inflector(dependency, &container)
    })))
}
