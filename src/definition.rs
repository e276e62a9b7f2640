use alloc::{string::String, vec::Vec};
use core::fmt::{self, Debug, Formatter};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    any::Instance,
    decorator::BoxedCloneDecorator,
    errors::{ContainerErrorKind, ResolveErrorKind},
    factory::Factory,
    inflector::BoxedCloneInflector,
    service::Service as _,
    Container,
};

struct DefinitionState {
    factory: Option<Factory>,
    cache: bool,
    instance: Option<Instance>,
    inflectors: Vec<BoxedCloneInflector>,
    decorators: Vec<BoxedCloneDecorator>,
}

/// One service of the container: its factory, cached instance, inflectors and decorators.
///
/// A definition is shared between all identifiers aliased to it.
/// The internal lock is never held while a factory, inflector or decorator runs.
pub struct ServiceDefinition {
    id: String,
    state: Mutex<DefinitionState>,
}

impl ServiceDefinition {
    #[must_use]
    pub fn new(id: impl Into<String>, cache: bool) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(DefinitionState {
                factory: None,
                cache,
                instance: None,
                inflectors: Vec::new(),
                decorators: Vec::new(),
            }),
        }
    }

    /// Definition that already has its factory, so it can't be registered again.
    #[must_use]
    pub(crate) fn with_factory(id: impl Into<String>, factory: Factory, cache: bool) -> Self {
        let mut definition = Self::new(id, cache);
        definition.state.get_mut().factory = Some(factory);
        definition
    }

    /// Identifier the definition was created for, aliases not included.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the resolution function. A factory can be set only once.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if the definition already has a factory.
    pub fn set_factory(&self, factory: Factory) -> Result<(), ContainerErrorKind> {
        let mut state = self.state.lock();
        if state.factory.is_some() {
            let err = ContainerErrorKind::AlreadyRegistered { id: self.id.clone() };
            warn!("{}", err);
            return Err(err);
        }
        state.factory = Some(factory);
        Ok(())
    }

    #[inline]
    pub fn set_cache(&self, cache: bool) {
        self.state.lock().cache = cache;
    }

    #[inline]
    #[must_use]
    pub fn has_factory(&self) -> bool {
        self.state.lock().factory.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state.lock().instance.is_some()
    }

    #[inline]
    pub(crate) fn add_inflector(&self, inflector: BoxedCloneInflector) {
        self.state.lock().inflectors.push(inflector);
    }

    #[inline]
    pub(crate) fn add_decorator(&self, decorator: BoxedCloneDecorator) {
        self.state.lock().decorators.push(decorator);
    }

    /// Returns the cached instance, or runs the factory, every inflector and then every decorator in registration order.
    ///
    /// Inflectors all see the factory output. Each decorator receives the output of the previous one.
    /// The final value is cached if caching is enabled.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotFound`] if no factory is set
    /// - Any error of the factory, inflectors or decorators
    pub fn resolve(&self, container: &Container) -> Result<Instance, ResolveErrorKind> {
        let (factory, inflectors, decorators) = {
            let state = self.state.lock();
            if let Some(instance) = &state.instance {
                debug!("Found in cache");
                return Ok(instance.clone());
            }
            debug!("Not found in cache");

            let Some(factory) = state.factory.clone() else {
                return Err(ResolveErrorKind::not_found(self.id.clone()));
            };
            (factory, state.inflectors.clone(), state.decorators.clone())
        };

        let mut instance = factory.call(container)?;

        for mut inflector in inflectors {
            inflector.call((instance.clone(), container.clone()))?;
        }

        for mut decorator in decorators {
            instance = decorator.call((instance, container.clone()))?;
        }

        let mut state = self.state.lock();
        if state.cache {
            state.instance = Some(instance.clone());
            debug!("Cached");
        }

        Ok(instance)
    }

    /// Drops the cached instance, the next resolution runs the whole pipeline again.
    #[inline]
    pub fn refresh(&self) {
        if self.state.lock().instance.take().is_some() {
            debug!(id = %self.id, "Refreshed");
        }
    }
}

impl Debug for ServiceDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ServiceDefinition")
            .field("id", &self.id)
            .field("has_factory", &state.factory.is_some())
            .field("cache", &state.cache)
            .field("resolved", &state.instance.is_some())
            .field("inflectors", &state.inflectors.len())
            .field("decorators", &state.decorators.len())
            .finish()
    }
}
