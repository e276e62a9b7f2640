use alloc::{
    collections::BTreeMap,
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::{
    any::type_name,
    cell::RefCell,
    fmt::{self, Debug, Formatter},
};
use parking_lot::ReentrantMutex;
use tracing::{debug, debug_span, error, info_span, warn};

use crate::{
    any::{Instance, Services, TypeInfo},
    autowire::AutowireFactory,
    concrete::Concrete,
    config::{Config, Flags},
    decorator::{boxed_decorator, boxed_instance_decorator},
    definition::ServiceDefinition,
    errors::{ContainerErrorKind, ResolveErrorKind},
    factory::Factory,
    inflector::boxed_inflector,
    reflection::Reflection,
    resolver::Resolver,
};

#[derive(Default)]
struct State {
    definitions: BTreeMap<String, Arc<ServiceDefinition>>,
    /// Identifiers currently being resolved, outermost first.
    resolving: Vec<String>,
}

struct ContainerInner {
    flags: Flags,
    reflection: Arc<dyn Reflection>,
    /// Serialises every operation. Re-entrant, because factories resolve their own dependencies from the same thread.
    /// The cell is never borrowed while user callbacks run.
    state: ReentrantMutex<RefCell<State>>,
}

/// Runtime service registry.
///
/// Maps string identifiers to [`ServiceDefinition`]s and falls back to constructor autowiring through the
/// [`Reflection`] capability, depending on the [`Flags`] it was created with.
///
/// The container is a cheap handle: clones share the same registrations.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{Arguments, Class, Container, Flags, Parameter, ParameterType, TypeCatalog};
///
/// struct Config {
///     dsn: String,
/// }
///
/// struct Database(Arc<Config>);
///
/// let catalog = TypeCatalog::new().interface("Config").class(
///     Class::new("Database", |arguments: &Arguments| Ok(Database(arguments.get(0)?)))
///         .with_constructor([Parameter::new("config").with_type(ParameterType::named("Config"))]),
/// );
///
/// let container = Container::boot(catalog);
/// container
///     .register_factory("Config", |_| Ok(Config { dsn: "sqlite::memory:".into() }))
///     .unwrap();
///
/// let database = container.get_as::<Database>("Database").unwrap();
/// assert_eq!(database.0.dsn, "sqlite::memory:");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// Identifier the container registers itself under with [`Flags::REGISTER_CONTAINER`].
    pub const ID: &'static str = "wirebox::Container";

    #[must_use]
    pub fn new(flags: Flags, reflection: impl Reflection) -> Self {
        let container = Self {
            inner: Arc::new(ContainerInner {
                flags,
                reflection: Arc::new(reflection),
                state: ReentrantMutex::new(RefCell::new(State::default())),
            }),
        };

        if flags.contains(Flags::REGISTER_CONTAINER) {
            // A factory instead of a stored value, so the container doesn't own a handle to itself
            let factory = Factory::new(|container: &Container| Ok(container.clone()));
            let definition = ServiceDefinition::with_factory(Self::ID, factory, false);
            container.inner.state.lock().borrow_mut().definitions.insert(Self::ID.to_string(), Arc::new(definition));
        }

        container
    }

    /// Creates container with [`Flags::default`].
    #[inline]
    #[must_use]
    pub fn boot(reflection: impl Reflection) -> Self {
        Self::new(Flags::default(), reflection)
    }

    /// Creates container and registers every `(id, factory)` pair.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if an identifier is repeated.
    pub fn from_factories<I, K>(factories: I, flags: Flags, reflection: impl Reflection) -> Result<Self, ContainerErrorKind>
    where
        I: IntoIterator<Item = (K, Factory)>,
        K: Into<String>,
    {
        let container = Self::new(flags, reflection);
        for (id, factory) in factories {
            container.register(id, Concrete::Factory(factory))?;
        }
        Ok(container)
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.inner.flags
    }

    /// Resolves a service.
    ///
    /// Registered definitions are resolved through their pipeline. Otherwise, with [`Flags::EXTRA_LAZY_BINDING`],
    /// a known class is autowired on the fly; such instances are never cached.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotFound`] if nothing can be resolved for `id`
    /// - [`ContainerErrorKind::CircularDependency`] if `id` is requested again while it is being resolved
    /// - Any error of the resolution itself
    pub fn get(&self, id: &str) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("get", id);
        let _span_guard = span.enter();

        let guard = self.inner.state.lock();
        let _resolving = Resolving::enter(&guard, id).map_err(|err| {
            error!("{}", err);
            err
        })?;

        if let Some(definition) = Self::registered(&guard, id) {
            return definition.resolve(self);
        }
        if self.can_reflect(id) {
            debug!("Autowiring unregistered class");
            return AutowireFactory::for_type(self.inner.reflection.clone(), id)?.create(self);
        }

        let err = ResolveErrorKind::not_found(id);
        warn!("{}", err);
        Err(err)
    }

    /// Resolves a service and downcasts it.
    ///
    /// # Errors
    /// Same as [`Self::get`], and [`ContainerErrorKind::IncorrectType`] if the service isn't a `Dep`.
    pub fn get_as<Dep: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<Dep>, ResolveErrorKind> {
        let span = debug_span!("get_as", dependency = TypeInfo::of::<Dep>().short_name());
        let _guard = span.enter();

        self.get(id)?.downcast::<Dep>().map_err(|_| {
            let err = ContainerErrorKind::IncorrectType {
                id: id.to_string(),
                expected: type_name::<Dep>(),
            };
            error!("{}", err);
            err.into()
        })
    }

    /// Resolves a tag created with [`Self::tag`].
    ///
    /// # Errors
    /// Same as [`Self::get_as`].
    #[inline]
    pub fn get_tagged(&self, tag: &str) -> Result<Arc<Services>, ResolveErrorKind> {
        self.get_as::<Services>(tag)
    }

    /// Whether [`Self::get`] can resolve `id` right now.
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        let guard = self.inner.state.lock();
        Self::registered(&guard, id).is_some() || self.can_reflect(id)
    }

    /// Registers a service with the container default cache mode.
    ///
    /// With [`Flags::LAZY_BINDING`], a [`Concrete::Type`] naming a known class, or a [`Concrete::Absent`] for an
    /// identifier naming a known class, is resolved with the [`AutowireFactory`].
    /// A [`Concrete::Absent`] otherwise only reserves the identifier.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    #[inline]
    pub fn register(&self, id: impl Into<String>, concrete: impl Into<Concrete>) -> Result<&Self, ContainerErrorKind> {
        self.register_with_config(id, concrete, Config::from_flags(self.inner.flags))
    }

    /// Same as [`Self::register`], with an explicit cache mode for this service.
    /// Values are never cached by the definition, the same instance is returned anyway.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    pub fn register_with_config(
        &self,
        id: impl Into<String>,
        concrete: impl Into<Concrete>,
        config: Config,
    ) -> Result<&Self, ContainerErrorKind> {
        let id = id.into();
        let span = debug_span!("register", id = %id);
        let _span_guard = span.enter();

        let _guard = self.inner.state.lock();
        let definition = self.definition(&id);
        if definition.has_factory() {
            let err = ContainerErrorKind::AlreadyRegistered { id };
            warn!("{}", err);
            return Err(err);
        }

        let lazy = self.inner.flags.contains(Flags::LAZY_BINDING);
        let (factory, cache) = match concrete.into() {
            Concrete::Factory(factory) => (factory, config.cache_provides),
            Concrete::Type(name) if lazy && self.inner.reflection.class_exists(&name) => {
                debug!(class = %name, "Bound to autowired class");
                (self.autowire(name)?.into_factory(), config.cache_provides)
            }
            Concrete::Type(name) => (Factory::constant(Arc::new(name)), false),
            Concrete::Value(instance) => (Factory::constant(instance), false),
            Concrete::Absent if lazy && self.inner.reflection.class_exists(&id) => {
                debug!("Bound to autowired class");
                (self.autowire(id.clone())?.into_factory(), config.cache_provides)
            }
            Concrete::Absent => {
                debug!("Reserved");
                return Ok(self);
            }
        };

        definition.set_factory(factory)?;
        definition.set_cache(cache);
        debug!(cache, "Registered");

        Ok(self)
    }

    /// Registers a factory building a new `Dep` on each uncached resolution.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    #[inline]
    pub fn register_factory<F, Dep>(&self, id: impl Into<String>, factory: F) -> Result<&Self, ContainerErrorKind>
    where
        F: FnMut(&Container) -> Result<Dep, ResolveErrorKind> + Clone + Send + Sync + 'static,
        Dep: Send + Sync + 'static,
    {
        self.register(id, Factory::new(factory))
    }

    /// Registers an already built value.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    #[inline]
    pub fn register_value<Dep: Send + Sync + 'static>(&self, id: impl Into<String>, value: Dep) -> Result<&Self, ContainerErrorKind> {
        self.register(id, Concrete::value(value))
    }

    /// Registers an already shared instance, keeping its identity.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    #[inline]
    pub fn register_instance(&self, id: impl Into<String>, instance: Instance) -> Result<&Self, ContainerErrorKind> {
        self.register(id, Concrete::Value(instance))
    }

    /// Binds `id` to a class name, see [`Concrete::Type`].
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    #[inline]
    pub fn register_type(&self, id: impl Into<String>, class: impl Into<String>) -> Result<&Self, ContainerErrorKind> {
        self.register(id, Concrete::Type(class.into()))
    }

    /// Registers `id` with no concrete, see [`Concrete::Absent`].
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `id` already has a factory.
    #[inline]
    pub fn bind(&self, id: impl Into<String>) -> Result<&Self, ContainerErrorKind> {
        self.register(id, Concrete::Absent)
    }

    /// Adds an inflector, run on every fresh instance of `id` after the factory and before decorators.
    pub fn inflect<Dep, F>(&self, id: impl Into<String>, inflector: F) -> &Self
    where
        Dep: Send + Sync + 'static,
        F: FnMut(&Dep, &Container) -> Result<(), ResolveErrorKind> + Clone + Send + Sync + 'static,
    {
        let id = id.into();
        let _guard = self.inner.state.lock();
        self.definition(&id).add_inflector(boxed_inflector(id, inflector));
        self
    }

    /// Adds a decorator, replacing every fresh instance of `id` by its output. Decorators are chained in order.
    pub fn decorate<Dep, Out, F>(&self, id: impl Into<String>, decorator: F) -> &Self
    where
        Dep: Send + Sync + 'static,
        Out: Send + Sync + 'static,
        F: FnMut(Arc<Dep>, &Container) -> Result<Arc<Out>, ResolveErrorKind> + Clone + Send + Sync + 'static,
    {
        let id = id.into();
        let _guard = self.inner.state.lock();
        self.definition(&id).add_decorator(boxed_decorator(id, decorator));
        self
    }

    /// Makes `alias` resolve the same definition as `id`. Both names share factory, cache, inflectors and decorators.
    pub fn alias(&self, id: impl Into<String>, alias: impl Into<String>) -> &Self {
        let id = id.into();
        let alias = alias.into();
        debug!(id = %id, alias = %alias, "Aliased");

        let guard = self.inner.state.lock();
        let definition = self.definition(&id);
        guard.borrow_mut().definitions.insert(alias, definition);
        self
    }

    /// Creates `tag` resolving to the ordered [`Services`] of every id in `ids`,
    /// each resolved through its own definition.
    ///
    /// # Errors
    /// Returns [`ContainerErrorKind::AlreadyRegistered`] if `tag` already has a factory.
    pub fn tag(&self, tag: impl Into<String>, ids: impl IntoIterator<Item = impl Into<String>>) -> Result<&Self, ContainerErrorKind> {
        let tag = tag.into();
        let span = debug_span!("tag", tag = %tag);
        let _span_guard = span.enter();

        let _guard = self.inner.state.lock();
        let definition = self.definition(&tag);
        definition.set_factory(Factory::new(|_: &Container| Ok(Services::new())))?;

        for id in ids {
            let id = id.into();
            debug!(id = %id, "Tagged");

            let tag = tag.clone();
            definition.add_decorator(boxed_instance_decorator(move |services: Instance, container: &Container| {
                let services = services.downcast::<Services>().map_err(|_| ContainerErrorKind::IncorrectType {
                    id: tag.clone(),
                    expected: type_name::<Services>(),
                })?;
                let mut services = Arc::unwrap_or_clone(services);
                services.push(container.get(&id)?);
                Ok(Arc::new(services) as Instance)
            }));
        }

        Ok(self)
    }

    /// Drops the cached instances of `ids`.
    pub fn refresh(&self, ids: impl IntoIterator<Item = impl Into<String>>) -> &Self {
        let _guard = self.inner.state.lock();
        for id in ids {
            self.definition(&id.into()).refresh();
        }
        self
    }

    /// Calls `provider` with the container, to group registrations.
    ///
    /// # Errors
    /// Returns the error of `provider`.
    pub fn provide<F>(&self, provider: F) -> Result<&Self, ContainerErrorKind>
    where
        F: FnOnce(&Self) -> Result<(), ContainerErrorKind>,
    {
        let _guard = self.inner.state.lock();
        provider(self)?;
        Ok(self)
    }
}

impl Container {
    /// Gets or creates the definition of `id`.
    fn definition(&self, id: &str) -> Arc<ServiceDefinition> {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if let Some(definition) = state.definitions.get(id) {
            return definition.clone();
        }

        let definition = Arc::new(ServiceDefinition::new(id, self.inner.flags.contains(Flags::CACHE_MODE)));
        state.definitions.insert(id.to_string(), definition.clone());
        definition
    }

    fn registered(state: &RefCell<State>, id: &str) -> Option<Arc<ServiceDefinition>> {
        state
            .borrow()
            .definitions
            .get(id)
            .filter(|definition| definition.has_factory())
            .cloned()
    }

    fn can_reflect(&self, id: &str) -> bool {
        self.inner.flags.contains(Flags::EXTRA_LAZY_BINDING) && self.inner.reflection.class_exists(id)
    }

    fn autowire(&self, class: String) -> Result<AutowireFactory, ContainerErrorKind> {
        AutowireFactory::for_type(self.inner.reflection.clone(), class)
    }
}

impl Resolver for Container {
    #[inline]
    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }

    #[inline]
    fn get(&self, id: &str) -> Result<Instance, ResolveErrorKind> {
        Container::get(self, id)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        f.debug_struct("Container")
            .field("flags", &self.inner.flags)
            .field("definitions", &state.definitions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Marks an identifier as being resolved until dropped.
struct Resolving<'a> {
    state: &'a RefCell<State>,
}

impl<'a> Resolving<'a> {
    fn enter(state: &'a RefCell<State>, id: &str) -> Result<Self, ContainerErrorKind> {
        let mut state_mut = state.borrow_mut();
        if state_mut.resolving.iter().any(|resolving| resolving == id) {
            let mut path = state_mut.resolving.clone();
            path.push(id.to_string());
            return Err(ContainerErrorKind::CircularDependency { path });
        }
        state_mut.resolving.push(id.to_string());

        Ok(Self { state })
    }
}

impl Drop for Resolving<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().resolving.pop();
    }
}
