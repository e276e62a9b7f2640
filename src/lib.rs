#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod arguments;
pub(crate) mod autowire;
pub(crate) mod catalog;
pub(crate) mod concrete;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod decorator;
pub(crate) mod definition;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod inflector;
pub(crate) mod reflection;
pub(crate) mod resolver;
pub(crate) mod service;

pub use any::{instance, Instance, Services};
pub use arguments::{Argument, Arguments};
pub use autowire::AutowireFactory;
pub use catalog::TypeCatalog;
pub use concrete::Concrete;
pub use config::{Config, Flags};
pub use container::Container;
pub use definition::ServiceDefinition;
pub use errors::{ArgumentErrorKind, ContainerErrorKind, ReflectionErrorKind, ResolveErrorKind};
pub use factory::Factory;
pub use reflection::{Class, Parameter, ParameterType, Reflection};
pub use resolver::Resolver;
