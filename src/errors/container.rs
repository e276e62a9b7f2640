use alloc::{boxed::Box, string::String, vec::Vec};
use core::fmt::{self, Display, Formatter};

use super::{reflection::ReflectionErrorKind, resolve::ResolveErrorKind};

/// Configuration errors, i.e. everything that will fail again on retry until registrations change.
#[derive(thiserror::Error, Debug)]
pub enum ContainerErrorKind {
    #[error("Service {id} has already been registered")]
    AlreadyRegistered { id: String },
    #[error(
        "Could not resolve argument #{position} (${name}) of method {class}::new. {}",
        UnresolvedHint(.expected.as_deref())
    )]
    UnresolvedParameter {
        position: usize,
        name: String,
        class: String,
        expected: Option<String>,
        #[source]
        source: Option<Box<ResolveErrorKind>>,
    },
    #[error("Underlying container could not resolve service \"{id}\"")]
    Dependency {
        id: String,
        #[source]
        source: Box<ResolveErrorKind>,
    },
    #[error("Could not reflect class {class}")]
    Reflection {
        class: String,
        #[source]
        source: ReflectionErrorKind,
    },
    #[error("Error while instantiating class {class}")]
    Instantiate {
        class: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Type {name} passed to the autowire factory must be an existing class")]
    NotConstructible { name: String },
    #[error("Service \"{id}\" is not of type {expected}")]
    IncorrectType { id: String, expected: &'static str },
    #[error("Circular dependency detected: {}", Path(.path))]
    CircularDependency { path: Vec<String> },
    #[error(transparent)]
    Factory(anyhow::Error),
}

struct UnresolvedHint<'a>(Option<&'a str>);

impl Display for UnresolvedHint<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(
                f,
                "Try type-hinting arguments to help reflection resolution or register a proper factory in the container."
            ),
            Some(expected) => write!(
                f,
                "Cannot find a service of id \"{expected}\" in the service container. Maybe you forgot to register it in the container?"
            ),
        }
    }
}

struct Path<'a>(&'a [String]);

impl Display for Path<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, id) in self.0.iter().enumerate() {
            if index != 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
