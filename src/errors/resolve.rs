use alloc::string::String;

use super::{arguments::ArgumentErrorKind, container::ContainerErrorKind};

/// Error returned by every resolution path of the container.
///
/// [`ResolveErrorKind::NotFound`] is the only recoverable kind: the autowire factory treats
/// it as "try the next policy branch". Everything else is a configuration problem.
#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Service \"{id}\" not found in container")]
    NotFound { id: String },
    #[error(transparent)]
    Container(#[from] ContainerErrorKind),
}

impl ResolveErrorKind {
    #[inline]
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is the not-found error of `id` itself, not of one of its dependencies.
    #[inline]
    #[must_use]
    pub fn is_not_found_of(&self, id: &str) -> bool {
        matches!(self, Self::NotFound { id: missing } if missing == id)
    }
}

impl From<anyhow::Error> for ResolveErrorKind {
    #[inline]
    fn from(err: anyhow::Error) -> Self {
        Self::Container(ContainerErrorKind::Factory(err))
    }
}

impl From<ArgumentErrorKind> for ResolveErrorKind {
    #[inline]
    fn from(err: ArgumentErrorKind) -> Self {
        Self::Container(ContainerErrorKind::Factory(err.into()))
    }
}
