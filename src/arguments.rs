use alloc::{sync::Arc, vec::Vec};
use core::any::type_name;

use crate::{any::Instance, errors::ArgumentErrorKind};

/// A single constructor argument.
#[derive(Clone, Debug)]
pub enum Argument {
    Null,
    Value(Instance),
}

impl Argument {
    #[inline]
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    #[must_use]
    pub const fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Null => None,
            Self::Value(instance) => Some(instance),
        }
    }
}

/// Positional arguments handed to a constructor. Variadic parameters are never populated.
#[derive(Clone, Debug, Default)]
pub struct Arguments(Vec<Argument>);

impl Arguments {
    #[inline]
    #[must_use]
    pub const fn new(arguments: Vec<Argument>) -> Self {
        Self(arguments)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.0.iter()
    }

    /// Gets a required argument.
    ///
    /// # Errors
    /// - [`ArgumentErrorKind::OutOfRange`] if the constructor received fewer arguments
    /// - [`ArgumentErrorKind::Null`] if the argument was resolved to null
    /// - [`ArgumentErrorKind::IncorrectType`] if the argument holds another type
    pub fn get<T: Send + Sync + 'static>(&self, position: usize) -> Result<Arc<T>, ArgumentErrorKind> {
        self.optional(position)?.ok_or(ArgumentErrorKind::Null { position })
    }

    /// Gets an argument that may be null.
    ///
    /// # Errors
    /// Same as [`Self::get`], except that null is `Ok(None)`.
    pub fn optional<T: Send + Sync + 'static>(&self, position: usize) -> Result<Option<Arc<T>>, ArgumentErrorKind> {
        let argument = self.0.get(position).ok_or(ArgumentErrorKind::OutOfRange {
            position,
            len: self.0.len(),
        })?;

        match argument {
            Argument::Null => Ok(None),
            Argument::Value(instance) => instance
                .clone()
                .downcast::<T>()
                .map(Some)
                .map_err(|_| ArgumentErrorKind::IncorrectType {
                    position,
                    expected: type_name::<T>(),
                }),
        }
    }

    /// Gets a required argument by value, for scalars.
    ///
    /// # Errors
    /// Same as [`Self::get`].
    pub fn cloned<T: Clone + Send + Sync + 'static>(&self, position: usize) -> Result<T, ArgumentErrorKind> {
        self.get::<T>(position).map(|value| (*value).clone())
    }
}

impl From<Vec<Argument>> for Arguments {
    #[inline]
    fn from(arguments: Vec<Argument>) -> Self {
        Self(arguments)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec};

    use super::{Argument, Arguments};
    use crate::errors::ArgumentErrorKind;

    #[test]
    fn test_typed_access() {
        let arguments = Arguments::new(vec![Argument::value(5i64), Argument::Null, Argument::value(String::from("boo"))]);

        assert_eq!(arguments.len(), 3);
        assert_eq!(arguments.cloned::<i64>(0).unwrap(), 5);
        assert!(arguments.optional::<i64>(1).unwrap().is_none());
        assert_eq!(arguments.get::<String>(2).unwrap().as_str(), "boo");
    }

    #[test]
    fn test_access_errors() {
        let arguments = Arguments::new(vec![Argument::value(true), Argument::Null]);

        assert_eq!(
            arguments.get::<i64>(0).unwrap_err(),
            ArgumentErrorKind::IncorrectType {
                position: 0,
                expected: "i64"
            }
        );
        assert_eq!(arguments.get::<bool>(1).unwrap_err(), ArgumentErrorKind::Null { position: 1 });
        assert_eq!(
            arguments.get::<bool>(2).unwrap_err(),
            ArgumentErrorKind::OutOfRange { position: 2, len: 2 }
        );
    }
}
