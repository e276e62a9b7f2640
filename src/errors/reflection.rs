use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflectionErrorKind {
    #[error("Class {name} does not exist")]
    UnknownType { name: String },
    #[error("Cannot instantiate abstract class {name}")]
    Abstract { name: String },
    #[error("Call to private constructor of class {name}")]
    PrivateConstructor { name: String },
}
