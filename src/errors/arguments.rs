#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentErrorKind {
    #[error("Argument #{position} is out of range, constructor received {len} arguments")]
    OutOfRange { position: usize, len: usize },
    #[error("Argument #{position} is null")]
    Null { position: usize },
    #[error("Argument #{position} is not of type {expected}")]
    IncorrectType { position: usize, expected: &'static str },
}
