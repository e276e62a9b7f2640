mod arguments;
mod container;
mod reflection;
mod resolve;

pub use arguments::ArgumentErrorKind;
pub use container::ContainerErrorKind;
pub use reflection::ReflectionErrorKind;
pub use resolve::ResolveErrorKind;
