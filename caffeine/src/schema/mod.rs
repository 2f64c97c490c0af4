mod display;
mod queries;

pub use display::{display_class, display_constant_pool};
pub use queries::{AttributeValue, Attributes};
