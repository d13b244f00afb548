pub mod sanitize;
pub mod validation;

pub use sanitize::{sanitize, sanitize_str};
pub use validation::{JsonObject, PathParam};
