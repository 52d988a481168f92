pub mod json;
pub mod obj;

pub use json::{spread, stringify, stringify_optional};
pub use obj::is_truthy;
