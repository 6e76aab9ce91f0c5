mod core;
pub use self::core::{Generation, ModelClient};
