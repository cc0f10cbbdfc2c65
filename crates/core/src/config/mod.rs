pub mod engine_config;
pub mod sources;
pub mod validation;

pub use engine_config::*;
pub use sources::*;
pub use validation::*;
