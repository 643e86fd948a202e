//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LogConfig (validated, immutable)
//!     → snapshot owned by the engine instance
//! ```
//!
//! # Design Decisions
//! - Config is immutable once an engine is built; reconfiguring means
//!   building a new engine
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ActivationConfig, ActivationMode, LogConfig, ObfuscateConfig, SinkConfig};
pub use validation::{validate_config, ValidationError};
