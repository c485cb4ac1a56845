//! Builders
//!
//! Fluent configuration builder and the environment-backed resolver.

pub mod config;
pub mod resolver;

pub use config::{oauth_config, OAuthConfigBuilder};
pub use resolver::{resolve, resolve_from, ConfigSource, EnvConfigSource};
