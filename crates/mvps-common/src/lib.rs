//! MVPS Common
//!
//! Ambient helpers shared by the MVPS service binaries.

pub mod logging;

/// Service name used when no explicit name is given.
pub const DEFAULT_SERVICE_NAME: &str = "mvps";
