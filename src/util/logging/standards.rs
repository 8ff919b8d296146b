//! Centralised logging metadata (event names, shared keys, etc.).

/// Canonical event names used across the crate.
pub mod events {
    /// Configuration lifecycle.
    pub const CONFIG_LOAD_SUCCESS: &str = "config.load.success";
    pub const CONFIG_LOAD_DEFAULT: &str = "config.load.default";
    pub const CONFIG_LOAD_FAILED: &str = "config.load.failed";
    pub const CONFIG_VALIDATION_WARNING: &str = "config.validation.warning";
    pub const CONFIG_OVERRIDE: &str = "config.override";
    pub const CONFIG_OVERRIDE_INVALID: &str = "config.override_invalid";

    /// Registry construction.
    pub const REGISTRY_INIT: &str = "registry.init";

    /// Logging lifecycle.
    pub const LOG_INIT: &str = "log.init";
    pub const LOG_RETENTION: &str = "log.retention";

    /// 版本对比
    pub const REPORT_RUNTIME_RESOLVED: &str = "report.runtime_resolved";
    pub const REPORT_RUNTIME_UNAVAILABLE: &str = "report.runtime_unavailable";
    pub const REPORT_RENDERED: &str = "report.rendered";
}
