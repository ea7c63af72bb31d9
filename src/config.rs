//! Runtime configuration with sensible defaults.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
// (none)

// Layer 3: Internal
// (none)

/// Default process-wide bound on concurrently executing computations:
/// the global in-flight count never exceeds the semaphore bound.
pub const DEFAULT_SEMAPHORE_CAPACITY: usize = 256;

/// Whether a claimed result is deleted from `results` the first time a
/// waiter reads it, or left in place for later inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRetention {
    /// Delete `results[cid]` once a waiter has successfully read it.
    DeleteOnRead,
    /// Leave `results[cid]` in place; an operator purges it out-of-band.
    KeepUntilPurged,
}

impl Default for ResultRetention {
    fn default() -> Self {
        // Bounds store growth without operator involvement, while
        // keeping retention a toggle for callers that want otherwise.
        ResultRetention::DeleteOnRead
    }
}

/// Process-wide configuration for the actor runtime.
///
/// # Examples
///
/// ```
/// use actorq_rt::RuntimeConfig;
///
/// let config = RuntimeConfig::default();
/// assert_eq!(config.semaphore_capacity, 256);
///
/// let config = RuntimeConfig::builder()
///     .semaphore_capacity(64)
///     .build();
/// assert_eq!(config.semaphore_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Bound on concurrently executing computations across the process.
    pub semaphore_capacity: usize,

    /// Whether `results[cid]` is deleted once read.
    pub result_retention: ResultRetention,

    /// Key prefix template; `{id}` is substituted with the actor identity.
    /// Defaults to `<id>:Mailbox:`.
    pub key_prefix_template: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            semaphore_capacity: DEFAULT_SEMAPHORE_CAPACITY,
            result_retention: ResultRetention::default(),
            key_prefix_template: "{id}:Mailbox:".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }
}

/// Builder for [`RuntimeConfig`].
#[derive(Debug, Default)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfigOverrides,
}

#[derive(Debug, Default)]
struct RuntimeConfigOverrides {
    semaphore_capacity: Option<usize>,
    result_retention: Option<ResultRetention>,
    key_prefix_template: Option<String>,
}

impl RuntimeConfigBuilder {
    pub fn semaphore_capacity(mut self, capacity: usize) -> Self {
        self.config.semaphore_capacity = Some(capacity);
        self
    }

    pub fn result_retention(mut self, retention: ResultRetention) -> Self {
        self.config.result_retention = Some(retention);
        self
    }

    pub fn key_prefix_template(mut self, template: impl Into<String>) -> Self {
        self.config.key_prefix_template = Some(template.into());
        self
    }

    pub fn build(self) -> RuntimeConfig {
        let defaults = RuntimeConfig::default();
        RuntimeConfig {
            semaphore_capacity: self
                .config
                .semaphore_capacity
                .unwrap_or(defaults.semaphore_capacity),
            result_retention: self
                .config
                .result_retention
                .unwrap_or(defaults.result_retention),
            key_prefix_template: self
                .config
                .key_prefix_template
                .unwrap_or(defaults.key_prefix_template),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.semaphore_capacity, 256);
        assert_eq!(config.result_retention, ResultRetention::DeleteOnRead);
        assert_eq!(config.key_prefix_template, "{id}:Mailbox:");
    }

    #[test]
    fn builder_overrides_apply() {
        let config = RuntimeConfig::builder()
            .semaphore_capacity(16)
            .result_retention(ResultRetention::KeepUntilPurged)
            .build();

        assert_eq!(config.semaphore_capacity, 16);
        assert_eq!(config.result_retention, ResultRetention::KeepUntilPurged);
    }

    #[test]
    fn builder_leaves_unset_fields_at_default() {
        let config = RuntimeConfig::builder().semaphore_capacity(8).build();
        assert_eq!(config.key_prefix_template, "{id}:Mailbox:");
    }
}
