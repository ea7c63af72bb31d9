// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// 32-character lowercase hex identifier with no dashes.
///
/// Both correlation ids and pipeline ids use this shape: a UUIDv4
/// rendered via [`Uuid::simple`] rather than the usual hyphenated form.
fn fresh_hex_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Identifies a single in-flight request/reply round trip.
///
/// The empty id (`CorrelationId::none()`) marks a fire-and-forget post; any
/// other value means the producer is awaiting a reply keyed by this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh, non-empty correlation id.
    pub fn new() -> Self {
        Self(fresh_hex_id())
    }

    /// The fire-and-forget marker: an empty correlation id.
    pub fn none() -> Self {
        Self(String::new())
    }

    /// True when this id means "no reply expected".
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::none()
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<none>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Identifies an envelope while it is in-flight in `pipeline`, assigned
/// fresh on every claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PipelineId(String);

impl PipelineId {
    pub fn new() -> Self {
        Self(fresh_hex_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PipelineId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for PipelineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_id_none_is_empty() {
        assert!(CorrelationId::none().is_none());
        assert!(CorrelationId::default().is_none());
    }

    #[test]
    fn correlation_id_new_is_unique_and_non_empty() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert!(!a.is_none());
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!a.as_str().contains('-'));
    }

    #[test]
    fn pipeline_id_is_32_char_hex_no_dashes() {
        let id = PipelineId::new();
        assert_eq!(id.as_str().len(), 32);
        assert!(!id.as_str().contains('-'));
    }

    #[test]
    fn pipeline_ids_are_unique() {
        let a = PipelineId::new();
        let b = PipelineId::new();
        assert_ne!(a, b);
    }
}
