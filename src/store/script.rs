//! The atomic claim script contract.
//!
//! This is documentation, not code a `MemoryStore` needs to execute: an
//! in-process adapter gets atomicity for free by holding a lock for the
//! duration of [`StoreAdapter::claim`]. A networked adapter backed by a
//! server that supports scripted execution (the store's `Eval`
//! operation) must reproduce exactly this contract as a server-side
//! script, so the two steps below execute as one round trip with no
//! window in which a crash could drop or duplicate the envelope.

/// The claim operation: the contract any `StoreAdapter::claim`
/// implementation — in-process or networked — must uphold.
pub const CLAIM_SCRIPT: &str = r#"
result = LPOP KEYS[1]
if result != nil then HSET KEYS[2] ARGV[1] result end
return result
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_script_references_inbox_and_pipeline_keys() {
        assert!(CLAIM_SCRIPT.contains("KEYS[1]"));
        assert!(CLAIM_SCRIPT.contains("KEYS[2]"));
        assert!(CLAIM_SCRIPT.contains("ARGV[1]"));
    }
}
