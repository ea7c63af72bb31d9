//! Per-actor store key layout: `<id>:Mailbox:{inbox, pipeline, results,
//! errors, channel}`.

/// The five store keys that make up one actor's durable mailbox.
#[derive(Debug, Clone)]
pub struct MailboxKeys {
    pub inbox: String,
    pub pipeline: String,
    pub results: String,
    pub errors: String,
    pub channel: String,
}

impl MailboxKeys {
    /// Derive the key set for `actor_id` from a `{id}`-templated prefix
    /// (`RuntimeConfig::key_prefix_template`, default `"{id}:Mailbox:"`).
    pub fn for_actor(actor_id: &str, prefix_template: &str) -> Self {
        let prefix = prefix_template.replace("{id}", actor_id);
        Self {
            inbox: format!("{prefix}inbox"),
            pipeline: format!("{prefix}pipeline"),
            results: format!("{prefix}results"),
            errors: format!("{prefix}errors"),
            channel: format!("{prefix}channel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_default_template() {
        let keys = MailboxKeys::for_actor("echo", "{id}:Mailbox:");
        assert_eq!(keys.inbox, "echo:Mailbox:inbox");
        assert_eq!(keys.pipeline, "echo:Mailbox:pipeline");
        assert_eq!(keys.results, "echo:Mailbox:results");
        assert_eq!(keys.errors, "echo:Mailbox:errors");
        assert_eq!(keys.channel, "echo:Mailbox:channel");
    }

    #[test]
    fn keys_honor_custom_template() {
        let keys = MailboxKeys::for_actor("boom", "ns/{id}/");
        assert_eq!(keys.inbox, "ns/boom/inbox");
    }
}
