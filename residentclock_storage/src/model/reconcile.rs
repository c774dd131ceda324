use std::collections::HashSet;

use tracing::{event, Level};

use super::ServerConfig;

/// What a reconciliation pass changed.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Reconciliation {
    /// Servers that had no settings yet and got the defaults.
    pub added: Vec<u64>,
    /// Number of extra records dropped because their server id was already present.
    pub duplicates_removed: usize,
}

impl Reconciliation {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.duplicates_removed == 0
    }
}

/// Make sure every server in `server_ids` has exactly one settings record.
///
/// Records of servers the bot is no longer in are kept. When a server id occurs more than once the
/// first record wins. Running this twice in a row never changes anything the second time.
pub fn reconcile(configs: &mut Vec<ServerConfig>, server_ids: impl IntoIterator<Item = u64>) -> Reconciliation {
    let mut report = Reconciliation::default();

    let mut seen = HashSet::with_capacity(configs.len());
    let before = configs.len();
    configs.retain(|config| seen.insert(config.server_id));
    report.duplicates_removed = before - configs.len();

    if report.duplicates_removed > 0 {
        event!(Level::WARN, "Dropped {} duplicate server records", report.duplicates_removed);
    }

    for server_id in server_ids {
        if seen.insert(server_id) {
            event!(Level::DEBUG, server_id, "Server has no settings, adding defaults");
            configs.push(ServerConfig::new(server_id));
            report.added.push(server_id);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    fn adds_missing_servers_with_defaults() {
        let mut configs = vec![ServerConfig::new(1)];

        let report = reconcile(&mut configs, [1, 2, 3]);

        assert_eq!(report.added, vec![2, 3]);
        assert_eq!(configs, vec![ServerConfig::new(1), ServerConfig::new(2), ServerConfig::new(3)]);
    }

    #[rstest]
    fn keeps_existing_settings_and_departed_servers() {
        let mut custom = ServerConfig::new(1);
        custom.timezone_offset = 9;
        custom.clock_channel = Some(99);
        let mut configs = vec![custom.clone(), ServerConfig::new(5)];

        let report = reconcile(&mut configs, [1]);

        assert!(report.is_unchanged());
        assert_eq!(configs, vec![custom, ServerConfig::new(5)]);
    }

    #[rstest]
    fn first_duplicate_wins() {
        let mut first = ServerConfig::new(7);
        first.default_city = "Oslo".into();
        let mut configs = vec![first.clone(), ServerConfig::new(7), ServerConfig::new(7)];

        let report = reconcile(&mut configs, Vec::<u64>::new());

        assert_eq!(report.duplicates_removed, 2);
        assert_eq!(configs, vec![first]);
    }

    #[rstest]
    fn is_idempotent() {
        let mut configs = vec![ServerConfig::new(4), ServerConfig::new(4)];

        let first = reconcile(&mut configs, [4, 8, 8, 15]);
        let after_first = configs.clone();
        let second = reconcile(&mut configs, [4, 8, 8, 15]);

        assert!(!first.is_unchanged());
        assert_eq!(first.added, vec![8, 15]);
        assert!(second.is_unchanged());
        assert_eq!(configs, after_first);
    }
}
