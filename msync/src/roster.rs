//! Ordered host roster for a synchronization run
//!
//! Index 0 is always the source host - it holds the data by construction.
//! Destination order is preserved from the input list because it determines
//! the pairing computed for each round.

use crate::errors::SyncError;

#[derive(Debug, Clone)]
pub struct HostRoster {
    hosts: Vec<String>,
}

impl HostRoster {
    /// Build a roster from the source host and a raw comma-separated
    /// destination list.
    ///
    /// Entries are trimmed; empty fragments are skipped. Entries equal to the
    /// source host are dropped (so the full fleet list, source included, can
    /// be passed as-is). Duplicate destinations are intentionally kept.
    pub fn from_destinations(source: &str, destinations: &str) -> Result<Self, SyncError> {
        let mut hosts = vec![source.to_string()];
        for dest in destinations.split(',') {
            let dest = dest.trim();
            if dest.is_empty() || dest == source {
                continue;
            }
            hosts.push(dest.to_string());
        }
        if hosts.len() == 1 && destinations.trim().is_empty() {
            return Err(SyncError::EmptyDestinations);
        }
        Ok(Self { hosts })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        // never empty in practice: the source host is always present
        self.hosts.is_empty()
    }

    #[must_use]
    pub fn host(&self, index: usize) -> &str {
        &self.hosts[index]
    }
}

/// Local hostname, used as the implicit source host.
pub fn local_hostname() -> anyhow::Result<String> {
    let name = nix::unistd::gethostname()?;
    Ok(name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_first_and_order_is_preserved() {
        let roster = HostRoster::from_destinations("h0", "h1,h2,h3").unwrap();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.host(0), "h0");
        assert_eq!(roster.host(1), "h1");
        assert_eq!(roster.host(2), "h2");
        assert_eq!(roster.host(3), "h3");
    }

    #[test]
    fn source_host_is_dropped_from_destinations() {
        let roster = HostRoster::from_destinations("h0", "h1,h0,h2").unwrap();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.host(1), "h1");
        assert_eq!(roster.host(2), "h2");
    }

    #[test]
    fn whitespace_is_trimmed_and_empty_fragments_skipped() {
        let roster = HostRoster::from_destinations("h0", " h1 , ,h2,").unwrap();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.host(1), "h1");
        assert_eq!(roster.host(2), "h2");
    }

    #[test]
    fn duplicate_destinations_are_kept() {
        let roster = HostRoster::from_destinations("h0", "h1,h1").unwrap();
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn empty_destination_list_is_rejected() {
        let err = HostRoster::from_destinations("h0", "  ").unwrap_err();
        assert!(matches!(err, SyncError::EmptyDestinations));
    }

    #[test]
    fn list_collapsing_to_source_alone_is_valid() {
        // every destination equals the source: nothing to do, but not an error
        let roster = HostRoster::from_destinations("h0", "h0,h0").unwrap();
        assert_eq!(roster.len(), 1);
    }
}
