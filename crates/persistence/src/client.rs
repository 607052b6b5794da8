//! Cluster connection for the practice recorder

use std::sync::Arc;
use std::time::Duration;

use scylla::{Session, SessionBuilder};

use crate::error::PersistenceError;
use crate::schema;

/// Where practice records live
#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    /// `host:port` contact points
    pub hosts: Vec<String>,
    /// Interpolated into DDL and queries, so it must be a plain CQL identifier
    pub keyspace: String,
    pub replication_factor: u8,
    pub connect_timeout: Duration,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1:9042".to_string()],
            keyspace: "lingo_tutor".to_string(),
            replication_factor: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ScyllaConfig {
    /// Reject settings that would fail late or build broken CQL
    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.hosts.iter().all(|h| h.trim().is_empty()) {
            return Err(PersistenceError::ConnectionError(
                "no ScyllaDB hosts configured".to_string(),
            ));
        }

        let ks = self.keyspace.as_str();
        let valid_keyspace = !ks.is_empty()
            && ks.len() <= 48
            && ks.starts_with(|c: char| c.is_ascii_alphabetic())
            && ks.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_keyspace {
            return Err(PersistenceError::InvalidData(format!(
                "keyspace '{}' is not a valid CQL identifier",
                ks
            )));
        }

        if self.replication_factor == 0 {
            return Err(PersistenceError::InvalidData(
                "replication_factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shared driver session plus the keyspace it writes to
#[derive(Clone)]
pub struct ScyllaClient {
    session: Arc<Session>,
    config: ScyllaConfig,
}

impl ScyllaClient {
    pub async fn connect(config: ScyllaConfig) -> Result<Self, PersistenceError> {
        config.validate()?;
        tracing::info!(
            hosts = ?config.hosts,
            keyspace = %config.keyspace,
            timeout_ms = config.connect_timeout.as_millis() as u64,
            "Connecting to ScyllaDB"
        );

        let session = SessionBuilder::new()
            .known_nodes(config.hosts.iter().map(|h| h.trim()).filter(|h| !h.is_empty()))
            .connection_timeout(config.connect_timeout)
            .build()
            .await?;

        Ok(Self {
            session: Arc::new(session),
            config,
        })
    }

    /// Create the keyspace and practice tables if missing
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        let keyspace = self.keyspace();
        schema::create_keyspace(&self.session, keyspace, self.config.replication_factor).await?;
        schema::create_tables(&self.session, keyspace).await?;
        tracing::info!(keyspace = %keyspace, "Practice schema ready");
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn keyspace(&self) -> &str {
        &self.config.keyspace
    }

    /// Keyspace-qualified table name
    pub fn table(&self, name: &str) -> String {
        qualified(self.keyspace(), name)
    }
}

fn qualified(keyspace: &str, table: &str) -> String {
    format!("{}.{}", keyspace, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScyllaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let blank_hosts = ScyllaConfig {
            hosts: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            blank_hosts.validate(),
            Err(PersistenceError::ConnectionError(_))
        ));

        for keyspace in ["", "1tutor", "tutor-prod", "tutor; DROP TABLE x"] {
            let config = ScyllaConfig {
                keyspace: keyspace.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {:?}", keyspace);
        }

        let no_replicas = ScyllaConfig {
            replication_factor: 0,
            ..Default::default()
        };
        assert!(no_replicas.validate().is_err());
    }

    #[test]
    fn test_qualified_table_name() {
        assert_eq!(qualified("lingo_tutor", "practice_turns"), "lingo_tutor.practice_turns");
    }
}
