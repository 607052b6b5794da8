//! ScyllaDB schema creation
//!
//! Timestamps are stored as BIGINT epoch milliseconds.

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    for (name, ddl) in table_statements(keyspace) {
        session.query_unpaged(ddl, &[]).await.map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create {} table: {}", name, e))
        })?;
    }

    tracing::info!("All tables created successfully");
    Ok(())
}

fn table_statements(keyspace: &str) -> Vec<(&'static str, String)> {
    vec![
        (
            "practice_turns",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.practice_turns (
            session_id TEXT,
            sequence INT,
            user_text TEXT,
            reply TEXT,
            ai_feedback_text TEXT,
            verdict TEXT,
            feedback TEXT,
            tone TEXT,
            category TEXT,
            matched_pattern TEXT,
            reason TEXT,
            created_at BIGINT,
            PRIMARY KEY ((session_id), sequence)
        ) WITH CLUSTERING ORDER BY (sequence ASC)
    "#,
                keyspace
            ),
        ),
        (
            "practice_mistakes",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.practice_mistakes (
            session_id TEXT,
            turn_sequence INT,
            mistake_id UUID,
            category TEXT,
            original_text TEXT,
            corrected_text TEXT,
            explanation TEXT,
            severity TEXT,
            created_at BIGINT,
            PRIMARY KEY ((session_id), turn_sequence, mistake_id)
        )
    "#,
                keyspace
            ),
        ),
        (
            "practice_sessions",
            format!(
                r#"
        CREATE TABLE IF NOT EXISTS {}.practice_sessions (
            session_id TEXT,
            overall_score INT,
            grammar_score INT,
            fluency_score INT,
            total_turns INT,
            incorrect_turns INT,
            duration_seconds BIGINT,
            completed_at BIGINT,
            PRIMARY KEY (session_id)
        )
    "#,
                keyspace
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_keyspace_qualified() {
        let statements = table_statements("tutor_test");
        let names: Vec<_> = statements.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["practice_turns", "practice_mistakes", "practice_sessions"]);
        for (name, ddl) in &statements {
            assert!(ddl.contains(&format!("tutor_test.{}", name)));
        }
    }
}
