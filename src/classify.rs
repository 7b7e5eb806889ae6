//! Datastore classifier: (image, mount path, hint) -> DatastoreKind.
//!
//! Precedence:
//! 1. explicit hint;
//! 2. image identifier (case-insensitive substring, keyword groups in order);
//! 3. mount path (same groups, same order);
//! 4. Generic.

use crate::models::DatastoreKind;

// Order matters: first matching group wins.
const KEYWORD_GROUPS: [(DatastoreKind, &[&str]); 5] = [
    (DatastoreKind::Postgres, &["postgres", "pgdata"]),
    (DatastoreKind::MySql, &["mysql", "mariadb"]),
    (DatastoreKind::Redis, &["redis"]),
    (DatastoreKind::MongoDb, &["mongo"]),
    (DatastoreKind::Neo4j, &["neo4j"]),
];

/// Classify a volume. Total: never fails, falls back to Generic.
pub fn classify(
    image: Option<&str>,
    mount_path: Option<&str>,
    hint: Option<DatastoreKind>,
) -> DatastoreKind {
    if let Some(kind) = hint {
        return kind;
    }
    image
        .and_then(match_keywords)
        .or_else(|| mount_path.and_then(match_keywords))
        .unwrap_or(DatastoreKind::Generic)
}

fn match_keywords(haystack: &str) -> Option<DatastoreKind> {
    let lower = haystack.to_ascii_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(kind, _)| *kind)
}
