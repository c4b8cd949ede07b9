/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("schema setup failed: {reason}")]
    SchemaFailed { reason: String },

    #[error("corrupt row for fragment {id}: {details}")]
    CorruptRow { id: String, details: String },

    #[error("connection pool exhausted: {active_connections} active connections")]
    ConnectionPoolExhausted { active_connections: usize },
}
