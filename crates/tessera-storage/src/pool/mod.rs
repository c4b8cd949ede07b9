//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use tessera_core::errors::TesseraResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: Option<ReadPool>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file. The schema is
    /// created through the writer before any reader connects.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u32) -> TesseraResult<Self> {
        let writer = WriteConnection::open(path, busy_timeout_ms)?;
        writer.with_conn(crate::schema::ensure_schema)?;
        let readers = ReadPool::open(path, read_pool_size, busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database. In-memory connections are isolated
    /// databases, so there is no read pool and reads go through the writer.
    pub fn open_in_memory() -> TesseraResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        writer.with_conn(crate::schema::ensure_schema)?;
        Ok(Self {
            writer,
            readers: None,
            db_path: None,
        })
    }
}
