//! StorageEngine: owns the ConnectionPool, implements ISegmentStore + IValueStore.

use std::path::Path;

use tracing::{debug, info};

use tessera_core::config::StorageConfig;
use tessera_core::constants::MAX_BULK_BATCH_SIZE;
use tessera_core::errors::TesseraResult;
use tessera_core::fragment::{ClusterId, Fragment, ValueEntry};
use tessera_core::traits::{ISegmentStore, IValueStore};

use crate::pool::ConnectionPool;
use crate::queries::{fragment_crud, value_ops, vector_search};

/// SQLite-backed segment store and value store.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> TesseraResult<Self> {
        Self::open_with(path, &StorageConfig::default())
    }

    /// Open using the pool size and busy timeout from `config`.
    /// An empty `db_path` opens an in-memory database.
    pub fn from_config(config: &StorageConfig) -> TesseraResult<Self> {
        match config.db_path.as_deref() {
            Some(path) if !path.is_empty() => Self::open_with(Path::new(path), config),
            _ => Self::open_in_memory(),
        }
    }

    fn open_with(path: &Path, config: &StorageConfig) -> TesseraResult<Self> {
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        info!(
            path = %path.display(),
            readers = pool.readers.as_ref().map_or(0, |r| r.size()),
            "storage opened"
        );
        Ok(Self { pool })
    }

    /// Open an in-memory storage engine. All reads go through the writer.
    pub fn open_in_memory() -> TesseraResult<Self> {
        Ok(Self {
            pool: ConnectionPool::open_in_memory()?,
        })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// File-backed: read pool. In-memory: the writer, since separate
    /// in-memory connections are isolated databases.
    fn with_reader<F, T>(&self, f: F) -> TesseraResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> TesseraResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }
}

impl ISegmentStore for StorageEngine {
    fn create(&self, fragment: &Fragment) -> TesseraResult<()> {
        self.pool
            .writer
            .with_conn(|conn| fragment_crud::insert_fragment(conn, fragment))?;
        debug!(fragment_id = %fragment.id, "fragment stored");
        Ok(())
    }

    fn get(&self, id: &str) -> TesseraResult<Option<Fragment>> {
        self.with_reader(|conn| fragment_crud::get_fragment(conn, id))
    }

    fn delete(&self, id: &str) -> TesseraResult<()> {
        // Value rows cascade through the foreign key.
        self.pool
            .writer
            .with_conn(|conn| fragment_crud::delete_fragment(conn, id))
    }

    fn create_bulk(&self, fragments: &[Fragment]) -> TesseraResult<usize> {
        let mut inserted = 0;
        for chunk in fragments.chunks(MAX_BULK_BATCH_SIZE) {
            inserted += self
                .pool
                .writer
                .with_conn(|conn| fragment_crud::bulk_insert(conn, chunk))?;
        }
        debug!(count = inserted, "bulk insert complete");
        Ok(inserted)
    }

    fn get_bulk(&self, ids: &[String]) -> TesseraResult<Vec<Fragment>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.with_reader(|conn| fragment_crud::bulk_get(conn, ids))
    }

    fn list(&self, scope: Option<&str>) -> TesseraResult<Vec<Fragment>> {
        self.with_reader(|conn| fragment_crud::list_fragments(conn, scope))
    }

    fn find_by_content_hash(&self, content_hash: &str) -> TesseraResult<Option<Fragment>> {
        self.with_reader(|conn| fragment_crud::get_by_content_hash(conn, content_hash))
    }

    fn count(&self) -> TesseraResult<usize> {
        self.with_reader(fragment_crud::count_fragments)
    }

    fn sample_embeddings(&self, limit: usize) -> TesseraResult<Vec<Vec<f32>>> {
        self.with_reader(|conn| vector_search::sample_embeddings(conn, limit))
    }

    fn search_similar(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: usize,
    ) -> TesseraResult<Vec<(Fragment, f64)>> {
        self.with_reader(|conn| vector_search::search_similar(conn, embedding, threshold, limit))
    }
}

impl IValueStore for StorageEngine {
    fn get_or_default(&self, fragment_id: &str, cluster: ClusterId) -> TesseraResult<ValueEntry> {
        Ok(self
            .with_reader(|conn| value_ops::get_entry(conn, fragment_id, cluster))?
            .unwrap_or_else(ValueEntry::optimistic_default))
    }

    fn update(
        &self,
        fragment_id: &str,
        cluster: ClusterId,
        reward: f64,
        learning_rate: f64,
    ) -> TesseraResult<ValueEntry> {
        self.pool.writer.with_conn(|conn| {
            value_ops::apply_reward(conn, fragment_id, cluster, reward, learning_rate)
        })
    }

    fn seed(&self, fragment_id: &str, cluster: ClusterId, value: f64) -> TesseraResult<()> {
        self.pool
            .writer
            .with_conn(|conn| value_ops::seed_entry(conn, fragment_id, cluster, value))
    }

    fn remove_fragment(&self, fragment_id: &str) -> TesseraResult<()> {
        self.pool
            .writer
            .with_conn(|conn| value_ops::delete_entries(conn, fragment_id))
    }

    fn cluster_visits(&self, cluster: ClusterId) -> TesseraResult<u64> {
        self.with_reader(|conn| value_ops::cluster_visits(conn, cluster))
    }

    fn entry_count(&self) -> TesseraResult<usize> {
        self.with_reader(value_ops::count_entries)
    }
}
