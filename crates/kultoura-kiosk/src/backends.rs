//! Builds the configured state store and score sink.

use std::time::Duration;

use tracing::info;

use kultoura_core::config::{KioskConfig, ScoreSinkKind, StorageBackendKind};
use kultoura_scoring::LogScoreSink;
use kultoura_store::{
    HttpScoreSink, HttpStateStore, JsonFileStore, MemoryStore, PostgresConfig, PostgresPool,
    PostgresStore, ScoreArchive, ScoreBackend, StateBackend,
};

use crate::error::KioskError;

/// The store and sink a kiosk runs with.
pub struct Backends {
    /// The shared activation record.
    pub store: StateBackend,
    /// Where saved sheets go.
    pub sink: ScoreBackend,
    /// The database pool, when either backend needs one.
    pub pool: Option<PostgresPool>,
}

/// Open the backends named in `config`.
///
/// A single `PostgreSQL` pool is shared by the store and the archive and
/// migrations run once, before either is used.
pub async fn build_backends(config: &KioskConfig) -> Result<Backends, KioskError> {
    let needs_pool = config.storage.backend == StorageBackendKind::Postgres
        || config.scores.sink == ScoreSinkKind::Postgres;

    let pool = if needs_pool {
        let pg_config = PostgresConfig::new(&config.storage.postgres_url)
            .with_max_connections(config.storage.max_connections);
        let pool = PostgresPool::connect(&pg_config).await?;
        pool.run_migrations().await?;
        info!("PostgreSQL connected and migrated");
        Some(pool)
    } else {
        None
    };

    let store = match (config.storage.backend, pool.as_ref()) {
        (StorageBackendKind::Memory, _) => StateBackend::Memory(MemoryStore::new()),
        (StorageBackendKind::JsonFile, _) => {
            StateBackend::JsonFile(JsonFileStore::open(&config.storage.state_path).await?)
        }
        (StorageBackendKind::Postgres, Some(pool)) => {
            StateBackend::Postgres(PostgresStore::new(pool))
        }
        (StorageBackendKind::Postgres, None) => {
            return Err(missing_pool());
        }
        (StorageBackendKind::Http, _) => {
            StateBackend::Http(HttpStateStore::new(&config.storage.remote_url))
        }
    };

    let sink = match (config.scores.sink, pool.as_ref()) {
        (ScoreSinkKind::Log, _) => {
            ScoreBackend::Log(LogScoreSink::new(Duration::from_millis(config.scores.log_delay_ms)))
        }
        (ScoreSinkKind::Postgres, Some(pool)) => ScoreBackend::Postgres(ScoreArchive::new(pool)),
        (ScoreSinkKind::Postgres, None) => return Err(missing_pool()),
        (ScoreSinkKind::Http, _) => {
            ScoreBackend::Http(HttpScoreSink::new(&config.scores.remote_url))
        }
    };

    Ok(Backends { store, sink, pool })
}

fn missing_pool() -> KioskError {
    KioskError::Store {
        source: kultoura_store::StoreError::Config(String::from(
            "postgres backend selected without a pool",
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kultoura_scoring::ScoreSink;
    use kultoura_store::EventStateStore;

    use super::*;

    #[tokio::test]
    async fn memory_store_with_log_sink() {
        let config = KioskConfig::parse("storage:\n  backend: memory\n").unwrap();
        let backends = build_backends(&config).await.unwrap();

        assert_eq!(backends.store.name(), "memory");
        assert_eq!(backends.sink.name(), "log");
        assert!(backends.pool.is_none());
    }

    #[tokio::test]
    async fn json_file_store_is_created_at_state_path() {
        let dir = std::env::temp_dir().join(format!("kultoura-kiosk-{}", std::process::id()));
        let path = dir.join("admin-state.json");
        let mut config = KioskConfig::default();
        config.storage.state_path = path.to_string_lossy().into_owned();

        let backends = build_backends(&config).await.unwrap();
        assert_eq!(backends.store.name(), "json_file");
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn http_backends_need_no_connection_up_front() {
        let yaml = "storage:\n  backend: http\n  remote_url: http://127.0.0.1:9\nscores:\n  sink: http\n";
        let config = KioskConfig::parse(yaml).unwrap();
        let backends = build_backends(&config).await.unwrap();

        assert_eq!(backends.store.name(), "http");
        assert_eq!(backends.sink.name(), "http");
    }
}
