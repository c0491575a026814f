//! Application state wiring the store, provider, and relay together.
//!
//! The relay in `mindline-core` is generic over its history store;
//! `AppState` pins it to the SQLite implementation and the Groq provider.

use mindline_core::relay::ChatRelay;
use mindline_infra::credentials;
use mindline_infra::llm::create_provider;
use mindline_infra::sqlite::history::SqliteHistoryRepository;
use mindline_infra::sqlite::pool::{DatabasePool, resolve_data_dir};
use mindline_types::config::ChatSettings;

/// Shared application state used by all CLI commands.
pub struct AppState {
    pub relay: ChatRelay<SqliteHistoryRepository>,
    pub settings: ChatSettings,
}

impl AppState {
    /// Initialize the application: resolve the credential, open the
    /// database, wire the relay.
    ///
    /// The credential is resolved first, so a missing `GROQ_API_KEY`
    /// aborts before any store or provider call is attempted.
    pub async fn init() -> anyhow::Result<Self> {
        let settings = ChatSettings::from_env();

        let api_key = credentials::api_key_from_env().map_err(|e| {
            anyhow::anyhow!(
                "{e}. Get a free key at https://console.groq.com/keys, export it, and restart."
            )
        })?;
        let provider = create_provider(&settings, Some(api_key))?;

        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("mindline.db").display()
        );
        let pool = DatabasePool::new(&db_url).await?;
        let repository = SqliteHistoryRepository::new(pool);

        let relay = ChatRelay::new(provider, repository, settings.clone());

        Ok(Self { relay, settings })
    }
}
