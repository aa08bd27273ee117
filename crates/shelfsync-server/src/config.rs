//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub notion: NotionConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Notion backend configuration: API credentials plus the ids of the four
/// collections records land in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    pub token: String,
    pub base_url: Option<String>,
    pub source_database_id: String,
    pub person_database_id: String,
    pub podcast_database_id: String,
    pub book_database_id: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("SHELFSYNC_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("SHELFSYNC_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("SHELFSYNC_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            notion: NotionConfig {
                token: std::env::var("NOTION_TOKEN").unwrap_or_default(),
                base_url: std::env::var("NOTION_BASE_URL").ok(),
                source_database_id: std::env::var("NOTION_SOURCE_DATABASE_ID")
                    .unwrap_or_default(),
                person_database_id: std::env::var("NOTION_PERSON_DATABASE_ID")
                    .unwrap_or_default(),
                podcast_database_id: std::env::var("NOTION_PODCAST_DATABASE_ID")
                    .unwrap_or_default(),
                book_database_id: std::env::var("NOTION_BOOK_DATABASE_ID").unwrap_or_default(),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.notion.token.is_empty() {
            anyhow::bail!("NOTION_TOKEN must be set");
        }

        for (name, id) in [
            ("NOTION_SOURCE_DATABASE_ID", &self.notion.source_database_id),
            ("NOTION_PERSON_DATABASE_ID", &self.notion.person_database_id),
            (
                "NOTION_PODCAST_DATABASE_ID",
                &self.notion.podcast_database_id,
            ),
            ("NOTION_BOOK_DATABASE_ID", &self.notion.book_database_id),
        ] {
            if id.is_empty() {
                anyhow::bail!("{} must be set", name);
            }
        }

        Ok(())
    }
}
