use std::env;
use std::str::FromStr;

use crate::domain::value_objects::EscalationPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("Inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    /// Externally visible base URL, used to rebuild signed callback URLs.
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub size_words: usize,
    pub overlap_words: usize,
}

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub upload_dir: String,
    pub workers: usize,
    pub timeout_secs: u64,
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub service_url: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub history_limit: i64,
    pub retrieval_top_k: usize,
}

#[derive(Debug, Clone)]
pub struct BusinessDataConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub graph_api_base: String,
    pub graph_api_version: String,
    pub meta_app_secret: Option<String>,
    pub send_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct IvrConfig {
    pub twilio_auth_token: Option<String>,
    pub support_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub ingestion: IngestionConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub escalation: EscalationPolicy,
    pub business_data: BusinessDataConfig,
    pub channels: ChannelConfig,
    pub ivr: IvrConfig,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv()` first to honour `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let host = vars.string("SERVER_HOST", "0.0.0.0");
        let port = vars.parse("SERVER_PORT", 3000u16)?;
        let server = ServerConfig {
            public_base_url: vars
                .string("PUBLIC_BASE_URL", &format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            host,
            port,
            max_body_bytes: vars.parse("MAX_BODY_BYTES", 100 * 1024 * 1024usize)?,
        };

        let chunking = ChunkingConfig {
            size_words: vars.parse("CHUNK_SIZE_WORDS", 1000usize)?,
            overlap_words: vars.parse("CHUNK_OVERLAP_WORDS", 200usize)?,
        };
        if chunking.size_words == 0 || chunking.overlap_words >= chunking.size_words {
            return Err(ConfigError::Inconsistent(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunking.overlap_words, chunking.size_words
            )));
        }

        let escalation = EscalationPolicy::new(
            vars.parse("ESCALATION_CONFIDENCE_THRESHOLD", 0.5f32)?,
            vars.parse("ESCALATION_MAX_UNSUCCESSFUL", 2i32)?,
        )
        .map_err(ConfigError::Inconsistent)?;

        let retrieval_top_k = vars.parse("RETRIEVAL_TOP_K", 3usize)?;
        if retrieval_top_k == 0 {
            return Err(ConfigError::Invalid {
                key: "RETRIEVAL_TOP_K",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            server,
            database_url: vars.required("DATABASE_URL")?,
            ingestion: IngestionConfig {
                upload_dir: vars.string("UPLOAD_DIR", "./uploads"),
                workers: vars.parse("INGESTION_WORKERS", 3usize)?.max(1),
                timeout_secs: vars.parse("INGESTION_TIMEOUT_SECS", 300u64)?,
                chunking,
            },
            embedding: EmbeddingConfig {
                service_url: vars.string("EMBEDDINGS_SERVICE_URL", "https://example.workers.dev"),
                max_retries: vars.parse("EMBEDDINGS_MAX_RETRIES", 3u32)?,
                timeout_secs: vars.parse("EMBEDDINGS_TIMEOUT_SECS", 30u64)?,
                backoff_factor: vars.parse("EMBEDDINGS_BACKOFF_FACTOR", 1.5f64)?,
            },
            generation: GenerationConfig {
                api_base: vars.string("LLM_API_BASE", "https://api.openai.com/v1"),
                api_key: vars.optional("LLM_API_KEY"),
                model: vars.string("LLM_MODEL", "gpt-4o-mini"),
                timeout_secs: vars.parse("GENERATION_TIMEOUT_SECS", 30u64)?,
                history_limit: vars.parse("CONVERSATION_HISTORY_LIMIT", 6i64)?,
                retrieval_top_k,
            },
            escalation,
            business_data: BusinessDataConfig {
                base_url: vars.optional("BUSINESS_DATA_API_URL"),
                api_key: vars.optional("BUSINESS_DATA_API_KEY"),
                timeout_secs: vars.parse("BUSINESS_DATA_TIMEOUT_SECS", 5u64)?,
            },
            channels: ChannelConfig {
                graph_api_base: vars.string("META_GRAPH_API_BASE", "https://graph.facebook.com"),
                graph_api_version: vars.string("META_GRAPH_API_VERSION", "v18.0"),
                meta_app_secret: vars.optional("META_APP_SECRET"),
                send_timeout_secs: vars.parse("CHANNEL_SEND_TIMEOUT_SECS", 10u64)?,
            },
            ivr: IvrConfig {
                twilio_auth_token: vars.optional("TWILIO_AUTH_TOKEN"),
                support_number: vars.optional("IVR_SUPPORT_NUMBER"),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }

    fn parse<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(key) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/omnidesk")]).unwrap();

        assert_eq!(config.ingestion.chunking.size_words, 1000);
        assert_eq!(config.ingestion.chunking.overlap_words, 200);
        assert_eq!(config.generation.retrieval_top_k, 3);
        assert_eq!(config.escalation, EscalationPolicy::default());
        assert_eq!(config.server.public_base_url, "http://localhost:3000");
        assert!(config.channels.meta_app_secret.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(
            config_from(&[]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_window() {
        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/omnidesk"),
            ("CHUNK_SIZE_WORDS", "100"),
            ("CHUNK_OVERLAP_WORDS", "100"),
        ]);
        assert!(matches!(result, Err(ConfigError::Inconsistent(_))));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/omnidesk"),
            ("ESCALATION_CONFIDENCE_THRESHOLD", "1.5"),
        ]);
        assert!(matches!(result, Err(ConfigError::Inconsistent(_))));

        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/omnidesk"),
            ("ESCALATION_MAX_UNSUCCESSFUL", "two"),
        ]);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
