use service_core::config::{self as core_config, get_env, parse_list, Environment};
use service_core::error::AppError;
use std::env;

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;
const DEFAULT_BODY_LIMIT_BYTES: usize = 100 * 1024;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub mongodb: MongoConfig,
    pub gemini: GeminiSettings,
    pub cors: CorsConfig,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common = core_config::Config::load()?;
        let environment = Environment::from_env()?;
        // Only secrets and the dev-only origin list must be explicit in production.
        let is_prod = environment.is_production();

        if let Ok(port) = env::var("PORT") {
            common.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e))
            })?;
        }

        Ok(ChatConfig {
            common,
            environment,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URL", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("yoga_chat"), false)?,
                collection: get_env("MONGODB_COLLECTION", Some("chatdatas"), false)?,
            },
            gemini: GeminiSettings {
                api_key: get_env("GEMINI_API_KEY", None, is_prod)?,
                model: get_env("GEMINI_MODEL", Some("gemini-2.0-flash"), false)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), false)?,
                timeout_secs: parse_or(
                    "GEMINI_TIMEOUT_SECS",
                    get_env(
                        "GEMINI_TIMEOUT_SECS",
                        Some(&DEFAULT_GEMINI_TIMEOUT_SECS.to_string()),
                        false,
                    )?,
                    DEFAULT_GEMINI_TIMEOUT_SECS,
                ),
            },
            cors: CorsConfig {
                allowed_origins: parse_list(&get_env(
                    "ALLOWED_ORIGINS",
                    Some(DEFAULT_ALLOWED_ORIGINS),
                    is_prod,
                )?),
            },
            body_limit_bytes: parse_or(
                "BODY_LIMIT_BYTES",
                env::var("BODY_LIMIT_BYTES").unwrap_or_default(),
                DEFAULT_BODY_LIMIT_BYTES,
            ),
        })
    }

    /// Settings for running against the in-memory store and mock provider.
    pub fn for_tests(allowed_origins: Vec<String>) -> Self {
        ChatConfig {
            common: core_config::Config { port: 0 },
            environment: Environment::Test,
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "yoga_chat_test".to_string(),
                collection: "chatdatas".to_string(),
            },
            gemini: GeminiSettings {
                api_key: "test-api-key".to_string(),
                model: "gemini-2.0-flash".to_string(),
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                timeout_secs: DEFAULT_GEMINI_TIMEOUT_SECS,
            },
            cors: CorsConfig { allowed_origins },
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

fn parse_or<T>(key: &str, raw: String, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    if raw.trim().is_empty() {
        return default;
    }
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
        default
    })
}
