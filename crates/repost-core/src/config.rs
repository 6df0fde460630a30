use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Which messages in a public chat count as forwarding origins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourcePolicy {
    /// Every group, supergroup or channel message.
    AnyPublicChat,
    /// Channel posts, plus group messages posted on behalf of a channel
    /// (linked-channel posts inside a discussion group).
    ChannelPostsOnly,
}

impl SourcePolicy {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "any" => Ok(Self::AnyPublicChat),
            "channel-posts" | "channel_posts" => Ok(Self::ChannelPostsOnly),
            other => Err(Error::Config(format!(
                "REPOST_SOURCE_POLICY must be `any` or `channel-posts`, got `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Redis { url: String },
    /// Process-local store; subscriptions are lost on restart.
    Memory,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub url: String,
    pub listen: SocketAddr,
    pub secret: Option<String>,
}

/// Typed configuration for the relay bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_message_limit: usize,
    /// Chunk size for outgoing text, in UTF-16 code units (what Telegram counts).
    pub telegram_safe_limit: usize,
    pub webhook: Option<WebhookConfig>,

    // Storage
    pub store: StoreBackend,
    pub key_prefix: String,

    // Selection protocol
    pub edit_command: String,
    pub allowed_operators: Vec<i64>,

    // Routing
    pub source_policy: SourcePolicy,

    // Timeouts
    pub store_timeout: Duration,
    pub outbound_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build the config from an arbitrary variable source (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN")
            .or_else(|| var("BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
            })?;
        let telegram_message_limit =
            parse_num::<usize>("TELEGRAM_MESSAGE_LIMIT", var("TELEGRAM_MESSAGE_LIMIT"))?
                .unwrap_or(4096)
                .max(256);
        let telegram_safe_limit =
            parse_num::<usize>("TELEGRAM_SAFE_LIMIT", var("TELEGRAM_SAFE_LIMIT"))?
                .unwrap_or(4000)
                .clamp(200, telegram_message_limit);

        let store = match var("REPOST_STORE")
            .map(|s| s.trim().to_lowercase())
            .as_deref()
        {
            None | Some("redis") => {
                let url = var("REDIS_URL").ok_or_else(|| {
                    Error::Config("REDIS_URL environment variable is required".to_string())
                })?;
                StoreBackend::Redis { url }
            }
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(Error::Config(format!(
                    "REPOST_STORE must be `redis` or `memory`, got `{other}`"
                )))
            }
        };
        let key_prefix = var("REPOST_KEY_PREFIX")
            .map(|s| s.trim().trim_end_matches(':').to_string())
            .unwrap_or_else(|| "repost".to_string());

        let edit_command = var("REPOST_EDIT_COMMAND")
            .map(|s| {
                s.trim()
                    .trim_start_matches(['/', '\\'])
                    .to_lowercase()
            })
            .unwrap_or_else(|| "repost".to_string());
        if edit_command.is_empty() || edit_command.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "REPOST_EDIT_COMMAND must be a single word, got `{edit_command}`"
            )));
        }
        let allowed_operators = parse_csv_i64(var("REPOST_ALLOWED_OPERATORS"));

        let source_policy = match var("REPOST_SOURCE_POLICY") {
            Some(raw) => SourcePolicy::parse(&raw)?,
            None => SourcePolicy::AnyPublicChat,
        };

        let store_timeout = Duration::from_millis(
            parse_num::<u64>("REPOST_STORE_TIMEOUT_MS", var("REPOST_STORE_TIMEOUT_MS"))?
                .unwrap_or(3_000),
        );
        let outbound_timeout = Duration::from_millis(
            parse_num::<u64>("REPOST_OUTBOUND_TIMEOUT_MS", var("REPOST_OUTBOUND_TIMEOUT_MS"))?
                .unwrap_or(5_000),
        );

        let webhook = match var("WEBHOOK_URL") {
            Some(url) => {
                let listen = var("WEBHOOK_LISTEN").unwrap_or_else(|| "0.0.0.0:8000".to_string());
                let listen = listen.trim().parse::<SocketAddr>().map_err(|e| {
                    Error::Config(format!("WEBHOOK_LISTEN is not a socket address: {e}"))
                })?;
                let secret = var("WEBHOOK_SECRET")
                    .or_else(|| var("SECRET"))
                    .map(|s| s.trim().to_string());
                if let Some(secret) = secret.as_deref() {
                    validate_secret_token(secret)?;
                }
                Some(WebhookConfig {
                    url: url.trim().to_string(),
                    listen,
                    secret,
                })
            }
            None => None,
        };

        Ok(Self {
            telegram_bot_token,
            telegram_message_limit,
            telegram_safe_limit,
            webhook,
            store,
            key_prefix,
            edit_command,
            allowed_operators,
            source_policy,
            store_timeout,
            outbound_timeout,
        })
    }

    /// Empty allow-list means anyone may edit subscriptions.
    pub fn is_operator_allowed(&self, user_id: i64) -> bool {
        self.allowed_operators.is_empty() || self.allowed_operators.contains(&user_id)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

/// Telegram accepts 1-256 characters from `A-Z`, `a-z`, `0-9`, `_` and `-` as a webhook secret.
fn validate_secret_token(secret: &str) -> Result<()> {
    let valid_chars = secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if secret.len() > 256 || !valid_chars {
        return Err(Error::Config(
            "WEBHOOK_SECRET may only contain A-Z, a-z, 0-9, `_` and `-` (at most 256 characters)"
                .to_string(),
        ));
    }
    Ok(())
}

fn parse_num<T: std::str::FromStr>(key: &str, v: Option<String>) -> Result<Option<T>> {
    let Some(v) = v else {
        return Ok(None);
    };
    v.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| Error::Config(format!("{key} must be a number, got `{v}`")))
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
