use crate::engine::SearchCriteria;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub defaults: SearchCriteria,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://www.leparking.fr/recherche".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_request_timeout() -> u64 { 10_000 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// CSS selectors for the search-results markup. The site layout changes
/// without notice, so these live in config rather than code.
#[derive(Debug, Deserialize, Clone)]
pub struct SelectorConfig {
    #[serde(default = "default_item_selector")]
    pub item: String,
    #[serde(default = "default_title_selector")]
    pub title: String,
    #[serde(default = "default_price_selector")]
    pub price: String,
    #[serde(default = "default_link_selector")]
    pub link: String,
}

fn default_item_selector() -> String { ".listing-item".to_string() }
fn default_title_selector() -> String { ".listing-title".to_string() }
fn default_price_selector() -> String { ".listing-price".to_string() }
fn default_link_selector() -> String { "a".to_string() }

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: default_item_selector(),
            title: default_title_selector(),
            price: default_price_selector(),
            link: default_link_selector(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    /// Flat amount added to the purchase price to estimate resale value.
    #[serde(default = "default_resale_markup")]
    pub resale_markup: u64,
}

fn default_resale_markup() -> u64 { 3_000 }

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            resale_markup: default_resale_markup(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Long-poll timeout passed to getUpdates.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_s: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout() -> u64 { 30 }

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_timeout_s: default_poll_timeout(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config TOML")
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(ENV_FILE) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in parse_env(&content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Bot token from TELEGRAM_TOKEN, or prompted for and saved to .env.
    pub fn telegram_token() -> Result<String> {
        match std::env::var("TELEGRAM_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Ok(sanitize(&token)),
            _ => {
                let token = prompt_credential("Telegram bot token (from @BotFather)")?;
                std::env::set_var("TELEGRAM_TOKEN", &token);
                if let Err(e) = save_env_var(Path::new(ENV_FILE), "TELEGRAM_TOKEN", &token) {
                    tracing::warn!(error = %e, "could not save TELEGRAM_TOKEN to {}", ENV_FILE);
                }
                Ok(token)
            }
        }
    }

    /// Optional chat restriction from TELEGRAM_CHAT_ID.
    pub fn telegram_chat_id() -> Result<Option<i64>> {
        match std::env::var("TELEGRAM_CHAT_ID") {
            Ok(raw) if !raw.trim().is_empty() => {
                let id = sanitize(&raw)
                    .parse()
                    .with_context(|| format!("TELEGRAM_CHAT_ID is not a chat id: {:?}", raw))?;
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }
}

/// KEY=VALUE pairs from .env content. Comments, blanks and a leading BOM are
/// ignored; surrounding quotes are stripped.
fn parse_env(content: &str) -> Vec<(String, String)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| {
            let v = v.trim().trim_matches('"').trim_matches('\'');
            (k.trim().to_string(), v.to_string())
        })
        .collect()
}

/// Read one credential from the terminal. Pasted tokens often carry stray
/// CR/BOM characters, so the input is sanitized before use.
fn prompt_credential(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_context(|| format!("failed to read {}", label))?;
    let value = sanitize(&input);
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

/// Strip carriage returns, BOM and zero-width spaces from a credential.
fn sanitize(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

/// Write `key=value` into the env file at `path`. An existing line for `key`
/// is replaced in place; otherwise the line is appended.
fn save_env_var(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    let line = format!("{}={}", key, value);
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|l| match l.split_once('=') {
            Some((k, _)) if k.trim() == key && !replaced => {
                replaced = true;
                line.clone()
            }
            _ => l.to_string(),
        })
        .collect();
    if !replaced {
        lines.push(line);
    }
    let mut contents = lines.join("\n");
    contents.push('\n');
    std::fs::write(path, contents)
}
