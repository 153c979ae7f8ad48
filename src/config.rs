use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Delay between profile visits, applied after every outcome.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_s: u64,
    /// Extra delay applied before the standard interval when a cycle fails.
    #[serde(default = "default_failure_backoff")]
    pub failure_backoff_s: u64,
}

fn default_poll_interval() -> u64 {
    60
}
fn default_failure_backoff() -> u64 {
    60
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_s: default_poll_interval(),
            failure_backoff_s: default_failure_backoff(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriverConfig {
    /// WebDriver endpoint (chromedriver / geckodriver).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Bound on element waits; exceeding it is a recoverable extraction timeout.
    #[serde(default = "default_element_timeout")]
    pub element_timeout_ms: u64,
    #[serde(default = "default_nav_attempts")]
    pub nav_attempts: u32,
    #[serde(default = "default_nav_backoff")]
    pub nav_backoff_s: u64,
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}
fn default_element_timeout() -> u64 {
    10_000
}
fn default_nav_attempts() -> u32 {
    3
}
fn default_nav_backoff() -> u64 {
    5
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            element_timeout_ms: default_element_timeout(),
            nav_attempts: default_nav_attempts(),
            nav_backoff_s: default_nav_backoff(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_completion_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JudgeConfig {
    #[serde(default = "default_check_max_tokens")]
    pub check_max_tokens: u32,
    #[serde(default = "default_draft_max_tokens")]
    pub draft_max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_comment_len")]
    pub max_comment_len: usize,
}

fn default_check_max_tokens() -> u32 {
    70
}
fn default_draft_max_tokens() -> u32 {
    200
}
fn default_temperature() -> f64 {
    0.5
}
fn default_max_comment_len() -> usize {
    240
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            check_max_tokens: default_check_max_tokens(),
            draft_max_tokens: default_draft_max_tokens(),
            temperature: default_temperature(),
            max_comment_len: default_max_comment_len(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// Credentials resolve flag -> env var -> interactive prompt.
    /// Prompted values are saved to .env for future runs.
    pub fn credential(flag: Option<String>, env_key: &str, label: &str) -> Result<String> {
        if let Some(v) = flag.filter(|v| !v.is_empty()) {
            return Ok(sanitize_value(&v));
        }
        match std::env::var(env_key) {
            Ok(v) if !v.is_empty() => Ok(sanitize_value(&v)),
            _ => {
                let v = prompt(label)?;
                save_env_var(env_key, &v);
                Ok(v)
            }
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = input.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

/// Session prompt with a default used when the answer is left blank.
pub fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    print!("  {} [{}] > ", label, default);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = input.trim();
    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Strip carriage returns, BOM, and other invisible chars from a value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

/// Append a KEY=VALUE line to .env and set it in the current process.
fn save_env_var(key: &str, value: &str) {
    std::env::set_var(key, value);
    let path = Path::new(ENV_FILE);
    let mut contents = std::fs::read_to_string(path).unwrap_or_default();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&format!("{}={}\n", key, value));
    let _ = std::fs::write(path, contents);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.scheduler.poll_interval_s, 60);
        assert_eq!(config.scheduler.failure_backoff_s, 60);
        assert_eq!(config.driver.nav_attempts, 3);
        assert_eq!(config.driver.element_timeout_ms, 10_000);
        assert_eq!(config.judge.max_comment_len, 240);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.judge.check_max_tokens, 70);
        assert_eq!(config.judge.draft_max_tokens, 200);
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
        assert_eq!(config.driver.nav_backoff_s, 5);
    }

    #[test]
    fn test_partial_override() {
        let config: Config =
            toml::from_str("[scheduler]\npoll_interval_s = 5\n\n[judge]\nmax_comment_len = 100\n")
                .unwrap();
        assert_eq!(config.scheduler.poll_interval_s, 5);
        assert_eq!(config.scheduler.failure_backoff_s, 60);
        assert_eq!(config.judge.max_comment_len, 100);
        assert_eq!(config.judge.temperature, 0.5);
    }

    #[test]
    fn test_sanitize_strips_invisible_chars() {
        assert_eq!(sanitize_value("\u{feff}key\r\n"), "key");
        assert_eq!(sanitize_value("  plain  "), "plain");
    }
}
