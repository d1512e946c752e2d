use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_data_dir, ensure_cfo_home, expand_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub storage: StorageSection,
    pub dashboard: DashboardSection,
    pub ocr: OcrSection,
}

/// Which OpenAI-compatible endpoint classifies receipts. `none` keeps
/// classification on the keyword rules. The provider picks the default URL,
/// model and key variable; each can be overridden in `[llm]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    OpenAI,
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Environment variable holding the API key; remote classification is
    /// enabled only when it is set and non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Defaults to ~/.mini-cfo/data
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    pub balance: f64,
    pub income: f64,
    pub roommates: Vec<String>,
    /// IANA timezone used to date scanned receipts
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSection {
    pub command: String,
    pub language: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: Provider::Groq,
            base_url: None,
            model: None,
            api_key_env: None,
            temperature: 0.2,
            max_tokens: 150,
            timeout_secs: 30,
        }
    }
}

impl Provider {
    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Disabled => "",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Disabled => "",
        }
    }

    fn default_api_key_env(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Disabled => "",
        }
    }
}

impl LlmSection {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_key_env())
    }
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            balance: 3000.0,
            income: 3000.0,
            roommates: vec!["Alex".to_string(), "Maya".to_string()],
            timezone: "America/Chicago".to_string(),
        }
    }
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: None,
        }
    }
}

impl Config {
    /// Data directory: explicit override, then config, then ~/.mini-cfo/data
    pub fn data_dir(&self, override_dir: Option<PathBuf>) -> Result<PathBuf> {
        match override_dir.or_else(|| self.storage.data_dir.clone()) {
            Some(p) => expand_home(&p),
            None => default_data_dir(),
        }
    }

    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.dashboard
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid [dashboard].timezone '{}': {e}", self.dashboard.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cfo_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<()> {
    print!("{}", toml::to_string_pretty(cfg).context("serialize config")?);
    Ok(())
}
