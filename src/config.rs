//! Configuration loader and validator for the Notion→Webflow pipeline.
//!
//! Settings come from an optional YAML file; credentials and ids are normally
//! supplied through environment variables, which override the file.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub notion: Notion,
    pub openai: OpenAi,
    pub webflow: Webflow,
    pub pipeline: Pipeline,
}

/// Source database settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Notion {
    pub base_url: String,
    pub token: String,
    pub version: String,
    pub database_id: String,
    /// Status value a row must carry to be picked up.
    pub status_value: String,
    pub properties: NotionProperties,
}

/// Property names in the source database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotionProperties {
    pub title: String,
    pub status: String,
    pub short_description: Option<String>,
    pub featured_sentence: Option<String>,
}

/// Completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAi {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Destination collection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Webflow {
    pub base_url: String,
    pub token: String,
    pub collection_id: String,
    pub fields: WebflowFields,
}

/// Field slugs in the destination collection. Optional slugs are only sent
/// when the record carries a value for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WebflowFields {
    pub body: String,
    pub meta_description: Option<String>,
    pub short_description: Option<String>,
    pub featured_sentence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Pipeline {
    pub generate_meta_description: bool,
}

impl Default for Notion {
    fn default() -> Self {
        Self {
            base_url: "https://api.notion.com/".into(),
            token: String::new(),
            version: "2022-06-28".into(),
            database_id: String::new(),
            status_value: "Ready for Webflow".into(),
            properties: NotionProperties::default(),
        }
    }
}

impl Default for NotionProperties {
    fn default() -> Self {
        Self {
            title: "Name".into(),
            status: "Status".into(),
            short_description: None,
            featured_sentence: None,
        }
    }
}

impl Default for OpenAi {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/".into(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".into(),
            max_tokens: 150,
            temperature: 0.7,
        }
    }
}

impl Default for Webflow {
    fn default() -> Self {
        Self {
            base_url: "https://api.webflow.com/".into(),
            token: String::new(),
            collection_id: String::new(),
            fields: WebflowFields::default(),
        }
    }
}

impl Default for WebflowFields {
    fn default() -> Self {
        Self {
            body: "blog-content-rich-text".into(),
            meta_description: None,
            short_description: None,
            featured_sentence: None,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            generate_meta_description: true,
        }
    }
}

impl Config {
    /// Overlay credentials and ids found through `lookup` (normally the
    /// process environment). Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("NOTION_API_KEY") {
            self.notion.token = v;
        }
        if let Some(v) = get("NOTION_DATABASE_ID") {
            self.notion.database_id = v;
        }
        if let Some(v) = get("OPENAI_API_KEY").or_else(|| get("CHATGPT_API_KEY")) {
            self.openai.api_key = v;
        }
        if let Some(v) = get("WEBFLOW_API_TOKEN") {
            self.webflow.token = v;
        }
        if let Some(v) = get("WEBFLOW_COLLECTION_ID") {
            self.webflow.collection_id = v;
        }
    }
}

/// Load configuration, overlay the process environment and validate it.
/// - If `path` is None, `config.yaml` is read when present and defaults are
///   used otherwise. An explicit path must exist.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = match path {
        Some(p) => parse_file(p)?,
        None => {
            let p = Path::new(DEFAULT_CONFIG_PATH);
            if p.exists() {
                parse_file(p)?
            } else {
                Config::default()
            }
        }
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    // An empty file deserializes to unit, not a mapping.
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(&content)?)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.notion.token.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.token (NOTION_API_KEY) must be non-empty"));
    }
    if cfg.notion.database_id.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "notion.database_id (NOTION_DATABASE_ID) must be non-empty",
        ));
    }
    if cfg.notion.version.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.version must be non-empty"));
    }
    if cfg.notion.properties.title.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.properties.title must be non-empty"));
    }
    if cfg.notion.properties.status.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.properties.status must be non-empty"));
    }

    if cfg.openai.api_key.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "openai.api_key (OPENAI_API_KEY or CHATGPT_API_KEY) must be non-empty",
        ));
    }
    if cfg.openai.model.trim().is_empty() {
        return Err(ConfigError::Invalid("openai.model must be non-empty"));
    }
    if cfg.openai.max_tokens == 0 {
        return Err(ConfigError::Invalid("openai.max_tokens must be > 0"));
    }
    if !(0.0..=2.0).contains(&cfg.openai.temperature) {
        return Err(ConfigError::Invalid("openai.temperature must be within 0..=2"));
    }

    if cfg.webflow.token.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "webflow.token (WEBFLOW_API_TOKEN) must be non-empty",
        ));
    }
    if cfg.webflow.collection_id.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "webflow.collection_id (WEBFLOW_COLLECTION_ID) must be non-empty",
        ));
    }
    if cfg.webflow.fields.body.trim().is_empty() {
        return Err(ConfigError::Invalid("webflow.fields.body must be non-empty"));
    }

    if Url::parse(&cfg.notion.base_url).is_err() {
        return Err(ConfigError::Invalid("notion.base_url must be a valid URL"));
    }
    if Url::parse(&cfg.openai.base_url).is_err() {
        return Err(ConfigError::Invalid("openai.base_url must be a valid URL"));
    }
    if Url::parse(&cfg.webflow.base_url).is_err() {
        return Err(ConfigError::Invalid("webflow.base_url must be a valid URL"));
    }

    Ok(())
}

/// Example YAML with every setting spelled out.
pub fn example() -> &'static str {
    r#"notion:
  token: "YOUR_NOTION_INTEGRATION_TOKEN"
  version: "2022-06-28"
  database_id: "NOTION_DATABASE_ID"
  status_value: "Ready for Webflow"
  properties:
    title: "Name"
    status: "Status"
    short_description: "Short Description"

openai:
  api_key: "YOUR_OPENAI_API_KEY"
  model: "gpt-3.5-turbo"
  max_tokens: 150
  temperature: 0.7

webflow:
  token: "YOUR_WEBFLOW_API_TOKEN"
  collection_id: "WEBFLOW_COLLECTION_ID"
  fields:
    body: "blog-content-rich-text"
    meta_description: "meta-description"
    short_description: "short-description"

pipeline:
  generate_meta_description: true
"#
}
