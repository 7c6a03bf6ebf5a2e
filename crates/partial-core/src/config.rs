//! Partial-request configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::protocol;

/// Names and settings the partial lifecycle reads from the request and
/// applies to the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConfig {
    /// Header (and fallback parameter) carrying the request kind.
    #[serde(default = "default_request_header")]
    pub request_header: String,

    /// Parameter listing the client ids to execute.
    #[serde(default = "default_execute_param")]
    pub execute_param: String,

    /// Parameter listing the client ids to render.
    #[serde(default = "default_render_param")]
    pub render_param: String,

    /// Parameter asking for component values to be reset before rendering.
    #[serde(default = "default_reset_values_param")]
    pub reset_values_param: String,

    /// Separator between naming-container segments of a client id.
    #[serde(default = "default_separator")]
    pub separator: char,

    /// Encoding used when the request does not declare one.
    #[serde(default = "default_character_encoding")]
    pub character_encoding: String,

    /// Response buffer size applied when the writer binds (bytes).
    #[serde(default = "default_buffer_size")]
    pub response_buffer_size: usize,

    /// When the partial writer flushes the transport.
    #[serde(default)]
    pub flush: FlushMode,
}

/// Flush behaviour of the partial response writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushMode {
    /// Flush once, when the document ends.
    #[default]
    EndOfDocument,
    /// Flush after every closed section.
    EachSection,
    /// Never flush implicitly.
    Manual,
}

fn default_request_header() -> String {
    "Faces-Request".to_string()
}

fn default_execute_param() -> String {
    "jakarta.faces.partial.execute".to_string()
}

fn default_render_param() -> String {
    "jakarta.faces.partial.render".to_string()
}

fn default_reset_values_param() -> String {
    "jakarta.faces.partial.resetValues".to_string()
}

fn default_separator() -> char {
    ':'
}

fn default_character_encoding() -> String {
    protocol::DEFAULT_CHARACTER_ENCODING.to_string()
}

fn default_buffer_size() -> usize {
    8192
}

impl Default for PartialConfig {
    fn default() -> Self {
        Self {
            request_header: default_request_header(),
            execute_param: default_execute_param(),
            render_param: default_render_param(),
            reset_values_param: default_reset_values_param(),
            separator: default_separator(),
            character_encoding: default_character_encoding(),
            response_buffer_size: default_buffer_size(),
            flush: FlushMode::default(),
        }
    }
}

impl PartialConfig {
    /// Load config from a TOML or JSON file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = if path.ends_with(".json") {
            Self::from_json(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))?
        } else {
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse config from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reject configurations the lifecycle cannot work with.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("request_header", &self.request_header),
            ("execute_param", &self.execute_param),
            ("render_param", &self.render_param),
            ("reset_values_param", &self.reset_values_param),
            ("character_encoding", &self.character_encoding),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                anyhow::bail!("`{}` must not be empty", field);
            }
        }
        if self.separator.is_whitespace() {
            anyhow::bail!("`separator` must not be whitespace");
        }
        Ok(())
    }

    /// Set the request header name.
    pub fn with_request_header(mut self, name: impl Into<String>) -> Self {
        self.request_header = name.into();
        self
    }

    /// Set the flush mode.
    pub fn with_flush(mut self, flush: FlushMode) -> Self {
        self.flush = flush;
        self
    }

    /// Set the response buffer size.
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.response_buffer_size = bytes;
        self
    }
}
