// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime settings.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional `semtest.toml` in the working directory
//! 3. `SEMTEST_*` environment variables
//! 4. the unprefixed variables `OPENAI_API_KEY`, `BASE_URL` and
//!    `DEFAULT_EMBEDDING_MODEL`
//!
//! A `.env` file in the working directory is read into the environment
//! before any of the above is evaluated.

use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenAI-compatible API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Default chat model for `chat` responders.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Settings shared by the embedding client, responders and the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// API key sent as a bearer token. Empty means no `Authorization` header.
    #[serde(default)]
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API, without trailing slash.
    pub base_url: String,
    /// Model used to embed expectations and responses.
    pub embedding_model: String,
    /// Model used by `chat` responders that do not name one.
    pub chat_model: String,
    /// Per-request timeout. Unset means requests may block indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Keep running the remaining benchmarks after a fatal benchmark error.
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            request_timeout_secs: None,
            continue_on_error: false,
        }
    }
}

impl Settings {
    /// Load settings from `.env`, `semtest.toml` and the environment.
    pub fn load() -> Result<Self> {
        env_file_loaded(dotenvy::dotenv())?;
        Self::load_from(File::with_name("semtest").required(false))
    }

    fn load_from(file: File<config::FileSourceFile, config::FileFormat>) -> Result<Self> {
        let defaults = Settings::default();
        let settings: Settings = Config::builder()
            .set_default("openai_api_key", defaults.openai_api_key)?
            .set_default("base_url", defaults.base_url)?
            .set_default("embedding_model", defaults.embedding_model)?
            .set_default("chat_model", defaults.chat_model)?
            .set_default("continue_on_error", defaults.continue_on_error)?
            .add_source(file)
            .add_source(Environment::with_prefix("SEMTEST").try_parsing(true))
            .set_override_option("openai_api_key", std::env::var("OPENAI_API_KEY").ok())?
            .set_override_option("base_url", std::env::var("BASE_URL").ok())?
            .set_override_option(
                "embedding_model",
                std::env::var("DEFAULT_EMBEDDING_MODEL").ok(),
            )?
            .build()?
            .try_deserialize()?;

        Ok(settings.normalized())
    }

    /// Request timeout as a [`Duration`], if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Join `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn normalized(mut self) -> Self {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn env_file_loaded<T>(result: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!(".env: {e}"))),
    }
}
