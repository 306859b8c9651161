// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Responder adapters.
//!
//! Turns a [`ResponderSpec`] into a live [`Responder`]:
//!
//! - [`FixtureResponder`] replays canned responses
//! - [`CommandResponder`] runs a program and returns its standard output
//! - [`ChatResponder`] asks an OpenAI-compatible chat completion endpoint
//!
//! Every failure is returned as an error and recorded by the runner as a
//! per-iteration fault.

use crate::suite::ResponderSpec;
use reqwest::blocking::Client;
use semtest_core::{BoxError, Responder, Settings};
use serde::{Deserialize, Serialize};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Errors produced by responders.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// A fixture was called more times than it has responses.
    #[error("fixture exhausted after {0} responses")]
    Exhausted(usize),

    /// A fixture response is on the reject list.
    #[error("rejected response: {0}")]
    Rejected(String),

    /// The program could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("'{program}' exited with {status}: {stderr}")]
    CommandFailed {
        /// Program name.
        program: String,
        /// Rendered exit status.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The chat request could not be sent or read.
    #[error("chat request failed: {0}")]
    Http(String),

    /// The chat endpoint answered with a non-success status.
    #[error("chat endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The chat response carried no message content.
    #[error("chat response had no content")]
    EmptyCompletion,
}

/// Instantiate a fresh responder for `spec`.
pub fn build_responder(spec: &ResponderSpec, settings: &Settings) -> Result<Box<dyn Responder>, ResponderError> {
    let responder: Box<dyn Responder> = match spec {
        ResponderSpec::Fixture { responses, reject } => {
            Box::new(FixtureResponder::new(responses.clone()).with_reject(reject.clone()))
        }
        ResponderSpec::Command { program, args } => {
            Box::new(CommandResponder::new(program.clone(), args.clone()))
        }
        ResponderSpec::Chat {
            prompt,
            model,
            system,
            temperature,
        } => {
            let mut chat = ChatResponder::new(settings, prompt.clone())?;
            if let Some(model) = model {
                chat = chat.with_model(model.clone());
            }
            if let Some(system) = system {
                chat = chat.with_system(system.clone());
            }
            chat.temperature = *temperature;
            Box::new(chat)
        }
    };
    Ok(responder)
}

/// Replays responses in order, one per call.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureResponder {
    responses: Vec<String>,
    reject: Vec<String>,
    cursor: usize,
}

impl FixtureResponder {
    /// Fixture over `responses`.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            reject: Vec::new(),
            cursor: 0,
        }
    }

    /// Responses to report as faults instead of returning.
    pub fn with_reject(mut self, reject: Vec<String>) -> Self {
        self.reject = reject;
        self
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl Responder for FixtureResponder {
    fn respond(&mut self, _args: &[String]) -> Result<String, BoxError> {
        let response = self
            .responses
            .get(self.cursor)
            .cloned()
            .ok_or(ResponderError::Exhausted(self.responses.len()))?;
        self.cursor += 1;

        if self.reject.contains(&response) {
            return Err(ResponderError::Rejected(response).into());
        }
        Ok(response)
    }
}

/// Runs `program` with its fixed arguments followed by the forwarded ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponder {
    program: String,
    args: Vec<String>,
}

impl CommandResponder {
    /// Command responder for `program args...`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Responder for CommandResponder {
    fn respond(&mut self, args: &[String]) -> Result<String, BoxError> {
        debug!(program = %self.program, "running command responder");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(args)
            .output()
            .map_err(|source| ResponderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ResponderError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends the prompt to `{base_url}/chat/completions` on every call.
#[derive(Debug, Clone)]
pub struct ChatResponder {
    client: Client,
    api_key: String,
    url: String,
    model: String,
    prompt: String,
    system: Option<String>,
    temperature: Option<f32>,
}

impl ChatResponder {
    /// Chat responder using the configured endpoint and chat model.
    pub fn new(settings: &Settings, prompt: impl Into<String>) -> Result<Self, ResponderError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| ResponderError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.openai_api_key.clone(),
            url: settings.endpoint("chat/completions"),
            model: settings.chat_model.clone(),
            prompt: prompt.into(),
            system: None,
            temperature: None,
        })
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Add a system message.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Prompt with forwarded arguments appended, space separated.
    fn user_message(&self, args: &[String]) -> String {
        if args.is_empty() {
            self.prompt.clone()
        } else {
            format!("{} {}", self.prompt, args.join(" "))
        }
    }

    fn parse(body: &str) -> Result<String, ResponderError> {
        let response: ChatResponse =
            serde_json::from_str(body).map_err(|e| ResponderError::Http(format!("{e}: {body}")))?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ResponderError::EmptyCompletion)
    }
}

impl Responder for ChatResponder {
    fn respond(&mut self, args: &[String]) -> Result<String, BoxError> {
        let user = self.user_message(args);
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &user,
        });

        debug!(model = %self.model, "requesting chat completion");
        let mut request = self.client.post(&self.url).json(&ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .map_err(|e| ResponderError::Http(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ResponderError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(ResponderError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Ok(Self::parse(&body)?)
    }
}
