use anyhow::{Context, Result, bail};
use cfo_finance::RemoteClassifier;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::{LlmSection, Provider};

/// OpenAI-compatible chat-completions client (Groq or OpenAI)
#[derive(Clone)]
pub struct LlmClient {
    config: LlmSection,
    api_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

impl LlmClient {
    /// Build a client when a provider is configured and its API key is present
    /// in the environment. `None` means remote features are unavailable.
    pub fn from_config(config: &LlmSection) -> Option<LlmClient> {
        if config.provider == Provider::Disabled {
            debug!("llm provider disabled in config");
            return None;
        }
        let api_key = std::env::var(config.api_key_env())
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        match api_key {
            Some(api_key) => Some(LlmClient {
                config: config.clone(),
                api_key,
            }),
            None => {
                debug!(env = config.api_key_env(), "no API key in environment; remote classifier off");
                None
            }
        }
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// Blocking chat completion. Drives the async request on the current
    /// runtime if there is one, otherwise on a fresh single-threaded runtime.
    pub fn chat_complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.chat_complete_async(system, turns)))
        } else {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("create tokio runtime")?;
            rt.block_on(self.chat_complete_async(system, turns))
        }
    }

    async fn chat_complete_async(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        let body = build_request(&self.config, system, turns);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .context("build http client")?;
        let resp = client
            .post(completions_url(self.config.base_url()))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("chat completion request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("llm error: {status} {txt}");
        }

        let out: ChatResponse = resp.json().await.context("parse chat completion response")?;
        first_choice_text(out)
    }
}

impl RemoteClassifier for LlmClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat_complete(system, &[ChatTurn::user(prompt)])
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatTurn>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Debug, Deserialize)]
struct MsgOut {
    content: Option<String>,
}

fn build_request(config: &LlmSection, system: &str, turns: &[ChatTurn]) -> ChatRequest {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatTurn {
        role: "system".to_string(),
        content: system.to_string(),
    });
    messages.extend(turns.iter().cloned());

    ChatRequest {
        model: config.model().to_string(),
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

fn first_choice_text(out: ChatResponse) -> Result<String> {
    let content = out
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("chat completion had no choices")?;
    Ok(content.trim().to_string())
}
