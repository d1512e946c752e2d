//! Receipt categorization: remembered corrections, then an optional remote
//! language model, then the keyword rules.
//!
//! Remote failures never reach the caller. They are logged and recorded in
//! [`Source::Keyword`] so callers can tell a fallback from a model answer.

use anyhow::{Result, bail};
use cfo_core::{Category, Corrections};
use tracing::{debug, warn};

use crate::category_rules::{keyword_category, keyword_insight};

pub const SYSTEM_PROMPT: &str = "You are a helpful finance assistant.";
pub const NO_INSIGHT: &str = "No insight generated.";
pub const CORRECTION_INSIGHT: &str = "Category remembered from your earlier correction.";

/// A text-generation backend able to answer one prompt.
pub trait RemoteClassifier {
    /// Send `prompt` with the given system message and return the raw reply.
    fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct CategorizerConfig {
    /// Check saved corrections before asking the model or the keyword rules
    pub consult_corrections: bool,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            consult_corrections: true,
        }
    }
}

/// Where a classification came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A saved correction matched; `key` is the stored lower-cased text
    Correction { key: String },
    /// The remote model answered
    Remote,
    /// Keyword rules; `fallback` holds the remote error when one was tried
    Keyword { fallback: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub insight: String,
    pub source: Source,
}

impl Classification {
    pub fn into_pair(self) -> (Category, String) {
        (self.category, self.insight)
    }

    /// True when a configured remote classifier failed and keywords were used
    pub fn used_fallback(&self) -> bool {
        matches!(self.source, Source::Keyword { fallback: Some(_) })
    }
}

pub struct Categorizer {
    config: CategorizerConfig,
    remote: Option<Box<dyn RemoteClassifier>>,
    corrections: Corrections,
}

impl Categorizer {
    pub fn new(config: CategorizerConfig) -> Self {
        Self {
            config,
            remote: None,
            corrections: Corrections::new(),
        }
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteClassifier>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_corrections(mut self, corrections: Corrections) -> Self {
        self.corrections = corrections;
        self
    }

    pub fn has_remote_classifier(&self) -> bool {
        self.remote.is_some()
    }

    /// Record a correction in memory (persisting it is the Store's job)
    pub fn remember(&mut self, text: &str, category: Category) {
        self.corrections
            .insert(text.to_lowercase(), category.label().to_string());
    }

    pub fn categorize_and_analyze(&self, text: &str) -> Classification {
        if self.config.consult_corrections {
            if let Some((key, category)) = self.lookup_correction(text) {
                debug!(%key, %category, "using saved correction");
                return Classification {
                    category,
                    insight: CORRECTION_INSIGHT.to_string(),
                    source: Source::Correction { key },
                };
            }
        }

        let mut fallback = None;
        if let Some(remote) = &self.remote {
            match classify_remote(remote.as_ref(), text) {
                Ok((category, insight)) => {
                    return Classification {
                        category,
                        insight,
                        source: Source::Remote,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "remote classifier failed; falling back to keyword mode");
                    fallback = Some(e.to_string());
                }
            }
        }

        let category = keyword_category(text);
        Classification {
            category,
            insight: keyword_insight(category),
            source: Source::Keyword { fallback },
        }
    }

    /// Exact match on the lower-cased text first, then the longest stored key
    /// contained in it.
    fn lookup_correction(&self, text: &str) -> Option<(String, Category)> {
        let lower = text.to_lowercase();
        let trimmed = lower.trim();

        let exact = [lower.as_str(), trimmed]
            .into_iter()
            .find_map(|k| self.corrections.get_key_value(k));
        let hit = exact.or_else(|| {
            self.corrections
                .iter()
                .filter(|(k, _)| {
                    let k = k.trim();
                    !k.is_empty() && trimmed.contains(k)
                })
                .max_by_key(|(k, _)| k.trim().len())
        })?;

        let (key, label) = hit;
        match Category::from_label(label) {
            Some(category) => Some((key.clone(), category)),
            None => {
                warn!(%key, %label, "ignoring correction with unknown category");
                None
            }
        }
    }
}

fn classify_remote(remote: &dyn RemoteClassifier, text: &str) -> Result<(Category, String)> {
    let reply = remote.complete(SYSTEM_PROMPT, &build_prompt(text))?;
    if reply.trim().is_empty() {
        bail!("remote classifier returned an empty reply");
    }
    debug!(%reply, "remote classifier reply");
    Ok(parse_reply(&reply))
}

/// Prompt sent to the remote model for one receipt
pub fn build_prompt(text: &str) -> String {
    format!(
        "You are an expense categorization assistant.\n\
Given the OCR text below, identify:\n\
1. The most likely expense category (Housing, Food, Transport, Education, Subscription, Misc).\n\
2. A short financial insight (1 sentence) about this expense.\n\
\n\
OCR TEXT:\n\
{text}\n"
    )
}

/// Pull the category and insight out of a free-text model reply.
///
/// The first line mentioning "category" gives the category, the first other
/// line mentioning "insight" gives the insight; the value is whatever follows
/// the last colon. Later lines never override either one. Missing parts, and
/// an insight line with nothing after the colon, default to Misc /
/// [`NO_INSIGHT`]; a label outside the six categories becomes Misc.
pub fn parse_reply(reply: &str) -> (Category, String) {
    let mut category: Option<Category> = None;
    let mut insight: Option<String> = None;
    let mut insight_seen = false;

    for line in reply.lines() {
        let lower = line.to_lowercase();
        if category.is_none() && lower.contains("category") {
            category = Some(Category::from_label(after_last_colon(line)).unwrap_or(Category::Misc));
            continue;
        }
        if !insight_seen && lower.contains("insight") {
            insight_seen = true;
            let value = after_last_colon(line);
            if !value.is_empty() {
                insight = Some(value.to_string());
            }
        }
    }

    (
        category.unwrap_or(Category::Misc),
        insight.unwrap_or_else(|| NO_INSIGHT.to_string()),
    )
}

fn after_last_colon(line: &str) -> &str {
    line.rsplit(':').next().unwrap_or(line).trim()
}
