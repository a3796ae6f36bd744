use std::fmt::Write;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::context::{group_thousands, ContextDigest};
use crate::models::{HOURS_PER_DAY, NOON};

const HOURLY_SLICE: std::ops::Range<usize> = 8..15;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("text generation credentials are not configured")]
    MissingCredentials,
    /// Returned by `TextGenerator` implementations when the service cannot be
    /// reached. The binary ships no network generator, so only tests build it.
    #[allow(dead_code)]
    #[error("text generation service unavailable: {0}")]
    Unavailable(String),
    #[error("text generation returned an empty response")]
    EmptyResponse,
}

/// External text-generation service fed with the context digest.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Model,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

pub fn build_prompt(digest: &ContextDigest, question: &str) -> String {
    format!(
        "You are a helpful AI assistant for physician discharge data analysis.\n\n\
         {digest}\n\n\
         User question: {question}\n\n\
         Please provide a concise, actionable answer in markdown. \
         Use bullet points and small tables when helpful."
    )
}

/// Asks the generator when one is configured; any failure or blank reply
/// degrades to a template answer.
pub async fn answer(
    generator: Option<&dyn TextGenerator>,
    digest: &ContextDigest,
    hourly_totals: &[u64; HOURS_PER_DAY],
    question: &str,
) -> Answer {
    let failure = match generator {
        Some(generator) => match generator.generate(&build_prompt(digest, question)).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "model answered");
                return Answer {
                    text: text.trim().to_string(),
                    source: AnswerSource::Model,
                };
            }
            Ok(_) => ChatError::EmptyResponse,
            Err(err) => err,
        },
        None => ChatError::MissingCredentials,
    };

    warn!(error = %failure, "falling back to template answer");
    Answer {
        text: template_answer(digest, hourly_totals, question),
        source: AnswerSource::Template,
    }
}

pub fn template_answer(
    digest: &ContextDigest,
    hourly_totals: &[u64; HOURS_PER_DAY],
    question: &str,
) -> String {
    let question = question.to_lowercase();
    let mut text = String::new();

    if question.contains("top") || question.contains("perform") {
        let _ = write!(
            text,
            "**Top 5 Performing Physicians (Morning Discharge Rate)**\n\n{}",
            digest.top_performer_lines()
        );
    } else if question.contains("hourly") || question.contains("8 am") || question.contains("8am")
    {
        let _ = write!(
            text,
            "**Hourly Discharge Pattern (8:00–14:00)**\n\n| Hour | Discharges |\n|---|---:|"
        );
        for hour in HOURLY_SLICE {
            let _ = write!(text, "\n| {hour}:00 | {} |", hourly_totals[hour]);
        }
    } else if question.contains("trend") {
        let before: u64 = hourly_totals[..NOON].iter().sum();
        let after: u64 = hourly_totals[NOON..].iter().sum();
        let _ = write!(
            text,
            "**Daily Trend Overview**\n\n- Discharges before 12:00: {before}\n\
             - Discharges after 12:00: {after}\n- Peak hour: {}:00",
            digest.peak_hour
        );
    } else {
        let _ = write!(
            text,
            "**Hospital Discharge Summary**\n\n- Physicians: {}\n- Total discharges: {}\n\
             - Avg morning rate: {:.1}%\n- Peak hour: {}:00\n- Top performers:\n{}",
            digest.physician_count,
            group_thousands(digest.total_discharges),
            digest.avg_morning_rate,
            digest.peak_hour,
            digest.top_performer_lines()
        );
    }

    text
}
