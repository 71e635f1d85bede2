//! OpenAI-compatible text generation provider

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::models::{QuizQuestion, SummaryLength};

use super::TextGenerator;

/// Chat model requested from the provider
const CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST a chat completion and return the assistant message text
    async fn chat(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": CHAT_MODEL,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user}
                ],
                "max_tokens": max_tokens,
                "temperature": 0.3
            }))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("chat completion request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("provider error ({status}): {body}"));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("chat completion response unreadable")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("provider returned no content"))?;

        if content.trim().is_empty() {
            return Err(anyhow!("provider returned empty content"));
        }

        Ok(content.trim().to_string())
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_summary(&self, content: &str, length: SummaryLength) -> Result<String> {
        let prompt = format!(
            "Please provide a {} summary of the following document content in {}:\n\n\
             {}\n\nSummary:",
            length.as_str(),
            length.sentence_range(),
            content
        );

        self.chat(
            "You are a helpful assistant that creates concise, accurate summaries of documents.",
            &prompt,
            500,
        )
        .await
    }

    async fn generate_quiz(
        &self,
        content: &str,
        question_count: usize,
    ) -> Result<Vec<QuizQuestion>> {
        let prompt = format!(
            "Based on the following document content, generate {question_count} multiple \
             choice quiz questions. Each question should have 4 options (A, B, C, D) with \
             only one correct answer.\n\n\
             Document content:\n{content}\n\n\
             Format the response as a JSON array with objects of the shape:\n\
             {{\"question\": \"...\", \"options\": {{\"A\": \"...\", \"B\": \"...\", \
             \"C\": \"...\", \"D\": \"...\"}}, \"correct_answer\": \"A\", \
             \"explanation\": \"...\"}}\n\n\
             Return ONLY the JSON array, no other text."
        );

        let raw = self
            .chat(
                "You are a helpful assistant that creates educational quiz questions based \
                 on document content.",
                &prompt,
                2000,
            )
            .await?;

        let json_str = extract_json_array(&raw)
            .ok_or_else(|| anyhow!("no JSON array found in provider output"))?;
        let questions: Vec<QuizQuestion> =
            serde_json::from_str(json_str).context("quiz JSON did not match expected shape")?;

        if questions.len() != question_count {
            return Err(anyhow!(
                "provider returned {} questions, expected {question_count}",
                questions.len()
            ));
        }
        if let Some(bad) = questions.iter().find(|q| !q.is_well_formed()) {
            return Err(anyhow!("malformed question in provider output: {:?}", bad.question));
        }

        Ok(questions)
    }
}

/// Locate the outermost JSON array in model output
///
/// Tolerates prose or code fences around the array.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_array_extraction_strips_fences() {
        let raw = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(extract_json_array(raw), Some("[{\"a\": 1}]"));
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn quiz_questions_parse_from_provider_shape() {
        let raw = r#"[{
            "question": "What does chlorophyll absorb?",
            "options": {"A": "Light", "B": "Water", "C": "Soil", "D": "Oxygen"},
            "correct_answer": "A",
            "explanation": "Chlorophyll absorbs light energy."
        }]"#;
        let questions: Vec<QuizQuestion> =
            serde_json::from_str(extract_json_array(raw).unwrap()).unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].is_well_formed());
    }
}
