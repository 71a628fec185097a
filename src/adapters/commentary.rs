//! Commentary generators: offline templates and an OpenAI-compatible client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::decision::{Decision, Signal};
use crate::domain::error::QuantsigError;
use crate::ports::commentary::CommentaryGenerator;

/// Offline commentary built from the decision fields. Always available, so
/// it doubles as the fallback provider when no LLM is configured.
pub struct TemplateCommentary;

#[async_trait]
impl CommentaryGenerator for TemplateCommentary {
    async fn generate(&self, decision: &Decision) -> Result<String, QuantsigError> {
        let stance = match decision.action {
            Signal::Buy => "Momentum favors accumulating a position",
            Signal::Sell => "Momentum favors reducing exposure",
            Signal::Hold => "Conditions do not favor acting",
        };
        Ok(format!(
            "{symbol} closed at ${close:.2} with a {action} signal at {confidence}% confidence. \
             {rationale} {stance}; treat this as advisory input, not an order instruction.",
            symbol = decision.symbol,
            close = decision.last_close,
            action = decision.action,
            confidence = decision.confidence,
            rationale = decision.rationale,
            stance = stance,
        ))
    }
}

/// OpenAI-compatible chat-completions client for richer commentary.
pub struct LlmCommentary {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmCommentary {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

fn build_prompt(decision: &Decision) -> String {
    format!(
        "Write a concise, professional 3-sentence market commentary on the following \
         trading decision. Briefly explain the rationale and advise on next steps.\n\
         Asset: {}\nCurrent price: ${:.2}\nTrading signal: {}\nConfidence: {}%\n\
         Quant rationale: {}",
        decision.symbol,
        decision.last_close,
        decision.action,
        decision.confidence,
        decision.rationale,
    )
}

#[async_trait]
impl CommentaryGenerator for LlmCommentary {
    async fn generate(&self, decision: &Decision) -> Result<String, QuantsigError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(decision),
            }],
            max_tokens: 256,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| QuantsigError::Commentary {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(QuantsigError::Commentary {
                reason: format!("upstream returned HTTP {}", response.status()),
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| QuantsigError::Commentary {
            reason: format!("malformed completion payload: {e}"),
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| QuantsigError::Commentary {
                reason: "completion contained no choices".to_string(),
            })
    }
}
