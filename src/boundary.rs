// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! External collaborators behind traits: text generation for breach
//! narratives and the notification transport. Failures here must never
//! take down the pipeline; callers fall back to deterministic templates
//! and record the degradation.

use serde::Deserialize;

use crate::error::PipelineError;
use crate::models::Breach;
use crate::utils::http_client;

/// Produces a short narrative for a breach. Output may be plain text,
/// JSON, or JSON wrapped in code fences; callers salvage it with
/// [`extract_json_block`].
pub trait TextGenerator {
    fn breach_summary(&self, breach: &Breach) -> Result<String, PipelineError>;
}

/// Delivers a rendered notification. Returns Ok only when the transport
/// accepted the message.
pub trait NotificationTransport {
    fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), PipelineError>;
}

/// Offline generator: emits the deterministic template wrapped in the
/// structured JSON shape a well-behaved remote generator would return.
#[derive(Debug, Default)]
pub struct TemplateGenerator;

impl TextGenerator for TemplateGenerator {
    fn breach_summary(&self, breach: &Breach) -> Result<String, PipelineError> {
        Ok(serde_json::json!({ "summary": fallback_narrative(breach) }).to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    text: String,
}

/// Remote text-generation endpoint speaking a plain prompt/text JSON pair.
pub struct HttpTextGenerator {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTextGenerator {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        Ok(HttpTextGenerator {
            endpoint: endpoint.to_string(),
            client: http_client()?,
        })
    }
}

impl TextGenerator for HttpTextGenerator {
    fn breach_summary(&self, breach: &Breach) -> Result<String, PipelineError> {
        let prompt = format!(
            "Summarize this budget breach for a finance audience in two sentences. \
             Respond as JSON: {{\"summary\": \"...\"}}. \
             Department: {}. Category: {}. Limit: ${:.2}. Spent: ${:.2}. \
             Overage: ${:.2} ({}% of budget used). Recurring: {}.",
            breach.department,
            breach.category,
            breach.limit,
            breach.spent,
            breach.overage,
            breach.usage_percent,
            if breach.is_recurring { "yes" } else { "no" }
        );
        let resp: GeneratedText = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::ExternalCall(e.to_string()))?
            .json()
            .map_err(|e| PipelineError::ExternalCall(e.to_string()))?;
        Ok(resp.text)
    }
}

/// Default transport: prints the rendered notification to stdout.
#[derive(Debug, Default)]
pub struct ConsoleTransport;

impl NotificationTransport for ConsoleTransport {
    fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), PipelineError> {
        println!("To: {}", recipients.join(", "));
        println!("Subject: {subject}");
        println!("{body}");
        Ok(())
    }
}

/// Posts the rendered notification to a webhook as JSON.
pub struct WebhookTransport {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookTransport {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(WebhookTransport {
            url: url.to_string(),
            client: http_client()?,
        })
    }
}

impl NotificationTransport for WebhookTransport {
    fn send(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), PipelineError> {
        self.client
            .post(&self.url)
            .json(&serde_json::json!({
                "subject": subject,
                "body": body,
                "recipients": recipients,
            }))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::ExternalCall(e.to_string()))?;
        Ok(())
    }
}

/// Strips optional Markdown code fences and attempts a JSON parse.
/// Returns None for anything that does not parse; the caller decides on
/// the fallback.
pub fn extract_json_block(text: &str) -> Option<serde_json::Value> {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    serde_json::from_str(t.trim()).ok()
}

/// Deterministic narrative used whenever the generator fails or returns
/// something unusable.
pub fn fallback_narrative(breach: &Breach) -> String {
    format!(
        "Budget breach detected in {}/{}: ${:.2} spent against a ${:.2} limit ({}% of budget, ${:.2} over).",
        breach.department,
        breach.category,
        breach.spent,
        breach.limit,
        breach.usage_percent,
        breach.overage
    )
}
