//! Webhook notifications for allergen alerts.
//!
//! Alerts are posted to a configured webhook URL using the Discord-compatible
//! embed wire shape: `{ content?, embeds: [{ title?, description?, color?,
//! fields: [{ name, value, inline }] }] }`. The endpoint signals success with
//! 204 No Content and nothing else.

use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::scanner::AllergenAlert;

/// Red, for allergen hits.
const ALERT_COLOR: u32 = 0xFF0000;

/// Timeout for webhook delivery, matching the portal-call bound.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The webhook answered with anything other than 204.
    #[error("webhook returned status {0}")]
    Status(u16),
    #[error("failed to send webhook: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Top-level webhook payload.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Embed {
    /// Build the allergen-alert embed: one (Date, Meal, Allergen Ingredients)
    /// field triple per flagged meal, in delivery-then-meal order.
    pub fn allergen_alert(alert: &AllergenAlert) -> Self {
        let mut fields = Vec::with_capacity(alert.meals.len() * 3);
        for meal in &alert.meals {
            fields.push(EmbedField {
                name: "Date".to_string(),
                value: alert.date.clone(),
                inline: false,
            });
            fields.push(EmbedField {
                name: "Meal".to_string(),
                value: meal.menu_meal_name.clone(),
                inline: false,
            });
            fields.push(EmbedField {
                name: "Allergen Ingredients".to_string(),
                value: meal.matched_ingredients.join("\n"),
                inline: false,
            });
        }

        Self {
            title: Some("⚠️ Allergen Alert".to_string()),
            description: Some(format!(
                "Found {} meals containing allergens!",
                alert.meals.len()
            )),
            color: Some(ALERT_COLOR),
            fields,
        }
    }
}

/// Posts alert embeds to a single configured webhook URL.
pub struct WebhookNotifier {
    http_client: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: reqwest::Client::builder()
                .timeout(DISPATCH_TIMEOUT)
                .build()?,
            webhook_url,
        })
    }

    /// POST one embed to the webhook. Success is exactly 204; a 200 from a
    /// misconfigured endpoint is an error here. Single attempt, no retry.
    pub async fn send(&self, content: Option<String>, embed: Embed) -> Result<(), DispatchError> {
        let message = WebhookMessage {
            content,
            embeds: vec![embed],
        };

        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(DispatchError::Status(status.as_u16()));
        }
        Ok(())
    }
}
