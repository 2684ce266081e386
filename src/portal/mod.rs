//! Client for the meal-delivery portal's customer API.
//!
//! The portal is session-cookie based: [`PortalClient::login`] performs the
//! one-shot credential login, and every read operation afterwards goes through
//! the cookie-carrying transport so the session rides along automatically.
//! All reads are single-attempt; nothing here retries.

mod session;
mod types;

pub use session::{AuthError, Session, SessionCookie};
pub use types::{
    Delivery, DeliveryMeal, DeliveryMenu, Ingredient, MenuItem, Nutrition, OrderData,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PortalConfig;
use session::AuthedTransport;

/// Errors from the portal's read operations.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("portal returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("portal request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("can't decode portal response: {source}; body: {body}")]
    Decode {
        source: serde_json::Error,
        body: String,
    },
}

/// Read operations against the portal.
///
/// One production implementation ([`PortalClient`]); the trait exists so the
/// pipeline can run against a double in tests.
#[async_trait]
pub trait MealPortal: Send + Sync {
    /// Ids of the account's currently active orders. An empty list is a
    /// normal result, not an error.
    async fn active_order_ids(&self) -> Result<Vec<i64>, FetchError>;

    /// Full delivery list for one order.
    async fn order_data(&self, order_id: i64) -> Result<OrderData, FetchError>;

    /// Menu for one delivery.
    async fn delivery_menu(&self, delivery_id: i64) -> Result<DeliveryMenu, FetchError>;
}

pub struct PortalClient {
    transport: AuthedTransport,
    base_url: String,
}

impl PortalClient {
    /// Authenticate against the portal and return a client that carries the
    /// captured session on every subsequent call.
    ///
    /// The underlying client never follows redirects: the portal answers
    /// every successful call with a plain 200, and anything else is reported
    /// as-is rather than chased.
    pub async fn login(config: &PortalConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let session =
            session::login(&client, &config.base_url, &config.login, &config.password).await?;
        info!(cookies = session.cookies().len(), "logged in to portal");

        Ok(Self {
            transport: AuthedTransport::new(client, session),
            base_url: config.base_url.clone(),
        })
    }

    pub fn session(&self) -> &Session {
        self.transport.session()
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "portal GET");

        let response = self.transport.get(&url).await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { source, body })
    }
}

#[async_trait]
impl MealPortal for PortalClient {
    async fn active_order_ids(&self) -> Result<Vec<i64>, FetchError> {
        self.get_json("/api/company/customer/order/active-ids").await
    }

    async fn order_data(&self, order_id: i64) -> Result<OrderData, FetchError> {
        self.get_json(&format!("/api/company/customer/order/{order_id}"))
            .await
    }

    async fn delivery_menu(&self, delivery_id: i64) -> Result<DeliveryMenu, FetchError> {
        self.get_json(&format!(
            "/api/company/general/menus/delivery/{delivery_id}/new"
        ))
        .await
    }
}
