//! Third-party booking services (opaque request/response).

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ai::retry::retry_with_backoff;
use crate::util::errors::{TripMeshError, TripMeshResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCriteria {
    /// "hotel", "flight", "restaurant", "activity"...
    pub kind: String,
    pub destination: String,
    #[serde(default)]
    pub day_number: Option<u32>,
    #[serde(default)]
    pub budget_cents: Option<i64>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOption {
    pub option_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    pub currency: String,
    #[serde(default)]
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub confirmation_id: String,
    pub option_id: String,
    pub status: String,
    #[serde(default)]
    pub details: String,
}

/// Opaque domain service. Search is idempotent and retried; confirm is not
/// idempotent and surfaces its first failure.
#[async_trait]
pub trait BookingProvider: Send + Sync {
    async fn search(&self, criteria: &BookingCriteria) -> TripMeshResult<Vec<BookingOption>>;

    async fn confirm(
        &self,
        option_id: &str,
        payment_proof: &str,
    ) -> TripMeshResult<BookingConfirmation>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const SEARCH_ATTEMPTS: u32 = 3;
const SEARCH_BACKOFF: Duration = Duration::from_millis(500);

pub struct HttpBookingProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBookingProvider {
    pub fn new(base_url: String) -> TripMeshResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TripMeshError::ExternalService(format!("http client init: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> TripMeshResult<R> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TripMeshError::ExternalService(format!("booking request: {}", e)))?
            .error_for_status()
            .map_err(|e| TripMeshError::ExternalService(format!("booking status: {}", e)))?;

        response
            .json()
            .await
            .map_err(|e| TripMeshError::ExternalService(format!("booking response body: {}", e)))
    }
}

#[async_trait]
impl BookingProvider for HttpBookingProvider {
    async fn search(&self, criteria: &BookingCriteria) -> TripMeshResult<Vec<BookingOption>> {
        debug!(
            "Booking search: kind={}, destination={}",
            criteria.kind, criteria.destination
        );
        retry_with_backoff("booking.search", SEARCH_ATTEMPTS, SEARCH_BACKOFF, || {
            self.post_json::<_, Vec<BookingOption>>("/search", criteria)
        })
        .await
    }

    async fn confirm(
        &self,
        option_id: &str,
        payment_proof: &str,
    ) -> TripMeshResult<BookingConfirmation> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ConfirmRequest<'a> {
            option_id: &'a str,
            payment_proof: &'a str,
        }

        debug!("Booking confirm: option_id={}", option_id);
        self.post_json(
            "/confirm",
            &ConfirmRequest {
                option_id,
                payment_proof,
            },
        )
        .await
    }
}
