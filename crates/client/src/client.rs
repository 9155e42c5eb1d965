//! REST client for the source accounting API.
//!
//! All calls carry a session token minted from the configured access
//! token. A 404 is an ordinary gap (`Ok(None)`), a 401 triggers one
//! transparent session refresh and retry, anything else non-success is
//! a `Source` error.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use ebmig_core::account::{RelationType, SourceAccount, SourceRelation};
use ebmig_core::mutation::{Mutation, MutationType};
use ebmig_shared::{MigrateError, MigrateResult, SourceConfig};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::session::SessionState;
use crate::source::MutationSource;

/// Listing envelope used by the source for collection endpoints.
#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Session creation response.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    token: String,
}

/// HTTP client for the source API.
pub struct SourceClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    source_application: String,
    session: Mutex<SessionState>,
}

impl SourceClient {
    /// Creates a client for the configured source.
    pub fn new(config: &SourceConfig) -> MigrateResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| MigrateError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            source_application: config.source_application.clone(),
            session: Mutex::new(SessionState::new()),
        })
    }

    /// Returns a session token, minting a fresh one when needed.
    pub async fn session_token(&self) -> MigrateResult<String> {
        let mut session = self.session.lock().await;
        let now = Utc::now();
        if let Some(token) = session.valid_token(now) {
            return Ok(token.to_string());
        }

        debug!("creating new source session");
        let response = self
            .http
            .post(format!("{}/v1/session", self.base_url))
            .json(&serde_json::json!({
                "accessToken": self.access_token,
                "source": self.source_application,
            }))
            .send()
            .await
            .map_err(|e| MigrateError::Auth(format!("session request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MigrateError::Auth(format!(
                "session creation returned HTTP {}",
                response.status()
            )));
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| MigrateError::Auth(format!("malformed session response: {e}")))?;

        session.store(body.token.clone(), now);
        Ok(body.token)
    }

    /// Drops the cached session token so the next call re-authenticates.
    async fn invalidate_session(&self) {
        self.session.lock().await.invalidate();
    }

    /// One authorized GET, no retry handling.
    async fn send_get(&self, path_and_query: &str) -> MigrateResult<reqwest::Response> {
        let token = self.session_token().await?;
        self.http
            .get(format!("{}{path_and_query}", self.base_url))
            .header("Authorization", &token)
            .send()
            .await
            .map_err(|e| MigrateError::Source(format!("GET {path_and_query}: {e}")))
    }

    /// Authorized GET with gap mapping and one 401 refresh-retry.
    ///
    /// Returns `Ok(None)` on HTTP 404.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path_and_query: &str,
    ) -> MigrateResult<Option<T>> {
        let mut response = self.send_get(path_and_query).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = path_and_query, "session rejected, refreshing");
            self.invalidate_session().await;
            response = self.send_get(path_and_query).await?;
        }

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.json::<T>().await.map_err(|e| {
                    MigrateError::Source(format!("malformed response for {path_and_query}: {e}"))
                })?;
                Ok(Some(body))
            }
            status => Err(error_for_status(path_and_query, status)),
        }
    }
}

/// Classifies a terminal non-success status.
///
/// An unauthorized response that survived the session refresh is a
/// credential failure and therefore fatal; everything else is an
/// ordinary source error.
fn error_for_status(path_and_query: &str, status: StatusCode) -> MigrateError {
    if status == StatusCode::UNAUTHORIZED {
        MigrateError::Auth(format!(
            "GET {path_and_query} still unauthorized after session refresh"
        ))
    } else {
        MigrateError::Source(format!(
            "GET {path_and_query} returned HTTP {status}"
        ))
    }
}

#[async_trait]
impl MutationSource for SourceClient {
    async fn mutation_by_id(&self, id: i64) -> MigrateResult<Option<Mutation>> {
        let envelope: Option<ItemsEnvelope<Mutation>> =
            self.get_json(&format!("/v1/mutation?id={id}")).await?;
        Ok(envelope.and_then(|e| e.items.into_iter().next()))
    }

    async fn mutation_detail(&self, id: i64) -> MigrateResult<Option<Mutation>> {
        self.get_json(&format!("/v1/mutation/{id}")).await
    }

    async fn list_accounts(&self) -> MigrateResult<Vec<SourceAccount>> {
        let envelope: Option<ItemsEnvelope<SourceAccount>> = self.get_json("/v1/ledger").await?;
        Ok(envelope.map(|e| e.items).unwrap_or_default())
    }

    async fn list_relations(
        &self,
        relation_type: RelationType,
    ) -> MigrateResult<Vec<SourceRelation>> {
        let kind = match relation_type {
            RelationType::Customer => "customer",
            RelationType::Supplier => "supplier",
        };
        let envelope: Option<ItemsEnvelope<SourceRelation>> = self
            .get_json(&format!("/v1/relation?relationType={kind}"))
            .await?;
        Ok(envelope.map(|e| e.items).unwrap_or_default())
    }

    async fn list_mutations_by_type(
        &self,
        mutation_type: MutationType,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> MigrateResult<Vec<Mutation>> {
        let mut query = format!("/v1/mutation?type={}", mutation_type.code());
        if let Some(from) = date_from {
            query.push_str(&format!("&dateFrom={from}"));
        }
        if let Some(to) = date_to {
            query.push_str(&format!("&dateTo={to}"));
        }
        let envelope: Option<ItemsEnvelope<Mutation>> = self.get_json(&query).await?;
        Ok(envelope.map(|e| e.items).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = SourceClient::new(&SourceConfig {
            api_url: "https://api.example.test/".into(),
            access_token: "secret".into(),
            source_application: "ebmig".into(),
        })
        .unwrap();

        assert_eq!(client.base_url, "https://api.example.test");
    }

    #[test]
    fn test_items_envelope_tolerates_missing_items() {
        let envelope: ItemsEnvelope<Mutation> = serde_json::from_str("{}").unwrap();
        assert!(envelope.items.is_empty());

        let envelope: ItemsEnvelope<Mutation> = serde_json::from_value(serde_json::json!({
            "items": [{ "id": 17, "type": 1, "date": "2019-03-31" }]
        }))
        .unwrap();
        assert_eq!(envelope.items.len(), 1);
        assert_eq!(envelope.items[0].id, 17);
    }

    #[test]
    fn test_unauthorized_after_refresh_is_fatal_auth_error() {
        let err = error_for_status("/v1/mutation/42", StatusCode::UNAUTHORIZED);
        assert!(matches!(err, MigrateError::Auth(_)));
        assert!(err.is_fatal());

        let err = error_for_status("/v1/mutation/42", StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, MigrateError::Source(_)));
        assert!(!err.is_fatal());
    }
}
