//! Supabase document store over the PostgREST API.

use super::DocumentStore;
use crate::types::DocumentRecord;
use clinic_core::{AppError, AppResult};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Hosted `site_pages` table plus its `match_site_pages` similarity RPC.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    service_key: String,
    table: String,
    match_function: String,
}

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
    filter: &'a Value,
}

#[derive(Debug, Deserialize)]
struct UrlRow {
    url: String,
}

impl SupabaseStore {
    /// Create a store for a Supabase project.
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        table: impl Into<String>,
        match_function: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: table.into(),
            match_function: match_function.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, self.match_function)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Knowledge(format!("Supabase request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Knowledge(format!(
                "Supabase error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to parse Supabase response: {}", e)))
    }
}

/// PostgREST `like` operand matching urls that contain `pattern`.
fn contains_filter(pattern: &str) -> String {
    format!("like.*{}*", pattern)
}

#[async_trait::async_trait]
impl DocumentStore for SupabaseStore {
    fn store_name(&self) -> &str {
        "supabase"
    }

    #[instrument(skip(self, embedding, filter))]
    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
        filter: &Value,
    ) -> AppResult<Vec<DocumentRecord>> {
        debug!("Calling {} ({} dims)", self.match_function, embedding.len());
        let request = self.client.post(self.rpc_url()).json(&MatchRequest {
            query_embedding: embedding,
            match_count,
            filter,
        });
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn select_by_url_pattern(
        &self,
        pattern: &str,
        limit: usize,
    ) -> AppResult<Vec<DocumentRecord>> {
        let limit = limit.to_string();
        let request = self.client.get(self.table_url()).query(&[
            ("select", "*"),
            ("url", contains_filter(pattern).as_str()),
            ("limit", limit.as_str()),
        ]);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn list_urls(&self, pattern: &str) -> AppResult<Vec<String>> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "url"), ("url", contains_filter(pattern).as_str())]);
        let rows: Vec<UrlRow> = self.send(request).await?;
        Ok(rows.into_iter().map(|r| r.url).collect())
    }

    #[instrument(skip(self))]
    async fn chunks_for_url(&self, url: &str) -> AppResult<Vec<DocumentRecord>> {
        let request = self.client.get(self.table_url()).query(&[
            ("select", "url,title,content,chunk_number"),
            ("url", format!("eq.{}", url).as_str()),
            ("order", "chunk_number.asc"),
        ]);
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let store = SupabaseStore::new(
            "https://project.supabase.co/",
            "service-key",
            "site_pages",
            "match_site_pages",
        );
        assert_eq!(
            store.table_url(),
            "https://project.supabase.co/rest/v1/site_pages"
        );
        assert_eq!(
            store.rpc_url(),
            "https://project.supabase.co/rest/v1/rpc/match_site_pages"
        );
        assert_eq!(store.store_name(), "supabase");
    }

    #[test]
    fn test_contains_filter() {
        assert_eq!(contains_filter("haut-labor.de"), "like.*haut-labor.de*");
    }

    #[test]
    fn test_match_request_body() {
        let filter = serde_json::json!({});
        let body = serde_json::to_value(MatchRequest {
            query_embedding: &[0.5, 0.25],
            match_count: 5,
            filter: &filter,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"query_embedding": [0.5, 0.25], "match_count": 5, "filter": {}})
        );
    }

    #[test]
    fn test_authorization_headers() {
        let store = SupabaseStore::new("http://localhost", "secret", "site_pages", "m");
        let request = store
            .authorize(store.client.get(store.table_url()))
            .build()
            .unwrap();
        assert_eq!(request.headers()["apikey"], "secret");
        assert_eq!(request.headers()["authorization"], "Bearer secret");
    }

    #[tokio::test]
    async fn test_unreachable_project_is_error() {
        let store = SupabaseStore::new("http://127.0.0.1:1", "key", "site_pages", "m");
        assert!(store.list_urls("haut-labor.de").await.is_err());
    }
}
