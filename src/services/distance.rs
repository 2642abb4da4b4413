use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{TravelEstimate, TravelMode};
use crate::services::cache::{CacheError, CacheKey, CacheManager};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Errors that can occur when calling the distance matrix API
#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Distance API key is not configured")]
    MissingApiKey,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for a Google-compatible distance matrix endpoint
///
/// Destinations are sent in batches; a failed batch degrades to
/// "unavailable" estimates rather than failing the whole lookup.
pub struct DistanceMatrixClient {
    endpoint: String,
    api_key: Option<String>,
    language: String,
    batch_size: usize,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl DistanceMatrixClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        language: &str,
        batch_size: usize,
        timeout_secs: u64,
        cache: Option<Arc<CacheManager>>,
    ) -> Result<Self, DistanceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            language: language.to_string(),
            batch_size: batch_size.max(1),
            client,
            cache,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Travel estimates from `origin` to each destination, in input order
    pub async fn lookup(
        &self,
        origin: &str,
        destinations: &[String],
        mode: TravelMode,
    ) -> Result<Vec<TravelEstimate>, DistanceError> {
        let api_key = self.api_key.as_deref().ok_or(DistanceError::MissingApiKey)?;

        let mut results: Vec<Option<TravelEstimate>> = vec![None; destinations.len()];
        let mut pending = Vec::new();

        for (index, destination) in destinations.iter().enumerate() {
            if destination.trim().is_empty() {
                results[index] = Some(TravelEstimate::unavailable());
                continue;
            }
            match self.cached(origin, destination, mode).await {
                Some(estimate) => results[index] = Some(estimate),
                None => pending.push(index),
            }
        }

        for chunk in pending.chunks(self.batch_size) {
            let batch: Vec<&str> = chunk.iter().map(|&i| destinations[i].as_str()).collect();
            let estimates = match self.fetch_batch(origin, &batch, mode, api_key).await {
                Ok(estimates) => estimates,
                Err(e) => {
                    tracing::warn!(
                        "Distance lookup failed for {} destinations: {}",
                        batch.len(),
                        e
                    );
                    vec![TravelEstimate::unavailable(); batch.len()]
                }
            };

            for (&index, estimate) in chunk.iter().zip(estimates) {
                if estimate.is_available() {
                    self.store(origin, &destinations[index], mode, &estimate).await;
                }
                results[index] = Some(estimate);
            }
        }

        Ok(results
            .into_iter()
            .map(|estimate| estimate.unwrap_or_else(TravelEstimate::unavailable))
            .collect())
    }

    async fn fetch_batch(
        &self,
        origin: &str,
        destinations: &[&str],
        mode: TravelMode,
        api_key: &str,
    ) -> Result<Vec<TravelEstimate>, DistanceError> {
        let joined = destinations.join("|");
        let url = format!(
            "{}?origins={}&destinations={}&mode={}&language={}&units=metric&key={}",
            self.endpoint,
            urlencoding::encode(origin),
            urlencoding::encode(&joined),
            mode.as_str(),
            urlencoding::encode(&self.language),
            urlencoding::encode(api_key)
        );

        tracing::debug!(
            "Distance matrix request: {} destinations, mode {}",
            destinations.len(),
            mode.as_str()
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DistanceError::ApiError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        let body = response.json::<Value>().await?;
        parse_matrix(&body, destinations.len())
    }

    async fn cached(&self, origin: &str, destination: &str, mode: TravelMode) -> Option<TravelEstimate> {
        let cache = self.cache.as_ref()?;
        let key = CacheKey::travel(origin, destination, mode);
        match cache.get::<TravelEstimate>(&key).await {
            Ok(estimate) => Some(estimate),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Travel cache read failed for {}, refetching: {}", key, e);
                None
            }
        }
    }

    async fn store(&self, origin: &str, destination: &str, mode: TravelMode, estimate: &TravelEstimate) {
        if let Some(cache) = &self.cache {
            let key = CacheKey::travel(origin, destination, mode);
            if let Err(e) = cache.set(&key, estimate).await {
                tracing::warn!("Failed to cache travel estimate {}: {}", key, e);
            }
        }
    }
}

/// Parse one distance matrix response row into `expected` estimates
///
/// Elements with a non-OK status, and any element missing from a short
/// response, become unavailable estimates.
pub fn parse_matrix(body: &Value, expected: usize) -> Result<Vec<TravelEstimate>, DistanceError> {
    let status = body["status"].as_str().unwrap_or("UNKNOWN");
    if status != "OK" {
        let message = body["error_message"].as_str().unwrap_or(status);
        return Err(DistanceError::ApiError(message.to_string()));
    }

    let elements = body["rows"][0]["elements"]
        .as_array()
        .ok_or_else(|| DistanceError::InvalidResponse("missing rows[0].elements".to_string()))?;

    let mut estimates: Vec<TravelEstimate> = elements
        .iter()
        .take(expected)
        .map(parse_element)
        .collect();
    estimates.resize_with(expected, TravelEstimate::unavailable);
    Ok(estimates)
}

fn parse_element(element: &Value) -> TravelEstimate {
    if element["status"].as_str() != Some("OK") {
        return TravelEstimate::unavailable();
    }

    let distance_m = element["distance"]["value"].as_u64();
    let duration_s = element["duration"]["value"].as_u64();
    if duration_s.is_none() {
        return TravelEstimate::unavailable();
    }

    TravelEstimate {
        distance_m,
        duration_s,
        distance_text: element["distance"]["text"]
            .as_str()
            .unwrap_or(TravelEstimate::UNAVAILABLE_TEXT)
            .to_string(),
        duration_text: element["duration"]["text"]
            .as_str()
            .unwrap_or(TravelEstimate::UNAVAILABLE_TEXT)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn ok_element(meters: u64, seconds: u64) -> Value {
        json!({
            "status": "OK",
            "distance": {"value": meters, "text": format!("{} km", meters / 1000)},
            "duration": {"value": seconds, "text": format!("{}分", seconds / 60)}
        })
    }

    fn create_test_client(endpoint: &str, batch_size: usize, cache: Option<Arc<CacheManager>>) -> DistanceMatrixClient {
        DistanceMatrixClient::new(endpoint, Some("test-key".to_string()), "ja", batch_size, 5, cache)
            .unwrap()
    }

    #[test]
    fn test_parse_matrix_mixed_elements() {
        let body = json!({
            "status": "OK",
            "rows": [{"elements": [ok_element(12_000, 1_800), {"status": "ZERO_RESULTS"}]}]
        });

        let estimates = parse_matrix(&body, 3).unwrap();
        assert_eq!(estimates.len(), 3);
        assert_eq!(estimates[0].duration_s, Some(1_800));
        assert_eq!(estimates[0].duration_text, "30分");
        assert!(!estimates[1].is_available());
        assert_eq!(estimates[2].distance_text, "計算不能");
    }

    #[test]
    fn test_parse_matrix_top_level_error() {
        let body = json!({"status": "REQUEST_DENIED", "error_message": "bad key"});
        assert!(matches!(parse_matrix(&body, 1), Err(DistanceError::ApiError(m)) if m == "bad key"));
    }

    #[tokio::test]
    async fn test_lookup_without_key_fails() {
        let client = DistanceMatrixClient::new(DEFAULT_ENDPOINT, Some("  ".to_string()), "ja", 25, 5, None)
            .unwrap();
        assert!(!client.is_configured());

        let result = client
            .lookup("名古屋駅", &["豊田市".to_string()], TravelMode::Driving)
            .await;
        assert!(matches!(result, Err(DistanceError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_lookup_batches_destinations() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/distancematrix/json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("mode".into(), "transit".into()),
                Matcher::UrlEncoded("key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "OK",
                    "rows": [{"elements": [ok_element(5_000, 600), ok_element(9_000, 1_200)]}]
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let client = create_test_client(&format!("{}/distancematrix/json", server.url()), 2, None);
        let destinations = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let estimates = client
            .lookup("Origin", &destinations, TravelMode::Transit)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(estimates.len(), 3);
        assert_eq!(estimates[1].duration_s, Some(1_200));
        assert_eq!(estimates[2].duration_s, Some(600));
    }

    #[tokio::test]
    async fn test_failed_batch_degrades() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/distancematrix/json")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        let client = create_test_client(&format!("{}/distancematrix/json", server.url()), 25, None);
        let estimates = client
            .lookup("Origin", &["A".to_string(), "".to_string()], TravelMode::Driving)
            .await
            .unwrap();

        assert_eq!(estimates.len(), 2);
        assert!(estimates.iter().all(|e| !e.is_available()));
    }

    #[tokio::test]
    async fn test_successful_estimates_are_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/distancematrix/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"status": "OK", "rows": [{"elements": [ok_element(3_000, 420)]}]}).to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(CacheManager::in_memory(100, 60));
        let client = create_test_client(&format!("{}/distancematrix/json", server.url()), 25, Some(cache));
        let destinations = vec!["豊田市".to_string()];

        let first = client.lookup("名古屋駅", &destinations, TravelMode::Driving).await.unwrap();
        let second = client.lookup("名古屋駅", &destinations, TravelMode::Driving).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(second[0].distance_m, Some(3_000));
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_refetched() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/distancematrix/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"status": "OK", "rows": [{"elements": [ok_element(8_000, 900)]}]}).to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(CacheManager::in_memory(100, 60));
        let key = CacheKey::travel("名古屋駅", "岡崎市", TravelMode::Driving);
        cache.set(&key, &"not an estimate").await.unwrap();

        let client = create_test_client(
            &format!("{}/distancematrix/json", server.url()),
            25,
            Some(cache.clone()),
        );
        let estimates = client
            .lookup("名古屋駅", &["岡崎市".to_string()], TravelMode::Driving)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(estimates[0].duration_s, Some(900));
        let repaired: TravelEstimate = cache.get(&key).await.unwrap();
        assert_eq!(repaired.distance_m, Some(8_000));
    }
}
