// geotag/src/processors/geocoder.rs
use crate::core::{GeotagError, IngestConfig, Result};
use crate::processors::GeoCoordinate;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

pub const GEOCODE_FAILURE_MESSAGE: &str = "Could not look up a place for this location.";

/// A reverse-geocoded place: the service's display name plus its address
/// breakdown (`city`, `state`, `country`, ...), both copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceDescription {
    pub display_name: String,
    pub address: BTreeMap<String, String>,
}

impl PlaceDescription {
    pub fn component(&self, key: &str) -> Option<&str> {
        self.address.get(key).map(String::as_str)
    }
}

/// Any unsuccessful lookup. The reason is kept for logs; users see
/// [`GeocodeFailure::message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("reverse geocoding failed: {reason}")]
pub struct GeocodeFailure {
    reason: String,
}

impl GeocodeFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn message(&self) -> &'static str {
        GEOCODE_FAILURE_MESSAGE
    }
}

pub trait ReverseGeocoder: Send + Sync + 'static {
    fn reverse_geocode(
        &self,
        coordinate: GeoCoordinate,
    ) -> impl Future<Output = std::result::Result<PlaceDescription, GeocodeFailure>> + Send;
}

#[derive(Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<BTreeMap<String, String>>,
    error: Option<String>,
}

/// Turns a `format=jsonv2` reverse response body into a place.
pub fn parse_response(body: &str) -> std::result::Result<PlaceDescription, GeocodeFailure> {
    let response: ReverseResponse = serde_json::from_str(body)
        .map_err(|e| GeocodeFailure::new(format!("malformed response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(GeocodeFailure::new(format!("service error: {}", error)));
    }

    let address = response
        .address
        .ok_or_else(|| GeocodeFailure::new("response has no address"))?;
    let display_name = response
        .display_name
        .ok_or_else(|| GeocodeFailure::new("response has no display_name"))?;

    Ok(PlaceDescription {
        display_name,
        address,
    })
}

/// Client for a Nominatim-compatible `/reverse` endpoint.
///
/// One request per call: no retry and no caching.
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.geocode_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            GeotagError::Config(format!("Failed to build HTTP client: {}", e))
        })?;

        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &IngestConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.geocode_endpoint).map_err(|e| {
            GeotagError::Config(format!(
                "Invalid geocode endpoint '{}': {}",
                config.geocode_endpoint, e
            ))
        })?;

        Ok(Self {
            client,
            endpoint,
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn request_url(&self, coordinate: GeoCoordinate) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", &coordinate.latitude().to_string())
            .append_pair("lon", &coordinate.longitude().to_string())
            .append_pair("format", "jsonv2");
        url
    }
}

impl ReverseGeocoder for NominatimClient {
    async fn reverse_geocode(
        &self,
        coordinate: GeoCoordinate,
    ) -> std::result::Result<PlaceDescription, GeocodeFailure> {
        let url = self.request_url(coordinate);
        log::debug!("Reverse geocoding {} via {}", coordinate, url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| GeocodeFailure::new(format!("request failed: {}", e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| GeocodeFailure::new(format!("service returned an error: {}", e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeFailure::new(format!("failed to read response: {}", e)))?;

        let place = parse_response(&body)?;
        log::debug!("Resolved {} to {}", coordinate, place.display_name);
        Ok(place)
    }
}
