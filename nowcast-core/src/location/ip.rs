use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{LocationService, PermissionError};
use crate::model::Coordinates;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";

/// Approximate location derived from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    base_url: String,
    http: Client,
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLocation {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiResponse {
    fn into_coordinates(self) -> Result<Coordinates, PermissionError> {
        if self.status != "success" {
            let reason = self.message.unwrap_or_else(|| "lookup failed".to_string());
            return Err(PermissionError::Unavailable(reason));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(PermissionError::Unavailable("response had no coordinates".to_string())),
        }
    }
}

#[async_trait]
impl LocationService for IpLocation {
    async fn request_location(&self) -> Result<Coordinates, PermissionError> {
        let url = format!("{}/json", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| PermissionError::Unavailable(format!("IP lookup failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(PermissionError::Unavailable(format!(
                "IP lookup failed with status {status}"
            )));
        }

        let parsed: IpApiResponse = res
            .json()
            .await
            .map_err(|e| PermissionError::Unavailable(format!("IP lookup returned bad JSON: {e}")))?;

        parsed.into_coordinates()
    }
}
