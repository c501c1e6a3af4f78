//! HTTP client for WaterConnect Groundwater Data.

use crate::{
    api::{Connector, GroundwaterApi, WellSearch},
    error::{Result, SagwError},
    rect::Rect,
    series::{BulkService, BulkTable},
    well::WellRecord,
};
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Base URL of the Groundwater Data services.
pub const DEFAULT_ENDPOINT: &str =
    "https://www.waterconnect.sa.gov.au/_layouts/15/dfw.sharepoint.wdd/WDDDMS.ashx/";

/// Service listing the observation networks, fetched when a session opens.
pub const NETWORKS_SERVICE: &str = "GetObswellNetworks";

/// Spatial well search service.
pub const RECTANGLE_SERVICE: &str = "GetWellsInRectangle";

/// Connection settings of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// An open session with Groundwater Data.
#[derive(Debug, Clone)]
pub struct WaterConnectSession {
    client: Client,
    endpoint: String,
    networks: Vec<String>,
}

impl WaterConnectSession {
    /// Open a session: build the client and fetch the network list, which
    /// fails fast when the service is unreachable.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let mut endpoint = config.endpoint.clone();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let mut session = WaterConnectSession {
            client,
            endpoint,
            networks: Vec::new(),
        };
        session.refresh_networks().await?;
        info!(
            "Connected to {} ({} observation networks)",
            session.endpoint,
            session.networks.len()
        );
        Ok(session)
    }

    /// Observation network codes known to the service.
    pub fn networks(&self) -> &[String] {
        &self.networks
    }

    fn url(&self, service: &str) -> String {
        format!("{}{}", self.endpoint, service)
    }

    async fn get_json(&self, service: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!("GET {} {:?}", service, query);
        let response = self.client.get(self.url(service)).query(query).send().await?;
        if !response.status().is_success() {
            return Err(SagwError::Status {
                service: service.to_string(),
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Re-read the observation network list.
    pub async fn refresh_networks(&mut self) -> Result<()> {
        let value = self.get_json(NETWORKS_SERVICE, &[]).await?;
        self.networks = network_codes(&value);
        Ok(())
    }
}

/// Network codes from a network list response: an array of strings or of
/// objects carrying a `NetworkCode`.
fn network_codes(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => map
                        .get("NetworkCode")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

impl WellSearch for WaterConnectSession {
    async fn find_wells_in_rect(&self, rect: &Rect) -> Result<Vec<WellRecord>> {
        let query = [
            ("MinLat", rect.lats[0].to_string()),
            ("MaxLat", rect.lats[1].to_string()),
            ("MinLon", rect.lons[0].to_string()),
            ("MaxLon", rect.lons[1].to_string()),
        ];
        let value = self.get_json(RECTANGLE_SERVICE, &query).await?;
        WellRecord::from_response(&value)
    }
}

impl GroundwaterApi for WaterConnectSession {
    async fn bulk_download(&self, service: BulkService, dh_nos: &[i64]) -> Result<BulkTable> {
        let name = service.service_name();
        let payload = json!({ "DHNOs": dh_nos }).to_string();
        info!("Bulk download {} for {} drillholes", name, dh_nos.len());
        let response = self
            .client
            .post(self.url(name))
            .query(&[("bulkOutput", "CSV")])
            .form(&[("exportdata", payload)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SagwError::Status {
                service: name.to_string(),
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await?;
        BulkTable::from_csv(&body)
    }
}

/// Opens [`WaterConnectSession`]s with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct WaterConnect {
    pub config: SessionConfig,
}

impl WaterConnect {
    pub fn new(config: SessionConfig) -> Self {
        WaterConnect { config }
    }
}

impl Connector for WaterConnect {
    type Session = WaterConnectSession;

    async fn connect(&self) -> Result<WaterConnectSession> {
        WaterConnectSession::connect(&self.config).await
    }
}
