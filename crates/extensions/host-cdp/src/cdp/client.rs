//! CDP browser-level client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::connection::{Connection, REQUEST_TIMEOUT};
use super::error::CdpError;
use super::protocol::{BrowserVersion, PageInfo};
use super::session::PageSession;

/// Connection to a Chrome instance running with remote debugging.
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    conn: Arc<Connection>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Chrome debugging endpoint (e.g., "http://localhost:9222")
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        Self::connect_with_timeout(endpoint, REQUEST_TIMEOUT).await
    }

    /// Connect with a custom per-command reply timeout.
    pub async fn connect_with_timeout(
        endpoint: &str,
        request_timeout: Duration,
    ) -> Result<Self, CdpError> {
        let http_endpoint = Url::parse(endpoint)?.as_str().trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        let browser_ws_url = version.web_socket_debugger_url;
        let conn = Connection::open(&browser_ws_url, request_timeout).await?;

        info!("Connected to {} at {}", version.browser, browser_ws_url);

        Ok(Self {
            http_endpoint,
            conn: Arc::new(conn),
        })
    }

    /// List open tabs.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages)
    }

    /// First tab whose URL contains `pattern`.
    pub async fn find_page(&self, pattern: &str) -> Result<PageInfo, CdpError> {
        self.list_pages()
            .await?
            .into_iter()
            .find(|page| page.is_page() && page.url.contains(pattern))
            .ok_or_else(|| CdpError::PageNotFound(pattern.to_string()))
    }

    /// Attach to the first tab whose URL contains `pattern`.
    pub async fn attach_matching(&self, pattern: &str) -> Result<PageSession, CdpError> {
        let page = self.find_page(pattern).await?;
        debug!("Attaching to {} ({})", page.url, page.id);
        self.attach_page(&page.id).await
    }

    /// Attach to an existing tab.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .conn
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
                None,
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let events = self.conn.route_events(&session_id);
        let session = PageSession::new(target_id.to_string(), session_id, self.conn.clone(), events);
        session.enable_domains().await?;

        Ok(session)
    }
}
