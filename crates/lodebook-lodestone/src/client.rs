//! Lodestone community API client.
//!
//! Walks the Free Company member list page by page and maps the wire
//! records into domain roster entries. The wire shape follows the
//! community API convention of PascalCase keys:
//!
//! ```json
//! {
//!   "FreeCompanyMembers": [
//!     { "ID": 12345, "Name": "Puk Waddle", "Rank": "Mandragora",
//!       "RankIcon": "https://.../rank.png", "Avatar": "https://.../a.png" }
//!   ],
//!   "Pagination": { "Page": 1, "PageTotal": 2 }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use lodebook_core::error::SyncResult;
use lodebook_core::member::RosterEntry;
use lodebook_core::traits::RosterSource;

use crate::config::LodestoneConfig;
use crate::error::{LodestoneError, LodestoneResult};

/// One page of the member list as returned by the API.
#[derive(Debug, Deserialize)]
struct MemberPage {
    #[serde(rename = "FreeCompanyMembers", default)]
    members: Vec<WireMember>,
    #[serde(rename = "Pagination")]
    pagination: Option<WirePagination>,
}

/// A member record on the wire.
#[derive(Debug, Deserialize)]
struct WireMember {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Rank")]
    rank: String,
    #[serde(rename = "RankIcon")]
    rank_icon: String,
    #[serde(rename = "Avatar")]
    avatar: String,
}

impl WireMember {
    /// Explicit field-by-field mapping into the domain entry shape.
    fn into_entry(self) -> RosterEntry {
        RosterEntry {
            character_id: self.id.to_string(),
            name: self.name,
            rank: self.rank,
            rank_icon: self.rank_icon,
            avatar: self.avatar,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePagination {
    #[serde(rename = "Page")]
    page: u32,
    #[serde(rename = "PageTotal")]
    page_total: u32,
}

/// HTTP client for the Lodestone community API.
#[derive(Debug, Clone)]
pub struct LodestoneClient {
    config: LodestoneConfig,
    client: Client,
}

impl LodestoneClient {
    /// Create a client, validating the configuration.
    pub fn new(config: LodestoneConfig) -> LodestoneResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .user_agent(concat!("lodebook-lodestone/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                LodestoneError::invalid_configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    /// Fetch the complete member list, following pagination.
    #[instrument(skip(self), fields(free_company_id = %self.config.free_company_id))]
    pub async fn fetch_members(&self) -> LodestoneResult<Vec<RosterEntry>> {
        let url = format!(
            "{}/freecompany/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.free_company_id
        );

        let mut entries = Vec::new();
        let mut page: u32 = 1;

        loop {
            let body = self.fetch_page(&url, page).await?;
            debug!(page, members = body.members.len(), "Fetched roster page");
            entries.extend(body.members.into_iter().map(WireMember::into_entry));

            match body.pagination {
                Some(p) if p.page < p.page_total => page = p.page + 1,
                _ => break,
            }
        }

        // An empty or truncated roster is not an error here; the engine's
        // minimum-size guard decides whether the fetch was too degraded to act on.
        debug!(total = entries.len(), pages = page, "Roster fetch complete");
        Ok(entries)
    }

    async fn fetch_page(&self, url: &str, page: u32) -> LodestoneResult<MemberPage> {
        let page = page.to_string();
        let mut request = self
            .client
            .get(url)
            .query(&[("data", "FCM"), ("page", page.as_str())]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("private-key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LodestoneError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RosterSource for LodestoneClient {
    async fn fetch_roster(&self) -> SyncResult<Vec<RosterEntry>> {
        Ok(self.fetch_members().await?)
    }
}
