//! Reqwest-backed clients for the sheet service and its login endpoint.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sheetlog_engine::{DeltaSource, EngineError};
use sheetlog_table::SheetContents;
use sheetlog_types::{ChildSheet, Credential, Delta, DeltaPage, RebaseEntry, SheetInfo};
use std::time::Duration;

/// Client for one sheet on the remote service.
///
/// All calls are single requests with no retries; a transport or status
/// failure aborts the caller's run.
pub struct SheetClient {
    http: Client,
    base_url: String,
    auth_token: String,
    sheet_id: String,
}

impl SheetClient {
    /// Build a client for the given service URL and credential.
    ///
    /// The underlying HTTP client uses a 30-second timeout and bypasses
    /// system proxy lookup to avoid macOS system-configuration issues.
    pub fn new(base_url: impl Into<String>, credential: &Credential) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: credential.auth_token.clone(),
            sheet_id: credential.sheet_id.clone(),
        })
    }

    /// The sheet this client is bound to.
    #[must_use]
    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    /// A client for a different sheet on the same service, sharing the
    /// connection pool and token. Used for child-sheet traversal.
    #[must_use]
    pub fn for_sheet(&self, sheet_id: &str) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            sheet_id: sheet_id.to_string(),
        }
    }

    /// Fetch sheet metadata.
    pub async fn get_info(&self) -> Result<SheetInfo> {
        self.get_json(&self.sheet_url("")).await
    }

    /// Fetch the full current snapshot in columnar form.
    pub async fn get_contents(&self) -> Result<SheetContents> {
        self.get_json(&self.sheet_url("/contents")).await
    }

    /// Fetch one page of delta history. `cursor` of `None` requests the
    /// first page; the returned page carries the next cursor, if any.
    ///
    /// The cursor is opaque and may contain URL-reserved characters, so
    /// it goes through query-parameter encoding rather than the path.
    pub async fn get_delta_page(&self, cursor: Option<&str>) -> Result<DeltaPage> {
        let query: Vec<(&str, &str)> = cursor.map(|c| ("cursor", c)).into_iter().collect();
        self.get_json_query(&self.sheet_url("/deltas"), &query).await
    }

    /// List the direct child sheets of this sheet.
    pub async fn get_children(&self) -> Result<Vec<ChildSheet>> {
        self.get_json(&self.sheet_url("/children")).await
    }

    /// Fetch the server-side rebase log.
    pub async fn get_rebase_log(&self) -> Result<Vec<RebaseEntry>> {
        self.get_json(&self.sheet_url("/rebaselog")).await
    }

    /// Trigger a server-side recompute and wait for it to finish, polling
    /// the status resource once per second.
    pub async fn refresh(&self) -> Result<()> {
        let url = self.sheet_url("/refresh");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Self::check_status(&response)?;

        loop {
            let status: RefreshStatus = self.get_json(&self.sheet_url("/refresh/status")).await?;
            if status.done {
                return Ok(());
            }
            tracing::debug!(sheet = %self.sheet_id, "refresh still running");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    fn sheet_url(&self, suffix: &str) -> String {
        format!("{}/sheets/{}{suffix}", self.base_url, self.sheet_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_query(url, &[]).await
    }

    async fn get_json_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        tracing::debug!(%url, "GET");
        let mut request = self.http.get(url).bearer_auth(&self.auth_token);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Self::check_status(&response)?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Json(e.to_string()))
    }

    fn check_status(response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::Auth(format!("HTTP {status}")));
        }
        Err(ClientError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}

/// The delta-history feed of a sheet, viewed as a page source for the
/// export engine. Failures surface as fatal source errors.
#[async_trait]
impl DeltaSource for SheetClient {
    async fn delta_page(
        &self,
        cursor: Option<&str>,
    ) -> std::result::Result<DeltaPage, EngineError> {
        self.get_delta_page(cursor)
            .await
            .map_err(|e| EngineError::Source(e.to_string()))
    }
}

/// Collect every delta of the sheet into memory, in version order.
///
/// Only used for the raw change-log dump; the exports stream instead.
pub async fn fetch_all_deltas(client: &SheetClient) -> Result<Vec<Delta>> {
    let mut deltas = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = client.get_delta_page(cursor.as_deref()).await?;
        deltas.extend(page.results);
        match page.next_page_token {
            Some(next) => cursor = Some(next),
            None => return Ok(deltas),
        }
    }
}

/// Client for the one-time-code login endpoint.
pub struct LoginClient {
    http: Client,
    login_url: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoginRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RefreshStatus {
    done: bool,
}

impl LoginClient {
    /// Build a login client for the given login service URL.
    pub fn new(login_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy()
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(Self {
            http,
            login_url: login_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange a one-time login code for a credential.
    pub async fn login_with_code(&self, code: &str) -> Result<Credential> {
        let url = format!("{}/login/code", self.login_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { code })
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Auth(format!("login rejected: HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Json(e.to_string()))
    }
}
