//! HTTP gateway to the remote management endpoint
//!
//! A thin JSON client implementing [`VimApi`]: it logs in for a session
//! token, tags every request with it, and maps typed requests onto
//! endpoint paths. The wire encoding is deliberately kept out of the
//! pipeline's sight; nothing above this module knows it is HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::error::VimError;
use crate::vim::api::VimApi;
use crate::vim::session::{Session, SessionConfig};
use crate::vim::types::{
    EntityMetrics, ObjectContent, ObjectRef, PerfCounterDesc, PerfInterval, PerfMetricId,
    PerfQuerySpec, PropertyFilterSpec, ProviderSummary,
};

const SESSION_HEADER: &str = "x-vim-session-id";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    root_folder: ObjectRef,
}

#[derive(Debug, Deserialize)]
struct TimeResponse {
    time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AvailableMetricsRequest<'a> {
    entity: &'a ObjectRef,
    interval_id: i32,
}

pub struct HttpVimApi {
    http: Client,
    base: Url,
    token: String,
    root: ObjectRef,
}

impl HttpVimApi {
    /// Authenticate against the endpoint and wrap the result in a
    /// deadline-enforcing [`Session`]. The login round trip itself is
    /// bounded by the same per-call timeout.
    pub async fn login(config: &SessionConfig) -> Result<Session, VimError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .build()?;
        let base = Url::parse(&config.url)?;

        let request = http
            .post(base.join("api/session")?)
            .json(&LoginRequest {
                username: &config.username,
                password: &config.password,
            })
            .send();
        let response = match tokio::time::timeout(config.timeout(), request).await {
            Ok(result) => result?,
            Err(_) => return Err(VimError::Timeout(config.timeout())),
        };
        let login: LoginResponse = decode(response).await?;

        let api = HttpVimApi {
            http,
            base,
            token: login.token,
            root: login.root_folder,
        };
        Ok(Session::new(Arc::new(api), config.timeout()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, VimError> {
        let response = self
            .http
            .get(self.base.join(path)?)
            .header(SESSION_HEADER, &self.token)
            .send()
            .await?;
        decode(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VimError> {
        let response = self
            .http
            .post(self.base.join(path)?)
            .header(SESSION_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, VimError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(VimError::Fault(format!("{status}: {body}")));
    }

    Ok(response.json().await?)
}

#[async_trait]
impl VimApi for HttpVimApi {
    fn root_folder(&self) -> ObjectRef {
        self.root.clone()
    }

    async fn current_time(&self) -> Result<DateTime<Utc>, VimError> {
        let response: TimeResponse = self.get("api/vim/time").await?;
        Ok(response.time)
    }

    async fn retrieve_properties(
        &self,
        filter: PropertyFilterSpec,
    ) -> Result<Vec<ObjectContent>, VimError> {
        self.post("api/vim/properties", &filter).await
    }

    async fn perf_counters(&self) -> Result<Vec<PerfCounterDesc>, VimError> {
        self.get("api/vim/perf/counters").await
    }

    async fn historical_intervals(&self) -> Result<Vec<PerfInterval>, VimError> {
        self.get("api/vim/perf/intervals").await
    }

    async fn provider_summary(&self, entity: &ObjectRef) -> Result<ProviderSummary, VimError> {
        self.post("api/vim/perf/provider-summary", entity).await
    }

    async fn available_metrics(
        &self,
        entity: &ObjectRef,
        interval_id: i32,
    ) -> Result<Vec<PerfMetricId>, VimError> {
        self.post(
            "api/vim/perf/available-metrics",
            &AvailableMetricsRequest { entity, interval_id },
        )
        .await
    }

    async fn query_perf(&self, specs: Vec<PerfQuerySpec>) -> Result<Vec<EntityMetrics>, VimError> {
        self.post("api/vim/perf/query", &specs).await
    }

    async fn logout(&self) -> Result<(), VimError> {
        let response = self
            .http
            .delete(self.base.join("api/session")?)
            .header(SESSION_HEADER, &self.token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(VimError::Fault(format!("logout: {}", response.status())));
        }
        Ok(())
    }
}
