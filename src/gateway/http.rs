//! JSON-over-HTTP client for the hosted record store.
//!
//! Every operation is a POST to `{baseUrl}/{table}/{operation}` carrying the project id and
//! public key headers. Bodies use the store's parameter shape (see `query`).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::Url;

use super::{
    Collection, FetchQuery, FetchResponse, MutationResponse, RawRecord, RecordGateway, RecordId,
    RecordResponse,
};
use crate::error::CrmError;
use crate::types::GatewayConfig;

const PROJECT_HEADER: &str = "X-Project-Id";

pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
    project_id: String,
    public_key: Option<String>,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, CrmError> {
        if config.base_url.trim().is_empty() {
            return Err(CrmError::ConfigurationError(
                "gateway.baseUrl is not set".to_string(),
            ));
        }
        if config.project_id.trim().is_empty() {
            return Err(CrmError::ConfigurationError(
                "gateway.projectId is not set".to_string(),
            ));
        }

        let mut base = Url::parse(config.base_url.trim()).map_err(|e| {
            CrmError::ConfigurationError(format!("Invalid gateway.baseUrl: {}", e))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let timeout = Duration::from_secs(config.request_timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrmError::ConfigurationError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
            timeout,
        })
    }

    fn endpoint(&self, collection: Collection, operation: &str) -> Result<Url, CrmError> {
        self.base
            .join(&format!("{}/{}", collection.table(), operation))
            .map_err(|e| CrmError::ConfigurationError(format!("Invalid endpoint: {}", e)))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        collection: Collection,
        operation: &str,
        body: &B,
    ) -> Result<T, CrmError> {
        let url = self.endpoint(collection, operation)?;
        log::debug!("POST {}", url);

        let mut request = self
            .client
            .post(url)
            .header(PROJECT_HEADER, self.project_id.as_str())
            .json(body);
        if let Some(key) = &self.public_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => CrmError::ConfigurationError(format!(
                    "Record service rejected credentials ({})",
                    status
                )),
                _ if status.is_server_error() => {
                    CrmError::NetworkError(format!("Record service error {}: {}", status, text))
                }
                _ => CrmError::Gateway(format!("Record service error {}: {}", status, text)),
            });
        }

        resp.json::<T>().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, err: reqwest::Error) -> CrmError {
        if err.is_timeout() {
            CrmError::Timeout(self.timeout.as_millis() as u64)
        } else {
            CrmError::from(err)
        }
    }
}

#[async_trait]
impl RecordGateway for HttpGateway {
    async fn fetch(
        &self,
        collection: Collection,
        query: &FetchQuery,
    ) -> Result<FetchResponse, CrmError> {
        self.post(collection, "fetch", query).await
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<RecordResponse, CrmError> {
        self.post(collection, "get", &json!({ "Id": id })).await
    }

    async fn create(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<MutationResponse, CrmError> {
        self.post(collection, "create", &json!({ "records": records }))
            .await
    }

    async fn update(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<MutationResponse, CrmError> {
        self.post(collection, "update", &json!({ "records": records }))
            .await
    }

    async fn delete(
        &self,
        collection: Collection,
        ids: &[RecordId],
    ) -> Result<MutationResponse, CrmError> {
        self.post(collection, "delete", &json!({ "RecordIds": ids }))
            .await
    }
}
