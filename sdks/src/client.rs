// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use crate::types::{ApiEnvelope, ConsoleApiError};
use quarterdeck_core::domain::app::AppListing;
use quarterdeck_core::domain::remote::PACKAGE_FIELD;
use quarterdeck_core::presentation::api::USER_HEADER;

/// Client for interacting with the Quarterdeck console.
pub struct ConsoleClient {
    base_url: String,
    client: Client,
    principal: Option<String>,
}

impl ConsoleClient {
    /// Create a new console client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
            principal: None,
        }
    }

    /// Set the principal the requests run as. The console trusts this
    /// header from its fronting proxy, so outside a trusted network the
    /// client should sit behind the same proxy.
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    async fn send(&self, mut request: RequestBuilder) -> Result<Value, ConsoleApiError> {
        if let Some(principal) = &self.principal {
            request = request.header(USER_HEADER, principal);
        }
        let response = request.send().await?;
        let envelope: ApiEnvelope = response.json().await?;
        envelope.into_data()
    }

    /// List apps on a cluster, merged across its hosts.
    pub async fn list_apps(&self, cluster_code: &str) -> Result<AppListing, ConsoleApiError> {
        let url = format!("{}/api/apps", self.base_url);
        let data = self
            .send(self.client.get(&url).query(&[("clusterCode", cluster_code)]))
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn lifecycle(
        &self,
        op: &str,
        cluster_code: &str,
        appid: &str,
    ) -> Result<Value, ConsoleApiError> {
        let url = format!("{}/api/{}/{}", self.base_url, op, appid);
        self.send(
            self.client
                .post(&url)
                .json(&json!({ "clusterCode": cluster_code })),
        )
        .await
    }

    /// Start a stopped app.
    pub async fn start_app(&self, cluster_code: &str, appid: &str) -> Result<Value, ConsoleApiError> {
        self.lifecycle("start", cluster_code, appid).await
    }

    /// Stop a running app.
    pub async fn stop_app(&self, cluster_code: &str, appid: &str) -> Result<Value, ConsoleApiError> {
        self.lifecycle("stop", cluster_code, appid).await
    }

    /// Restart an app.
    pub async fn restart_app(
        &self,
        cluster_code: &str,
        appid: &str,
    ) -> Result<Value, ConsoleApiError> {
        self.lifecycle("restart", cluster_code, appid).await
    }

    /// Reload an app's workers.
    pub async fn reload_app(
        &self,
        cluster_code: &str,
        appid: &str,
    ) -> Result<Value, ConsoleApiError> {
        self.lifecycle("reload", cluster_code, appid).await
    }

    /// Delete an app from the cluster.
    pub async fn delete_app(
        &self,
        cluster_code: &str,
        appid: &str,
    ) -> Result<Value, ConsoleApiError> {
        self.lifecycle("delete", cluster_code, appid).await
    }

    /// Clear an app's recorded worker exits.
    pub async fn clean_exit_record(
        &self,
        cluster_code: &str,
        appid: &str,
    ) -> Result<Value, ConsoleApiError> {
        let url = format!("{}/api/clean_exit_record/{}", self.base_url, appid);
        self.send(
            self.client
                .delete(&url)
                .json(&json!({ "clusterCode": cluster_code })),
        )
        .await
    }

    /// Publish an app package to a cluster.
    pub async fn publish(
        &self,
        cluster_code: &str,
        file_name: &str,
        package: Vec<u8>,
    ) -> Result<Value, ConsoleApiError> {
        let url = format!("{}/api/publish", self.base_url);
        let part = Part::bytes(package)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(PACKAGE_FIELD, part);
        self.send(
            self.client
                .post(&url)
                .query(&[("clusterCode", cluster_code)])
                .multipart(form),
        )
        .await
    }
}
