// HTTP Remote Caller Adapter
//
// Anti-Corruption Layer for the cluster-management HTTP API.
// One request per call, per-request timeout, bearer auth when the cluster
// carries a token, multipart body for package uploads.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::domain::cluster::ClusterConfig;
use crate::domain::remote::{
    RemoteCallError, RemoteCaller, RemoteMethod, RemoteRequest, RemoteResult, PACKAGE_FIELD,
};

pub struct HttpRemoteCaller {
    client: reqwest::Client,
}

impl HttpRemoteCaller {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpRemoteCaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteCaller for HttpRemoteCaller {
    async fn call(
        &self,
        cluster: &ClusterConfig,
        request: RemoteRequest,
    ) -> Result<RemoteResult, RemoteCallError> {
        let url = format!("{}{}", cluster.endpoint.trim_end_matches('/'), request.path);
        let timeout = request.timeout.unwrap_or_else(|| cluster.timeout());

        let mut builder = match request.method {
            RemoteMethod::Get => self.client.get(&url),
            RemoteMethod::Post => self.client.post(&url),
            RemoteMethod::Delete => self.client.delete(&url),
        }
        .timeout(timeout);

        if let Some(token) = &cluster.token {
            builder = builder.bearer_auth(token);
        }

        if let Some(package) = request.package {
            let length = package.bytes.len() as u64;
            let part = Part::stream_with_length(package.bytes, length)
                .file_name(package.file_name)
                .mime_str("application/octet-stream")
                .map_err(|e| RemoteCallError::new(format!("package part: {e}")))?;
            builder = builder.multipart(Form::new().part(PACKAGE_FIELD, part));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RemoteCallError::new(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteCallError::new(e.to_string()))?;

        if !status.is_success() {
            // Agents answer errors with the envelope when they can; fall
            // back to the raw status line otherwise.
            if let Ok(result) = serde_json::from_str::<RemoteResult>(&body) {
                if !result.code.is_empty() {
                    return Ok(result);
                }
            }
            return Err(RemoteCallError::new(format!("HTTP {status}: {body}")));
        }

        serde_json::from_str(&body)
            .map_err(|e| RemoteCallError::new(format!("undecodable response: {e}")))
    }
}
