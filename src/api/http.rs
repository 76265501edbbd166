//! Implements the gateway traits with `reqwest` against the web-app endpoint.

use crate::api::{
    Ack, ReadChannel, TransportError, WriteChannel, WriteRequest, GET_CLASSES, GET_HISTORY,
    GET_MEMBERS,
};
use crate::error::Res;
use crate::model::{HistoryPage, Member, Summary};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

/// The response envelope of every read action.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    summary: Option<Summary>,
}

pub(super) struct HttpGateway {
    client: reqwest::Client,
    endpoint: Url,
    secret_key: String,
}

impl HttpGateway {
    pub(super) fn new(endpoint: Url, secret_key: impl Into<String>) -> Res<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            secret_key: secret_key.into(),
        })
    }

    async fn get<T>(&self, action: &str, params: &[(&str, String)]) -> Res<(T, Option<Summary>)>
    where
        T: DeserializeOwned,
    {
        trace!("GET {action} {params:?}");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("action", action)])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send the {action} request"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read the {action} response"))?;
        if !status.is_success() {
            bail!("{action} failed with HTTP status {status}");
        }
        parse_response(action, &body)
    }
}

#[async_trait::async_trait]
impl ReadChannel for HttpGateway {
    async fn classes(&self) -> Res<Vec<String>> {
        let (classes, _) = self.get(GET_CLASSES, &[]).await?;
        Ok(classes)
    }

    async fn members(&self, kelas: Option<&str>) -> Res<Vec<Member>> {
        let params: Vec<(&str, String)> = match kelas {
            Some(kelas) if !kelas.is_empty() => vec![("kelas", kelas.to_string())],
            _ => Vec::new(),
        };
        let (members, _) = self.get(GET_MEMBERS, &params).await?;
        Ok(members)
    }

    async fn history(&self, limit: u32) -> Res<HistoryPage> {
        let (transactions, summary) = self
            .get(GET_HISTORY, &[("limit", limit.to_string())])
            .await?;
        Ok(HistoryPage {
            transactions,
            summary,
        })
    }
}

#[async_trait::async_trait]
impl WriteChannel for HttpGateway {
    async fn send(&self, request: &WriteRequest) -> Result<Ack, TransportError> {
        let action = request.action();
        trace!("POST {action}");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request.envelope(&self.secret_key))
            .send()
            .await
            .map_err(|e| TransportError::new(action, e))?;
        // The body is never read. The status is logged only; it is not a confirmation.
        debug!("{action} delivered, HTTP status {}", response.status());
        Ok(Ack::new(action))
    }
}

/// Parses the read envelope, turning `success: false` into an error carrying the remote message.
fn parse_response<T>(action: &str, body: &str) -> Res<(T, Option<Summary>)>
where
    T: DeserializeOwned,
{
    let response: ApiResponse<T> = serde_json::from_str(body)
        .with_context(|| format!("The {action} response is not valid JSON"))?;
    if !response.success {
        match response.message {
            Some(message) => bail!("{action} failed: {message}"),
            None => bail!("{action} failed without a message"),
        }
    }
    let data = response
        .data
        .with_context(|| format!("The {action} response has no data"))?;
    Ok((data, response.summary))
}
