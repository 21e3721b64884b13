use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::AppError;

/// JSON client for one record-service collection, e.g. `.../api/trips`.
#[derive(Clone, Debug)]
pub struct RemoteClient {
    client: Client,
    base: Url,
}

impl RemoteClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended as path segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn endpoint_with_query(
        &self,
        segments: &[&str],
        pairs: &[(&str, &str)],
    ) -> Result<Url, AppError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().extend_pairs(pairs);
        Ok(url)
    }

    pub async fn get_json<T>(&self, context: &'static str, url: Url) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(context, self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    /// Fetches a JSON array and keeps the elements that decode as `T`.
    /// Malformed elements are logged and skipped.
    pub async fn get_json_list<T>(&self, context: &'static str, url: Url) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned,
    {
        let raw: Vec<Value> = self.get_json(context, url).await?;
        Ok(decode_records(context, raw))
    }

    pub async fn send_json<B, T>(
        &self,
        context: &'static str,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(context, self.client.request(method, url).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// Like [`send_json`](Self::send_json) but ignores the response body.
    pub async fn send_json_discarding<B>(
        &self,
        context: &'static str,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<(), AppError>
    where
        B: Serialize + ?Sized,
    {
        self.send(context, self.client.request(method, url).json(body))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, context: &'static str, url: Url) -> Result<(), AppError> {
        self.send(context, self.client.delete(url)).await?;
        Ok(())
    }

    async fn send(
        &self,
        context: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, AppError> {
        let response = request.send().await.map_err(|err| {
            warn!("{context}: request failed: {err}");
            AppError::Remote(err)
        })?;

        let status = response.status();
        debug!(%status, url = %response.url(), "{context}");
        if !status.is_success() {
            warn!("{context}: record service answered {status}");
            return Err(AppError::Upstream {
                context,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

pub(crate) fn decode_records<T>(context: &str, raw: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned,
{
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, "{context}: skipping malformed record: {err}");
                None
            }
        })
        .collect()
}
