//! The network seam. Everything that talks to the site goes through `Fetcher`.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::{FormError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to `url`.
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        FetchRequest {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Issues requests on behalf of the form. Futures are not `Send`: the DOM
/// is single-threaded.
#[async_trait(?Send)]
pub trait Fetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// GET `url` and decode the JSON body. Non-2xx answers are errors.
pub async fn get_json<T, F>(fetcher: &F, url: &str) -> Result<T>
where
    T: DeserializeOwned,
    F: Fetcher + ?Sized,
{
    let response = fetcher.fetch(FetchRequest::get(url)).await?;
    if !response.ok() {
        return Err(FormError::Status {
            url: url.to_string(),
            status: response.status,
        });
    }
    response.json()
}

/// `Fetcher` over HTTP. Site-relative paths are resolved against `base_url`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|_| FormError::InvalidUrl(base_url.to_string()))?;
        Ok(HttpFetcher {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        self.base_url
            .join(url)
            .map_err(|_| FormError::InvalidUrl(url.to_string()))
    }
}

#[async_trait(?Send)]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let url = self.resolve(&request.url)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let to_fetch_error = |e: reqwest::Error| FormError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = builder.send().await.map_err(to_fetch_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(to_fetch_error)?;
        log::debug!("{} -> {}", url, status);
        Ok(FetchResponse { status, body })
    }
}

/// Path and query of an absolute URL, so remote option sheets are fetched
/// from the current origin.
pub fn same_origin_path(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| FormError::InvalidUrl(url.to_string()))?;
    Ok(match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    })
}

/// Path component of an absolute URL.
pub fn url_path(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| FormError::InvalidUrl(url.to_string()))?;
    Ok(parsed.path().to_string())
}
