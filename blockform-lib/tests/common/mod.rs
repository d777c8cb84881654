#![allow(dead_code)]

use async_trait::async_trait;
use blockform_lib::error::{FormError, Result};
use blockform_lib::fetch::{FetchRequest, FetchResponse, Fetcher};
use blockform_lib::submission::DownloadSink;
use std::cell::RefCell;
use std::collections::HashMap;

/// Answers requests from a fixed route table and records every request.
#[derive(Default)]
pub struct StaticFetcher {
    routes: HashMap<String, FetchResponse>,
    pub requests: RefCell<Vec<FetchRequest>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: &str, body: &str) -> Self {
        self.with_status(url, 200, body)
    }

    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

#[async_trait(?Send)]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        self.requests.borrow_mut().push(request.clone());
        // Suspend once, like a real network round trip.
        tokio::task::yield_now().await;
        self.routes
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FormError::Fetch {
                url: request.url.clone(),
                message: "connection refused".to_string(),
            })
    }
}

/// Keeps downloaded files in memory.
#[derive(Default)]
pub struct MemoryDownloads {
    pub files: RefCell<Vec<(String, Vec<u8>)>>,
}

impl DownloadSink for MemoryDownloads {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        self.files
            .borrow_mut()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
