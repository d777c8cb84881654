//! Submitting a built form and reporting the result on the page.

use serde::Serialize;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use crate::config::{FormConfig, SubmitMethod};
use crate::dom::dom_tree::{self, NodeRef};
use crate::error::Result;
use crate::fetch::{FetchRequest, Fetcher, Method};
use crate::form::Form;
use crate::payload::{generate_payload, Payload};
use crate::pdf;

pub const SUCCESS_MESSAGE: &str = "Form submitted successfully!";
pub const ERROR_MESSAGE: &str = "An error occurred. Please try again.";

/// Receives generated files, the way a browser download would.
pub trait DownloadSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<()>;
}

/// Saves downloads into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryDownloads { dir: dir.into() }
    }
}

impl DownloadSink for DirectoryDownloads {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(file_name), bytes)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was still in flight.
    Ignored,
    /// Constraint validation failed; the first invalid control got focus.
    Invalid { field_id: Option<String> },
    /// Accepted; the page navigates to the thank-you page.
    Redirected(String),
    /// Accepted; a success notice is shown.
    Succeeded,
    /// The endpoint answered with something other than 200.
    Rejected { status: u16 },
    /// The request (or the PDF) failed. Logged only.
    Failed,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    data: &'a Payload,
}

/// Builds the request for `payload` under the configured method.
pub fn build_request(action: &str, payload: &Payload, method: SubmitMethod) -> Result<FetchRequest> {
    let mut request = FetchRequest::get(action).header("Content-Type", "application/json");
    match method {
        SubmitMethod::Get => request.query = payload.entries().to_vec(),
        SubmitMethod::Post => {
            request.method = Method::Post;
            request.body = Some(serde_json::to_string(&SubmitBody { data: payload })?);
        }
    }
    Ok(request)
}

#[derive(Debug)]
struct Notice {
    node: NodeRef,
    expires_at: Instant,
}

/// Drives submissions of one form and owns the notices they leave behind.
pub struct Submitter<'a> {
    fetcher: &'a dyn Fetcher,
    downloads: &'a dyn DownloadSink,
    config: &'a FormConfig,
    thank_you_page: Option<String>,
    notices: RefCell<Vec<Notice>>,
}

impl<'a> Submitter<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        downloads: &'a dyn DownloadSink,
        config: &'a FormConfig,
        thank_you_page: Option<String>,
    ) -> Self {
        Submitter {
            fetcher,
            downloads,
            config,
            thank_you_page,
            notices: RefCell::new(Vec::new()),
        }
    }

    /// The submit event: validate first, focus the first invalid control or
    /// hand over to `handle_submit`.
    pub async fn on_submit(&self, form: &Form, now: Instant) -> SubmitOutcome {
        if let Some(invalid) = form.first_invalid() {
            dom_tree::set_attr(&invalid, "data-focused", "true");
            let field_id = dom_tree::get_attr(&invalid, "id");
            log::debug!("submit blocked by invalid field {:?}", field_id);
            return SubmitOutcome::Invalid { field_id };
        }
        self.handle_submit(form, now).await
    }

    /// Sends the form unless a submission is already in flight.
    pub async fn handle_submit(&self, form: &Form, now: Instant) -> SubmitOutcome {
        if form.is_submitting() {
            return SubmitOutcome::Ignored;
        }

        let submit = form.submit_button();
        form.set_submitting(true);
        if let Some(button) = &submit {
            dom_tree::set_attr(button, "disabled", "");
        }

        let outcome = self.send(form, now).await;

        form.set_submitting(false);
        if let Some(button) = &submit {
            dom_tree::remove_attr(button, "disabled");
        }
        outcome
    }

    async fn send(&self, form: &Form, now: Instant) -> SubmitOutcome {
        let payload = generate_payload(form);
        let request = match build_request(&form.action(), &payload, self.config.submit_method) {
            Ok(request) => request,
            Err(e) => {
                log::error!("{}", e);
                return SubmitOutcome::Failed;
            }
        };

        let response = match self.fetcher.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("{}", e);
                return SubmitOutcome::Failed;
            }
        };

        if response.status != 200 {
            self.show_error(form, now);
            log::error!("Form submission error: {}", response.body);
            return SubmitOutcome::Rejected {
                status: response.status,
            };
        }

        if let Err(e) = self.download_pdf(&payload) {
            log::error!("{}", e);
            return SubmitOutcome::Failed;
        }

        match &self.thank_you_page {
            Some(page) => {
                log::info!("form submitted, redirecting to {}", page);
                SubmitOutcome::Redirected(page.clone())
            }
            None => {
                log::info!("form submitted");
                self.show_success(form, now);
                SubmitOutcome::Succeeded
            }
        }
    }

    fn download_pdf(&self, payload: &Payload) -> Result<()> {
        let bytes = pdf::submission_pdf("Form submission", payload)?;
        self.downloads.save(&self.config.pdf_file_name, &bytes)
    }

    fn show_success(&self, form: &Form, now: Instant) {
        let Some(parent) = dom_tree::parent_of(form.root()) else {
            log::warn!("form is not attached, no success notice shown");
            return;
        };
        if dom_tree::find_first(&parent, |e| e.has_class("form-success-message")).is_some() {
            return;
        }
        let notice = self.insert_notice(&parent, form.root(), "form-success-message", now);
        dom_tree::set_text_content(&notice, SUCCESS_MESSAGE);
    }

    fn show_error(&self, form: &Form, now: Instant) {
        let Some(parent) = dom_tree::parent_of(form.root()) else {
            log::warn!("form is not attached, no error notice shown");
            return;
        };
        let notice = match dom_tree::find_first(&parent, |e| e.has_class("form-error-message")) {
            Some(existing) => {
                self.restart_timer(&existing, now);
                existing
            }
            None => self.insert_notice(&parent, form.root(), "form-error-message", now),
        };
        dom_tree::set_text_content(&notice, ERROR_MESSAGE);
    }

    /// A reused notice stays up for a full lifetime from `now`.
    fn restart_timer(&self, node: &NodeRef, now: Instant) {
        let expires_at = now + self.config.notice_lifetime;
        let mut notices = self.notices.borrow_mut();
        match notices.iter_mut().find(|n| Rc::ptr_eq(&n.node, node)) {
            Some(notice) => notice.expires_at = expires_at,
            None => notices.push(Notice {
                node: node.clone(),
                expires_at,
            }),
        }
    }

    fn insert_notice(&self, parent: &NodeRef, form: &NodeRef, class: &str, now: Instant) -> NodeRef {
        let node = dom_tree::element_with("div", &[("class", class)]);
        dom_tree::insert_before(parent, &node, form);
        self.notices.borrow_mut().push(Notice {
            node: node.clone(),
            expires_at: now + self.config.notice_lifetime,
        });
        node
    }

    /// Removes notices whose lifetime has run out. Returns how many went.
    pub fn expire_notices(&self, now: Instant) -> usize {
        let mut notices = self.notices.borrow_mut();
        let before = notices.len();
        notices.retain(|notice| {
            if notice.expires_at <= now {
                dom_tree::detach(&notice.node);
                false
            } else {
                true
            }
        });
        before - notices.len()
    }
}
