use std::time::Instant;

use crate::config::FormConfig;
use crate::dom::dom_tree::{self, NodeRef};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::form::Form;
use crate::form_builder::FormBuilder;
use crate::submission::{DownloadSink, SubmitOutcome, Submitter};

/// A decorated `customform` block: the built form plus its submit handling.
pub struct CustomForm<'a> {
    block: NodeRef,
    form: Form,
    submitter: Submitter<'a>,
}

/// Follows `path` through element children, like
/// `block.children.item(a).children.item(b)...`.
fn nested_child(block: &NodeRef, path: &[usize]) -> Option<NodeRef> {
    path.iter()
        .try_fold(block.clone(), |node, index| dom_tree::element_child(&node, *index))
}

/// Form sheet path: `title` of the link in the first row.
pub fn form_path(block: &NodeRef) -> Option<String> {
    nested_child(block, &[0, 0, 0, 0])
        .and_then(|link| dom_tree::get_attr(&link, "title"))
        .filter(|title| !title.is_empty())
}

/// Thank-you page: `href` of the link in the second row.
pub fn thank_you_page(block: &NodeRef) -> Option<String> {
    nested_child(block, &[1, 0, 0, 0])
        .and_then(|link| dom_tree::get_attr(&link, "href"))
        .filter(|href| !href.is_empty())
}

/// Replaces the block's authored rows with the form they point at.
///
/// Returns `None` when the block names no form.
pub async fn decorate<'a>(
    block: &NodeRef,
    fetcher: &'a dyn Fetcher,
    downloads: &'a dyn DownloadSink,
    config: &'a FormConfig,
) -> Result<Option<CustomForm<'a>>> {
    let Some(form_href) = form_path(block) else {
        log::warn!("customform block without a form link");
        return Ok(None);
    };
    let authored_thank_you = thank_you_page(block);

    let form = FormBuilder::new(fetcher, config)
        .create_form(&form_href, &config.submit_href)
        .await?;
    dom_tree::replace_children(block, &[form.root().clone()]);

    let thank_you = authored_thank_you.or_else(|| form.confirmation());
    Ok(Some(CustomForm {
        block: block.clone(),
        form,
        submitter: Submitter::new(fetcher, downloads, config, thank_you),
    }))
}

impl<'a> CustomForm<'a> {
    pub fn block(&self) -> &NodeRef {
        &self.block
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// The form's submit event.
    pub async fn submit(&self, now: Instant) -> SubmitOutcome {
        self.submitter.on_submit(&self.form, now).await
    }

    pub fn expire_notices(&self, now: Instant) -> usize {
        self.submitter.expire_notices(now)
    }
}
