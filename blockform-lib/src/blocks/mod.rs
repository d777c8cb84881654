//! Block decorators: each turns authored block markup into its final DOM.

pub mod banner;
pub mod customform;
pub mod questionnaire;
pub mod render;

use std::str::FromStr;

use crate::dom::dom_tree::{self, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    CustomForm,
    Banner,
    Questionnaire,
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customform" => Ok(BlockKind::CustomForm),
            "faintlybanner" | "banner" => Ok(BlockKind::Banner),
            "questionnaire" => Ok(BlockKind::Questionnaire),
            other => Err(format!("unknown block {}", other)),
        }
    }
}

impl BlockKind {
    /// Picks the decorator from the block's first class name.
    pub fn detect(block: &NodeRef) -> Option<Self> {
        dom_tree::get_attr(block, "class")?
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    }
}

/// Trimmed text of the block row at `index`, like `children[i].innerText.trim()`.
pub(crate) fn row_text(block: &NodeRef, index: usize) -> Option<String> {
    dom_tree::element_child(block, index).map(|row| dom_tree::text_content(&row).trim().to_string())
}

/// `src` of the first image inside the block row at `index`.
pub(crate) fn row_image(block: &NodeRef, index: usize) -> Option<(String, Option<String>)> {
    let row = dom_tree::element_child(block, index)?;
    let img = dom_tree::find_first(&row, |e| e.tag == "img")?;
    let src = dom_tree::get_attr(&img, "src")?;
    Some((src, dom_tree::get_attr(&img, "alt")))
}
