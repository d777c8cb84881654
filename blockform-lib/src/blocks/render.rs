use serde_json::Value;

use crate::dom::dom_tree::{self, NodeRef};
use crate::error::Result;

/// Renders a block from its extracted context. Templates live with the site;
/// decorators only hand over the context.
pub trait BlockRenderer {
    fn render_block(&self, block: &NodeRef, context: &Value) -> Result<()>;
}

/// Replaces the block content with its context as an inline JSON script,
/// for client-side templates to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextRenderer;

impl BlockRenderer for ContextRenderer {
    fn render_block(&self, block: &NodeRef, context: &Value) -> Result<()> {
        let json = serde_json::to_string(context)?.replace("</", "<\\/");
        let script = dom_tree::element_with(
            "script",
            &[("type", "application/json"), ("class", "block-context")],
        );
        dom_tree::set_text_content(&script, &json);
        dom_tree::replace_children(block, &[script]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn context_lands_in_a_json_script() {
        let block = dom_tree::element_with("div", &[("class", "banner")]);
        dom_tree::append_child(&block, &dom_tree::element("div"));

        ContextRenderer
            .render_block(&block, &json!({"text": "</script>"}))
            .unwrap();

        assert_eq!(
            dom_tree::to_html(&block),
            r#"<div class="banner"><script type="application/json" class="block-context">{"text":"<\/script>"}</script></div>"#
        );
    }
}
