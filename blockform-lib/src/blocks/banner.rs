use serde::Serialize;

use super::render::BlockRenderer;
use super::{row_image, row_text};
use crate::dom::dom_tree::NodeRef;
use crate::error::Result;

/// Variant name that switches the banner template to its alternate layout.
const ALTERNATE_VARIANT: &str = "rilt";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BannerContext {
    pub imgsrc: Option<String>,
    pub imgalt: Option<String>,
    pub text: Option<String>,
    pub bannervariant: Option<String>,
    pub test: bool,
}

/// Rows: image, text, variant.
pub fn banner_context(block: &NodeRef) -> BannerContext {
    let (imgsrc, imgalt) = match row_image(block, 0) {
        Some((src, alt)) => (Some(src), alt),
        None => (None, None),
    };
    let bannervariant = row_text(block, 2);
    BannerContext {
        imgsrc,
        imgalt,
        text: row_text(block, 1),
        test: bannervariant.as_deref() == Some(ALTERNATE_VARIANT),
        bannervariant,
    }
}

pub fn decorate(block: &NodeRef, renderer: &dyn BlockRenderer) -> Result<BannerContext> {
    let context = banner_context(block);
    renderer.render_block(block, &serde_json::to_value(&context)?)?;
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::block_html::parse_block;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_rows_positionally() {
        let html = r#"<div class="faintlybanner">
            <div><div><picture><img src="/media/hero.png" alt="Hero"></picture></div></div>
            <div><div>  Save 20% today </div></div>
            <div><div>rilt</div></div>
        </div>"#;
        let (_doc, block) = parse_block(html).unwrap();

        assert_eq!(
            banner_context(&block),
            BannerContext {
                imgsrc: Some("/media/hero.png".to_string()),
                imgalt: Some("Hero".to_string()),
                text: Some("Save 20% today".to_string()),
                bannervariant: Some("rilt".to_string()),
                test: true,
            }
        );
    }

    #[test]
    fn missing_rows_stay_empty() {
        let (_doc, block) = parse_block(r#"<div class="faintlybanner"></div>"#).unwrap();
        assert_eq!(banner_context(&block), BannerContext::default());
    }
}
