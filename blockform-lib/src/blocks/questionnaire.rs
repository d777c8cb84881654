use serde::Serialize;

use super::render::BlockRenderer;
use super::{row_image, row_text};
use crate::dom::dom_tree::{self, NodeRef};
use crate::error::Result;

/// Viewports at least this wide get the desktop background image.
pub const DESKTOP_MIN_WIDTH: u32 = 768;

const DESKTOP_IMAGE_ROW: usize = 6;
const MOBILE_IMAGE_ROW: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionnaireContext {
    pub headline: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "submitText")]
    pub submit_text: Option<String>,
    pub footer: Option<String>,
}

/// Rows 0-2 hold the intro, row 3 the (template-owned) options, rows 4 and
/// 5 the button text and footer.
pub fn questionnaire_context(block: &NodeRef) -> QuestionnaireContext {
    QuestionnaireContext {
        headline: row_text(block, 0),
        title: row_text(block, 1),
        description: row_text(block, 2),
        submit_text: row_text(block, 4),
        footer: row_text(block, 5),
    }
}

/// A rendered questionnaire block.
#[derive(Debug)]
pub struct Questionnaire {
    block: NodeRef,
    background: Option<String>,
}

pub fn decorate(
    block: &NodeRef,
    renderer: &dyn BlockRenderer,
    viewport_width: u32,
) -> Result<Questionnaire> {
    let image_row = if viewport_width >= DESKTOP_MIN_WIDTH {
        DESKTOP_IMAGE_ROW
    } else {
        MOBILE_IMAGE_ROW
    };
    let background = row_image(block, image_row).map(|(src, _)| src);

    let context = questionnaire_context(block);
    renderer.render_block(block, &serde_json::to_value(&context)?)?;

    let questionnaire = Questionnaire {
        block: block.clone(),
        background,
    };
    questionnaire.apply_background();
    Ok(questionnaire)
}

impl Questionnaire {
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    fn apply_background(&self) {
        let Some(src) = &self.background else {
            return;
        };
        let target = dom_tree::find_first(&self.block, |e| e.has_class("questionnaire--form"))
            .and_then(|form| dom_tree::find_first(&form, |e| e.has_class("questionnaire--bg")));
        match target {
            Some(bg) => set_style_property(&bg, "background-image", &format!("url('{}')", src)),
            None => log::debug!("questionnaire template has no background element"),
        }
    }

    /// The start button: opens the survey and reveals its wrapper.
    pub fn start(&self) {
        for form in dom_tree::find_all(&self.block, |e| e.has_class("questionnaire--form")) {
            dom_tree::add_class(&form, "survey--open");
        }
        for wrapper in dom_tree::find_all(&self.block, |e| e.has_class("survey--wrapper")) {
            remove_style_property(&wrapper, "display");
            dom_tree::remove_attr(&wrapper, "hidden");
        }
    }
}

fn style_declarations(node: &NodeRef) -> Vec<(String, String)> {
    dom_tree::get_attr(node, "style")
        .unwrap_or_default()
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn write_style(node: &NodeRef, declarations: &[(String, String)]) {
    if declarations.is_empty() {
        dom_tree::remove_attr(node, "style");
        return;
    }
    let style = declarations
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ");
    dom_tree::set_attr(node, "style", &style);
}

fn set_style_property(node: &NodeRef, property: &str, value: &str) {
    let mut declarations = style_declarations(node);
    declarations.retain(|(name, _)| name != property);
    declarations.push((property.to_string(), value.to_string()));
    write_style(node, &declarations);
}

fn remove_style_property(node: &NodeRef, property: &str) {
    let mut declarations = style_declarations(node);
    declarations.retain(|(name, _)| name != property);
    write_style(node, &declarations);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::block_html::parse_block;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    /// Stands in for the site template.
    struct SurveyTemplate;

    impl BlockRenderer for SurveyTemplate {
        fn render_block(&self, block: &NodeRef, context: &Value) -> Result<()> {
            let form = dom_tree::element_with("div", &[("class", "questionnaire--form")]);
            let bg = dom_tree::element_with("div", &[("class", "questionnaire--bg")]);
            let survey = dom_tree::element_with(
                "div",
                &[("class", "survey--wrapper"), ("style", "display: none")],
            );
            let headline = dom_tree::element("h2");
            dom_tree::set_text_content(&headline, context["headline"].as_str().unwrap_or_default());
            for child in [&bg, &headline, &survey] {
                dom_tree::append_child(&form, child);
            }
            dom_tree::replace_children(block, &[form]);
            Ok(())
        }
    }

    fn block_markup() -> String {
        let mut rows: Vec<String> = ["Quiz", "Find your plan", "Two minutes", "", "Start", "Terms apply"]
            .iter()
            .map(|t| format!("<div><div>{}</div></div>", t))
            .collect();
        rows.push(r#"<div><div><img src="/media/desktop.jpg"></div></div>"#.to_string());
        rows.push(r#"<div><div><img src="/media/mobile.jpg"></div></div>"#.to_string());
        format!(r#"<div class="questionnaire">{}</div>"#, rows.concat())
    }

    #[test]
    fn context_skips_the_options_row() {
        let (_doc, block) = parse_block(&block_markup()).unwrap();
        let context = questionnaire_context(&block);
        assert_eq!(context.headline.as_deref(), Some("Quiz"));
        assert_eq!(context.submit_text.as_deref(), Some("Start"));
        assert_eq!(
            serde_json::to_value(&context).unwrap()["submitText"],
            Value::from("Start")
        );
    }

    #[test]
    fn background_follows_viewport() {
        let (_doc, block) = parse_block(&block_markup()).unwrap();
        let questionnaire = decorate(&block, &SurveyTemplate, 1024).unwrap();
        assert_eq!(questionnaire.background(), Some("/media/desktop.jpg"));

        let bg = dom_tree::find_first(&block, |e| e.has_class("questionnaire--bg")).unwrap();
        assert_eq!(
            dom_tree::get_attr(&bg, "style").as_deref(),
            Some("background-image: url('/media/desktop.jpg')")
        );

        let (_doc, block) = parse_block(&block_markup()).unwrap();
        let questionnaire = decorate(&block, &SurveyTemplate, 375).unwrap();
        assert_eq!(questionnaire.background(), Some("/media/mobile.jpg"));
    }

    #[test]
    fn start_opens_the_survey() {
        let (_doc, block) = parse_block(&block_markup()).unwrap();
        let questionnaire = decorate(&block, &SurveyTemplate, 1024).unwrap();
        questionnaire.start();

        let form = dom_tree::find_first(&block, |e| e.has_class("questionnaire--form")).unwrap();
        assert!(dom_tree::has_class(&form, "survey--open"));
        let survey = dom_tree::find_first(&block, |e| e.has_class("survey--wrapper")).unwrap();
        assert_eq!(dom_tree::get_attr(&survey, "style"), None);
    }
}
