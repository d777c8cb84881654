//! Reactive field behavior: which check runs on which event, and how its
//! outcome shows up in the DOM.

use chrono::NaiveDate;

use crate::dom::dom_tree::{self, NodeRef};
use crate::parser::dom_indices::DomIndices;
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Input,
    Change,
    Click,
}

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Inline error while the value is not an email address.
    EmailFormat,
    /// Inline error while the value differs from the input named `primary_name`.
    EmailMatch { primary_name: String },
    /// Cut the value down to this many characters.
    TruncateDigits(usize),
    /// Inline error for birth dates younger than this many years.
    MinimumAge(u32),
    /// Keep `selected` on exactly the option matching the select's value.
    SyncSelected,
    /// Flip the checkbox behind a toggle slider.
    ToggleSlider { checkbox: NodeRef },
}

/// A behavior bound to one element, recorded while the field is built.
#[derive(Debug, Clone)]
pub struct Listener {
    pub target: NodeRef,
    pub kind: EventKind,
    /// Wrapper that receives inline error nodes.
    pub wrapper: NodeRef,
    pub behavior: Behavior,
}

impl Listener {
    pub fn new(target: &NodeRef, kind: EventKind, wrapper: &NodeRef, behavior: Behavior) -> Self {
        Listener {
            target: target.clone(),
            kind,
            wrapper: wrapper.clone(),
            behavior,
        }
    }
}

/// What a listener may look at besides its own element.
pub struct EventContext<'a> {
    pub form: &'a NodeRef,
    pub today: NaiveDate,
}

/// Runs one listener against the current DOM state.
pub fn apply(listener: &Listener, ctx: &EventContext<'_>) {
    let field = &listener.target;
    let value = control_value(field);
    match &listener.behavior {
        Behavior::EmailFormat => match validation::validate_email(&value) {
            Some(err) => show_error_once(&listener.wrapper, field, &err),
            None => clear_error(&listener.wrapper, field),
        },
        Behavior::EmailMatch { primary_name } => {
            let indices = DomIndices::build(ctx.form);
            let primary = indices
                .by_tag_and_name("input", primary_name)
                .map(control_value)
                .unwrap_or_default();
            match validation::validate_email_match(&primary, &value) {
                Some(err) => show_error_once(&listener.wrapper, field, &err),
                None => clear_error(&listener.wrapper, field),
            }
        }
        Behavior::TruncateDigits(max_length) => {
            if let Some(truncated) = validation::truncate_to_max_length(&value, *max_length) {
                set_control_value(field, &truncated);
            }
        }
        Behavior::MinimumAge(years) => {
            match validation::validate_minimum_age(&value, ctx.today, *years) {
                Some(err) => replace_error(&listener.wrapper, field, &err),
                None => clear_error(&listener.wrapper, field),
            }
        }
        Behavior::SyncSelected => {
            let selected = control_value(field);
            for option in dom_tree::find_all(field, |e| e.tag == "option") {
                let matches = dom_tree::get_attr(&option, "value").unwrap_or_default() == selected;
                dom_tree::toggle_attr(&option, "selected", matches);
            }
        }
        Behavior::ToggleSlider { checkbox } => {
            let checked = dom_tree::has_attr(checkbox, "checked");
            dom_tree::toggle_attr(checkbox, "checked", !checked);
        }
    }
}

fn error_id(field: &NodeRef) -> String {
    format!("{}-error", dom_tree::get_attr(field, "id").unwrap_or_default())
}

pub fn inline_error(wrapper: &NodeRef, field: &NodeRef) -> Option<NodeRef> {
    dom_tree::find_by_id(wrapper, &error_id(field))
}

/// Adds the error node unless one is already shown; an existing node keeps
/// its text.
fn show_error_once(wrapper: &NodeRef, field: &NodeRef, err: &ValidationError) {
    if inline_error(wrapper, field).is_none() {
        append_error(wrapper, field, &err.to_string());
    }
}

fn replace_error(wrapper: &NodeRef, field: &NodeRef, err: &ValidationError) {
    match inline_error(wrapper, field) {
        Some(node) => dom_tree::set_text_content(&node, &err.to_string()),
        None => append_error(wrapper, field, &err.to_string()),
    }
}

pub fn append_error(wrapper: &NodeRef, field: &NodeRef, message: &str) {
    let id = error_id(field);
    let node = dom_tree::element_with("div", &[("id", id.as_str()), ("class", "error-message")]);
    dom_tree::set_text_content(&node, message);
    dom_tree::append_child(wrapper, &node);
}

fn clear_error(wrapper: &NodeRef, field: &NodeRef) {
    if let Some(node) = inline_error(wrapper, field) {
        dom_tree::detach(&node);
    }
}

/// The live value of a control, the way `element.value` reads it.
pub fn control_value(node: &NodeRef) -> String {
    match dom_tree::tag_name(node).as_deref() {
        Some("textarea") => dom_tree::text_content(node),
        Some("select") => {
            let options = dom_tree::find_all(node, |e| e.tag == "option");
            let chosen = options
                .iter()
                .find(|o| dom_tree::has_attr(o, "selected"))
                .or_else(|| options.iter().find(|o| !dom_tree::has_attr(o, "disabled")));
            chosen
                .and_then(|o| dom_tree::get_attr(o, "value"))
                .unwrap_or_default()
        }
        Some("input") => match dom_tree::get_attr(node, "value") {
            Some(value) => value,
            None if is_checkable(node) => "on".to_string(),
            None => String::new(),
        },
        _ => dom_tree::get_attr(node, "value").unwrap_or_default(),
    }
}

pub fn set_control_value(node: &NodeRef, value: &str) {
    match dom_tree::tag_name(node).as_deref() {
        Some("textarea") => dom_tree::set_text_content(node, value),
        Some("select") => {
            for option in dom_tree::find_all(node, |e| e.tag == "option") {
                let matches = dom_tree::get_attr(&option, "value").as_deref() == Some(value);
                dom_tree::toggle_attr(&option, "selected", matches);
            }
        }
        _ => dom_tree::set_attr(node, "value", value),
    }
}

pub fn input_type(node: &NodeRef) -> String {
    dom_tree::get_attr(node, "type")
        .unwrap_or_else(|| "text".to_string())
        .to_lowercase()
}

pub fn is_checkable(node: &NodeRef) -> bool {
    dom_tree::tag_name(node).as_deref() == Some("input")
        && matches!(input_type(node).as_str(), "checkbox" | "radio")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::dom_tree::{append_child, element_with};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn email_field(id: &str) -> (NodeRef, NodeRef, NodeRef) {
        let form = element_with("form", &[]);
        let wrapper = element_with("div", &[("class", "field-wrapper")]);
        let input = element_with("input", &[("type", "email"), ("id", id)]);
        append_child(&wrapper, &input);
        append_child(&form, &wrapper);
        (form, wrapper, input)
    }

    #[test]
    fn email_format_error_comes_and_goes() {
        let (form, wrapper, input) = email_field("form-email");
        let listener = Listener::new(&input, EventKind::Input, &wrapper, Behavior::EmailFormat);
        let ctx = EventContext { form: &form, today: today() };

        set_control_value(&input, "a@b");
        apply(&listener, &ctx);
        let error = inline_error(&wrapper, &input).unwrap();
        assert_eq!(dom_tree::text_content(&error), "Please enter a valid email address.");

        set_control_value(&input, "a@b.com");
        apply(&listener, &ctx);
        assert!(inline_error(&wrapper, &input).is_none());
    }

    #[test]
    fn select_value_falls_back_to_first_enabled_option() {
        let select = element_with("select", &[]);
        let placeholder = element_with("option", &[("value", ""), ("disabled", "")]);
        let red = element_with("option", &[("value", "red")]);
        let blue = element_with("option", &[("value", "blue")]);
        for option in [&placeholder, &red, &blue] {
            append_child(&select, option);
        }

        assert_eq!(control_value(&select), "red");
        set_control_value(&select, "blue");
        assert_eq!(control_value(&select), "blue");
        assert!(!dom_tree::has_attr(&red, "selected"));
    }

    #[test]
    fn checkbox_defaults_to_on() {
        let checkbox = element_with("input", &[("type", "checkbox")]);
        assert_eq!(control_value(&checkbox), "on");
    }
}
