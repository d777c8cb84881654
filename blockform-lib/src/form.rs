use chrono::{Local, NaiveDate};
use std::rc::Rc;

use crate::dom::dom_tree::{self, NodeRef};
use crate::events::{self, is_checkable, input_type, EventContext, EventKind, Listener};
use crate::validation;

/// Tags that count as form controls (`form.elements`).
const LISTED_ELEMENTS: &[&str] = &["button", "fieldset", "input", "object", "output", "select", "textarea"];

/// A built form: its element plus the listeners wired into its fields.
///
/// User interaction goes through `input`, `change` and `click`, which update
/// the control and run the listeners registered for that event.
#[derive(Debug)]
pub struct Form {
    root: NodeRef,
    listeners: Vec<Listener>,
    today: NaiveDate,
}

impl Form {
    pub fn new(root: NodeRef, listeners: Vec<Listener>) -> Self {
        Form {
            root,
            listeners,
            today: Local::now().date_naive(),
        }
    }

    /// Pins the date age checks compare against.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Submit target (`data-action`).
    pub fn action(&self) -> String {
        dom_tree::get_attr(&self.root, "data-action").unwrap_or_default()
    }

    /// Thank-you path stored by a `confirmation` row.
    pub fn confirmation(&self) -> Option<String> {
        dom_tree::get_attr(&self.root, "data-confirmation")
    }

    pub fn is_submitting(&self) -> bool {
        dom_tree::get_attr(&self.root, "data-submitting").as_deref() == Some("true")
    }

    pub fn set_submitting(&self, submitting: bool) {
        dom_tree::set_attr(
            &self.root,
            "data-submitting",
            if submitting { "true" } else { "false" },
        );
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        dom_tree::find_by_id(&self.root, id)
    }

    /// Form controls in tree order.
    pub fn elements(&self) -> Vec<NodeRef> {
        dom_tree::find_all(&self.root, |e| LISTED_ELEMENTS.contains(&e.tag.as_str()))
    }

    pub fn submit_button(&self) -> Option<NodeRef> {
        dom_tree::find_first(&self.root, |e| {
            e.tag == "button" && e.attribute("type") == Some("submit")
        })
    }

    /// Types `value` into the control with `id`. Returns false when no such
    /// control exists.
    pub fn input(&self, id: &str, value: &str) -> bool {
        let Some(field) = self.element_by_id(id) else {
            return false;
        };
        events::set_control_value(&field, value);
        self.fire(&field, EventKind::Input);
        true
    }

    /// Commits `value` into the control with `id`: input then change listeners.
    pub fn change(&self, id: &str, value: &str) -> bool {
        let Some(field) = self.element_by_id(id) else {
            return false;
        };
        events::set_control_value(&field, value);
        self.fire(&field, EventKind::Input);
        self.fire(&field, EventKind::Change);
        true
    }

    /// Clicks `target`. Checkboxes flip, radios become the checked member of
    /// their group.
    pub fn click(&self, target: &NodeRef) {
        if is_checkable(target) {
            if input_type(target) == "radio" {
                let name = dom_tree::get_attr(target, "name").unwrap_or_default();
                for other in self.radio_group(&name) {
                    dom_tree::remove_attr(&other, "checked");
                }
                dom_tree::set_attr(target, "checked", "");
            } else {
                let checked = dom_tree::has_attr(target, "checked");
                dom_tree::toggle_attr(target, "checked", !checked);
            }
        }
        self.fire(target, EventKind::Click);
        if is_checkable(target) {
            self.fire(target, EventKind::Input);
            self.fire(target, EventKind::Change);
        }
    }

    pub fn click_id(&self, id: &str) -> bool {
        match self.element_by_id(id) {
            Some(target) => {
                self.click(&target);
                true
            }
            None => false,
        }
    }

    fn fire(&self, target: &NodeRef, kind: EventKind) {
        let ctx = EventContext {
            form: &self.root,
            today: self.today,
        };
        for listener in &self.listeners {
            if listener.kind == kind && Rc::ptr_eq(&listener.target, target) {
                events::apply(listener, &ctx);
            }
        }
    }

    fn radio_group(&self, name: &str) -> Vec<NodeRef> {
        dom_tree::find_all(&self.root, |e| {
            e.tag == "input" && e.attribute("type") == Some("radio") && e.attribute("name") == Some(name)
        })
    }

    /// Constraint validation for one control: `required` and the email type.
    fn is_invalid(&self, field: &NodeRef) -> bool {
        let tag = dom_tree::tag_name(field).unwrap_or_default();
        if !matches!(tag.as_str(), "input" | "select" | "textarea")
            || dom_tree::has_attr(field, "disabled")
        {
            return false;
        }
        let kind = input_type(field);
        if tag == "input" && matches!(kind.as_str(), "hidden" | "submit" | "button" | "reset") {
            return false;
        }

        let value = events::control_value(field);
        if dom_tree::has_attr(field, "required") {
            let missing = match (tag.as_str(), kind.as_str()) {
                ("input", "checkbox") => !dom_tree::has_attr(field, "checked"),
                ("input", "radio") => {
                    let name = dom_tree::get_attr(field, "name").unwrap_or_default();
                    !self
                        .radio_group(&name)
                        .iter()
                        .any(|r| dom_tree::has_attr(r, "checked"))
                }
                _ => value.is_empty(),
            };
            if missing {
                return true;
            }
        }
        tag == "input" && kind == "email" && !value.is_empty() && !validation::is_valid_email(&value)
    }

    /// First control failing constraint validation, fieldsets never included.
    pub fn first_invalid(&self) -> Option<NodeRef> {
        self.elements().into_iter().find(|field| self.is_invalid(field))
    }

    pub fn check_validity(&self) -> bool {
        self.first_invalid().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::dom_tree::{append_child, element, element_with};
    use pretty_assertions::assert_eq;

    fn form_with(controls: &[NodeRef]) -> Form {
        let root = element_with("form", &[("data-action", "/submit.json")]);
        for control in controls {
            append_child(&root, control);
        }
        Form::new(root, Vec::new())
    }

    #[test]
    fn radios_in_a_group_are_exclusive() {
        let small = element_with("input", &[("type", "radio"), ("name", "size"), ("id", "s"), ("value", "small")]);
        let large = element_with(
            "input",
            &[("type", "radio"), ("name", "size"), ("id", "l"), ("value", "large"), ("checked", "")],
        );
        let other = element_with("input", &[("type", "radio"), ("name", "color"), ("id", "c"), ("checked", "")]);
        let form = form_with(&[small.clone(), large.clone(), other.clone()]);

        assert!(form.click_id("s"));
        assert!(dom_tree::has_attr(&small, "checked"));
        assert!(!dom_tree::has_attr(&large, "checked"));
        assert!(dom_tree::has_attr(&other, "checked"));
        assert!(!form.click_id("missing"));
    }

    #[test]
    fn required_controls_block_validity() {
        let email = element_with("input", &[("type", "email"), ("name", "email"), ("id", "email"), ("required", "")]);
        let terms = element_with("input", &[("type", "checkbox"), ("name", "terms"), ("id", "terms"), ("required", "")]);
        let form = form_with(&[email.clone(), terms.clone()]);

        assert!(Rc::ptr_eq(&form.first_invalid().unwrap(), &email));
        form.input("email", "jane@example.com");
        assert!(Rc::ptr_eq(&form.first_invalid().unwrap(), &terms));
        form.click_id("terms");
        assert!(form.check_validity());
    }

    #[test]
    fn disabled_and_fieldset_controls_are_skipped() {
        let fieldset = element_with("fieldset", &[("name", "person"), ("required", "")]);
        let disabled = element_with("input", &[("name", "city"), ("required", ""), ("disabled", "")]);
        let notes = element_with("textarea", &[("name", "notes")]);
        let form = form_with(&[fieldset, disabled, notes]);

        assert_eq!(form.elements().len(), 3);
        assert!(form.check_validity());
    }

    #[test]
    fn required_select_needs_an_enabled_option() {
        let select = element_with("select", &[("name", "color"), ("id", "color"), ("required", "")]);
        let placeholder = element_with("option", &[("value", ""), ("disabled", "")]);
        append_child(&select, &placeholder);
        let form = form_with(&[select.clone()]);
        assert!(!form.check_validity());

        let red = element_with("option", &[("value", "red")]);
        append_child(&select, &red);
        assert!(form.check_validity());
    }

    #[test]
    fn submitting_flag_lives_on_the_form() {
        let button = element_with("button", &[("type", "submit")]);
        let form = form_with(&[element("div"), button.clone()]);

        assert!(!form.is_submitting());
        form.set_submitting(true);
        assert!(form.is_submitting());
        assert_eq!(
            dom_tree::get_attr(form.root(), "data-submitting").as_deref(),
            Some("true")
        );
        assert!(Rc::ptr_eq(&form.submit_button().unwrap(), &button));
        assert_eq!(form.action(), "/submit.json");
        assert_eq!(form.confirmation(), None);
    }
}
