use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dom::dom_tree;
use crate::events::{control_value, input_type};
use crate::form::Form;

/// Field name → value, in the order fields first appear in the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    entries: Vec<(String, String)>,
}

impl Payload {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `name`, keeping its original position when already present.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// Adds `value` to `name`, comma-joined with what is already there.
    pub fn append_joined(&mut self, name: &str, value: &str) {
        let joined = match self.get(name) {
            Some(existing) => format!("{},{}", existing, value),
            None => value.to_string(),
        };
        self.insert(name, &joined);
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Reads the live state of every named, enabled control.
///
/// Radios contribute only when checked; checked checkboxes sharing a name
/// are comma-joined in DOM order. Submit buttons and fieldsets are skipped.
pub fn generate_payload(form: &Form) -> Payload {
    let mut payload = Payload::default();

    for field in form.elements() {
        let name = dom_tree::get_attr(&field, "name").unwrap_or_default();
        if name.is_empty() || dom_tree::has_attr(&field, "disabled") {
            continue;
        }
        match dom_tree::tag_name(&field).as_deref() {
            Some("fieldset") => continue,
            Some("button") if input_type(&field) == "submit" => continue,
            _ => {}
        }

        let checked = dom_tree::has_attr(&field, "checked");
        match input_type(&field).as_str() {
            "submit" => {}
            "radio" => {
                if checked {
                    payload.insert(&name, &control_value(&field));
                }
            }
            "checkbox" => {
                if checked {
                    payload.append_joined(&name, &control_value(&field));
                }
            }
            _ => payload.insert(&name, &control_value(&field)),
        }
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joined_values_keep_first_position() {
        let mut payload = Payload::default();
        payload.append_joined("topics", "news");
        payload.insert("email", "a@b.com");
        payload.append_joined("topics", "offers");

        assert_eq!(
            payload.entries(),
            &[
                ("topics".to_string(), "news,offers".to_string()),
                ("email".to_string(), "a@b.com".to_string()),
            ]
        );
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"topics":"news,offers","email":"a@b.com"}"#
        );
    }
}
