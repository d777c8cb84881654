//! JSON documents exchanged with the site: the form schema sheet, remote
//! select options and the path mapping file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a form schema sheet. Every column is an optional string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDescriptor {
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mandatory: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub maxlength: Option<String>,
    #[serde(default)]
    pub autocomplete: Option<String>,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub fieldset: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FieldDescriptor {
    pub fn field_type(&self) -> &str {
        present(&self.r#type).unwrap_or("text")
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn label(&self) -> Option<&str> {
        present(&self.label)
    }

    pub fn placeholder(&self) -> Option<&str> {
        present(&self.placeholder)
    }

    pub fn value(&self) -> Option<&str> {
        present(&self.value)
    }

    pub fn options(&self) -> Option<&str> {
        present(&self.options)
    }

    pub fn style(&self) -> Option<&str> {
        present(&self.style)
    }

    pub fn fieldset(&self) -> Option<&str> {
        present(&self.fieldset)
    }

    pub fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    pub fn autocomplete(&self) -> &str {
        present(&self.autocomplete).unwrap_or("off")
    }

    /// `Mandatory` is `true` or `x`, case-insensitively. A missing column
    /// means optional.
    pub fn is_required(&self) -> bool {
        self.mandatory
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case("true") || m.eq_ignore_ascii_case("x"))
            .unwrap_or(false)
    }

    /// `Maxlength` as a positive count; blank or unparsable means no limit.
    pub fn max_length(&self) -> Option<usize> {
        present(&self.maxlength)
            .and_then(|m| m.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
    }

    /// Label text, falling back to the field name.
    pub fn label_text(&self) -> &str {
        self.label().unwrap_or_else(|| self.name())
    }
}

/// A sheet response: `{ "data": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Sheet<T> {
    pub data: Vec<T>,
}

pub type FormSchema = Sheet<FieldDescriptor>;

/// A row of a remote select-options sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionRow {
    #[serde(rename = "Option", default)]
    pub option: Option<String>,
    #[serde(rename = "Value", default)]
    pub value: Option<String>,
}

/// `/paths.json`: `{ "mappings": { "<key>": "<before>:<after>" } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathMappings {
    #[serde(default)]
    pub mappings: Map<String, Value>,
}

impl PathMappings {
    /// The `after` part of the first mapping, in document order, whose
    /// `before` part equals `path`.
    pub fn resolve(&self, path: &str) -> Option<String> {
        self.mappings
            .values()
            .filter_map(Value::as_str)
            .find_map(|entry| {
                let mut parts = entry.split(':');
                let before = parts.next()?;
                let after = parts.next().unwrap_or_default();
                (before == path).then(|| after.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn descriptor_reads_sheet_columns() {
        let json = r#"{"data":[{"Type":"email","Name":"email","Label":"E-mail","Mandatory":"X","Maxlength":"","Style":""}]}"#;
        let schema: FormSchema = serde_json::from_str(json).unwrap();
        let fd = &schema.data[0];

        assert_eq!(fd.field_type(), "email");
        assert!(fd.is_required());
        assert_eq!(fd.max_length(), None);
        assert_eq!(fd.style(), None);
        assert_eq!(fd.autocomplete(), "off");
    }

    #[test]
    fn missing_mandatory_is_optional() {
        let fd: FieldDescriptor = serde_json::from_str(r#"{"Name":"city"}"#).unwrap();
        assert!(!fd.is_required());
        assert_eq!(fd.label_text(), "city");
    }

    #[test]
    fn first_matching_mapping_wins() {
        let json = r#"{"mappings":{"a":"/other:/x.json","b":"/forms/contact:/forms/contact.json","c":"/forms/contact:/late.json"}}"#;
        let mappings: PathMappings = serde_json::from_str(json).unwrap();

        assert_eq!(
            mappings.resolve("/forms/contact").as_deref(),
            Some("/forms/contact.json")
        );
        assert_eq!(mappings.resolve("/missing"), None);
    }
}
