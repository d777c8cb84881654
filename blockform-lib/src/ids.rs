use std::collections::HashMap;

use crate::schema::FieldDescriptor;

/// Turns arbitrary text into a CSS class / id friendly slug.
///
/// Lower-cases, collapses every run of characters outside `[0-9a-z]` into a
/// single `-` and trims dashes from both ends.
pub fn to_class_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Hands out DOM ids that never repeat within one form build.
///
/// The first request for a slug returns it unchanged, later requests get
/// `-1`, `-2`, ... appended.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: HashMap<String, usize>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `fd` with `suffix` appended to its name before slugging.
    pub fn generate(&mut self, fd: &FieldDescriptor, suffix: &str) -> String {
        let slug = to_class_name(&format!("form-{}{}", fd.name(), suffix));
        let counter = self.counters.entry(slug.clone()).or_insert(0);
        let id = if *counter == 0 {
            slug
        } else {
            format!("{}-{}", slug, counter)
        };
        *counter += 1;
        id
    }
}
