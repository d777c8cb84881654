use futures::future::join_all;

use crate::config::FormConfig;
use crate::dom::dom_tree::{self, NodeRef};
use crate::error::Result;
use crate::fetch::{self, Fetcher};
use crate::field_factory::{self, RenderContext};
use crate::form::Form;
use crate::ids::IdAllocator;
use crate::parser::dom_indices::DomIndices;
use crate::schema::{FormSchema, PathMappings};

/// Assembles a `Form` from a schema sheet.
pub struct FormBuilder<'a> {
    fetcher: &'a dyn Fetcher,
    config: &'a FormConfig,
}

impl<'a> FormBuilder<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, config: &'a FormConfig) -> Self {
        FormBuilder { fetcher, config }
    }

    /// Maps an authored form path onto its JSON sheet through the site's
    /// path mapping. Paths that already end in `json` are used as-is.
    pub async fn resolve_schema_path(&self, form_href: &str) -> Result<String> {
        if form_href.ends_with("json") {
            return Ok(form_href.to_string());
        }
        let mappings: PathMappings = fetch::get_json(self.fetcher, &self.config.paths_href).await?;
        let resolved = mappings
            .resolve(form_href)
            .unwrap_or_else(|| form_href.to_string());
        log::debug!("form path {} resolved to {}", form_href, resolved);
        Ok(resolved)
    }

    /// Fetches the schema behind `form_href` and builds the form posting to
    /// `submit_href`.
    pub async fn create_form(&self, form_href: &str, submit_href: &str) -> Result<Form> {
        let schema_path = self.resolve_schema_path(form_href).await?;
        let schema: FormSchema = fetch::get_json(self.fetcher, &schema_path).await?;

        let form = dom_tree::element_with("form", &[("data-action", submit_href)]);

        let mut ids = IdAllocator::new();
        let prepared: Vec<_> = schema
            .data
            .into_iter()
            .map(|fd| field_factory::prepare(fd, &mut ids))
            .collect();

        let ctx = RenderContext {
            fetcher: self.fetcher,
            config: self.config,
            form: &form,
        };
        let rendered = join_all(prepared.iter().map(|field| field_factory::render(field, &ctx))).await;

        let mut listeners = Vec::new();
        for field in rendered {
            if let Some(field) = field? {
                dom_tree::append_child(&form, &field.wrapper);
                listeners.extend(field.listeners);
            }
        }

        group_into_fieldsets(&form);
        log::debug!(
            "built form from {} with {} controls",
            schema_path,
            dom_tree::descendants(&form).len()
        );
        Ok(Form::new(form, listeners))
    }
}

/// Moves every wrapper tagged `data-fieldset="<name>"` into the fieldset
/// named `<name>`, keeping schema order.
fn group_into_fieldsets(form: &NodeRef) {
    let indices = DomIndices::build(form);
    for fieldset in indices.by_tag("fieldset") {
        let Some(name) = dom_tree::get_attr(fieldset, "name").filter(|n| !n.is_empty()) else {
            continue;
        };
        for member in indices.fieldset_members(&name) {
            if is_inclusive_ancestor(member, fieldset) {
                log::warn!("fieldset {} cannot contain its own wrapper", name);
                continue;
            }
            dom_tree::append_child(fieldset, member);
        }
    }
}

fn is_inclusive_ancestor(candidate: &NodeRef, node: &NodeRef) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if std::rc::Rc::ptr_eq(&n, candidate) {
            return true;
        }
        current = dom_tree::parent_of(&n);
    }
    false
}
