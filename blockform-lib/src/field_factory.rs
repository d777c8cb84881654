//! Builds the DOM for one schema row.
//!
//! Building happens in two steps. `prepare` runs synchronously in schema
//! order and hands out every id the field needs, so ids never depend on how
//! fast remote option sheets answer. `render` then constructs the subtree,
//! fetching select options when the row points at a sheet.

use crate::config::FormConfig;
use crate::dom::dom_tree::{self, NodeRef};
use crate::error::Result;
use crate::events::{Behavior, EventKind, Listener};
use crate::fetch::{self, Fetcher};
use crate::ids::IdAllocator;
use crate::schema::{FieldDescriptor, OptionRow, Sheet};

/// Every field type the factory knows. Unknown types render as `Input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    Heading,
    Plaintext,
    TextArea,
    Toggle,
    Submit,
    Confirmation,
    Fieldset,
    Checkbox,
    Radio,
    Input,
}

impl FieldKind {
    pub fn from_type(field_type: &str) -> Self {
        match field_type.to_lowercase().as_str() {
            "select" => FieldKind::Select,
            "heading" => FieldKind::Heading,
            "plaintext" => FieldKind::Plaintext,
            "text-area" => FieldKind::TextArea,
            "toggle" => FieldKind::Toggle,
            "submit" => FieldKind::Submit,
            "confirmation" => FieldKind::Confirmation,
            "fieldset" => FieldKind::Fieldset,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            _ => FieldKind::Input,
        }
    }

    fn has_label(self) -> bool {
        matches!(
            self,
            FieldKind::Select
                | FieldKind::TextArea
                | FieldKind::Toggle
                | FieldKind::Checkbox
                | FieldKind::Radio
                | FieldKind::Input
        )
    }
}

/// A descriptor with all of its ids settled.
#[derive(Debug, Clone)]
pub struct PreparedField {
    pub descriptor: FieldDescriptor,
    pub kind: FieldKind,
    pub label_id: Option<String>,
    /// Radio options as (label text, value, id), in sheet order.
    pub radio_options: Vec<(String, String, String)>,
}

impl PreparedField {
    fn id(&self) -> &str {
        self.descriptor.id().unwrap_or_default()
    }
}

/// Assigns the field id (unless the sheet gives one), the label id and the
/// ids of radio options.
pub fn prepare(mut descriptor: FieldDescriptor, ids: &mut IdAllocator) -> PreparedField {
    if descriptor.id().is_none() {
        descriptor.id = Some(ids.generate(&descriptor, ""));
    }
    let kind = FieldKind::from_type(descriptor.field_type());

    let label_id = kind
        .has_label()
        .then(|| ids.generate(&descriptor, "-label"));

    let mut radio_options = Vec::new();
    if kind == FieldKind::Radio {
        for option in split_options(descriptor.options().unwrap_or_default()) {
            let value = option.to_lowercase();
            let id = ids.generate(&descriptor, &format!("-{}", value));
            radio_options.push((option, value, id));
        }
    }

    PreparedField {
        descriptor,
        kind,
        label_id,
        radio_options,
    }
}

fn split_options(options: &str) -> Vec<String> {
    if options.is_empty() {
        return Vec::new();
    }
    options.split(',').map(|o| o.trim().to_string()).collect()
}

/// The wrapper of a rendered field plus the listeners wired into it.
#[derive(Debug, Clone)]
pub struct RenderedField {
    pub wrapper: NodeRef,
    pub listeners: Vec<Listener>,
}

impl RenderedField {
    fn plain(wrapper: NodeRef) -> Self {
        RenderedField {
            wrapper,
            listeners: Vec::new(),
        }
    }
}

/// What `render` needs from the form being assembled.
pub struct RenderContext<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub config: &'a FormConfig,
    /// The owning form; `confirmation` rows write to it.
    pub form: &'a NodeRef,
}

pub const OPTIONS_UNAVAILABLE: &str = "Options could not be loaded.";

/// Text shown for an option row that names no option.
const MISSING_OPTION: &str = "none";

const DOWNLOAD_ICON_PATH: &str = "M10 2a1 1 0 0 1 1 1v8.586l2.293-2.293a1 1 0 1 1 1.414 1.414l-4 4a1 1 0 0 1-1.414 0l-4-4a1 1 0 1 1 1.414-1.414L9 11.586V3a1 1 0 0 1 1-1zm-7 13a1 1 0 0 1 1-1h12a1 1 0 1 1 0 2H4a1 1 0 0 1-1-1z";

/// Renders a prepared field. `None` means the row produces no DOM.
pub async fn render(field: &PreparedField, ctx: &RenderContext<'_>) -> Result<Option<RenderedField>> {
    log::debug!("building {:?} field {}", field.kind, field.id());
    let rendered = match field.kind {
        FieldKind::Select => Some(create_select(field, ctx).await),
        FieldKind::Heading => Some(create_heading(field)),
        FieldKind::Plaintext => Some(create_plaintext(field)),
        FieldKind::TextArea => Some(create_text_area(field)),
        FieldKind::Toggle => Some(create_toggle(field, ctx.config)),
        FieldKind::Submit => Some(create_submit(field)),
        FieldKind::Confirmation => {
            create_confirmation(field, ctx.form)?;
            None
        }
        FieldKind::Fieldset => Some(create_fieldset(field)),
        FieldKind::Checkbox => Some(create_checkbox(field)),
        FieldKind::Radio => create_radio(field),
        FieldKind::Input => Some(create_input(field, ctx.config)),
    };
    Ok(rendered)
}

fn create_field_wrapper(fd: &FieldDescriptor) -> NodeRef {
    let classes = format!(
        "field-wrapper {}-wrapper {}-column-wrapper",
        fd.field_type(),
        fd.style().unwrap_or("col1")
    );
    let wrapper = dom_tree::element_with("div", &[("class", classes.as_str())]);
    if let Some(fieldset) = fd.fieldset() {
        dom_tree::set_attr(&wrapper, "data-fieldset", fieldset);
    }
    wrapper
}

fn create_label(field: &PreparedField) -> NodeRef {
    let fd = &field.descriptor;
    let label = dom_tree::element("label");
    if let Some(label_id) = &field.label_id {
        dom_tree::set_attr(&label, "id", label_id);
    }
    dom_tree::set_attr(&label, "for", field.id());
    let mut text = fd.label_text().to_string();
    if fd.is_required() {
        dom_tree::set_attr(&label, "data-required", "true");
        text.push('*');
    }
    dom_tree::set_text_content(&label, &text);
    label
}

/// Which DOM interface receives the shared attributes; only reflected
/// attributes end up in markup.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Control {
    Input,
    TextArea,
    Select,
    Fieldset,
}

fn set_common_attributes(node: &NodeRef, field: &PreparedField, control: Control) {
    let fd = &field.descriptor;
    dom_tree::set_attr(node, "id", field.id());
    dom_tree::set_attr(node, "name", fd.name());
    if control == Control::Fieldset {
        return;
    }
    if fd.is_required() {
        dom_tree::set_attr(node, "required", "");
    }
    if control != Control::Select {
        if let Some(placeholder) = fd.placeholder() {
            dom_tree::set_attr(node, "placeholder", placeholder);
        }
        if let Some(max_length) = fd.max_length() {
            dom_tree::set_attr(node, "maxlength", &max_length.to_string());
        }
    }
    match (control, fd.value()) {
        (Control::TextArea, Some(value)) => dom_tree::set_text_content(node, value),
        (Control::Input, Some(value)) => dom_tree::set_attr(node, "value", value),
        _ => {}
    }
    dom_tree::set_attr(node, "autocomplete", fd.autocomplete());
}

fn labelled_by(field_node: &NodeRef, label: &NodeRef) {
    if let Some(label_id) = dom_tree::get_attr(label, "id") {
        dom_tree::set_attr(field_node, "aria-labelledby", &label_id);
    }
}

fn create_heading(field: &PreparedField) -> RenderedField {
    let fd = &field.descriptor;
    let wrapper = create_field_wrapper(fd);
    let level = if fd.style().map(|s| s.contains("sub-heading")).unwrap_or(false) {
        "h3"
    } else {
        "h2"
    };
    let heading = dom_tree::element_with(level, &[("id", field.id())]);
    dom_tree::set_text_content(&heading, fd.value().or(fd.label()).unwrap_or_default());
    dom_tree::append_child(&wrapper, &heading);
    RenderedField::plain(wrapper)
}

fn create_plaintext(field: &PreparedField) -> RenderedField {
    let fd = &field.descriptor;
    let wrapper = create_field_wrapper(fd);
    let text = dom_tree::element_with("p", &[("id", field.id())]);
    dom_tree::set_text_content(&text, fd.value().or(fd.label()).unwrap_or_default());
    dom_tree::append_child(&wrapper, &text);
    RenderedField::plain(wrapper)
}

fn add_option(select: &NodeRef, text: &str, value: &str) -> NodeRef {
    let option = dom_tree::element_with("option", &[("value", value.trim())]);
    dom_tree::set_text_content(&option, text.trim());
    dom_tree::append_child(select, &option);
    option
}

/// Options listed by the row: inline `a, b, c` or a sheet behind a path/URL.
async fn load_options(options: &str, fetcher: &dyn Fetcher) -> Result<Vec<(String, String)>> {
    let sheet_path = if options.starts_with("https://") {
        Some(fetch::same_origin_path(options)?)
    } else if options.starts_with('/') {
        Some(options.to_string())
    } else {
        None
    };

    match sheet_path {
        Some(path) => {
            let sheet: Sheet<OptionRow> = fetch::get_json(fetcher, &path).await?;
            Ok(sheet
                .data
                .into_iter()
                .map(|row| {
                    let text = row
                        .option
                        .filter(|o| !o.is_empty())
                        .unwrap_or_else(|| MISSING_OPTION.to_string());
                    let value = row
                        .value
                        .filter(|v| !v.is_empty())
                        .unwrap_or_else(|| text.clone());
                    (text, value)
                })
                .collect())
        }
        None => Ok(split_options(options)
            .into_iter()
            .map(|o| {
                let value = o.to_lowercase();
                (o, value)
            })
            .collect()),
    }
}

async fn create_select(field: &PreparedField, ctx: &RenderContext<'_>) -> RenderedField {
    let fd = &field.descriptor;
    let select = dom_tree::element("select");
    set_common_attributes(&select, field, Control::Select);

    if let Some(placeholder) = fd.placeholder() {
        let option = add_option(&select, placeholder, "");
        dom_tree::set_attr(&option, "disabled", "");
    }

    let wrapper = create_field_wrapper(fd);
    let mut options_failed = false;
    if let Some(options) = fd.options() {
        match load_options(options, ctx.fetcher).await {
            Ok(options) => {
                for (text, value) in options {
                    add_option(&select, &text, &value);
                }
            }
            Err(e) => {
                log::warn!("options for {} could not be loaded: {}", field.id(), e);
                options_failed = true;
            }
        }
    }

    dom_tree::append_child(&wrapper, &select);
    dom_tree::prepend_child(&wrapper, &create_label(field));
    if options_failed {
        dom_tree::set_attr(&select, "data-options-error", "true");
        crate::events::append_error(&wrapper, &select, OPTIONS_UNAVAILABLE);
    }

    let listeners = vec![Listener::new(
        &select,
        EventKind::Change,
        &wrapper,
        Behavior::SyncSelected,
    )];
    RenderedField { wrapper, listeners }
}

fn create_confirmation(field: &PreparedField, form: &NodeRef) -> Result<()> {
    let target = field.descriptor.value().unwrap_or_default();
    let path = fetch::url_path(target)?;
    dom_tree::set_attr(form, "data-confirmation", &path);
    Ok(())
}

fn create_submit(field: &PreparedField) -> RenderedField {
    let fd = &field.descriptor;
    let button = dom_tree::element_with("button", &[("class", "button"), ("type", "submit")]);
    dom_tree::set_text_content(&button, fd.label_text());

    let icon = dom_tree::element_with("span", &[("class", "download-icon")]);
    let svg = dom_tree::element_with(
        "svg",
        &[
            ("width", "20"),
            ("height", "20"),
            ("fill", "currentColor"),
            ("viewBox", "0 0 20 20"),
            ("aria-hidden", "true"),
        ],
    );
    let path = dom_tree::element_with("path", &[("d", DOWNLOAD_ICON_PATH)]);
    dom_tree::append_child(&svg, &path);
    dom_tree::append_child(&icon, &svg);
    dom_tree::append_child(&button, &icon);

    let wrapper = create_field_wrapper(fd);
    dom_tree::append_child(&wrapper, &button);
    RenderedField::plain(wrapper)
}

fn create_text_area(field: &PreparedField) -> RenderedField {
    let textarea = dom_tree::element("textarea");
    set_common_attributes(&textarea, field, Control::TextArea);

    let wrapper = create_field_wrapper(&field.descriptor);
    let label = create_label(field);
    labelled_by(&textarea, &label);
    dom_tree::append_child(&wrapper, &textarea);
    dom_tree::prepend_child(&wrapper, &label);
    RenderedField::plain(wrapper)
}

/// Generic `<input type=...>` plus the listeners its type calls for.
fn create_input(field: &PreparedField, config: &FormConfig) -> RenderedField {
    let fd = &field.descriptor;
    let input = dom_tree::element_with("input", &[("type", fd.field_type())]);
    set_common_attributes(&input, field, Control::Input);

    let wrapper = create_field_wrapper(fd);
    let label = create_label(field);
    labelled_by(&input, &label);
    dom_tree::append_child(&wrapper, &input);
    dom_tree::prepend_child(&wrapper, &label);

    let mut listeners = Vec::new();
    let field_type = fd.field_type().to_lowercase();
    match field_type.as_str() {
        "email" => {
            listeners.push(Listener::new(&input, EventKind::Input, &wrapper, Behavior::EmailFormat));
            if field.id() == config.confirm_email_id {
                listeners.push(Listener::new(
                    &input,
                    EventKind::Input,
                    &wrapper,
                    Behavior::EmailMatch {
                        primary_name: config.primary_email_name.clone(),
                    },
                ));
            }
        }
        "number" => {
            if let Some(max_length) = fd.max_length() {
                listeners.push(Listener::new(
                    &input,
                    EventKind::Input,
                    &wrapper,
                    Behavior::TruncateDigits(max_length),
                ));
            }
        }
        "date" => listeners.push(Listener::new(
            &input,
            EventKind::Change,
            &wrapper,
            Behavior::MinimumAge(config.minimum_age),
        )),
        _ => {}
    }

    RenderedField { wrapper, listeners }
}

fn create_fieldset(field: &PreparedField) -> RenderedField {
    let fieldset = dom_tree::element("fieldset");
    set_common_attributes(&fieldset, field, Control::Fieldset);
    if let Some(label) = field.descriptor.label() {
        let legend = dom_tree::element("legend");
        dom_tree::set_text_content(&legend, label);
        dom_tree::append_child(&fieldset, &legend);
    }

    let wrapper = create_field_wrapper(&field.descriptor);
    dom_tree::append_child(&wrapper, &fieldset);
    RenderedField::plain(wrapper)
}

/// An input turned into a checkbox behind a clickable slider.
fn create_toggle(field: &PreparedField, config: &FormConfig) -> RenderedField {
    let RenderedField { wrapper, mut listeners } = create_input(field, config);
    let Some(checkbox) = dom_tree::find_first(&wrapper, |e| e.tag == "input") else {
        return RenderedField { wrapper, listeners };
    };
    dom_tree::set_attr(&checkbox, "type", "checkbox");
    if dom_tree::get_attr(&checkbox, "value").unwrap_or_default().is_empty() {
        dom_tree::set_attr(&checkbox, "value", "on");
    }
    dom_tree::add_class(&checkbox, "toggle");
    dom_tree::add_class(&wrapper, "selection-wrapper");

    let switch = dom_tree::element_with("div", &[("class", "switch")]);
    dom_tree::append_child(&switch, &checkbox);
    dom_tree::append_child(&wrapper, &switch);

    let slider = dom_tree::element_with("span", &[("class", "slider")]);
    dom_tree::append_child(&switch, &slider);
    listeners.push(Listener::new(
        &slider,
        EventKind::Click,
        &wrapper,
        Behavior::ToggleSlider { checkbox },
    ));

    RenderedField { wrapper, listeners }
}

fn create_checkbox(field: &PreparedField) -> RenderedField {
    let checkbox = dom_tree::element_with("input", &[("type", "checkbox")]);
    set_common_attributes(&checkbox, field, Control::Input);

    let option_wrapper = dom_tree::element_with("fieldset", &[("class", "checkbox-option")]);
    let wrapper = create_field_wrapper(&field.descriptor);
    let label = create_label(field);
    labelled_by(&checkbox, &label);

    dom_tree::append_child(&option_wrapper, &checkbox);
    dom_tree::append_child(&option_wrapper, &label);
    dom_tree::append_child(&wrapper, &option_wrapper);
    RenderedField::plain(wrapper)
}

/// A labelled group of radios. Rows without options render nothing.
fn create_radio(field: &PreparedField) -> Option<RenderedField> {
    let fd = &field.descriptor;
    if field.radio_options.is_empty() {
        log::warn!("radio field {} has no options, skipping", field.id());
        return None;
    }

    let wrapper = create_field_wrapper(fd);
    dom_tree::append_child(&wrapper, &create_label(field));

    let preset = fd.value().map(str::to_lowercase);
    for (text, value, id) in &field.radio_options {
        let option_wrapper = dom_tree::element_with("fieldset", &[("class", "radio-option")]);
        let radio = dom_tree::element_with(
            "input",
            &[
                ("type", "radio"),
                ("name", fd.name()),
                ("value", value.as_str()),
                ("id", id.as_str()),
            ],
        );
        if preset.as_deref() == Some(value.as_str()) {
            dom_tree::set_attr(&radio, "checked", "");
        }
        let label = dom_tree::element_with("label", &[("for", id.as_str())]);
        dom_tree::set_text_content(&label, text);

        dom_tree::append_child(&option_wrapper, &radio);
        dom_tree::append_child(&option_wrapper, &label);
        dom_tree::append_child(&wrapper, &option_wrapper);
    }

    Some(RenderedField::plain(wrapper))
}
