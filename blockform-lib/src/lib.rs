//! Renders schema-driven forms and marketing blocks for a content-managed site.
//!
//! Authored block markup is parsed with html5ever into the `dom` tree, a
//! decorator from `blocks` turns it into its final DOM, and `submission`
//! sends a built form back to the site.

pub mod blocks;
pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod fetch;
pub mod field_factory;
pub mod form;
pub mod form_builder;
pub mod ids;
pub mod parser;
pub mod payload;
pub mod pdf;
pub mod schema;
pub mod submission;
pub mod validation;

pub use config::{FormConfig, SubmitMethod};
pub use error::{FormError, Result};
