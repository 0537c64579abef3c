//! # column-press – markup → multi-column PDF pipeline
//!
//! This crate turns a small HTML-like markup vocabulary into a paginated,
//! two-column PDF. The pipeline stages are:
//!
//! 1. **Tokenize** – split markup into text and tag events ([`tokenizer`])
//! 2. **Build** – track nested styles and assemble paragraphs, lists and
//!    anchors ([`style`], [`document`])
//! 3. **Flow** – pour the elements through the page's column regions,
//!    stamping footers and turning pages ([`column`], [`flow`], [`page`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! The intermediate [`layout_config::LayoutConfig`] can be serialised to JSON
//! and rendered later. A C-compatible FFI surface is exposed via the [`ffi`]
//! module.

pub mod column;
pub mod config;
pub mod document;
pub mod error;
pub mod ffi;
pub mod flow;
pub mod fonts;
pub mod layout_config;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod templates;
pub mod tokenizer;

// Re-exports for convenience
pub use config::DocumentConfig;
pub use document::{build_document, DocumentStyle, Element};
pub use error::{Error, Result};
pub use pipeline::{compute_layout, generate_pdf, generate_pdf_from_json, PipelineConfig};
