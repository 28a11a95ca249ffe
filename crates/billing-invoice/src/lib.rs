//! Invoice generation.
//!
//! Fills the invoice template with a month's figures and hands the result to
//! a [`DocumentRenderer`] to typeset it.

pub mod renderer;
pub mod template;

pub use renderer::{cleanup_intermediates, DocumentRenderer, InvoiceGenerator, PdfLatex};
pub use template::{fill_template, invoice_stem, Placeholder};
