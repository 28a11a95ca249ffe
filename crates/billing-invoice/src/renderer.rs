//! Invoice document generation.
//!
//! The filled template is written next to the final document, typeset by a
//! [`DocumentRenderer`], and every by-product sharing the invoice's file
//! stem is removed afterwards.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use billing_core::error::{BillingError, Result};
use billing_core::models::InvoiceParams;
use tracing::{debug, info, warn};

use crate::template::{fill_template, invoice_stem};

/// Default typesetter program.
pub const DEFAULT_LATEX_PROGRAM: &str = "pdflatex";

/// Turns a source document into a PDF.
pub trait DocumentRenderer {
    /// Typeset `source` into `output_dir` and return the expected PDF path.
    fn render(&self, source: &Path, output_dir: &Path) -> Result<PathBuf>;
}

// ── pdflatex ──────────────────────────────────────────────────────────────────

/// Renders through an external LaTeX program run in non-interactive mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLatex {
    program: String,
}

impl PdfLatex {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for PdfLatex {
    fn default() -> Self {
        Self::new(DEFAULT_LATEX_PROGRAM)
    }
}

impl DocumentRenderer for PdfLatex {
    fn render(&self, source: &Path, output_dir: &Path) -> Result<PathBuf> {
        debug!("Running {} on {}", self.program, source.display());

        let output = Command::new(&self.program)
            .arg("-output-directory")
            .arg(output_dir)
            .arg("-interaction=nonstopmode")
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BillingError::ProcessSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            warn!(
                "{} exited with {} while rendering {}",
                self.program,
                output.status,
                source.display()
            );
            debug!("{}", String::from_utf8_lossy(&output.stdout));
        }

        let pdf = pdf_path(source, output_dir);
        if !pdf.exists() {
            warn!("{} did not produce {}", self.program, pdf.display());
        }
        Ok(pdf)
    }
}

// ── Generator ─────────────────────────────────────────────────────────────────

/// Fills the invoice template and renders it.
#[derive(Debug, Clone, Default)]
pub struct InvoiceGenerator<R> {
    renderer: R,
}

impl<R: DocumentRenderer> InvoiceGenerator<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Produce the invoice PDF for `params` in `output_dir`.
    ///
    /// Returns the path of the PDF, which the renderer may have failed to
    /// produce; only a renderer that could not run at all is an error.
    pub fn generate(
        &self,
        template_path: &Path,
        params: &InvoiceParams,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let template =
            std::fs::read_to_string(template_path).map_err(|source| BillingError::FileRead {
                path: template_path.to_path_buf(),
                source,
            })?;

        let stem = invoice_stem(params.month);
        let tex_path = output_dir.join(format!("{stem}.tex"));
        std::fs::write(&tex_path, fill_template(&template, params)).map_err(|source| {
            BillingError::FileWrite {
                path: tex_path.clone(),
                source,
            }
        })?;

        let pdf = self.renderer.render(&tex_path, output_dir)?;

        let removed = cleanup_intermediates(output_dir, &stem)?;
        debug!("Removed {} intermediate files", removed);

        info!("Invoice for {} written to {}", params.month, pdf.display());
        Ok(pdf)
    }
}

/// Delete every file in `dir` whose stem is `stem`, except the PDF.
///
/// Returns the number of files removed.
pub fn cleanup_intermediates(dir: &Path, stem: &str) -> Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.file_stem().and_then(|s| s.to_str()) != Some(stem) {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) == Some("pdf") {
            continue;
        }
        std::fs::remove_file(&path)?;
        removed += 1;
    }
    Ok(removed)
}

fn pdf_path(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".pdf");
    output_dir.join(name)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
