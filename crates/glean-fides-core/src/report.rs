//! CSV-style report of classification results.
//!
//! Layout: a `category,name,description` header, then one
//! `category,name,"description"` line per result. The destination is
//! always overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::batch::ClassificationResult;
use crate::error::Result;

pub const DEFAULT_REPORT_FILE: &str = "categorized_metrics.csv";

const HEADER: &str = "category,name,description";

/// How the description column is quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteStyle {
    /// Wrap in double quotes, embedded quotes are left as-is
    #[default]
    Raw,
    /// Wrap in double quotes and double embedded quotes (RFC 4180)
    Escaped,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
    style: QuoteStyle,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            style: QuoteStyle::default(),
        }
    }

    pub fn with_style(mut self, style: QuoteStyle) -> Self {
        self.style = style;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, results: &[ClassificationResult]) -> String {
        let mut out = String::with_capacity(HEADER.len() + 1 + results.len() * 64);
        out.push_str(HEADER);
        out.push('\n');
        for result in results {
            out.push_str(&result.category_key);
            out.push(',');
            out.push_str(&result.metric_name);
            out.push_str(",\"");
            match self.style {
                QuoteStyle::Raw => out.push_str(&result.description),
                QuoteStyle::Escaped => out.push_str(&result.description.replace('"', "\"\"")),
            }
            out.push_str("\"\n");
        }
        out
    }

    pub fn write(&self, results: &[ClassificationResult]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, self.render(results))?;
        log::debug!(
            "Wrote {} rows to {}",
            results.len(),
            self.path.display()
        );
        Ok(())
    }
}
