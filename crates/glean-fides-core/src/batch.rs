//! Batch Runner
//!
//! Classifies every metric of one application in order, one generation call
//! at a time. Any failure aborts the whole run: nothing accumulated so far is
//! returned or written.

use serde::{Deserialize, Serialize};

use crate::category::{Category, CategorySnapshot};
use crate::classifier::Classifier;
use crate::error::Result;
use crate::llm::TextGenerator;
use crate::metric::{MetricProvider, MetricSet};
use crate::prompt::PromptMode;
use crate::report::ReportWriter;

/// One classified metric, as written to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub metric_name: String,
    pub description: String,
    pub category_key: String,
}

/// Strip line breaks so the description fits on one report line.
///
/// An absent description becomes an empty string.
pub fn normalize_description(description: Option<&str>) -> String {
    description
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect()
}

pub struct BatchRunner<'a, G> {
    classifier: &'a Classifier<G>,
    metrics: &'a dyn MetricProvider,
    snapshot: CategorySnapshot,
}

impl<'a, G: TextGenerator> BatchRunner<'a, G> {
    pub fn new(
        classifier: &'a Classifier<G>,
        metrics: &'a dyn MetricProvider,
        snapshot: CategorySnapshot,
    ) -> Self {
        Self {
            classifier,
            metrics,
            snapshot,
        }
    }

    /// Load the category snapshot, fetch `app_name`'s metrics and classify them.
    ///
    /// `on_result` sees each result as soon as it is produced.
    pub fn run<F>(
        &self,
        app_name: &str,
        mode: PromptMode,
        on_result: F,
    ) -> Result<Vec<ClassificationResult>>
    where
        F: FnMut(&ClassificationResult),
    {
        let categories = self.snapshot.load()?;
        let metrics = self.metrics.fetch_metrics(app_name)?;
        log::info!(
            "Classifying {} metrics of {} against {} categories ({} mode)",
            metrics.len(),
            app_name,
            categories.len(),
            mode
        );
        self.classify_all(&categories, &metrics, mode, on_result)
    }

    /// Run the batch and write the report only once every metric succeeded.
    pub fn run_to_report<F>(
        &self,
        app_name: &str,
        mode: PromptMode,
        writer: &ReportWriter,
        on_result: F,
    ) -> Result<Vec<ClassificationResult>>
    where
        F: FnMut(&ClassificationResult),
    {
        let results = self.run(app_name, mode, on_result)?;
        writer.write(&results)?;
        Ok(results)
    }

    pub fn classify_all<F>(
        &self,
        categories: &[Category],
        metrics: &MetricSet,
        mode: PromptMode,
        mut on_result: F,
    ) -> Result<Vec<ClassificationResult>>
    where
        F: FnMut(&ClassificationResult),
    {
        let mut results = Vec::with_capacity(metrics.len());

        for metric in metrics {
            let description = normalize_description(metric.description.as_deref());
            let category_key = self
                .classifier
                .classify(categories, metric, mode)
                .map_err(|e| {
                    log::error!("Classification of {} failed: {}", metric.name, e);
                    e
                })?;

            let result = ClassificationResult {
                metric_name: metric.name.clone(),
                description,
                category_key,
            };
            log::info!("{} -> {}", result.metric_name, result.category_key);
            on_result(&result);
            results.push(result);
        }

        Ok(results)
    }
}
