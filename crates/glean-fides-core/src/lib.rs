pub mod batch;
pub mod category;
pub mod classifier;
pub mod config;
pub mod error;
mod http;
pub mod llm;
pub mod metric;
pub mod prompt;
pub mod report;

pub use batch::{normalize_description, BatchRunner, ClassificationResult};
pub use category::{
    extract_simplified_categories, Category, CategorySnapshot, CategoryStats, FidesClient,
};
pub use classifier::{Classifier, ClassifierSettings};
pub use config::Config;
pub use error::{GleanFidesError, Result};
pub use llm::{check_claude_cli, ClaudeCliGenerator, LlmProvider, TextGenerator, VertexGenerator};
pub use metric::{AppInfo, Metric, MetricProvider, MetricSet, ProbeInfoClient, SensitivityStats};
pub use prompt::{FewShotExample, PromptBuilder, PromptMode, NO_CATEGORY};
pub use report::{QuoteStyle, ReportWriter};
