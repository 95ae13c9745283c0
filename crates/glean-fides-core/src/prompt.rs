//! Prompt Builder
//!
//! カテゴリ一覧と単一メトリクスから分類プロンプトを組み立てる。
//!
//! `PromptMode::FewShot`では固定の例示（メトリクス → fides_key）を挿入し、
//! 出力形式と紛らわしいカテゴリの区別を誘導する。例示は設定値として
//! 構築時に渡され、同じ入力に対して常に同一のプロンプトを生成する。
//!
//! ```rust
//! use glean_fides_core::category::Category;
//! use glean_fides_core::metric::Metric;
//! use glean_fides_core::prompt::{default_examples, PromptBuilder, PromptMode};
//!
//! let builder = PromptBuilder::new(default_examples());
//! let categories = vec![Category::new("user.behavior", "Behavioral data")];
//! let metric = Metric::new("page.load", "event").with_description("Page finished loading");
//!
//! let prompt = builder.build(&categories, &metric, PromptMode::FewShot);
//! assert!(prompt.contains("user.behavior"));
//! assert!(prompt.contains("page.load"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::category::Category;
use crate::error::{GleanFidesError, Result};
use crate::metric::Metric;

/// 該当カテゴリなしを示すセンチネル値
pub const NO_CATEGORY: &str = "N/A";

/// プロンプトモード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptMode {
    /// 指示のみ
    #[default]
    Plain,
    /// 例示付き
    FewShot,
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::FewShot => write!(f, "few-shot"),
        }
    }
}

impl FromStr for PromptMode {
    type Err = GleanFidesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "few-shot" | "few_shot" | "fewshot" => Ok(Self::FewShot),
            other => Err(GleanFidesError::ConfigValue {
                key: "classifier.mode".to_string(),
                message: format!("expected 'plain' or 'few-shot', got '{}'", other),
            }),
        }
    }
}

/// 例示（メトリクスと正解カテゴリの組）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub metric: Metric,
    pub category_key: String,
}

impl FewShotExample {
    pub fn new(metric: Metric, category_key: impl Into<String>) -> Self {
        Self {
            metric,
            category_key: category_key.into(),
        }
    }
}

/// ビルトイン例示
///
/// event / behavior / authorization の取り違えが起きやすい組み合わせと、
/// `N/A`の例を含む。
pub fn default_examples() -> Vec<FewShotExample> {
    vec![
        FewShotExample::new(
            Metric::new("events.page_load", "event")
                .with_description("Recorded when a web page finishes loading in a tab.")
                .with_sensitivity(["interaction"]),
            "user.behavior.browsing_history",
        ),
        FewShotExample::new(
            Metric::new("logins.password_saved", "event")
                .with_description("Recorded when the user saves a login and password.")
                .with_sensitivity(["interaction"]),
            "user.authorization.credentials",
        ),
        FewShotExample::new(
            Metric::new("search.default_engine", "string")
                .with_description("The identifier of the user's default search engine.")
                .with_sensitivity(["interaction"]),
            "user.behavior.search_history",
        ),
        FewShotExample::new(
            Metric::new("performance.startup_time", "timing_distribution")
                .with_description("Time from process start until the first window is painted.")
                .with_sensitivity(["technical"]),
            "system.operations",
        ),
        FewShotExample::new(
            Metric::new("testing.only.counter", "counter")
                .with_description("A counter incremented only by automated tests.")
                .with_sensitivity(["technical"]),
            NO_CATEGORY,
        ),
    ]
}

const INTRODUCTION: &str = "\
You are given a list of Fides data categories in JSON format. Each category has a \
\"fides_key\" and a \"description\". You are also given a single Glean telemetry metric \
in JSON format. Determine the single best Fides category for that metric, based on its \
name, type, description and data sensitivity. If several categories could apply, choose \
the most specific or most directly relevant one. If no category fits at all, the answer \
is \"N/A\".

Pay attention to the metric type: a metric of type `event` records that something \
happened, so classify it by what the event reveals about the user or the system.";

const RESPONSE_INSTRUCTION: &str = "\
Respond with exactly one fides_key from the list of categories, or N/A if no category \
fits. Output only that value as plain text, with no quotes, commentary or explanation.";

/// 分類プロンプトのビルダー
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    examples: Vec<FewShotExample>,
}

impl PromptBuilder {
    pub fn new(examples: Vec<FewShotExample>) -> Self {
        Self { examples }
    }

    pub fn examples(&self) -> &[FewShotExample] {
        &self.examples
    }

    /// プロンプトを生成
    ///
    /// カテゴリが空でもプロンプトは生成される（`[]`として埋め込まれる）。
    pub fn build(&self, categories: &[Category], metric: &Metric, mode: PromptMode) -> String {
        let mut prompt = String::new();
        prompt.push_str(INTRODUCTION);
        prompt.push_str("\n\nList of categories:\n");
        prompt.push_str(&render_categories(categories));

        if mode == PromptMode::FewShot && !self.examples.is_empty() {
            prompt.push_str("\n\nExamples of classified metrics:\n");
            for example in &self.examples {
                prompt.push_str("\nMetric:\n");
                prompt.push_str(&render_metric(&example.metric));
                prompt.push_str("\nAnswer: ");
                prompt.push_str(&example.category_key);
                prompt.push('\n');
            }
        }

        prompt.push_str("\n\nMetric to classify:\n");
        prompt.push_str(&render_metric(metric));
        prompt.push_str("\n\n");
        prompt.push_str(RESPONSE_INSTRUCTION);
        prompt.push('\n');
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(default_examples())
    }
}

fn render_categories(categories: &[Category]) -> String {
    let list: Vec<Value> = categories
        .iter()
        .map(|c| json!({"fides_key": c.fides_key, "description": c.description}))
        .collect();
    format!("{:#}", Value::Array(list))
}

fn render_metric(metric: &Metric) -> String {
    let value = json!({
        "name": metric.name,
        "type": metric.metric_type,
        "description": metric.description,
        "data_sensitivity": metric.data_sensitivity,
    });
    format!("{:#}", value)
}
