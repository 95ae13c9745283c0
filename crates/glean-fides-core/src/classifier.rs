//! Metric Classifier
//!
//! プロンプトを生成器に渡し、単一ラベル（`fides_key`または`N/A`）を返す。
//!
//! 応答は前後の空白を除いてそのまま返す。`strict`モードでは、応答が
//! `N/A`または渡されたカテゴリのキーであることを検証する。

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{GleanFidesError, Result};
use crate::llm::TextGenerator;
use crate::metric::Metric;
use crate::prompt::{default_examples, FewShotExample, PromptBuilder, PromptMode, NO_CATEGORY};

pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash-001";
pub const DEFAULT_REGION: &str = "us-central1";

/// 分類器の設定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    pub model_id: String,
    pub project: String,
    pub region: String,
    pub examples: Vec<FewShotExample>,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            project: String::new(),
            region: DEFAULT_REGION.to_string(),
            examples: default_examples(),
        }
    }
}

/// カテゴリ分類器
pub struct Classifier<G> {
    model_id: String,
    prompts: PromptBuilder,
    generator: G,
    strict: bool,
}

impl<G: TextGenerator> Classifier<G> {
    pub fn new(settings: ClassifierSettings, generator: G) -> Self {
        Self {
            model_id: settings.model_id,
            prompts: PromptBuilder::new(settings.examples),
            generator,
            strict: false,
        }
    }

    /// 応答がカテゴリキーまたは`N/A`であることを検証する
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// メトリクスを分類してカテゴリキーを返す
    ///
    /// 生成器のエラーはそのまま伝播する（リトライなし）。
    pub fn classify(
        &self,
        categories: &[Category],
        metric: &Metric,
        mode: PromptMode,
    ) -> Result<String> {
        let prompt = self.prompts.build(categories, metric, mode);
        let response = self.generator.generate(&self.model_id, &prompt)?;
        let key = response.trim().to_string();

        if self.strict && !is_known_key(categories, &key) {
            log::warn!("Unknown category '{}' for metric {}", key, metric.name);
            return Err(GleanFidesError::InvalidResponse { response: key });
        }

        Ok(key)
    }
}

fn is_known_key(categories: &[Category], key: &str) -> bool {
    key == NO_CATEGORY || categories.iter().any(|c| c.fides_key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every call and answers with a fixed string.
    struct Recording {
        answer: String,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl Recording {
        fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for Recording {
        fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((model_id.to_string(), prompt.to_string()));
            Ok(self.answer.clone())
        }
    }

    struct Failing;

    impl TextGenerator for Failing {
        fn generate(&self, _model_id: &str, _prompt: &str) -> Result<String> {
            Err(GleanFidesError::Generation {
                message: "quota exceeded".to_string(),
            })
        }
    }

    fn categories() -> Vec<Category> {
        vec![Category::new("user.authorization", "Authorization data")]
    }

    fn metric() -> Metric {
        Metric::new("login.attempt", "event").with_description("User attempted to log in")
    }

    #[test]
    fn test_classify_trims_response_and_uses_model_id() {
        let generator = Recording::answering("  user.authorization\n");
        let settings = ClassifierSettings {
            model_id: "gemini-test".to_string(),
            ..ClassifierSettings::default()
        };
        let classifier = Classifier::new(settings, &generator);

        let key = classifier
            .classify(&categories(), &metric(), PromptMode::Plain)
            .unwrap();

        assert_eq!(key, "user.authorization");
        let calls = generator.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "gemini-test");
        assert!(calls[0].1.contains("login.attempt"));
    }

    #[test]
    fn test_non_strict_returns_unknown_keys_unmodified() {
        let generator = Recording::answering("Probably user.behavior");
        let classifier = Classifier::new(ClassifierSettings::default(), &generator);
        assert!(!classifier.is_strict());

        let key = classifier
            .classify(&categories(), &metric(), PromptMode::Plain)
            .unwrap();
        assert_eq!(key, "Probably user.behavior");
    }

    #[test]
    fn test_strict_rejects_unknown_key() {
        let generator = Recording::answering("user.behavior");
        let classifier =
            Classifier::new(ClassifierSettings::default(), &generator).with_strict(true);
        assert!(classifier.is_strict());

        let err = classifier
            .classify(&categories(), &metric(), PromptMode::Plain)
            .unwrap_err();
        assert!(matches!(
            err,
            GleanFidesError::InvalidResponse { ref response } if response == "user.behavior"
        ));
    }

    #[test]
    fn test_strict_accepts_known_key_and_sentinel() {
        for answer in ["user.authorization", "N/A\n"] {
            let generator = Recording::answering(answer);
            let classifier =
                Classifier::new(ClassifierSettings::default(), &generator).with_strict(true);
            assert!(classifier
                .classify(&categories(), &metric(), PromptMode::FewShot)
                .is_ok());
        }
    }

    #[test]
    fn test_strict_with_empty_taxonomy_only_accepts_sentinel() {
        let generator = Recording::answering("N/A");
        let classifier =
            Classifier::new(ClassifierSettings::default(), &generator).with_strict(true);
        assert_eq!(
            classifier.classify(&[], &metric(), PromptMode::Plain).unwrap(),
            "N/A"
        );
    }

    #[test]
    fn test_generation_error_propagates() {
        let classifier = Classifier::new(ClassifierSettings::default(), Failing);
        let err = classifier
            .classify(&categories(), &metric(), PromptMode::Plain)
            .unwrap_err();
        assert!(matches!(err, GleanFidesError::Generation { .. }));
    }

    #[test]
    fn test_few_shot_prompt_uses_settings_examples() {
        let generator = Recording::answering("N/A");
        let settings = ClassifierSettings {
            examples: vec![FewShotExample::new(
                Metric::new("example.only", "counter"),
                "system.operations",
            )],
            ..ClassifierSettings::default()
        };
        let classifier = Classifier::new(settings, &generator);
        classifier
            .classify(&categories(), &metric(), PromptMode::FewShot)
            .unwrap();

        let calls = generator.calls.borrow();
        assert!(calls[0].1.contains("example.only"));
    }
}
