//! LLM Integration Module
//!
//! テキスト生成モデルの呼び出しを`TextGenerator`トレイトで抽象化する。
//!
//! ## プロバイダ
//!
//! - `vertex`: Vertex AI `generateContent`（デフォルト）
//! - `claude-cli`: ローカルのClaude CLI（`claude --print`）
//!
//! ## 使用方法
//!
//! ```rust
//! use glean_fides_core::llm::{LlmProvider, TextGenerator};
//! use glean_fides_core::Result;
//!
//! struct Echo;
//!
//! impl TextGenerator for Echo {
//!     fn generate(&self, _model_id: &str, _prompt: &str) -> Result<String> {
//!         Ok("N/A".to_string())
//!     }
//! }
//!
//! assert_eq!(Echo.generate("any-model", "prompt").unwrap(), "N/A");
//! assert_eq!("claude-cli".parse::<LlmProvider>().unwrap(), LlmProvider::ClaudeCli);
//! ```

mod claude;
mod vertex;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GleanFidesError, Result};

pub use claude::{check_claude_cli, execute_claude, ClaudeCliGenerator};
pub use vertex::{VertexGenerator, DEFAULT_VERTEX_TOKEN_ENV};

/// プロンプトを受け取りテキストを返す生成器
pub trait TextGenerator {
    /// `model_id`のモデルで`prompt`に対する応答テキストを生成
    fn generate(&self, model_id: &str, prompt: &str) -> Result<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        (**self).generate(model_id, prompt)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        (**self).generate(model_id, prompt)
    }
}

/// 生成プロバイダ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    #[default]
    Vertex,
    ClaudeCli,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::ClaudeCli => write!(f, "claude-cli"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = GleanFidesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertex" => Ok(Self::Vertex),
            "claude-cli" | "claude" => Ok(Self::ClaudeCli),
            other => Err(GleanFidesError::ConfigValue {
                key: "classifier.provider".to_string(),
                message: format!("expected 'vertex' or 'claude-cli', got '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl TextGenerator for Fixed {
        fn generate(&self, _model_id: &str, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_boxed_and_borrowed_generators_delegate() {
        let fixed = Fixed("user.behavior");
        let boxed: Box<dyn TextGenerator> = Box::new(Fixed("system"));

        assert_eq!((&fixed).generate("m", "p").unwrap(), "user.behavior");
        assert_eq!(boxed.generate("m", "p").unwrap(), "system");
    }

    #[test]
    fn test_provider_round_trip() {
        for provider in [LlmProvider::Vertex, LlmProvider::ClaudeCli] {
            assert_eq!(provider.to_string().parse::<LlmProvider>().unwrap(), provider);
        }
        assert!("openai".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_provider_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: LlmProvider,
        }
        let w: Wrapper = toml::from_str(r#"provider = "claude-cli""#).unwrap();
        assert_eq!(w.provider, LlmProvider::ClaudeCli);
    }
}
