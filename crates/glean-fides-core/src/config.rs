use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::category::{
    CategorySnapshot, DEFAULT_FIDES_API_URL, DEFAULT_FIDES_TOKEN_ENV, DEFAULT_SNAPSHOT_FILE,
};
use crate::classifier::{ClassifierSettings, DEFAULT_MODEL_ID, DEFAULT_REGION};
use crate::error::{GleanFidesError, Result};
use crate::llm::{LlmProvider, DEFAULT_VERTEX_TOKEN_ENV};
use crate::metric::DEFAULT_PROBE_INFO_URL;
use crate::prompt::{default_examples, FewShotExample, PromptMode};
use crate::report::{QuoteStyle, DEFAULT_REPORT_FILE};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# glean-fides configuration file
# Location: ~/.glean-fides/config.toml

[classifier]
# Text generation provider: "vertex" or "claude-cli"
provider = "vertex"
model_id = "gemini-2.0-flash-001"
# Google Cloud project hosting Vertex AI (required for provider = "vertex")
project = ""
region = "us-central1"
# Prompt mode: "plain" or "few-shot"
mode = "plain"
# Reject answers that are neither a known fides_key nor "N/A"
strict = false
# Environment variable holding the Vertex AI access token
token_env = "GOOGLE_CLOUD_ACCESS_TOKEN"

# Few-shot examples replace the built-in set when present:
# [[classifier.examples]]
# category_key = "user.behavior.browsing_history"
# [classifier.examples.metric]
# name = "events.page_load"
# type = "event"
# description = "Recorded when a web page finishes loading."
# data_sensitivity = ["interaction"]

[fides]
api_url = "https://prod.data-privacy-mapping.prod.dataservices.mozgcp.net"
# Environment variable holding the Fides bearer token
token_env = "FIDES_API_TOKEN"
# Category snapshot (relative paths resolve against the base directory)
snapshot = "fides_categories.json"

[glean]
api_url = "https://probeinfo.telemetry.mozilla.org/glean"

[report]
output = "categorized_metrics.csv"
# Double embedded quotes in descriptions (RFC 4180)
escape = false
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub fides: FidesConfig,
    #[serde(default)]
    pub glean: GleanConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Classification-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default)]
    pub project: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub mode: PromptMode,

    #[serde(default)]
    pub strict: bool,

    #[serde(default = "default_vertex_token_env")]
    pub token_env: String,

    /// Overrides the built-in few-shot examples when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<FewShotExample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FidesConfig {
    #[serde(default = "default_fides_api_url")]
    pub api_url: String,

    #[serde(default = "default_fides_token_env")]
    pub token_env: String,

    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GleanConfig {
    #[serde(default = "default_probe_info_url")]
    pub api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub escape: bool,
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_vertex_token_env() -> String {
    DEFAULT_VERTEX_TOKEN_ENV.to_string()
}

fn default_fides_api_url() -> String {
    DEFAULT_FIDES_API_URL.to_string()
}

fn default_fides_token_env() -> String {
    DEFAULT_FIDES_TOKEN_ENV.to_string()
}

fn default_snapshot() -> PathBuf {
    PathBuf::from(DEFAULT_SNAPSHOT_FILE)
}

fn default_probe_info_url() -> String {
    DEFAULT_PROBE_INFO_URL.to_string()
}

fn default_report_output() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_FILE)
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model_id: default_model_id(),
            project: String::new(),
            region: default_region(),
            mode: PromptMode::default(),
            strict: false,
            token_env: default_vertex_token_env(),
            examples: Vec::new(),
        }
    }
}

impl Default for FidesConfig {
    fn default() -> Self {
        Self {
            api_url: default_fides_api_url(),
            token_env: default_fides_token_env(),
            snapshot: default_snapshot(),
        }
    }
}

impl Default for GleanConfig {
    fn default() -> Self {
        Self {
            api_url: default_probe_info_url(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            escape: false,
        }
    }
}

impl ClassifierConfig {
    /// Build the value object handed to the classifier and prompt builder
    pub fn settings(&self) -> ClassifierSettings {
        let examples = if self.examples.is_empty() {
            default_examples()
        } else {
            self.examples.clone()
        };
        ClassifierSettings {
            model_id: self.model_id.clone(),
            project: self.project.clone(),
            region: self.region.clone(),
            examples,
        }
    }
}

impl ReportConfig {
    pub fn quote_style(&self) -> QuoteStyle {
        if self.escape {
            QuoteStyle::Escaped
        } else {
            QuoteStyle::Raw
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| GleanFidesError::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| GleanFidesError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Category snapshot, resolved against the base directory when relative
    pub fn snapshot(&self, base_dir: &Path) -> CategorySnapshot {
        CategorySnapshot::new(resolve(base_dir, &self.fides.snapshot))
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "classifier.provider" => self.classifier.provider = value.parse()?,
            "classifier.model_id" => self.classifier.model_id = value.to_string(),
            "classifier.project" => self.classifier.project = value.to_string(),
            "classifier.region" => self.classifier.region = value.to_string(),
            "classifier.mode" => self.classifier.mode = value.parse()?,
            "classifier.strict" => self.classifier.strict = parse_bool(key, value)?,
            "classifier.token_env" => self.classifier.token_env = value.to_string(),
            "fides.api_url" => self.fides.api_url = value.to_string(),
            "fides.token_env" => self.fides.token_env = value.to_string(),
            "fides.snapshot" => self.fides.snapshot = PathBuf::from(value),
            "glean.api_url" => self.glean.api_url = value.to_string(),
            "report.output" => self.report.output = PathBuf::from(value),
            "report.escape" => self.report.escape = parse_bool(key, value)?,
            _ => {
                return Err(GleanFidesError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "classifier.provider".to_string(),
                self.classifier.provider.to_string(),
            ),
            (
                "classifier.model_id".to_string(),
                self.classifier.model_id.clone(),
            ),
            (
                "classifier.project".to_string(),
                self.classifier.project.clone(),
            ),
            (
                "classifier.region".to_string(),
                self.classifier.region.clone(),
            ),
            (
                "classifier.mode".to_string(),
                self.classifier.mode.to_string(),
            ),
            (
                "classifier.strict".to_string(),
                self.classifier.strict.to_string(),
            ),
            (
                "classifier.token_env".to_string(),
                self.classifier.token_env.clone(),
            ),
            ("fides.api_url".to_string(), self.fides.api_url.clone()),
            ("fides.token_env".to_string(), self.fides.token_env.clone()),
            (
                "fides.snapshot".to_string(),
                self.fides.snapshot.display().to_string(),
            ),
            ("glean.api_url".to_string(), self.glean.api_url.clone()),
            (
                "report.output".to_string(),
                self.report.output.display().to_string(),
            ),
            ("report.escape".to_string(), self.report.escape.to_string()),
        ]
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(GleanFidesError::ConfigValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_template() {
        let from_template: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        let defaults = Config::default();
        assert_eq!(from_template.list(), defaults.list());
    }

    #[test]
    fn test_load_missing_returns_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.classifier.model_id, "gemini-2.0-flash-001");
        assert_eq!(config.classifier.region, "us-central1");
        assert_eq!(config.classifier.mode, PromptMode::Plain);
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[classifier]\nproject = \"sandbox\"\nmode = \"few-shot\"\n",
        )
        .unwrap();

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.classifier.project, "sandbox");
        assert_eq!(config.classifier.mode, PromptMode::FewShot);
        assert_eq!(config.fides.token_env, "FIDES_API_TOKEN");
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[classifier\n").unwrap();
        let err = Config::load(temp.path()).unwrap_err();
        assert!(matches!(err, GleanFidesError::ConfigParse { .. }));
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("classifier.mode", "few-shot").unwrap();
        config.set("classifier.strict", "true").unwrap();
        config.set("report.output", "out/report.csv").unwrap();

        assert_eq!(config.get("classifier.mode").unwrap(), "few-shot");
        assert_eq!(config.get("classifier.strict").unwrap(), "true");
        assert_eq!(config.report.output, PathBuf::from("out/report.csv"));
        assert!(config.get("nope").is_none());
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("profile.exclude", ".git"),
            Err(GleanFidesError::ConfigKeyNotFound { .. })
        ));
        assert!(config.set("classifier.strict", "maybe").is_err());
        assert!(config.set("classifier.provider", "openai").is_err());
    }

    #[test]
    fn test_save_and_reload_with_examples() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.classifier.project = "sandbox".to_string();
        config.classifier.examples = vec![FewShotExample::new(
            crate::metric::Metric::new("custom.metric", "event").with_description("desc"),
            "user.behavior",
        )];
        config.save(temp.path()).unwrap();

        let loaded = Config::load(temp.path()).unwrap();
        assert_eq!(loaded.classifier.project, "sandbox");
        assert_eq!(loaded.classifier.examples, config.classifier.examples);
        assert_eq!(
            loaded.classifier.settings().examples,
            config.classifier.examples
        );
    }

    #[test]
    fn test_settings_fall_back_to_builtin_examples() {
        let settings = ClassifierConfig::default().settings();
        assert_eq!(settings.examples, default_examples());
        assert_eq!(settings, ClassifierSettings::default());
    }

    #[test]
    fn test_init_writes_template_once() {
        let temp = TempDir::new().unwrap();
        let path = Config::init(temp.path()).unwrap();
        fs::write(&path, "# edited\n").unwrap();
        Config::init(temp.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# edited\n");
    }

    #[test]
    fn test_snapshot_path_resolution() {
        let base = Path::new("/base");
        let mut config = Config::default();
        assert_eq!(
            config.snapshot(base).path(),
            Path::new("/base/fides_categories.json")
        );
        config.fides.snapshot = PathBuf::from("/abs/cats.json");
        assert_eq!(config.snapshot(base).path(), Path::new("/abs/cats.json"));
    }

    #[test]
    fn test_quote_style() {
        let mut report = ReportConfig::default();
        assert_eq!(report.quote_style(), QuoteStyle::Raw);
        report.escape = true;
        assert_eq!(report.quote_style(), QuoteStyle::Escaped);
    }
}
