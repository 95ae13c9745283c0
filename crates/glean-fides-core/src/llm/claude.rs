//! Claude CLI Generator
//!
//! ローカルのClaude CLI（`claude --print`）を生成器として使う。

use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{GleanFidesError, Result};

use super::TextGenerator;

/// Claude CLIが利用可能かチェック
///
/// `claude --version` を実行して成功すればtrue
pub fn check_claude_cli() -> bool {
    Command::new("claude")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Claude CLIを実行してプロンプトを処理
///
/// # Arguments
/// * `working_dir` - 作業ディレクトリ
/// * `model_id` - `--model`に渡すモデル名
/// * `prompt` - 標準入力に書き込むプロンプト
///
/// # Errors
/// 起動・書き込み・終了コードのいずれかが失敗した場合は`Generation`
pub fn execute_claude(working_dir: &Path, model_id: &str, prompt: &str) -> Result<String> {
    let mut cmd = Command::new("claude");
    cmd.arg("--print");
    if !model_id.is_empty() {
        cmd.arg("--model").arg(model_id);
    }
    cmd.current_dir(working_dir);
    run_with_prompt(cmd, prompt)
}

/// プロンプトを標準入力に書き込み、終了を待って標準出力を返す
///
/// 書き込みに失敗した場合は子プロセスをkillして回収する。
fn run_with_prompt(mut cmd: Command, prompt: &str) -> Result<String> {
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| GleanFidesError::Generation {
        message: format!("Failed to spawn claude: {}", e),
    })?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(prompt.as_bytes()) {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(GleanFidesError::Generation {
                message: format!("Failed to write prompt: {}", e),
            });
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|e| GleanFidesError::Generation {
            message: format!("Execution failed: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GleanFidesError::Generation {
            message: format!("Claude exited with error: {}", stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Claude CLIを使う生成器
#[derive(Debug, Clone)]
pub struct ClaudeCliGenerator {
    working_dir: PathBuf,
}

impl ClaudeCliGenerator {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// CLIの存在を確認してから構築
    pub fn detect(working_dir: impl Into<PathBuf>) -> Result<Self> {
        if !check_claude_cli() {
            return Err(GleanFidesError::Configuration {
                message: "Claude CLI not found. Install it or use the vertex provider".to_string(),
            });
        }
        Ok(Self::new(working_dir))
    }
}

impl TextGenerator for ClaudeCliGenerator {
    fn generate(&self, model_id: &str, prompt: &str) -> Result<String> {
        log::debug!("[LLM] Provider: claude-cli, model: {}", model_id);
        execute_claude(&self.working_dir, model_id, prompt)
    }
}
