//! Category Snapshot
//!
//! 縮約済みカテゴリをJSONファイルとして保存・読込する。
//! ネットワークを介さずに分類を再実行するためのローカルストア。

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GleanFidesError, Result};

use super::record::Category;

/// デフォルトのスナップショットファイル名
pub const DEFAULT_SNAPSHOT_FILE: &str = "fides_categories.json";

/// ファイル名をキーとするカテゴリスナップショット
#[derive(Debug, Clone)]
pub struct CategorySnapshot {
    path: PathBuf,
}

impl CategorySnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// ベースディレクトリ配下のデフォルトスナップショット
    pub fn in_dir(base_dir: &Path) -> Self {
        Self::new(base_dir.join(DEFAULT_SNAPSHOT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// カテゴリを保存（既存ファイルは上書き）
    pub fn save(&self, categories: &[Category]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(categories)?;
        fs::write(&self.path, content).map_err(|e| GleanFidesError::Persistence {
            path: self.path.clone(),
            message: format!("Failed to write: {}", e),
        })?;

        log::debug!(
            "Saved {} categories to {}",
            categories.len(),
            self.path.display()
        );
        Ok(())
    }

    /// カテゴリを読込
    ///
    /// ファイルが存在しない、またはJSONとして不正な場合は`Persistence`エラー。
    pub fn load(&self) -> Result<Vec<Category>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            let message = if e.kind() == std::io::ErrorKind::NotFound {
                "File not found".to_string()
            } else {
                format!("Failed to read: {}", e)
            };
            GleanFidesError::Persistence {
                path: self.path.clone(),
                message,
            }
        })?;

        serde_json::from_str(&content).map_err(|e| GleanFidesError::Persistence {
            path: self.path.clone(),
            message: format!("Invalid JSON: {}", e),
        })
    }
}
