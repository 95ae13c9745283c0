//! Category Record
//!
//! Fides APIのカテゴリレコードを`{fides_key, description}`に縮約する。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GleanFidesError, Result};

/// 例示として表示するカテゴリ数
const STATS_EXAMPLE_COUNT: usize = 3;

/// Fidesカテゴリ（分類対象のラベル）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// 一意なカテゴリキー（例: `user.behavior`）
    pub fides_key: String,
    /// カテゴリの説明（プロンプトに使用）
    pub description: String,
}

impl Category {
    pub fn new(fides_key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            fides_key: fides_key.into(),
            description: description.into(),
        }
    }
}

/// 完全なカテゴリレコードから`fides_key`と`description`のみを抽出
///
/// どちらかのフィールドが欠けている（または文字列でない）レコードは
/// `MalformedRecord`として失敗する。
pub fn extract_simplified_categories(raw: &[Value]) -> Result<Vec<Category>> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| {
            Ok(Category {
                fides_key: string_field(record, index, "fides_key")?,
                description: string_field(record, index, "description")?,
            })
        })
        .collect()
}

fn string_field(record: &Value, index: usize, field: &str) -> Result<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GleanFidesError::MalformedRecord {
            record: format!("category #{}", index),
            field: field.to_string(),
        })
}

/// カテゴリ一覧のサマリ（件数と先頭数件）
#[derive(Debug, Clone)]
pub struct CategoryStats<'a> {
    pub total: usize,
    pub examples: &'a [Category],
}

impl<'a> CategoryStats<'a> {
    pub fn of(categories: &'a [Category]) -> Self {
        let shown = categories.len().min(STATS_EXAMPLE_COUNT);
        Self {
            total: categories.len(),
            examples: &categories[..shown],
        }
    }
}
