//! # Category Module
//!
//! Fidesデータカテゴリ（分類ラベル）の取得・縮約・永続化を提供する。
//!
//! ## モジュール構成
//!
//! - `record`: カテゴリレコードと縮約処理
//! - `store`: ローカルスナップショット（JSONファイル）
//! - `fetch`: Fides APIクライアント
//!
//! ## 使用例
//!
//! ```rust
//! use glean_fides_core::category::{extract_simplified_categories, Category};
//! use serde_json::json;
//!
//! let raw = vec![json!({
//!     "fides_key": "user.behavior",
//!     "description": "Behavioral data",
//!     "parent_key": "user"
//! })];
//! let categories = extract_simplified_categories(&raw).unwrap();
//! assert_eq!(categories, vec![Category::new("user.behavior", "Behavioral data")]);
//! ```
//!
//! ### 完全な使用例（外部依存あり）
//!
//! ```rust,ignore
//! use glean_fides_core::category::{
//!     extract_simplified_categories, CategorySnapshot, FidesClient, DEFAULT_FIDES_API_URL,
//! };
//!
//! let client = FidesClient::from_env(DEFAULT_FIDES_API_URL, "FIDES_API_TOKEN")?;
//! let categories = extract_simplified_categories(&client.fetch_categories()?)?;
//! CategorySnapshot::new("fides_categories.json").save(&categories)?;
//! ```

mod fetch;
mod record;
mod store;

// Re-exports
pub use fetch::{FidesClient, DEFAULT_FIDES_API_URL, DEFAULT_FIDES_TOKEN_ENV};
pub use record::{extract_simplified_categories, Category, CategoryStats};
pub use store::{CategorySnapshot, DEFAULT_SNAPSHOT_FILE};
