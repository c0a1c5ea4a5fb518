//! コミットデータモデルを定義するモジュール
//!
//! このモジュールは、リポジトリソースから取得した正規化済みコミット情報と、
//! リポジトリごとの挿入順を保持するコミットテーブル型を提供します。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 1つのコミットを表す正規化済みレコード
///
/// # フィールド
///
/// - `hash`: リポジトリ内で一意なコミットハッシュ
/// - `author_name`: コミット作成者の名前
/// - `author_email`: コミット作成者のメールアドレス
/// - `summary`: コミットメッセージの1行目
/// - `message`: コミットメッセージ全文
/// - `diff_text`: パッチ形式の差分テキスト（空の場合もある）
/// - `changed_files`: このコミットで変更されたファイルパス（コミット内で重複しない）
/// - `date`: 表示用にフォーマット済みのコミット日時
/// - `url`: リモートビューアへのリンク（導出できない場合は`None`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub summary: String,
    pub message: String,
    pub diff_text: String,
    pub changed_files: Vec<String>,
    pub date: String,
    pub url: Option<String>,
}

/// コミットハッシュからレコードへの挿入順マップ
pub type RepoCommits = IndexMap<String, CommitRecord>;

/// リポジトリ名からコミット一覧への挿入順マップ
pub type CommitTable = IndexMap<String, RepoCommits>;

/// テーブル内の全リポジトリのコミット総数を返します
pub fn commit_count(table: &CommitTable) -> usize {
    table.values().map(|commits| commits.len()).sum()
}
