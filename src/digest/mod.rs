//! コミット履歴ダイジェストの中核となるモジュール
//!
//! 処理は以下の流れで行われます：
//!
//! 1. リポジトリソースからのコミット履歴の収集（raw）
//! 2. メールアドレス・ユーザー名・キーワードによる絞り込み（cooked）
//! 3. 変更頻度に基づくホットスポットのティア分類
//! 4. パッチ/差分レポートの生成
//!
//! # 主要なコンポーネント
//!
//! - `CommitSource`: リポジトリソースへの問い合わせ口となるトレイト
//! - `GitSource`: libgit2を使った`CommitSource`の実装
//! - `collect`: 収集結果を1つのテーブルに統合するコレクタ
//! - `cook`: rawテーブルをcookedテーブルに絞り込むフィルタエンジン
//! - `hotspot`: ファイル変更頻度のティア分類
//! - `generate_report`: パッチ/差分レポートの生成

mod commit;
mod error;
mod filter;
mod git;
mod hotspot;
mod render;
mod report;

pub use commit::{commit_count, CommitRecord, CommitTable, RepoCommits};
pub use error::DigestError;
pub use filter::{cook, FilterMode, FilterSpec};
pub use git::GitSource;
pub use hotspot::{hotspot, tier_for, HotspotEntry, HotspotGroup, Tier};
pub use render::{commit_rows, commit_table, hotspot_rows, hotspot_table, CommitRow, HotspotRow};
pub use report::generate_report;

use log::{error, info, warn};

/// リポジトリソースへの問い合わせ口
///
/// 実装は、1回の呼び出しの中で決定的な結果を返し、リポジトリごとの
/// コミットの挿入順を安定させる必要があります。
pub trait CommitSource {
    /// 指定日数以内のコミットをリポジトリごとに取得します
    fn get_all_commits(&self, days_back: i64) -> Result<CommitTable, DigestError>;
}

/// 全リポジトリからコミットを収集してrawテーブルを構築します
///
/// # 戻り値
///
/// リポジトリ名からコミット一覧へのテーブル。ソースがエラーを返した
/// 場合はエラーを記録した上で空のテーブルを返します。
pub fn collect<S: CommitSource>(source: &S, days_back: i64) -> CommitTable {
    info!("Collecting commits from the last {} days", days_back);

    match source.get_all_commits(days_back) {
        Ok(table) => {
            if commit_count(&table) == 0 {
                warn!("No matching commits found");
            }
            table
        }
        Err(e) => {
            error!("Repository source failed: {}", e);
            CommitTable::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource(CommitTable);

    impl CommitSource for StaticSource {
        fn get_all_commits(&self, _days_back: i64) -> Result<CommitTable, DigestError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl CommitSource for FailingSource {
        fn get_all_commits(&self, _days_back: i64) -> Result<CommitTable, DigestError> {
            Err(DigestError::Source("boom".to_string()))
        }
    }

    #[test]
    fn test_collect_passes_source_table_through() {
        let mut table = CommitTable::new();
        table.insert("repoA".to_string(), RepoCommits::new());
        let source = StaticSource(table.clone());

        assert_eq!(collect(&source, 7), table);
    }

    #[test]
    fn test_collect_returns_empty_table_on_source_error() {
        // ソースのエラーは収集全体を失敗させない
        assert!(collect(&FailingSource, 7).is_empty());
    }
}
