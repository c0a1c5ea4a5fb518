//! Gitコミット履歴のダイジェストツール
//!
//! このクレートは、1つ以上のGitリポジトリのコミット履歴を集約し、
//! 作成者や本文に対する絞り込みと、変更頻度に基づくホットスポットの
//! ランク付けを行う機能を提供します。
//!
//! # 主な機能
//!
//! - 複数リポジトリからのコミット履歴の収集
//! - 和集合/積集合モードによるコミットの絞り込み
//! - ファイル変更頻度のティア分類とディレクトリ単位のグループ化
//! - パッチ/差分レポートの生成
//!
//! # 使用例
//!
//! ```no_run
//! use commit_digest::{collect, cook, FilterMode, FilterSpec, GitSource};
//!
//! let source = GitSource::discover("path/to/repos", true, vec![], vec![], false).unwrap();
//! let raw = collect(&source, 7);
//! let spec = FilterSpec {
//!     emails: vec!["dev@example.com".to_string()],
//!     usernames: vec![],
//!     keywords: vec![],
//!     mode: FilterMode::Union,
//! };
//! let cooked = cook(&raw, &spec);
//! ```

pub mod digest;
pub use digest::{
    collect, commit_count, commit_rows, commit_table, cook, generate_report, hotspot,
    hotspot_rows, hotspot_table, tier_for, CommitRecord, CommitRow, CommitSource, CommitTable,
    DigestError, FilterMode, FilterSpec, GitSource, HotspotEntry, HotspotGroup, HotspotRow,
    RepoCommits, Tier,
};
