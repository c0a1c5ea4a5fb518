//! コミットの絞り込み（raw → cooked）を担当するモジュール
//!
//! 絞り込みは2つのモードをサポートします：
//!
//! - 和集合モード: いずれかの条件に一致したコミットを採用する
//! - 積集合モード: 指定された全ての条件に一致したコミットのみ採用する
//!
//! メールアドレスとユーザー名の照合は、和集合モードでは完全一致、
//! 積集合モードでは部分一致で行われます。キーワードはどちらのモードでも
//! コミットメッセージと差分テキストを連結した文字列に対する
//! 大文字小文字を区別しない部分一致です。

use crate::digest::commit::{commit_count, CommitRecord, CommitTable, RepoCommits};
use log::{debug, info};

/// 絞り込み条件の組み合わせ方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// いずれかの条件に一致すれば採用する
    Union,
    /// 指定された全ての条件に一致した場合のみ採用する
    Intersection,
}

/// 絞り込み条件
///
/// # フィールド
///
/// - `emails`: 作成者メールアドレスの条件（空の場合は制約なし）
/// - `usernames`: 作成者名の条件（空の場合は制約なし）
/// - `keywords`: メッセージ・差分に対するキーワード条件（空の場合は制約なし）
/// - `mode`: 条件の組み合わせ方法
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub emails: Vec<String>,
    pub usernames: Vec<String>,
    pub keywords: Vec<String>,
    pub mode: FilterMode,
}

impl FilterSpec {
    /// 条件が1つも指定されていない場合に`true`を返します
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.usernames.is_empty() && self.keywords.is_empty()
    }

    /// コミットが条件に一致するかどうかを判定します
    ///
    /// 条件が1つも指定されていない場合は、モードに関わらず全ての
    /// コミットが一致扱いになります。
    pub fn matches(&self, commit: &CommitRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        match self.mode {
            FilterMode::Union => self.matches_any(commit),
            FilterMode::Intersection => self.matches_all(commit),
        }
    }

    fn matches_any(&self, commit: &CommitRecord) -> bool {
        // メールアドレスと名前は完全一致で比較する
        if self.emails.iter().any(|email| *email == commit.author_email) {
            return true;
        }
        if self.usernames.iter().any(|user| *user == commit.author_name) {
            return true;
        }
        if !self.keywords.is_empty() {
            let text = search_text(commit);
            if self
                .keywords
                .iter()
                .any(|keyword| text.contains(&keyword.to_lowercase()))
            {
                return true;
            }
        }
        false
    }

    fn matches_all(&self, commit: &CommitRecord) -> bool {
        // 積集合モードのメールアドレスと名前は部分一致で比較する
        // （和集合モードの完全一致とは非対称）
        if !self
            .emails
            .iter()
            .all(|email| commit.author_email.contains(email.as_str()))
        {
            return false;
        }
        if !self
            .usernames
            .iter()
            .all(|user| commit.author_name.contains(user.as_str()))
        {
            return false;
        }
        if !self.keywords.is_empty() {
            let text = search_text(commit);
            if !self
                .keywords
                .iter()
                .all(|keyword| text.contains(&keyword.to_lowercase()))
            {
                return false;
            }
        }
        true
    }
}

/// キーワード検索の対象となるテキストを小文字化して返します
///
/// メッセージと差分テキストは区切り文字なしで連結されます。
fn search_text(commit: &CommitRecord) -> String {
    format!("{}{}", commit.message, commit.diff_text).to_lowercase()
}

/// rawテーブルを絞り込み、cookedテーブルを生成します
///
/// # 引数
///
/// - `raw`: 収集済みのコミットテーブル
/// - `spec`: 絞り込み条件
///
/// # 戻り値
///
/// 条件に一致したコミットのみを含むテーブル。リポジトリごとの挿入順は
/// 保たれ、一致するコミットが無いリポジトリも空のエントリとして残ります。
pub fn cook(raw: &CommitTable, spec: &FilterSpec) -> CommitTable {
    match spec.mode {
        FilterMode::Union => {
            info!("[Search Mode] Union - a commit matching any condition is kept")
        }
        FilterMode::Intersection => {
            info!("[Search Mode] Intersection - a commit must match all specified conditions")
        }
    }
    debug!("Email conditions: {:?}", spec.emails);
    debug!("User conditions: {:?}", spec.usernames);
    debug!("Keyword conditions: {:?}", spec.keywords);

    let mut cooked = CommitTable::new();
    for (repo_name, commits) in raw {
        let mut survivors = RepoCommits::new();
        for (hash, commit) in commits {
            if spec.matches(commit) {
                survivors.insert(hash.clone(), commit.clone());
            }
        }
        cooked.insert(repo_name.clone(), survivors);
    }

    info!(
        "Filtering complete, found {} matching commits",
        commit_count(&cooked)
    );
    cooked
}
