//! Gitリポジトリとの対話を担当するモジュール
//!
//! このモジュールは、libgit2を使用して1つ以上のGitリポジトリから
//! コミット履歴を収集し、正規化済みのコミットテーブルを構築します。

use crate::digest::commit::{CommitRecord, CommitTable, RepoCommits};
use crate::digest::error::DigestError;
use crate::digest::CommitSource;
use chrono::{DateTime, Duration, Utc};
use git2::{Commit, DiffFormat, Repository, Sort};
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// 複数のGitリポジトリへのアクセスを管理するリポジトリソース
///
/// # フィールド
///
/// - `repos`: リポジトリ名とlibgit2ハンドルの組
/// - `include_patterns`: 変更ファイルとして数えるパスのパターン（空なら全て）
/// - `exclude_patterns`: 変更ファイルから除外するパスのパターン
/// - `include_merge_commits`: マージコミットを含めるかどうか
pub struct GitSource {
    repos: Vec<(String, Repository)>,
    include_patterns: Vec<Regex>,
    exclude_patterns: Vec<Regex>,
    include_merge_commits: bool,
}

impl GitSource {
    /// 指定されたパス配下のGitリポジトリを検出してオープンします
    ///
    /// # 引数
    ///
    /// - `path`: 検索の起点となるディレクトリ
    /// - `recursive`: サブディレクトリを再帰的に走査するかどうか
    /// - `include_patterns`: 変更ファイルとして数えるglobパターン
    /// - `exclude_patterns`: 変更ファイルから除外するglobパターン
    /// - `include_merge_commits`: マージコミットを含めるかどうか
    ///
    /// # エラー
    ///
    /// 以下の場合にエラーを返します：
    /// - 有効なGitリポジトリが1つも見つからない
    /// - パターンが正規表現に変換できない
    pub fn discover(
        path: impl AsRef<Path>,
        recursive: bool,
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
        include_merge_commits: bool,
    ) -> Result<Self, DigestError> {
        let path = path.as_ref();
        info!("Analyzing path: {}", path.display());

        let mut candidates = Vec::new();
        if recursive {
            info!("Recursive mode enabled, scanning all subdirectories");
            collect_git_dirs(path, &mut candidates);
        } else {
            candidates.push(path.to_path_buf());
        }

        let mut repos = Vec::new();
        for dir in candidates {
            if !dir.join(".git").exists() {
                continue;
            }
            match Repository::open(&dir) {
                Ok(repo) => {
                    info!("Found Git repo at {}", dir.display());
                    repos.push((repo_name(&dir), repo));
                }
                Err(e) => warn!("Failed to open {}: {}", dir.display(), e),
            }
        }

        if repos.is_empty() {
            return Err(DigestError::NoRepositories(path.to_path_buf()));
        }
        info!("Successfully loaded {} Git repositories", repos.len());

        let include_patterns = compile_patterns(include_patterns)?;
        let exclude_patterns = compile_patterns(exclude_patterns)?;

        Ok(Self {
            repos,
            include_patterns,
            exclude_patterns,
            include_merge_commits,
        })
    }

    /// 1つのリポジトリから指定日時以降のコミットを収集します
    fn commits_since(
        &self,
        repo_name: &str,
        repo: &Repository,
        since: DateTime<Utc>,
    ) -> Result<RepoCommits, DigestError> {
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;

        let base_url = remote_base_url(repo);

        let mut commits = RepoCommits::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = repo.find_commit(oid)?;

            let commit_time = DateTime::from_timestamp(commit.time().seconds(), 0)
                .ok_or_else(|| DigestError::Source("Invalid commit timestamp".to_string()))?;

            // 指定された日時より前のコミットはスキップ
            if commit_time < since {
                continue;
            }

            if !self.include_merge_commits && commit.parent_count() > 1 {
                continue;
            }

            let record = self.build_record(repo, &commit, commit_time, base_url.as_deref())?;
            commits.insert(record.hash.clone(), record);
        }

        debug!("Collected {} commits from {}", commits.len(), repo_name);
        Ok(commits)
    }

    /// 1つのコミットを正規化済みレコードに変換します
    fn build_record(
        &self,
        repo: &Repository,
        commit: &Commit,
        time: DateTime<Utc>,
        base_url: Option<&str>,
    ) -> Result<CommitRecord, DigestError> {
        let author = commit.author();
        let author_name = author.name().unwrap_or("unknown").to_string();
        let author_email = author.email().unwrap_or("unknown").to_string();

        let tree = commit.tree()?;
        let parent_tree = commit.parent(0).ok().and_then(|parent| parent.tree().ok());
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut changed_files = Vec::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path().and_then(|p| p.to_str()) {
                if self.should_include_file(path) && !changed_files.iter().any(|f| f == path) {
                    changed_files.push(path.to_string());
                }
            }
        }

        let mut diff_text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => diff_text.push(line.origin()),
                _ => {}
            }
            diff_text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
            true
        })?;

        let hash = commit.id().to_string();
        let url = base_url.map(|base| format!("{}/commit/{}", base, hash));

        Ok(CommitRecord {
            hash,
            author_name,
            author_email,
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            diff_text,
            changed_files,
            date: time.format("%Y-%m-%d %H:%M:%S").to_string(),
            url,
        })
    }

    /// 指定されたファイルパスを変更ファイルとして数えるかどうかを判定します
    fn should_include_file(&self, file_path: &str) -> bool {
        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(file_path))
        {
            return false;
        }

        if self.include_patterns.is_empty() {
            return true;
        }

        self.include_patterns
            .iter()
            .any(|pattern| pattern.is_match(file_path))
    }
}

impl CommitSource for GitSource {
    /// 全リポジトリから指定日数以内のコミットを収集します
    ///
    /// 1つのリポジトリの読み取りに失敗しても、そのリポジトリだけを
    /// スキップして残りの収集を続けます。
    fn get_all_commits(&self, days_back: i64) -> Result<CommitTable, DigestError> {
        let since = Utc::now() - Duration::days(days_back);

        let mut table = CommitTable::new();
        for (name, repo) in &self.repos {
            match self.commits_since(name, repo, since) {
                Ok(commits) => {
                    table.insert(name.clone(), commits);
                }
                Err(e) => warn!("Skipping repository {}: {}", name, e),
            }
        }
        Ok(table)
    }
}

/// `.git`を含むディレクトリを再帰的に収集します
fn collect_git_dirs(root: &Path, out: &mut Vec<PathBuf>) {
    if root.join(".git").exists() {
        out.push(root.to_path_buf());
    }
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && entry.file_name() != ".git" {
            collect_git_dirs(&path, out);
        }
    }
}

/// ディレクトリ名からリポジトリ名を導出します
fn repo_name(dir: &Path) -> String {
    let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    canonical
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// globパターンの一覧を正規表現にコンパイルします
fn compile_patterns(patterns: Vec<String>) -> Result<Vec<Regex>, DigestError> {
    patterns
        .into_iter()
        .map(|p| Regex::new(&glob_to_regex(&p)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DigestError::InvalidPattern(e.to_string()))
}

/// originリモートのURLからコミット閲覧用のベースURLを導出します
fn remote_base_url(repo: &Repository) -> Option<String> {
    let remote = repo.find_remote("origin").ok()?;
    normalize_remote_url(remote.url()?)
}

/// リモートURLをhttps形式のベースURLに正規化します
fn normalize_remote_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    // scp形式 (git@host:owner/repo) はhttps形式に変換する
    if let Some(rest) = url.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        return Some(format!("https://{}/{}", host, path));
    }
    if let Some(rest) = url.strip_prefix("ssh://git@") {
        return Some(format!("https://{}", rest));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_string());
    }

    None
}

fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::new();
    regex.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        regex.push_str(".*/");
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    // 単一の'*'はディレクトリ区切りをまたがない
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push('.'),
            '/' => regex.push('/'),
            c if c.is_alphanumeric() => regex.push(c),
            _ => regex.push_str(&regex::escape(&c.to_string())),
        }
    }

    regex.push('$');
    regex
}
