//! パッチ/差分レポートの生成を担当するモジュール
//!
//! cookedテーブルの内容を1つのテキストファイルにまとめます。生成された
//! ファイルはエディタやLLMエージェントにそのまま渡せる形式です。

use crate::digest::commit::{commit_count, CommitTable};
use crate::digest::error::DigestError;
use chrono::Local;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// コミット分析用プロンプトを組み立てます
fn analysis_prompt(repo_name: &str, keywords: &[String]) -> String {
    let topic = keywords.join(", ");
    format!(
        r#"
As an expert in the current {repo} project, you need to analyze the Git commit message and diff info related to '{topic}'. Answer these questions:
1. What are the main changes in this commit for {repo}.
2. What problems might these changes solve for {repo}.
3. Extract key info from the commit message and explain how it describes the code submission for {repo}.
4. Analyze the relationship between the submitted code and its description. Point out which code implements the goals in the commit message for {repo}.
5. Evaluate the impact of this commit on the project. Which files or functionalities are affected for {repo}.
6. Explain the context and significance of this commit. Does it address issues or implement new features for {repo}.
7. Don't explain abbreviations.

the output should not include the above rules and requirements; it should be naturally integrated.
"#,
        repo = repo_name,
        topic = topic,
    )
}

/// cookedテーブルからパッチ/差分レポートファイルを生成します
///
/// # 引数
///
/// - `cooked`: 絞り込み済みのコミットテーブル
/// - `keywords`: プロンプトに埋め込む検索キーワード
/// - `out_dir`: レポートの出力先ディレクトリ
///
/// # 戻り値
///
/// 書き込んだファイルのパス。cookedテーブルが空の場合はファイルを
/// 作成せず`None`を返します。
///
/// # エラー
///
/// レポートファイルの書き込みに失敗した場合にエラーを返します
pub fn generate_report(
    cooked: &CommitTable,
    keywords: &[String],
    out_dir: &Path,
) -> Result<Option<PathBuf>, DigestError> {
    if commit_count(cooked) == 0 {
        warn!("No processed commits available for report generation");
        return Ok(None);
    }

    info!("Generating Git patch/diff report file...");

    let now = Local::now();
    // 実行ごとに一意なファイル名にする
    let output_file = out_dir.join(format!(
        "git_patch_report_{}.diff",
        now.format("%Y%m%d_%H%M%S")
    ));

    let file = File::create(&output_file)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# Git Patch/Diff Report")?;
    writeln!(out, "# Generated: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    for (repo_name, commits) in cooked {
        if commits.is_empty() {
            continue;
        }

        writeln!(out, "{}", "=".repeat(79))?;
        writeln!(out, "Repository: {}", repo_name)?;
        writeln!(out, "{}", "=".repeat(79))?;
        writeln!(out)?;

        for (hash, commit) in commits {
            writeln!(out, "{}", "-".repeat(79))?;
            writeln!(out, "Commit: {}", hash)?;
            writeln!(
                out,
                "Author: {} <{}>",
                commit.author_name, commit.author_email
            )?;
            writeln!(out, "Date: {}", commit.date)?;
            writeln!(out)?;

            writeln!(out, "Commit Message:")?;
            writeln!(out, "{}", commit.message)?;
            writeln!(out)?;

            writeln!(out, "Analysis Context:")?;
            writeln!(out, "{}", analysis_prompt(repo_name, keywords))?;
            writeln!(out)?;

            if !commit.changed_files.is_empty() {
                writeln!(out, "Changed Files:")?;
                for path in &commit.changed_files {
                    writeln!(out, "  - {}", path)?;
                }
                writeln!(out)?;
            }

            if commit.diff_text.is_empty() {
                writeln!(out, "No diff information available for this commit")?;
                writeln!(out)?;
            } else {
                writeln!(out, "Git Patch/Diff:")?;
                writeln!(out, "{}", commit.diff_text)?;
                writeln!(out)?;
            }

            if let Some(url) = &commit.url {
                writeln!(out, "Commit URL: {}", url)?;
                writeln!(out)?;
            }
        }
    }

    out.flush()?;
    info!("Git patch/diff report generated: {}", output_file.display());
    Ok(Some(output_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::commit::{CommitRecord, RepoCommits};
    use std::fs;
    use tempfile::TempDir;

    fn sample_table(diff: &str) -> CommitTable {
        let mut commits = RepoCommits::new();
        commits.insert(
            "h1".to_string(),
            CommitRecord {
                hash: "h1".to_string(),
                author_name: "Alice".to_string(),
                author_email: "a@x.com".to_string(),
                summary: "fix bug".to_string(),
                message: "fix bug\n\nlonger description".to_string(),
                diff_text: diff.to_string(),
                changed_files: vec!["src/a.py".to_string()],
                date: "2024-01-01 00:00:00".to_string(),
                url: Some("https://example.com/commit/h1".to_string()),
            },
        );
        let mut table = CommitTable::new();
        table.insert("repoA".to_string(), commits);
        // コミットの無いリポジトリはレポートに現れない
        table.insert("repoB".to_string(), RepoCommits::new());
        table
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = generate_report(&CommitTable::new(), &[], dir.path()).unwrap();

        assert!(result.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_report_contains_commit_sections() {
        let dir = TempDir::new().unwrap();
        let keywords = vec!["bug".to_string()];
        let path = generate_report(&sample_table("+ patched line\n"), &keywords, dir.path())
            .unwrap()
            .expect("report should be written");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Git Patch/Diff Report"));
        assert!(content.contains("Repository: repoA"));
        assert!(!content.contains("Repository: repoB"));
        assert!(content.contains("Commit: h1"));
        assert!(content.contains("Author: Alice <a@x.com>"));
        assert!(content.contains("longer description"));
        assert!(content.contains("the current repoA project"));
        assert!(content.contains("related to 'bug'"));
        assert!(content.contains("  - src/a.py"));
        assert!(content.contains("Git Patch/Diff:\n+ patched line"));
        assert!(content.contains("Commit URL: https://example.com/commit/h1"));
    }

    #[test]
    fn test_report_notes_missing_diff() {
        let dir = TempDir::new().unwrap();
        let path = generate_report(&sample_table(""), &[], dir.path())
            .unwrap()
            .expect("report should be written");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("No diff information available for this commit"));
        assert!(!content.contains("Git Patch/Diff:"));
    }

    #[test]
    fn test_report_filename_carries_timestamp_prefix() {
        let dir = TempDir::new().unwrap();
        let path = generate_report(&sample_table(""), &[], dir.path())
            .unwrap()
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("git_patch_report_"));
        assert!(name.ends_with(".diff"));
    }
}
