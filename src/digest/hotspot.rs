//! 変更頻度に基づくホットスポット分析を担当するモジュール
//!
//! cookedテーブル内の全コミットからファイルごとの変更回数を集計し、
//! 最大変更回数に対する割合で5段階のティアに分類します。最下位の閾値を
//! 下回ったファイルは結果から除外されます。固定の絶対値ではなく観測された
//! 最大値の割合を閾値とするため、活動量の異なるリポジトリでもそのまま
//! 分類が機能します。

use crate::digest::commit::CommitTable;
use indexmap::IndexMap;
use log::{info, warn};

/// 変更回数の相対値に基づく重大度ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Low = 1,
    Moderate,
    Elevated,
    High,
    Severe,
}

/// 変更回数をティアに分類します
///
/// 閾値は`max_count`の5/6、4/6、3/6、2/6、1/6で、上から順に最初に
/// 一致したティアが採用されます。
///
/// # 引数
///
/// - `count`: ファイルの変更回数
/// - `max_count`: 全ファイル中の最大変更回数
///
/// # 戻り値
///
/// 対応するティア。最下位の閾値を下回る場合は`None`
pub fn tier_for(count: u64, max_count: u64) -> Option<Tier> {
    let max = max_count as f64;
    let count = count as f64;

    if count >= max * 5.0 / 6.0 {
        Some(Tier::Severe)
    } else if count >= max * 4.0 / 6.0 {
        Some(Tier::High)
    } else if count >= max * 3.0 / 6.0 {
        Some(Tier::Elevated)
    } else if count >= max * 2.0 / 6.0 {
        Some(Tier::Moderate)
    } else if count >= max * 1.0 / 6.0 {
        Some(Tier::Low)
    } else {
        None
    }
}

/// ティア付けされたホットスポットファイル
///
/// # フィールド
///
/// - `path`: 変更されたファイルのパス
/// - `count`: cookedテーブル全体での変更回数
/// - `repo`: このパスを最初に変更したリポジトリの名前
/// - `tier`: 分類されたティア
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotEntry {
    pub path: String,
    pub count: u64,
    pub repo: String,
    pub tier: Tier,
}

/// `{リポジトリ名}/{トップレベルディレクトリ}`単位のグループ
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotGroup {
    pub key: String,
    pub entries: Vec<HotspotEntry>,
}

/// cookedテーブルからホットスポットのグループ一覧を生成します
///
/// # 戻り値
///
/// グループキーの辞書順に並んだグループのリスト。各グループ内の
/// エントリは変更回数の降順（同数の場合は最初に出現した順）です。
/// ティア対象のファイルが1つも無い場合は空のリストを返します。
pub fn hotspot(cooked: &CommitTable) -> Vec<HotspotGroup> {
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    let mut owners: IndexMap<String, String> = IndexMap::new();

    for (repo_name, commits) in cooked {
        for commit in commits.values() {
            for path in &commit.changed_files {
                *counts.entry(path.clone()).or_insert(0) += 1;
                // 最初にパスを変更したリポジトリを所有者として記録する
                owners
                    .entry(path.clone())
                    .or_insert_with(|| repo_name.clone());
            }
        }
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    let total: u64 = counts.values().sum();
    info!(
        "Hotspot analysis counted {} file changes across {} files",
        total,
        counts.len()
    );

    // 変更回数の降順に並べる（安定ソートなので同数は出現順を保つ）
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut groups: IndexMap<String, Vec<HotspotEntry>> = IndexMap::new();
    for (path, count) in ranked {
        let tier = match tier_for(count, max_count) {
            Some(tier) => tier,
            None => continue,
        };
        let repo = owners
            .get(&path)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        let key = format!("{}/{}", repo, top_level_dir(&path));
        groups.entry(key).or_default().push(HotspotEntry {
            path,
            count,
            repo,
            tier,
        });
    }

    if groups.is_empty() {
        warn!("No qualifying files found in hotspot analysis");
        return Vec::new();
    }

    groups.sort_keys();
    groups
        .into_iter()
        .map(|(key, entries)| HotspotGroup { key, entries })
        .collect()
}

/// パスの先頭セグメントを返します（区切りが無い場合は`root`）
fn top_level_dir(path: &str) -> &str {
    match path.split_once('/') {
        Some((dir, _)) => dir,
        None => "root",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::commit::{CommitRecord, RepoCommits};

    fn commit_touching(hash: &str, files: &[&str]) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            author_name: "Alice".to_string(),
            author_email: "a@x.com".to_string(),
            summary: String::new(),
            message: String::new(),
            diff_text: String::new(),
            changed_files: files.iter().map(|f| f.to_string()).collect(),
            date: String::new(),
            url: None,
        }
    }

    fn table(repos: &[(&str, &[(&str, &[&str])])]) -> CommitTable {
        let mut table = CommitTable::new();
        for (repo, commits) in repos {
            let mut map = RepoCommits::new();
            for (hash, files) in *commits {
                map.insert(hash.to_string(), commit_touching(hash, files));
            }
            table.insert(repo.to_string(), map);
        }
        table
    }

    #[test]
    fn test_tier_boundaries_at_max_12() {
        assert_eq!(tier_for(12, 12), Some(Tier::Severe));
        assert_eq!(tier_for(10, 12), Some(Tier::Severe));
        assert_eq!(tier_for(9, 12), Some(Tier::High));
        assert_eq!(tier_for(8, 12), Some(Tier::High));
        assert_eq!(tier_for(6, 12), Some(Tier::Elevated));
        assert_eq!(tier_for(4, 12), Some(Tier::Moderate));
        assert_eq!(tier_for(2, 12), Some(Tier::Low));
        assert_eq!(tier_for(1, 12), None);
    }

    #[test]
    fn test_tier_is_monotonic_in_count() {
        for max in [1u64, 2, 5, 12, 100] {
            for a in 1..=max {
                for b in 1..a {
                    // count(a) > count(b) なら tier(a) >= tier(b)
                    assert!(tier_for(a, max) >= tier_for(b, max));
                }
            }
        }
    }

    #[test]
    fn test_single_file_is_always_top_tier() {
        assert_eq!(tier_for(1, 1), Some(Tier::Severe));
    }

    #[test]
    fn test_two_file_scenario() {
        // src/a.py は2回、docs/readme.md は1回変更される
        let cooked = table(&[(
            "repoA",
            &[
                ("h1", &["src/a.py"] as &[&str]),
                ("h2", &["src/a.py", "docs/readme.md"]),
            ],
        )]);

        let groups = hotspot(&cooked);
        assert_eq!(groups.len(), 2);

        // グループはキーの辞書順（docsがsrcより先）
        assert_eq!(groups[0].key, "repoA/docs");
        assert_eq!(groups[0].entries[0].path, "docs/readme.md");
        assert_eq!(groups[0].entries[0].count, 1);
        assert_eq!(groups[0].entries[0].tier, Tier::Elevated);

        assert_eq!(groups[1].key, "repoA/src");
        assert_eq!(groups[1].entries[0].path, "src/a.py");
        assert_eq!(groups[1].entries[0].count, 2);
        assert_eq!(groups[1].entries[0].tier, Tier::Severe);
    }

    #[test]
    fn test_first_seen_repository_owns_path() {
        let cooked = table(&[
            ("repoA", &[("h1", &["src/shared.c"] as &[&str])]),
            ("repoB", &[("h2", &["src/shared.c"] as &[&str])]),
        ]);

        let groups = hotspot(&cooked);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "repoA/src");
        assert_eq!(groups[0].entries[0].count, 2);
        assert_eq!(groups[0].entries[0].repo, "repoA");
    }

    #[test]
    fn test_path_without_separator_groups_under_root() {
        let cooked = table(&[("repoA", &[("h1", &["README.md"] as &[&str])])]);

        let groups = hotspot(&cooked);
        assert_eq!(groups[0].key, "repoA/root");
    }

    #[test]
    fn test_files_below_threshold_are_dropped() {
        // hot.rs を12回変更、cold.rs を1回だけ変更
        let hashes: Vec<String> = (0..12).map(|i| format!("h{}", i)).collect();
        let mut commits: Vec<(&str, &[&str])> = hashes
            .iter()
            .map(|hash| (hash.as_str(), &["src/hot.rs"] as &[&str]))
            .collect();
        commits.push(("hc", &["src/cold.rs"]));

        let cooked = table(&[("repoA", commits.as_slice())]);
        let groups = hotspot(&cooked);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(groups[0].entries[0].path, "src/hot.rs");
    }

    #[test]
    fn test_entries_sorted_by_count_descending() {
        let cooked = table(&[(
            "repoA",
            &[
                ("h1", &["src/a.rs", "src/b.rs"] as &[&str]),
                ("h2", &["src/b.rs"]),
                ("h3", &["src/b.rs", "src/c.rs"]),
            ],
        )]);

        let groups = hotspot(&cooked);
        assert_eq!(groups.len(), 1);
        let counts: Vec<u64> = groups[0].entries.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![3, 1, 1]);
        // 同数のファイルは最初に出現した順
        assert_eq!(groups[0].entries[1].path, "src/a.rs");
        assert_eq!(groups[0].entries[2].path, "src/c.rs");
    }

    #[test]
    fn test_empty_table_yields_no_groups() {
        assert!(hotspot(&CommitTable::new()).is_empty());
    }
}
