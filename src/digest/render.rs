//! cookedコミットとホットスポットのテーブル描画を担当するモジュール
//!
//! ティア分類そのものは表示に依存しない純粋な処理なので、色付けや
//! グループキーの省略といった見た目の処理はすべてここに集約されています。

use crate::digest::commit::CommitTable;
use crate::digest::hotspot::{HotspotGroup, Tier};
use console::Style;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify};
use tabled::{Table, Tabled};

/// コミット一覧テーブルの1行（CSV出力のレコードとしても使う）
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CommitRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Repository")]
    pub repository: String,
    #[tabled(rename = "Commit ID")]
    pub commit: String,
    #[tabled(rename = "Commit Summary")]
    pub summary: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "URL")]
    pub url: String,
    #[tabled(rename = "Date")]
    pub date: String,
}

/// cookedテーブルを表示用の行に変換します
///
/// 行番号はリポジトリをまたいで1から連番になります。
pub fn commit_rows(cooked: &CommitTable) -> Vec<CommitRow> {
    let mut rows = Vec::new();
    for (repo_name, commits) in cooked {
        for (hash, commit) in commits {
            rows.push(CommitRow {
                index: rows.len() + 1,
                repository: repo_name.clone(),
                commit: hash.get(..7).unwrap_or(hash).to_string(),
                summary: commit.summary.clone(),
                email: commit.author_email.clone(),
                url: commit.url.clone().unwrap_or_default(),
                date: commit.date.clone(),
            });
        }
    }
    rows
}

/// コミット一覧のテーブルを組み立てます
pub fn commit_table(cooked: &CommitTable) -> Table {
    let mut table = Table::new(commit_rows(cooked));
    table.with(Modify::new(Columns::single(0)).with(Alignment::right()));
    table.with(Modify::new(Columns::last()).with(Alignment::right()));
    table
}

/// ホットスポットテーブルの1行
#[derive(Debug, Clone, Tabled)]
pub struct HotspotRow {
    #[tabled(rename = "Directory")]
    pub directory: String,
    #[tabled(rename = "File")]
    pub file: String,
    #[tabled(rename = "Changes")]
    pub changes: String,
}

fn tier_style(tier: Tier) -> Style {
    match tier {
        Tier::Severe => Style::new().magenta(),
        Tier::High => Style::new().red(),
        Tier::Elevated => Style::new().red().bright(),
        Tier::Moderate => Style::new().yellow(),
        Tier::Low => Style::new().yellow().bright(),
    }
}

/// ホットスポットのグループを表示用の行に変換します
///
/// 各グループの先頭行のみグループキーを表示し、グループの間には
/// 区切り行を挿入します。行はティアに応じて色付けされます。
pub fn hotspot_rows(groups: &[HotspotGroup]) -> Vec<HotspotRow> {
    // 区切り行の幅を揃えるため、列ごとの最大幅を先に求める
    let dir_width = groups.iter().map(|g| g.key.len()).max().unwrap_or(0);
    let file_width = groups
        .iter()
        .flat_map(|g| &g.entries)
        .map(|e| e.path.len())
        .max()
        .unwrap_or(0);
    const COUNT_WIDTH: usize = 10;

    let mut rows = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            rows.push(HotspotRow {
                directory: "-".repeat(dir_width),
                file: "-".repeat(file_width),
                changes: "-".repeat(COUNT_WIDTH),
            });
        }
        for (j, entry) in group.entries.iter().enumerate() {
            let style = tier_style(entry.tier);
            let directory = if j == 0 {
                style.apply_to(&group.key).to_string()
            } else {
                String::new()
            };
            rows.push(HotspotRow {
                directory,
                file: style.apply_to(&entry.path).to_string(),
                changes: style.apply_to(entry.count).to_string(),
            });
        }
    }
    rows
}

/// ホットスポットのテーブルを組み立てます
pub fn hotspot_table(groups: &[HotspotGroup]) -> Table {
    let mut table = Table::new(hotspot_rows(groups));
    table.with(Modify::new(Columns::last()).with(Alignment::right()));
    table
}
