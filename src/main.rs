use anyhow::Context;
use clap::Parser;
use commit_digest::{
    collect, commit_count, commit_rows, commit_table, cook, generate_report, hotspot,
    hotspot_table, FilterMode, FilterSpec, GitSource,
};
use env_logger::Env;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    version,
    about = "Aggregates Git commit history, filters it and surfaces file change hotspots",
    long_about = None
)]
struct Cli {
    /// Path to a Git repository (or a directory containing repositories)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Scan all subdirectories for Git repositories
    #[arg(short, long)]
    recursive: bool,

    /// Look back this many days of history
    #[arg(short, long, default_value_t = 7)]
    days: i64,

    /// Keep commits authored with this email (repeatable)
    #[arg(short, long = "email")]
    emails: Vec<String>,

    /// Keep commits authored under this user name (repeatable)
    #[arg(short, long = "user")]
    users: Vec<String>,

    /// Keep commits whose message or diff contains this keyword (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Filter combination mode (union or intersection)
    #[arg(short, long, default_value = "union")]
    mode: String,

    /// Output format for the commit list (table, json or csv)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Rank changed files into hotspot tiers
    #[arg(short = 's', long)]
    hotspot: bool,

    /// Write an aggregated patch/diff report file
    #[arg(short = 'g', long)]
    report: bool,

    /// Directory the report file is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Count only changed files matching these glob patterns
    #[arg(short = 'i', long = "include")]
    include_patterns: Vec<String>,

    /// Ignore changed files matching these glob patterns
    #[arg(short = 'x', long = "exclude")]
    exclude_patterns: Vec<String>,

    /// Include merge commits in the analysis
    #[arg(long, default_value_t = false)]
    include_merges: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// ログ出力を初期化する（RUST_LOGが設定されていればそちらを優先する）
fn init_log(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_log(cli.debug);

    let mode = match cli.mode.as_str() {
        "union" => FilterMode::Union,
        "intersection" => FilterMode::Intersection,
        _ => anyhow::bail!("Unsupported filter mode: {}", cli.mode),
    };

    let source = GitSource::discover(
        &cli.path,
        cli.recursive,
        cli.include_patterns.clone(),
        cli.exclude_patterns.clone(),
        cli.include_merges,
    )
    .context("Failed to discover Git repositories")?;

    let raw = collect(&source, cli.days);

    let spec = FilterSpec {
        emails: cli.emails.clone(),
        usernames: cli.users.clone(),
        keywords: cli.keywords.clone(),
        mode,
    };
    let cooked = cook(&raw, &spec);

    if commit_count(&cooked) == 0 {
        warn!("No commits survived filtering");
    } else {
        match cli.format.as_str() {
            "table" => println!("{}", commit_table(&cooked)),
            "json" => println!(
                "{}",
                serde_json::to_string_pretty(&cooked).context("Failed to serialize to JSON")?
            ),
            "csv" => {
                let mut wtr = csv::Writer::from_writer(std::io::stdout());
                for row in commit_rows(&cooked) {
                    wtr.serialize(row).context("Failed to write CSV record")?;
                }
                wtr.flush().context("Failed to flush CSV writer")?;
            }
            _ => anyhow::bail!("Unsupported output format: {}", cli.format),
        }
    }

    if cli.hotspot {
        let groups = hotspot(&cooked);
        if !groups.is_empty() {
            println!("{}", hotspot_table(&groups));
        }
    } else {
        info!("Hotspot analysis disabled. Use -s or --hotspot flag to enable.");
    }

    if cli.report {
        generate_report(&cooked, &cli.keywords, &cli.output_dir)
            .context("Failed to write patch/diff report")?;
    }

    Ok(())
}
