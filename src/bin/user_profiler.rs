use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use yt_comment_search::export::write_json;
use yt_comment_search::profile::{UserDatabase, UserProfile, UserSortKey};
use yt_comment_search::render::{render_cross_video, render_profile, render_top_users};
use yt_comment_search::{CommentSearcher, Config, CorpusLoader};

#[derive(Parser)]
#[command(name = "user-profiler")]
#[command(about = "Profile YouTube users from downloaded comment files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory containing comment JSON files
    #[arg(short, long, default_value = "comment_sections")]
    dir: PathBuf,

    /// File name pattern of comment files
    #[arg(long)]
    pattern: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detailed profile of one user
    Profile {
        /// Exact author name (e.g., "@Username")
        user: String,
        /// Export the profile to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Most active users
    Top {
        /// Number of users to list
        limit: usize,
        #[arg(long, value_enum, default_value_t = UserSortKey::Comments)]
        sort_by: UserSortKey,
    },
    /// Users who commented on at least N videos
    CrossVideo {
        /// Minimum number of distinct videos
        min_videos: usize,
    },
    /// Corpus totals
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(config.output.color)
        .with_target(cli.verbose)
        .with_env_filter(if cli.verbose { "debug" } else { "info" })
        .init();

    if let Some(pattern) = cli.pattern {
        config.search.file_pattern = pattern;
    }
    config.validate()?;

    let loader = CorpusLoader::new(&cli.dir, &config.search.file_pattern)?;
    let searcher = CommentSearcher::load(&loader);
    if let Some(issue) = searcher.corpus_issue() {
        bail!("{}", issue);
    }

    let corpus = searcher.corpus();
    info!(
        "✓ Loaded {} comments from {} videos",
        corpus.total_comments(),
        corpus.file_count()
    );

    info!("Building user database...");
    let db = UserDatabase::build(corpus);
    info!("✓ Found {} unique users", db.len());

    match cli.command {
        Commands::Profile { user, output } => {
            let Some(record) = db.get(&user) else {
                println!("✗ User '{}' not found in collected comments", user);
                println!("\nDid you mean one of these similar usernames?");
                for name in db.suggestions(&user) {
                    println!("  - {}", name);
                }
                bail!("Unknown user: {}", user);
            };

            let profile = UserProfile::analyze(record, &config.profile);
            print!("{}", render_profile(&profile));

            if let Some(path) = output {
                write_json(&path, &profile)?;
                info!("✓ Profile exported to: {}", path.display());
            }
        }

        Commands::Top { limit, sort_by } => {
            let users = db.top_users(limit, sort_by);
            print!("{}", render_top_users(&users, sort_by));
        }

        Commands::CrossVideo { min_videos } => {
            let users = db.cross_video_users(min_videos);
            print!(
                "{}",
                render_cross_video(&users, min_videos, config.profile.cross_video_limit)
            );
        }

        Commands::Summary => {
            println!("📊 Corpus Summary:");
            println!("  Files: {}", corpus.file_count());
            println!("  Skipped files: {}", corpus.skipped_files.len());
            println!("  Videos: {}", db.video_count());
            println!("  Comments: {}", db.total_comments());
            println!("  Unique users: {}", db.len());
        }
    }

    Ok(())
}
