use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing::info;

use yt_comment_search::authors::AuthorRollup;
use yt_comment_search::export::{save_results, write_json, ActiveUsersExport, ExportNaming};
use yt_comment_search::render::{
    render_author_stats, render_most_active, render_results, render_suggestions,
    render_user_header,
};
use yt_comment_search::{
    CommentSearcher, Config, CorpusLoader, SearchError, SearchMode, SearchQuery, SearchResult,
    SortKey,
};

const APP_NAME: &str = "YouTube Comment Search";

fn cli() -> Command {
    Command::new("comment-search")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Search downloaded YouTube comments for keywords and patterns")
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("DIR")
                .help("Directory containing comment JSON files")
                .required(true),
        )
        .arg(
            Arg::new("keywords")
                .value_name("KEYWORDS")
                .help("Keywords to search for")
                .num_args(0..),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Match mode")
                .value_parser(["any", "all", "phrase", "regex"]),
        )
        .arg(
            Arg::new("case-sensitive")
                .long("case-sensitive")
                .help("Case-sensitive matching")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("min-likes")
                .long("min-likes")
                .value_name("N")
                .help("Only consider comments with at least N likes")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-results")
                .short('n')
                .long("max-results")
                .value_name("N")
                .help("Maximum number of results to show")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_name("KEY")
                .help("Sort results by")
                .value_parser(["relevance", "likes", "date"]),
        )
        .arg(
            Arg::new("most-active")
                .long("most-active")
                .value_name("N")
                .help("Show the N most active users (with keywords: search their comments)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .value_name("NAME")
                .help("Extract all comments from a specific user")
                .conflicts_with("most-active"),
        )
        .arg(
            Arg::new("no-highlight")
                .long("no-highlight")
                .help("Disable match highlighting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable ANSI colors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-save")
                .long("no-save")
                .help("Do not write a JSON export")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show author statistics for the results")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .value_name("GLOB")
                .help("File name pattern of comment files"),
        )
        .arg(
            Arg::new("results-dir")
                .long("results-dir")
                .value_name("DIR")
                .help("Directory for JSON exports"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue),
        )
}

fn init_logging(verbose: bool, color: bool) {
    if verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(color)
            .with_target(true)
            .with_env_filter("debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(color)
            .with_target(false)
            .with_env_filter("yt_comment_search=info,comment_core=info,warn")
            .init();
    }
}

/// Config file and environment, then command-line flags on top
fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load()?,
    };

    if let Some(pattern) = matches.get_one::<String>("pattern") {
        config.search.file_pattern = pattern.clone();
    }
    if let Some(dir) = matches.get_one::<String>("results-dir") {
        config.output.results_dir = PathBuf::from(dir);
    }
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.search.default_mode = mode.parse::<SearchMode>()?;
    }
    if let Some(sort) = matches.get_one::<String>("sort") {
        config.search.sort_by = sort.parse::<SortKey>()?;
    }
    if let Some(&min_likes) = matches.get_one::<u64>("min-likes") {
        config.search.min_likes = min_likes;
    }
    if let Some(&max_results) = matches.get_one::<usize>("max-results") {
        config.search.max_results = Some(max_results);
    }
    if matches.get_flag("case-sensitive") {
        config.search.case_sensitive = true;
    }
    if matches.get_flag("no-highlight") {
        config.output.highlight = false;
    }
    if matches.get_flag("no-color") {
        config.output.color = false;
    }
    if matches.get_flag("no-save") {
        config.output.save_results = false;
    }

    config.validate()?;
    Ok(config)
}

fn print_banner() {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("{:^60}", APP_NAME);
    println!("{}\n", rule);
}

fn print_issue(issue: &SearchError) {
    println!("✗ {}", issue);
}

/// A missing directory is an error; an empty corpus is reported and ends the run
fn corpus_ready(searcher: &CommentSearcher) -> Result<bool> {
    match searcher.corpus_issue() {
        Some(issue @ SearchError::MissingDirectory(_)) => bail!("{}", issue),
        Some(issue) => {
            print_issue(issue);
            Ok(false)
        }
        None => Ok(true),
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    init_logging(matches.get_flag("verbose"), config.output.color);

    let options = config.render_options();
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");

    let dir = PathBuf::from(
        matches
            .get_one::<String>("dir")
            .context("--dir is required")?,
    );
    let keywords: Vec<String> = matches
        .get_many::<String>("keywords")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let query = config.base_query(keywords);

    print_banner();

    if !dir.is_dir() {
        bail!("Directory not found: {}", dir.display());
    }

    info!("📁 Search directory: {}", dir.display());
    let loader = CorpusLoader::new(&dir, &config.search.file_pattern)?;
    let searcher = CommentSearcher::load(&loader);
    if !corpus_ready(&searcher)? {
        return Ok(());
    }
    info!(
        "✓ Loaded {} comments from {} file(s)",
        searcher.corpus().total_comments(),
        searcher.corpus().file_count()
    );

    let naming = ExportNaming::new(config.output.results_dir.clone(), &dir);
    let save = config.output.save_results;

    if let Some(&top_n) = matches.get_one::<usize>("most-active") {
        let rollup = searcher.author_rollup();
        let top = rollup.top(top_n);
        print!("{}", render_most_active(&top, options));

        if query.has_keywords() {
            let combined = rollup.most_active_comments(top_n, &query);
            if let Some(issue) = &combined.issue {
                print_issue(issue);
            }
            print!("{}", render_results(&combined.results, options));
            show_stats(&matches, &combined.results);

            if save {
                let path = match top.as_slice() {
                    [only] if top_n == 1 => naming.most_active_user(only.author),
                    _ => naming.most_active(top_n),
                };
                save_results(&path, &command_line, &combined.results, None)?;
            }
        } else if save {
            let export = ActiveUsersExport::new(&command_line, &top);
            write_json(&naming.most_active(top_n), &export)?;
        }

        return Ok(());
    }

    if let Some(username) = matches.get_one::<String>("user") {
        let extraction = searcher.extract_user_comments(username, &query);

        match (&extraction.summary, &extraction.issue) {
            (None, Some(SearchError::UnknownAuthor { suggestions, .. })) => {
                print!("{}", render_suggestions(username, suggestions));
                return Ok(());
            }
            (Some(summary), issue) => {
                print!("{}", render_user_header(summary, options));
                if let Some(issue) = issue {
                    print_issue(issue);
                }
            }
            (None, issue) => {
                if let Some(issue) = issue {
                    print_issue(issue);
                }
            }
        }

        print!("{}", render_results(&extraction.results, options));
        show_stats(&matches, &extraction.results);

        if save {
            save_results(
                &naming.user(username),
                &command_line,
                &extraction.results,
                Some(username),
            )?;
        }

        return Ok(());
    }

    if !query.has_keywords() {
        bail!(
            "Keywords are required for regular search. \
             Use --most-active to find active users, or --user to extract user comments"
        );
    }

    let outcome = searcher.search(&query);
    if let Some(issue) = &outcome.issue {
        print_issue(issue);
    }
    if outcome.total_matches > outcome.results.len() {
        info!(
            "Showing {} of {} matches",
            outcome.results.len(),
            outcome.total_matches
        );
    }

    print!("{}", render_results(&outcome.results, options));
    show_stats(&matches, &outcome.results);

    if save {
        save_results(&naming.search(), &command_line, &outcome.results, None)?;
    }

    Ok(())
}

fn show_stats(matches: &ArgMatches, results: &[SearchResult<'_>]) {
    if matches.get_flag("stats") && !results.is_empty() {
        print!("{}", render_author_stats(&AuthorRollup::from_results(results)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn searcher_for(dir: &Path) -> CommentSearcher {
        CommentSearcher::load(&CorpusLoader::with_default_pattern(dir).unwrap())
    }

    #[test]
    fn test_no_color_flag_reaches_config() {
        let matches = cli()
            .try_get_matches_from(["comment-search", "-d", "corpus", "--no-color", "butler"])
            .unwrap();
        let config = load_config(&matches).unwrap();
        assert!(!config.output.color);
    }

    #[test]
    fn test_corpus_without_files_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!corpus_ready(&searcher_for(temp_dir.path())).unwrap());

        fs::write(temp_dir.path().join("notes.txt"), "not comments").unwrap();
        assert!(!corpus_ready(&searcher_for(temp_dir.path())).unwrap());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(corpus_ready(&searcher_for(&temp_dir.path().join("gone"))).is_err());
    }

    #[test]
    fn test_loaded_corpus_is_ready() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("vid.comments.json"), r#"[{"text": "hi"}]"#).unwrap();
        assert!(corpus_ready(&searcher_for(temp_dir.path())).unwrap());
    }
}
