use anyhow::{anyhow, Context, Result};
use comment_core::{CorpusLoader, DEFAULT_FILE_PATTERN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ranking::SortKey;
use crate::render::RenderOptions;
use crate::search::matcher::SearchMode;
use crate::search::SearchQuery;

/// Configuration for comment search and profiling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Query defaults and corpus selection
    pub search: SearchConfig,

    /// Rendering and export settings
    pub output: OutputConfig,

    /// User profiler settings
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Glob matched against corpus file names
    pub file_pattern: String,

    /// Match mode used when none is given
    pub default_mode: SearchMode,

    /// Result ordering used when none is given
    pub sort_by: SortKey,

    pub case_sensitive: bool,

    /// Minimum likes for a comment to be considered
    pub min_likes: u64,

    /// Result cap (unset = no limit)
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where exports are written
    pub results_dir: PathBuf,

    /// Write a JSON export after every run
    pub save_results: bool,

    /// ANSI colors in terminal output
    pub color: bool,

    /// Mark matched text in listings
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Words never reported as top keywords
    pub stop_words: Vec<String>,

    /// Shorter words are ignored for keyword counting
    pub min_word_length: usize,

    /// Number of top keywords reported per user
    pub top_keywords: usize,

    /// Cross-video users listed at most
    pub cross_video_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            default_mode: SearchMode::Any,
            sort_by: SortKey::Relevance,
            case_sensitive: false,
            min_likes: 0,
            max_results: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("search_results"),
            save_results: true,
            color: true,
            highlight: true,
        }
    }
}

const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "was", "are", "were", "be", "been", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "this", "that", "these", "those", "i", "you", "he", "she", "it",
    "we", "they", "what", "which", "who", "when", "where", "why", "how",
];

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_word_length: 3,
            top_keywords: 10,
            cross_video_limit: 50,
        }
    }
}

const CONFIG_PATHS: &[&str] = &["comment-search.toml", "config/comment-search.toml"];

impl Config {
    /// Load configuration from the first readable config file, else defaults,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = None;

        for path in CONFIG_PATHS {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(loaded) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config = Some(loaded);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Defaults with environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from environment variables looked up through `var`
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pattern) = var("COMMENT_SEARCH_DIR_PATTERN") {
            self.search.file_pattern = pattern;
        }

        if let Some(results_dir) = var("COMMENT_SEARCH_RESULTS_DIR") {
            self.output.results_dir = PathBuf::from(results_dir);
        }

        // NO_COLOR disables color whenever it is set, whatever its value
        if var("NO_COLOR").is_some() {
            self.output.color = false;
        }

        if let Some(no_color) = var("COMMENT_SEARCH_NO_COLOR") {
            if matches!(no_color.to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
                self.output.color = false;
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.file_pattern.trim().is_empty() {
            return Err(anyhow!("file_pattern must not be empty"));
        }

        CorpusLoader::new(".", &self.search.file_pattern)
            .map_err(|e| anyhow!("Invalid file_pattern: {}", e))?;

        if self.output.results_dir.as_os_str().is_empty() {
            return Err(anyhow!("results_dir must not be empty"));
        }

        if self.profile.top_keywords == 0 {
            return Err(anyhow!("top_keywords must be greater than 0"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Query carrying the configured defaults
    pub fn base_query(&self, keywords: Vec<String>) -> SearchQuery {
        SearchQuery {
            keywords,
            mode: self.search.default_mode,
            case_sensitive: self.search.case_sensitive,
            min_likes: self.search.min_likes,
            max_results: self.search.max_results,
            sort_by: self.search.sort_by,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            color: self.output.color,
            highlight: self.output.highlight,
        }
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Comment Search Configuration:\n\
            - File Pattern: {}\n\
            - Default Mode: {}\n\
            - Sort By: {}\n\
            - Min Likes: {}\n\
            - Max Results: {}\n\
            - Results Directory: {}\n\
            - Save Results: {}\n\
            - Color: {}",
            self.search.file_pattern,
            self.search.default_mode,
            self.search.sort_by,
            self.search.min_likes,
            self.search
                .max_results
                .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
            self.output.results_dir.display(),
            self.output.save_results,
            self.output.color
        )
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.search.file_pattern = pattern.into();
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.config.search.default_mode = mode;
        self
    }

    pub fn with_sort(mut self, sort_by: SortKey) -> Self {
        self.config.search.sort_by = sort_by;
        self
    }

    pub fn with_min_likes(mut self, min_likes: u64) -> Self {
        self.config.search.min_likes = min_likes;
        self
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.config.search.max_results = max_results;
        self
    }

    pub fn with_results_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.results_dir = dir;
        self
    }

    pub fn case_sensitive(mut self, enable: bool) -> Self {
        self.config.search.case_sensitive = enable;
        self
    }

    pub fn enable_color(mut self, enable: bool) -> Self {
        self.config.output.color = enable;
        self
    }

    pub fn enable_highlight(mut self, enable: bool) -> Self {
        self.config.output.highlight = enable;
        self
    }

    pub fn enable_save(mut self, enable: bool) -> Self {
        self.config.output.save_results = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
