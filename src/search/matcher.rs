use crate::SearchError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::warn;

/// How keywords are tested against comment text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// At least one keyword is a substring
    #[default]
    Any,

    /// Every keyword is a substring
    All,

    /// Keywords joined by single spaces form one substring
    Phrase,

    /// First keyword is a regular expression
    Regex,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Any => "any",
            SearchMode::All => "all",
            SearchMode::Phrase => "phrase",
            SearchMode::Regex => "regex",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(SearchMode::Any),
            "all" => Ok(SearchMode::All),
            "phrase" => Ok(SearchMode::Phrase),
            "regex" => Ok(SearchMode::Regex),
            other => Err(SearchError::UnknownMode(other.to_string())),
        }
    }
}

/// Keyword set compiled for one query.
///
/// Matching folds a working copy of the text to lower case when the query is
/// case-insensitive; span extraction uses case-insensitive literal regexes so
/// every span is an exact slice of the original text.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    /// Trimmed, non-empty keywords as given
    keywords: Vec<String>,

    /// Keywords used for comparison (lower-cased unless case-sensitive)
    folded: Vec<String>,

    /// Folded keywords joined by single spaces
    phrase: String,

    mode: SearchMode,
    case_sensitive: bool,

    /// Patterns whose matches are reported as spans
    span_patterns: Vec<Regex>,

    /// Set when the regex-mode pattern failed to compile
    regex_error: Option<SearchError>,
}

impl KeywordMatcher {
    /// Compile a keyword set.
    ///
    /// Blank keywords are dropped; nothing left is [`SearchError::NoKeywords`].
    /// An invalid regex is logged once here and the matcher then matches
    /// nothing; see [`KeywordMatcher::regex_error`].
    pub fn new<S: AsRef<str>>(
        keywords: &[S],
        mode: SearchMode,
        case_sensitive: bool,
    ) -> Result<Self, SearchError> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        if keywords.is_empty() {
            return Err(SearchError::NoKeywords);
        }

        let folded: Vec<String> = if case_sensitive {
            keywords.clone()
        } else {
            keywords.iter().map(|k| k.to_lowercase()).collect()
        };
        let phrase = folded.join(" ");

        let mut regex_error = None;
        let span_patterns = match mode {
            SearchMode::Regex => match build_regex(&keywords[0], case_sensitive) {
                Ok(re) => vec![re],
                Err(e) => {
                    warn!("✗ Invalid regex pattern '{}': {}", keywords[0], e);
                    regex_error = Some(SearchError::InvalidRegex {
                        pattern: keywords[0].clone(),
                        message: e.to_string(),
                    });
                    Vec::new()
                }
            },
            SearchMode::Phrase => literal_patterns([keywords.join(" ")].iter(), case_sensitive),
            SearchMode::Any | SearchMode::All => literal_patterns(keywords.iter(), case_sensitive),
        };

        Ok(Self {
            keywords,
            folded,
            phrase,
            mode,
            case_sensitive,
            span_patterns,
            regex_error,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Why a regex-mode matcher matches nothing
    pub fn regex_error(&self) -> Option<&SearchError> {
        self.regex_error.as_ref()
    }

    /// Whether `text` satisfies the keyword set. Empty text never matches.
    pub fn is_match(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        if self.mode == SearchMode::Regex {
            return self.span_patterns.first().map_or(false, |re| re.is_match(text));
        }

        let haystack: Cow<'_, str> = if self.case_sensitive {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.to_lowercase())
        };

        match self.mode {
            SearchMode::Any => self.folded.iter().any(|k| haystack.contains(k.as_str())),
            SearchMode::All => self.folded.iter().all(|k| haystack.contains(k.as_str())),
            SearchMode::Phrase => haystack.contains(self.phrase.as_str()),
            SearchMode::Regex => false,
        }
    }

    /// Literal text of every match, collapsed by content.
    ///
    /// Two occurrences of the same text yield one entry, so a span set says
    /// what matched, not where.
    pub fn matched_spans(&self, text: &str) -> BTreeSet<String> {
        self.span_patterns
            .iter()
            .flat_map(|re| re.find_iter(text))
            .filter(|m| !m.as_str().is_empty())
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Sorted, disjoint byte ranges of every match in `text`
    pub fn match_ranges(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = self
            .span_patterns
            .iter()
            .flat_map(|re| re.find_iter(text))
            .filter(|m| m.start() < m.end())
            .map(|m| m.range())
            .collect();

        ranges.sort_by_key(|r| (r.start, r.end));

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        merged
    }
}

fn build_regex(pattern: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
}

fn literal_patterns<'k>(
    literals: impl Iterator<Item = &'k String>,
    case_sensitive: bool,
) -> Vec<Regex> {
    literals
        .filter_map(|literal| match build_regex(&regex::escape(literal), case_sensitive) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Cannot highlight '{}': {}", literal, e);
                None
            }
        })
        .collect()
}

/// One-shot form of [`KeywordMatcher::is_match`]
pub fn matches<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
    mode: SearchMode,
    case_sensitive: bool,
) -> bool {
    KeywordMatcher::new(keywords, mode, case_sensitive)
        .map(|matcher| matcher.is_match(text))
        .unwrap_or(false)
}

/// One-shot form of [`KeywordMatcher::matched_spans`]
pub fn matched_spans<S: AsRef<str>>(
    text: &str,
    keywords: &[S],
    mode: SearchMode,
    case_sensitive: bool,
) -> BTreeSet<String> {
    KeywordMatcher::new(keywords, mode, case_sensitive)
        .map(|matcher| matcher.matched_spans(text))
        .unwrap_or_default()
}
