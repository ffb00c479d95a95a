//! Free-text command argument grammar.
//!
//! Commands follow one convention: a leading quoted or bare title, then
//! zero or more `--key value` pairs. A value runs from its key to the next
//! `--key` token or the end of the string; surrounding quotes are stripped.
//! Unknown `--key` tokens are parsed and kept but ignored by every handler
//! — forward-compatible and typo-silent, which is the documented contract.

use thiserror::Error;

/// Errors produced while interpreting command arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The report timeframe token was not one of `week`, `month`, `year`.
    #[error("unrecognized timeframe '{0}' (expected week, month, or year)")]
    UnknownTimeframe(String),
}

/// Parsed form of a command's argument string: a title plus `--key value` flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    title: Option<String>,
    flags: Vec<(String, String)>,
}

impl CommandArgs {
    /// Parses an argument string.
    ///
    /// Never fails: malformed input degrades to an empty title and no
    /// flags. A bare `--` word is treated as literal text, not a flag.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut title_words: Vec<&str> = Vec::new();
        let mut flags: Vec<(String, String)> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for word in input.split_whitespace() {
            match word.strip_prefix("--").filter(|key| !key.is_empty()) {
                Some(key) => {
                    if let Some((name, value_words)) = current.take() {
                        flags.push((name, strip_quotes(&value_words.join(" ")).to_string()));
                    }
                    current = Some((key.to_lowercase(), Vec::new()));
                }
                None => {
                    if let Some((_, value_words)) = current.as_mut() {
                        value_words.push(word);
                    } else {
                        title_words.push(word);
                    }
                }
            }
        }
        if let Some((name, value_words)) = current.take() {
            flags.push((name, strip_quotes(&value_words.join(" ")).to_string()));
        }

        let title = if title_words.is_empty() {
            None
        } else {
            Some(strip_quotes(&title_words.join(" ")).to_string())
        };
        Self { title, flags }
    }

    /// The leading title text, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The first value given for `key` (case-insensitive), if any.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<&str> {
        self.flags
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// All parsed flags in argument order, unknown keys included.
    pub fn flags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Strips one pair of matching surrounding quotes (`"` or `'`).
fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Selector for `tasklist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    /// No argument: the invoker's own tasks.
    Own,
    /// Every task in the store.
    All,
    /// Completed tasks only.
    Done,
    /// Open tasks only.
    Pending,
    /// Tasks belonging to the named team.
    Team(String),
    /// Case-insensitive substring match against task names.
    Search(String),
}

impl ListFilter {
    /// Parses a filter token. Never fails: anything unrecognized becomes
    /// a substring search, and an empty argument selects the invoker's
    /// own tasks.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        let arg = arg.trim();
        if arg.is_empty() {
            return Self::Own;
        }
        if let Some(name) = arg.strip_prefix("team:") {
            return Self::Team(name.to_string());
        }
        match arg.to_lowercase().as_str() {
            "all" => Self::All,
            "done" => Self::Done,
            "pending" => Self::Pending,
            _ => Self::Search(arg.to_string()),
        }
    }
}

/// Trailing time window for `taskchart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
    /// The last 365 days.
    Year,
}

impl Timeframe {
    /// Parses an optional timeframe token. Empty input means "all time".
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownTimeframe`] for any other token.
    pub fn parse(arg: &str) -> Result<Option<Self>, ParseError> {
        match arg.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "week" => Ok(Some(Self::Week)),
            "month" => Ok(Some(Self::Month)),
            "year" => Ok(Some(Self::Year)),
            other => Err(ParseError::UnknownTimeframe(other.to_string())),
        }
    }

    /// The window length in days.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}
