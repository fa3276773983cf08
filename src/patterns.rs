//! Channel selection by shell-style glob patterns
//!
//! Selection happens once, at startup: discovered channel names are filtered
//! against a compiled pattern set. A name is selected if it matches *any*
//! pattern; the discovered order is preserved (no re-sort). An empty
//! user-supplied pattern list falls back to [`DEFAULT_PATTERNS`].

use glob::{Pattern, PatternError};

/// Patterns applied when the caller supplies none
///
/// Matches the channel vocabulary served by `sampler-agent`; anything beyond
/// this is opt-in via explicit patterns.
pub const DEFAULT_PATTERNS: &[&str] = &["cpu.*", "mem.*", "load.*"];

/// A compiled, ordered set of glob patterns
///
/// Matching uses shell-glob semantics (`*` any run of characters, `?` one
/// character, `[...]` a character class). Order is irrelevant to the result
/// since any match selects the name.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile the given pattern sources; an empty slice compiles
    /// [`DEFAULT_PATTERNS`] instead
    ///
    /// A malformed glob is a hard error: silently skipping it would
    /// mis-select channels for the whole run.
    pub fn compile(sources: &[String]) -> Result<Self, PatternError> {
        if sources.is_empty() {
            Self::from_sources(DEFAULT_PATTERNS.iter().copied())
        } else {
            Self::from_sources(sources.iter().map(String::as_str))
        }
    }

    fn from_sources<'a>(sources: impl Iterator<Item = &'a str>) -> Result<Self, PatternError> {
        let patterns = sources.map(Pattern::new).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern in the set matches the given name
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(name))
    }

    /// The compiled pattern sources, in insertion order (for diagnostics)
    pub fn sources(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.to_string()).collect()
    }
}

/// Filter discovered channel names against a pattern set
///
/// Returns exactly the subset of `discovered` matched by at least one
/// pattern, in the original order. Zero matches is a valid outcome, not an
/// error: the loop then runs with nothing to poll.
pub fn select(discovered: &[String], set: &PatternSet) -> Vec<String> {
    discovered
        .iter()
        .filter(|name| set.matches(name))
        .cloned()
        .collect()
}
