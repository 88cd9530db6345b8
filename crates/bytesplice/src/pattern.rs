//! # Split Patterns
//! This module provides mechanisms to mix `regex` and `fancy_regex` types.
//!
//! Word-split patterns in the GPT-2 family use negative lookahead (`\s+(?!\S)`),
//! which the `regex` crate does not support; those compile under `fancy_regex`.
//! Patterns without lookahead run on the faster `regex` engine.

use core::fmt::Debug;

use crate::errors::{BSResult, BytespliceError};

/// Joins a sequence of string literals with a separator, at compile time.
///
/// ```
/// use bytesplice::join_strs;
///
/// let result = join_strs!("+", ("a", "b", "c"));
/// assert_eq!(result, "a+b+c");
///
/// // Concatenating a single string literal without a separator
/// let result = join_strs!(";", ("OnlyOne"));
/// assert_eq!(result, "OnlyOne");
/// ```
#[macro_export]
macro_rules! join_strs {
    ($sep:literal, ($first:literal $(, $rest:literal)* $(,)?)) => {
        concat!($first $(, $sep, $rest)*)
    };
}

/// An extension of [`join_strs!()`] which uses the "|" as the separator.
#[macro_export]
macro_rules! join_patterns {
    ($($e:expr),* $(,)?) => { $crate::join_strs!("|", ($($e),*)) };
}

/// The GPT-2 word-split pattern.
///
/// Matches contraction suffixes, letter runs, digit runs, and punctuation runs,
/// each with an optional leading space; trailing whitespace folds into the next
/// word via the `\s+(?!\S)` lookahead alternative.
pub const GPT2_SPLIT_PATTERN: ConstSplitPattern = ConstSplitPattern::Fancy(join_patterns!(
    r"'s",
    r"'t",
    r"'re",
    r"'ve",
    r"'m",
    r"'ll",
    r"'d",
    r" ?\p{L}+",
    r" ?\p{N}+",
    r" ?[^\s\p{L}\p{N}]+",
    r"\s+(?!\S)",
    r"\s+",
));

/// Const Split Pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConstSplitPattern {
    /// This is a pattern for the `regex` crate.
    Basic(&'static str),

    /// This is a pattern for the `fancy_regex` crate.
    Fancy(&'static str),
}

impl ConstSplitPattern {
    /// Get the underlying regex pattern.
    ///
    /// ## Returns
    /// The regex pattern string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(pattern) => pattern,
            Self::Fancy(pattern) => pattern,
        }
    }

    /// Convert to [`SplitPattern`]
    ///
    /// ## Returns
    /// A new `SplitPattern` instance.
    pub fn to_pattern(self) -> SplitPattern {
        self.into()
    }

    /// Compile the regex pattern into a `SplitRegex`.
    ///
    /// ## Returns
    /// A `Result` containing the compiled `SplitRegex`.
    pub fn compile(&self) -> BSResult<SplitRegex> {
        SplitPattern::from(*self).compile()
    }
}

impl From<ConstSplitPattern> for SplitPattern {
    fn from(pattern: ConstSplitPattern) -> Self {
        use ConstSplitPattern::*;
        match pattern {
            Basic(pattern) => SplitPattern::Basic(pattern.to_string()),
            Fancy(pattern) => SplitPattern::Fancy(pattern.to_string()),
        }
    }
}

/// Label for split patterns.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SplitPattern {
    /// This is a pattern for the `regex` crate.
    Basic(String),

    /// This is a pattern for the `fancy_regex` crate.
    Fancy(String),

    /// This pattern will try the `regex` crate first,
    /// and fallback to `fancy_regex` if it fails.
    Adaptive(String),
}

impl<S: AsRef<str>> From<S> for SplitPattern {
    fn from(pattern: S) -> Self {
        Self::Adaptive(pattern.as_ref().to_string())
    }
}

impl SplitPattern {
    /// Get the underlying regex pattern.
    ///
    /// ## Returns
    /// The regex pattern string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(pattern) => pattern,
            Self::Fancy(pattern) => pattern,
            Self::Adaptive(pattern) => pattern,
        }
    }

    /// Compile the regex pattern into a `SplitRegex`.
    ///
    /// ## Returns
    /// A `Result` containing the compiled `SplitRegex`.
    pub fn compile(&self) -> BSResult<SplitRegex> {
        match self {
            Self::Basic(pattern) => regex::Regex::new(pattern)
                .map(SplitRegex::from)
                .map_err(|err| BytespliceError::Pattern(err.to_string())),
            Self::Fancy(pattern) => fancy_regex::Regex::new(pattern)
                .map(SplitRegex::from)
                .map_err(|err| BytespliceError::Pattern(err.to_string())),
            Self::Adaptive(pattern) => regex::Regex::new(pattern)
                .map(SplitRegex::from)
                .or_else(|_| {
                    fancy_regex::Regex::new(pattern)
                        .map(SplitRegex::from)
                        .map_err(|err| BytespliceError::Pattern(err.to_string()))
                }),
        }
    }
}

/// Compiled wrapper over the two regex engines.
#[derive(Debug, Clone)]
pub enum SplitRegex {
    /// Wrapper for `regex::Regex`.
    Basic(regex::Regex),

    /// Wrapper for `fancy_regex::Regex`.
    Fancy(fancy_regex::Regex),
}

impl From<regex::Regex> for SplitRegex {
    fn from(regex: regex::Regex) -> Self {
        Self::Basic(regex)
    }
}

impl From<fancy_regex::Regex> for SplitRegex {
    fn from(regex: fancy_regex::Regex) -> Self {
        Self::Fancy(regex)
    }
}

impl SplitRegex {
    /// Is this `Basic`?
    ///
    /// ## Returns
    /// `true` if it wraps a `regex::Regex`, `false` otherwise.
    pub fn is_basic(&self) -> bool {
        match self {
            Self::Basic(_) => true,
            Self::Fancy(_) => false,
        }
    }

    /// Is this `Fancy`?
    ///
    /// ## Returns
    /// `true` if it wraps a `fancy_regex::Regex`, `false` otherwise.
    pub fn is_fancy(&self) -> bool {
        match self {
            Self::Basic(_) => false,
            Self::Fancy(_) => true,
        }
    }

    /// Get the underlying regex pattern.
    ///
    /// ## Returns
    /// The regex pattern string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(regex) => regex.as_str(),
            Self::Fancy(regex) => regex.as_str(),
        }
    }

    /// Iterate over the byte ranges of non-overlapping matches.
    ///
    /// `fancy_regex` can fail mid-stream (backtracking limits); a failure is
    /// logged and ends the iteration, leaving the remainder unmatched.
    ///
    /// ## Arguments
    /// * `haystack` - The string to search in.
    ///
    /// ## Returns
    /// A `MatchSpans` iterator over `(start, end)` byte ranges.
    pub fn find_spans<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> MatchSpans<'r, 'h> {
        match self {
            Self::Basic(regex) => regex.find_iter(haystack).into(),
            Self::Fancy(regex) => regex.find_iter(haystack).into(),
        }
    }
}

/// Wrapper for match streams from either regex engine.
pub enum MatchSpans<'r, 'h> {
    /// Wrapper for `regex::Matches`.
    Basic(regex::Matches<'r, 'h>),

    /// Wrapper for `fancy_regex::Matches`.
    Fancy(fancy_regex::Matches<'r, 'h>),
}

impl<'r, 'h> From<regex::Matches<'r, 'h>> for MatchSpans<'r, 'h> {
    fn from(matches: regex::Matches<'r, 'h>) -> Self {
        Self::Basic(matches)
    }
}

impl<'r, 'h> From<fancy_regex::Matches<'r, 'h>> for MatchSpans<'r, 'h> {
    fn from(matches: fancy_regex::Matches<'r, 'h>) -> Self {
        Self::Fancy(matches)
    }
}

impl Iterator for MatchSpans<'_, '_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Basic(matches) => matches.next().map(|m| (m.start(), m.end())),
            Self::Fancy(matches) => match matches.next() {
                Some(Ok(m)) => Some((m.start(), m.end())),
                Some(Err(err)) => {
                    log::warn!("match stream aborted: {err}");
                    None
                }
                None => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt2_pattern_compiles_fancy() {
        let regex = GPT2_SPLIT_PATTERN.compile().unwrap();
        assert!(regex.is_fancy());
        assert_eq!(regex.as_str(), GPT2_SPLIT_PATTERN.as_str());
    }

    #[test]
    fn test_adaptive_prefers_basic() {
        let regex = SplitPattern::from(r"\w+").compile().unwrap();
        assert!(regex.is_basic());

        // Lookahead forces the fancy engine.
        let regex = SplitPattern::from(r"a(?!b)").compile().unwrap();
        assert!(regex.is_fancy());
    }

    #[test]
    fn test_bad_pattern_errors() {
        let err = SplitPattern::Basic(r"(unclosed".to_string())
            .compile()
            .unwrap_err();
        assert!(matches!(err, BytespliceError::Pattern(_)));

        let err = SplitPattern::from(r"(unclosed").compile().unwrap_err();
        assert!(matches!(err, BytespliceError::Pattern(_)));
    }

    #[test]
    fn test_find_spans_engines_agree() {
        let text = "ab 12  cd";

        let basic = SplitPattern::Basic(r"\w+".to_string()).compile().unwrap();
        let fancy = SplitPattern::Fancy(r"\w+".to_string()).compile().unwrap();

        let basic_spans: Vec<_> = basic.find_spans(text).collect();
        let fancy_spans: Vec<_> = fancy.find_spans(text).collect();

        assert_eq!(basic_spans, vec![(0, 2), (3, 5), (7, 9)]);
        assert_eq!(basic_spans, fancy_spans);
    }

    #[test]
    fn test_const_pattern_round_trip() {
        let pattern = ConstSplitPattern::Basic(r"\d+");
        assert_eq!(pattern.as_str(), r"\d+");
        assert_eq!(
            pattern.to_pattern(),
            SplitPattern::Basic(r"\d+".to_string())
        );
        assert!(pattern.compile().unwrap().is_basic());
    }
}
