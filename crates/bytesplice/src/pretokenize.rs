//! # Pre-Tokenization
//!
//! Splits text into word chunks before BPE; merges never cross chunk
//! boundaries. The chunks always concatenate back to the input text: any
//! characters the split pattern fails to cover are emitted in place as
//! unmatched gap chunks, and logged.

use crate::errors::BSResult;
use crate::pattern::{GPT2_SPLIT_PATTERN, SplitPattern, SplitRegex};

/// Regex-driven word splitter.
#[derive(Debug, Clone)]
pub struct PreTokenizer {
    regex: SplitRegex,
}

impl PreTokenizer {
    /// Build a pre-tokenizer with the GPT-2 split pattern.
    pub fn new() -> BSResult<Self> {
        Self::from_pattern(&GPT2_SPLIT_PATTERN.to_pattern())
    }

    /// Build a pre-tokenizer from a split pattern.
    ///
    /// ## Arguments
    /// * `pattern` - The word-split pattern to compile.
    ///
    /// ## Returns
    /// A `Result` containing the pre-tokenizer, or a `Pattern` error.
    pub fn from_pattern(pattern: &SplitPattern) -> BSResult<Self> {
        Ok(Self {
            regex: pattern.compile()?,
        })
    }

    /// The pattern string this pre-tokenizer splits with.
    pub fn pattern_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Split text into word chunks.
    ///
    /// The chunks are non-empty, in order, and concatenate to `text`
    /// exactly. A span the pattern does not match is still emitted, as a
    /// gap chunk, with a `log::warn!` event; the GPT-2 pattern matches all
    /// text, so gaps only arise under custom patterns.
    ///
    /// ## Arguments
    /// * `text` - The text to split.
    ///
    /// ## Returns
    /// The word chunks of `text`.
    pub fn split<'t>(
        &self,
        text: &'t str,
    ) -> Vec<&'t str> {
        let mut chunks = Vec::new();
        let mut cursor = 0;

        for (start, end) in self.regex.find_spans(text) {
            if start > cursor {
                log::warn!("split pattern skipped bytes {cursor}..{start}; emitting as gap chunk");
                chunks.push(&text[cursor..start]);
            }
            if end > start {
                chunks.push(&text[start..end]);
            }
            cursor = end;
        }
        if cursor < text.len() {
            log::warn!(
                "split pattern skipped trailing bytes {cursor}..{}; emitting as gap chunk",
                text.len(),
            );
            chunks.push(&text[cursor..]);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpt2() -> PreTokenizer {
        PreTokenizer::new().unwrap()
    }

    #[test]
    fn test_empty_and_trivial() {
        let pre = gpt2();
        assert_eq!(pre.split(""), Vec::<&str>::new());
        assert_eq!(pre.split("word"), vec!["word"]);
        assert_eq!(pre.split(" "), vec![" "]);
    }

    #[test]
    fn test_gpt2_contractions() {
        let pre = gpt2();
        assert_eq!(
            pre.split("This isn't that simple"),
            vec!["This", " isn", "'t", " that", " simple"],
        );
        assert_eq!(pre.split("I'll've"), vec!["I", "'ll", "'ve"]);
    }

    #[test]
    fn test_gpt2_spaces_attach_to_words() {
        let pre = gpt2();

        // The lookahead keeps the last space with the following word.
        assert_eq!(pre.split("a   b"), vec!["a", "  ", " b"]);
        assert_eq!(pre.split("hello world"), vec!["hello", " world"]);
        assert_eq!(pre.split("hi\n\nthere"), vec!["hi", "\n", "\n", "there"]);
    }

    #[test]
    fn test_gpt2_digits_and_punctuation() {
        let pre = gpt2();
        assert_eq!(
            pre.split("pi = 3.14159!"),
            vec!["pi", " =", " 3", ".", "14159", "!"],
        );
        assert_eq!(pre.split("x42"), vec!["x", "42"]);
    }

    #[test]
    fn test_gpt2_unicode() {
        let pre = gpt2();
        assert_eq!(pre.split("naïve café"), vec!["naïve", " café"]);
        assert_eq!(pre.split("日本語 text"), vec!["日本語", " text"]);
    }

    #[test]
    fn test_lossless_concatenation() {
        let pre = gpt2();
        for text in [
            "This isn't   that\tsimple.\n\nOr is it?",
            "  leading and trailing  ",
            "mixé 1234 ... 日本語\r\n",
        ] {
            assert_eq!(pre.split(text).concat(), text);
        }
    }

    #[test]
    fn test_gap_chunks_under_partial_pattern() {
        // A pattern that only matches letter runs leaves everything else
        // uncovered; the gaps come back as chunks anyway.
        let pre = PreTokenizer::from_pattern(&SplitPattern::Basic(r"[a-z]+".to_string())).unwrap();

        assert_eq!(pre.split("ab 12 cd"), vec!["ab", " 12 ", "cd"]);
        assert_eq!(pre.split("123"), vec!["123"]);
        assert_eq!(pre.split("ab cd ").concat(), "ab cd ");
    }

    proptest::proptest! {
        #[test]
        fn test_prop_split_concatenates(text in "\\PC{0,200}") {
            let pre = gpt2();
            proptest::prop_assert_eq!(pre.split(&text).concat(), text);
        }

        #[test]
        fn test_prop_no_empty_chunks(text in ".{0,200}") {
            let pre = gpt2();
            for chunk in pre.split(&text) {
                proptest::prop_assert!(!chunk.is_empty());
            }
        }
    }
}
