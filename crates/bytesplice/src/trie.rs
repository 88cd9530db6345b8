//! # Added Token Trie
//!
//! Added tokens (specials like `<|endoftext|>`, or user extensions) are
//! matched on raw text before pre-tokenization, and bypass BPE entirely.
//! The trie finds the leftmost occurrence of any registered token, longest
//! match winning at that position.

use crate::types::{CommonHashMap, CommonHashSet};

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: CommonHashMap<char, TrieNode>,
    terminal: bool,
}

/// Char-keyed trie over the registered added tokens.
#[derive(Debug, Clone, Default)]
pub struct AddedTokenTrie {
    root: TrieNode,
    tokens: CommonHashSet<String>,
}

impl AddedTokenTrie {
    /// Build an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token.
    ///
    /// Idempotent; registering the empty string is a no-op.
    pub fn add(
        &mut self,
        token: &str,
    ) {
        if token.is_empty() || self.tokens.contains(token) {
            return;
        }

        let mut node = &mut self.root;
        for c in token.chars() {
            node = node.children.entry(c).or_default();
        }
        node.terminal = true;

        self.tokens.insert(token.to_string());
    }

    /// Is `segment` exactly a registered token?
    pub fn contains(
        &self,
        segment: &str,
    ) -> bool {
        self.tokens.contains(segment)
    }

    /// The number of registered tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the trie empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate the registered tokens, in arbitrary order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// The `(start, end)` byte range of the leftmost registered occurrence
    /// in `text`; the longest match wins at that position.
    fn find_first(
        &self,
        text: &str,
    ) -> Option<(usize, usize)> {
        for (start, _) in text.char_indices() {
            let mut node = &self.root;
            let mut longest = None;

            for (offset, c) in text[start..].char_indices() {
                match node.children.get(&c) {
                    Some(next) => {
                        node = next;
                        if node.terminal {
                            longest = Some(start + offset + c.len_utf8());
                        }
                    }
                    None => break,
                }
            }

            if let Some(end) = longest {
                return Some((start, end));
            }
        }
        None
    }

    /// Split text around registered token occurrences.
    ///
    /// Segments are in order and concatenate to `text` exactly; each
    /// segment is either a registered token or a span containing no
    /// registered occurrence. Non-empty text yields no empty segments;
    /// text without occurrences (including `""`) yields `vec![text]`.
    ///
    /// ## Arguments
    /// * `text` - The text to split.
    ///
    /// ## Returns
    /// The segments of `text`.
    pub fn split<'t>(
        &self,
        text: &'t str,
    ) -> Vec<&'t str> {
        if text.is_empty() {
            return vec![text];
        }

        let mut segments = Vec::new();
        let mut cursor = 0;

        while cursor < text.len() {
            match self.find_first(&text[cursor..]) {
                Some((start, end)) => {
                    if start > 0 {
                        segments.push(&text[cursor..cursor + start]);
                    }
                    segments.push(&text[cursor + start..cursor + end]);
                    cursor += end;
                }
                None => {
                    segments.push(&text[cursor..]);
                    break;
                }
            }
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EOT: &str = "<|endoftext|>";

    fn trie(tokens: &[&str]) -> AddedTokenTrie {
        let mut trie = AddedTokenTrie::new();
        for token in tokens {
            trie.add(token);
        }
        trie
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut trie = AddedTokenTrie::new();
        assert!(trie.is_empty());

        trie.add(EOT);
        trie.add(EOT);
        assert_eq!(trie.len(), 1);
        assert!(trie.contains(EOT));
        assert!(!trie.contains("<|endoftext"));

        trie.add("");
        assert_eq!(trie.len(), 1);

        let tokens: Vec<_> = trie.tokens().collect();
        assert_eq!(tokens, vec![EOT]);
    }

    #[test]
    fn test_split_no_occurrences() {
        let trie = trie(&[EOT]);
        assert_eq!(trie.split("plain text"), vec!["plain text"]);
        assert_eq!(trie.split(""), vec![""]);

        let empty = AddedTokenTrie::new();
        assert_eq!(empty.split("anything"), vec!["anything"]);
    }

    #[test]
    fn test_split_around_special() {
        let trie = trie(&[EOT]);

        assert_eq!(
            trie.split("end<|endoftext|>here"),
            vec!["end", EOT, "here"],
        );
        assert_eq!(trie.split("<|endoftext|>tail"), vec![EOT, "tail"]);
        assert_eq!(trie.split("head<|endoftext|>"), vec!["head", EOT]);
        assert_eq!(trie.split(EOT), vec![EOT]);
    }

    #[test]
    fn test_split_adjacent_specials() {
        let trie = trie(&["<|a|>", "<|b|>"]);
        assert_eq!(
            trie.split("<|a|><|b|>x<|a|>"),
            vec!["<|a|>", "<|b|>", "x", "<|a|>"],
        );
    }

    #[test]
    fn test_longest_match_at_position() {
        let trie = trie(&["ab", "abc"]);
        assert_eq!(trie.split("zabcz"), vec!["z", "abc", "z"]);
        assert_eq!(trie.split("zabz"), vec!["z", "ab", "z"]);
    }

    #[test]
    fn test_leftmost_match_wins() {
        // "ab" starts earlier than the longer "bcd".
        let trie = trie(&["ab", "bcd"]);
        assert_eq!(trie.split("abcd"), vec!["ab", "cd"]);
    }

    #[test]
    fn test_split_multibyte_boundaries() {
        let trie = trie(&["<tok>"]);
        assert_eq!(trie.split("é<tok>日本"), vec!["é", "<tok>", "日本"]);

        let trie = self::trie(&["Ġmark"]);
        assert_eq!(trie.split("xĠmarky"), vec!["x", "Ġmark", "y"]);
    }

    #[test]
    fn test_split_concatenates() {
        let trie = trie(&[EOT, "<|a|>"]);
        for text in [
            "end<|endoftext|>here",
            "<|a|><|endoftext|><|a|>",
            "no specials at all",
            "partial <|endof text",
        ] {
            assert_eq!(trie.split(text).concat(), text);
        }
    }

    proptest::proptest! {
        #[test]
        fn test_prop_split_concatenates(
            chunks in proptest::collection::vec("\\PC{0,12}", 0..8),
        ) {
            // Interleave random text with explicit occurrences, so matches
            // are guaranteed to appear at arbitrary offsets.
            let trie = trie(&[EOT, "<|a|>"]);
            let text = chunks.join(EOT);

            let segments = trie.split(&text);
            proptest::prop_assert_eq!(segments.concat(), text.clone());

            if !text.is_empty() {
                for segment in &segments {
                    proptest::prop_assert!(!segment.is_empty());
                }
            }
        }
    }
}
