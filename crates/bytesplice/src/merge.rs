//! # Ranked Pair Merging
//!
//! The BPE merge loop over symbol sequences. A word starts as one symbol
//! per char; each step merges every non-overlapping occurrence of the
//! ranked pair with the lowest rank, until no adjacent pair is ranked.

use compact_str::{CompactString, ToCompactString};

use crate::types::{CommonHashMap, CommonHashSet, Pair};

/// A pair of adjacent symbols in a word.
pub type SymbolPair = Pair<CompactString>;

/// The set of distinct adjacent pairs in a word.
pub fn symbol_pairs(word: &[CompactString]) -> CommonHashSet<SymbolPair> {
    word.windows(2)
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect()
}

/// Replace every non-overlapping occurrence of `pair` in `word`, in a
/// single left-to-right pass.
///
/// ## Arguments
/// * `word` - The symbol sequence to rewrite.
/// * `pair` - The adjacent pair to merge.
///
/// ## Returns
/// The rewritten symbol sequence.
pub fn apply_pair(
    word: &[CompactString],
    pair: &SymbolPair,
) -> Vec<CompactString> {
    let mut merged = Vec::with_capacity(word.len());
    let mut i = 0;
    while i < word.len() {
        if i + 1 < word.len() && word[i] == pair.0 && word[i + 1] == pair.1 {
            let mut joined = word[i].clone();
            joined.push_str(&pair.1);
            merged.push(joined);
            i += 2;
        } else {
            merged.push(word[i].clone());
            i += 1;
        }
    }
    merged
}

/// Merge priority table: pair → rank, lower rank merges first.
///
/// Ranks are positions in the ordered merge list; a duplicate pair in the
/// list keeps its first position.
#[derive(Debug, Clone, Default)]
pub struct MergeRanks {
    ranks: CommonHashMap<SymbolPair, usize>,
}

impl MergeRanks {
    /// Build a rank table from pairs in priority order.
    pub fn from_ordered_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = SymbolPair>,
    {
        let mut ranks: CommonHashMap<SymbolPair, usize> = CommonHashMap::default();
        for (rank, pair) in pairs.into_iter().enumerate() {
            ranks.entry(pair).or_insert(rank);
        }
        Self { ranks }
    }

    /// The rank of a pair, if it is ranked.
    #[inline(always)]
    pub fn rank_of(
        &self,
        pair: &SymbolPair,
    ) -> Option<usize> {
        self.ranks.get(pair).copied()
    }

    /// The number of ranked pairs.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// The ranked pairs, in rank order.
    pub fn to_ordered_pairs(&self) -> Vec<SymbolPair> {
        let mut ordered: Vec<_> = self.ranks.iter().collect();
        ordered.sort_by_key(|&(_, &rank)| rank);
        ordered.into_iter().map(|(pair, _)| pair.clone()).collect()
    }

    /// Run the merge loop over a symbol string.
    ///
    /// ## Arguments
    /// * `symbols` - The symbol string for one pre-tokenized word.
    ///
    /// ## Returns
    /// The merged symbol sequence; empty input gives an empty sequence.
    pub fn merge_word(
        &self,
        symbols: &str,
    ) -> Vec<CompactString> {
        let mut word: Vec<CompactString> = symbols.chars().map(|c| c.to_compact_string()).collect();

        if word.len() < 2 || self.ranks.is_empty() {
            return word;
        }

        loop {
            let best = symbol_pairs(&word)
                .into_iter()
                .filter_map(|pair| self.rank_of(&pair).map(|rank| (rank, pair)))
                .min_by_key(|(rank, _)| *rank);

            match best {
                Some((_, pair)) => {
                    word = apply_pair(&word, &pair);
                    if word.len() < 2 {
                        return word;
                    }
                }
                None => return word,
            }
        }
    }
}
