//! # Test Utilities
//!
//! A small vocabulary with full byte coverage: the 256 byte symbols in
//! codec rank order, a merge chain for `"hello"` and `" world"`, and
//! `<|endoftext|>` appended last. Every text encodes without the unk
//! fallback, so round-trip tests hold for arbitrary input.

use compact_str::CompactString;

use crate::{
    merge::MergeRanks,
    symbols::ByteSymbolCodec,
    tokenizer::{Tokenizer, TokenizerOptions},
    vocab::{SubwordVocab, VocabContents},
};

/// The ordered merge rules of the hello-world test vocabulary.
pub const HELLO_WORLD_MERGES: &[(&str, &str)] = &[
    ("h", "e"),
    ("l", "l"),
    ("he", "ll"),
    ("hell", "o"),
    ("Ġ", "w"),
    ("o", "r"),
    ("l", "d"),
    ("Ġw", "or"),
    ("Ġwor", "ld"),
];

/// The id of `"hello"` in the hello-world test vocabulary.
pub const HELLO_ID: u32 = 259;

/// The id of `"Ġworld"` (`" world"`) in the hello-world test vocabulary.
pub const WORLD_ID: u32 = 264;

/// The id of `<|endoftext|>` in the hello-world test vocabulary.
pub const END_OF_TEXT_ID: u32 = 265;

/// Build the hello-world test vocabulary.
///
/// Ids follow the trained layout: byte symbols at `0..=255`, one token per
/// merge product after that, the end-of-text special last.
pub fn hello_world_vocab() -> VocabContents<u32> {
    let codec = ByteSymbolCodec::shared();

    let mut entries: Vec<(String, u32)> = codec
        .rank_bytes()
        .iter()
        .enumerate()
        .map(|(id, &b)| (codec.symbol_for(b).to_string(), id as u32))
        .collect();

    for (left, right) in HELLO_WORLD_MERGES {
        let id = entries.len() as u32;
        entries.push((format!("{left}{right}"), id));
    }
    entries.push(("<|endoftext|>".to_string(), entries.len() as u32));

    let ranks = MergeRanks::from_ordered_pairs(
        HELLO_WORLD_MERGES
            .iter()
            .map(|(left, right)| (CompactString::from(*left), CompactString::from(*right))),
    );

    VocabContents {
        vocab: SubwordVocab::from_entries(entries, ranks).unwrap(),
        added_tokens: vec!["<|endoftext|>".to_string()],
        unk_token: Some("<|endoftext|>".to_string()),
    }
}

/// Build a [`Tokenizer`] over [`hello_world_vocab`].
pub fn hello_world_tokenizer() -> Tokenizer<u32> {
    Tokenizer::from_contents(hello_world_vocab(), TokenizerOptions::new()).unwrap()
}
