//! # `bytesplice` Byte-Level BPE Tokenizer
//!
//! This is a byte-level binary pair encoding (BPE) tokenizer,
//! compatible with GPT-2 style vocabularies.
//!
//! Text is split into words by a regex, each word is remapped to
//! printable byte symbols, and ranked symbol merges reduce each word
//! to vocabulary tokens. Every byte has a token, so arbitrary input
//! round-trips without loss.
//!
//! See:
//! * [`tokenizer`] to encode text into tokens and decode tokens into text.
//! * [`vocab`] to manage token vocabularies and vocab io.
//! * [`training`] to learn a merge list from sample text.
//! * [`symbols`] for the byte to printable-symbol codec.
//!
//! ## Loading a Tokenizer
//!
//! ```rust,no_run
//! use bytesplice::{Tokenizer, TokenizerOptions};
//!
//! type T = u32;
//!
//! let tokenizer: Tokenizer<T> =
//!     Tokenizer::load_path("vocab.json", TokenizerOptions::new())
//!         .expect("failed to load vocab");
//!
//! let ids = tokenizer.encode("hello world");
//! assert_eq!(tokenizer.try_decode(&ids).expect("bad ids"), "hello world");
//! ```
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
#![warn(missing_docs, unused)]

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(feature = "training")]
pub mod training;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub mod errors;
pub mod merge;
pub mod pattern;
pub mod pretokenize;
pub mod symbols;
pub mod tokenizer;
pub mod trie;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use crate::{
    errors::{BSResult, BytespliceError},
    merge::MergeRanks,
    pattern::{ConstSplitPattern, GPT2_SPLIT_PATTERN, SplitPattern},
    pretokenize::PreTokenizer,
    symbols::ByteSymbolCodec,
    tokenizer::{END_OF_TEXT, Tokenizer, TokenizerOptions},
    trie::AddedTokenTrie,
    types::TokenType,
    vocab::{SubwordVocab, VocabContents},
};
