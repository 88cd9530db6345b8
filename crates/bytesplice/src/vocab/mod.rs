//! # Vocabulary
//!
//! This module provides the subword vocabulary and its io mechanisms.
//!
//! A [`SubwordVocab`] is the dense string↔id table plus the merge-rank
//! table; [`io`] reads and writes the JSON vocabulary file shape.

pub mod io;

pub mod subword_vocab;

#[doc(inline)]
pub use io::VocabContents;
#[doc(inline)]
pub use subword_vocab::SubwordVocab;
