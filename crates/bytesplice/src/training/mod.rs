//! # Vocabulary Training
//!
//! Support for learning ranked merge lists from sample text.
//!
//! The trainer counts pre-tokenized symbol words, then repeatedly merges
//! the most frequent adjacent symbol pair until the target vocabulary
//! size is reached. The result is [`crate::vocab::VocabContents`], ready
//! to save or to feed a [`crate::tokenizer::Tokenizer`].
//!
//! The trainer has no parallelism; feeding `update_from_samples` from a
//! streaming source on another thread is the effective way to scale it.
//!
//! ## Training Example
//!
//! ```rust
//! use bytesplice::{Tokenizer, TokenizerOptions, training::MergeTrainerOptions};
//!
//! let mut trainer = MergeTrainerOptions::new(300).init();
//! trainer.update_from_samples(["low low low", "lower lower"]);
//!
//! let contents = trainer.train::<u32>().expect("training failed");
//! let tokenizer =
//!     Tokenizer::from_contents(contents, TokenizerOptions::new()).expect("bad contents");
//!
//! let ids = tokenizer.encode("low lower");
//! assert_eq!(tokenizer.try_decode(&ids).expect("bad ids"), "low lower");
//! ```

mod merge_trainer;

#[doc(inline)]
pub use merge_trainer::{MergeTrainer, MergeTrainerOptions};
