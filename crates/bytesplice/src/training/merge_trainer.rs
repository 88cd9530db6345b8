//! # Merge Trainer

use compact_str::{CompactString, ToCompactString};

use crate::{
    errors::{BSResult, BytespliceError},
    merge::{MergeRanks, SymbolPair, apply_pair},
    pattern::{GPT2_SPLIT_PATTERN, SplitPattern},
    pretokenize::PreTokenizer,
    symbols::ByteSymbolCodec,
    types::{CommonHashMap, TokenType, hash_map_new},
    vocab::{SubwordVocab, VocabContents},
};

/// Options for [`MergeTrainer`].
#[derive(Debug, Clone)]
pub struct MergeTrainerOptions {
    /// The word split pattern.
    pub pattern: SplitPattern,

    /// The target vocabulary size, byte symbols and special tokens
    /// included; must be >= 256 plus the special-token count.
    pub vocab_size: usize,

    /// Special tokens, appended after the learned tokens; the first one
    /// becomes the unknown-token fallback of the trained contents.
    pub special_tokens: Vec<String>,
}

impl MergeTrainerOptions {
    /// Create new options with the GPT-2 split pattern and an
    /// end-of-text special.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    ///
    /// ## Returns
    /// A new `MergeTrainerOptions` instance.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            pattern: GPT2_SPLIT_PATTERN.to_pattern(),
            vocab_size,
            special_tokens: vec![crate::tokenizer::END_OF_TEXT.to_string()],
        }
    }

    /// Sets the vocab size.
    ///
    /// ## Arguments
    /// * `vocab_size` - The desired vocabulary size.
    ///
    /// ## Returns
    /// The updated `MergeTrainerOptions` instance.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the regex pattern used for text splitting.
    ///
    /// ## Arguments
    /// * `pattern` - The new word split pattern.
    ///
    /// ## Returns
    /// The updated `MergeTrainerOptions` instance.
    ///
    /// ## Panics
    /// Panics if the regex pattern compilation fails.
    pub fn with_pattern<P: Into<SplitPattern>>(
        self,
        pattern: P,
    ) -> Self {
        let pattern = pattern.into();
        pattern.compile().expect("regex pattern compilation failed");
        Self { pattern, ..self }
    }

    /// Sets the special tokens.
    ///
    /// ## Arguments
    /// * `special_tokens` - The special tokens to append after training.
    ///
    /// ## Returns
    /// The updated `MergeTrainerOptions` instance.
    pub fn with_special_tokens<I, S>(
        self,
        special_tokens: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            special_tokens: special_tokens.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Initializes a [`MergeTrainer`] from these options.
    ///
    /// ## Returns
    /// A new `MergeTrainer` instance.
    ///
    /// ## Panics
    /// Panics if the regex pattern compilation fails.
    pub fn init(self) -> MergeTrainer {
        MergeTrainer::new(self)
    }
}

/// Trainer for learning a ranked merge list from sample texts.
///
/// Counts pre-tokenized symbol words, then repeatedly merges the most
/// frequent adjacent pair; ties break to the lexicographically smallest
/// pair, so training is deterministic.
#[derive(Debug, Clone)]
pub struct MergeTrainer {
    /// Trainer options.
    pub options: MergeTrainerOptions,

    pretokenizer: PreTokenizer,
    word_counts: CommonHashMap<CompactString, u64>,
}

impl MergeTrainer {
    /// Initializes a [`MergeTrainer`].
    ///
    /// ## Arguments
    /// * `options` - The trainer options.
    ///
    /// ## Returns
    /// A new `MergeTrainer` instance.
    ///
    /// ## Panics
    /// Panics if the regex pattern compilation fails.
    pub fn new(options: MergeTrainerOptions) -> Self {
        let pretokenizer = PreTokenizer::from_pattern(&options.pattern)
            .expect("regex pattern compilation failed");

        MergeTrainer {
            options,
            pretokenizer,
            word_counts: hash_map_new(),
        }
    }

    /// Update word counts inplace from a sample iterator.
    ///
    /// ## Arguments
    /// * `samples` - An iterator over string-like samples.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, samples)))]
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let codec = ByteSymbolCodec::shared();
        for sample in samples {
            for chunk in self.pretokenizer.split(sample.as_ref()) {
                let symbols = CompactString::from(codec.encode_str(chunk));
                *self.word_counts.entry(symbols).or_default() += 1;
            }
        }
    }

    /// The most frequent pair; ties break to the smallest pair.
    fn best_pair(words: &[(Vec<CompactString>, u64)]) -> Option<(SymbolPair, u64)> {
        let mut pair_counts: CommonHashMap<SymbolPair, u64> = hash_map_new();
        for (word, count) in words {
            for w in word.windows(2) {
                *pair_counts.entry((w[0].clone(), w[1].clone())).or_default() += count;
            }
        }

        pair_counts
            .into_iter()
            .max_by(|(pa, ca), (pb, cb)| ca.cmp(cb).then_with(|| pb.cmp(pa)))
    }

    /// Trains [`VocabContents<T>`].
    ///
    /// The trained layout is the GPT-2 one: the 256 byte symbols in codec
    /// rank order, one token per learned merge in merge order, and the
    /// special tokens appended last.
    ///
    /// Merging stops early when no adjacent pair is left in the counted
    /// words.
    ///
    /// ## Returns
    /// A `Result` containing the trained `VocabContents<T>` or an error.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn train<T>(self) -> BSResult<VocabContents<T>>
    where
        T: TokenType,
    {
        let vocab_size = self.options.vocab_size;
        let special_tokens = self.options.special_tokens;

        if vocab_size < 256 + special_tokens.len() {
            return Err(BytespliceError::VocabConflict(format!(
                "vocab size {vocab_size} cannot hold 256 byte symbols and {} special tokens",
                special_tokens.len(),
            )));
        }
        let merge_target = vocab_size - 256 - special_tokens.len();

        let codec = ByteSymbolCodec::shared();
        let mut entries: Vec<(String, T)> = Vec::with_capacity(vocab_size);
        let push_entry = |entries: &mut Vec<(String, T)>, token: String| -> BSResult<()> {
            let id = T::from_usize(entries.len()).ok_or(BytespliceError::TokenOutOfRange)?;
            entries.push((token, id));
            Ok(())
        };

        for &b in codec.rank_bytes() {
            push_entry(&mut entries, codec.symbol_for(b).to_string())?;
        }

        let mut words: Vec<(Vec<CompactString>, u64)> = self
            .word_counts
            .into_iter()
            .map(|(word, count)| {
                (
                    word.chars().map(|c| c.to_compact_string()).collect(),
                    count,
                )
            })
            .collect();

        let mut merges: Vec<SymbolPair> = Vec::with_capacity(merge_target);
        while merges.len() < merge_target {
            let Some((pair, count)) = Self::best_pair(&words) else {
                log::info!(
                    "pairs exhausted after {} merges; target was {merge_target}",
                    merges.len(),
                );
                break;
            };

            log::info!(
                "merge {}/{merge_target}: {:?} + {:?} (count {count})",
                merges.len() + 1,
                pair.0,
                pair.1,
            );

            push_entry(&mut entries, format!("{}{}", pair.0, pair.1))?;
            for (word, _) in &mut words {
                if word.len() > 1 {
                    *word = apply_pair(word, &pair);
                }
            }
            merges.push(pair);
        }

        for token in &special_tokens {
            push_entry(&mut entries, token.clone())?;
        }

        Ok(VocabContents {
            vocab: SubwordVocab::from_entries(entries, MergeRanks::from_ordered_pairs(merges))?,
            unk_token: special_tokens.first().cloned(),
            added_tokens: special_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{END_OF_TEXT, Tokenizer, TokenizerOptions};

    type T = u32;

    #[test]
    fn test_train_low_corpus() {
        let mut trainer = MergeTrainerOptions::new(256 + 3 + 1).init();
        trainer.update_from_samples(["low low low", "lower lower"]);

        let contents = trainer.train::<T>().unwrap();
        let vocab = &contents.vocab;

        assert_eq!(vocab.len(), 260);

        // Learned tokens follow the 256 byte symbols, in merge order;
        // ("l", "o") and ("lo", "w") tie at count 5, smallest pair first.
        assert_eq!(vocab.lookup_id("lo"), Some(256));
        assert_eq!(vocab.lookup_id("low"), Some(257));
        assert_eq!(vocab.lookup_id("Ġlow"), Some(258));
        assert_eq!(vocab.lookup_id(END_OF_TEXT), Some(259));

        let ranks = vocab.merge_ranks();
        assert_eq!(
            ranks.to_ordered_pairs(),
            vec![
                (CompactString::from("l"), CompactString::from("o")),
                (CompactString::from("lo"), CompactString::from("w")),
                (CompactString::from("Ġ"), CompactString::from("low")),
            ],
        );

        assert_eq!(contents.unk_token.as_deref(), Some(END_OF_TEXT));
        assert_eq!(contents.added_tokens, vec![END_OF_TEXT]);
    }

    #[test]
    fn test_trained_contents_round_trip() {
        let mut trainer = MergeTrainerOptions::new(256 + 3 + 1).init();
        trainer.update_from_samples(["low low low", "lower lower"]);

        let tokenizer =
            Tokenizer::from_contents(trainer.train::<T>().unwrap(), TokenizerOptions::new())
                .unwrap();

        assert_eq!(tokenizer.encode("low low"), vec![257, 258]);

        for text in ["low lower lowest", "unrelated text<|endoftext|>"] {
            let ids = tokenizer.encode(text);
            assert_eq!(tokenizer.try_decode(&ids).unwrap(), text);
        }
    }

    #[test]
    fn test_train_stops_when_pairs_exhausted() {
        let mut trainer = MergeTrainerOptions::new(400).init();
        trainer.update_from_samples(["ab"]);

        let contents = trainer.train::<T>().unwrap();

        // One countable pair, then exhaustion: 256 bytes + "ab" + the special.
        assert_eq!(contents.vocab.len(), 258);
        assert_eq!(contents.vocab.lookup_id("ab"), Some(256));
    }

    #[test]
    fn test_train_rejects_tiny_vocab_size() {
        let trainer = MergeTrainerOptions::new(100).init();
        let err = trainer.train::<T>().unwrap_err();
        assert!(matches!(err, BytespliceError::VocabConflict(_)));
    }

    #[test]
    fn test_train_empty_corpus() {
        let trainer = MergeTrainerOptions::new(300).init();
        let contents = trainer.train::<T>().unwrap();

        assert_eq!(contents.vocab.len(), 257);
        assert!(contents.vocab.merge_ranks().is_empty());
    }
}
