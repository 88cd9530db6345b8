//! # Tokenizer
//!
//! The user-facing orchestrator. Encoding runs added-token splitting, then
//! pre-tokenization, byte→symbol encoding, ranked merging, and id lookup;
//! decoding runs the same pipe backwards.

use std::{io::Write, path::Path};

use crate::{
    errors::{BSResult, BytespliceError},
    pattern::{GPT2_SPLIT_PATTERN, SplitPattern},
    pretokenize::PreTokenizer,
    symbols::ByteSymbolCodec,
    trie::AddedTokenTrie,
    types::TokenType,
    vocab::{SubwordVocab, VocabContents},
};

/// The GPT-2 end-of-text special token; the default unknown-token fallback.
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Construction options for [`Tokenizer`].
#[derive(Debug, Clone)]
pub struct TokenizerOptions {
    /// The unknown-token fallback string; must be a vocabulary entry.
    pub unk_token: String,

    /// The word-split pattern.
    pub pattern: SplitPattern,

    /// Tokens to register in the added-token trie; each must be a
    /// vocabulary entry.
    pub added_tokens: Vec<String>,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            unk_token: END_OF_TEXT.to_string(),
            pattern: GPT2_SPLIT_PATTERN.to_pattern(),
            added_tokens: vec![END_OF_TEXT.to_string()],
        }
    }
}

impl TokenizerOptions {
    /// Create default options: GPT-2 split pattern, [`END_OF_TEXT`] as both
    /// the unknown-token fallback and the sole added token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the unknown-token fallback.
    pub fn with_unk_token(
        self,
        unk_token: impl Into<String>,
    ) -> Self {
        Self {
            unk_token: unk_token.into(),
            ..self
        }
    }

    /// Override the word-split pattern.
    pub fn with_pattern(
        self,
        pattern: SplitPattern,
    ) -> Self {
        Self { pattern, ..self }
    }

    /// Override the added-token list.
    pub fn with_added_tokens<I, S>(
        self,
        added_tokens: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            added_tokens: added_tokens.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

/// A byte-level BPE tokenizer.
///
/// Encode and decode borrow `&self` and share no interior state, so a
/// tokenizer can serve many threads at once; registering new tokens
/// requires `&mut self`.
#[derive(Debug, Clone)]
pub struct Tokenizer<T: TokenType> {
    vocab: SubwordVocab<T>,
    trie: AddedTokenTrie,
    pretokenizer: PreTokenizer,
    codec: &'static ByteSymbolCodec,
    unk_token: String,
    unk_id: T,
}

impl<T: TokenType> Tokenizer<T> {
    /// Build a tokenizer over a vocabulary.
    ///
    /// ## Arguments
    /// * `vocab` - The subword vocabulary.
    /// * `options` - The construction options.
    ///
    /// ## Returns
    /// The tokenizer; `VocabConflict` if the unknown token or an added
    /// token is not a vocabulary entry, `Pattern` if the split pattern
    /// does not compile.
    pub fn new(
        vocab: SubwordVocab<T>,
        options: TokenizerOptions,
    ) -> BSResult<Self> {
        let pretokenizer = PreTokenizer::from_pattern(&options.pattern)?;

        let unk_token = options.unk_token;
        let unk_id = vocab.lookup_id(&unk_token).ok_or_else(|| {
            BytespliceError::VocabConflict(format!(
                "unk token {unk_token:?} is not a vocabulary entry"
            ))
        })?;

        let mut trie = AddedTokenTrie::new();
        for token in &options.added_tokens {
            if vocab.lookup_id(token).is_none() {
                return Err(BytespliceError::VocabConflict(format!(
                    "added token {token:?} is not a vocabulary entry"
                )));
            }
            trie.add(token);
        }

        Ok(Self {
            vocab,
            trie,
            pretokenizer,
            codec: ByteSymbolCodec::shared(),
            unk_token,
            unk_id,
        })
    }

    /// Build a tokenizer from loaded [`VocabContents`].
    ///
    /// Where the file names an unknown token or added tokens, they replace
    /// the corresponding options.
    pub fn from_contents(
        contents: VocabContents<T>,
        options: TokenizerOptions,
    ) -> BSResult<Self> {
        let mut options = options;
        if let Some(unk_token) = contents.unk_token {
            options.unk_token = unk_token;
        }
        if !contents.added_tokens.is_empty() {
            options.added_tokens = contents.added_tokens;
        }
        Self::new(contents.vocab, options)
    }

    /// Load a tokenizer from a JSON vocabulary file.
    ///
    /// ## Arguments
    /// * `path` - the path to the vocabulary file.
    /// * `options` - the construction options.
    pub fn load_path<P: AsRef<Path>>(
        path: P,
        options: TokenizerOptions,
    ) -> BSResult<Self> {
        Self::from_contents(crate::vocab::io::load_vocab_path(path)?, options)
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &SubwordVocab<T> {
        &self.vocab
    }

    /// The unknown-token fallback string.
    pub fn unk_token(&self) -> &str {
        &self.unk_token
    }

    /// The unknown-token fallback id.
    pub fn unk_id(&self) -> T {
        self.unk_id
    }

    fn lookup_or_unk(
        &self,
        token: &str,
    ) -> T {
        match self.vocab.lookup_id(token) {
            Some(id) => id,
            None => {
                log::debug!(
                    "token {token:?} is not a vocabulary entry; using unk {:?}",
                    self.unk_token,
                );
                self.unk_id
            }
        }
    }

    /// Encode text, appending the token ids to a buffer.
    ///
    /// ## Arguments
    /// * `text` - The string slice to encode.
    /// * `tokens` - The target token buffer to append to.
    pub fn encode_append(
        &self,
        text: &str,
        tokens: &mut Vec<T>,
    ) {
        for segment in self.trie.split(text) {
            if self.trie.contains(segment) {
                tokens.push(self.lookup_or_unk(segment));
                continue;
            }

            for chunk in self.pretokenizer.split(segment) {
                let symbols = self.codec.encode_str(chunk);
                for piece in self.vocab.merge_ranks().merge_word(&symbols) {
                    tokens.push(self.lookup_or_unk(&piece));
                }
            }
        }
    }

    /// Encode text to token ids.
    ///
    /// Total for any `&str`: pieces without an id degrade to the
    /// unknown-token id, with a `log::debug!` event.
    ///
    /// ## Arguments
    /// * `text` - The string slice to encode.
    ///
    /// ## Returns
    /// The token ids.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text)))]
    pub fn encode(
        &self,
        text: &str,
    ) -> Vec<T> {
        let mut tokens = Vec::new();
        self.encode_append(text, &mut tokens);
        tokens
    }

    /// Encode a batch of texts.
    pub fn encode_batch<S: AsRef<str>>(
        &self,
        batch: &[S],
    ) -> Vec<Vec<T>> {
        batch.iter().map(|text| self.encode(text.as_ref())).collect()
    }

    fn concat_tokens(
        &self,
        ids: &[T],
    ) -> String {
        let mut symbols = String::new();
        for &id in ids {
            match self.vocab.lookup_token(id) {
                Some(token) => symbols.push_str(token),
                None => {
                    log::debug!(
                        "id {id} is not a vocabulary entry; substituting unk {:?}",
                        self.unk_token,
                    );
                    symbols.push_str(&self.unk_token);
                }
            }
        }
        symbols
    }

    /// Decode token ids back to text.
    ///
    /// Ids outside the vocabulary substitute the unknown-token string,
    /// with a `log::debug!` event.
    ///
    /// ## Arguments
    /// * `ids` - The token ids to decode.
    ///
    /// ## Returns
    /// The decoded text; `InvalidSymbol` if a token contains a char
    /// outside the symbol table, `MalformedByteSequence` if the decoded
    /// bytes are not valid UTF-8.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, ids)))]
    pub fn try_decode(
        &self,
        ids: &[T],
    ) -> BSResult<String> {
        let bytes = self.codec.decode_symbols(&self.concat_tokens(ids))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Decode token ids back to text, replacing undecodable content with
    /// `U+FFFD`.
    pub fn decode_lossy(
        &self,
        ids: &[T],
    ) -> String {
        let bytes = self.codec.decode_symbols_lossy(&self.concat_tokens(ids));
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Register a new token: vocabulary append plus trie registration.
    ///
    /// ## Arguments
    /// * `token` - The token string to register.
    ///
    /// ## Returns
    /// The assigned id; `DuplicateToken` if the string is already a
    /// vocabulary entry.
    pub fn add_token(
        &mut self,
        token: &str,
    ) -> BSResult<T> {
        let id = self.vocab.add_token(token)?;
        self.trie.add(token);
        Ok(id)
    }

    /// Snapshot the tokenizer state as [`VocabContents`].
    pub fn to_contents(&self) -> VocabContents<T> {
        VocabContents {
            vocab: self.vocab.clone(),
            added_tokens: self.trie.tokens().map(String::from).collect(),
            unk_token: Some(self.unk_token.clone()),
        }
    }

    /// Write the vocabulary to a [`Write`] writer, in the load shape.
    ///
    /// ## Arguments
    /// * `writer` - the writer to target.
    pub fn write_vocab<W: Write>(
        &self,
        writer: &mut W,
    ) -> BSResult<()> {
        crate::vocab::io::write_vocab(&self.to_contents(), writer)
    }

    /// Save the vocabulary to a JSON vocabulary file.
    ///
    /// ## Arguments
    /// * `path` - the path to save the vocabulary to.
    pub fn save_vocab_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> BSResult<()> {
        crate::vocab::io::save_vocab_path(&self.to_contents(), path)
    }
}
