//! # Parallel Wrappers
//!
//! Batch-level `rayon` parallelism over a shared tokenizer. Encode and
//! decode take `&self`, so the batch items fan out over the thread pool
//! against one tokenizer instance.

use std::sync::Arc;

use rayon::prelude::*;

use crate::{errors::BSResult, tokenizer::Tokenizer, types::TokenType};

/// Batch-Level Parallel Tokenizer Wrapper.
#[derive(Debug, Clone)]
pub struct ParallelTokenizer<T: TokenType> {
    /// Inner tokenizer.
    pub inner: Arc<Tokenizer<T>>,
}

impl<T: TokenType> ParallelTokenizer<T> {
    /// Create a new parallel tokenizer.
    ///
    /// ## Arguments
    /// * `inner` - The tokenizer to wrap.
    pub fn new(inner: Arc<Tokenizer<T>>) -> Self {
        Self { inner }
    }

    /// Encode a batch of texts in parallel.
    ///
    /// ## Arguments
    /// * `batch` - The texts to encode.
    ///
    /// ## Returns
    /// One id sequence per text, in batch order.
    pub fn encode_batch<S>(
        &self,
        batch: &[S],
    ) -> Vec<Vec<T>>
    where
        S: AsRef<str> + Sync,
    {
        batch
            .par_iter()
            .map(|text| self.inner.encode(text.as_ref()))
            .collect()
    }

    /// Decode a batch of id sequences in parallel.
    ///
    /// ## Arguments
    /// * `batch` - The id sequences to decode.
    ///
    /// ## Returns
    /// One text per sequence, in batch order; or the first decode error.
    pub fn try_decode_batch<I>(
        &self,
        batch: &[I],
    ) -> BSResult<Vec<String>>
    where
        I: AsRef<[T]> + Sync,
    {
        batch
            .par_iter()
            .map(|ids| self.inner.try_decode(ids.as_ref()))
            .collect()
    }
}

impl<T: TokenType> From<Tokenizer<T>> for ParallelTokenizer<T> {
    fn from(inner: Tokenizer<T>) -> Self {
        Self::new(Arc::new(inner))
    }
}
