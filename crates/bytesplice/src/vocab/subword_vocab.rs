//! # Subword Vocabulary

use crate::errors::{BSResult, BytespliceError};
use crate::merge::MergeRanks;
use crate::types::{CommonHashMap, TokenType, hash_map_new};

/// A dense string↔id vocabulary with its merge-rank table.
///
/// Ids run `0..len()` with no gaps and no reuse; `token_ids` and
/// `id_tokens` are exact inverses. The maps only grow, via [`Self::add_token`].
#[derive(Debug, Clone, Default)]
pub struct SubwordVocab<T: TokenType> {
    token_ids: CommonHashMap<String, T>,
    id_tokens: CommonHashMap<T, String>,
    ranks: MergeRanks,
}

impl<T: TokenType> SubwordVocab<T> {
    /// Build a vocabulary from `(token, id)` entries and a merge table.
    ///
    /// ## Arguments
    /// * `entries` - The `(token, id)` pairs; order does not matter.
    /// * `ranks` - The merge-rank table.
    ///
    /// ## Returns
    /// The vocabulary; or `VocabConflict` if a token or id repeats or the
    /// ids are not dense from 0.
    pub fn from_entries<I>(
        entries: I,
        ranks: MergeRanks,
    ) -> BSResult<Self>
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let mut token_ids: CommonHashMap<String, T> = hash_map_new();
        let mut id_tokens: CommonHashMap<T, String> = hash_map_new();

        for (token, id) in entries {
            if let Some(prev) = id_tokens.insert(id, token.clone()) {
                return Err(BytespliceError::VocabConflict(format!(
                    "id {id} assigned to both {prev:?} and {token:?}"
                )));
            }
            if token_ids.insert(token.clone(), id).is_some() {
                return Err(BytespliceError::VocabConflict(format!(
                    "token {token:?} registered twice"
                )));
            }
        }

        for idx in 0..token_ids.len() {
            let id = T::from_usize(idx).ok_or(BytespliceError::TokenOutOfRange)?;
            if !id_tokens.contains_key(&id) {
                return Err(BytespliceError::VocabConflict(format!(
                    "ids are not dense: {} entries, but id {idx} is unassigned",
                    token_ids.len(),
                )));
            }
        }

        Ok(Self {
            token_ids,
            id_tokens,
            ranks,
        })
    }

    /// The id for a token string.
    #[inline(always)]
    pub fn lookup_id(
        &self,
        token: &str,
    ) -> Option<T> {
        self.token_ids.get(token).copied()
    }

    /// The token string for an id.
    #[inline(always)]
    pub fn lookup_token(
        &self,
        id: T,
    ) -> Option<&str> {
        self.id_tokens.get(&id).map(String::as_str)
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }

    /// The merge-rank table.
    pub fn merge_ranks(&self) -> &MergeRanks {
        &self.ranks
    }

    /// Iterate `(token, id)` entries, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> {
        self.token_ids.iter().map(|(token, &id)| (token.as_str(), id))
    }

    /// Append a token with the next dense id.
    ///
    /// ## Arguments
    /// * `token` - The token string to append.
    ///
    /// ## Returns
    /// The assigned id; `DuplicateToken` if the string is already
    /// registered, `TokenOutOfRange` if `T` cannot hold the next id.
    pub fn add_token(
        &mut self,
        token: &str,
    ) -> BSResult<T> {
        if self.token_ids.contains_key(token) {
            return Err(BytespliceError::DuplicateToken {
                token: token.to_string(),
            });
        }

        let id = T::from_usize(self.len()).ok_or(BytespliceError::TokenOutOfRange)?;
        self.token_ids.insert(token.to_string(), id);
        self.id_tokens.insert(id, token.to_string());

        Ok(id)
    }
}
