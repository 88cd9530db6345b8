//! # Vocabulary IO
//!
//! The vocabulary file is JSON:
//! ```json
//! {
//!   "vocab": {"a": 0, "b": 1, "ab": 2},
//!   "merges": ["a b"],
//!   "added_tokens": ["<|endoftext|>"],
//!   "unk_token": "<|endoftext|>"
//! }
//! ```
//!
//! `"merges"` is the merge list in priority order, each rule two
//! space-separated symbol strings. `"added_tokens"` and `"unk_token"` are
//! optional; the tokens they name must be entries of `"vocab"`.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{BSResult, BytespliceError},
    merge::{MergeRanks, SymbolPair},
    types::TokenType,
    vocab::SubwordVocab,
};

/// The JSON wire shape of a vocabulary file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VocabFileData {
    vocab: BTreeMap<String, u64>,
    merges: Vec<String>,

    #[serde(default)]
    added_tokens: Vec<String>,

    #[serde(default)]
    unk_token: Option<String>,
}

/// The loaded contents of a vocabulary file.
#[derive(Debug, Clone)]
pub struct VocabContents<T: TokenType> {
    /// The vocabulary, with its merge-rank table.
    pub vocab: SubwordVocab<T>,

    /// Tokens to register in the added-token trie.
    pub added_tokens: Vec<String>,

    /// The unknown-token fallback, if the file names one.
    pub unk_token: Option<String>,
}

fn parse_merge_rule(line: &str) -> BSResult<SymbolPair> {
    match line.split_once(' ') {
        Some((left, right)) if !left.is_empty() && !right.is_empty() && !right.contains(' ') => {
            Ok((CompactString::from(left), CompactString::from(right)))
        }
        _ => Err(BytespliceError::VocabFormat(format!(
            "malformed merge rule {line:?}"
        ))),
    }
}

/// Read [`VocabContents`] from a JSON vocabulary reader.
///
/// ## Arguments
/// * `reader` - the vocabulary file reader.
///
/// ## Returns
/// The loaded contents; `Parse` for invalid JSON, `VocabFormat` for a
/// malformed file shape, `VocabConflict`/`TokenOutOfRange` for bad ids.
pub fn read_vocab<T, R>(reader: R) -> BSResult<VocabContents<T>>
where
    T: TokenType,
    R: BufRead,
{
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|err| BytespliceError::Parse(err.to_string()))?;
    let data: VocabFileData = serde_json::from_value(value)
        .map_err(|err| BytespliceError::VocabFormat(err.to_string()))?;

    let entries = data
        .vocab
        .into_iter()
        .map(|(token, id)| {
            let id = T::from_u64(id).ok_or(BytespliceError::TokenOutOfRange)?;
            Ok((token, id))
        })
        .collect::<BSResult<Vec<(String, T)>>>()?;

    let pairs = data
        .merges
        .iter()
        .map(|line| parse_merge_rule(line))
        .collect::<BSResult<Vec<SymbolPair>>>()?;

    Ok(VocabContents {
        vocab: SubwordVocab::from_entries(entries, MergeRanks::from_ordered_pairs(pairs))?,
        added_tokens: data.added_tokens,
        unk_token: data.unk_token,
    })
}

/// Load [`VocabContents`] from a JSON vocabulary file.
///
/// ## Arguments
/// * `path` - the path to the vocabulary file.
pub fn load_vocab_path<T, P>(path: P) -> BSResult<VocabContents<T>>
where
    T: TokenType,
    P: AsRef<Path>,
{
    let reader = BufReader::new(File::open(path)?);
    read_vocab(reader)
}

/// Write [`VocabContents`] to a [`Write`] writer, in the load shape.
///
/// Added tokens are written in sorted order, so equal contents always
/// serialize identically.
///
/// ## Arguments
/// * `contents` - the vocabulary contents to write.
/// * `writer` - the writer to target.
pub fn write_vocab<T, W>(
    contents: &VocabContents<T>,
    writer: &mut W,
) -> BSResult<()>
where
    T: TokenType,
    W: Write,
{
    let vocab = contents
        .vocab
        .iter()
        .map(|(token, id)| {
            let id = id.to_u64().ok_or(BytespliceError::TokenOutOfRange)?;
            Ok((token.to_string(), id))
        })
        .collect::<BSResult<BTreeMap<String, u64>>>()?;

    let merges = contents
        .vocab
        .merge_ranks()
        .to_ordered_pairs()
        .into_iter()
        .map(|(left, right)| format!("{left} {right}"))
        .collect();

    let mut added_tokens = contents.added_tokens.clone();
    added_tokens.sort();

    let data = VocabFileData {
        vocab,
        merges,
        added_tokens,
        unk_token: contents.unk_token.clone(),
    };

    serde_json::to_writer_pretty(&mut *writer, &data)
        .map_err(|err| BytespliceError::Io(std::io::Error::other(err)))?;
    writeln!(writer)?;

    Ok(())
}

/// Save [`VocabContents`] to a JSON vocabulary file.
///
/// ## Arguments
/// * `contents` - the vocabulary contents to save.
/// * `path` - the path to save the vocabulary to.
pub fn save_vocab_path<T, P>(
    contents: &VocabContents<T>,
    path: P,
) -> BSResult<()>
where
    T: TokenType,
    P: AsRef<Path>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write_vocab(contents, &mut writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    type T = u32;

    fn sorted_entries(vocab: &SubwordVocab<T>) -> Vec<(String, T)> {
        let mut entries: Vec<_> = vocab
            .iter()
            .map(|(token, id)| (token.to_string(), id))
            .collect();
        entries.sort_by_key(|(_, id)| *id);
        entries
    }

    #[test]
    fn test_read_vocab() {
        let json = r#"{
            "vocab": {"a": 0, "b": 1, "ab": 2, "<|endoftext|>": 3},
            "merges": ["a b"],
            "added_tokens": ["<|endoftext|>"],
            "unk_token": "<|endoftext|>"
        }"#;

        let contents: VocabContents<T> = read_vocab(json.as_bytes()).unwrap();

        assert_eq!(contents.vocab.len(), 4);
        assert_eq!(contents.vocab.lookup_id("ab"), Some(2));
        assert_eq!(
            contents
                .vocab
                .merge_ranks()
                .rank_of(&(CompactString::from("a"), CompactString::from("b"))),
            Some(0),
        );
        assert_eq!(contents.added_tokens, vec!["<|endoftext|>"]);
        assert_eq!(contents.unk_token.as_deref(), Some("<|endoftext|>"));
    }

    #[test]
    fn test_read_vocab_optional_fields_default() {
        let json = r#"{"vocab": {"x": 0}, "merges": []}"#;

        let contents: VocabContents<T> = read_vocab(json.as_bytes()).unwrap();
        assert_eq!(contents.vocab.len(), 1);
        assert!(contents.added_tokens.is_empty());
        assert!(contents.unk_token.is_none());
    }

    #[test]
    fn test_read_vocab_invalid_json() {
        let err = read_vocab::<T, _>(b"not json at all".as_slice()).unwrap_err();
        assert!(matches!(err, BytespliceError::Parse(_)));
    }

    #[test]
    fn test_read_vocab_missing_field() {
        let err = read_vocab::<T, _>(br#"{"vocab": {"x": 0}}"#.as_slice()).unwrap_err();
        assert!(matches!(err, BytespliceError::VocabFormat(_)));
    }

    #[test]
    fn test_read_vocab_malformed_merge_rule() {
        for merges in [r#"["ab"]"#, r#"["a b c"]"#, r#"[" b"]"#] {
            let json = format!(r#"{{"vocab": {{"x": 0}}, "merges": {merges}}}"#);
            let err = read_vocab::<T, _>(json.as_bytes()).unwrap_err();
            assert!(matches!(err, BytespliceError::VocabFormat(_)));
        }
    }

    #[test]
    fn test_read_vocab_id_out_of_range() {
        let json = r#"{"vocab": {"x": 300}, "merges": []}"#;
        let err = read_vocab::<u8, _>(json.as_bytes()).unwrap_err();
        assert!(matches!(err, BytespliceError::TokenOutOfRange));
    }

    #[test]
    fn test_read_vocab_sparse_ids() {
        let json = r#"{"vocab": {"a": 0, "b": 7}, "merges": []}"#;
        let err = read_vocab::<T, _>(json.as_bytes()).unwrap_err();
        assert!(matches!(err, BytespliceError::VocabConflict(_)));
    }

    #[test]
    fn test_save_load_round_trip() {
        let entries = vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            ("ab".to_string(), 2),
            ("<|endoftext|>".to_string(), 3),
        ];
        let ranks = MergeRanks::from_ordered_pairs(vec![(
            CompactString::from("a"),
            CompactString::from("b"),
        )]);
        let contents = VocabContents::<T> {
            vocab: SubwordVocab::from_entries(entries, ranks).unwrap(),
            added_tokens: vec!["<|endoftext|>".to_string()],
            unk_token: Some("<|endoftext|>".to_string()),
        };

        tempdir::TempDir::new("vocab_test")
            .and_then(|dir| {
                let path = dir.path().join("vocab.json");

                save_vocab_path(&contents, &path).expect("Failed to save vocab");

                let loaded: VocabContents<T> =
                    load_vocab_path(&path).expect("Failed to load vocab");

                assert_eq!(sorted_entries(&loaded.vocab), sorted_entries(&contents.vocab));
                assert_eq!(
                    loaded.vocab.merge_ranks().to_ordered_pairs(),
                    contents.vocab.merge_ranks().to_ordered_pairs(),
                );
                assert_eq!(loaded.added_tokens, contents.added_tokens);
                assert_eq!(loaded.unk_token, contents.unk_token);

                Ok(())
            })
            .unwrap();
    }
}
