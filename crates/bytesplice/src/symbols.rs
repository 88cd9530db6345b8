//! # Byte Symbol Codec
//!
//! GPT-2 style byte-level vocabularies do not store raw bytes; they store
//! printable stand-in characters. Bytes which are already non-whitespace
//! printable under ISO/IEC 8859-1 represent themselves; the remaining bytes
//! borrow unused code points starting at `U+0100`.
//!
//! Handle extended ascii (<https://en.wikipedia.org/wiki/Extended_ASCII>)
//! Assume ISO/IEC 8859-1 (<https://en.wikipedia.org/wiki/ISO/IEC_8859-1>)
//! non-whitespace printable character range:
//! `[0x21-0x7E]`, `[0xA1-0xAD)`, `(0xAD-0xFF]`

use once_cell::sync::Lazy;

use crate::errors::{BSResult, BytespliceError};
use crate::types::{CommonHashMap, hash_map_with_capacity};

/// Bijective codec between raw bytes and their printable symbol characters.
#[derive(Debug, Clone)]
pub struct ByteSymbolCodec {
    /// Symbol character for each byte value.
    byte_symbols: [char; 256],

    /// Byte value for each vocabulary rank; printable bytes in ascending
    /// order first, then the remapped bytes in ascending order.
    rank_bytes: [u8; 256],

    /// Inverse of `byte_symbols`.
    symbol_bytes: CommonHashMap<char, u8>,
}

impl Default for ByteSymbolCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSymbolCodec {
    /// Build the codec tables.
    pub fn new() -> Self {
        let mut ranked: Vec<u8> = vec![];
        ranked.extend(0x21..=0x7E);
        ranked.extend(0xA1..0xAD);
        ranked.extend(0xAE..=0xFF);

        let mut byte_symbols = ['\0'; 256];
        let mut symbol_bytes: CommonHashMap<char, u8> = hash_map_with_capacity(256);

        // Printable bytes stand for themselves.
        for &b in &ranked {
            let c = char::from(b);
            byte_symbols[b as usize] = c;
            symbol_bytes.insert(c, b);
        }

        // The rest borrow code points just past the one-byte char range,
        // assigned in ascending byte order.
        let mut n = 0u32;
        for b in 0..=255u8 {
            if !ranked.contains(&b) {
                ranked.push(b);

                let c = char::from_u32(256 + n).unwrap();
                byte_symbols[b as usize] = c;
                symbol_bytes.insert(c, b);

                n += 1;
            }
        }
        assert_eq!(n, 68);
        assert_eq!(ranked.len(), 256);
        assert_eq!(symbol_bytes.len(), 256);

        let mut rank_bytes = [0u8; 256];
        rank_bytes.copy_from_slice(&ranked);

        Self {
            byte_symbols,
            rank_bytes,
            symbol_bytes,
        }
    }

    /// Get the process-wide shared codec.
    ///
    /// The tables are fixed, so every instance is identical; most callers
    /// should borrow this one instead of building their own.
    pub fn shared() -> &'static Self {
        static SHARED: Lazy<ByteSymbolCodec> = Lazy::new(ByteSymbolCodec::new);
        &SHARED
    }

    /// Get the symbol character for a byte.
    #[inline(always)]
    pub fn symbol_for(
        &self,
        byte: u8,
    ) -> char {
        self.byte_symbols[byte as usize]
    }

    /// Get the byte for a symbol character, if it is one.
    #[inline(always)]
    pub fn byte_for(
        &self,
        symbol: char,
    ) -> Option<u8> {
        self.symbol_bytes.get(&symbol).copied()
    }

    /// Byte values in vocabulary rank order.
    ///
    /// Rank order is the id order GPT-2 assigns to the 256 one-byte tokens;
    /// trainers use it for initial id assignment.
    pub fn rank_bytes(&self) -> &[u8; 256] {
        &self.rank_bytes
    }

    /// Encode raw bytes as a symbol string.
    ///
    /// ## Arguments
    /// * `bytes` - The bytes to encode; need not be valid UTF-8.
    ///
    /// ## Returns
    /// One symbol character per input byte.
    pub fn encode_bytes(
        &self,
        bytes: &[u8],
    ) -> String {
        bytes.iter().map(|&b| self.symbol_for(b)).collect()
    }

    /// Encode a string's UTF-8 bytes as a symbol string.
    pub fn encode_str(
        &self,
        text: &str,
    ) -> String {
        self.encode_bytes(text.as_bytes())
    }

    /// Decode a symbol string back to bytes.
    ///
    /// ## Arguments
    /// * `symbols` - The symbol string to decode.
    ///
    /// ## Returns
    /// The decoded bytes; or `InvalidSymbol` for a char outside the table.
    pub fn decode_symbols(
        &self,
        symbols: &str,
    ) -> BSResult<Vec<u8>> {
        symbols
            .chars()
            .map(|c| {
                self.byte_for(c)
                    .ok_or(BytespliceError::InvalidSymbol { symbol: c })
            })
            .collect()
    }

    /// Decode a symbol string back to bytes, replacing chars outside the
    /// table with the UTF-8 encoding of `U+FFFD`.
    pub fn decode_symbols_lossy(
        &self,
        symbols: &str,
    ) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(symbols.len());
        for c in symbols.chars() {
            match self.byte_for(c) {
                Some(b) => bytes.push(b),
                None => bytes.extend_from_slice("\u{FFFD}".as_bytes()),
            }
        }
        bytes
    }
}
