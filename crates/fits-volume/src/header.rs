//! FITS header card parsing and serialization.

use alloc::vec;
use alloc::vec::Vec;
use core::str;

use crate::block::{BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE, HEADER_PAD_BYTE};
use crate::error::{Error, Result};
use crate::value::{format_value, parse_value, Value};

/// A parsed FITS header card (one 80-byte keyword record).
///
/// Comments are not retained; nothing downstream reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// The 8-byte keyword name, ASCII, left-justified, space-padded.
    pub keyword: [u8; 8],
    /// The parsed value, if this card has a value indicator (`= ` in bytes 8..10).
    pub value: Option<Value>,
}

impl Card {
    /// Build a valued card from a keyword of up to eight characters.
    pub fn new(keyword: &str, value: Value) -> Self {
        Card {
            keyword: keyword_bytes(keyword),
            value: Some(value),
        }
    }

    /// Return the keyword as a trimmed UTF-8 string.
    pub fn keyword_str(&self) -> &str {
        let end = self
            .keyword
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |i| i + 1);
        str::from_utf8(&self.keyword[..end]).unwrap_or("")
    }

    /// Returns `true` if this card is the END keyword.
    pub fn is_end(&self) -> bool {
        &self.keyword == b"END     "
    }
}

/// Pad a keyword name to 8 bytes with trailing ASCII spaces.
pub fn keyword_bytes(name: &str) -> [u8; 8] {
    let mut buf = [b' '; 8];
    let bytes = name.as_bytes();
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Find the value of the first card carrying `keyword`.
pub fn find_value<'a>(cards: &'a [Card], keyword: &str) -> Option<&'a Value> {
    cards
        .iter()
        .find(|c| c.keyword_str() == keyword)
        .and_then(|c| c.value.as_ref())
}

/// Parse a single 80-byte FITS header card.
///
/// COMMENT, HISTORY and blank keywords never carry values, nor does any card
/// without the `= ` indicator.
pub fn parse_card(card_bytes: &[u8; CARD_SIZE]) -> Result<Card> {
    let mut keyword = [b' '; 8];
    keyword.copy_from_slice(&card_bytes[..8]);

    if !keyword
        .iter()
        .all(|b| matches!(b, b'A'..=b'Z' | b'0'..=b'9' | b' ' | b'-' | b'_'))
    {
        return Err(Error::InvalidKeyword);
    }

    let commentary = matches!(&keyword, b"COMMENT " | b"HISTORY " | b"        " | b"END     ");
    let value = if !commentary && &card_bytes[8..10] == b"= " {
        parse_value(&card_bytes[10..])
    } else {
        None
    };

    Ok(Card { keyword, value })
}

/// Parse consecutive 2880-byte header blocks until the END card is found.
///
/// Returns the cards (END included) and the number of bytes the header
/// occupies, which is always a multiple of [`BLOCK_SIZE`].
pub fn parse_header_blocks(data: &[u8]) -> Result<(Vec<Card>, usize)> {
    let mut cards = Vec::new();

    for (block_idx, block) in data.chunks_exact(BLOCK_SIZE).enumerate() {
        for card_bytes in block.chunks_exact(CARD_SIZE) {
            let card_bytes: &[u8; CARD_SIZE] = card_bytes
                .try_into()
                .map_err(|_| Error::InvalidHeader("short card"))?;
            let card = parse_card(card_bytes)?;
            let is_end = card.is_end();
            cards.push(card);
            if is_end {
                log::trace!("header END found in block {block_idx}");
                return Ok((cards, (block_idx + 1) * BLOCK_SIZE));
            }
        }
    }

    Err(Error::UnexpectedEof)
}

/// Serialize a [`Card`] into an 80-byte FITS card image.
pub fn format_card(card: &Card) -> [u8; CARD_SIZE] {
    let mut buf = [b' '; CARD_SIZE];
    buf[..8].copy_from_slice(&card.keyword);
    if let Some(ref value) = card.value {
        buf[8] = b'=';
        buf[10..].copy_from_slice(&format_value(value));
    }
    buf
}

/// Serialize header cards into complete FITS header blocks.
///
/// Appends the END card and pads the final block with spaces.
pub fn serialize_header(cards: &[Card]) -> Vec<u8> {
    let total_cards = cards.len() + 1;
    let total_bytes = total_cards.div_ceil(CARDS_PER_BLOCK) * BLOCK_SIZE;
    let mut buf = vec![HEADER_PAD_BYTE; total_bytes];

    for (chunk, card) in buf.chunks_exact_mut(CARD_SIZE).zip(cards) {
        chunk.copy_from_slice(&format_card(card));
    }

    let end_offset = cards.len() * CARD_SIZE;
    buf[end_offset..end_offset + 3].copy_from_slice(b"END");
    buf
}
