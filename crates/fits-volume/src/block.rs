/// FITS block size in bytes (each logical record is one block).
pub const BLOCK_SIZE: usize = 2880;

/// FITS card (keyword record) size in bytes.
pub const CARD_SIZE: usize = 80;

/// Number of cards that fit in a single block.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Padding byte used for header blocks (ASCII space).
pub const HEADER_PAD_BYTE: u8 = 0x20;

/// Returns the total byte length, in whole blocks, needed to hold `num_bytes`.
///
/// Zero bytes need zero blocks; anything else is rounded up to the next
/// multiple of [`BLOCK_SIZE`].
pub const fn padded_byte_len(num_bytes: usize) -> usize {
    num_bytes.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}
