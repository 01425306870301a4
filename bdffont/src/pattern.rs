//! Human-readable pixel patterns.
//!
//! Bitmaps are emitted as runs of on/off symbols (`XXXX____`) instead of hex literals so that the
//! generated source shows the glyph shapes. The font header defines every 8-symbol pattern as a
//! macro expanding to its byte value.


/// The pair of symbols used for set and unset pixels.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PixelSymbols {
    pub on: char,
    pub off: char,
}
impl PixelSymbols {
    pub const fn new(on: char, off: char) -> Self {
        Self {
            on,
            off,
        }
    }

    fn symbol(&self, bit: bool) -> char {
        if bit { self.on } else { self.off }
    }

    /// Returns the four symbols of a nibble, most significant bit first.
    ///
    /// Only the lower four bits of `nibble` are considered.
    pub fn nibble_pattern(&self, nibble: u8) -> [char; 4] {
        let mut ret = [self.off; 4];
        for (i, c) in ret.iter_mut().enumerate() {
            *c = self.symbol(nibble & (0b1000 >> i) != 0);
        }
        ret
    }

    /// Returns the eight symbols of a byte, most significant bit first.
    pub fn byte_pattern(&self, byte: u8) -> [char; 8] {
        let mut ret = [self.off; 8];
        for (i, c) in ret.iter_mut().enumerate() {
            *c = self.symbol(byte & (0x80 >> i) != 0);
        }
        ret
    }

    /// Decodes a pattern of up to eight symbols back into its value.
    ///
    /// Returns `None` if the pattern is longer than eight symbols or contains a character that is
    /// neither the on nor the off symbol.
    pub fn decode_pattern(&self, pattern: &str) -> Option<u8> {
        let mut value: u8 = 0;
        for (i, c) in pattern.chars().enumerate() {
            if i >= 8 {
                return None;
            }
            value <<= 1;
            if c == self.on {
                value |= 1;
            } else if c != self.off {
                return None;
            }
        }
        Some(value)
    }
}
impl Default for PixelSymbols {
    fn default() -> Self {
        Self::new('X', '_')
    }
}


/// Decodes a hex digit into its nibble value.
///
/// Characters that are not hex digits decode to 0.
pub fn hex_digit_value(c: char) -> u8 {
    c.to_digit(16)
        .map(|d| d as u8)
        .unwrap_or(0)
}

/// Returns the nibbles of a row of hex digits, in order.
pub fn hex_nibbles(row: &str) -> impl Iterator<Item = u8> {
    row.chars().map(hex_digit_value)
}

/// Packs a row of hex digits into bytes, high nibble first.
///
/// A row with an odd number of digits is padded with an all-off nibble.
pub fn row_cells(row: &str) -> Vec<u8> {
    let nibbles: Vec<u8> = hex_nibbles(row).collect();
    nibbles
        .chunks(2)
        .map(|pair| {
            let low = pair.get(1).copied().unwrap_or(0);
            (pair[0] << 4) | low
        })
        .collect()
}
