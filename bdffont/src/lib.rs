pub mod encode;
mod error;
pub mod header;
mod line;
pub mod parse;
pub mod pattern;


use std::io::{BufRead, Write};

use tracing::debug;

pub use crate::encode::{EncodedFontTable, FontDescriptor, FontTableEncoder};
pub use crate::error::Error;
pub use crate::line::DEFAULT_MAX_LINE_LENGTH;
pub use crate::parse::{read_font, BdfParser, Font, FontMetrics, GlyphRecord};
pub use crate::pattern::PixelSymbols;


/// Settings for a BDF-to-C conversion.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConvertOptions {
    /// The C identifier of the font structure; also prefixes the names of the tables.
    pub name: String,

    pub symbols: PixelSymbols,
    pub max_line_length: usize,
}
impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            name: "font".to_owned(),
            symbols: PixelSymbols::default(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}


/// Converts a BDF font into C source.
///
/// Glyphs are written as they are read. If an error occurs after the header has been read, the
/// output written up to that point remains in `writer`.
pub fn convert<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    options: &ConvertOptions,
) -> Result<EncodedFontTable, Error> {
    let mut parser = BdfParser::with_max_line_length(reader, options.max_line_length)?;
    let metrics = *parser.metrics();

    let mut encoder = FontTableEncoder::new(writer, &options.name, &metrics, options.symbols)?;
    loop {
        match parser.next_glyph() {
            Ok(Some(glyph)) => encoder.push_glyph(&glyph)?,
            Ok(None) => break,
            Err(e) => {
                // the comment of the glyph that overflowed the tables still gets written
                if let Some(rejected) = parser.rejected_glyph() {
                    encoder.write_glyph_comment(rejected)?;
                }
                return Err(e);
            },
        }
    }
    debug!("encoded {} of {} glyphs", encoder.glyphs_encoded(), metrics.glyph_count);

    encoder.finish()
}
