use std::io::Write;

use tracing::{debug, warn};

use crate::error::Error;
use crate::parse::{FontMetrics, GlyphRecord};
use crate::pattern::{hex_nibbles, row_cells, PixelSymbols};


/// The version announced in the banner of generated files.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");


/// The `bitmap_font` structure literal that concludes the generated source.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FontDescriptor {
    pub name: String,
    pub width: i32,
    pub height: i32,

    // as declared by CHARS, even if fewer glyphs were encoded
    pub chars: usize,

    pub widths_ref: String,
    pub index_ref: String,
    pub bitmap_ref: String,
}
impl FontDescriptor {
    pub fn new(name: &str, metrics: &FontMetrics) -> Self {
        Self {
            name: name.to_owned(),
            width: metrics.bounding_box_width,
            height: metrics.bounding_box_height,
            chars: metrics.glyph_count,
            widths_ref: format!("__{}_widths__", name),
            index_ref: format!("__{}_index__", name),
            bitmap_ref: format!("__{}_bitmap__", name),
        }
    }
}

/// The tables produced by encoding a font.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EncodedFontTable {
    /// Every row of every glyph packed into bytes, high nibble first; odd rows padded with zero.
    pub bitmap: Vec<u8>,

    pub width_table: Vec<i32>,
    pub encoding_table: Vec<i32>,
    pub descriptor: FontDescriptor,
}


/// Writes C source for a font, one glyph at a time.
///
/// Creating the encoder writes the preamble and opens the bitmap array. Each glyph passed to
/// [`FontTableEncoder::push_glyph`] is written immediately; [`FontTableEncoder::finish`] writes the
/// width and encoding tables and the descriptor.
#[derive(Debug)]
pub struct FontTableEncoder<W: Write> {
    writer: W,
    symbols: PixelSymbols,
    descriptor: FontDescriptor,
    bitmap: Vec<u8>,
    width_table: Vec<i32>,
    encoding_table: Vec<i32>,
}
impl<W: Write> FontTableEncoder<W> {
    pub fn new(writer: W, name: &str, metrics: &FontMetrics, symbols: PixelSymbols) -> Result<Self, Error> {
        let glyph_count = metrics.glyph_count;

        let mut width_table = Vec::new();
        width_table.try_reserve_exact(glyph_count)
            .map_err(|_| Error::AllocationFailure { glyph_count })?;
        let mut encoding_table = Vec::new();
        encoding_table.try_reserve_exact(glyph_count)
            .map_err(|_| Error::AllocationFailure { glyph_count })?;

        let mut encoder = Self {
            writer,
            symbols,
            descriptor: FontDescriptor::new(name, metrics),
            bitmap: Vec::new(),
            width_table,
            encoding_table,
        };
        encoder.write_preamble()?;
        Ok(encoder)
    }

    fn write_preamble(&mut self) -> Result<(), Error> {
        writeln!(self.writer, "// Created from bdf2c Version {}", GENERATOR_VERSION)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "#include \"font.h\"")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "\t/// character bitmap for each encoding")?;
        writeln!(self.writer, "static const unsigned char {}[] = {{", self.descriptor.bitmap_ref)?;
        Ok(())
    }

    pub fn glyphs_encoded(&self) -> usize { self.width_table.len() }

    /// Writes a glyph's comment and bitmap rows and records its width and encoding.
    ///
    /// Fails with [`Error::TooManyGlyphs`] if the declared number of glyphs has already been
    /// encoded.
    pub fn push_glyph(&mut self, glyph: &GlyphRecord) -> Result<(), Error> {
        if self.width_table.len() == self.descriptor.chars {
            return Err(Error::TooManyGlyphs { glyph_count: self.descriptor.chars });
        }

        self.write_glyph_comment(glyph)?;
        for row in &glyph.rows {
            self.write_row(row)?;
            self.bitmap.extend(row_cells(row));
        }

        self.width_table.push(glyph.device_width);
        self.encoding_table.push(glyph.encoding);
        Ok(())
    }

    /// Writes the two comment lines that precede a glyph's rows.
    ///
    /// [`FontTableEncoder::push_glyph`] calls this itself; call it directly only for a glyph that
    /// is not going to be pushed, such as [`crate::BdfParser::rejected_glyph`].
    pub fn write_glyph_comment(&mut self, glyph: &GlyphRecord) -> Result<(), Error> {
        writeln!(
            self.writer,
            "// {:3} ${:02x} '{}'",
            glyph.encoding, c_unsigned(glyph.encoding), glyph.name,
        )?;
        writeln!(
            self.writer,
            "//\twidth {}, bbx {}, bby {}, bbw {}, bbh {}",
            glyph.device_width, glyph.bbox.x_offset, glyph.bbox.y_offset, glyph.bbox.width, glyph.bbox.height,
        )?;
        Ok(())
    }

    fn write_row(&mut self, row: &str) -> Result<(), Error> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            if !row.chars().all(|c| c.is_ascii_hexdigit()) {
                debug!("row {:?} contains non-hex characters; treating them as 0", row);
            }
        }

        let mut line = String::with_capacity(1 + 5 * row.len() + 5);
        line.push('\t');
        let mut digit_count = 0;
        for nibble in hex_nibbles(row) {
            line.extend(self.symbols.nibble_pattern(nibble));
            digit_count += 1;
            if digit_count % 2 == 0 {
                line.push(',');
            }
        }
        if digit_count % 2 == 1 {
            // fill the last cell
            line.extend(self.symbols.nibble_pattern(0));
            line.push(',');
        }
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    /// Writes the remaining tables and the descriptor and returns everything that was encoded.
    pub fn finish(mut self) -> Result<EncodedFontTable, Error> {
        if self.width_table.len() < self.descriptor.chars {
            warn!(
                "font declares {} characters but only {} were encoded",
                self.descriptor.chars, self.width_table.len(),
            );
        }

        let w = &mut self.writer;
        let d = &self.descriptor;

        writeln!(w, "}};")?;
        writeln!(w)?;
        writeln!(w, "\t/// character width for each encoding")?;
        writeln!(w, "static const unsigned char {}[] = {{", d.widths_ref)?;
        for &width in &self.width_table {
            writeln!(w, "\t{},", c_unsigned(width))?;
        }

        writeln!(w, "}};")?;
        writeln!(w)?;
        writeln!(w, "\t/// character encoding for each index entry")?;
        writeln!(w, "static const unsigned short {}[] = {{", d.index_ref)?;
        for &encoding in &self.encoding_table {
            writeln!(w, "\t{},", c_unsigned(encoding))?;
        }

        writeln!(w, "}};")?;
        writeln!(w)?;
        writeln!(w, "\t/// bitmap font structure")?;
        writeln!(w, "const struct bitmap_font {} = {{", d.name)?;
        writeln!(w, "\t.Width = {}, .Height = {},", d.width, d.height)?;
        writeln!(w, "\t.Chars = {},", d.chars)?;
        writeln!(w, "\t.Widths = {},", d.widths_ref)?;
        writeln!(w, "\t.Index = {},", d.index_ref)?;
        writeln!(w, "\t.Bitmap = {},", d.bitmap_ref)?;
        writeln!(w, "}};")?;
        writeln!(w)?;
        w.flush()?;

        Ok(EncodedFontTable {
            bitmap: self.bitmap,
            width_table: self.width_table,
            encoding_table: self.encoding_table,
            descriptor: self.descriptor,
        })
    }
}


/// Reinterprets a value the way `%u` prints it.
fn c_unsigned(value: i32) -> u32 {
    value as u32
}


#[cfg(test)]
mod tests {
    use super::{FontTableEncoder, GENERATOR_VERSION};
    use crate::error::Error;
    use crate::parse::{BoundingBox, FontMetrics, GlyphRecord};
    use crate::pattern::PixelSymbols;

    fn glyph(encoding: i32, device_width: i32, rows: &[&str]) -> GlyphRecord {
        GlyphRecord {
            name: format!("g{}", encoding),
            encoding,
            device_width,
            bbox: BoundingBox { x_offset: 0, y_offset: -1, width: 8, height: 2 },
            rows: rows.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn metrics(glyph_count: usize) -> FontMetrics {
        FontMetrics {
            bounding_box_width: 8,
            bounding_box_height: 2,
            glyph_count,
        }
    }

    #[test]
    fn test_encode_single_glyph() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "tiny", &metrics(1), PixelSymbols::default())
            .unwrap();
        encoder.push_glyph(&glyph(65, 8, &["FF", "81"])).unwrap();
        let table = encoder.finish().unwrap();

        assert_eq!(table.bitmap, vec![0xFF, 0x81]);
        assert_eq!(table.width_table, vec![8]);
        assert_eq!(table.encoding_table, vec![65]);
        assert_eq!(table.descriptor.chars, 1);
        assert_eq!(table.descriptor.bitmap_ref, "__tiny_bitmap__");

        let expected = format!("\
// Created from bdf2c Version {}

#include \"font.h\"

\t/// character bitmap for each encoding
static const unsigned char __tiny_bitmap__[] = {{
//  65 $41 'g65'
//\twidth 8, bbx 0, bby -1, bbw 8, bbh 2
\tXXXXXXXX,
\tX______X,
}};

\t/// character width for each encoding
static const unsigned char __tiny_widths__[] = {{
\t8,
}};

\t/// character encoding for each index entry
static const unsigned short __tiny_index__[] = {{
\t65,
}};

\t/// bitmap font structure
const struct bitmap_font tiny = {{
\t.Width = 8, .Height = 2,
\t.Chars = 1,
\t.Widths = __tiny_widths__,
\t.Index = __tiny_index__,
\t.Bitmap = __tiny_bitmap__,
}};

", GENERATOR_VERSION);
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[test]
    fn test_odd_rows_are_padded() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "font", &metrics(1), PixelSymbols::default())
            .unwrap();
        encoder.push_glyph(&glyph(1, 4, &["F", "a5c"])).unwrap();
        let table = encoder.finish().unwrap();

        assert_eq!(table.bitmap, vec![0xF0, 0xA5, 0xC0]);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\n\tXXXX____,\n"));
        assert!(text.contains("\n\tX_X__X_X,XX______,\n"));
    }

    #[test]
    fn test_negative_values_print_unsigned() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "font", &metrics(1), PixelSymbols::default())
            .unwrap();
        encoder.push_glyph(&glyph(-1, i32::MIN, &[])).unwrap();
        encoder.finish().unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\n//  -1 $ffffffff 'g-1'\n"));
        assert!(text.contains("__font_widths__[] = {\n\t2147483648,\n};"));
        assert!(text.contains("__font_index__[] = {\n\t4294967295,\n};"));
    }

    #[test]
    fn test_fewer_glyphs_than_declared() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "font", &metrics(2), PixelSymbols::default())
            .unwrap();
        encoder.push_glyph(&glyph(65, 8, &["FF"])).unwrap();
        let table = encoder.finish().unwrap();

        assert_eq!(table.width_table.len(), 1);
        assert_eq!(table.encoding_table.len(), 1);
        assert_eq!(table.descriptor.chars, 2);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\t.Chars = 2,\n"));
    }

    #[test]
    fn test_empty_glyph_does_not_disturb_neighbours() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "font", &metrics(3), PixelSymbols::default())
            .unwrap();
        encoder.push_glyph(&glyph(1, 3, &["80"])).unwrap();
        encoder.push_glyph(&glyph(2, 4, &[])).unwrap();
        encoder.push_glyph(&glyph(3, 5, &["01"])).unwrap();
        let table = encoder.finish().unwrap();

        assert_eq!(table.bitmap, vec![0x80, 0x01]);
        assert_eq!(table.width_table, vec![3, 4, 5]);
        assert_eq!(table.encoding_table, vec![1, 2, 3]);

        let text = String::from_utf8(output).unwrap();
        let bitmap_lines = text
            .lines()
            .filter(|l| l.len() > 1 && l.starts_with('\t') && l[1..].chars().all(|c| c == 'X' || c == '_' || c == ','))
            .count();
        assert_eq!(bitmap_lines, 2);
    }

    #[test]
    fn test_custom_symbols() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "font", &metrics(1), PixelSymbols::new('#', '.'))
            .unwrap();
        encoder.push_glyph(&glyph(7, 8, &["3C"])).unwrap();
        encoder.finish().unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\n\t..####..,\n"));
    }

    #[test]
    fn test_push_beyond_capacity() {
        let mut output = Vec::new();
        let mut encoder = FontTableEncoder::new(&mut output, "font", &metrics(1), PixelSymbols::default())
            .unwrap();
        encoder.push_glyph(&glyph(1, 1, &[])).unwrap();
        match encoder.push_glyph(&glyph(2, 1, &[])) {
            Err(Error::TooManyGlyphs { glyph_count }) => assert_eq!(glyph_count, 1),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_allocation_failure() {
        let mut output = Vec::new();
        let res = FontTableEncoder::new(&mut output, "font", &metrics(usize::MAX), PixelSymbols::default());
        match res {
            Err(Error::AllocationFailure { glyph_count }) => assert_eq!(glyph_count, usize::MAX),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
        assert!(output.is_empty());
    }
}
