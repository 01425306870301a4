use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::encode::GENERATOR_VERSION;
use crate::error::Error;
use crate::pattern::PixelSymbols;


/// Writes the header declaring `struct bitmap_font` and one macro per byte value.
///
/// The macros let generated fonts spell out their bitmaps as pixel patterns: with the default
/// symbols, `#define X______X 0x81`.
pub fn write_font_header<W: Write>(writer: &mut W, symbols: PixelSymbols) -> Result<(), Error> {
    writeln!(writer, "// Created from bdf2c Version {}", GENERATOR_VERSION)?;
    writeln!(writer)?;
    writeln!(writer, "\t/// bitmap font structure")?;
    writeln!(writer, "struct bitmap_font {{")?;
    writeln!(writer, "\tunsigned char Width;\t\t///< max. character width")?;
    writeln!(writer, "\tunsigned char Height;\t\t///< character height")?;
    writeln!(writer, "\tunsigned short Chars;\t\t///< number of characters in font")?;
    writeln!(writer, "\tconst unsigned char *Widths;\t///< width of each character")?;
    writeln!(writer, "\tconst unsigned short *Index;\t///< encoding to character index")?;
    writeln!(writer, "\tconst unsigned char *Bitmap;\t///< bitmap of each character")?;
    writeln!(writer, "}};")?;
    writeln!(writer)?;

    writeln!(writer, "\t/// @{{ defines to have human readable font files")?;
    for byte in 0..=u8::MAX {
        let pattern: String = symbols.byte_pattern(byte).iter().collect();
        writeln!(writer, "#define {} 0x{:02X}", pattern, byte)?;
    }
    writeln!(writer, "\t/// @}}")?;

    writer.flush()?;
    Ok(())
}

/// Creates (or truncates) the file at `path` and writes the font header into it.
pub fn create_font_header_file(path: &Path, symbols: PixelSymbols) -> Result<(), Error> {
    let file = File::create(path)
        .map_err(|error| Error::UnopenableOutputFile { path: path.to_owned(), error })?;
    debug!("writing font header to {}", path.display());
    let mut writer = BufWriter::new(file);
    write_font_header(&mut writer, symbols)
}
