use std::fmt;
use std::path::PathBuf;


#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    MissingGlyphCount,
    TooManyGlyphs { glyph_count: usize },
    AllocationFailure { glyph_count: usize },
    UnopenableOutputFile { path: PathBuf, error: std::io::Error },
    LineTooLong { line_number: usize, limit: usize },
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)
                => write!(f, "I/O error: {}", e),
            Self::MissingGlyphCount
                => write!(f, "need to know the number of characters (no positive CHARS value in header)"),
            Self::TooManyGlyphs { glyph_count }
                => write!(f, "too many bitmaps for characters (header declares {})", glyph_count),
            Self::AllocationFailure { glyph_count }
                => write!(f, "out of memory allocating tables for {} characters", glyph_count),
            Self::UnopenableOutputFile { path, error }
                => write!(f, "can't open file {:?}: {}", path, error),
            Self::LineTooLong { line_number, limit }
                => write!(f, "line {} is longer than {} bytes", line_number, limit),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::MissingGlyphCount => None,
            Self::TooManyGlyphs { .. } => None,
            Self::AllocationFailure { .. } => None,
            Self::UnopenableOutputFile { error, .. } => Some(error),
            Self::LineTooLong { .. } => None,
        }
    }
}
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self { Self::Io(value) }
}
