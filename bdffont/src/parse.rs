use std::io::BufRead;

use tracing::debug;

use crate::error::Error;
use crate::line::{lenient_int, tokens, LineReader, DEFAULT_MAX_LINE_LENGTH};


/// The name given to a glyph whose `STARTCHAR` line is missing or empty.
pub const UNKNOWN_GLYPH_NAME: &str = "unknown character";

/// The encoding of a glyph without an `ENCODING` line.
pub const UNSET_ENCODING: i32 = -1;

/// The device width of a glyph without a `DWIDTH` line.
pub const UNSET_DEVICE_WIDTH: i32 = i32::MIN;


/// Global metrics from the font header.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FontMetrics {
    pub bounding_box_width: i32,
    pub bounding_box_height: i32,

    // always positive once the header has been read
    pub glyph_count: usize,
}

/// The `BBX` of a single glyph.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BoundingBox {
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: i32,
    pub height: i32,
}

/// A single glyph as read from a BDF file.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GlyphRecord {
    pub name: String,
    pub encoding: i32,
    pub device_width: i32,
    pub bbox: BoundingBox,

    /// The scanlines of the bitmap as hex digit strings, top to bottom.
    pub rows: Vec<String>,
}
impl Default for GlyphRecord {
    fn default() -> Self {
        Self {
            name: UNKNOWN_GLYPH_NAME.to_owned(),
            encoding: UNSET_ENCODING,
            device_width: UNSET_DEVICE_WIDTH,
            bbox: BoundingBox::default(),
            rows: Vec::new(),
        }
    }
}

/// A fully read font.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Font {
    pub metrics: FontMetrics,
    pub glyphs: Vec<GlyphRecord>,
}


/// The meaning of a single line of BDF.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
enum Directive {
    Blank,
    FontBoundingBox { width: i32, height: i32 },
    Chars(i32),
    StartChar(Option<String>),
    Encoding(i32),
    DeviceWidth(i32),
    BoundingBox(BoundingBox),
    Bitmap,
    EndChar,

    // anything else; carries the first token, which may be a bitmap row
    Other(String),
}
impl Directive {
    fn parse(line: &[u8]) -> Self {
        let mut pieces = tokens(line);
        let Some(keyword) = pieces.next() else {
            return Self::Blank;
        };

        if keyword.eq_ignore_ascii_case(b"FONTBOUNDINGBOX") {
            let width = lenient_int(pieces.next());
            let height = lenient_int(pieces.next());
            Self::FontBoundingBox { width, height }
        } else if keyword.eq_ignore_ascii_case(b"CHARS") {
            Self::Chars(lenient_int(pieces.next()))
        } else if keyword.eq_ignore_ascii_case(b"STARTCHAR") {
            let name = pieces.next()
                .map(|n| String::from_utf8_lossy(n).into_owned());
            Self::StartChar(name)
        } else if keyword.eq_ignore_ascii_case(b"ENCODING") {
            Self::Encoding(lenient_int(pieces.next()))
        } else if keyword.eq_ignore_ascii_case(b"DWIDTH") {
            Self::DeviceWidth(lenient_int(pieces.next()))
        } else if keyword.eq_ignore_ascii_case(b"BBX") {
            // note the order: width and height come first
            let width = lenient_int(pieces.next());
            let height = lenient_int(pieces.next());
            let x_offset = lenient_int(pieces.next());
            let y_offset = lenient_int(pieces.next());
            Self::BoundingBox(BoundingBox {
                x_offset,
                y_offset,
                width,
                height,
            })
        } else if keyword.eq_ignore_ascii_case(b"BITMAP") {
            Self::Bitmap
        } else if keyword.eq_ignore_ascii_case(b"ENDCHAR") {
            Self::EndChar
        } else {
            Self::Other(String::from_utf8_lossy(keyword).into_owned())
        }
    }
}


/// A streaming BDF parser.
///
/// Constructing the parser reads the font header up to and including the `CHARS` line. The
/// glyphs are then obtained one by one, either through [`BdfParser::next_glyph`] or by iterating
/// over the parser.
///
/// Parsing stops at EOF or at the first blank line. A glyph that is still open at that point is
/// returned as if it had been closed by `ENDCHAR`.
#[derive(Debug)]
pub struct BdfParser<R: BufRead> {
    lines: LineReader<R>,
    metrics: FontMetrics,
    pending: GlyphRecord,
    current: Option<GlyphRecord>,
    glyphs_started: usize,
    finished: bool,

    // the BITMAP that exceeded the declared glyph count
    rejected: Option<GlyphRecord>,
    deferred_error: Option<Error>,
}
impl<R: BufRead> BdfParser<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        Self::with_max_line_length(reader, DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_line_length(reader: R, max_line_length: usize) -> Result<Self, Error> {
        let mut lines = LineReader::new(reader, max_line_length);
        let metrics = Self::read_header(&mut lines)?;
        Ok(Self {
            lines,
            metrics,
            pending: GlyphRecord::default(),
            current: None,
            glyphs_started: 0,
            finished: false,
            rejected: None,
            deferred_error: None,
        })
    }

    fn read_header(lines: &mut LineReader<R>) -> Result<FontMetrics, Error> {
        let mut bounding_box_width = 0;
        let mut bounding_box_height = 0;
        let mut chars = 0;

        while let Some(line) = lines.next_line()? {
            match Directive::parse(line) {
                Directive::Blank => break,
                Directive::FontBoundingBox { width, height } => {
                    bounding_box_width = width;
                    bounding_box_height = height;
                },
                Directive::Chars(c) => {
                    // anything after CHARS belongs to the glyphs
                    chars = c;
                    break;
                },
                _ => {},
            }
        }

        debug!(
            "header: {} characters, bounding box {}x{}",
            chars, bounding_box_width, bounding_box_height,
        );

        let glyph_count = usize::try_from(chars)
            .ok()
            .filter(|&c| c > 0)
            .ok_or(Error::MissingGlyphCount)?;
        Ok(FontMetrics {
            bounding_box_width,
            bounding_box_height,
            glyph_count,
        })
    }

    pub fn metrics(&self) -> &FontMetrics { &self.metrics }

    /// The number of glyphs whose `BITMAP` line has been encountered so far.
    pub fn glyphs_started(&self) -> usize { self.glyphs_started }

    /// The pending fields of the glyph whose `BITMAP` line failed with [`Error::TooManyGlyphs`].
    pub fn rejected_glyph(&self) -> Option<&GlyphRecord> { self.rejected.as_ref() }

    /// Returns the next glyph, or `Ok(None)` once the glyph section has ended.
    pub fn next_glyph(&mut self) -> Result<Option<GlyphRecord>, Error> {
        if self.finished {
            return Ok(None);
        }

        let res = self.advance();
        if !matches!(res, Ok(Some(_))) {
            self.finished = true;
        }
        res
    }

    fn advance(&mut self) -> Result<Option<GlyphRecord>, Error> {
        if let Some(error) = self.deferred_error.take() {
            return Err(error);
        }

        loop {
            let Some(line) = self.lines.next_line()? else {
                // EOF
                return Ok(self.current.take());
            };
            let directive = Directive::parse(line);
            let header_keyword = match &directive {
                Directive::FontBoundingBox { .. } | Directive::Chars(_) => tokens(line)
                    .next()
                    .map(|t| String::from_utf8_lossy(t).into_owned()),
                _ => None,
            };

            match directive {
                Directive::Blank => {
                    debug!("blank line {} ends the glyph section", self.lines.line_number());
                    return Ok(self.current.take());
                },
                Directive::StartChar(name) => {
                    self.pending = GlyphRecord::default();
                    if let Some(name) = name {
                        self.pending.name = name;
                    }
                },
                Directive::Encoding(encoding) => {
                    self.pending.encoding = encoding;
                },
                Directive::DeviceWidth(device_width) => {
                    self.pending.device_width = device_width;
                },
                Directive::BoundingBox(bbox) => {
                    self.pending.bbox = bbox;
                },
                Directive::Bitmap => {
                    // a BITMAP without ENDCHAR before it implicitly closes the previous glyph
                    let previous = self.current.take();

                    if self.glyphs_started == self.metrics.glyph_count {
                        self.rejected = Some(self.pending.clone());
                        let error = Error::TooManyGlyphs { glyph_count: self.metrics.glyph_count };
                        if previous.is_some() {
                            // the open glyph is complete; fail on the next call
                            self.deferred_error = Some(error);
                            return Ok(previous);
                        }
                        return Err(error);
                    }
                    self.glyphs_started += 1;

                    let glyph = self.pending.clone();
                    debug!(
                        "glyph {}: {:?} encoding {} width {}",
                        self.glyphs_started, glyph.name, glyph.encoding, glyph.device_width,
                    );
                    self.current = Some(glyph);

                    if previous.is_some() {
                        return Ok(previous);
                    }
                },
                Directive::EndChar => {
                    if let Some(glyph) = self.current.take() {
                        return Ok(Some(glyph));
                    }
                },
                Directive::FontBoundingBox { .. } | Directive::Chars(_) => {
                    // header keywords carry no meaning here, but inside a bitmap they are rows
                    if let (Some(glyph), Some(token)) = (self.current.as_mut(), header_keyword) {
                        glyph.rows.push(token);
                    }
                },
                Directive::Other(token) => {
                    if let Some(glyph) = self.current.as_mut() {
                        glyph.rows.push(token);
                    }
                },
            }
        }
    }
}
impl<R: BufRead> Iterator for BdfParser<R> {
    type Item = Result<GlyphRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_glyph().transpose()
    }
}


/// Reads a whole BDF font into memory.
pub fn read_font<R: BufRead>(reader: R) -> Result<Font, Error> {
    let mut parser = BdfParser::new(reader)?;
    let mut glyphs = Vec::new();
    while let Some(glyph) = parser.next_glyph()? {
        glyphs.push(glyph);
    }
    Ok(Font {
        metrics: *parser.metrics(),
        glyphs,
    })
}
