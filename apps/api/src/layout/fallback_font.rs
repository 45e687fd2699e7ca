//! A TrueType/OpenType font loaded once at startup and embedded into PDF captures for
//! text the standard Helvetica faces cannot encode (anything outside WinAnsi).
//!
//! Glyph lookups and advance widths are read eagerly, so measuring during layout
//! never re-parses the font.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use ttf_parser::GlyphId;

use crate::layout::font_metrics::GlyphWidths;

/// Common install locations tried when no font is configured explicitly.
const CANDIDATE_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arialuni.ttf",
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("cannot read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse font {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("font collections are not supported ({0}); point to a single .ttf or .otf")]
    Collection(String),
}

/// How the font program is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlines {
    /// `glyf` outlines: CIDFontType2 with a FontFile2 stream.
    TrueType,
    /// CFF outlines (`OTTO`): CIDFontType0 with an OpenType FontFile3 stream.
    Cff,
}

pub struct FallbackFont {
    /// Path or label the font was loaded from.
    pub source: String,
    pub postscript_name: String,
    pub outlines: Outlines,
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
    italic_angle: f32,
    glyphs: HashMap<char, u16>,
    /// Advance width per glyph id, in 1/1000 em.
    advances: Vec<u16>,
}

impl fmt::Debug for FallbackFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackFont")
            .field("source", &self.source)
            .field("postscript_name", &self.postscript_name)
            .field("outlines", &self.outlines)
            .field("glyphs", &self.glyphs.len())
            .finish()
    }
}

impl FallbackFont {
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path.display().to_string(), data)
    }

    /// Tries the well-known system locations and returns the first font that parses.
    pub fn discover() -> Option<Self> {
        CANDIDATE_PATHS
            .iter()
            .map(Path::new)
            .filter(|p| p.is_file())
            .find_map(|p| Self::load(p).ok())
    }

    pub fn from_bytes(source: impl Into<String>, data: Vec<u8>) -> Result<Self, FontError> {
        let source = source.into();
        if data.starts_with(b"ttcf") {
            return Err(FontError::Collection(source));
        }
        let outlines = if data.starts_with(b"OTTO") {
            Outlines::Cff
        } else {
            Outlines::TrueType
        };

        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| FontError::Parse {
            source_name: source.clone(),
            reason: e.to_string(),
        })?;

        let units_per_em = face.units_per_em();
        let mut glyphs = HashMap::new();
        for code in 0..=0xFFFF_u32 {
            if let Some(c) = char::from_u32(code) {
                if let Some(glyph) = face.glyph_index(c).filter(|g| g.0 != 0) {
                    glyphs.insert(c, glyph.0);
                }
            }
        }
        let advances = (0..face.number_of_glyphs())
            .map(|gid| {
                let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
                (u32::from(advance) * 1000 / u32::from(units_per_em)) as u16
            })
            .collect();

        let postscript_name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|name| name.to_string())
            .map(|name| pdf_name(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "FolioFallback".to_string());
        let rect = face.global_bounding_box();

        Ok(Self {
            postscript_name,
            outlines,
            units_per_em,
            ascender: face.ascender(),
            descender: face.descender(),
            cap_height: face.capital_height().unwrap_or(face.ascender()),
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            italic_angle: face.italic_angle().unwrap_or(0.0),
            glyphs,
            advances,
            source,
            data,
        })
    }

    /// Glyph id for `c`, or `None` if the font has no glyph for it.
    pub fn glyph(&self, c: char) -> Option<u16> {
        self.glyphs.get(&c).copied()
    }

    /// Advance width of a glyph in 1/1000 em.
    pub fn advance(&self, glyph: u16) -> u16 {
        self.advances.get(usize::from(glyph)).copied().unwrap_or(1000)
    }

    /// The font program, embedded verbatim.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Converts a value in font units to 1/1000 em.
    pub fn to_pdf_units(&self, value: i16) -> i32 {
        i32::from(value) * 1000 / i32::from(self.units_per_em)
    }

    pub fn ascent(&self) -> i32 {
        self.to_pdf_units(self.ascender)
    }

    pub fn descent(&self) -> i32 {
        self.to_pdf_units(self.descender)
    }

    pub fn cap_height(&self) -> i32 {
        self.to_pdf_units(self.cap_height)
    }

    pub fn bbox(&self) -> [i32; 4] {
        self.bbox.map(|v| self.to_pdf_units(v))
    }

    pub fn italic_angle(&self) -> f32 {
        self.italic_angle
    }
}

impl GlyphWidths for FallbackFont {
    fn char_width(&self, c: char) -> u16 {
        self.glyph(c).map_or(1000, |g| self.advance(g))
    }
}

/// Keeps only characters that are safe inside a PDF name token.
fn pdf_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a minimal TrueType file (cmap, head, hhea, hmtx, maxp) mapping each
    /// character of `chars` to its own 1000-unit-wide glyph, in sorted order from 1.
    pub(crate) fn synthetic_font_bytes(chars: &str) -> Vec<u8> {
        let mut chars: Vec<char> = chars.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        let num_glyphs = chars.len() as u16 + 1;

        let mut head = Vec::new();
        head.extend(0x0001_0000_u32.to_be_bytes());
        head.extend(0x0001_0000_u32.to_be_bytes());
        head.extend(0_u32.to_be_bytes());
        head.extend(0x5F0F_3CF5_u32.to_be_bytes());
        head.extend(0_u16.to_be_bytes());
        head.extend(1000_u16.to_be_bytes());
        head.extend([0_u8; 16]);
        for v in [0_i16, -200, 1000, 900] {
            head.extend(v.to_be_bytes());
        }
        head.extend(0_u16.to_be_bytes());
        head.extend(8_u16.to_be_bytes());
        for v in [2_i16, 0, 0] {
            head.extend(v.to_be_bytes());
        }

        let mut hhea = Vec::new();
        hhea.extend(0x0001_0000_u32.to_be_bytes());
        for v in [900_i16, -200, 0] {
            hhea.extend(v.to_be_bytes());
        }
        hhea.extend(1000_u16.to_be_bytes());
        for v in [0_i16, 0, 1000, 1, 0, 0, 0, 0, 0, 0, 0] {
            hhea.extend(v.to_be_bytes());
        }
        hhea.extend(num_glyphs.to_be_bytes());

        let mut maxp = Vec::new();
        maxp.extend(0x0000_5000_u32.to_be_bytes());
        maxp.extend(num_glyphs.to_be_bytes());

        let mut hmtx = Vec::new();
        for gid in 0..num_glyphs {
            hmtx.extend((if gid == 0 { 500_u16 } else { 1000 }).to_be_bytes());
            hmtx.extend(0_i16.to_be_bytes());
        }

        let mut cmap = Vec::new();
        cmap.extend(0_u16.to_be_bytes());
        cmap.extend(1_u16.to_be_bytes());
        cmap.extend(3_u16.to_be_bytes());
        cmap.extend(10_u16.to_be_bytes());
        cmap.extend(12_u32.to_be_bytes());
        cmap.extend(12_u16.to_be_bytes());
        cmap.extend(0_u16.to_be_bytes());
        cmap.extend((16 + 12 * chars.len() as u32).to_be_bytes());
        cmap.extend(0_u32.to_be_bytes());
        cmap.extend((chars.len() as u32).to_be_bytes());
        for (i, c) in chars.iter().enumerate() {
            cmap.extend((*c as u32).to_be_bytes());
            cmap.extend((*c as u32).to_be_bytes());
            cmap.extend((i as u32 + 1).to_be_bytes());
        }

        let tables: [(&[u8; 4], Vec<u8>); 5] = [
            (b"cmap", cmap),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"maxp", maxp),
        ];
        let mut out = Vec::new();
        out.extend(0x0001_0000_u32.to_be_bytes());
        out.extend((tables.len() as u16).to_be_bytes());
        out.extend([0_u8; 6]);
        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            out.extend(tag.iter());
            out.extend(0_u32.to_be_bytes());
            out.extend((offset as u32).to_be_bytes());
            out.extend((data.len() as u32).to_be_bytes());
            body.extend(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        out.extend(body);
        out
    }

    pub(crate) fn synthetic_font(chars: &str) -> FallbackFont {
        FallbackFont::from_bytes("synthetic", synthetic_font_bytes(chars)).unwrap()
    }

    #[test]
    fn test_glyph_lookup_and_widths() {
        let font = synthetic_font("李雷");
        assert_eq!(font.glyph('李'), Some(1));
        assert_eq!(font.glyph('雷'), Some(2));
        assert_eq!(font.glyph('x'), None);
        assert_eq!(font.measure_str("李雷", 10.0), 20.0);
        assert_eq!(font.outlines, Outlines::TrueType);
        assert_eq!(font.ascent(), 900);
        assert_eq!(font.bbox(), [0, -200, 1000, 900]);
    }

    #[test]
    fn test_cjk_text_wraps_by_character() {
        let font = synthetic_font("李雷韩梅");
        let lines = font.wrap("李雷韩梅", 10.0, 25.0);
        assert_eq!(lines, vec!["李雷", "韩梅"]);
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            FallbackFont::from_bytes("junk", b"not a font".to_vec()),
            Err(FontError::Parse { .. })
        ));
    }

    #[test]
    fn test_collections_are_rejected() {
        assert!(matches!(
            FallbackFont::from_bytes("fonts.ttc", b"ttcf\0\x01\0\0".to_vec()),
            Err(FontError::Collection(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            FallbackFont::load(Path::new("/nonexistent/font.ttf")),
            Err(FontError::Io { .. })
        ));
    }

    #[test]
    fn test_pdf_name_strips_delimiters() {
        assert_eq!(pdf_name("Noto Sans/CJK (JP)"), "NotoSansCJKJP");
    }
}
