//! PDF file writer: header, indirect objects, xref table and trailer.
//!
//! Latin text draws with the standard Helvetica faces and needs no font program. Text
//! outside WinAnsi draws with the fallback font, embedded whole as a Type0 font with
//! Identity-H encoding (glyph ids as character codes) and a ToUnicode map so the text
//! stays searchable. Streams are Flate-compressed.

use std::collections::BTreeMap;
use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::layout::fallback_font::{FallbackFont, Outlines};
use crate::layout::font_metrics::Face;

/// Indirect object numbers of the fixed objects.
const CATALOG: u32 = 1;
const PAGES: u32 = 2;
const INFO: u32 = 3;
const FIRST_FONT: u32 = 4;
const FIRST_PAGE: u32 = FIRST_FONT + Face::ALL.len() as u32;
/// Objects of an embedded font: Type0, CIDFont, descriptor, font file, ToUnicode.
const EMBEDDED_FONT_OBJECTS: u32 = 5;

/// Page resource name of the embedded fallback font.
pub const FALLBACK_RESOURCE: &str = "F4";

/// The fallback font together with the glyphs the pages actually drew, each with the
/// character it stands for.
pub struct EmbeddedFont<'a> {
    pub font: &'a FallbackFont,
    pub glyphs: &'a BTreeMap<u16, char>,
}

pub struct PdfWriter {
    buf: Vec<u8>,
    /// Byte offset of each object, indexed by object number - 1.
    offsets: Vec<Option<usize>>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16 * 1024),
            offsets: Vec::new(),
        }
    }

    /// Writes a complete document with one page per content stream.
    ///
    /// `page_size` is in points. `title` goes into the document info dictionary.
    /// Pages may use [`FALLBACK_RESOURCE`] only when `embedded` is given.
    pub fn write_document(
        mut self,
        page_size: (f32, f32),
        title: &str,
        pages: &[Vec<u8>],
        embedded: Option<EmbeddedFont<'_>>,
    ) -> io::Result<Vec<u8>> {
        let page_count = pages.len() as u32;
        let page_obj = |i: u32| FIRST_PAGE + i * 2;
        let content_obj = |i: u32| FIRST_PAGE + i * 2 + 1;
        let first_embedded = FIRST_PAGE + page_count * 2;
        let extra = if embedded.is_some() { EMBEDDED_FONT_OBJECTS } else { 0 };
        self.offsets = vec![None; (first_embedded - 1 + extra) as usize];

        self.buf.extend_from_slice(b"%PDF-1.4\n");
        self.buf.extend_from_slice(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);

        self.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"))?;

        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_obj(i))).collect();
        self.object(
            PAGES,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
                kids.join(" ")
            ),
        )?;

        self.object(
            INFO,
            &format!(
                "<< /Title {} /Producer (folio) /Creator (folio {}) >>",
                text_string(title),
                env!("CARGO_PKG_VERSION")
            ),
        )?;

        let mut font_refs = String::new();
        for (i, face) in Face::ALL.iter().enumerate() {
            let num = FIRST_FONT + i as u32;
            self.object(
                num,
                &format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    face.base_font()
                ),
            )?;
            font_refs.push_str(&format!("/{} {num} 0 R ", face.resource_name()));
        }
        if embedded.is_some() {
            font_refs.push_str(&format!("/{FALLBACK_RESOURCE} {first_embedded} 0 R "));
        }

        for (i, content) in pages.iter().enumerate() {
            let i = i as u32;
            self.object(
                page_obj(i),
                &format!(
                    "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {} {}] \
                     /Contents {} 0 R /Resources << /Font << {}>> /ProcSet [/PDF /Text] >> >>",
                    fmt_num(page_size.0),
                    fmt_num(page_size.1),
                    content_obj(i),
                    font_refs
                ),
            )?;
            self.stream_object(content_obj(i), "", content)?;
        }

        if let Some(embedded) = embedded {
            self.embedded_font(first_embedded, &embedded)?;
        }

        self.xref_and_trailer()?;
        Ok(self.buf)
    }

    /// Writes the five objects of a Type0 font starting at object `first`.
    fn embedded_font(&mut self, first: u32, embedded: &EmbeddedFont<'_>) -> io::Result<()> {
        let font = embedded.font;
        let (type0, cid_font, descriptor, file, to_unicode) =
            (first, first + 1, first + 2, first + 3, first + 4);
        let name = &font.postscript_name;

        self.object(
            type0,
            &format!(
                "<< /Type /Font /Subtype /Type0 /BaseFont /{name} /Encoding /Identity-H \
                 /DescendantFonts [{cid_font} 0 R] /ToUnicode {to_unicode} 0 R >>"
            ),
        )?;

        let (subtype, gid_map, file_key) = match font.outlines {
            Outlines::TrueType => ("CIDFontType2", " /CIDToGIDMap /Identity", "FontFile2"),
            Outlines::Cff => ("CIDFontType0", "", "FontFile3"),
        };
        self.object(
            cid_font,
            &format!(
                "<< /Type /Font /Subtype /{subtype} /BaseFont /{name} \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor {descriptor} 0 R /DW 1000 /W {}{gid_map} >>",
                widths_array(font, embedded.glyphs)
            ),
        )?;

        let [x0, y0, x1, y1] = font.bbox();
        let flags = if font.italic_angle() != 0.0 { 32 | 64 } else { 32 };
        self.object(
            descriptor,
            &format!(
                "<< /Type /FontDescriptor /FontName /{name} /Flags {flags} \
                 /FontBBox [{x0} {y0} {x1} {y1}] /ItalicAngle {} /Ascent {} /Descent {} \
                 /CapHeight {} /StemV 80 /{file_key} {file} 0 R >>",
                fmt_num(font.italic_angle()),
                font.ascent(),
                font.descent(),
                font.cap_height()
            ),
        )?;

        let file_entries = match font.outlines {
            Outlines::TrueType => format!(" /Length1 {}", font.data().len()),
            Outlines::Cff => " /Subtype /OpenType".to_string(),
        };
        self.stream_object(file, &file_entries, font.data())?;
        self.stream_object(to_unicode, "", to_unicode_cmap(embedded.glyphs).as_bytes())
    }

    fn begin_object(&mut self, num: u32) -> io::Result<()> {
        self.offsets[(num - 1) as usize] = Some(self.buf.len());
        write!(self.buf, "{num} 0 obj\n")
    }

    fn object(&mut self, num: u32, body: &str) -> io::Result<()> {
        self.begin_object(num)?;
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    /// Writes a Flate-compressed stream. `entries` is appended to the stream dictionary.
    fn stream_object(&mut self, num: u32, entries: &str, data: &[u8]) -> io::Result<()> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        self.begin_object(num)?;
        write!(
            self.buf,
            "<< /Length {} /Filter /FlateDecode{entries} >>\nstream\n",
            compressed.len()
        )?;
        self.buf.extend_from_slice(&compressed);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
        Ok(())
    }

    fn xref_and_trailer(&mut self) -> io::Result<()> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;
        write!(self.buf, "xref\n0 {size}\n0000000000 65535 f \n")?;
        for offset in self.offsets.clone() {
            let offset = offset.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "object was never written")
            })?;
            write!(self.buf, "{offset:010} 00000 n \n")?;
        }
        write!(
            self.buf,
            "trailer\n<< /Size {size} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )
    }
}

/// Maps a character onto WinAnsiEncoding, or `None` if the encoding has no code for it.
/// Control characters draw as spaces.
pub fn win_ansi(c: char) -> Option<u8> {
    match c {
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '…' => Some(0x85),
        '€' => Some(0x80),
        c if (c as u32) < 0x20 => Some(b' '),
        c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => Some(c as u8),
        _ => None,
    }
}

/// Encodes a text string for the info dictionary: a literal for ASCII, otherwise
/// UTF-16BE with a byte order mark as a hex string.
pub fn text_string(text: &str) -> String {
    if text.is_ascii() {
        return literal_string(text.as_bytes());
    }
    let mut out = String::from("<FEFF");
    for unit in text.encode_utf16() {
        out.push_str(&format!("{unit:04X}"));
    }
    out.push('>');
    out
}

/// `/W` array of the used glyphs, consecutive ids grouped.
fn widths_array(font: &FallbackFont, glyphs: &BTreeMap<u16, char>) -> String {
    let mut groups: Vec<(u16, Vec<u16>)> = Vec::new();
    for &gid in glyphs.keys() {
        let width = font.advance(gid);
        match groups.last_mut() {
            Some((start, widths)) if usize::from(*start) + widths.len() == usize::from(gid) => {
                widths.push(width)
            }
            _ => groups.push((gid, vec![width])),
        }
    }
    let body: Vec<String> = groups
        .iter()
        .map(|(start, widths)| {
            let widths: Vec<String> = widths.iter().map(u16::to_string).collect();
            format!("{start} [{}]", widths.join(" "))
        })
        .collect();
    format!("[{}]", body.join(" "))
}

/// ToUnicode CMap from glyph id to the character it was drawn for.
fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = glyphs.iter().collect();
    // bfchar blocks hold at most 100 entries.
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, c) in chunk {
            let mut utf16 = [0_u16; 2];
            let units: String = c
                .encode_utf16(&mut utf16)
                .iter()
                .map(|u| format!("{u:04X}"))
                .collect();
            cmap.push_str(&format!("<{gid:04X}> <{units}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

/// Encodes `bytes` as a PDF literal string, escaping delimiters and non-ASCII bytes.
pub fn literal_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out.push(')');
    out
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn fmt_num(v: f32) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::fallback_font::tests::synthetic_font;

    #[test]
    fn test_win_ansi_maps_bullet_and_dashes() {
        assert_eq!(win_ansi('•'), Some(0x95));
        assert_eq!(win_ansi('–'), Some(0x96));
        assert_eq!(win_ansi('é'), Some(0xE9));
        assert_eq!(win_ansi('A'), Some(b'A'));
        assert_eq!(win_ansi('\t'), Some(b' '));
    }

    #[test]
    fn test_win_ansi_has_no_code_for_cjk_or_cyrillic() {
        assert_eq!(win_ansi('漢'), None);
        assert_eq!(win_ansi('И'), None);
    }

    #[test]
    fn test_text_string_is_utf16_with_bom_outside_ascii() {
        assert_eq!(text_string("Jane (CV)"), "(Jane \\(CV\\))");
        assert_eq!(text_string("Zoë"), "<FEFF005A006F00EB>");
        assert_eq!(text_string("李"), "<FEFF674E>");
        assert_eq!(text_string("𝄞"), "<FEFFD834DD1E>");
    }

    #[test]
    fn test_widths_array_groups_consecutive_glyphs() {
        let font = synthetic_font("abcz");
        let glyphs: BTreeMap<u16, char> = [(1, 'a'), (2, 'b'), (4, 'z')].into_iter().collect();
        assert_eq!(widths_array(&font, &glyphs), "[1 [1000 1000] 4 [1000]]");
    }

    #[test]
    fn test_to_unicode_maps_glyphs_back_to_text() {
        let glyphs: BTreeMap<u16, char> = [(1, '李'), (2, 'И')].into_iter().collect();
        let cmap = to_unicode_cmap(&glyphs);
        assert!(cmap.contains("2 beginbfchar\n<0001> <674E>\n<0002> <0418>\nendbfchar"));
        assert!(cmap.contains("/CMapName /Adobe-Identity-UCS def"));
    }

    #[test]
    fn test_embedded_font_objects() {
        let font = synthetic_font("李雷");
        let glyphs: BTreeMap<u16, char> = [(1, '李'), (2, '雷')].into_iter().collect();
        let embedded = EmbeddedFont {
            font: &font,
            glyphs: &glyphs,
        };
        let pdf = PdfWriter::new()
            .write_document((612.0, 792.0), "李雷", &[b"BT ET".to_vec()], Some(embedded))
            .unwrap();
        let text = String::from_utf8_lossy(&pdf);

        assert!(text.contains("/F4 9 0 R"));
        assert!(text.contains("/Subtype /Type0"));
        assert!(text.contains("/Encoding /Identity-H"));
        assert!(text.contains("/Subtype /CIDFontType2"));
        assert!(text.contains("/CIDToGIDMap /Identity"));
        assert!(text.contains("/FontFile2 12 0 R"));
        assert!(text.contains("/ToUnicode 13 0 R"));
        assert!(text.contains("/Title <FEFF674E96F7>"));
        // 3 fixed + 3 fonts + 1 page x 2 + 5 embedded = 13 objects, plus the free entry.
        assert!(text.contains("xref\n0 14\n"));
    }

    #[test]
    fn test_literal_string_escapes() {
        assert_eq!(literal_string(b"a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(literal_string(&[0x95]), "(\\225)");
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(612.0), "612");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.256), "1.26");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn test_document_structure() {
        let pdf = PdfWriter::new()
            .write_document(
                (612.0, 792.0),
                "Jane",
                &[b"BT ET".to_vec(), b"BT ET".to_vec()],
                None,
            )
            .unwrap();
        let text = String::from_utf8_lossy(&pdf);

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 2"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("/MediaBox [0 0 612 792]"));
        // 3 fixed + 3 fonts + 2 pages x (page, contents) = 10 objects, plus the free entry.
        assert!(text.contains("xref\n0 11\n"));
        assert!(!text.contains("/Type0"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = PdfWriter::new()
            .write_document((612.0, 792.0), "x", &[Vec::new()], None)
            .unwrap();
        let text = String::from_utf8_lossy(&pdf).into_owned();
        let xref = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }
}
