//! Static font-metric tables for the three Helvetica faces used by the PDF capture.
//!
//! Widths are the standard Type 1 AFM advance widths in 1/1000 em. The tables cover
//! ASCII 0x20..=0x7E; index = (char as usize) - 32. The bullet and dash glyphs from
//! WinAnsiEncoding get their own entries, everything else falls back to `fallback_width`.

use serde::Serialize;

// ────────────────────────────────────────────────────────────────────────────
// Faces
// ────────────────────────────────────────────────────────────────────────────

/// The standard-14 faces the capture draws with. None of them need embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Face {
    Regular,
    Bold,
    Oblique,
}

impl Face {
    pub const ALL: [Face; 3] = [Face::Regular, Face::Bold, Face::Oblique];

    /// PostScript name for the font dictionary's `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
            Face::Oblique => "Helvetica-Oblique",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
            Face::Oblique => "F3",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can report per-character advance widths in 1/1000 em.
///
/// Measuring and wrapping are shared, so the standard faces and an embedded fallback
/// font break lines the same way.
pub trait GlyphWidths {
    fn char_width(&self, c: char) -> u16;

    /// Rendered width of `s` in device units at `size`.
    fn measure_str(&self, s: &str, size: f32) -> f32 {
        let units: u32 = s.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }

    /// Greedy word-wrap of `text` into lines no wider than `max_width` at `size`.
    ///
    /// Embedded newlines are hard breaks. A single word wider than the line is split
    /// by characters. An empty or whitespace-only string yields no lines.
    fn wrap(&self, text: &str, size: f32, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        let space_w = self.measure_str(" ", size);

        for hard_line in text.split('\n') {
            let mut current = String::new();
            let mut current_width = 0.0_f32;

            for word in hard_line.split_whitespace() {
                let word_w = self.measure_str(word, size);
                let needed = if current.is_empty() {
                    word_w
                } else {
                    current_width + space_w + word_w
                };

                if needed <= max_width {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_width = needed;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                if word_w <= max_width {
                    current.push_str(word);
                    current_width = word_w;
                } else {
                    for piece in split_long_word(self, word, size, max_width) {
                        if !current.is_empty() {
                            lines.push(std::mem::take(&mut current));
                        }
                        current_width = self.measure_str(&piece, size);
                        current = piece;
                    }
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        lines
    }
}

fn split_long_word<M: GlyphWidths + ?Sized>(
    metrics: &M,
    word: &str,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = f32::from(metrics.char_width(c)) * size / 1000.0;
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

pub struct FontMetricTable {
    pub face: Face,
    widths: [u16; 95],
    bullet_width: u16,
    en_dash_width: u16,
    em_dash_width: u16,
    pub fallback_width: u16,
}

impl GlyphWidths for FontMetricTable {
    fn char_width(&self, c: char) -> u16 {
        let code = c as usize;
        match c {
            '•' => self.bullet_width,
            '–' => self.en_dash_width,
            '—' => self.em_dash_width,
            _ if (32..=126).contains(&code) => self.widths[code - 32],
            _ => self.fallback_width,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
];

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    face: Face::Regular,
    widths: HELVETICA_WIDTHS,
    bullet_width: 350,
    en_dash_width: 556,
    em_dash_width: 1000,
    fallback_width: 556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: Face::Bold,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    bullet_width: 350,
    en_dash_width: 556,
    em_dash_width: 1000,
    fallback_width: 611,
};

/// Helvetica-Oblique shares the upright advance widths.
static HELVETICA_OBLIQUE_TABLE: FontMetricTable = FontMetricTable {
    face: Face::Oblique,
    widths: HELVETICA_WIDTHS,
    bullet_width: 350,
    en_dash_width: 556,
    em_dash_width: 1000,
    fallback_width: 556,
};

pub fn get_metrics(face: Face) -> &'static FontMetricTable {
    match face {
        Face::Regular => &HELVETICA_TABLE,
        Face::Bold => &HELVETICA_BOLD_TABLE,
        Face::Oblique => &HELVETICA_OBLIQUE_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
