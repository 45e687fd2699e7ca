// Text measurement for the PDF capture.
// Latin text uses the built-in Helvetica AFM widths. Other scripts are measured from
// the fallback font loaded at startup.

pub mod fallback_font;
pub mod font_metrics;
