//! Print page: the document surface alone, with print CSS that hides everything else.

use html_escape::encode_text;

use crate::templates::html::{render_surface, surface_styles, SURFACE_ID};
use crate::templates::view::RenderedView;

/// Builds the printable page for `view`.
///
/// Only the surface is visible when printed; edit controls and anything outside the
/// surface are hidden, and the page margin is half an inch.
pub fn print_document(view: &RenderedView) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{title}</title>\n<style>\n{styles}{print}</style>\n</head>\n\
         <body onload=\"window.print()\">\n{surface}</body>\n</html>\n",
        title = encode_text(&view.title),
        styles = surface_styles(&view.theme),
        print = print_styles(),
        surface = render_surface(view),
    )
}

fn print_styles() -> String {
    format!(
        "@page {{ size: letter; margin: 0.5in; }}\n\
         @media print {{\n\
         body * {{ visibility: hidden; }}\n\
         #{id}, #{id} * {{ visibility: visible; }}\n\
         #{id} {{ position: absolute; left: 0; top: 0; width: 100%; max-width: none; padding: 0; }}\n\
         #{id} .rewrite {{ display: none !important; }}\n\
         #{id} .role, #{id} .record {{ break-inside: avoid; }}\n\
         }}\n",
        id = SURFACE_ID
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{ExperienceEntry, ResumeDocument};
    use crate::templates::{resume, RenderOptions};
    use chrono::NaiveDate;

    #[test]
    fn test_print_page_hides_everything_but_surface() {
        let doc = ResumeDocument {
            full_name: "Jane Doe".to_string(),
            experience: vec![ExperienceEntry {
                title: "Eng".to_string(),
                bullet_points: vec!["Built X".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = RenderOptions::new(true, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let page = print_document(&resume::render_modern(&doc, &options));

        assert!(page.contains("body * { visibility: hidden; }"));
        assert!(page.contains("#document-surface .rewrite { display: none !important; }"));
        assert!(page.contains("margin: 0.5in"));
        assert!(page.contains("<title>Jane Doe - Resume</title>"));
        assert!(page.contains("Built X"));
    }
}
