//! Display HTML for a rendered view.
//!
//! `render_surface` emits the document surface fragment (`#document-surface`) with its
//! edit affordances. `display_page` wraps it in a standalone preview page.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::export::html::multiline;
use crate::templates::view::{
    Align, Block, BulletNode, Emphasis, HeadingStyle, ItemStyle, RenderedView, Theme,
};

/// DOM id of the document surface. Print CSS keys off this id.
pub const SURFACE_ID: &str = "document-surface";

/// Renders the surface fragment.
///
/// Editable bullets carry `data-experience-index` / `data-bullet-index` and a rewrite
/// button; static bullets are bare `<li>` leaves.
pub fn render_surface(view: &RenderedView) -> String {
    let mut out = String::with_capacity(4096);
    let classes = format!(
        "surface surface-{} template-{}{}",
        view.kind.as_str(),
        view.template.id(),
        if view.theme.bordered { " bordered" } else { "" }
    );
    out.push_str(&format!(
        "<div id=\"{SURFACE_ID}\" class=\"{classes}\" data-editable=\"{}\">\n",
        view.editable
    ));
    for block in &view.blocks {
        render_block(block, &mut out);
    }
    out.push_str("</div>\n");
    out
}

/// Standalone preview page: surface plus its stylesheet.
pub fn display_page(view: &RenderedView) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n{surface}</body>\n</html>\n",
        title = encode_text(&view.title),
        css = surface_styles(&view.theme),
        surface = render_surface(view),
    )
}

/// Stylesheet for the surface, derived from the view's theme.
pub fn surface_styles(theme: &Theme) -> String {
    format!(
        "#{id} {{ background: #fff; color: {text}; font-family: {font}; font-size: {body}pt; \
         max-width: 794px; margin: 0 auto; padding: 48px; box-sizing: border-box; }}\n\
         #{id}.bordered {{ border: 2px solid {accent}; }}\n\
         #{id} .masthead h1 {{ font-size: {name}pt; margin: 0 0 8px; }}\n\
         #{id} .masthead.banner {{ background: {accent}; color: #fff; margin: -48px -48px 24px; padding: 32px 48px 24px; }}\n\
         #{id} .align-center {{ text-align: center; }}\n\
         #{id} .align-right {{ text-align: right; }}\n\
         #{id} .align-justify {{ text-align: justify; }}\n\
         #{id} .contact span + span::before {{ content: \" • \"; }}\n\
         #{id} section {{ margin: 0 0 20px; }}\n\
         #{id} h2 {{ font-size: {heading}pt; margin: 0 0 10px; }}\n\
         #{id} h2.heading-accent {{ border-left: 4px solid {accent}; padding-left: 10px; }}\n\
         #{id} h2.heading-ruled {{ text-transform: uppercase; border-bottom: 2px solid {text}; padding-bottom: 4px; }}\n\
         #{id} h2.heading-quiet {{ text-transform: uppercase; letter-spacing: 0.2em; color: {muted}; font-size: 8pt; }}\n\
         #{id} h2.heading-colored {{ color: {accent}; }}\n\
         #{id} .chips span {{ display: inline-block; padding: 2px 10px; margin: 0 6px 6px 0; border-radius: 999px; background: #eef2ff; color: {accent}; }}\n\
         #{id} .stacked {{ list-style: none; padding: 0; }}\n\
         #{id} .role {{ margin: 0 0 14px; }}\n\
         #{id} .role-header {{ display: flex; justify-content: space-between; }}\n\
         #{id} .dates {{ color: {muted}; white-space: nowrap; }}\n\
         #{id} .muted {{ color: {muted}; }}\n\
         #{id} .columns {{ display: flex; gap: 24px; }}\n\
         #{id} .sidebar {{ flex: 0 0 32%; }}\n\
         #{id} .main {{ flex: 1; }}\n\
         #{id} .spacer {{ height: 16px; }}\n\
         #{id} .rewrite {{ margin-left: 8px; font-size: 0.8em; opacity: 0.6; }}\n",
        id = SURFACE_ID,
        text = theme.text,
        muted = theme.muted,
        accent = theme.accent,
        font = theme.font_stack,
        body = theme.body_size_pt,
        name = theme.name_size_pt,
        heading = theme.heading_size_pt,
    )
}

fn align_class(align: Align) -> &'static str {
    match align {
        Align::Left => "align-left",
        Align::Center => "align-center",
        Align::Right => "align-right",
        Align::Justify => "align-justify",
    }
}

fn heading_class(style: HeadingStyle) -> &'static str {
    match style {
        HeadingStyle::Accent => "heading-accent",
        HeadingStyle::Ruled => "heading-ruled",
        HeadingStyle::Quiet => "heading-quiet",
        HeadingStyle::Colored => "heading-colored",
    }
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Masthead {
            name,
            contact,
            links,
            align,
            banner,
        } => {
            let banner = if *banner { " banner" } else { "" };
            out.push_str(&format!(
                "<header class=\"masthead {}{banner}\">\n<h1>{}</h1>\n",
                align_class(*align),
                encode_text(name)
            ));
            if !contact.is_empty() {
                out.push_str("<div class=\"contact\">");
                for item in contact {
                    out.push_str(&format!("<span>{}</span>", encode_text(item)));
                }
                out.push_str("</div>\n");
            }
            for link in links {
                out.push_str(&format!(
                    "<div class=\"link\"><a href=\"{}\">{}</a></div>\n",
                    encode_double_quoted_attribute(&link_href(link)),
                    encode_text(link)
                ));
            }
            out.push_str("</header>\n");
        }
        Block::Section {
            heading,
            style,
            body,
        } => {
            out.push_str(&format!(
                "<section>\n<h2 class=\"{}\">{}</h2>\n",
                heading_class(*style),
                encode_text(heading)
            ));
            for child in body {
                render_block(child, out);
            }
            out.push_str("</section>\n");
        }
        Block::Paragraph {
            text,
            emphasis,
            align,
        } => {
            let text = multiline(text);
            let inner = match emphasis {
                Emphasis::Regular => text,
                Emphasis::Strong => format!("<strong>{text}</strong>"),
                Emphasis::Italic => format!("<em>{text}</em>"),
                Emphasis::Muted => format!("<span class=\"muted\">{text}</span>"),
            };
            out.push_str(&format!(
                "<p class=\"{}\">{inner}</p>\n",
                align_class(*align)
            ));
        }
        Block::Items { items, style } => match style {
            ItemStyle::Chips => {
                out.push_str("<div class=\"chips\">");
                for item in items {
                    out.push_str(&format!("<span>{}</span>", encode_text(item)));
                }
                out.push_str("</div>\n");
            }
            ItemStyle::Inline { separator } => {
                let joined: Vec<String> = items
                    .iter()
                    .map(|i| encode_text(i).into_owned())
                    .collect();
                out.push_str(&format!(
                    "<p class=\"inline\">{}</p>\n",
                    joined.join(&encode_text(separator))
                ));
            }
            ItemStyle::Stacked => {
                out.push_str("<ul class=\"stacked\">");
                for item in items {
                    out.push_str(&format!("<li>{}</li>", encode_text(item)));
                }
                out.push_str("</ul>\n");
            }
        },
        Block::Role {
            title,
            company,
            dates,
            bullets,
        } => {
            out.push_str(&format!(
                "<div class=\"role\">\n<div class=\"role-header\"><div><h3>{}</h3>\
                 <div class=\"company\">{}</div></div><span class=\"dates\">{}</span></div>\n",
                encode_text(title),
                encode_text(company),
                encode_text(dates)
            ));
            if !bullets.is_empty() {
                out.push_str("<ul class=\"bullets\">\n");
                for bullet in bullets {
                    render_bullet(bullet, out);
                }
                out.push_str("</ul>\n");
            }
            out.push_str("</div>\n");
        }
        Block::Record {
            primary,
            secondary,
            trailing,
        } => {
            out.push_str(&format!(
                "<div class=\"record\"><strong>{}</strong>",
                encode_text(primary)
            ));
            for part in secondary {
                out.push_str(&format!(" <span>{}</span>", encode_text(part)));
            }
            if let Some(trailing) = trailing {
                out.push_str(&format!(
                    " <span class=\"dates\">{}</span>",
                    encode_text(trailing)
                ));
            }
            out.push_str("</div>\n");
        }
        Block::Columns { sidebar, main } => {
            out.push_str("<div class=\"columns\">\n<aside class=\"sidebar\">\n");
            for child in sidebar {
                render_block(child, out);
            }
            out.push_str("</aside>\n<div class=\"main\">\n");
            for child in main {
                render_block(child, out);
            }
            out.push_str("</div>\n</div>\n");
        }
        Block::Spacer => out.push_str("<div class=\"spacer\"></div>\n"),
    }
}

fn render_bullet(bullet: &BulletNode, out: &mut String) {
    match bullet {
        BulletNode::Static { text } => {
            out.push_str(&format!("<li>{}</li>\n", encode_text(text)));
        }
        BulletNode::Editable { address, text } => {
            out.push_str(&format!(
                "<li class=\"bullet editable\" data-experience-index=\"{exp}\" data-bullet-index=\"{bullet}\">\
                 <span class=\"bullet-text\">{text}</span>\
                 <button type=\"button\" class=\"rewrite\" data-action=\"rewrite\" \
                 data-experience-index=\"{exp}\" data-bullet-index=\"{bullet}\">Rewrite</button></li>\n",
                exp = address.experience_index,
                bullet = address.bullet_index,
                text = encode_text(text),
            ));
        }
    }
}

fn link_href(link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}
