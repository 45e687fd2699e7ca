//! Cover-letter template variants.
//!
//! Every variant splits the body on the blank-line delimiter and emits one paragraph
//! block per segment, in input order. Variants only differ in header, recipient block,
//! salutation and closing.

use crate::models::document::{populated, CoverLetterDocument, DocumentKind};
use crate::templates::view::{Align, Block, Emphasis, RenderedView, Theme};
use crate::templates::{CoverLetterTemplate, RenderOptions, TemplateId};

/// Standard business format: right-aligned sender, date, recipient, body.
pub fn render_professional(doc: &CoverLetterDocument, options: &RenderOptions) -> RenderedView {
    let mut blocks = vec![
        masthead(doc, Align::Right, false),
        date_line(options),
    ];
    if let Some(company) = doc.company_name() {
        blocks.push(line(company, Emphasis::Regular));
        if let Some(position) = doc.position() {
            blocks.push(line(position, Emphasis::Regular));
        }
        blocks.push(Block::Spacer);
    } else if let Some(position) = doc.position() {
        blocks.push(line(position, Emphasis::Regular));
        blocks.push(Block::Spacer);
    }
    blocks.push(line("Dear Hiring Manager,", Emphasis::Regular));
    blocks.extend(body(doc, Align::Left));
    blocks.push(Block::Spacer);
    blocks.push(line("Sincerely,", Emphasis::Regular));
    blocks.push(line(&doc.applicant_name, Emphasis::Strong));

    view(
        CoverLetterTemplate::Professional,
        options,
        Theme {
            accent: "#2563eb",
            text: "#334155",
            muted: "#475569",
            font_stack: "'Helvetica Neue', Arial, sans-serif",
            bordered: false,
            body_size_pt: 10.5,
            name_size_pt: 10.5,
            heading_size_pt: 12.0,
        },
        doc,
        blocks,
    )
}

/// Contemporary: banner header, recipient on one line, accent-coloured signature.
pub fn render_modern(doc: &CoverLetterDocument, options: &RenderOptions) -> RenderedView {
    let mut blocks = vec![masthead(doc, Align::Left, true), date_line(options)];
    let recipient: Vec<&str> = [doc.company_name(), doc.position()]
        .into_iter()
        .flatten()
        .collect();
    if !recipient.is_empty() {
        blocks.push(line(&recipient.join(" • "), Emphasis::Strong));
        blocks.push(Block::Spacer);
    }
    blocks.push(line("Dear Hiring Manager,", Emphasis::Strong));
    blocks.extend(body(doc, Align::Left));
    blocks.push(Block::Spacer);
    blocks.push(line("Best regards,", Emphasis::Regular));
    blocks.push(line(&doc.applicant_name, Emphasis::Strong));

    view(
        CoverLetterTemplate::Modern,
        options,
        Theme {
            accent: "#2563eb",
            text: "#334155",
            muted: "#64748b",
            font_stack: "'Inter', 'Helvetica Neue', Arial, sans-serif",
            bordered: false,
            body_size_pt: 11.5,
            name_size_pt: 20.0,
            heading_size_pt: 12.0,
        },
        doc,
        blocks,
    )
}

/// Traditional: centred capitalised name, bordered page, justified paragraphs.
pub fn render_formal(doc: &CoverLetterDocument, options: &RenderOptions) -> RenderedView {
    let mut blocks = vec![masthead(doc, Align::Center, false), date_line(options)];
    if let Some(company) = doc.company_name() {
        blocks.push(line(company, Emphasis::Strong));
    }
    if let Some(position) = doc.position() {
        blocks.push(line(position, Emphasis::Regular));
    }
    if doc.company_name().is_some() || doc.position().is_some() {
        blocks.push(Block::Spacer);
    }
    blocks.push(line("Dear Sir or Madam,", Emphasis::Regular));
    blocks.extend(body(doc, Align::Justify));
    blocks.push(Block::Spacer);
    blocks.push(line("Respectfully yours,", Emphasis::Regular));
    blocks.push(line(&doc.applicant_name, Emphasis::Strong));

    view(
        CoverLetterTemplate::Formal,
        options,
        Theme {
            accent: "#cbd5e1",
            text: "#334155",
            muted: "#475569",
            font_stack: "Georgia, 'Times New Roman', serif",
            bordered: true,
            body_size_pt: 10.5,
            name_size_pt: 22.0,
            heading_size_pt: 12.0,
        },
        doc,
        blocks,
    )
}

fn view(
    template: CoverLetterTemplate,
    options: &RenderOptions,
    theme: Theme,
    doc: &CoverLetterDocument,
    blocks: Vec<Block>,
) -> RenderedView {
    RenderedView {
        kind: DocumentKind::CoverLetter,
        template: TemplateId::CoverLetter(template),
        editable: options.editable,
        title: match populated(&doc.applicant_name) {
            Some(name) => format!("{name} - Cover Letter"),
            None => "Cover Letter".to_string(),
        },
        theme,
        blocks,
    }
}

fn masthead(doc: &CoverLetterDocument, align: Align, banner: bool) -> Block {
    Block::Masthead {
        name: doc.applicant_name.trim().to_string(),
        contact: Vec::new(),
        links: Vec::new(),
        align,
        banner,
    }
}

fn date_line(options: &RenderOptions) -> Block {
    Block::Paragraph {
        text: options.letter_date.format("%B %-d, %Y").to_string(),
        emphasis: Emphasis::Muted,
        align: Align::Left,
    }
}

fn line(text: &str, emphasis: Emphasis) -> Block {
    Block::Paragraph {
        text: text.trim().to_string(),
        emphasis,
        align: Align::Left,
    }
}

fn body(doc: &CoverLetterDocument, align: Align) -> impl Iterator<Item = Block> + '_ {
    doc.paragraphs().into_iter().map(move |p| Block::Paragraph {
        text: p.to_string(),
        emphasis: Emphasis::Regular,
        align,
    })
}
