//! Resume template variants.
//!
//! Each variant picks its own layout and typography, but all of them are assembled from
//! the shared section builders below. A section builder returns `None` only when the
//! model has nothing to show for it, so no variant can drop populated content.

use crate::models::document::{populated, DocumentKind, ResumeDocument};
use crate::templates::view::{
    Align, Block, BulletAddress, BulletNode, Emphasis, HeadingStyle, ItemStyle, RenderedView,
    Theme,
};
use crate::templates::{RenderOptions, ResumeTemplate, TemplateId};

/// Date separator used on the display surface.
const DATE_SEPARATOR: &str = " – ";

// ────────────────────────────────────────────────────────────────────────────
// Variants
// ────────────────────────────────────────────────────────────────────────────

/// Clean design with a coloured banner header and accent-bar headings.
pub fn render_modern(doc: &ResumeDocument, options: &RenderOptions) -> RenderedView {
    let style = HeadingStyle::Accent;
    let mut blocks = vec![masthead(doc, Align::Left, true)];
    blocks.extend(
        [
            summary_section(doc, "Professional Summary", style),
            skills_section(doc, "Skills", style, ItemStyle::Chips),
            experience_section(doc, "Experience", style, options),
            projects_section(doc, "Projects", style),
            education_section(doc, "Education", style),
            certifications_section(doc, "Certifications", style, ItemStyle::Chips),
        ]
        .into_iter()
        .flatten(),
    );

    view(
        doc,
        ResumeTemplate::Modern,
        options,
        Theme {
            accent: "#2563eb",
            text: "#0f172a",
            muted: "#475569",
            font_stack: "'Inter', 'Helvetica Neue', Arial, sans-serif",
            bordered: false,
            body_size_pt: 10.5,
            name_size_pt: 26.0,
            heading_size_pt: 14.0,
        },
        blocks,
    )
}

/// Traditional centred header, ruled uppercase headings, bordered page.
pub fn render_classic(doc: &ResumeDocument, options: &RenderOptions) -> RenderedView {
    let style = HeadingStyle::Ruled;
    let mut blocks = vec![masthead(doc, Align::Center, false)];
    blocks.extend(
        [
            summary_section(doc, "Professional Summary", style),
            skills_section(doc, "Skills", style, inline(" • ")),
            experience_section(doc, "Experience", style, options),
            projects_section(doc, "Projects", style),
            education_section(doc, "Education", style),
            certifications_section(doc, "Certifications", style, inline(" • ")),
        ]
        .into_iter()
        .flatten(),
    );

    view(
        doc,
        ResumeTemplate::Classic,
        options,
        Theme {
            accent: "#0f172a",
            text: "#0f172a",
            muted: "#475569",
            font_stack: "Georgia, 'Times New Roman', serif",
            bordered: true,
            body_size_pt: 10.5,
            name_size_pt: 30.0,
            heading_size_pt: 15.0,
        },
        blocks,
    )
}

/// Light typography, quiet headings and plenty of white space.
pub fn render_minimalist(doc: &ResumeDocument, options: &RenderOptions) -> RenderedView {
    let style = HeadingStyle::Quiet;
    let mut blocks = vec![masthead(doc, Align::Left, false)];
    blocks.extend(
        [
            summary_section(doc, "Summary", style),
            skills_section(doc, "Skills", style, inline(", ")),
            experience_section(doc, "Experience", style, options),
            projects_section(doc, "Projects", style),
            education_section(doc, "Education", style),
            certifications_section(doc, "Certifications", style, inline(", ")),
        ]
        .into_iter()
        .flatten(),
    );

    view(
        doc,
        ResumeTemplate::Minimalist,
        options,
        Theme {
            accent: "#94a3b8",
            text: "#0f172a",
            muted: "#94a3b8",
            font_stack: "'Helvetica Neue', Helvetica, Arial, sans-serif",
            bordered: false,
            body_size_pt: 10.0,
            name_size_pt: 24.0,
            heading_size_pt: 9.0,
        },
        blocks,
    )
}

/// Sidebar with identity, summary and skills; experience in the main column.
pub fn render_executive(doc: &ResumeDocument, options: &RenderOptions) -> RenderedView {
    let style = HeadingStyle::Ruled;
    let sidebar: Vec<Block> = [
        Some(masthead(doc, Align::Center, false)),
        summary_section(doc, "Summary", style),
        skills_section(doc, "Skills", style, ItemStyle::Stacked),
        certifications_section(doc, "Certifications", style, ItemStyle::Stacked),
    ]
    .into_iter()
    .flatten()
    .collect();
    let main: Vec<Block> = [
        experience_section(doc, "Experience", style, options),
        projects_section(doc, "Projects", style),
        education_section(doc, "Education", style),
    ]
    .into_iter()
    .flatten()
    .collect();

    view(
        doc,
        ResumeTemplate::Executive,
        options,
        Theme {
            accent: "#1e293b",
            text: "#0f172a",
            muted: "#475569",
            font_stack: "'Source Sans Pro', Arial, sans-serif",
            bordered: false,
            body_size_pt: 10.5,
            name_size_pt: 20.0,
            heading_size_pt: 13.0,
        },
        vec![Block::Columns { sidebar, main }],
    )
}

/// Gradient name, coloured headings; skills and education ahead of experience.
pub fn render_creative(doc: &ResumeDocument, options: &RenderOptions) -> RenderedView {
    let style = HeadingStyle::Colored;
    let mut blocks = vec![masthead(doc, Align::Left, false)];
    blocks.extend(
        [
            summary_section(doc, "Professional Summary", style),
            skills_section(doc, "Skills", style, ItemStyle::Chips),
            education_section(doc, "Education", style),
            experience_section(doc, "Experience", style, options),
            projects_section(doc, "Projects", style),
            certifications_section(doc, "Certifications", style, ItemStyle::Chips),
        ]
        .into_iter()
        .flatten(),
    );

    view(
        doc,
        ResumeTemplate::Creative,
        options,
        Theme {
            accent: "#7e22ce",
            text: "#0f172a",
            muted: "#475569",
            font_stack: "'Poppins', 'Helvetica Neue', Arial, sans-serif",
            bordered: false,
            body_size_pt: 10.5,
            name_size_pt: 30.0,
            heading_size_pt: 14.0,
        },
        blocks,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Section builders
// ────────────────────────────────────────────────────────────────────────────

fn view(
    doc: &ResumeDocument,
    template: ResumeTemplate,
    options: &RenderOptions,
    theme: Theme,
    blocks: Vec<Block>,
) -> RenderedView {
    RenderedView {
        kind: DocumentKind::Resume,
        template: TemplateId::Resume(template),
        editable: options.editable,
        title: match populated(&doc.full_name) {
            Some(name) => format!("{name} - Resume"),
            None => "Resume".to_string(),
        },
        theme,
        blocks,
    }
}

fn inline(separator: &str) -> ItemStyle {
    ItemStyle::Inline {
        separator: separator.to_string(),
    }
}

fn masthead(doc: &ResumeDocument, align: Align, banner: bool) -> Block {
    let links = [doc.linkedin(), doc.website()]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Block::Masthead {
        name: doc.full_name.trim().to_string(),
        contact: doc.contact_items().into_iter().map(str::to_string).collect(),
        links,
        align,
        banner,
    }
}

fn section(heading: &str, style: HeadingStyle, body: Vec<Block>) -> Block {
    Block::Section {
        heading: heading.to_string(),
        style,
        body,
    }
}

fn summary_section(doc: &ResumeDocument, heading: &str, style: HeadingStyle) -> Option<Block> {
    let summary = doc.summary()?;
    Some(section(
        heading,
        style,
        vec![Block::Paragraph {
            text: summary.to_string(),
            emphasis: Emphasis::Regular,
            align: Align::Left,
        }],
    ))
}

fn skills_section(
    doc: &ResumeDocument,
    heading: &str,
    style: HeadingStyle,
    items: ItemStyle,
) -> Option<Block> {
    let skills = doc.populated_skills();
    if skills.is_empty() {
        return None;
    }
    Some(section(
        heading,
        style,
        vec![Block::Items {
            items: skills.into_iter().map(str::to_string).collect(),
            style: items,
        }],
    ))
}

fn certifications_section(
    doc: &ResumeDocument,
    heading: &str,
    style: HeadingStyle,
    items: ItemStyle,
) -> Option<Block> {
    let certifications = doc.populated_certifications();
    if certifications.is_empty() {
        return None;
    }
    Some(section(
        heading,
        style,
        vec![Block::Items {
            items: certifications.into_iter().map(str::to_string).collect(),
            style: items,
        }],
    ))
}

/// Experience entries keep their model index so bullet addresses line up with the
/// canonical document even when blank entries are skipped.
fn experience_section(
    doc: &ResumeDocument,
    heading: &str,
    style: HeadingStyle,
    options: &RenderOptions,
) -> Option<Block> {
    if !doc.has_experience() {
        return None;
    }
    let roles = doc
        .experience
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_populated())
        .map(|(experience_index, entry)| Block::Role {
            title: entry.title.trim().to_string(),
            company: entry.company.trim().to_string(),
            dates: entry.date_range(DATE_SEPARATOR),
            bullets: entry
                .bullet_points
                .iter()
                .enumerate()
                .map(|(bullet_index, text)| {
                    bullet_node(experience_index, bullet_index, text, options.editable)
                })
                .collect(),
        })
        .collect();
    Some(section(heading, style, roles))
}

/// Builds the edit affordance for one bullet. Every variant goes through here.
pub(crate) fn bullet_node(
    experience_index: usize,
    bullet_index: usize,
    text: &str,
    editable: bool,
) -> BulletNode {
    if editable {
        BulletNode::Editable {
            address: BulletAddress {
                experience_index,
                bullet_index,
            },
            text: text.to_string(),
        }
    } else {
        BulletNode::Static {
            text: text.to_string(),
        }
    }
}

fn education_section(doc: &ResumeDocument, heading: &str, style: HeadingStyle) -> Option<Block> {
    if !doc.has_education() {
        return None;
    }
    let records = doc
        .populated_education()
        .map(|edu| Block::Record {
            primary: edu.degree.trim().to_string(),
            secondary: populated(&edu.school)
                .map(|s| vec![s.to_string()])
                .unwrap_or_default(),
            trailing: populated(&edu.graduation_year).map(str::to_string),
        })
        .collect();
    Some(section(heading, style, records))
}

fn projects_section(doc: &ResumeDocument, heading: &str, style: HeadingStyle) -> Option<Block> {
    if !doc.has_projects() {
        return None;
    }
    let records = doc
        .populated_projects()
        .map(|project| Block::Record {
            primary: project.name.trim().to_string(),
            secondary: populated(&project.description)
                .map(|d| vec![d.to_string()])
                .unwrap_or_default(),
            trailing: None,
        })
        .collect();
    Some(section(heading, style, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{EducationEntry, ExperienceEntry, ProjectEntry};
    use chrono::NaiveDate;

    type Variant = fn(&ResumeDocument, &RenderOptions) -> RenderedView;

    const VARIANTS: [Variant; 5] = [
        render_modern,
        render_classic,
        render_minimalist,
        render_executive,
        render_creative,
    ];

    fn options(editable: bool) -> RenderOptions {
        RenderOptions::new(editable, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn full_resume() -> ResumeDocument {
        ResumeDocument {
            full_name: "Jane Doe".to_string(),
            email: "j@x.com".to_string(),
            phone: "555-0100".to_string(),
            location: "NYC".to_string(),
            linkedin: Some("linkedin.com/in/jane".to_string()),
            website: Some("jane.dev".to_string()),
            summary: Some("Backend engineer.".to_string()),
            target_role: Some("Staff Engineer".to_string()),
            skills: vec!["SQL".to_string(), "Go".to_string()],
            experience: vec![
                ExperienceEntry {
                    title: "Eng".to_string(),
                    company: "Acme".to_string(),
                    start_date: "2020".to_string(),
                    end_date: "2022".to_string(),
                    bullet_points: vec![
                        "Built X".to_string(),
                        "Shipped Y".to_string(),
                        "Led Z".to_string(),
                    ],
                },
                ExperienceEntry {
                    title: "Intern".to_string(),
                    company: "Initech".to_string(),
                    start_date: "2019".to_string(),
                    end_date: String::new(),
                    bullet_points: vec!["Fixed bugs".to_string()],
                },
            ],
            education: vec![EducationEntry {
                degree: "BS CS".to_string(),
                school: "MIT".to_string(),
                graduation_year: "2019".to_string(),
            }],
            projects: vec![ProjectEntry {
                name: "folio".to_string(),
                description: "Resume exporter".to_string(),
            }],
            certifications: vec!["CKA".to_string()],
        }
    }

    #[test]
    fn test_every_variant_surfaces_every_populated_field() {
        let doc = full_resume();
        let expected = [
            "Jane Doe",
            "j@x.com",
            "555-0100",
            "NYC",
            "linkedin.com/in/jane",
            "jane.dev",
            "Backend engineer.",
            "SQL",
            "Go",
            "Eng",
            "Acme",
            "Built X",
            "Shipped Y",
            "Led Z",
            "Intern",
            "Initech",
            "Fixed bugs",
            "BS CS",
            "MIT",
            "2019",
            "folio",
            "Resume exporter",
            "CKA",
        ];
        for render in VARIANTS {
            let view = render(&doc, &options(false));
            let runs = view.text_runs();
            for field in expected {
                assert!(
                    runs.iter().any(|r| r == field),
                    "{} dropped {field}",
                    view.template.id()
                );
            }
        }
    }

    #[test]
    fn test_target_role_is_not_displayed() {
        let doc = full_resume();
        let view = render_modern(&doc, &options(false));
        assert!(!view.text_runs().iter().any(|r| r == "Staff Engineer"));
    }

    #[test]
    fn test_editable_bullets_carry_model_addresses() {
        let doc = full_resume();
        for render in VARIANTS {
            let view = render(&doc, &options(true));
            let addresses: Vec<BulletAddress> =
                view.bullets().iter().filter_map(|b| b.address()).collect();
            assert_eq!(
                addresses,
                vec![
                    BulletAddress { experience_index: 0, bullet_index: 0 },
                    BulletAddress { experience_index: 0, bullet_index: 1 },
                    BulletAddress { experience_index: 0, bullet_index: 2 },
                    BulletAddress { experience_index: 1, bullet_index: 0 },
                ]
            );
        }
    }

    #[test]
    fn test_static_bullets_when_not_editable() {
        let doc = full_resume();
        let view = render_classic(&doc, &options(false));
        assert!(view
            .bullets()
            .iter()
            .all(|b| matches!(b, BulletNode::Static { .. })));
        assert!(!view.editable);
    }

    #[test]
    fn test_blank_entry_keeps_following_indices() {
        let mut doc = full_resume();
        doc.experience.insert(0, ExperienceEntry::default());
        let view = render_minimalist(&doc, &options(true));
        let first = view.bullets()[0].address().unwrap();
        assert_eq!(first.experience_index, 1);
    }

    #[test]
    fn test_empty_bullet_keeps_its_node() {
        let mut doc = full_resume();
        doc.experience[0].bullet_points[1].clear();
        let view = render_modern(&doc, &options(true));
        assert_eq!(view.bullets().len(), 4);
        assert_eq!(view.bullets()[1].text(), "");
    }

    #[test]
    fn test_empty_sections_have_no_heading() {
        let doc = ResumeDocument {
            full_name: "Jane Doe".to_string(),
            skills: vec!["SQL".to_string()],
            ..Default::default()
        };
        for render in VARIANTS {
            let view = render(&doc, &options(false));
            assert_eq!(view.headings(), vec!["Skills"], "{}", view.template.id());
        }
    }

    #[test]
    fn test_open_ended_role_shows_present() {
        let doc = full_resume();
        let view = render_modern(&doc, &options(false));
        assert!(view.text_runs().iter().any(|r| r == "2019 – Present"));
    }

    #[test]
    fn test_executive_uses_columns() {
        let view = render_executive(&full_resume(), &options(false));
        assert!(matches!(view.blocks.as_slice(), [Block::Columns { .. }]));
    }

    #[test]
    fn test_creative_orders_education_before_experience() {
        let view = render_creative(&full_resume(), &options(false));
        let headings = view.headings();
        let edu = headings.iter().position(|h| *h == "Education").unwrap();
        let exp = headings.iter().position(|h| *h == "Experience").unwrap();
        assert!(edu < exp);
    }
}
