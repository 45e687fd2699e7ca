//! Standalone HTML serializer.
//!
//! The output is a complete document with an inline stylesheet and no external
//! references, so the file opens on its own. The Word serializer reuses it verbatim.

use html_escape::encode_text;

use crate::models::document::{populated, CoverLetterDocument, Document, ResumeDocument};

const STYLES: &str = "\
body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; color: #1e293b; }
h1 { color: #1e293b; border-bottom: 2px solid #1e293b; padding-bottom: 10px; }
h2 { color: #334155; margin-top: 20px; border-bottom: 1px solid #cbd5e1; padding-bottom: 5px; }
.contact { margin: 10px 0; }
.section { margin: 20px 0; }
ul { list-style-type: disc; padding-left: 20px; }
.experience-item { margin: 15px 0; }
.recipient { margin: 10px 0 20px; }
p { line-height: 1.5; }";

pub fn serialize(document: &Document) -> String {
    match document {
        Document::Resume(resume) => resume_html(resume),
        Document::CoverLetter(letter) => cover_letter_html(letter),
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n\
         <style>\n{STYLES}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        encode_text(title)
    )
}

fn section(heading: &str, inner: &str) -> String {
    format!("<div class=\"section\">\n<h2>{heading}</h2>\n{inner}</div>\n")
}

/// Escapes `text` and keeps its line breaks.
pub(crate) fn multiline(text: &str) -> String {
    encode_text(text).replace('\n', "<br>\n")
}

pub fn resume_html(doc: &ResumeDocument) -> String {
    let name = populated(&doc.full_name).unwrap_or("");
    let mut body = format!("<h1>{}</h1>\n", encode_text(name));

    let mut contact = Vec::new();
    let items = doc.contact_items();
    if !items.is_empty() {
        contact.push(encode_text(&items.join(" | ")).into_owned());
    }
    if let Some(linkedin) = doc.linkedin() {
        contact.push(format!("LinkedIn: {}", encode_text(linkedin)));
    }
    if let Some(website) = doc.website() {
        contact.push(format!("Website: {}", encode_text(website)));
    }
    if !contact.is_empty() {
        body.push_str(&format!(
            "<div class=\"contact\">\n{}\n</div>\n",
            contact.join("<br>\n")
        ));
    }

    if let Some(summary) = doc.summary() {
        body.push_str(&section("Summary", &format!("<p>{}</p>\n", multiline(summary))));
    }

    let skills = doc.populated_skills();
    if !skills.is_empty() {
        body.push_str(&section(
            "Skills",
            &format!("<p>{}</p>\n", encode_text(&skills.join(", "))),
        ));
    }

    if doc.has_experience() {
        let mut inner = String::new();
        for entry in doc.populated_experience() {
            inner.push_str("<div class=\"experience-item\">\n");
            let heading = match (populated(&entry.title), populated(&entry.company)) {
                (Some(title), Some(company)) => format!(
                    "<strong>{}</strong> | {}",
                    encode_text(title),
                    encode_text(company)
                ),
                (Some(title), None) => format!("<strong>{}</strong>", encode_text(title)),
                (None, Some(company)) => encode_text(company).into_owned(),
                (None, None) => String::new(),
            };
            if !heading.is_empty() {
                inner.push_str(&heading);
                inner.push_str("<br>\n");
            }
            inner.push_str(&format!(
                "<em>{}</em>\n",
                encode_text(&entry.date_range(" - "))
            ));
            let bullets: Vec<String> = entry
                .populated_bullets()
                .map(|b| format!("<li>{}</li>", encode_text(b)))
                .collect();
            if !bullets.is_empty() {
                inner.push_str(&format!("<ul>\n{}\n</ul>\n", bullets.join("\n")));
            }
            inner.push_str("</div>\n");
        }
        body.push_str(&section("Experience", &inner));
    }

    if doc.has_projects() {
        let mut inner = String::new();
        for project in doc.populated_projects() {
            inner.push_str("<p>");
            if let Some(name) = populated(&project.name) {
                inner.push_str(&format!("<strong>{}</strong>", encode_text(name)));
                if populated(&project.description).is_some() {
                    inner.push_str("<br>\n");
                }
            }
            if let Some(description) = populated(&project.description) {
                inner.push_str(&multiline(description));
            }
            inner.push_str("</p>\n");
        }
        body.push_str(&section("Projects", &inner));
    }

    if doc.has_education() {
        let mut inner = String::new();
        for entry in doc.populated_education() {
            let mut fields = entry.fields();
            let first = fields.next().unwrap_or_default();
            let rest: Vec<String> = fields.map(|f| encode_text(f).into_owned()).collect();
            inner.push_str(&format!("<p><strong>{}</strong>", encode_text(first)));
            for field in rest {
                inner.push_str(&format!(" | {field}"));
            }
            inner.push_str("</p>\n");
        }
        body.push_str(&section("Education", &inner));
    }

    let certifications = doc.populated_certifications();
    if !certifications.is_empty() {
        let items: Vec<String> = certifications
            .iter()
            .map(|c| format!("<li>{}</li>", encode_text(c)))
            .collect();
        body.push_str(&section(
            "Certifications",
            &format!("<ul>\n{}\n</ul>\n", items.join("\n")),
        ));
    }

    let title = if name.is_empty() {
        "Resume".to_string()
    } else {
        format!("{name} - Resume")
    };
    page(&title, &body)
}

pub fn cover_letter_html(letter: &CoverLetterDocument) -> String {
    let name = populated(&letter.applicant_name).unwrap_or("");
    let mut body = format!("<h1>{}</h1>\n", encode_text(name));

    let recipient: Vec<String> = [letter.company_name(), letter.position()]
        .into_iter()
        .flatten()
        .map(|l| encode_text(l).into_owned())
        .collect();
    if !recipient.is_empty() {
        body.push_str(&format!(
            "<div class=\"recipient\">\n{}\n</div>\n",
            recipient.join("<br>\n")
        ));
    }
    for paragraph in letter.paragraphs() {
        body.push_str(&format!("<p>{}</p>\n", multiline(paragraph)));
    }

    let title = if name.is_empty() {
        "Cover Letter".to_string()
    } else {
        format!("{name} - Cover Letter")
    };
    page(&title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{EducationEntry, ExperienceEntry, ProjectEntry};

    fn jane() -> ResumeDocument {
        ResumeDocument {
            full_name: "Jane Doe".to_string(),
            email: "j@x.com".to_string(),
            phone: "555-0100".to_string(),
            location: "NYC".to_string(),
            summary: Some("Builds <fast> & safe systems".to_string()),
            skills: vec!["SQL".to_string(), "Go".to_string()],
            experience: vec![ExperienceEntry {
                title: "Eng".to_string(),
                company: "Acme".to_string(),
                start_date: "2020".to_string(),
                end_date: "2022".to_string(),
                bullet_points: vec!["Built X".to_string(), "  ".to_string()],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_standalone_document_without_external_references() {
        let html = resume_html(&jane());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>"));
        assert!(!html.contains("<link"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("src="));
    }

    #[test]
    fn test_bullets_are_list_items_and_dates_emphasised() {
        let html = resume_html(&jane());
        assert!(html.contains("<ul>\n<li>Built X</li>\n</ul>"));
        assert!(html.contains("<em>2020 - 2022</em>"));
        assert!(html.contains("<strong>Eng</strong> | Acme"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = resume_html(&jane());
        assert!(html.contains("Builds &lt;fast&gt; &amp; safe systems"));
    }

    #[test]
    fn test_education_section_suppressed_when_empty() {
        let html = resume_html(&jane());
        assert!(!html.contains("Education"));
        assert!(!html.to_uppercase().contains("<H2>EDUCATION"));

        let mut doc = jane();
        doc.education = vec![EducationEntry {
            degree: "BSc".to_string(),
            school: "MIT".to_string(),
            graduation_year: "2019".to_string(),
        }];
        assert!(resume_html(&doc).contains("<p><strong>BSc</strong> | MIT | 2019</p>"));
    }

    #[test]
    fn test_every_populated_field_surfaces() {
        let mut doc = jane();
        doc.linkedin = Some("linkedin.com/in/jane".to_string());
        doc.website = Some("jane.dev".to_string());
        doc.projects = vec![ProjectEntry {
            name: "Folio".to_string(),
            description: "Renders resumes\nand letters".to_string(),
        }];
        doc.certifications = vec!["CKA".to_string(), " ".to_string()];
        doc.education = vec![EducationEntry {
            degree: "BSc".to_string(),
            school: "MIT".to_string(),
            graduation_year: "2019".to_string(),
        }];
        let html = resume_html(&doc);

        assert!(html.contains(
            "j@x.com | 555-0100 | NYC<br>\nLinkedIn: linkedin.com/in/jane<br>\nWebsite: jane.dev"
        ));
        assert!(html.contains("<h2>Summary</h2>"));
        assert!(html.contains("<p>SQL, Go</p>"));
        assert!(html.contains(
            "<h2>Projects</h2>\n<p><strong>Folio</strong><br>\nRenders resumes<br>\nand letters</p>"
        ));
        assert!(html.contains("<h2>Education</h2>\n<p><strong>BSc</strong> | MIT | 2019</p>"));
        assert!(html.contains("<h2>Certifications</h2>\n<ul>\n<li>CKA</li>\n</ul>"));

        let headings = [
            "Summary",
            "Skills",
            "Experience",
            "Projects",
            "Education",
            "Certifications",
        ];
        let order: Vec<usize> = headings
            .iter()
            .map(|h| html.find(&format!("<h2>{h}</h2>")).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_cover_letter_paragraphs() {
        let letter = CoverLetterDocument {
            applicant_name: "Jane Doe".to_string(),
            content: "One.\n\nTwo\nlines.".to_string(),
            company_name: Some("Acme".to_string()),
            position: None,
        };
        let html = cover_letter_html(&letter);
        assert!(html.contains("<p>One.</p>\n<p>Two<br>\nlines.</p>"));
        assert!(html.contains("<title>Jane Doe - Cover Letter</title>"));
    }
}
