//! Plain-text serializer.

use crate::models::document::{populated, CoverLetterDocument, Document, ResumeDocument};

const RULE_WIDTH: usize = 50;
const BULLET: &str = "•";

pub fn serialize(document: &Document) -> String {
    match document {
        Document::Resume(resume) => resume_text(resume),
        Document::CoverLetter(letter) => cover_letter_text(letter),
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn section(out: &mut String, heading: &str, body: &str) {
    out.push_str(heading);
    out.push('\n');
    out.push_str(&rule());
    out.push('\n');
    out.push_str(body);
    out.push('\n');
}

pub fn resume_text(doc: &ResumeDocument) -> String {
    let mut out = String::new();

    if let Some(name) = populated(&doc.full_name) {
        out.push_str(name);
        out.push('\n');
    }
    let contact = doc.contact_items();
    if !contact.is_empty() {
        out.push_str(&contact.join(" | "));
        out.push('\n');
    }
    if let Some(linkedin) = doc.linkedin() {
        out.push_str(&format!("LinkedIn: {linkedin}\n"));
    }
    if let Some(website) = doc.website() {
        out.push_str(&format!("Website: {website}\n"));
    }
    out.push('\n');
    out.push_str(&rule());
    out.push_str("\n\n");

    if let Some(summary) = doc.summary() {
        section(&mut out, "SUMMARY", &format!("{summary}\n"));
    }

    let skills = doc.populated_skills();
    if !skills.is_empty() {
        section(&mut out, "SKILLS", &format!("{}\n", skills.join(", ")));
    }

    if doc.has_experience() {
        let mut body = String::new();
        for entry in doc.populated_experience() {
            body.push('\n');
            let heading = entry.heading();
            if !heading.is_empty() {
                body.push_str(&heading);
                body.push('\n');
            }
            body.push_str(&entry.date_range(" - "));
            body.push('\n');
            for bullet in entry.populated_bullets() {
                body.push_str(&format!("{BULLET} {bullet}\n"));
            }
        }
        section(&mut out, "EXPERIENCE", &body);
    }

    if doc.has_projects() {
        let mut body = String::new();
        for project in doc.populated_projects() {
            match (populated(&project.name), populated(&project.description)) {
                (Some(name), Some(description)) => {
                    body.push_str(&format!("{name}\n{description}\n\n"))
                }
                (Some(only), None) | (None, Some(only)) => body.push_str(&format!("{only}\n\n")),
                (None, None) => {}
            }
        }
        section(&mut out, "PROJECTS", body.trim_end_matches('\n'));
        out.push('\n');
    }

    if doc.has_education() {
        let lines: Vec<String> = doc
            .populated_education()
            .map(|e| e.fields().collect::<Vec<_>>().join(" | "))
            .collect();
        section(&mut out, "EDUCATION", &format!("{}\n", lines.join("\n")));
    }

    let certifications = doc.populated_certifications();
    if !certifications.is_empty() {
        let lines: Vec<String> = certifications
            .iter()
            .map(|c| format!("{BULLET} {c}"))
            .collect();
        section(&mut out, "CERTIFICATIONS", &format!("{}\n", lines.join("\n")));
    }

    let mut out = out.trim_end().to_string();
    out.push('\n');
    out
}

pub fn cover_letter_text(letter: &CoverLetterDocument) -> String {
    let mut out = String::new();
    if let Some(name) = populated(&letter.applicant_name) {
        out.push_str(name);
        out.push('\n');
    }
    for line in [letter.company_name(), letter.position()].into_iter().flatten() {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&letter.paragraphs().join("\n\n"));

    let mut out = out.trim().to_string();
    out.push('\n');
    out
}
