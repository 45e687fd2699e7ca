use crate::editing::rewrite::RewriteRequest;

/// The reply is parsed as a `RewriteSuggestion`, so anything but one JSON object fails.
pub const REWRITE_SYSTEM: &str = "You rewrite resume bullet points. \
    Reply with exactly one JSON object and nothing else: \
    no prose before or after it and no markdown code fences.";

const REWRITE_INSTRUCTIONS: &str = "\
You are an expert Resume Writer. Rewrite bullet points to be more impactful by:
1. Using strong action verbs
2. Quantifying achievements with specific numbers, percentages, or metrics
3. Highlighting results and impact
4. Making it relevant to the target role
5. Ensuring ATS-friendly language

Return the improved bullet point, list of improvements made, and keywords added.";

/// Builds the user prompt for one bullet rewrite.
pub fn build_rewrite_prompt(request: &RewriteRequest) -> String {
    let target_role = request
        .target_role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("Not specified");
    let context = request
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!("Context: {c}\n"))
        .unwrap_or_default();

    format!(
        "{REWRITE_INSTRUCTIONS}\n\n\
         Target Role: {target_role}\n\
         {context}\n\
         Original Bullet Point:\n\
         {bullet}\n\n\
         Rewrite this bullet point to be more impactful, quantified, and ATS-optimized.\n\
         Make it specific, measurable, and relevant to the target role.\n\n\
         Return as JSON with:\n\
         {{\n  \"improved_bullet\": \"<rewritten bullet point>\",\n  \
         \"improvements_made\": [\"improvement 1\", \"improvement 2\"],\n  \
         \"keywords_added\": [\"keyword1\", \"keyword2\"]\n}}",
        bullet = request.original_bullet,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_bullet_role_and_context() {
        let prompt = build_rewrite_prompt(&RewriteRequest {
            original_bullet: "Built X".to_string(),
            target_role: Some("Staff Engineer".to_string()),
            context: Some("Eng at Acme".to_string()),
        });
        assert!(prompt.contains("Original Bullet Point:\nBuilt X"));
        assert!(prompt.contains("Target Role: Staff Engineer"));
        assert!(prompt.contains("Context: Eng at Acme"));
        assert!(prompt.contains("\"improved_bullet\""));
    }

    #[test]
    fn test_prompt_without_role_or_context() {
        let prompt = build_rewrite_prompt(&RewriteRequest {
            original_bullet: "Built X".to_string(),
            target_role: Some("  ".to_string()),
            context: None,
        });
        assert!(prompt.contains("Target Role: Not specified"));
        assert!(!prompt.contains("Context:"));
    }
}
