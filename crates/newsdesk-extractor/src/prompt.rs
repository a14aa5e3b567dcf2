//! Prompt construction for field extraction

use newsdesk_domain::{FieldKind, FieldSpec};

/// Builds the extraction request sent to a backend
///
/// Output depends only on the inputs, so the same article and field list
/// always produce the same request.
pub struct PromptBuilder<'a> {
    text: &'a str,
    fields: &'a [FieldSpec],
    title: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str, fields: &'a [FieldSpec]) -> Self {
        Self {
            text,
            fields,
            title: None,
        }
    }

    /// Add the page title as context
    pub fn with_title(mut self, title: Option<&'a str>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instructions
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Requested fields
        prompt.push_str("Fields to extract:\n");
        for field in self.fields {
            match field.kind {
                FieldKind::Date => prompt.push_str(&format!(
                    "- {} (date, format YYYY-MM-DD): {}\n",
                    field.name, field.description
                )),
                FieldKind::Text => {
                    prompt.push_str(&format!("- {} (text): {}\n", field.name, field.description))
                }
            }
        }
        prompt.push('\n');

        // 3. The article
        if let Some(title) = self.title {
            prompt.push_str(&format!("Page title: {}\n\n", title.trim()));
        }
        prompt.push_str("Article text:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text.trim());
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str("Output format (a single JSON object, no additional text):\n");
        prompt.push_str(&self.output_template());
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// JSON object skeleton with one key per requested field
    fn output_template(&self) -> String {
        let lines: Vec<String> = self
            .fields
            .iter()
            .map(|field| {
                let placeholder = match field.kind {
                    FieldKind::Date => "YYYY-MM-DD",
                    FieldKind::Text => "...",
                };
                format!("  \"{}\": \"{}\"", field.name, placeholder)
            })
            .collect();
        format!("{{\n{}\n}}", lines.join(",\n"))
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are a news analyst. Read the article below and extract the requested fields.

Rules:
- Use exactly the field names listed below as JSON keys
- Take values from the article text only; do not guess
- Write dates as YYYY-MM-DD
- Use null for any field the article does not contain
- Keep text values on a single line"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY the JSON object, no markdown code blocks, no explanations.";
