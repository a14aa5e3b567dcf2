//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use newsdesk_domain::{FieldRegistry, FIELD_SET_VERSION};
use newsdesk_extractor::ArticleReport;
use tabled::{
    builder::Builder,
    settings::{object::Columns, object::Rows, Alignment, Modify, Style, Width},
};

/// Widest value column before wrapping
const VALUE_WIDTH: usize = 80;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format article reports.
    ///
    /// JSON output is a single object for one report and an array otherwise.
    pub fn format_reports(&self, reports: &[ArticleReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => match reports {
                [report] => Ok(serde_json::to_string_pretty(report)?),
                _ => Ok(serde_json::to_string_pretty(reports)?),
            },
            OutputFormat::Table => Ok(reports
                .iter()
                .map(|r| self.format_report_table(r))
                .collect::<Vec<_>>()
                .join("\n\n")),
        }
    }

    /// Format one report as a heading plus a field table.
    fn format_report_table(&self, report: &ArticleReport) -> String {
        let heading = report
            .page_title
            .as_deref()
            .or(report.article_url.as_deref())
            .unwrap_or("Untitled article");

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        if let Some(month) = &report.article_received_month {
            builder.push_record(["received", month.as_str()]);
        }
        if let Some(url) = &report.article_url {
            builder.push_record(["url", url.as_str()]);
        }
        if let Some(source) = &report.page_source {
            builder.push_record(["source", source.as_str()]);
        }
        builder.push_record([
            "content".to_string(),
            format!("{} chars", report.page_content.chars().count()),
        ]);
        for name in &report.metadata.fields_requested {
            let value = report
                .features
                .get(name)
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([name.clone(), value]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Modify::new(Columns::single(1)).with(Width::wrap(VALUE_WIDTH)));

        let mut out = format!("{}\n{}", self.colorize(heading, "cyan"), table);
        if !report.metadata.fields_missing.is_empty() {
            out.push('\n');
            out.push_str(&self.warning(&format!(
                "Not found: {}",
                report.metadata.fields_missing.join(", ")
            )));
        }
        out.push('\n');
        out.push_str(&format!(
            "{} {} in {} ms",
            report.metadata.provider, report.metadata.model_name, report.metadata.processing_time_ms
        ));
        out
    }

    /// Format the recognized field set.
    pub fn format_fields(&self, registry: &FieldRegistry) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "version": FIELD_SET_VERSION,
                "fields": registry.fields(),
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Name", "Kind", "Aliases", "Description"]);
                for field in registry.fields() {
                    builder.push_record([
                        field.name.clone(),
                        field.kind.as_str().to_string(),
                        field.aliases.join(", "),
                        field.description.clone(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                Ok(format!(
                    "{}\n{}",
                    self.colorize(&format!("Recognized fields (version {})", FIELD_SET_VERSION), "cyan"),
                    table
                ))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().bold().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use newsdesk_domain::{FieldValue, NormalizedRecord, ProviderKind};
    use newsdesk_extractor::ExtractionMetadata;

    fn create_test_report() -> ArticleReport {
        let mut features = NormalizedRecord::new();
        features.insert("headline", FieldValue::Text("Acme Corp announces Q3 results".to_string()));
        features.insert("article_date", FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15)));
        features.insert("date", FieldValue::Date(None));

        ArticleReport {
            article_received_month: Some("March 2024".to_string()),
            article_url: Some("https://news.example.com/acme".to_string()),
            page_source: Some("https://news.example.com/acme".to_string()),
            page_title: Some("Acme Q3".to_string()),
            page_content: "Acme Corp announces Q3 results.".to_string(),
            features,
            metadata: ExtractionMetadata {
                run_id: "0190c5a0-0000-7000-8000-000000000000".to_string(),
                provider: ProviderKind::OpenAi,
                model_name: "gpt-4o-mini".to_string(),
                field_set_version: FIELD_SET_VERSION,
                fields_requested: vec![
                    "headline".to_string(),
                    "article_date".to_string(),
                    "date".to_string(),
                    "summary".to_string(),
                ],
                fields_missing: vec!["summary".to_string()],
                processing_time_ms: 42,
            },
        }
    }

    #[test]
    fn test_json_single_report_is_object() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_reports(&[create_test_report()]).unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["features"]["article_date"], "2024-03-15");
        assert!(json["features"]["date"].is_null());
        assert_eq!(json["article_received_month"], "March 2024");
    }

    #[test]
    fn test_json_many_reports_is_array() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_reports(&[create_test_report(), create_test_report()])
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_reports(&[create_test_report()]).unwrap();

        assert!(output.starts_with("Acme Q3"));
        assert!(output.contains("Field"));
        assert!(output.contains("2024-03-15"));
        assert!(output.contains("null"));
        assert!(output.contains("Not found: summary"));
        assert!(output.contains("openai gpt-4o-mini"));
    }

    #[test]
    fn test_fields_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_fields(&FieldRegistry::news()).unwrap();
        assert!(output.contains("article_date"));
        assert!(output.contains("Aliases"));
    }

    #[test]
    fn test_fields_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_fields(&FieldRegistry::news()).unwrap();

        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["version"], FIELD_SET_VERSION);
        assert_eq!(json["fields"][1]["name"], "article_date");
        assert_eq!(json["fields"][1]["kind"], "date");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
