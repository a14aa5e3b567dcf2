//! Integration tests for the extraction pipeline

#[cfg(test)]
mod tests {
    use crate::{ExtractionPipeline, ExtractorConfig, ExtractorError, ParseError};
    use chrono::NaiveDate;
    use newsdesk_domain::{
        ArticleContent, ContentFetchError, ContentRef, ContentSource, ExtractionProvider,
        FieldSpec, FieldValue, ProviderError, ProviderKind,
    };
    use newsdesk_llm::{MockProvider, ProviderRegistry};
    use std::time::Duration;

    const ACME_TEXT: &str = "Acme Corp announces Q3 results. Published: 15/03/2024.";

    fn pipeline_with(provider: MockProvider) -> ExtractionPipeline {
        ExtractionPipeline::new(
            ProviderRegistry::new().with_provider(provider),
            ExtractorConfig::default(),
        )
        .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    /// Serves canned pages keyed by URL
    struct StaticSource {
        content: ArticleContent,
    }

    impl ContentSource for StaticSource {
        fn fetch(&self, reference: &ContentRef) -> Result<ArticleContent, ContentFetchError> {
            match reference {
                ContentRef::Url(url) if url.contains("missing") => Err(ContentFetchError::HttpStatus {
                    status: 404,
                    url: url.clone(),
                }),
                ContentRef::Url(_) => Ok(self.content.clone()),
                ContentRef::Document { text, name } => {
                    let mut content = ArticleContent::new(text.clone());
                    content.title = name.clone();
                    Ok(content)
                }
            }
        }
    }

    /// Sleeps before answering
    struct SlowProvider {
        delay: Duration,
    }

    impl ExtractionProvider for SlowProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Ollama
        }

        fn model(&self) -> &str {
            "slow"
        }

        fn extract(&self, _request: &str) -> Result<String, ProviderError> {
            std::thread::sleep(self.delay);
            Ok(r#"{"summary": "late"}"#.to_string())
        }
    }

    #[test]
    fn test_structured_answer_is_normalized() {
        let provider = MockProvider::new(
            "```json\n{\"article_date\": \"15/03/2024\", \"summary\": \"Acme Corp announces Q3 results.\"}\n```",
        );
        let pipeline = pipeline_with(provider.clone());

        let record = pipeline
            .run(ACME_TEXT, &["article_date", "summary"], ProviderKind::OpenAi)
            .unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.date("article_date"), ymd(2024, 3, 15));
        assert_eq!(record.text("summary"), Some("Acme Corp announces Q3 results."));
        assert_eq!(provider.call_count(), 1);

        let request = provider.last_request().unwrap();
        assert!(request.contains(ACME_TEXT));
        assert!(request.contains("article_date"));
    }

    #[test]
    fn test_connectivity_failure_yields_provider_error() {
        let provider = MockProvider::failing(ProviderError::Communication("connection refused".to_string()));
        let pipeline = pipeline_with(provider);

        let err = pipeline
            .run(ACME_TEXT, &["article_date", "summary"], ProviderKind::OpenAi)
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Provider(ProviderError::Communication(_))));
    }

    #[test]
    fn test_prose_answer_yields_parse_error() {
        let provider = MockProvider::new("The article talks about a company and its quarterly earnings.");
        let pipeline = pipeline_with(provider);

        let err = pipeline
            .run(ACME_TEXT, &["article_date", "summary"], ProviderKind::OpenAi)
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Parse(ParseError::NoRecognizedFields { .. })));
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let provider = MockProvider::new("date: March 5, 2024\ndate: 2024-03-06");
        let pipeline = pipeline_with(provider);

        let record = pipeline.run(ACME_TEXT, &["date"], ProviderKind::OpenAi).unwrap();

        assert_eq!(record.date("date"), ymd(2024, 3, 6));
    }

    #[test]
    fn test_partial_answer_is_not_an_error() {
        let provider = MockProvider::new(r#"{"headline": "Acme results", "article_date": "not stated"}"#);
        let pipeline = pipeline_with(provider);

        let record = pipeline
            .run(ACME_TEXT, &["headline", "article_date", "summary"], ProviderKind::OpenAi)
            .unwrap();

        assert_eq!(record.text("headline"), Some("Acme results"));
        assert_eq!(record.get("article_date"), Some(&FieldValue::Date(None)));
        assert!(!record.contains("summary"));
    }

    #[test]
    fn test_invalid_requests_make_no_backend_call() {
        let provider = MockProvider::new(r#"{"summary": "x"}"#);
        let pipeline = pipeline_with(provider.clone());

        let empty_text = pipeline.run("   ", &["summary"], ProviderKind::OpenAi);
        assert!(matches!(empty_text, Err(ExtractorError::InvalidRequest(_))));

        let no_fields: &[&str] = &[];
        let empty_fields = pipeline.run(ACME_TEXT, no_fields, ProviderKind::OpenAi);
        assert!(matches!(empty_fields, Err(ExtractorError::InvalidRequest(_))));

        let unknown = pipeline.run(ACME_TEXT, &["summary", "stock_price"], ProviderKind::OpenAi);
        match unknown {
            Err(ExtractorError::InvalidRequest(msg)) => assert!(msg.contains("stock_price")),
            other => panic!("expected InvalidRequest, got {:?}", other),
        }

        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_unregistered_provider_is_not_configured() {
        let pipeline = pipeline_with(MockProvider::new(r#"{"summary": "x"}"#));

        let err = pipeline.run(ACME_TEXT, &["summary"], ProviderKind::Gemini).unwrap_err();

        assert!(matches!(err, ExtractorError::Provider(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn test_provider_selected_per_call() {
        let openai = MockProvider::new(r#"{"headline": "from openai"}"#);
        let gemini = MockProvider::new(r#"{"headline": "from gemini"}"#).with_kind(ProviderKind::Gemini);
        let providers = ProviderRegistry::new()
            .with_provider(openai)
            .with_provider(gemini);
        let pipeline = ExtractionPipeline::new(providers, ExtractorConfig::default()).unwrap();

        let a = pipeline.run(ACME_TEXT, &["headline"], ProviderKind::OpenAi).unwrap();
        let b = pipeline.run(ACME_TEXT, &["headline"], ProviderKind::Gemini).unwrap();

        assert_eq!(a.text("headline"), Some("from openai"));
        assert_eq!(b.text("headline"), Some("from gemini"));
    }

    #[test]
    fn test_extra_date_field_from_config() {
        let mut config = ExtractorConfig::default();
        config
            .extra_fields
            .push(FieldSpec::date("deal_close_date", "Expected closing date of the deal"));
        let provider = MockProvider::new("Deal close date: 30 June 2024");
        let pipeline =
            ExtractionPipeline::new(ProviderRegistry::new().with_provider(provider), config).unwrap();

        let record = pipeline
            .run("Acme agreed to buy Widgets Inc.", &["deal_close_date"], ProviderKind::OpenAi)
            .unwrap();

        assert_eq!(record.date("deal_close_date"), ymd(2024, 6, 30));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ExtractorConfig::default();
        config.extraction_timeout_secs = 0;

        let result = ExtractionPipeline::new(ProviderRegistry::new(), config);

        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_run_content_reports_metadata() {
        let provider = MockProvider::new(r#"{"summary": "S"}"#);
        let pipeline = pipeline_with(provider);
        let content = ArticleContent::new(ACME_TEXT).with_title("Acme Q3");

        let outcome = pipeline
            .run_content(&content, &["summary", "headline"], ProviderKind::OpenAi)
            .unwrap();

        assert_eq!(outcome.metadata.model_name, "mock");
        assert_eq!(outcome.metadata.provider, ProviderKind::OpenAi);
        assert_eq!(outcome.metadata.fields_requested, vec!["summary", "headline"]);
        assert_eq!(outcome.metadata.fields_missing, vec!["headline"]);
        assert!(uuid::Uuid::parse_str(&outcome.metadata.run_id).is_ok());
    }

    #[test]
    fn test_extract_article_builds_report() {
        let provider = MockProvider::new(
            r#"{"headline": "Acme Corp announces Q3 results", "article_date": "2024-03-15"}"#,
        );
        let pipeline = pipeline_with(provider.clone());
        let source = StaticSource {
            content: ArticleContent::new(ACME_TEXT)
                .with_source("https://news.example.com/acme-q3")
                .with_title("Acme Q3"),
        };

        let report = pipeline
            .extract_article(
                &source,
                &ContentRef::url("https://news.example.com/acme"),
                &["headline", "article_date"],
                ProviderKind::OpenAi,
                ymd(2024, 3, 18),
            )
            .unwrap();

        assert_eq!(report.article_received_month.as_deref(), Some("March 2024"));
        assert_eq!(report.article_url.as_deref(), Some("https://news.example.com/acme"));
        assert_eq!(report.page_source.as_deref(), Some("https://news.example.com/acme-q3"));
        assert_eq!(report.page_title.as_deref(), Some("Acme Q3"));
        assert_eq!(report.page_content, ACME_TEXT);
        assert_eq!(report.features.date("article_date"), ymd(2024, 3, 15));
        assert!(provider.last_request().unwrap().contains("Page title: Acme Q3"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["features"]["article_date"], "2024-03-15");
        assert_eq!(json["article_received_month"], "March 2024");
    }

    #[test]
    fn test_extract_article_from_document() {
        let provider = MockProvider::new(r#"{"summary": "Widgets merger."}"#);
        let pipeline = pipeline_with(provider);
        let source = StaticSource {
            content: ArticleContent::new("unused"),
        };

        let report = pipeline
            .extract_article(
                &source,
                &ContentRef::document(Some("memo.txt".to_string()), "Widgets Inc merges with Acme."),
                &["summary"],
                ProviderKind::OpenAi,
                None,
            )
            .unwrap();

        assert_eq!(report.article_url, None);
        assert_eq!(report.article_received_month, None);
        assert_eq!(report.page_title.as_deref(), Some("memo.txt"));
        assert_eq!(report.features.text("summary"), Some("Widgets merger."));
    }

    #[test]
    fn test_content_fetch_error_is_propagated() {
        let provider = MockProvider::new(r#"{"summary": "x"}"#);
        let pipeline = pipeline_with(provider.clone());
        let source = StaticSource {
            content: ArticleContent::new("unused"),
        };

        let err = pipeline
            .extract_article(
                &source,
                &ContentRef::url("https://news.example.com/missing"),
                &["summary"],
                ProviderKind::OpenAi,
                None,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractorError::ContentFetch(ContentFetchError::HttpStatus { status: 404, .. })
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_async() {
        let pipeline = pipeline_with(MockProvider::new(r#"{"summary": "async summary"}"#));

        let record = pipeline
            .run_async(ACME_TEXT.to_string(), vec!["summary".to_string()], ProviderKind::OpenAi)
            .await
            .unwrap();

        assert_eq!(record.text("summary"), Some("async summary"));
    }

    #[tokio::test]
    async fn test_run_async_timeout() {
        let mut config = ExtractorConfig::default();
        config.extraction_timeout_secs = 1;
        let providers = ProviderRegistry::new().with_provider(SlowProvider {
            delay: Duration::from_millis(1500),
        });
        let pipeline = ExtractionPipeline::new(providers, config).unwrap();

        let err = pipeline
            .run_async(ACME_TEXT.to_string(), vec!["summary".to_string()], ProviderKind::Ollama)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractorError::Provider(ProviderError::Timeout)));
    }

    #[tokio::test]
    async fn test_pipeline_shared_across_tasks() {
        let mut provider = MockProvider::new(r#"{"headline": "default"}"#);
        provider.add_response("Globex", r#"{"headline": "Globex story"}"#);
        let pipeline = std::sync::Arc::new(pipeline_with(provider));

        let mut handles = Vec::new();
        for text in ["Acme story text", "Globex story text"] {
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                pipeline
                    .run_async(text.to_string(), vec!["headline".to_string()], ProviderKind::OpenAi)
                    .await
            }));
        }

        let mut headlines = Vec::new();
        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            headlines.push(record.text("headline").unwrap().to_string());
        }
        assert_eq!(headlines, vec!["default", "Globex story"]);
    }
}
