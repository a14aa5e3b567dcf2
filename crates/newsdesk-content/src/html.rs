//! HTML to article text

use dom_query::{Document, Selection};
use regex::Regex;
use std::sync::LazyLock;

/// Elements that never carry article prose
const BOILERPLATE: &str = "script, style, noscript, template, nav, header, footer, aside, form, iframe, svg, button";

/// Block elements whose text makes up the article body
const BLOCKS: &str = "h1, h2, h3, p, li, blockquote";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Title and body text pulled out of an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// `og:title`, `<title>` or first `<h1>`, in that order
    pub title: Option<String>,

    /// Body text, one block per paragraph
    pub text: String,
}

/// Extract the title and readable text of an article page
pub fn page_text(html: &str) -> PageText {
    let doc = Document::from(html);
    let title = page_title(&doc);

    doc.select(BOILERPLATE).remove();

    let root = ["article", "main"]
        .iter()
        .map(|sel| doc.select(sel))
        .find(|sel| !sel.is_empty())
        .unwrap_or_else(|| doc.select("body"));

    let mut blocks: Vec<String> = Vec::new();
    for node in root.select(BLOCKS).nodes() {
        let sel = Selection::from(*node);
        // Skip blocks nested in another matched block; the outer one already has the text
        if !sel.parent().is(BLOCKS) {
            push_block(&mut blocks, &sel.text());
        }
    }

    if blocks.is_empty() {
        push_block(&mut blocks, &root.text());
    }

    PageText {
        title,
        text: blocks.join("\n\n"),
    }
}

fn page_title(doc: &Document) -> Option<String> {
    let og = doc
        .select("meta[property='og:title']")
        .attr("content")
        .map(|s| collapse(&s));
    if let Some(title) = og.filter(|t| !t.is_empty()) {
        return Some(title);
    }

    ["title", "h1"]
        .iter()
        .map(|sel| collapse(&doc.select(sel).first().text()))
        .find(|t| !t.is_empty())
}

fn push_block(blocks: &mut Vec<String>, raw: &str) {
    let text = collapse(raw);
    if !text.is_empty() {
        blocks.push(text);
    }
}

fn collapse(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_article_element() {
        let html = r#"<html><head><title>Acme | News</title></head><body>
            <nav><p>Home</p><p>Markets</p></nav>
            <article>
                <h1>Acme Corp announces Q3 results</h1>
                <p>Acme   Corp reported
                   record revenue.</p>
                <p>Published: 15/03/2024.</p>
            </article>
            <footer><p>Copyright</p></footer>
        </body></html>"#;

        let page = page_text(html);
        assert_eq!(page.title.as_deref(), Some("Acme | News"));
        assert_eq!(
            page.text,
            "Acme Corp announces Q3 results\n\nAcme Corp reported record revenue.\n\nPublished: 15/03/2024."
        );
    }

    #[test]
    fn test_main_element_before_body() {
        let html = r#"<html><body>
            <div class="promo"><p>Subscribe today</p></div>
            <main><p>Widgets Inc shares rose 4%.</p></main>
        </body></html>"#;
        assert_eq!(page_text(html).text, "Widgets Inc shares rose 4%.");
    }

    #[test]
    fn test_og_title_wins() {
        let html = r#"<html><head>
            <meta property="og:title" content="Real Headline">
            <title>Site name</title>
        </head><body><p>Text.</p></body></html>"#;
        assert_eq!(page_text(html).title.as_deref(), Some("Real Headline"));
    }

    #[test]
    fn test_drops_scripts_and_falls_back_to_body_text() {
        let html = r#"<html><body><script>var x = 1;</script><div>Only   a div.</div></body></html>"#;
        let page = page_text(html);
        assert_eq!(page.title, None);
        assert_eq!(page.text, "Only a div.");
    }

    #[test]
    fn test_nested_blocks_not_duplicated() {
        let html = r#"<body><ul><li><p>Point one</p></li></ul><blockquote><p>Quote</p></blockquote></body>"#;
        assert_eq!(page_text(html).text, "Point one\n\nQuote");
    }
}
