//! Web page loader.

use crate::types::{AppError, Document, DocumentMetadata, Result};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

const USER_AGENT: &str = concat!("docqa/", env!("CARGO_PKG_VERSION"));

/// Wide enough that html2text never hard-wraps a paragraph.
const RENDER_WIDTH: usize = 10_000;

static NON_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>")
        .expect("valid markup regex")
});

/// HTTP client used to fetch pages.
#[derive(Clone)]
pub struct WebLoader {
    client: reqwest::Client,
}

impl WebLoader {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

/// How a fetched body is turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    PlainText,
    Pdf,
}

/// Pick a parser from the `Content-Type` header, falling back to the PDF
/// magic bytes for servers that label PDFs generically.
fn classify(content_type: Option<&str>, body: &[u8]) -> std::result::Result<BodyKind, String> {
    let mime = content_type
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "application/pdf" || body.starts_with(b"%PDF-") {
        return Ok(BodyKind::Pdf);
    }

    match mime.as_str() {
        "" | "text/html" | "application/xhtml+xml" => Ok(BodyKind::Html),
        m if m.starts_with("text/") => Ok(BodyKind::PlainText),
        m => Err(m.to_string()),
    }
}

/// Fetch `url` and return its text: one document for a web page, one per
/// page for a PDF.
pub async fn load_url(loader: &WebLoader, url: &str) -> Result<Vec<Document>> {
    let response = loader
        .client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Loader(format!("Failed to fetch {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Loader(format!(
            "Fetching {} returned HTTP {}",
            url,
            status.as_u16()
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::Loader(format!("Failed to read body of {}: {}", url, e)))?;

    let kind = classify(content_type.as_deref(), &body).map_err(|mime| {
        AppError::Loader(format!("Unsupported content type '{}' at {}", mime, url))
    })?;

    let (title, text) = match kind {
        BodyKind::Pdf => return super::pdf::load_pdf_bytes(url, body.to_vec()).await,
        BodyKind::PlainText => (None, String::from_utf8_lossy(&body).into_owned()),
        BodyKind::Html => {
            let (title, text) = html_to_text(&String::from_utf8_lossy(&body))?;
            (title, normalize_lines(&text))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::Loader(format!("No text content found at {}", url)));
    }

    tracing::debug!(url = %url, kind = ?kind, chars = text.chars().count(), "Loaded web page");

    let mut metadata = DocumentMetadata::new(url);
    metadata.title = title;

    Ok(vec![Document {
        id: "page-0".to_string(),
        content: text,
        metadata,
        embedding: None,
    }])
}

/// Extract `<title>` and the readable body text.
pub fn html_to_text(html: &str) -> Result<(Option<String>, String)> {
    let cleaned = NON_CONTENT.replace_all(html, "");
    let document = Html::parse_document(&cleaned);

    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty());

    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next().map(|el| el.html()))
        .unwrap_or_else(|| cleaned.to_string());

    let text = html2text::from_read(root.as_bytes(), RENDER_WIDTH)
        .map_err(|e| AppError::Loader(format!("Failed to convert HTML to text: {}", e)))?;

    Ok((title, text))
}

/// Collapse runs of spaces inside each line and drop blank lines.
fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
