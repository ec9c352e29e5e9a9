//! Anchor and image extraction from HTML pages.

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors from HTML extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid CSS selector {0:?}")]
    InvalidSelector(String),
}

/// A link found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Concatenated text content of the element.
    pub text: String,
    pub href: String,
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|_| ExtractError::InvalidSelector(selector.to_string()))
}

/// Select all anchors matching `selector` that carry an `href`.
pub fn select_anchors(html: &str, selector: &str) -> Result<Vec<Anchor>, ExtractError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                text: element.text().collect::<String>(),
                href: href.to_string(),
            })
        })
        .collect())
}

/// Select the `src` of every element matching `selector`, in document order.
pub fn select_images(html: &str, selector: &str) -> Result<Vec<String>, ExtractError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(|src| src.to_string())
        .collect())
}

/// True for `http://` and `https://` URLs.
pub fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http")
}

/// Resolve an href against the page it was found on.
///
/// Falls back to the href unchanged if either side does not parse.
pub fn resolve_url(base_url: &str, href: &str) -> String {
    if is_absolute_url(href) {
        return href.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// File extension of a URL's path, including the leading dot.
///
/// Query string and fragment are ignored; returns an empty string when the
/// last path segment has no extension.
pub fn url_extension(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let file_name = path.rsplit('/').next().unwrap_or_default();
    match file_name.rfind('.') {
        Some(0) | None => String::new(),
        Some(dot) => file_name[dot..].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <nav><a href="/about">Claymore, Chapter 99</a></nav>
          <main>
            <ul>
              <li><a href="https://readclaymore.com/chapter-2/">Claymore, Vol.1 Chapter 2: The Claymore of Sword</a></li>
              <li><a href="/chapter-1/"><span>Claymore, Vol.1 Chapter 1</span>: Silver Eyes Witch</a></li>
              <li><a>no href</a></li>
            </ul>
          </main>
        </body></html>
    "#;

    #[test]
    fn test_select_anchors_scoped_to_main() {
        let anchors = select_anchors(LISTING, "main a").unwrap();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].href, "https://readclaymore.com/chapter-2/");
        assert_eq!(
            anchors[0].text,
            "Claymore, Vol.1 Chapter 2: The Claymore of Sword"
        );
        assert_eq!(anchors[1].href, "/chapter-1/");
        assert_eq!(anchors[1].text, "Claymore, Vol.1 Chapter 1: Silver Eyes Witch");
    }

    #[test]
    fn test_select_images_document_order() {
        let html = r#"
            <div><img src="https://cdn.example.com/1.jpg"></div>
            <img src="/static/logo.png">
            <img alt="no source">
            <p><img src="http://cdn.example.com/2.png"></p>
        "#;
        let images = select_images(html, "img").unwrap();
        assert_eq!(
            images,
            vec![
                "https://cdn.example.com/1.jpg",
                "/static/logo.png",
                "http://cdn.example.com/2.png"
            ]
        );
    }

    #[test]
    fn test_invalid_selector() {
        assert_eq!(
            select_images("<img>", "img[").unwrap_err(),
            ExtractError::InvalidSelector("img[".to_string())
        );
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://readclaymore.com/", "/chapter-1/"),
            "https://readclaymore.com/chapter-1/"
        );
        assert_eq!(
            resolve_url("https://readclaymore.com/", "https://other.com/x"),
            "https://other.com/x"
        );
        assert_eq!(resolve_url("not a url", "/x"), "/x");
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("https://cdn.example.com/a/001.jpg"), ".jpg");
        assert_eq!(url_extension("https://cdn.example.com/a/001.png?w=800"), ".png");
        assert_eq!(url_extension("https://cdn.example.com/v1.2/image"), "");
        assert_eq!(url_extension("https://cdn.example.com/a/.hidden"), "");
        assert_eq!(url_extension("https://cdn.example.com/a.b.webp"), ".webp");
    }
}
