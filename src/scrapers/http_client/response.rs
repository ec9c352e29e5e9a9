//! Fetched page wrapper.

use std::borrow::Cow;

/// Body of a successful GET, together with the URL it was finally served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    pub content: Vec<u8>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
