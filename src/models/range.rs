//! Chapter range selection (`1..10,12,15.5`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors from parsing a chapter range expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("empty item in chapter range: {0:?}")]
    EmptyItem(String),

    #[error("range start is after its end: {0:?}")]
    Reversed(String),
}

/// Sort key for a chapter id: leading number, then the remaining suffix.
///
/// `10` < `10b` < `10.5` < `11`. Ids with no leading number sort last.
///
/// The leading number is compared as a decimal, so `1.10` < `1.9`. Directory
/// names pad the fraction instead (`0001.09` before `0001.10`), which makes
/// the two orders disagree for hosts that number sub-chapters past `.9`. A
/// range such as `1.9..1.10` is therefore rejected as reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterKey {
    number: Option<f64>,
    suffix: String,
}

impl ChapterKey {
    pub fn new(id: &str) -> Self {
        let id = id.trim();
        let numeric_len = numeric_prefix_len(id);
        let number = id[..numeric_len].parse::<f64>().ok();
        let suffix = if number.is_some() {
            id[numeric_len..].to_string()
        } else {
            id.to_string()
        };
        Self { number, suffix }
    }
}

/// Length of the longest `digits[.digits]` prefix.
fn numeric_prefix_len(id: &str) -> usize {
    let bytes = id.as_bytes();
    let mut end = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if end > 0 && bytes.get(end) == Some(&b'.') {
        let fraction = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if fraction > 0 {
            end += 1 + fraction;
        }
    }
    end
}

impl PartialOrd for ChapterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let by_number = match (self.number, other.number) {
            (Some(a), Some(b)) => a.partial_cmp(&b)?,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        Some(by_number.then_with(|| self.suffix.cmp(&other.suffix)))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RangeItem {
    Single(ChapterKey),
    Span(ChapterKey, ChapterKey),
}

impl RangeItem {
    fn contains(&self, key: &ChapterKey) -> bool {
        match self {
            RangeItem::Single(id) => id == key,
            RangeItem::Span(start, end) => start <= key && key <= end,
        }
    }
}

/// A union of chapter ids and inclusive id ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRanges {
    source: String,
    items: Vec<RangeItem>,
}

impl ChapterRanges {
    /// Check whether a chapter id falls inside any item.
    ///
    /// Chapters without an id never match.
    pub fn contains(&self, chapter_id: Option<&str>) -> bool {
        let Some(id) = chapter_id else {
            return false;
        };
        let key = ChapterKey::new(id);
        self.items.iter().any(|item| item.contains(&key))
    }
}

impl FromStr for ChapterRanges {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(RangeError::EmptyItem(s.to_string()));
            }
            match part.split_once("..") {
                Some((start, end)) => {
                    let (start, end) = (start.trim(), end.trim());
                    if start.is_empty() || end.is_empty() {
                        return Err(RangeError::EmptyItem(part.to_string()));
                    }
                    let (start, end) = (ChapterKey::new(start), ChapterKey::new(end));
                    if start > end {
                        return Err(RangeError::Reversed(part.to_string()));
                    }
                    items.push(RangeItem::Span(start, end));
                }
                None => items.push(RangeItem::Single(ChapterKey::new(part))),
            }
        }
        Ok(Self {
            source: s.to_string(),
            items,
        })
    }
}

impl fmt::Display for ChapterRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
