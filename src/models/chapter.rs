//! Chapter identity parsing and on-disk directory derivation.
//!
//! Chapter links on comic hosts carry their metadata only in the link text,
//! e.g. `"Claymore, Vol.1 Chapter 1: Silver Eyes Witch"`. The text is matched
//! against an ordered list of shapes, first match wins. Patterns are anchored
//! at the start only, so text after a line break is ignored.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Placeholder used for a missing volume or chapter id.
pub const UNKNOWN_ID: &str = "Unknown";

/// Which fields a link-text pattern captures, in capture-group order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleShape {
    VolumeChapterTitled,
    VolumeChapter,
    ChapterTitled,
    Chapter,
}

impl TitleShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleShape::VolumeChapterTitled => "volume_chapter_titled",
            TitleShape::VolumeChapter => "volume_chapter",
            TitleShape::ChapterTitled => "chapter_titled",
            TitleShape::Chapter => "chapter",
        }
    }

    fn extract(self, caps: &Captures<'_>) -> ChapterIdentity {
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        match self {
            TitleShape::VolumeChapterTitled => ChapterIdentity {
                series_title: group(1),
                volume_id: group(2),
                chapter_id: group(3),
                chapter_title: group(4),
            },
            TitleShape::VolumeChapter => ChapterIdentity {
                series_title: group(1),
                volume_id: group(2),
                chapter_id: group(3),
                chapter_title: None,
            },
            TitleShape::ChapterTitled => ChapterIdentity {
                series_title: group(1),
                volume_id: None,
                chapter_id: group(2),
                chapter_title: group(3),
            },
            TitleShape::Chapter => ChapterIdentity {
                series_title: group(1),
                volume_id: None,
                chapter_id: group(2),
                chapter_title: None,
            },
        }
    }
}

/// Link-text patterns, strictest first.
static TITLE_PATTERNS: LazyLock<Vec<(Regex, TitleShape)>> = LazyLock::new(|| {
    vec![
        // "Claymore, Vol.1 Chapter 1: Silver Eyes Witch"
        (
            Regex::new(r"^(.*?), Vol\.(.*?) Chapter (.*?): (.*)").unwrap(),
            TitleShape::VolumeChapterTitled,
        ),
        // "Claymore, Vol.1 Chapter 1"
        (
            Regex::new(r"^(.*?), Vol\.(.*?) Chapter (.*)").unwrap(),
            TitleShape::VolumeChapter,
        ),
        // "Claymore, Chapter 5: Title"
        (
            Regex::new(r"^(.*?), Chapter (.*?): (.*)").unwrap(),
            TitleShape::ChapterTitled,
        ),
        // "Claymore, Chapter 5"
        (
            Regex::new(r"^(.*?), Chapter (.*)").unwrap(),
            TitleShape::Chapter,
        ),
    ]
});

/// Structured identity extracted from a chapter link's text.
///
/// Every field is optional; a text that matches no known shape yields an
/// identity with all fields empty rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterIdentity {
    pub series_title: Option<String>,
    pub volume_id: Option<String>,
    pub chapter_id: Option<String>,
    pub chapter_title: Option<String>,
}

impl ChapterIdentity {
    /// Parse link text into a chapter identity.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        Self::match_shape(text)
            .map(|(shape, caps)| shape.extract(&caps))
            .unwrap_or_default()
    }

    /// Find the first pattern matching `text` along with its captures.
    pub fn match_shape(text: &str) -> Option<(TitleShape, Captures<'_>)> {
        TITLE_PATTERNS
            .iter()
            .find_map(|(re, shape)| re.captures(text).map(|caps| (*shape, caps)))
    }

    /// True if nothing could be extracted.
    pub fn is_empty(&self) -> bool {
        self.series_title.is_none()
            && self.volume_id.is_none()
            && self.chapter_id.is_none()
            && self.chapter_title.is_none()
    }

    /// Case-insensitive, whole-string comparison against a series title.
    pub fn belongs_to(&self, title: &str) -> bool {
        self.series_title
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            == title.to_lowercase()
    }

    /// Relative directory for this chapter: `<volume>/<chapter>[: <title>]`.
    ///
    /// Also serves as the "already downloaded" key.
    pub fn directory(&self) -> String {
        let mut directory = format!(
            "{}/{}",
            pad_id(self.volume_id.as_deref()),
            pad_id(self.chapter_id.as_deref())
        );
        if let Some(title) = self.chapter_title.as_deref().filter(|t| !t.is_empty()) {
            directory.push_str(": ");
            directory.push_str(title);
        }
        directory
    }
}

impl std::fmt::Display for ChapterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vol={} ch={}",
            self.series_title.as_deref().unwrap_or("?"),
            self.volume_id.as_deref().unwrap_or("-"),
            self.chapter_id.as_deref().unwrap_or("-"),
        )?;
        if let Some(title) = &self.chapter_title {
            write!(f, " \"{}\"", title)?;
        }
        Ok(())
    }
}

/// Zero-pad a volume or chapter id so directories sort numerically.
///
/// `1` -> `0001`, `1.5` -> `0001.05`, missing -> `Unknown`.
pub fn pad_id(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNKNOWN_ID.to_string();
    };

    let parts: Vec<&str> = raw.split('.').collect();
    let mut padded = zero_fill(parts[0], 4);
    if let [_, fraction] = parts.as_slice() {
        padded.push('.');
        padded.push_str(&zero_fill(fraction, 2));
    }
    padded
}

/// Left-pad with zeros to `width` characters, keeping a leading sign in front.
fn zero_fill(value: &str, width: usize) -> String {
    let (sign, digits) = match value.strip_prefix(['-', '+']) {
        Some(rest) => value.split_at(value.len() - rest.len()),
        None => ("", value),
    };
    let width = width.saturating_sub(sign.len());
    format!("{}{:0>width$}", sign, digits, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(
        series: Option<&str>,
        volume: Option<&str>,
        chapter: Option<&str>,
        title: Option<&str>,
    ) -> ChapterIdentity {
        ChapterIdentity {
            series_title: series.map(String::from),
            volume_id: volume.map(String::from),
            chapter_id: chapter.map(String::from),
            chapter_title: title.map(String::from),
        }
    }

    #[test]
    fn test_parse_volume_chapter_with_title() {
        let parsed = ChapterIdentity::parse("Claymore, Vol.1 Chapter 1: Silver Eyes Witch");
        assert_eq!(
            parsed,
            identity(Some("Claymore"), Some("1"), Some("1"), Some("Silver Eyes Witch"))
        );
    }

    #[test]
    fn test_parse_volume_chapter() {
        let parsed = ChapterIdentity::parse("Claymore, Vol.3 Chapter 14");
        assert_eq!(parsed, identity(Some("Claymore"), Some("3"), Some("14"), None));
    }

    #[test]
    fn test_parse_chapter_only() {
        let parsed = ChapterIdentity::parse("Claymore, Chapter 5");
        assert_eq!(parsed, identity(Some("Claymore"), None, Some("5"), None));
    }

    #[test]
    fn test_parse_chapter_with_title() {
        let parsed = ChapterIdentity::parse("Komi-san, Chapter 12: Cat Ears");
        assert_eq!(
            parsed,
            identity(Some("Komi-san"), None, Some("12"), Some("Cat Ears"))
        );
    }

    #[test]
    fn test_parse_no_match() {
        let parsed = ChapterIdentity::parse("unrelated text");
        assert!(parsed.is_empty());
        assert_eq!(parsed, ChapterIdentity::default());
    }

    #[test]
    fn test_parse_keeps_fractional_and_lettered_ids() {
        let parsed = ChapterIdentity::parse("Claymore, Chapter 10.5");
        assert_eq!(parsed.chapter_id.as_deref(), Some("10.5"));

        let parsed = ChapterIdentity::parse("Claymore, Vol.2 Chapter 10b: Extra");
        assert_eq!(parsed.volume_id.as_deref(), Some("2"));
        assert_eq!(parsed.chapter_id.as_deref(), Some("10b"));
        assert_eq!(parsed.chapter_title.as_deref(), Some("Extra"));
    }

    #[test]
    fn test_parse_title_with_comma_is_non_greedy() {
        let parsed = ChapterIdentity::parse("Gokushufudou, Chapter 3: Cooking, Part 2");
        assert_eq!(parsed.series_title.as_deref(), Some("Gokushufudou"));
        assert_eq!(parsed.chapter_id.as_deref(), Some("3"));
        assert_eq!(parsed.chapter_title.as_deref(), Some("Cooking, Part 2"));
    }

    #[test]
    fn test_parse_chapter_title_keeps_extra_colons() {
        let parsed = ChapterIdentity::parse("Claymore, Chapter 7: Part 1: Dawn");
        assert_eq!(parsed.chapter_id.as_deref(), Some("7"));
        assert_eq!(parsed.chapter_title.as_deref(), Some("Part 1: Dawn"));
    }

    #[test]
    fn test_parse_tokens_are_case_sensitive() {
        assert!(ChapterIdentity::parse("Claymore, chapter 5").is_empty());

        assert!(ChapterIdentity::parse("Claymore, vol.1 Chapter 2").is_empty());

        // Without the "Vol." token the volume stays part of the series title
        let parsed = ChapterIdentity::parse("Claymore, Vol 1, Chapter 2");
        assert_eq!(parsed.series_title.as_deref(), Some("Claymore, Vol 1"));
        assert_eq!(parsed.volume_id, None);
        assert_eq!(parsed.chapter_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let parsed = ChapterIdentity::parse("\n   Claymore, Chapter 5  \n");
        assert_eq!(parsed, identity(Some("Claymore"), None, Some("5"), None));
    }

    #[test]
    fn test_parse_stops_at_line_break() {
        let parsed = ChapterIdentity::parse("Claymore, Chapter 5\n  NEW");
        assert_eq!(parsed, identity(Some("Claymore"), None, Some("5"), None));

        let parsed = ChapterIdentity::parse("Claymore, Vol.1 Chapter 2: Part\nTwo");
        assert_eq!(
            parsed,
            identity(Some("Claymore"), Some("1"), Some("2"), Some("Part"))
        );
    }

    #[test]
    fn test_match_shape_reports_tier() {
        let cases = [
            ("A, Vol.1 Chapter 2: T", TitleShape::VolumeChapterTitled),
            ("A, Vol.1 Chapter 2", TitleShape::VolumeChapter),
            ("A, Chapter 2: T", TitleShape::ChapterTitled),
            ("A, Chapter 2", TitleShape::Chapter),
        ];
        for (text, expected) in cases {
            let (shape, _) = ChapterIdentity::match_shape(text).unwrap();
            assert_eq!(shape, expected, "{}", text);
        }
        assert!(ChapterIdentity::match_shape("A Chapter 2").is_none());
    }

    #[test]
    fn test_title_never_without_chapter_id() {
        for text in [
            "A, Vol.1 Chapter 2: T",
            "A, Chapter : T",
            "A, Vol. Chapter : ",
            "nothing here: at all",
        ] {
            let parsed = ChapterIdentity::parse(text);
            if parsed.chapter_title.is_some() {
                assert!(parsed.chapter_id.is_some(), "{}", text);
            }
        }
    }

    #[test]
    fn test_belongs_to_is_case_insensitive_and_exact() {
        let parsed = ChapterIdentity::parse("CLAYMORE, Chapter 1");
        assert!(parsed.belongs_to("Claymore"));
        assert!(parsed.belongs_to("claymore"));
        assert!(!parsed.belongs_to("Claymore Side Story"));
        assert!(!parsed.belongs_to("Clay"));

        let side = ChapterIdentity::parse("Claymore Side Story, Chapter 1");
        assert!(!side.belongs_to("Claymore"));

        assert!(!ChapterIdentity::default().belongs_to("Claymore"));
    }

    #[test]
    fn test_pad_id() {
        assert_eq!(pad_id(Some("1")), "0001");
        assert_eq!(pad_id(Some("1.5")), "0001.05");
        assert_eq!(pad_id(Some("12.3")), "0012.03");
        assert_eq!(pad_id(Some("12345")), "12345");
        assert_eq!(pad_id(Some("10b")), "010b");
        assert_eq!(pad_id(None), "Unknown");
    }

    #[test]
    fn test_pad_id_keeps_sign_in_front() {
        assert_eq!(pad_id(Some("-1")), "-001");
        assert_eq!(pad_id(Some("+12")), "+012");
        assert_eq!(pad_id(Some("-1.5")), "-001.05");
    }

    #[test]
    fn test_pad_id_ignores_extra_dot_segments() {
        assert_eq!(pad_id(Some("1.2.3")), "0001");
    }

    #[test]
    fn test_directory_unknown_volume() {
        let chapter = identity(None, None, Some("3"), None);
        assert_eq!(chapter.directory(), "Unknown/0003");
    }

    #[test]
    fn test_directory_with_title() {
        let chapter = ChapterIdentity::parse("Claymore, Vol.1 Chapter 1: Silver Eyes Witch");
        assert_eq!(chapter.directory(), "0001/0001: Silver Eyes Witch");
    }

    #[test]
    fn test_directory_empty_title_is_omitted() {
        let chapter = identity(Some("A"), Some("2"), Some("7.5"), Some(""));
        assert_eq!(chapter.directory(), "0002/0007.05");
    }

    #[test]
    fn test_directories_sort_in_chapter_order() {
        let mut dirs: Vec<String> = ["10", "2", "1.5", "1", "100"]
            .iter()
            .map(|c| identity(None, Some("1"), Some(c), None).directory())
            .collect();
        dirs.sort();
        assert_eq!(
            dirs,
            vec![
                "0001/0001",
                "0001/0001.05",
                "0001/0002",
                "0001/0010",
                "0001/0100"
            ]
        );
    }
}
