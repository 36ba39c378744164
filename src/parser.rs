use crate::models::{Clipping, ClippingKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Line separating entries in "My Clippings.txt".
pub const CLIPPINGS_SEPARATOR: &str = "==========";

// Title line with a trailing author parenthetical, e.g.
// "Genome: The Autobiography of a Species in 23 Chapters (Matt Ridley)".
// Lazy match on the author so nested parentheses stay in the title.
static TITLE_AUTHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<title>.+) \((?P<author>.+?)\)$").unwrap());

// Metadata fields: the value runs from the token up to the next "|" delimiter.
static LOCATION_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)location[ :]+(?P<value>[^|]+)").unwrap());
static PAGE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)page[ :]+(?P<value>[^|]+)").unwrap());

/// How a multi-line annotation body is joined into one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyJoin {
    #[default]
    Newline,
    Space,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub body_join: BodyJoin,
}

/// Why a block was dropped. Skips are diagnostics, not errors: the parse
/// always continues over the remaining blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooFewLines,
    MissingTitle,
    UnrecognizedMetadata,
    EmptyBody,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::TooFewLines => write!(f, "fewer than 2 lines"),
            SkipReason::MissingTitle => write!(f, "title line is empty"),
            SkipReason::UnrecognizedMetadata => {
                write!(f, "metadata line has no recognizable clipping type")
            }
            SkipReason::EmptyBody => write!(f, "empty body on a non-bookmark entry"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    /// Position of the block in the file, counted over non-empty blocks.
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct ParseReport {
    pub clippings: Vec<Clipping>,
    pub skipped: Vec<SkippedBlock>,
}

/// Parse the full text of a clippings file into an ordered list of
/// [`Clipping`]s.
///
/// Output order is input order: no sorting, no grouping, no deduplication.
/// Malformed blocks are recorded in the report's `skipped` list and the
/// parse continues; nothing here is fatal.
pub fn parse_clippings(raw: &str, opts: &ParseOptions) -> ParseReport {
    let mut report = ParseReport::default();

    let mut index = 0;
    for block in raw.split(CLIPPINGS_SEPARATOR) {
        let lines: Vec<String> = block
            .lines()
            .map(clean_line)
            .skip_while(|l| l.is_empty())
            .collect();

        // Trailing separator and stray blank entries produce empty blocks.
        if lines.iter().all(|l| l.is_empty()) {
            continue;
        }

        match parse_block(&lines, opts) {
            Ok(clipping) => report.clippings.push(clipping),
            Err(reason) => report.skipped.push(SkippedBlock { index, reason }),
        }
        index += 1;
    }

    report
}

fn parse_block(lines: &[String], opts: &ParseOptions) -> Result<Clipping, SkipReason> {
    if lines.len() < 2 {
        return Err(SkipReason::TooFewLines);
    }

    let (title, author) = split_title_author(lines[0].trim());
    if title.is_empty() {
        return Err(SkipReason::MissingTitle);
    }

    let metadata = lines[1].trim();
    let kind = detect_kind(metadata).ok_or(SkipReason::UnrecognizedMetadata)?;
    let location = extract_field(&LOCATION_FIELD, metadata);
    let page = extract_field(&PAGE_FIELD, metadata);

    let text = join_body(&lines[2..], opts.body_join);
    if text.is_empty() && kind != ClippingKind::Bookmark {
        return Err(SkipReason::EmptyBody);
    }

    Ok(Clipping {
        title,
        author,
        kind,
        location,
        page,
        text,
    })
}

// The source format prepends a BOM to the first title in the file; strip it
// (and any other control characters) from every line rather than
// special-casing the first entry. `lines()` already removed `\n`, and `\r`
// is a control character.
fn clean_line(line: &str) -> String {
    line.chars()
        .filter(|c| *c != '\u{feff}' && !c.is_control())
        .collect()
}

fn split_title_author(line: &str) -> (String, String) {
    match TITLE_AUTHOR.captures(line) {
        Some(caps) => (caps["title"].to_string(), caps["author"].to_string()),
        None => (line.to_string(), String::new()),
    }
}

// "highlight" can co-occur with qualifying words, so the note and bookmark
// checks run before the highlight fallback.
fn detect_kind(metadata: &str) -> Option<ClippingKind> {
    let lower = metadata.to_lowercase();
    if lower.contains("note") {
        Some(ClippingKind::Note)
    } else if lower.contains("bookmark") {
        Some(ClippingKind::Bookmark)
    } else if lower.contains("highlight") {
        Some(ClippingKind::Highlight)
    } else {
        None
    }
}

fn extract_field(pattern: &Regex, metadata: &str) -> String {
    pattern
        .captures(metadata)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn join_body(lines: &[String], join: BodyJoin) -> String {
    match join {
        BodyJoin::Newline => lines.join("\n").trim().to_string(),
        BodyJoin::Space => lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}Genome: The Autobiography of a Species in 23 Chapters (Matt Ridley)\r\n- Your Highlight on Location 901-902 | Added on Friday, May 13, 2016 11:23:26 PM\r\n\r\nWe, the human species, carry our past with us.\r\n==========\r\nThe Scientist as Rebel (Freeman Dyson)\r\n- Your Note on Page 12 | Location 150 | Added on Sunday, May 15, 2016 9:00:00 AM\r\n\r\nCheck this argument later.\r\n==========\r\n";

    const BOOKMARK_ENTRY: &str = "Some Book\n- Your Bookmark on Location 300 | Added on Monday, May 16, 2016 8:00:00 AM\n\n==========\n";

    #[test]
    fn test_parse_sample() {
        let report = parse_clippings(SAMPLE, &ParseOptions::default());

        assert!(report.skipped.is_empty());
        assert_eq!(report.clippings.len(), 2);

        let first = &report.clippings[0];
        assert_eq!(
            first.title,
            "Genome: The Autobiography of a Species in 23 Chapters"
        );
        assert_eq!(first.author, "Matt Ridley");
        assert_eq!(first.kind, ClippingKind::Highlight);
        assert_eq!(first.location, "901-902");
        assert_eq!(first.page, "");
        assert_eq!(first.text, "We, the human species, carry our past with us.");

        let second = &report.clippings[1];
        assert_eq!(second.kind, ClippingKind::Note);
        assert_eq!(second.location, "150");
        assert_eq!(second.page, "12");
    }

    #[test]
    fn test_bom_stripped_from_first_title() {
        let report = parse_clippings(SAMPLE, &ParseOptions::default());

        assert!(report.clippings[0].title.starts_with("Genome"));
    }

    #[test]
    fn test_title_without_author() {
        let report = parse_clippings(
            "Just a Title\n- Your Highlight on Location 1 | Added on whenever\n\nbody\n==========\n",
            &ParseOptions::default(),
        );

        assert_eq!(report.clippings[0].title, "Just a Title");
        assert_eq!(report.clippings[0].author, "");
    }

    #[test]
    fn test_bookmark_with_empty_body_is_accepted() {
        let report = parse_clippings(BOOKMARK_ENTRY, &ParseOptions::default());

        assert!(report.skipped.is_empty());
        assert_eq!(report.clippings.len(), 1);
        assert_eq!(report.clippings[0].kind, ClippingKind::Bookmark);
        assert_eq!(report.clippings[0].text, "");
    }

    #[test]
    fn test_empty_body_on_highlight_is_skipped() {
        let report = parse_clippings(
            "Some Book\n- Your Highlight on Location 1 | Added on whenever\n\n==========\n",
            &ParseOptions::default(),
        );

        assert!(report.clippings.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::EmptyBody);
    }

    #[test]
    fn test_empty_blocks_are_silently_dropped() {
        let report = parse_clippings("==========\n\n==========\n", &ParseOptions::default());

        assert!(report.clippings.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_missing_page_yields_empty_string() {
        let report = parse_clippings(
            "Book\n- Your Highlight on Location 5-6 | Added on whenever\n\ntext\n==========\n",
            &ParseOptions::default(),
        );

        assert_eq!(report.clippings[0].page, "");
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_colon_delimited_metadata_fields() {
        let report = parse_clippings(
            "Book\n- Your Highlight | Location: 150 | Page: 9 | Added on whenever\n\ntext\n==========\n",
            &ParseOptions::default(),
        );

        assert!(report.skipped.is_empty());
        assert_eq!(report.clippings[0].location, "150");
        assert_eq!(report.clippings[0].page, "9");
    }

    #[test]
    fn test_blank_title_line_is_skipped() {
        // A title line of only spaces survives line splitting but trims to
        // nothing, which violates the non-empty-title invariant.
        let report = parse_clippings(
            "   \n- Your Highlight on Location 1 | Added on whenever\n\nbody\n==========\n",
            &ParseOptions::default(),
        );

        assert!(report.clippings.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingTitle);
    }

    #[test]
    fn test_unrecognized_metadata_is_skipped_and_parse_continues() {
        let input = "Book One\nnot a metadata line at all\n\ntext\n==========\nBook Two\n- Your Highlight on Location 7 | Added on whenever\n\nsurvives\n==========\n";

        let report = parse_clippings(input, &ParseOptions::default());

        assert_eq!(report.clippings.len(), 1);
        assert_eq!(report.clippings[0].title, "Book Two");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::UnrecognizedMetadata);
        assert_eq!(report.skipped[0].index, 0);
    }

    #[test]
    fn test_too_few_lines_is_skipped() {
        let report = parse_clippings("Only a title\n==========\n", &ParseOptions::default());

        assert!(report.clippings.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::TooFewLines);
    }

    #[test]
    fn test_note_detected_before_highlight() {
        // "note" co-occurring with "highlighted" must still classify as a note
        let report = parse_clippings(
            "Book\n- Your Note on a highlighted passage | Location 9 | Added on whenever\n\nremember this\n==========\n",
            &ParseOptions::default(),
        );

        assert_eq!(report.clippings[0].kind, ClippingKind::Note);
    }

    #[test]
    fn test_multiline_body_newline_join() {
        let report = parse_clippings(
            "Book\n- Your Highlight on Location 1 | Added on whenever\n\nfirst line\nsecond line\n==========\n",
            &ParseOptions::default(),
        );

        assert_eq!(report.clippings[0].text, "first line\nsecond line");
    }

    #[test]
    fn test_multiline_body_space_join() {
        let opts = ParseOptions {
            body_join: BodyJoin::Space,
        };
        let report = parse_clippings(
            "Book\n- Your Highlight on Location 1 | Added on whenever\n\nfirst line\n\nsecond line\n==========\n",
            &opts,
        );

        assert_eq!(report.clippings[0].text, "first line second line");
    }

    #[test]
    fn test_order_is_preserved_without_grouping() {
        let input = "A Book\n- Your Highlight on Location 1 | Added on x\n\none\n==========\nOther Book\n- Your Highlight on Location 2 | Added on x\n\ntwo\n==========\nA Book\n- Your Highlight on Location 3 | Added on x\n\nthree\n==========\n";

        let report = parse_clippings(input, &ParseOptions::default());

        let titles: Vec<&str> = report.clippings.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A Book", "Other Book", "A Book"]);
    }
}
