//! Fenced tool blocks — the wire format between the model and the tools.
//!
//! A block opens with three backticks immediately followed by the tool tag,
//! and its body runs until the next three backticks:
//!
//! ````text
//! ```query_parquet_files
//! parquet_files=['logs.parquet']
//! query=SELECT COUNT(*) FROM logs
//! ```
//! ````

/// Block delimiter.
pub const FENCE: &str = "```";

/// One fenced block found in model output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FencedBlock {
    /// Text on the opening fence line (empty for untagged fences).
    pub tag: String,
    /// Everything between the tag line and the closing fence.
    pub body: String,
}

enum Segment<'a> {
    Text(&'a str),
    Block(FencedBlock),
}

/// Whether the text contains any fence marker at all.
pub fn has_fence(text: &str) -> bool {
    text.contains(FENCE)
}

/// All fenced blocks, in order of appearance.
///
/// An unterminated block extends to the end of the text.
pub fn extract_blocks(text: &str) -> Vec<FencedBlock> {
    scan(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Block(block) => Some(block),
            Segment::Text(_) => None,
        })
        .collect()
}

/// The text with every fenced block removed.
///
/// Runs of blank lines left behind are collapsed to one and the result is
/// trimmed.
pub fn remove_blocks(text: &str) -> String {
    let prose: String = scan(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(t) => Some(t),
            Segment::Block(_) => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut out: Vec<&str> = Vec::new();
    for line in prose.lines().map(str::trim_end) {
        if line.is_empty() && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}

fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        segments.push(Segment::Text(&rest[..open]));
        let after_open = &rest[open + FENCE.len()..];

        let (tag_line, body_region) = match after_open.find('\n') {
            Some(nl) => (&after_open[..nl], &after_open[nl + 1..]),
            None => (after_open, ""),
        };

        // Inline ```x``` on a single line: no body.
        if let Some(close) = tag_line.find(FENCE) {
            segments.push(Segment::Block(FencedBlock {
                tag: tag_line[..close].trim().to_string(),
                body: String::new(),
            }));
            rest = &after_open[close + FENCE.len()..];
            continue;
        }

        let (body, remainder) = match body_region.find(FENCE) {
            Some(close) => (&body_region[..close], &body_region[close + FENCE.len()..]),
            None => (body_region, ""),
        };
        segments.push(Segment::Block(FencedBlock {
            tag: tag_line.trim().to_string(),
            body: body.to_string(),
        }));
        rest = remainder;
    }

    segments.push(Segment::Text(rest));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_blocks() {
        assert!(!has_fence("The root cause is a memory leak."));
        assert!(extract_blocks("plain text").is_empty());
        assert_eq!(remove_blocks("  plain text \n"), "plain text");
    }

    #[test]
    fn test_single_block() {
        let text = "Let me look.\n```list_tables_in_directory\ndirectory=.\n```\n";
        let blocks = extract_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tag, "list_tables_in_directory");
        assert_eq!(blocks[0].body, "directory=.\n");
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let text = "First:\n```get_schema\nfile_path=a.parquet\n```\nthen\n```query_parquet_files\nquery=SELECT 1\n```";
        let tags: Vec<String> = extract_blocks(text).into_iter().map(|b| b.tag).collect();
        assert_eq!(tags, vec!["get_schema", "query_parquet_files"]);
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let blocks = extract_blocks("```get_schema\nfile_path=x.parquet");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "file_path=x.parquet");
    }

    #[test]
    fn test_untagged_fence() {
        let blocks = extract_blocks("```\nsome code\n```");
        assert_eq!(blocks[0].tag, "");
        assert_eq!(blocks[0].body, "some code\n");
    }

    #[test]
    fn test_inline_fence() {
        let blocks = extract_blocks("use ```inline``` here");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tag, "inline");
        assert!(blocks[0].body.is_empty());
        assert_eq!(remove_blocks("use ```inline``` here"), "use\n here");
    }

    #[test]
    fn test_remove_blocks_keeps_prose() {
        let text = "I will list the tables.\n\n```list_tables_in_directory\ndirectory=.\n```\n\n\nThen inspect.";
        assert_eq!(remove_blocks(text), "I will list the tables.\n\nThen inspect.");
    }

    #[test]
    fn test_remove_blocks_only_block() {
        assert_eq!(remove_blocks("```get_schema\nfile_path=a\n```"), "");
    }
}
