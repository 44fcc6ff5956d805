/// Case-insensitive line search over a guideline document.
///
/// Each matching line is reported with up to [`CONTEXT_LINES`] lines on either side,
/// clipped at the document boundaries. Overlapping windows are reported independently.
use crate::model::MatchWindow;

pub const CONTEXT_LINES: usize = 2;

/// Find every line containing `query` (case-insensitive), in document order.
///
/// An empty query is a substring of every line and therefore matches all of them.
pub fn search(text: &str, query: &str) -> Vec<MatchWindow> {
    let needle = query.to_lowercase();
    let lines: Vec<&str> = text.lines().collect();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .map(|(i, _)| {
            let start = i.saturating_sub(CONTEXT_LINES);
            let end = (i + CONTEXT_LINES + 1).min(lines.len());
            MatchWindow {
                line_number: i + 1,
                context: lines[start..end].join("\n"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "alpha\nbeta\nGAMMA\ndelta\n";

    #[test]
    fn finds_case_insensitive_match_with_clipped_context() {
        let matches = search(DOC, "gamma");
        assert_eq!(
            matches,
            vec![MatchWindow {
                line_number: 3,
                context: "alpha\nbeta\nGAMMA\ndelta".to_string(),
            }]
        );
    }

    #[test]
    fn no_match_is_empty() {
        assert!(search(DOC, "zzz").is_empty());
    }

    #[test]
    fn first_and_last_lines_clip_at_boundaries() {
        let first = search(DOC, "ALPHA");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].line_number, 1);
        assert_eq!(first[0].context, "alpha\nbeta\nGAMMA");

        let last = search(DOC, "delta");
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].line_number, 4);
        assert_eq!(last[0].context, "beta\nGAMMA\ndelta");
    }

    #[test]
    fn full_window_in_the_middle() {
        let doc = "one\ntwo\nthree\nfour\nfive\nsix\nseven";
        let matches = search(doc, "four");
        assert_eq!(matches[0].line_number, 4);
        assert_eq!(matches[0].context, "two\nthree\nfour\nfive\nsix");
    }

    #[test]
    fn overlapping_windows_are_reported_separately() {
        let doc = "use tracing\nlog errors\nuse tracing again\nend";
        let matches = search(doc, "tracing");
        let lines: Vec<usize> = matches.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![1, 3]);
        assert_eq!(matches[0].context, "use tracing\nlog errors\nuse tracing again");
        assert_eq!(
            matches[1].context,
            "use tracing\nlog errors\nuse tracing again\nend"
        );
    }

    #[test]
    fn empty_query_matches_every_line() {
        let matches = search(DOC, "");
        let lines: Vec<usize> = matches.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_document_has_no_matches() {
        assert!(search("", "anything").is_empty());
        assert!(search("", "").is_empty());
    }
}
