//! Line diff between expected and actual renderings.
//!
//! Produces the unified-style block appended to comparison failure
//! messages:
//!
//! ```text
//! --- Expected
//! +++ Actual
//! @@ @@
//!  unchanged line
//! -expected line
//! +actual line
//! ```
//!
//! Alignment uses the Myers algorithm from `similar`, so memory stays linear
//! in the input size even for large renderings.

use similar::{DiffTag, TextDiff};

/// One aligned line of the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Common(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Align `expected` against `actual` line by line.
///
/// Inside each changed hunk every removed line precedes every added line.
pub fn diff_lines<'a>(expected: &'a str, actual: &'a str) -> Vec<DiffLine<'a>> {
    let lines_a: Vec<&str> = expected.lines().collect();
    let lines_b: Vec<&str> = actual.lines().collect();
    let diff = TextDiff::from_slices(&lines_a, &lines_b);

    let mut out = Vec::with_capacity(lines_a.len().max(lines_b.len()));
    let mut added = Vec::new();

    for op in diff.ops() {
        let (tag, old, new) = op.as_tag_tuple();
        let removed = lines_a[old].iter().copied();
        let inserted = lines_b[new].iter().copied();
        match tag {
            DiffTag::Equal => {
                out.append(&mut added);
                out.extend(removed.map(DiffLine::Common));
            }
            DiffTag::Delete => out.extend(removed.map(DiffLine::Removed)),
            DiffTag::Insert => added.extend(inserted.map(DiffLine::Added)),
            DiffTag::Replace => {
                out.extend(removed.map(DiffLine::Removed));
                added.extend(inserted.map(DiffLine::Added));
            }
        }
    }
    out.append(&mut added);

    out
}

/// Render the diff block, starting with a newline so it can be appended
/// directly to a failure message.
pub fn render_diff(expected: &str, actual: &str) -> String {
    let mut buffer = String::from("\n--- Expected\n+++ Actual\n@@ @@\n");
    for line in diff_lines(expected, actual) {
        match line {
            DiffLine::Common(l) => {
                buffer.push(' ');
                buffer.push_str(l);
            }
            DiffLine::Removed(l) => {
                buffer.push('-');
                buffer.push_str(l);
            }
            DiffLine::Added(l) => {
                buffer.push('+');
                buffer.push_str(l);
            }
        }
        buffer.push('\n');
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_replacement() {
        assert_eq!(
            render_diff("expectedAsString", "actualAsString"),
            "\n--- Expected\n+++ Actual\n@@ @@\n-expectedAsString\n+actualAsString\n"
        );
    }

    #[test]
    fn test_multi_line_keeps_context() {
        let expected = "{\n    first: 1,\n    second: 2,\n}";
        let actual = "{\n    first: 0,\n    second: 2,\n}";
        assert_eq!(
            diff_lines(expected, actual),
            vec![
                DiffLine::Common("{"),
                DiffLine::Removed("    first: 1,"),
                DiffLine::Added("    first: 0,"),
                DiffLine::Common("    second: 2,"),
                DiffLine::Common("}"),
            ]
        );
    }

    #[test]
    fn test_hunk_orders_removals_first() {
        let lines = diff_lines("a\nb\nc", "x\ny\nc");
        assert_eq!(
            lines,
            vec![
                DiffLine::Removed("a"),
                DiffLine::Removed("b"),
                DiffLine::Added("x"),
                DiffLine::Added("y"),
                DiffLine::Common("c"),
            ]
        );
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(diff_lines("", "added"), vec![DiffLine::Added("added")]);
        assert_eq!(diff_lines("gone", ""), vec![DiffLine::Removed("gone")]);
        assert!(diff_lines("", "").is_empty());
    }

    #[test]
    fn test_large_renderings_diff_only_changed_lines() {
        let expected: String = (0..20_000).map(|i| format!("    item_{i},\n")).collect();
        let actual = expected.replace("    item_10000,\n", "    item_ten_thousand,\n");

        let lines = diff_lines(&expected, &actual);
        assert_eq!(lines.len(), 20_001);
        let changed: Vec<_> = lines
            .iter()
            .filter(|l| !matches!(l, DiffLine::Common(_)))
            .collect();
        assert_eq!(
            changed,
            vec![
                &DiffLine::Removed("    item_10000,"),
                &DiffLine::Added("    item_ten_thousand,"),
            ]
        );
    }

    #[test]
    fn test_identical_inputs_are_all_common() {
        let lines = diff_lines("same\nlines", "same\nlines");
        assert!(lines.iter().all(|l| matches!(l, DiffLine::Common(_))));
        assert_eq!(lines.len(), 2);
    }
}
