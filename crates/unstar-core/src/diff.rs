//! Unified diff generation utilities.
//!
//! Preview mode prints what a rewrite would do instead of writing it. The
//! output is standard unified diff (`---`/`+++`/`@@`), with both headers
//! naming the same path since files are rewritten in place.

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// Generate a unified diff between two versions of one file.
///
/// Returns an empty string when the contents are identical.
pub fn unified_diff(path: &str, original: &str, modified: &str) -> String {
    if original == modified {
        return String::new();
    }
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(path, path)
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_empty_diff() {
        let text = "import os\nprint(os.sep)\n";
        assert!(unified_diff("a.py", text, text).is_empty());
    }

    #[test]
    fn single_line_change() {
        let original = "from pkg.b import *\n\nWidget()\n";
        let modified = "from pkg.b import Gadget, Widget\n\nWidget()\n";

        let diff = unified_diff("pkg/a.py", original, modified);

        assert!(diff.starts_with("--- pkg/a.py\n+++ pkg/a.py\n"));
        assert!(diff.contains("@@ -1,3 +1,3 @@"));
        assert!(diff.contains("-from pkg.b import *\n"));
        assert!(diff.contains("+from pkg.b import Gadget, Widget\n"));
    }

    #[test]
    fn collapsed_multiline_change_is_one_hunk() {
        let original = "from m import \\\n    *\nx = 1\n";
        let modified = "from m import a, b\nx = 1\n";

        let diff = unified_diff("m.py", original, modified);

        assert_eq!(diff.matches("@@ -").count(), 1);
        assert!(diff.contains("-    *\n"));
        assert!(diff.contains("+from m import a, b\n"));
    }

    #[test]
    fn distant_changes_are_separate_hunks() {
        let mut original = String::from("from a import *\n");
        for i in 0..20 {
            original.push_str(&format!("x{} = {}\n", i, i));
        }
        original.push_str("from b import *\n");
        let modified = original
            .replace("from a import *", "from a import A")
            .replace("from b import *", "from b import B");

        let diff = unified_diff("f.py", &original, &modified);

        assert_eq!(diff.matches("@@ -").count(), 2);
    }
}
