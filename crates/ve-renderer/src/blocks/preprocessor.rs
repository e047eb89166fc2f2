//! Extracts custom block directives from markdown source.
//!
//! Each directive is replaced by an HTML comment placeholder on its own
//! paragraph so the markdown compiler passes it through untouched. The
//! compiler later swaps every placeholder for the generated element.

use std::sync::LazyLock;

use regex::Regex;

use super::args::BlockArgs;
use super::fence::FenceTracker;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?::::[ \t]*|\.)(ve-[a-z0-9-]+)(?:[ \t]+(.*?))?[ \t]*$").unwrap());

/// One directive found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Directive {
    /// Element type, e.g. `ve-image`.
    pub name: String,
    pub args: BlockArgs,
    /// Dedented body markdown.
    pub body: String,
}

/// Placeholder markup for the directive at `index`.
pub(crate) fn placeholder(index: usize) -> String {
    format!("<!--ve-block:{index}-->")
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

fn dedent(line: &str) -> &str {
    line.strip_prefix("    ")
        .or_else(|| line.strip_prefix('\t'))
        .unwrap_or_else(|| line.trim_start())
}

/// Replace directives with placeholders, returning the rewritten markdown and
/// the directives in placeholder order.
pub(crate) fn extract(markdown: &str) -> (String, Vec<Directive>) {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut output = String::with_capacity(markdown.len());
    let mut directives = Vec::new();
    let mut fence = FenceTracker::default();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        let header = if fence.in_fence() { None } else { HEADER.captures(line) };
        let Some(caps) = header else {
            fence.update(line);
            output.push_str(line);
            output.push('\n');
            continue;
        };

        let name = caps[1].to_owned();
        let args = BlockArgs::parse(caps.get(2).map_or("", |m| m.as_str()));

        let start = i;
        let mut end = i;
        let mut j = i;
        while j < lines.len() {
            let candidate = lines[j];
            if candidate.trim().is_empty() {
                j += 1;
            } else if is_indented(candidate) {
                j += 1;
                end = j;
            } else {
                break;
            }
        }
        let body = lines[start..end]
            .iter()
            .map(|l| dedent(l))
            .collect::<Vec<_>>()
            .join("\n");
        i = end;
        if lines.get(i).is_some_and(|l| l.trim() == ":::") {
            i += 1;
        }

        tracing::debug!(block = %name, line = start, "Found custom block");
        output.push('\n');
        output.push_str(&placeholder(directives.len()));
        output.push_str("\n\n");
        directives.push(Directive { name, args, body });
    }

    (output, directives)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_short_form_without_body() {
        let (output, directives) = extract("Intro\n\n.ve-image foo.jpg sticky\n\nAfter\n");

        assert_eq!(output, "Intro\n\n\n<!--ve-block:0-->\n\n\nAfter\n");
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "ve-image");
        assert_eq!(directives[0].args.positional, vec!["foo.jpg", "sticky"]);
        assert_eq!(directives[0].body, "");
    }

    #[test]
    fn test_long_form_with_indented_body() {
        let markdown = "::: ve-map Q90 zoom=6\n    - Q90\n\n    - Q64\nNext paragraph\n";
        let (output, directives) = extract(markdown);

        assert_eq!(output, "\n<!--ve-block:0-->\n\nNext paragraph\n");
        assert_eq!(directives[0].name, "ve-map");
        assert_eq!(directives[0].args.keyword("zoom"), Some("6"));
        assert_eq!(directives[0].body, "- Q90\n\n- Q64");
    }

    #[test]
    fn test_closing_marker_consumed() {
        let (output, directives) = extract("::: ve-footer\n\tFooter text\n:::\nafter\n");

        assert_eq!(directives[0].body, "Footer text");
        assert_eq!(output, "\n<!--ve-block:0-->\n\nafter\n");
    }

    #[test]
    fn test_trailing_blank_lines_not_in_body() {
        let (_, directives) = extract(".ve-meta \"My essay\"\n    body\n\n\ntext\n");

        assert_eq!(directives[0].body, "body");
        assert_eq!(directives[0].args.positional, vec!["My essay"]);
    }

    #[test]
    fn test_directive_in_code_fence_left_alone() {
        let markdown = "```\n.ve-image foo.jpg\n```\n.ve-video v.mp4\n";
        let (output, directives) = extract(markdown);

        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "ve-video");
        assert!(output.starts_with("```\n.ve-image foo.jpg\n```\n"));
    }

    #[test]
    fn test_non_ve_names_ignored() {
        let (output, directives) = extract("::: note\n.vegetable\n");

        assert!(directives.is_empty());
        assert_eq!(output, "::: note\n.vegetable\n");
    }
}
