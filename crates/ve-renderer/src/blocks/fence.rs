//! Fenced code block detection for line-oriented scanning.

/// An open fence: marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

/// Tracks whether a line scanner is inside a fenced code block.
///
/// A fence opens with three or more backticks or tildes and closes with a
/// line of the same marker that is at least as long, followed only by
/// whitespace.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` when the line opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let Some(run) = marker_run(line.trim_start()) else {
            return false;
        };
        match self.open {
            None => {
                self.open = Some(run.fence);
                true
            }
            Some(open) if run.fence.marker == open.marker && run.fence.len >= open.len && run.bare => {
                self.open = None;
                true
            }
            Some(_) => false,
        }
    }
}

struct Run {
    fence: Fence,
    /// Nothing but whitespace follows the marker run.
    bare: bool,
}

fn marker_run(trimmed: &str) -> Option<Run> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then(|| Run {
        fence: Fence { marker, len },
        bare: trimmed[len..].trim().is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let mut fence = FenceTracker::default();

        assert!(fence.update("```python"));
        assert!(fence.in_fence());
        assert!(!fence.update(".ve-image foo.jpg"));
        assert!(fence.update("```"));
        assert!(!fence.in_fence());
    }

    #[test]
    fn test_close_needs_same_marker_and_length() {
        let mut fence = FenceTracker::default();

        fence.update("~~~~");
        assert!(!fence.update("```"));
        assert!(!fence.update("~~~"));
        assert!(fence.in_fence());
        assert!(fence.update("~~~~~"));
        assert!(!fence.in_fence());
    }

    #[test]
    fn test_info_string_does_not_close() {
        let mut fence = FenceTracker::default();

        fence.update("```");
        assert!(!fence.update("```js"));
        assert!(fence.in_fence());
    }

    #[test]
    fn test_inline_code_is_not_a_fence() {
        let mut fence = FenceTracker::default();

        assert!(!fence.update("``code``"));
        assert!(!fence.in_fence());
    }
}
