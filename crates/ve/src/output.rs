//! Styled status lines on stderr.

use console::{Style, Term};

/// Status printer. Documents never go through here; they are written to
/// stdout so they can be piped.
pub(crate) struct Output {
    term: Term,
    ok: Style,
    failure: Style,
    heading: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            ok: Style::new().green(),
            failure: Style::new().red(),
            heading: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    fn line(&self, style: Option<&Style>, msg: &str) {
        let text = match style {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        let _ = self.term.write_line(&text);
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(None, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Some(&self.ok), msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Some(&self.failure), msg);
    }

    /// Section heading, e.g. the origin of a resolved document.
    pub(crate) fn highlight(&self, msg: &str) {
        self.line(Some(&self.heading), msg);
    }

    /// Secondary detail under a heading.
    pub(crate) fn detail(&self, msg: &str) {
        self.line(Some(&self.dim), msg);
    }
}
