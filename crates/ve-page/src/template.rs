use ve_renderer::Document;

/// Page skeleton a document is assembled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateVersion {
    /// Vue 2 skeleton. Selected by `<param>` elements in the content.
    Legacy,
    Current,
}

impl TemplateVersion {
    /// Sniff the template version from compiled content.
    #[must_use]
    pub fn classify(doc: &Document) -> Self {
        if doc.first_named(doc.root(), "param").is_some() {
            Self::Legacy
        } else {
            Self::Current
        }
    }

    /// Asset directory holding this version's skeleton and scripts.
    #[must_use]
    pub fn dir(self) -> &'static str {
        match self {
            Self::Legacy => "v1",
            Self::Current => "v2",
        }
    }

    /// Asset path of the page skeleton.
    #[must_use]
    pub fn index_path(self) -> String {
        format!("{}/index.html", self.dir())
    }

    /// Asset path of the inline script body.
    #[must_use]
    pub fn script_path(self) -> String {
        format!("{}/js/main.js", self.dir())
    }
}
