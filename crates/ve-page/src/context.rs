use ve_config::Env;

/// Per-request rendering options supplied by the caller.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub env: Env,
    /// Requesting host, used for development asset roots.
    pub host: String,
    /// Base URL of the page, written to `<base href>` and used to resolve
    /// relative links.
    pub base_url: String,
    /// Inline stylesheets and scripts instead of linking them.
    pub inline: bool,
    /// GitHub Pages link mode.
    pub ghp: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            env: Env::Prod,
            host: String::new(),
            base_url: "/".to_owned(),
            inline: false,
            ghp: false,
        }
    }
}

/// Read-only configuration threaded through every pipeline stage.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub env: Env,
    pub host: String,
    pub base_url: String,
    /// Effective prefix: `account/repo` for GitHub sources, otherwise the
    /// requested prefix.
    pub prefix: Option<String>,
    /// Ref requested by the caller.
    pub git_ref: Option<String>,
    pub inline: bool,
    pub ghp: bool,
}

impl RenderContext {
    /// Build a context from options plus the resolved prefix and ref.
    #[must_use]
    pub fn new(options: &RenderOptions, prefix: Option<String>, git_ref: Option<String>) -> Self {
        Self {
            env: options.env,
            host: options.host.clone(),
            base_url: options.base_url.clone(),
            prefix: prefix.filter(|p| !p.is_empty()),
            git_ref: git_ref.filter(|r| !r.is_empty()),
            inline: options.inline,
            ghp: options.ghp,
        }
    }
}
