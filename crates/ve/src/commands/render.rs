//! `ve render` command implementation.

use std::path::PathBuf;

use clap::Args;
use ve_cache::MemoryCache;
use ve_config::{CliSettings, Config, Env};
use ve_page::{PageRenderer, RenderOptions};

use super::{LocatorArgs, build_resolver, write_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    locator: LocatorArgs,

    /// Base URL for `<base href>` and relative link resolution.
    #[arg(long)]
    base_url: Option<String>,

    /// Requesting host, used for development asset roots.
    #[arg(long, default_value = "")]
    host: String,

    /// Link stylesheets and scripts instead of inlining them.
    #[arg(long)]
    no_inline: bool,

    /// Rebase root-relative links for GitHub Pages hosting.
    #[arg(long)]
    ghp: bool,

    /// Use development asset roots.
    #[arg(long)]
    dev: bool,

    /// Render markdown from a local file instead of resolving a path.
    #[arg(short, long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Write the page to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            env: self.dev.then_some(Env::Dev),
            default_prefix: None,
            base_url: self.base_url.clone(),
            inline: self.no_inline.then_some(false),
            ghp: self.ghp.then_some(true),
        }
    }

    fn options(&self, config: &Config) -> RenderOptions {
        RenderOptions {
            env: config.render.env_for_host(&self.host),
            host: self.host.clone(),
            base_url: config.render.base_url.clone(),
            inline: config.render.inline,
            ghp: config.render.ghp,
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.locator.config_path(), Some(&self.cli_settings()))?;
        let options = self.options(&config);
        let locator = self.locator.locator(&config);

        let resolver = build_resolver(&config)?;
        let cache = MemoryCache::new();
        let renderer = PageRenderer::new(resolver, &cache, config.assets);

        let html = if let Some(input) = &self.input {
            let markdown = std::fs::read_to_string(input)?;
            renderer.render_inline(
                &markdown,
                self.locator.path.as_deref(),
                locator.prefix.as_deref(),
                &options,
            )?
        } else if locator.path.is_none() && locator.url.is_none() && locator.prefix.is_none() {
            return Err(CliError::Validation(
                "Nothing to render: give a path, --prefix, --url, or --input".to_owned(),
            ));
        } else {
            renderer
                .render(&locator, &options)?
                .ok_or_else(|| CliError::NotFound(self.locator.describe()))?
        };

        write_document(&html, self.output.as_deref())?;
        if let Some(path) = &self.output {
            output.success(&format!("Wrote {}", path.display()));
        }
        Ok(())
    }
}
