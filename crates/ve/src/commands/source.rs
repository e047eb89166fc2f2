//! `ve source` command implementation.

use clap::Args;
use ve_config::Config;
use ve_storage::DirEntry;

use super::{LocatorArgs, build_resolver, write_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the source command.
#[derive(Args)]
pub(crate) struct SourceArgs {
    #[command(flatten)]
    locator: LocatorArgs,

    /// List the storage prefix instead of resolving a document.
    #[arg(short, long, conflicts_with = "url")]
    list: bool,
}

impl SourceArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.locator.config_path(), None)?;
        let resolver = build_resolver(&config)?;
        let locator = self.locator.locator(&config);

        if self.list {
            let prefix = locator
                .path
                .as_deref()
                .or(locator.prefix.as_deref())
                .unwrap_or_default();
            let entries = resolver.list(prefix)?;
            output.highlight(&format!("{prefix}/ ({} entries)", entries.len()));
            let listing: String = entries.iter().map(|e| format!("{}\n", e.name())).collect();
            let folders = entries.iter().filter(|e| matches!(e, DirEntry::Folder(_))).count();
            output.detail(&format!("{folders} folders, {} files", entries.len() - folders));
            return write_document(&listing, None);
        }

        let source = resolver.resolve(&locator)?;
        output.highlight(&format!("origin: {}", source.origin));
        for (label, value) in [
            ("path", &source.path),
            ("key", &source.key),
            ("url", &source.url),
            ("account", &source.account),
            ("repo", &source.repo),
            ("ref", &source.git_ref),
        ] {
            if let Some(value) = value {
                output.detail(&format!("{label}: {value}"));
            }
        }
        if source.markdown.is_empty() {
            output.info("(empty document)");
            return Ok(());
        }
        write_document(&source.markdown, None)
    }
}
