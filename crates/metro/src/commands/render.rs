//! `metro render` command implementation.

use std::path::PathBuf;

use clap::Args;
use console::Term;
use metro_manifest::SourceDocument;
use metro_renderer::{MarkdownConverter, TocOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    file: PathBuf,

    /// Page title whose heading line is dropped (default: first `# ` heading).
    #[arg(long)]
    title: Option<String>,

    /// Prepend a table of contents.
    #[arg(long)]
    toc: bool,

    /// Prepend a "generated from" banner linking to this source URI.
    #[arg(long)]
    banner: Option<String>,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let document = SourceDocument::read(&self.file)?;
        let title = self.title.unwrap_or(document.heading_title);
        let toc = (self.toc || document.front_matter.toc == Some(true))
            .then(TocOptions::default);

        let body = MarkdownConverter::new().render(
            &title,
            &document.markdown,
            toc.as_ref(),
            self.banner.as_deref(),
        );

        if let Some(path) = self.output {
            std::fs::write(&path, &body)?;
            output.success(&format!("Wrote {}", path.display()));
        } else {
            Term::stdout().write_line(&body)?;
        }
        Ok(())
    }
}
