//! `chm check` command implementation.

use chm_config::CliSettings;
use chm_project::ProjectBuilder;
use clap::Args;

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings::default())?;
        output.info(&format!("Source: {}", config.source_resolved.root.display()));

        let sitemaps = ProjectBuilder::new(&config).collect()?;

        output.heading(&config.project.title);
        output.count("Chapters", sitemaps.contents.children.len());
        output.count("Topics", sitemaps.topic_count());
        output.count("Keywords", sitemaps.keyword_count());
        output.count("Pages", sitemaps.pages.len());

        if sitemaps.index.is_empty() {
            output.warning(&format!(
                "{} has no keywords",
                config.source_resolved.index_page
            ));
        }
        output.success("Navigation is complete");
        Ok(())
    }
}
