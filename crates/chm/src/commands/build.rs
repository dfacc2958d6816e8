//! `chm build` command implementation.

use chm_config::CliSettings;
use chm_project::ProjectBuilder;
use clap::Args;

use super::CommonArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) common: CommonArgs,

    /// Name of the compiled help file (overrides config).
    #[arg(long)]
    compiled_file: Option<String>,

    /// Run the configured help compiler after writing the project.
    #[arg(long)]
    compile: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings {
            compiled_file: self.compiled_file.clone(),
            compile: self.compile.then_some(true),
            ..CliSettings::default()
        })?;

        output.info(&format!("Source: {}", config.source_resolved.root.display()));
        if !config.project.normalize {
            output.warning("Page normalization is disabled, pages keep their UTF-8 charset");
        }

        let report = ProjectBuilder::new(&config).build()?;

        output.heading(&config.project.title);
        output.count("Topics", report.topics);
        output.count("Keywords", report.keywords);
        output.count("Pages", report.pages);
        output.count("Normalized", report.normalized);
        output.count("Assets", report.assets);

        output.success(&format!(
            "Project written to {}",
            report.project_file.display()
        ));
        if let Some(code) = report.compiled {
            output.success(&format!(
                "Compiled {} (exit code {code})",
                config.project.compiled_file
            ));
        }
        Ok(())
    }
}
