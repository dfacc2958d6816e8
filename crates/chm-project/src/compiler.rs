//! External help compiler call-out.

use std::path::Path;
use std::process::Command;

use chm_config::CompilerConfig;

/// Error returned by [`Compiler::compile`].
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler could not be started.
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The compiler exited with a code outside the success codes.
    #[error("{command} failed with {}", code.map_or_else(|| "a signal".to_owned(), |c| format!("exit code {c}")))]
    Failed { command: String, code: Option<i32> },
}

/// Runs the configured help compiler on a project file.
#[derive(Debug, Clone)]
pub struct Compiler {
    command: String,
    success_codes: Vec<i32>,
}

impl Compiler {
    #[must_use]
    pub fn new(command: impl Into<String>, success_codes: Vec<i32>) -> Self {
        Self {
            command: command.into(),
            success_codes,
        }
    }

    #[must_use]
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.command.clone(), config.success_codes.clone())
    }

    /// Compile `project_file`, running in its directory.
    ///
    /// Returns the compiler's exit code.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Spawn`] if the command can't be started and
    /// [`CompileError::Failed`] for an exit code outside the success codes.
    pub fn compile(&self, project_file: &Path) -> Result<i32, CompileError> {
        let mut command = Command::new(&self.command);
        command.arg(project_file);
        if let Some(dir) = project_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        tracing::info!(command = %self.command, project = %project_file.display(), "Compiling");
        let status = command.status().map_err(|source| CompileError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        match status.code() {
            Some(code) if self.success_codes.contains(&code) => Ok(code),
            code => Err(CompileError::Failed {
                command: self.command.clone(),
                code,
            }),
        }
    }
}
