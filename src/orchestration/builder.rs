//! Unit build capabilities
//!
//! The orchestrator only knows how to ask for a unit to be compiled or
//! archived. `CommandBuilder` does this by running the configured external
//! programs; tests substitute their own implementation.

use crate::config::{BuildConfig, Unit};
use crate::error::{KikoError, KikoResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 20;

/// Compile and archive operations for a unit
#[async_trait]
pub trait UnitBuilder: Send + Sync {
    /// Compile the unit, returning the path of the compiled artifact
    async fn compile(&self, unit: &Unit) -> KikoResult<PathBuf>;

    /// Package the compiled artifact, returning the path of the distributable
    async fn archive(&self, unit: &Unit) -> KikoResult<PathBuf>;
}

/// Builds units by running external commands
pub struct CommandBuilder {
    build: BuildConfig,
}

impl CommandBuilder {
    pub fn new(build: BuildConfig) -> Self {
        Self { build }
    }

    /// Substitute unit placeholders into a command template
    fn render(template: &[String], unit: &Unit) -> Vec<String> {
        template
            .iter()
            .map(|arg| arg.replace("{path}", &unit.path).replace("{name}", &unit.name))
            .collect()
    }

    /// Run a command to completion, returning a failure reason on error
    async fn exec(&self, argv: &[String]) -> Result<(), String> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| "empty command".to_string())?;

        debug!("Executing: {} {:?}", program, args);

        let output = Command::new(program)
            .args(args)
            .envs(&self.build.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| KikoError::command_failed(program.clone(), e).to_string())?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail = build_error_output(&stdout, &stderr);
        if tail.is_empty() {
            Err(output.status.to_string())
        } else {
            Err(format!("{}\n{}", output.status, tail))
        }
    }
}

#[async_trait]
impl UnitBuilder for CommandBuilder {
    async fn compile(&self, unit: &Unit) -> KikoResult<PathBuf> {
        let argv = Self::render(&self.build.compile, unit);
        self.exec(&argv).await.map_err(|reason| KikoError::Compile {
            unit: unit.name.clone(),
            reason,
        })?;

        Ok(Path::new(&unit.path).join(&self.build.artifact))
    }

    async fn archive(&self, unit: &Unit) -> KikoResult<PathBuf> {
        let argv = Self::render(&self.build.archive, unit);
        self.exec(&argv).await.map_err(|reason| KikoError::Archive {
            unit: unit.name.clone(),
            reason,
        })?;

        Ok(Path::new(&unit.path).join(&self.build.package))
    }
}

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
fn build_error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(BUILD_ERROR_TAIL_LINES);
    lines[start..].join("\n")
}
