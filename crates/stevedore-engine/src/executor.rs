use std::process::Stdio;

use crate::docker::DockerError;

/// Name the engine binary is invoked as; resolved through `PATH`.
const DOCKER_BIN: &str = "docker";

/// Abstraction over docker CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Run a docker command, discarding its output.
    async fn exec_silent(&self, args: &[String]) -> Result<(), DockerError>;

    /// Run a docker command, streaming output to the terminal.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;

    /// Run a docker command with data piped to stdin, streaming output to
    /// the terminal.
    async fn exec_streaming_with_stdin(
        &self,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<(), DockerError>;

    /// Spawn a docker command as a detached background process. The child is
    /// never joined or killed here; it lives until the CI job's process
    /// group is torn down.
    fn spawn_detached(&self, args: &[String], forward_output: bool);
}

/// Echo a constructed command before execution, `$`-prefixed, for
/// post-mortem reading of CI logs. Callers must not pass an argv carrying a
/// secret.
pub(crate) fn trace(args: &[String]) {
    println!("$ {DOCKER_BIN} {}", args.join(" "));
}

/// Real docker CLI executor.
pub struct RealExecutor;

impl DockerExecutor for RealExecutor {
    async fn exec_silent(&self, args: &[String]) -> Result<(), DockerError> {
        let status = tokio::process::Command::new(DOCKER_BIN)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr: format!("exit code: {status}"),
            })
        }
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        let status = tokio::process::Command::new(DOCKER_BIN)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr: format!("exit code: {status}"),
            })
        }
    }

    async fn exec_streaming_with_stdin(
        &self,
        args: &[String],
        stdin_data: &[u8],
    ) -> Result<(), DockerError> {
        use tokio::io::AsyncWriteExt;

        let mut child = tokio::process::Command::new(DOCKER_BIN)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| DockerError::NotFound { source: e })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(stdin_data)
                .await
                .map_err(|e| DockerError::StdinWrite { source: e })?;
            stdin
                .shutdown()
                .await
                .map_err(|e| DockerError::StdinWrite { source: e })?;
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr: format!("exit code: {status}"),
            })
        }
    }

    fn spawn_detached(&self, args: &[String], forward_output: bool) {
        let mut cmd = tokio::process::Command::new(DOCKER_BIN);
        cmd.args(args).stdin(Stdio::null());
        if forward_output {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        // Fire and forget: failures here are observed indirectly, through
        // the readiness probe and the login step.
        tokio::spawn(async move {
            match cmd.status().await {
                Ok(status) => tracing::debug!("engine daemon exited: {status}"),
                Err(err) => tracing::debug!("engine daemon failed to start: {err}"),
            }
        });
    }
}
