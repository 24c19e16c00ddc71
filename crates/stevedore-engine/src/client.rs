use secrecy::{ExposeSecret, SecretString};

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor, trace};
use crate::readiness::{READY_ATTEMPTS, READY_DELAY, wait_for_engine};

/// Username the registry accepts for service-account JSON-key logins.
const JSON_KEY_USER: &str = "_json_key";

/// Container engine operations, parameterized over the executor for
/// testability.
pub struct EngineClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl EngineClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for EngineClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> EngineClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Daemon ──

    /// Launch the engine daemon in the background.
    ///
    /// Fire and forget: no handle is kept, and a daemon that dies is noticed
    /// only by the readiness probe and the login step. The daemon's own
    /// output is discarded unless `forward_output` is set.
    pub fn launch_daemon(&self, storage_driver: Option<&str>, forward_output: bool) {
        let mut cmd = vec!["daemon".to_owned()];
        if let Some(driver) = storage_driver {
            cmd.push("-s".to_owned());
            cmd.push(driver.to_owned());
        }

        trace(&cmd);
        self.executor.spawn_detached(&cmd, forward_output);
    }

    // ── Readiness ──

    /// One silent status probe against the engine.
    pub async fn ping(&self) -> bool {
        self.executor.exec_silent(&args(["info"])).await.is_ok()
    }

    /// Best-effort warm-up: probe until the daemon accepts commands, up to
    /// [`READY_ATTEMPTS`] tries spaced [`READY_DELAY`] apart. Returns whether
    /// the engine ever reported ready; callers proceed either way.
    pub async fn wait_until_ready(&self) -> bool {
        wait_for_engine(
            READY_ATTEMPTS,
            READY_DELAY,
            || self.ping(),
            tokio::time::sleep,
        )
        .await
    }

    // ── Authentication ──

    /// Authenticate the engine's registry client with a service-account key.
    ///
    /// Output streams to the CI log so a rejection is visible there. The
    /// credential travels over stdin, never on the argv, and the command is
    /// deliberately not traced.
    pub async fn login(&self, registry: &str, token: &SecretString) -> Result<(), PublishError> {
        let cmd = args(["login", "-u", JSON_KEY_USER, "--password-stdin", registry]);
        self.executor
            .exec_streaming_with_stdin(&cmd, token.expose_secret().as_bytes())
            .await
            .map_err(|e| PublishError::Login { source: e })
    }

    // ── Build ──

    /// Build the image, tagged only with the transient `image` name.
    /// Base layers are always re-pulled and intermediate containers removed.
    pub async fn build(
        &self,
        dockerfile: &str,
        context: &str,
        image: &str,
    ) -> Result<(), PublishError> {
        let cmd = args(["build", "--pull", "--rm", "-f", dockerfile, "-t", image, context]);
        trace(&cmd);
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| PublishError::Build { source: e })
    }

    // ── Tag / Push ──

    /// Point `reference` at the locally built `image`.
    pub async fn tag(&self, image: &str, reference: &str) -> Result<(), PublishError> {
        let cmd = args(["tag", image, reference]);
        trace(&cmd);
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| PublishError::Tag {
                reference: reference.to_owned(),
                source: e,
            })
    }

    /// Publish `reference` and every tag that resolves to it.
    pub async fn push(&self, reference: &str) -> Result<(), PublishError> {
        let cmd = args(["push", reference]);
        trace(&cmd);
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| PublishError::Push {
                reference: reference.to_owned(),
                source: e,
            })
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("login failed")]
    Login { source: DockerError },

    #[error("image build failed")]
    Build { source: DockerError },

    #[error("tagging {reference} failed")]
    Tag {
        reference: String,
        source: DockerError,
    },

    #[error("push of {reference} failed")]
    Push {
        reference: String,
        source: DockerError,
    },
}
