#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found — is the engine client installed in the build image?")]
    NotFound { source: std::io::Error },

    #[error("docker command failed: {args:?}\n{stderr}")]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("failed to write to docker stdin")]
    StdinWrite { source: std::io::Error },
}
