pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository is required — set `repo` (PLUGIN_REPO)")]
    MissingRepo,

    #[error("registry credential is required — set `token` (PLUGIN_TOKEN)")]
    MissingToken,

    #[error("build commit identifier is required — set `commit` (DRONE_COMMIT)")]
    MissingCommit,
}
