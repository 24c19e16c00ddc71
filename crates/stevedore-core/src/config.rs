use secrecy::SecretString;

/// Registry host used when the CI job does not name one.
pub const DEFAULT_REGISTRY: &str = "gcr.io";
/// Build manifest path used when the CI job does not name one.
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";
/// Build context directory used when the CI job does not name one.
pub const DEFAULT_CONTEXT: &str = ".";

/// Raw plugin parameters, exactly as collected from flags and the CI
/// environment. Empty strings count as absent: CI runners export unset
/// parameters as `PLUGIN_FOO=""`.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    pub registry: Option<String>,
    pub storage_driver: Option<String>,
    pub token: Option<String>,
    pub repo: Option<String>,
    pub tags: Vec<String>,
    pub file: Option<String>,
    pub context: Option<String>,
    pub commit: Option<String>,
}

/// Resolved build parameters. Immutable for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Registry host the image is pushed to.
    pub registry: String,
    /// Storage driver handed to the engine daemon, if any.
    pub storage_driver: Option<String>,
    /// Registry credential. Trimmed on resolution; only the login step may
    /// expose it.
    pub token: SecretString,
    /// Fully qualified repository path, registry host included.
    pub repository: String,
    /// Tags to produce and push, in the order they were supplied.
    pub tags: Vec<String>,
    /// Path to the Dockerfile inside the build context.
    pub dockerfile: String,
    /// Build context directory.
    pub build_context: String,
    /// Commit identifier used as the transient local image name between the
    /// build and tagging steps.
    pub commit: String,
}

impl BuildConfig {
    /// Resolve raw parameters into a validated configuration.
    ///
    /// Defaulting rules:
    /// - `registry` falls back to [`DEFAULT_REGISTRY`]
    /// - `file` falls back to [`DEFAULT_DOCKERFILE`], `context` to [`DEFAULT_CONTEXT`]
    /// - an empty tag list becomes `["latest"]`
    /// - a `repo` with exactly one `/` separator is prefixed with the
    ///   registry host; zero or two-or-more separators pass through unchanged
    /// - the token is stripped of leading and trailing whitespace
    pub fn resolve(raw: RawParams) -> crate::Result<Self> {
        let registry = present(raw.registry).unwrap_or_else(|| DEFAULT_REGISTRY.to_owned());

        let repo = present(raw.repo).ok_or(crate::Error::MissingRepo)?;
        let repository = if repo.matches('/').count() == 1 {
            format!("{registry}/{repo}")
        } else {
            repo
        };

        let token = present(raw.token)
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(crate::Error::MissingToken)?;

        let commit = present(raw.commit).ok_or(crate::Error::MissingCommit)?;

        let mut tags = raw.tags;
        if tags.is_empty() {
            tags.push("latest".to_owned());
        }

        Ok(Self {
            registry,
            storage_driver: present(raw.storage_driver),
            token: token.into(),
            repository,
            tags,
            dockerfile: present(raw.file).unwrap_or_else(|| DEFAULT_DOCKERFILE.to_owned()),
            build_context: present(raw.context).unwrap_or_else(|| DEFAULT_CONTEXT.to_owned()),
            commit,
        })
    }

    /// Full image reference for one tag.
    ///
    /// `latest` collapses to the bare repository reference. This is an
    /// explicit rule, not a formatting shortcut: the bare reference is also
    /// what the push step publishes, so `latest` must not produce a distinct
    /// `:latest`-suffixed reference.
    pub fn image_ref(&self, tag: &str) -> String {
        if tag == "latest" {
            self.repository.clone()
        } else {
            format!("{repository}:{tag}", repository = self.repository)
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
