mod pipeline;

use clap::Parser;
use stevedore_core::{BuildConfig, RawParams};
use stevedore_engine::EngineClient;

/// Build a container image from a Dockerfile and push it, with its tags, to
/// a container registry. Parameters arrive as flags or as the environment
/// variables a Drone-style CI runner injects.
#[derive(Parser)]
#[command(name = "stevedore", about = "Build and push container images from CI")]
#[command(version)]
struct Cli {
    /// Registry host the image is pushed to
    #[arg(long, env = "PLUGIN_REGISTRY")]
    registry: Option<String>,

    /// Storage driver handed to the engine daemon
    #[arg(long, env = "PLUGIN_STORAGE_DRIVER")]
    storage_driver: Option<String>,

    /// Service-account key used as the registry password
    #[arg(long, env = "PLUGIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository path, `owner/name` or fully qualified
    #[arg(long, env = "PLUGIN_REPO")]
    repo: Option<String>,

    /// Tag to publish; repeat or comma-separate for more than one
    #[arg(long = "tag", env = "PLUGIN_TAG", value_delimiter = ',')]
    tags: Vec<String>,

    /// Path to the Dockerfile
    #[arg(long, env = "PLUGIN_FILE")]
    file: Option<String>,

    /// Build context directory
    #[arg(long, env = "PLUGIN_CONTEXT")]
    context: Option<String>,

    /// Commit identifier used as the transient local image name
    #[arg(long, env = "DRONE_COMMIT")]
    commit: Option<String>,

    /// Forward the engine daemon's own output instead of discarding it
    #[arg(long, env = "DOCKER_LAUNCH_DEBUG")]
    launch_debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("stevedore {} starting", env!("CARGO_PKG_VERSION"));

    let config = BuildConfig::resolve(RawParams {
        registry: cli.registry,
        storage_driver: cli.storage_driver,
        token: cli.token,
        repo: cli.repo,
        tags: cli.tags,
        file: cli.file,
        context: cli.context,
        commit: cli.commit,
    })?;

    let client = EngineClient::new();
    pipeline::run(&client, &config, cli.launch_debug).await
}
