use stevedore_core::BuildConfig;
use stevedore_engine::{DockerExecutor, EngineClient};

/// Run the full publish pipeline: daemon launch → readiness → login →
/// build → tag(s) → push.
///
/// Strictly sequential; the first failing step ends the run. Nothing already
/// created or pushed is rolled back.
pub(crate) async fn run<E: DockerExecutor>(
    client: &EngineClient<E>,
    config: &BuildConfig,
    launch_debug: bool,
) -> anyhow::Result<()> {
    client.launch_daemon(config.storage_driver.as_deref(), launch_debug);

    if !client.wait_until_ready().await {
        // Warm-up only; login reports the real failure.
        tracing::warn!("engine did not report ready, continuing anyway");
    }

    tracing::info!("authenticating to {}", config.registry);
    client.login(&config.registry, &config.token).await?;

    tracing::info!("building {} as {}", config.dockerfile, config.commit);
    client
        .build(&config.dockerfile, &config.build_context, &config.commit)
        .await?;

    for tag in &config.tags {
        let reference = config.image_ref(tag);
        client.tag(&config.commit, &reference).await?;
    }

    tracing::info!("pushing {}", config.repository);
    client.push(&config.repository).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{Sequence, mock};
    use stevedore_core::RawParams;
    use stevedore_engine::DockerError;

    mock! {
        Executor {}

        impl DockerExecutor for Executor {
            async fn exec_silent(&self, args: &[String]) -> Result<(), DockerError>;
            async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
            async fn exec_streaming_with_stdin(
                &self,
                args: &[String],
                stdin_data: &[u8],
            ) -> Result<(), DockerError>;
            fn spawn_detached(&self, args: &[String], forward_output: bool);
        }
    }

    fn command_failed() -> DockerError {
        DockerError::CommandFailed {
            args: vec![],
            stderr: "exit code: 1".to_owned(),
        }
    }

    fn config(repo: &str, tags: &[&str]) -> BuildConfig {
        BuildConfig::resolve(RawParams {
            token: Some("tok".to_owned()),
            repo: Some(repo.to_owned()),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            commit: Some("abc1234".to_owned()),
            ..RawParams::default()
        })
        .unwrap()
    }

    /// Mock with the daemon launch and an immediately-ready engine wired up.
    fn ready_engine() -> MockExecutor {
        let mut mock = MockExecutor::new();
        mock.expect_spawn_detached().returning(|_, _| ());
        mock.expect_exec_silent()
            .withf(|args| args == ["info"])
            .returning(|_| Ok(()));
        mock
    }

    #[tokio::test]
    async fn login_failure_stops_the_pipeline() {
        let mut mock = ready_engine();

        // No exec_streaming expectation: a build, tag, or push call after
        // the failed login panics the test.
        mock.expect_exec_streaming_with_stdin()
            .returning(|_, _| Err(command_failed()));

        let client = EngineClient::with_executor(mock);
        let err = run(&client, &config("myorg/app", &[]), false)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "login failed");
    }

    #[tokio::test]
    async fn tag_failure_aborts_before_push() {
        let mut mock = ready_engine();
        let mut seq = Sequence::new();

        mock.expect_exec_streaming_with_stdin()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_exec_streaming()
            .withf(|args| args.first().is_some_and(|a| a == "build"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_exec_streaming()
            .withf(|args| args == ["tag", "abc1234", "gcr.io/myorg/app:v1"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_exec_streaming()
            .withf(|args| args == ["tag", "abc1234", "gcr.io/myorg/app:v2"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(command_failed()));
        // No push expectation: reaching it panics the test.

        let client = EngineClient::with_executor(mock);
        let err = run(&client, &config("gcr.io/myorg/app", &["v1", "v2"]), false)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("gcr.io/myorg/app:v2"));
    }

    #[tokio::test]
    async fn full_run_publishes_the_bare_repository() {
        let mut mock = ready_engine();
        let mut seq = Sequence::new();

        mock.expect_exec_streaming_with_stdin()
            .withf(|args, _| args.last().is_some_and(|a| a == "gcr.io"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_exec_streaming()
            .withf(|args| {
                args == ["build", "--pull", "--rm", "-f", "Dockerfile", "-t", "abc1234", "."]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_exec_streaming()
            .withf(|args| args == ["tag", "abc1234", "gcr.io/myorg/app"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_exec_streaming()
            .withf(|args| args == ["push", "gcr.io/myorg/app"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let client = EngineClient::with_executor(mock);
        let result = run(&client, &config("myorg/app", &[]), false).await;

        assert!(result.is_ok());
    }
}
