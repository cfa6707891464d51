use std::fmt::{Debug, Display};

use tokio::task::JoinError;
use tracing::instrument::WithSubscriber;
use cloudrun_api::{
    configuration::get_configuration,
    domain::ProjectId,
    metadata::resolve_project_id,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

const SERVICE_NAME: &str = "cloudrun_api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_configuration()?;

    // Startup logs are written before the project id is known.
    let bootstrap = get_subscriber(
        SERVICE_NAME.into(),
        "info".into(),
        ProjectId::unknown(),
        std::io::stdout,
    );
    let metadata_client = config.gcp.metadata_client()?;
    let project_id = resolve_project_id(&metadata_client, config.gcp.configured_project_id())
        .with_subscriber(bootstrap)
        .await;

    let subscriber = get_subscriber(SERVICE_NAME.into(), "info".into(), project_id, std::io::stdout);
    init_subscriber(subscriber);

    tracing::info!("Starting up the application");
    let app = tokio::spawn(Application::build(config).await?.run_until_stopped());

    report_exit("API", app.await);

    Ok(())
}

fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name)
        }
        Ok(Err(e)) => {
            tracing::error!(
            fatal = true,
            error.cause_chain = ?e,
            error.message = %e,
            "{} terminated unexpectedly",
            task_name
            )
        }
        Err(e) => {
            tracing::error!(
            fatal = true,
            error.cause_chain = ?e,
            error.message = %e,
            "{} task failed to complete",
            task_name
            )
        }
    }
}
