use snippetbox::configuration::get_configuration;
use snippetbox::startup::Application;
use snippetbox::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("snippetbox".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let application = Application::build(configuration).await?;
    if let Err(e) = application.run_until_stopped().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Server failed"
        );
        return Err(e.into());
    }
    tracing::info!("Server has exited");
    Ok(())
}
