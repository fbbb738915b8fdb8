use cone_steering::{AppError, Configuration, CoordinatorBuilder, RecordingSource};
use tracing::Level;

fn init_logging(level: Level) {
    // stdout carries the records and the report
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let configuration = Configuration::load()?;
    init_logging(configuration.tracing_level());

    let source = RecordingSource::open(&configuration).await?;
    let coordinator = CoordinatorBuilder::new(configuration)
        .frame_source(Box::new(source))
        .build()?;

    let cancel_token = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, finishing queued frames");
            cancel_token.cancel();
        }
    });

    let report = coordinator.run().await?;
    println!("{report}");
    Ok(())
}
