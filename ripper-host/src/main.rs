use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use ripper_core::{RipController, RipEngine};
use ripper_host::api::{self, SharedController};
use ripper_host::{Args, Heartbeat, HostError, HttpUploadTransport, LogStatusSink, StubDisc, SERVICE_NAME};

fn main() -> Result<(), HostError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting {} {}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    let context = args.session_context()?;
    let interval = args.heartbeat_interval()?;
    log::info!(
        "System [{}], session [{}], uploading to {}, staging in {}",
        context.system_id,
        context.session_id,
        context.upload_address,
        context.staging_dir.display()
    );

    // The blocking client runs its own runtime; build it before ours.
    let transport = HttpUploadTransport::new(args.upload_timeout())?;
    log::info!("Using simulated drive with {} tracks", args.stub_tracks);
    let device = StubDisc::new(args.stub_tracks);

    let mut engine = RipEngine::new(context, device, transport)?;
    engine.set_status_sink(Arc::new(LogStatusSink::new()));
    let engine = Arc::new(engine);

    let ticker = Arc::clone(&engine);
    let mut heartbeat = Heartbeat::start(interval, move || ticker.tick())?;

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let served = runtime.block_on(serve(args.listen, engine.clone()));
    if let Err(ref e) = served {
        log::error!("Control API failed: {}", e);
    }

    engine.cancel();
    heartbeat.stop();
    engine.shutdown();
    drop(runtime);

    log::info!("{} stopped", SERVICE_NAME);
    served
}

async fn serve(listen: SocketAddr, controller: SharedController) -> Result<(), HostError> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Control API listening on {}", listen);

    axum::serve(listener, api::router(controller))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
