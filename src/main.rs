use anyhow::Result;
use inquest::api::{HttpInterviewService, InterviewService};
use inquest::config::AppConfig;
use inquest::indicator::{HttpIndicatorTransport, IndicatorNotifier};
use inquest::ui::InquestApp;
use inquest::workflow::{ListingController, WorkflowController};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inquest=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    info!("Starting Inquest against {}", config.api_base_url);

    // Network work runs on this runtime; the UI thread stays synchronous
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let service: Arc<dyn InterviewService> =
        Arc::new(HttpInterviewService::new(&config.api_base_url));
    let transport = Arc::new(HttpIndicatorTransport::new(&config.indicator.base_url));
    let notifier = IndicatorNotifier::new(&config.indicator, transport, runtime.handle().clone());

    let workflow = WorkflowController::new(Arc::clone(&service), notifier, runtime.handle().clone());
    let listing = ListingController::new(service, runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Inquest"),
        ..Default::default()
    };

    eframe::run_native(
        "Inquest",
        options,
        Box::new(move |cc| Ok(Box::new(InquestApp::new(cc, workflow, listing)))),
    )
    .map_err(|e| anyhow::anyhow!("UI shell failed: {e}"))?;

    Ok(())
}
