use crate::cli::ServeArgs;
use crate::infra::{default_scoring_config, AppState, InMemoryCareStore, LoggingNotifier};
use crate::routes::with_care_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use matru_raksha::config::{AppConfig, BatchScheduleConfig};
use matru_raksha::error::AppError;
use matru_raksha::telemetry;
use matru_raksha::workflows::maternal::{
    CareRecordStore, MaternalCareError, MaternalCareService, NotificationSender,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.no_batch {
        config.batch.enabled = false;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryCareStore::default());
    let notifier = Arc::new(LoggingNotifier::default());
    let care_service = Arc::new(MaternalCareService::new(
        store,
        notifier,
        default_scoring_config(),
    ));

    let _clocks = spawn_batch_clock(care_service.clone(), config.batch);

    let app = with_care_routes(care_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "maternal care service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodic callers of the batch and milestone reminder entry points. First ticks are skipped so
/// a fresh process does not re-score or re-notify everyone at startup.
pub(crate) fn spawn_batch_clock<S, N>(
    service: Arc<MaternalCareService<S, N>>,
    schedule: BatchScheduleConfig,
) -> Vec<JoinHandle<()>>
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    if !schedule.enabled {
        info!("batch clock disabled");
        return Vec::new();
    }

    info!(
        interval_hours = schedule.interval_hours,
        reminder_interval_hours = schedule.reminder_interval_hours,
        "batch clock scheduled"
    );

    let batch_service = service.clone();
    let batch = spawn_clock("batch assessment", schedule.interval(), move || {
        batch_service
            .run_batch_assessment(Utc::now())
            .map(|items| items.len())
    });
    let reminders = spawn_clock("milestone reminders", schedule.reminder_interval(), move || {
        service
            .run_milestone_reminders(Utc::now())
            .map(|reminders| reminders.iter().filter(|reminder| reminder.delivered).count())
    });
    vec![batch, reminders]
}

fn spawn_clock<F>(job: &'static str, period: Duration, run: F) -> JoinHandle<()>
where
    F: Fn() -> Result<usize, MaternalCareError> + Send + Sync + 'static,
{
    let run = Arc::new(run);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let run = run.clone();
            match tokio::task::spawn_blocking(move || (*run)()).await {
                Ok(Ok(count)) => info!(job, count, "scheduled run finished"),
                Ok(Err(error)) => warn!(job, %error, "scheduled run failed"),
                Err(error) => warn!(job, %error, "scheduled run aborted"),
            }
        }
    })
}
