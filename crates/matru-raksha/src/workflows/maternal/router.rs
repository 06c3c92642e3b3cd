use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::domain::{
    AshaVisitReport, AssessmentId, AssessmentRequest, MotherId, MotherRegistration, TaskId,
};
use super::repository::{CareRecordStore, NotificationSender};
use super::service::{MaternalCareError, MaternalCareService};

type SharedService<S, N> = State<Arc<MaternalCareService<S, N>>>;

/// Router exposing registration, assessment, task and analytics endpoints.
pub fn care_router<S, N>(service: Arc<MaternalCareService<S, N>>) -> Router
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    Router::new()
        .route("/api/v1/mothers", post(register_handler::<S, N>))
        .route(
            "/api/v1/mothers/:mother_id",
            get(mother_handler::<S, N>).put(update_mother_handler::<S, N>),
        )
        .route(
            "/api/v1/mothers/:mother_id/assessments",
            get(assessments_handler::<S, N>),
        )
        .route(
            "/api/v1/mothers/:mother_id/emergencies",
            get(emergencies_handler::<S, N>),
        )
        .route("/api/v1/mothers/:mother_id/tasks", get(tasks_handler::<S, N>))
        .route("/api/v1/risk/assess", post(assess_handler::<S, N>))
        .route(
            "/api/v1/assessments/:assessment_id/care-plan",
            get(care_plan_handler::<S, N>),
        )
        .route(
            "/api/v1/tasks/:task_id/complete",
            post(complete_task_handler::<S, N>),
        )
        .route(
            "/api/v1/asha/visit-report",
            post(visit_report_handler::<S, N>),
        )
        .route("/api/v1/batch/run", post(batch_handler::<S, N>))
        .route("/api/v1/reminders/run", post(reminders_handler::<S, N>))
        .route(
            "/api/v1/analytics/dashboard",
            get(dashboard_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) fn error_response(error: MaternalCareError) -> Response {
    let status = error.status_code();
    let payload = match &error {
        MaternalCareError::Validation(rejection) => json!({
            "error": error.to_string(),
            "violations": rejection.violations,
        }),
        other => json!({
            "error": other.to_string(),
        }),
    };
    (status, Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    (
        rejection.status(),
        Json(json!({ "error": rejection.body_text() })),
    )
        .into_response()
}

/// Service calls take the store's locks, so they run on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> Result<T, MaternalCareError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(error_response),
        Err(join_error) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("care worker failed: {join_error}") })),
        )
            .into_response()),
    }
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, Response>) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn register_handler<S, N>(
    State(service): SharedService<S, N>,
    payload: Result<Json<MotherRegistration>, JsonRejection>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let Json(registration) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let result = run_blocking(move || service.register_mother(registration, Utc::now())).await;
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn mother_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(mother_id): Path<String>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.get_mother(&MotherId(mother_id))).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn update_mother_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(mother_id): Path<String>,
    payload: Result<Json<MotherRegistration>, JsonRejection>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let Json(registration) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let result =
        run_blocking(move || service.update_mother(&MotherId(mother_id), registration)).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn assessments_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(mother_id): Path<String>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.assessments_for(&MotherId(mother_id))).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn emergencies_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(mother_id): Path<String>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.emergencies_for(&MotherId(mother_id))).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn tasks_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(mother_id): Path<String>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.tasks_for(&MotherId(mother_id))).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn assess_handler<S, N>(
    State(service): SharedService<S, N>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let result = run_blocking(move || service.assess_risk(request, Utc::now())).await;
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn care_plan_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result =
        run_blocking(move || service.care_plan_for(&AssessmentId(assessment_id))).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn complete_task_handler<S, N>(
    State(service): SharedService<S, N>,
    Path(task_id): Path<String>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.complete_task(&TaskId(task_id), Utc::now())).await;
    respond(StatusCode::OK, result)
}

pub(crate) async fn visit_report_handler<S, N>(
    State(service): SharedService<S, N>,
    payload: Result<Json<AshaVisitReport>, JsonRejection>,
) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let Json(report) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let result = run_blocking(move || service.record_visit(report, Utc::now())).await;
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn batch_handler<S, N>(State(service): SharedService<S, N>) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.run_batch_assessment(Utc::now()))
        .await
        .map(|items| {
            json!({
                "processed": items.len(),
                "items": items,
            })
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn reminders_handler<S, N>(State(service): SharedService<S, N>) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.run_milestone_reminders(Utc::now()))
        .await
        .map(|reminders| {
            json!({
                "delivered": reminders.iter().filter(|reminder| reminder.delivered).count(),
                "reminders": reminders,
            })
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn dashboard_handler<S, N>(State(service): SharedService<S, N>) -> Response
where
    S: CareRecordStore + 'static,
    N: NotificationSender + 'static,
{
    let result = run_blocking(move || service.dashboard()).await;
    respond(StatusCode::OK, result)
}
