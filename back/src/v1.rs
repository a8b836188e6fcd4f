use std::sync::{atomic::Ordering, Arc};

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use studyhub_api::v1::{
    weekly_summary, ClassAssignmentView, DaySchedule, Event, Item, ItemId, ItemKind,
    NewClassAssignment, NewEvent, NewItem, Priority, PriorityBreakdown, StateFilter, StatusCounts,
    Summary, WeeklySummary,
};
use tracing::info;

use crate::{error::ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generation", get(get_generation))
        .route("/tasks", get(get_tasks).post(add_task))
        .route("/tasks/:id/toggle", post(toggle_task))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/:id/complete", post(complete_assignment))
        .route("/dashboard/:id/toggle", post(toggle_assignment))
        .route("/assignments", get(get_assignments).post(add_assignment))
        .route("/assignments/:id/submissions", post(record_submission))
        .route("/timetable", get(get_timetable).post(add_event))
        .route("/timetable/today", get(get_today))
        .route("/analytics", get(get_analytics))
        .route("/about", get(get_about))
}

async fn get_generation(State(state): State<Arc<AppState>>) -> Json<u64> {
    Json(state.generation.load(Ordering::Relaxed))
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct TaskForm {
    title: String,
    #[serde(default)]
    description: String,
    due_date: NaiveDate,
    #[serde(default)]
    priority: Option<Priority>,
}

async fn get_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Summary> {
    let tasks = state.tasks.lock().await;
    Json(tasks.search_summary(&query.q, Utc::now()))
}

async fn add_task(
    State(state): State<Arc<AppState>>,
    Json(form): Json<TaskForm>,
) -> Result<Json<Item>, ApiError> {
    let new = NewItem {
        kind: ItemKind::Task,
        title: form.title,
        description: form.description,
        due_date: form.due_date,
        priority: form.priority,
    };

    let mut tasks = state.tasks.lock().await;
    let task = tasks.add(new, Utc::now())?.clone();
    state.increment_generation();

    info!(
        id = %task.id(),
        title = %task.title(),
        priority = ?task.priority(),
        "created task"
    );

    Ok(Json(task))
}

async fn toggle_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> Result<Json<Item>, ApiError> {
    let mut tasks = state.tasks.lock().await;
    let task = tasks.toggle(id, Utc::now())?.clone();
    state.increment_generation();

    info!(
        id = %task.id(),
        completed = task.is_completed(),
        "toggled task"
    );

    Ok(Json(task))
}

#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    #[serde(default)]
    state: StateFilter,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Json<Summary> {
    let dashboard = state.dashboard.lock().await;
    Json(dashboard.state_summary(query.state, Utc::now()))
}

async fn complete_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> Result<Json<Item>, ApiError> {
    let mut dashboard = state.dashboard.lock().await;
    let assignment = dashboard.mark_complete(id, Utc::now())?.clone();
    state.increment_generation();

    info!(
        id = %assignment.id(),
        submitted_at = ?assignment.submitted_at(),
        "completed assignment"
    );

    Ok(Json(assignment))
}

async fn toggle_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> Result<Json<Item>, ApiError> {
    let mut dashboard = state.dashboard.lock().await;
    let assignment = dashboard.toggle(id, Utc::now())?.clone();
    state.increment_generation();

    info!(
        id = %assignment.id(),
        completed = assignment.is_completed(),
        "toggled assignment"
    );

    Ok(Json(assignment))
}

async fn get_assignments(State(state): State<Arc<AppState>>) -> Json<Vec<ClassAssignmentView>> {
    let assignments = state.assignments.lock().await;
    Json(assignments.views(Utc::now()))
}

async fn add_assignment(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewClassAssignment>,
) -> Result<Json<ClassAssignmentView>, ApiError> {
    let now = Utc::now();

    let mut assignments = state.assignments.lock().await;
    let assignment = assignments.add(new, now)?.view(now);
    state.increment_generation();

    info!(
        id = %assignment.assignment.item().id(),
        title = %assignment.assignment.item().title(),
        students = assignment.assignment.assigned_students(),
        "created assignment"
    );

    Ok(Json(assignment))
}

async fn record_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> Result<Json<ClassAssignmentView>, ApiError> {
    let mut assignments = state.assignments.lock().await;
    let assignment = assignments.record_submission(id)?.view(Utc::now());
    state.increment_generation();

    info!(
        id = %id,
        completed = assignment.assignment.completed_students(),
        rate = assignment.completion_rate,
        "recorded submission"
    );

    Ok(Json(assignment))
}

async fn get_timetable(State(state): State<Arc<AppState>>) -> Json<Vec<DaySchedule>> {
    let timetable = state.timetable.lock().await;
    Json(timetable.week())
}

async fn get_today(State(state): State<Arc<AppState>>) -> Json<DaySchedule> {
    let timetable = state.timetable.lock().await;
    Json(timetable.today(Utc::now()))
}

async fn add_event(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewEvent>,
) -> Result<Json<Event>, ApiError> {
    let mut timetable = state.timetable.lock().await;
    let event = timetable.add(new)?.clone();
    state.increment_generation();

    info!(
        id = %event.id(),
        title = %event.title(),
        weekday = %event.weekday(),
        "created event"
    );

    Ok(Json(event))
}

#[derive(Debug, Serialize)]
struct Analytics {
    counts: StatusCounts,
    completion_rate: u8,
    by_priority: PriorityBreakdown,
    this_week: WeeklySummary,
}

async fn get_analytics(State(state): State<Arc<AppState>>) -> Json<Analytics> {
    let now = Utc::now();
    let tasks = state.tasks.lock().await;
    let summary = tasks.summary(now);

    Json(Analytics {
        counts: summary.counts,
        completion_rate: summary.completion_rate,
        by_priority: summary.by_priority,
        this_week: weekly_summary(tasks.items(), now),
    })
}

#[derive(Debug, Serialize)]
struct About {
    name: &'static str,
    version: &'static str,
    description: &'static str,
}

async fn get_about() -> Json<About> {
    Json(About {
        name: "StudyHub",
        version: env!("CARGO_PKG_VERSION"),
        description: "Tasks, timetable, and assignment tracking for students.",
    })
}
