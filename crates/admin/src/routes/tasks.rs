//! Task list route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::TaskRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireIdentity;
use crate::models::Task;
use crate::state::AppState;

use super::dashboard::UserView;
use super::{Flash, render};

/// How many tasks the list shows.
const TASK_LIST_LIMIT: i64 = 50;

/// Longest accepted task name, in characters.
const MAX_TASK_NAME_LENGTH: usize = 200;

/// Task row for templates.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub name: String,
    pub created_at: String,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            name: task.name,
            created_at: task.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Task list template.
#[derive(Template)]
#[template(path = "tasks.html")]
struct TasksTemplate {
    user: UserView,
    current_path: String,
    flash: Flash,
    tasks: Vec<TaskView>,
}

/// Form for adding a task.
#[derive(Debug, Deserialize)]
pub struct NewTaskForm {
    pub name: String,
}

/// Build the tasks router.
pub fn router() -> Router<AppState> {
    Router::new().route("/tasks", get(list_tasks).post(create_task))
}

/// List recent tasks.
///
/// GET /tasks
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn list_tasks(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(flash): Query<Flash>,
) -> Result<Html<String>, AppError> {
    let tasks = TaskRepository::new(state.pool())
        .list_recent(TASK_LIST_LIMIT)
        .await?;

    let template = TasksTemplate {
        user: UserView::resolve(&state, &identity).await,
        current_path: "/tasks".to_string(),
        flash,
        tasks: tasks.into_iter().map(TaskView::from).collect(),
    };

    Ok(render(&template))
}

/// Add a task.
///
/// POST /tasks
#[instrument(skip_all, fields(user_id = %identity.user_id))]
async fn create_task(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Form(form): Form<NewTaskForm>,
) -> Result<Redirect, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Ok(Flash::error("/tasks", "Task name is required."));
    }
    if name.chars().count() > MAX_TASK_NAME_LENGTH {
        return Ok(Flash::error(
            "/tasks",
            &format!("Task names can be at most {MAX_TASK_NAME_LENGTH} characters."),
        ));
    }

    let task = TaskRepository::new(state.pool()).create(name).await?;
    tracing::info!(task_id = %task.id, "Task created");

    Ok(Flash::success("/tasks", "Task added."))
}
