use axum::{Router, extract::State, response::Html, routing::get};

use crate::error::AppError;
use crate::state::AppState;

fn render(state: &AppState, template_name: &str) -> Result<Html<String>, AppError> {
    state.pages.render(template_name).map(Html)
}

/// 首页：上传表单
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, "index.html")
}

/// 结果页
pub async fn result(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, "result.html")
}

/// 错误页
pub async fn error(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, "error.html")
}

pub fn create_pages_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/", get(index))
        .route("/result", get(result))
        .route("/error", get(error))
}
