use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Utc;
use pollboard_models::{Choice, Question};
use serde::Deserialize;
use tera::Context;

use crate::error::WebError;
use crate::routes::redirect_found;
use crate::state::AppState;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let latest = pollboard_db::questions::latest_questions(&state.db, Utc::now(), 5).await?;

    let mut ctx = Context::new();
    ctx.insert("latest_question_list", &latest);
    let html = state.templates.render("polls/index.html", &ctx)?;
    Ok(Html(html))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let question = pollboard_db::questions::get_visible_question(&state.db, question_id, Utc::now())
        .await?
        .ok_or(WebError::NotFound)?;
    let choices = pollboard_db::choices::get_choices(&state.db, question_id).await?;
    render_detail(&state, &question, &choices, None)
}

pub async fn results(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let question = pollboard_db::questions::get_visible_question(&state.db, question_id, Utc::now())
        .await?
        .ok_or(WebError::NotFound)?;
    let choices = pollboard_db::choices::get_choices(&state.db, question_id).await?;

    let mut ctx = Context::new();
    ctx.insert("question", &question);
    ctx.insert("choices", &choices);
    let html = state.templates.render("polls/results.html", &ctx)?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
}

pub async fn vote(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Form(form): Form<VoteForm>,
) -> Result<Response, WebError> {
    let question = pollboard_db::questions::get_question(&state.db, question_id)
        .await?
        .ok_or(WebError::NotFound)?;

    // A missing field and a non-numeric value both count as "no choice".
    let choice_id = form.choice.as_deref().and_then(|s| s.parse::<i64>().ok());
    let Some(choice_id) = choice_id else {
        return vote_error(&state, &question).await;
    };

    match pollboard_db::choices::record_vote(&state.db, question_id, choice_id).await? {
        Some(_) => Ok(redirect_found(&format!("/{question_id}/results"))),
        None => vote_error(&state, &question).await,
    }
}

/// Re-render the detail form with an error message and no mutation.
async fn vote_error(state: &AppState, question: &Question) -> Result<Response, WebError> {
    let choices = pollboard_db::choices::get_choices(&state.db, question.id).await?;
    let page = render_detail(state, question, &choices, Some("You didn't select a choice."))?;
    Ok(page.into_response())
}

fn render_detail(
    state: &AppState,
    question: &Question,
    choices: &[Choice],
    error_message: Option<&str>,
) -> Result<Html<String>, WebError> {
    let mut ctx = Context::new();
    ctx.insert("question", question);
    ctx.insert("choices", choices);
    if let Some(message) = error_message {
        ctx.insert("error_message", message);
    }
    let html = state.templates.render("polls/detail.html", &ctx)?;
    Ok(Html(html))
}
