use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Form;
use chrono::{DateTime, NaiveDateTime, Utc};
use pollboard_db::questions::DateFilter;
use pollboard_models::{Choice, Question, TEXT_MAX_LEN};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::error::WebError;
use crate::routes::redirect_found;
use crate::state::AppState;

/// Number of blank inline choice rows on the add/change forms.
const EXTRA_CHOICE_ROWS: usize = 3;

const ADMIN_LIST_PATH: &str = "/admin/questions";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub published: Option<String>,
}

#[derive(Serialize)]
struct QuestionListRow {
    question: Question,
    published_recently: bool,
}

pub async fn question_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, WebError> {
    let search = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let filter = params.published.as_deref().and_then(DateFilter::parse);

    let questions =
        pollboard_db::questions::list_questions(&state.db, search, filter, Utc::now()).await?;
    let rows: Vec<QuestionListRow> = questions
        .into_iter()
        .map(|question| QuestionListRow {
            published_recently: question.was_published_recently(),
            question,
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("questions", &rows);
    ctx.insert("search", search.unwrap_or(""));
    ctx.insert("published", params.published.as_deref().unwrap_or(""));
    let html = state.templates.render("admin/question_list.html", &ctx)?;
    Ok(Html(html))
}

/// The add/change form. Existing choice rows carry their id in a hidden
/// field; rows named `new_choice_text` create choices when filled in.
#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    pub question_text: String,
    pub pub_date: String,
    #[serde(default)]
    pub choice_id: Vec<i64>,
    #[serde(default)]
    pub choice_text: Vec<String>,
    #[serde(default)]
    pub new_choice_text: Vec<String>,
}

pub async fn new_question_form(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    render_question_form(
        &state,
        None,
        &[],
        "",
        &format_pub_date(Utc::now()),
        None,
    )
}

pub async fn create_question(
    State(state): State<AppState>,
    Form(form): Form<QuestionForm>,
) -> Result<Response, WebError> {
    let parsed = match validate_form(&form) {
        Ok(parsed) => parsed,
        Err(message) => {
            let page = render_question_form(
                &state,
                None,
                &[],
                &form.question_text,
                &form.pub_date,
                Some(&message),
            )?;
            return Ok(page.into_response());
        }
    };

    let question =
        pollboard_db::questions::create_question(&state.db, &parsed.question_text, parsed.pub_date)
            .await?;
    for text in &parsed.new_choices {
        pollboard_db::choices::create_choice(&state.db, question.id, text).await?;
    }
    tracing::info!(question_id = question.id, "admin: question created");
    Ok(redirect_found(ADMIN_LIST_PATH))
}

pub async fn edit_question_form(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Html<String>, WebError> {
    let question = pollboard_db::questions::get_question(&state.db, question_id)
        .await?
        .ok_or(WebError::NotFound)?;
    let choices = pollboard_db::choices::get_choices(&state.db, question_id).await?;
    let pub_date_value = format_pub_date(question.pub_date);
    let question_text = question.question_text.clone();
    render_question_form(
        &state,
        Some(&question),
        &choices,
        &question_text,
        &pub_date_value,
        None,
    )
}

pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    Form(form): Form<QuestionForm>,
) -> Result<Response, WebError> {
    let question = pollboard_db::questions::get_question(&state.db, question_id)
        .await?
        .ok_or(WebError::NotFound)?;

    let parsed = match validate_form(&form) {
        Ok(parsed) => parsed,
        Err(message) => {
            let choices = pollboard_db::choices::get_choices(&state.db, question_id).await?;
            let page = render_question_form(
                &state,
                Some(&question),
                &choices,
                &form.question_text,
                &form.pub_date,
                Some(&message),
            )?;
            return Ok(page.into_response());
        }
    };

    pollboard_db::questions::update_question(
        &state.db,
        question_id,
        &parsed.question_text,
        parsed.pub_date,
    )
    .await?;

    // Inline rows: a blanked-out existing choice is deleted, others are
    // updated in place.
    for (choice_id, text) in form.choice_id.iter().zip(form.choice_text.iter()) {
        let text = text.trim();
        if text.is_empty() {
            pollboard_db::choices::delete_choice(&state.db, question_id, *choice_id).await?;
        } else {
            pollboard_db::choices::update_choice(&state.db, question_id, *choice_id, text).await?;
        }
    }
    for text in &parsed.new_choices {
        pollboard_db::choices::create_choice(&state.db, question_id, text).await?;
    }

    tracing::info!(question_id, "admin: question updated");
    Ok(redirect_found(ADMIN_LIST_PATH))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Response, WebError> {
    pollboard_db::questions::delete_question(&state.db, question_id).await?;
    tracing::info!(question_id, "admin: question deleted");
    Ok(redirect_found(ADMIN_LIST_PATH))
}

struct ParsedForm {
    question_text: String,
    pub_date: DateTime<Utc>,
    new_choices: Vec<String>,
}

fn validate_form(form: &QuestionForm) -> Result<ParsedForm, String> {
    let question_text = form.question_text.trim();
    if question_text.is_empty() {
        return Err("Question text is required.".to_string());
    }
    if question_text.chars().count() > TEXT_MAX_LEN {
        return Err(format!(
            "Question text must be at most {TEXT_MAX_LEN} characters."
        ));
    }

    let Some(pub_date) = parse_pub_date(&form.pub_date) else {
        return Err("Date published must be a valid date and time.".to_string());
    };

    let mut new_choices = Vec::new();
    for text in form.new_choice_text.iter().chain(form.choice_text.iter()) {
        if text.trim().chars().count() > TEXT_MAX_LEN {
            return Err(format!(
                "Choice text must be at most {TEXT_MAX_LEN} characters."
            ));
        }
    }
    for text in &form.new_choice_text {
        let text = text.trim();
        if !text.is_empty() {
            new_choices.push(text.to_string());
        }
    }

    Ok(ParsedForm {
        question_text: question_text.to_string(),
        pub_date,
        new_choices,
    })
}

/// Accepts the browser's `datetime-local` format, with or without
/// seconds, and RFC 3339 as a fallback.
fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format_pub_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}

fn render_question_form(
    state: &AppState,
    question: Option<&Question>,
    choices: &[Choice],
    question_text: &str,
    pub_date_value: &str,
    error_message: Option<&str>,
) -> Result<Html<String>, WebError> {
    let mut ctx = Context::new();
    if let Some(question) = question {
        ctx.insert("question", question);
    }
    ctx.insert("choices", choices);
    ctx.insert("question_text", question_text);
    ctx.insert("pub_date_value", pub_date_value);
    ctx.insert("extra_rows", &EXTRA_CHOICE_ROWS);
    if let Some(message) = error_message {
        ctx.insert("error_message", message);
    }
    let html = state.templates.render("admin/question_form.html", &ctx)?;
    Ok(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parse_pub_date_accepts_datetime_local() {
        let parsed = parse_pub_date("2024-06-01T09:30").expect("parses");
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn parse_pub_date_accepts_rfc3339() {
        let parsed = parse_pub_date("2024-06-01T09:30:00+02:00").expect("parses");
        assert_eq!(parsed.hour(), 7);
    }

    #[test]
    fn parse_pub_date_rejects_garbage() {
        assert!(parse_pub_date("soon").is_none());
        assert!(parse_pub_date("").is_none());
    }

    #[test]
    fn format_then_parse_round_trips() {
        let now = Utc::now();
        let parsed = parse_pub_date(&format_pub_date(now)).expect("parses");
        assert_eq!(parsed.date_naive(), now.date_naive());
        assert_eq!(parsed.hour(), now.hour());
        assert_eq!(parsed.minute(), now.minute());
    }

    fn form(question_text: &str, pub_date: &str) -> QuestionForm {
        QuestionForm {
            question_text: question_text.to_string(),
            pub_date: pub_date.to_string(),
            choice_id: Vec::new(),
            choice_text: Vec::new(),
            new_choice_text: vec!["Yes".to_string(), "  ".to_string(), "No".to_string()],
        }
    }

    #[test]
    fn validate_form_collects_non_empty_new_choices() {
        let parsed = validate_form(&form("A question?", "2024-06-01T09:30")).expect("valid");
        assert_eq!(parsed.new_choices, ["Yes", "No"]);
    }

    #[test]
    fn validate_form_rejects_blank_question() {
        assert!(validate_form(&form("   ", "2024-06-01T09:30")).is_err());
    }

    #[test]
    fn validate_form_rejects_overlong_text() {
        let long = "x".repeat(TEXT_MAX_LEN + 1);
        assert!(validate_form(&form(&long, "2024-06-01T09:30")).is_err());
    }

    #[test]
    fn validate_form_rejects_bad_date() {
        assert!(validate_form(&form("A question?", "someday")).is_err());
    }
}
