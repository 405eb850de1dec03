use crate::{DbError, DbPool};
use pollboard_models::Choice;

/// Insert a choice under an existing question. Returns None when the
/// question does not exist.
pub async fn create_choice(
    pool: &DbPool,
    question_id: i64,
    choice_text: &str,
) -> Result<Option<Choice>, DbError> {
    let choice = sqlx::query_as::<_, Choice>(
        "INSERT INTO choices (question_id, choice_text)
         SELECT ?1, ?2
         WHERE EXISTS (SELECT 1 FROM questions WHERE id = ?1)
         RETURNING id, question_id, choice_text, votes",
    )
    .bind(question_id)
    .bind(choice_text)
    .fetch_optional(pool)
    .await?;
    Ok(choice)
}

pub async fn get_choices(pool: &DbPool, question_id: i64) -> Result<Vec<Choice>, DbError> {
    let choices = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes
         FROM choices WHERE question_id = ?1
         ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;
    Ok(choices)
}

pub async fn get_choice(
    pool: &DbPool,
    question_id: i64,
    choice_id: i64,
) -> Result<Option<Choice>, DbError> {
    let choice = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, choice_text, votes
         FROM choices WHERE id = ?2 AND question_id = ?1",
    )
    .bind(question_id)
    .bind(choice_id)
    .fetch_optional(pool)
    .await?;
    Ok(choice)
}

/// Atomically add one vote to a choice belonging to the given question.
/// Returns None when the choice does not exist under that question, in
/// which case nothing was mutated.
pub async fn record_vote(
    pool: &DbPool,
    question_id: i64,
    choice_id: i64,
) -> Result<Option<Choice>, DbError> {
    let choice = sqlx::query_as::<_, Choice>(
        "UPDATE choices
         SET votes = votes + 1
         WHERE id = ?2 AND question_id = ?1
         RETURNING id, question_id, choice_text, votes",
    )
    .bind(question_id)
    .bind(choice_id)
    .fetch_optional(pool)
    .await?;
    Ok(choice)
}

pub async fn update_choice(
    pool: &DbPool,
    question_id: i64,
    choice_id: i64,
    choice_text: &str,
) -> Result<Option<Choice>, DbError> {
    let choice = sqlx::query_as::<_, Choice>(
        "UPDATE choices SET choice_text = ?3
         WHERE id = ?2 AND question_id = ?1
         RETURNING id, question_id, choice_text, votes",
    )
    .bind(question_id)
    .bind(choice_id)
    .bind(choice_text)
    .fetch_optional(pool)
    .await?;
    Ok(choice)
}

pub async fn delete_choice(
    pool: &DbPool,
    question_id: i64,
    choice_id: i64,
) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM choices WHERE id = ?2 AND question_id = ?1")
        .bind(question_id)
        .bind(choice_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
