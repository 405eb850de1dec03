use crate::{DbError, DbPool};
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use pollboard_models::Question;

/// Admin list sidebar filter over `pub_date`. All windows end at `now`,
/// so future-dated questions never match a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    PastWeek,
    ThisMonth,
    ThisYear,
}

impl DateFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(DateFilter::Today),
            "week" => Some(DateFilter::PastWeek),
            "month" => Some(DateFilter::ThisMonth),
            "year" => Some(DateFilter::ThisYear),
            _ => None,
        }
    }

    fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        match self {
            DateFilter::Today => today.and_time(NaiveTime::MIN).and_utc(),
            DateFilter::PastWeek => now - Duration::days(7),
            DateFilter::ThisMonth => today
                .with_day(1)
                .unwrap_or(today)
                .and_time(NaiveTime::MIN)
                .and_utc(),
            DateFilter::ThisYear => today
                .with_month(1)
                .and_then(|d| d.with_day(1))
                .unwrap_or(today)
                .and_time(NaiveTime::MIN)
                .and_utc(),
        }
    }
}

pub async fn create_question(
    pool: &DbPool,
    question_text: &str,
    pub_date: DateTime<Utc>,
) -> Result<Question, DbError> {
    let question = sqlx::query_as::<_, Question>(
        "INSERT INTO questions (question_text, pub_date) VALUES (?1, ?2)
         RETURNING id, question_text, pub_date",
    )
    .bind(question_text)
    .bind(pub_date)
    .fetch_one(pool)
    .await?;
    Ok(question)
}

pub async fn get_question(pool: &DbPool, id: i64) -> Result<Option<Question>, DbError> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, pub_date FROM questions WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(question)
}

/// Fetch a question for public display: published no later than `now`
/// and with at least one choice to vote on.
pub async fn get_visible_question(
    pool: &DbPool,
    id: i64,
    now: DateTime<Utc>,
) -> Result<Option<Question>, DbError> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT q.id, q.question_text, q.pub_date
         FROM questions q
         WHERE q.id = ?1
           AND q.pub_date <= ?2
           AND EXISTS (SELECT 1 FROM choices c WHERE c.question_id = q.id)",
    )
    .bind(id)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    Ok(question)
}

/// The public index listing: visible questions, newest first.
pub async fn latest_questions(
    pool: &DbPool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Question>, DbError> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT q.id, q.question_text, q.pub_date
         FROM questions q
         WHERE q.pub_date <= ?1
           AND EXISTS (SELECT 1 FROM choices c WHERE c.question_id = q.id)
         ORDER BY q.pub_date DESC
         LIMIT ?2",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

/// The admin listing: every question, optionally narrowed by a substring
/// search over the text and a publication-date window.
pub async fn list_questions(
    pool: &DbPool,
    search: Option<&str>,
    filter: Option<DateFilter>,
    now: DateTime<Utc>,
) -> Result<Vec<Question>, DbError> {
    let window_start = filter.map(|f| f.start(now));
    let window_end = filter.map(|_| now);
    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, question_text, pub_date
         FROM questions
         WHERE (?1 IS NULL OR instr(lower(question_text), lower(?1)) > 0)
           AND (?2 IS NULL OR (pub_date >= ?2 AND pub_date <= ?3))
         ORDER BY pub_date DESC",
    )
    .bind(search)
    .bind(window_start)
    .bind(window_end)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn update_question(
    pool: &DbPool,
    id: i64,
    question_text: &str,
    pub_date: DateTime<Utc>,
) -> Result<Option<Question>, DbError> {
    let question = sqlx::query_as::<_, Question>(
        "UPDATE questions SET question_text = ?2, pub_date = ?3 WHERE id = ?1
         RETURNING id, question_text, pub_date",
    )
    .bind(id)
    .bind(question_text)
    .bind(pub_date)
    .fetch_optional(pool)
    .await?;
    Ok(question)
}

/// Delete a question; associated choices go with it via the FK cascade.
pub async fn delete_question(pool: &DbPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn test_pool() -> DbPool {
        let pool = crate::create_pool("sqlite::memory:", 1).await.unwrap();
        crate::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn question_with_offset(pool: &DbPool, text: &str, offset: Duration) -> Question {
        create_question(pool, text, Utc::now() + offset).await.unwrap()
    }

    async fn add_choice(pool: &DbPool, question_id: i64) {
        crate::choices::create_choice(pool, question_id, "A choice")
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get_question() {
        let pool = test_pool().await;
        let created = question_with_offset(&pool, "What's new?", Duration::zero()).await;
        let fetched = get_question(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.question_text, "What's new?");
        assert_eq!(fetched.pub_date, created.pub_date);
    }

    #[tokio::test]
    async fn test_get_question_not_found() {
        let pool = test_pool().await;
        assert!(get_question(&pool, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visible_question_requires_past_pub_date() {
        let pool = test_pool().await;
        let future = question_with_offset(&pool, "Future", Duration::days(20)).await;
        add_choice(&pool, future.id).await;
        let visible = get_visible_question(&pool, future.id, Utc::now()).await.unwrap();
        assert!(visible.is_none());
    }

    #[tokio::test]
    async fn test_visible_question_requires_a_choice() {
        let pool = test_pool().await;
        let question = question_with_offset(&pool, "No choices", -Duration::days(1)).await;
        let visible = get_visible_question(&pool, question.id, Utc::now()).await.unwrap();
        assert!(visible.is_none());

        add_choice(&pool, question.id).await;
        let visible = get_visible_question(&pool, question.id, Utc::now()).await.unwrap();
        assert!(visible.is_some());
    }

    #[tokio::test]
    async fn test_latest_questions_excludes_future_and_choiceless() {
        let pool = test_pool().await;
        let past = question_with_offset(&pool, "Past", -Duration::days(2)).await;
        add_choice(&pool, past.id).await;
        let future = question_with_offset(&pool, "Future", Duration::days(20)).await;
        add_choice(&pool, future.id).await;
        question_with_offset(&pool, "Choiceless", -Duration::days(1)).await;

        let latest = latest_questions(&pool, Utc::now(), 5).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, past.id);
    }

    #[tokio::test]
    async fn test_latest_questions_ordered_newest_first_with_limit() {
        let pool = test_pool().await;
        for days_ago in 1..=6 {
            let q = question_with_offset(
                &pool,
                &format!("Question {days_ago}"),
                -Duration::days(days_ago),
            )
            .await;
            add_choice(&pool, q.id).await;
        }

        let latest = latest_questions(&pool, Utc::now(), 5).await.unwrap();
        assert_eq!(latest.len(), 5);
        let texts: Vec<_> = latest.iter().map(|q| q.question_text.as_str()).collect();
        assert_eq!(
            texts,
            ["Question 1", "Question 2", "Question 3", "Question 4", "Question 5"]
        );
    }

    #[tokio::test]
    async fn test_list_questions_search_is_case_insensitive() {
        let pool = test_pool().await;
        question_with_offset(&pool, "Favourite colour?", -Duration::days(1)).await;
        question_with_offset(&pool, "Best meal?", -Duration::days(2)).await;

        let hits = list_questions(&pool, Some("COLOUR"), None, Utc::now()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].question_text, "Favourite colour?");
    }

    #[tokio::test]
    async fn test_list_questions_date_window() {
        let pool = test_pool().await;
        question_with_offset(&pool, "Recent", -Duration::days(2)).await;
        question_with_offset(&pool, "Old", -Duration::days(30)).await;
        question_with_offset(&pool, "Future", Duration::days(5)).await;

        let this_week = list_questions(&pool, None, Some(DateFilter::PastWeek), Utc::now())
            .await
            .unwrap();
        assert_eq!(this_week.len(), 1);
        assert_eq!(this_week[0].question_text, "Recent");

        let all = list_questions(&pool, None, None, Utc::now()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update_question() {
        let pool = test_pool().await;
        let question = question_with_offset(&pool, "Old text", Duration::zero()).await;
        let new_date = Utc::now() - Duration::days(3);
        let updated = update_question(&pool, question.id, "New text", new_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.question_text, "New text");
        assert_eq!(updated.pub_date, new_date);
    }

    #[tokio::test]
    async fn test_update_missing_question() {
        let pool = test_pool().await;
        let updated = update_question(&pool, 42, "text", Utc::now()).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_question_cascades_to_choices() {
        let pool = test_pool().await;
        let question = question_with_offset(&pool, "Doomed", Duration::zero()).await;
        add_choice(&pool, question.id).await;
        add_choice(&pool, question.id).await;

        delete_question(&pool, question.id).await.unwrap();
        assert!(get_question(&pool, question.id).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM choices WHERE question_id = ?1")
            .bind(question.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_question() {
        let pool = test_pool().await;
        let err = delete_question(&pool, 42).await.expect_err("must not exist");
        assert!(matches!(err, DbError::NotFound));
    }

    #[test]
    fn date_filter_parses_known_values() {
        assert_eq!(DateFilter::parse("today"), Some(DateFilter::Today));
        assert_eq!(DateFilter::parse("week"), Some(DateFilter::PastWeek));
        assert_eq!(DateFilter::parse("month"), Some(DateFilter::ThisMonth));
        assert_eq!(DateFilter::parse("year"), Some(DateFilter::ThisYear));
        assert_eq!(DateFilter::parse("fortnight"), None);
    }

    #[test]
    fn date_filter_windows_start_before_now() {
        let now = Utc::now();
        for filter in [
            DateFilter::Today,
            DateFilter::PastWeek,
            DateFilter::ThisMonth,
            DateFilter::ThisYear,
        ] {
            assert!(filter.start(now) <= now, "{filter:?} starts after now");
        }
    }
}
