//! Dashboard statistics aggregation queries.
//!
//! Every operation is read-only and scoped to one user. Date-bucketed series
//! take the current instant as an explicit parameter so day-boundary behavior
//! is deterministic under test; handlers pass `Utc::now()`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::todo::Priority;

/// Default day window for the activity timeline and completion rate.
pub const DEFAULT_TIMELINE_DAYS: i64 = 7;

/// Upper bound on the timeline window.
pub const MAX_TIMELINE_DAYS: i64 = 365;

/// Combined payload for the dashboard overview endpoint.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub summary: Summary,
    pub priority_breakdown: PriorityBreakdown,
    pub category_breakdown: CategoryBreakdown,
    pub completion_rate: CompletionRate,
    pub overdue_analysis: OverdueAnalysis,
    pub recent_activity: RecentActivity,
}

/// Headline counts for the user's active todos.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_todos: i64,
    pub completed_todos: i64,
    pub pending_todos: i64,
    pub overdue_todos: i64,
    pub due_today: i64,
    pub due_this_week: i64,
    pub completion_percentage: f64,
}

/// Todo counts per priority, missing buckets defaulting to 0.
#[derive(Debug, Serialize)]
pub struct PriorityBreakdown {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
    pub total: i64,
}

/// Overdue counts per priority (same fixed buckets, no total).
#[derive(Debug, Serialize)]
pub struct PriorityCounts {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

/// Per-category and uncategorized completion statistics.
#[derive(Debug, Serialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryStats>,
    pub uncategorized: BucketStats,
}

#[derive(Debug, Serialize)]
pub struct CategoryStats {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub total_todos: i64,
    pub completed_todos: i64,
    pub pending_todos: i64,
    pub completion_percentage: f64,
}

/// Count bucket of the same shape as a category entry, without identity.
#[derive(Debug, Serialize)]
pub struct BucketStats {
    pub total_todos: i64,
    pub completed_todos: i64,
    pub pending_todos: i64,
    pub completion_percentage: f64,
}

/// Completed/created counts for each of the last 7 calendar days.
#[derive(Debug, Serialize)]
pub struct CompletionRate {
    pub last_7_days: Vec<CompletionDay>,
}

#[derive(Debug, Serialize)]
pub struct CompletionDay {
    pub date: String,
    pub day: String,
    pub completed: i64,
    pub created: i64,
}

/// Breakdown of overdue, not-completed todos.
#[derive(Debug, Serialize)]
pub struct OverdueAnalysis {
    pub total_overdue: i64,
    pub by_priority: PriorityCounts,
    pub by_category: BTreeMap<String, i64>,
    pub oldest_overdue: Option<OverdueTodo>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OverdueTodo {
    pub id: Uuid,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Priority,
}

/// Created/completed/deleted counts per calendar day, oldest first.
#[derive(Debug, Serialize)]
pub struct TimelineDay {
    pub date: String,
    pub day: String,
    pub created: i64,
    pub completed: i64,
    pub deleted: i64,
}

/// The five most recently completed and created todos.
#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub recently_completed: Vec<RecentlyCompleted>,
    pub recently_created: Vec<RecentlyCreated>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecentlyCompleted {
    pub id: Uuid,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub priority: Priority,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecentlyCreated {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
}

/// Fetch all dashboard sections in parallel queries.
pub async fn dashboard(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<DashboardStats, AppError> {
    let (summary, priority_breakdown, category_breakdown, completion_rate, overdue_analysis, recent_activity) = tokio::try_join!(
        self::summary(pool, user_id, now),
        self::priority_breakdown(pool, user_id),
        self::category_breakdown(pool, user_id),
        self::completion_rate(pool, user_id, now),
        self::overdue_analysis(pool, user_id),
        self::recent_activity(pool, user_id),
    )?;

    Ok(DashboardStats {
        summary,
        priority_breakdown,
        category_breakdown,
        completion_rate,
        overdue_analysis,
        recent_activity,
    })
}

/// Intermediate row for summary conditional aggregation.
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_todos: i64,
    completed_todos: i64,
    pending_todos: i64,
    overdue_todos: i64,
    due_today: i64,
    due_this_week: i64,
}

/// Headline counts plus due-soon windows and completion percentage.
pub async fn summary(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Summary, AppError> {
    // Conditional aggregation in a single scan over the user's active todos.
    let row = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT
            COUNT(*) AS total_todos,
            COALESCE(SUM(CASE WHEN is_completed THEN 1 ELSE 0 END), 0) AS completed_todos,
            COALESCE(SUM(CASE WHEN NOT is_completed THEN 1 ELSE 0 END), 0) AS pending_todos,
            COALESCE(SUM(CASE WHEN is_overdue THEN 1 ELSE 0 END), 0) AS overdue_todos,
            COALESCE(SUM(CASE WHEN NOT is_completed AND due_date::date = $2 THEN 1 ELSE 0 END), 0) AS due_today,
            COALESCE(SUM(CASE WHEN NOT is_completed AND due_date >= $3 AND due_date <= $4 THEN 1 ELSE 0 END), 0) AS due_this_week
        FROM todos
        WHERE user_id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .bind(now.date_naive())
    .bind(now)
    .bind(end_of_week(now))
    .fetch_one(pool)
    .await?;

    Ok(Summary {
        completion_percentage: completion_percentage(row.completed_todos, row.total_todos),
        total_todos: row.total_todos,
        completed_todos: row.completed_todos,
        pending_todos: row.pending_todos,
        overdue_todos: row.overdue_todos,
        due_today: row.due_today,
        due_this_week: row.due_this_week,
    })
}

/// Intermediate row for priority conditional aggregation.
#[derive(Debug, sqlx::FromRow)]
struct PriorityRow {
    high: i64,
    medium: i64,
    low: i64,
    total: i64,
}

/// Count active todos per priority, buckets defaulting to 0.
pub async fn priority_breakdown(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<PriorityBreakdown, AppError> {
    let row = sqlx::query_as::<_, PriorityRow>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN priority = 'high'   THEN 1 ELSE 0 END), 0) AS high,
            COALESCE(SUM(CASE WHEN priority = 'medium' THEN 1 ELSE 0 END), 0) AS medium,
            COALESCE(SUM(CASE WHEN priority = 'low'    THEN 1 ELSE 0 END), 0) AS low,
            COUNT(*) AS total
        FROM todos
        WHERE user_id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(PriorityBreakdown {
        high: row.high,
        medium: row.medium,
        low: row.low,
        total: row.total,
    })
}

/// Intermediate row for per-category aggregation.
#[derive(Debug, sqlx::FromRow)]
struct CategoryStatsRow {
    id: Uuid,
    name: String,
    color: String,
    total_todos: i64,
    completed_todos: i64,
}

/// Intermediate row for two-count buckets.
#[derive(Debug, sqlx::FromRow)]
struct BucketRow {
    total_todos: i64,
    completed_todos: i64,
}

/// Per-category counts plus the uncategorized bucket.
pub async fn category_breakdown(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<CategoryBreakdown, AppError> {
    let rows = sqlx::query_as::<_, CategoryStatsRow>(
        r#"
        SELECT
            c.id,
            c.name,
            c.color,
            COUNT(t.id) AS total_todos,
            COALESCE(SUM(CASE WHEN t.is_completed THEN 1 ELSE 0 END), 0) AS completed_todos
        FROM categories c
        LEFT JOIN todos t ON t.category_id = c.id AND t.deleted_at IS NULL
        WHERE c.user_id = $1
        GROUP BY c.id, c.name, c.color
        ORDER BY c.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let categories = rows
        .into_iter()
        .map(|r| CategoryStats {
            completion_percentage: completion_percentage(r.completed_todos, r.total_todos),
            pending_todos: r.total_todos - r.completed_todos,
            id: r.id,
            name: r.name,
            color: r.color,
            total_todos: r.total_todos,
            completed_todos: r.completed_todos,
        })
        .collect();

    let bucket = sqlx::query_as::<_, BucketRow>(
        r#"
        SELECT
            COUNT(*) AS total_todos,
            COALESCE(SUM(CASE WHEN is_completed THEN 1 ELSE 0 END), 0) AS completed_todos
        FROM todos
        WHERE user_id = $1 AND category_id IS NULL AND deleted_at IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(CategoryBreakdown {
        categories,
        uncategorized: BucketStats {
            completion_percentage: completion_percentage(bucket.completed_todos, bucket.total_todos),
            pending_todos: bucket.total_todos - bucket.completed_todos,
            total_todos: bucket.total_todos,
            completed_todos: bucket.completed_todos,
        },
    })
}

/// Completed and created counts for each of the last 7 days, oldest first.
pub async fn completion_rate(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CompletionRate, AppError> {
    let dates = window_dates(now, DEFAULT_TIMELINE_DAYS);
    let start = dates[0];

    let (completed, created) = tokio::try_join!(
        day_counts(
            pool,
            "SELECT updated_at::date AS day, COUNT(*) AS count
             FROM todos
             WHERE user_id = $1 AND deleted_at IS NULL AND is_completed AND updated_at::date >= $2
             GROUP BY day",
            user_id,
            start,
        ),
        day_counts(
            pool,
            "SELECT created_at::date AS day, COUNT(*) AS count
             FROM todos
             WHERE user_id = $1 AND deleted_at IS NULL AND created_at::date >= $2
             GROUP BY day",
            user_id,
            start,
        ),
    )?;

    let last_7_days = dates
        .iter()
        .map(|d| CompletionDay {
            date: d.format("%Y-%m-%d").to_string(),
            day: d.format("%a").to_string(),
            completed: completed.get(d).copied().unwrap_or(0),
            created: created.get(d).copied().unwrap_or(0),
        })
        .collect();

    Ok(CompletionRate { last_7_days })
}

/// Intermediate row for name -> count groupings.
#[derive(Debug, sqlx::FromRow)]
struct NameCountRow {
    name: String,
    count: i64,
}

/// Intermediate row for overdue conditional aggregation.
#[derive(Debug, sqlx::FromRow)]
struct OverdueRow {
    total_overdue: i64,
    high: i64,
    medium: i64,
    low: i64,
}

/// Breakdown of overdue, not-completed todos by priority and category.
pub async fn overdue_analysis(pool: &PgPool, user_id: Uuid) -> Result<OverdueAnalysis, AppError> {
    let counts = sqlx::query_as::<_, OverdueRow>(
        r#"
        SELECT
            COUNT(*) AS total_overdue,
            COALESCE(SUM(CASE WHEN priority = 'high'   THEN 1 ELSE 0 END), 0) AS high,
            COALESCE(SUM(CASE WHEN priority = 'medium' THEN 1 ELSE 0 END), 0) AS medium,
            COALESCE(SUM(CASE WHEN priority = 'low'    THEN 1 ELSE 0 END), 0) AS low
        FROM todos
        WHERE user_id = $1 AND deleted_at IS NULL AND is_overdue AND NOT is_completed
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    // Uncategorized overdue todos count toward the total but are absent here.
    let by_category_rows = sqlx::query_as::<_, NameCountRow>(
        r#"
        SELECT c.name, COUNT(*) AS count
        FROM todos t
        INNER JOIN categories c ON c.id = t.category_id
        WHERE t.user_id = $1 AND t.deleted_at IS NULL AND t.is_overdue AND NOT t.is_completed
        GROUP BY c.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let oldest_overdue = sqlx::query_as::<_, OverdueTodo>(
        r#"
        SELECT id, title, due_date, priority
        FROM todos
        WHERE user_id = $1 AND deleted_at IS NULL AND is_overdue AND NOT is_completed
        ORDER BY due_date ASC NULLS LAST
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(OverdueAnalysis {
        total_overdue: counts.total_overdue,
        by_priority: PriorityCounts {
            high: counts.high,
            medium: counts.medium,
            low: counts.low,
        },
        by_category: by_category_rows
            .into_iter()
            .map(|r| (r.name, r.count))
            .collect(),
        oldest_overdue,
    })
}

/// Created/completed/deleted counts for each of the last `days` days.
pub async fn activity_timeline(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
    days: i64,
) -> Result<Vec<TimelineDay>, AppError> {
    validate_timeline_days(days)?;

    let dates = window_dates(now, days);
    let start = dates[0];

    let (created, completed, deleted) = tokio::try_join!(
        day_counts(
            pool,
            "SELECT created_at::date AS day, COUNT(*) AS count
             FROM todos
             WHERE user_id = $1 AND deleted_at IS NULL AND created_at::date >= $2
             GROUP BY day",
            user_id,
            start,
        ),
        day_counts(
            pool,
            "SELECT updated_at::date AS day, COUNT(*) AS count
             FROM todos
             WHERE user_id = $1 AND deleted_at IS NULL AND is_completed AND updated_at::date >= $2
             GROUP BY day",
            user_id,
            start,
        ),
        day_counts(
            pool,
            "SELECT deleted_at::date AS day, COUNT(*) AS count
             FROM todos
             WHERE user_id = $1 AND deleted_at IS NOT NULL AND deleted_at::date >= $2
             GROUP BY day",
            user_id,
            start,
        ),
    )?;

    Ok(dates
        .iter()
        .map(|d| TimelineDay {
            date: d.format("%Y-%m-%d").to_string(),
            day: d.format("%A").to_string(),
            created: created.get(d).copied().unwrap_or(0),
            completed: completed.get(d).copied().unwrap_or(0),
            deleted: deleted.get(d).copied().unwrap_or(0),
        })
        .collect())
}

/// The 5 most recently completed and 5 most recently created todos.
pub async fn recent_activity(pool: &PgPool, user_id: Uuid) -> Result<RecentActivity, AppError> {
    let recently_completed = sqlx::query_as::<_, RecentlyCompleted>(
        r#"
        SELECT id, title, updated_at, priority
        FROM todos
        WHERE user_id = $1 AND deleted_at IS NULL AND is_completed
        ORDER BY updated_at DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let recently_created = sqlx::query_as::<_, RecentlyCreated>(
        r#"
        SELECT id, title, created_at, priority
        FROM todos
        WHERE user_id = $1 AND deleted_at IS NULL
        ORDER BY created_at DESC
        LIMIT 5
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(RecentActivity {
        recently_completed,
        recently_created,
    })
}

/// Intermediate row for day-bucketed counts.
#[derive(Debug, sqlx::FromRow)]
struct DayCountRow {
    day: NaiveDate,
    count: i64,
}

/// Run a day-grouped count query and collect rows into a date -> count map.
///
/// Buckets with no rows are simply absent; callers merge against a
/// pre-initialized date window so missing days read as 0.
async fn day_counts(
    pool: &PgPool,
    sql: &str,
    user_id: Uuid,
    start: NaiveDate,
) -> Result<HashMap<NaiveDate, i64>, AppError> {
    let rows = sqlx::query_as::<_, DayCountRow>(sql)
        .bind(user_id)
        .bind(start)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| (r.day, r.count)).collect())
}

/// The last `days` calendar days including today, oldest first.
fn window_dates(now: DateTime<Utc>, days: i64) -> Vec<NaiveDate> {
    let today = now.date_naive();
    (0..days).rev().map(|i| today - Duration::days(i)).collect()
}

/// End of the current ISO week: Sunday 23:59:59.
pub(crate) fn end_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let days_to_sunday = 7 - i64::from(today.weekday().number_from_monday());
    let sunday = today + Duration::days(days_to_sunday);
    sunday.and_hms_opt(23, 59, 59).unwrap().and_utc()
}

/// completed/total as a percentage rounded to 2 decimals; 0 when total is 0.
fn completion_percentage(completed: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

fn validate_timeline_days(days: i64) -> Result<(), AppError> {
    if !(1..=MAX_TIMELINE_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {MAX_TIMELINE_DAYS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn percentage_zero_guard() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(5, 0), 0.0);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(completion_percentage(5, 10), 50.0);
        assert_eq!(completion_percentage(1, 3), 33.33);
        assert_eq!(completion_percentage(2, 3), 66.67);
    }

    #[test]
    fn window_has_exactly_n_days_oldest_first() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 15, 30, 0).unwrap();
        let dates = window_dates(now, 7);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
    }

    #[test]
    fn window_single_day_is_today() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 1).unwrap();
        let dates = window_dates(now, 1);
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()]);
    }

    #[test]
    fn end_of_week_is_sunday_night() {
        // 2025-06-10 is a Tuesday; the week ends Sunday 2025-06-15.
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
        let eow = end_of_week(now);
        assert_eq!(eow, Utc.with_ymd_and_hms(2025, 6, 15, 23, 59, 59).unwrap());
    }

    #[test]
    fn end_of_week_on_sunday_is_same_day() {
        // 2025-06-15 is a Sunday.
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
        let eow = end_of_week(now);
        assert_eq!(eow, Utc.with_ymd_and_hms(2025, 6, 15, 23, 59, 59).unwrap());
    }

    #[test]
    fn timeline_days_bounds() {
        assert!(validate_timeline_days(1).is_ok());
        assert!(validate_timeline_days(DEFAULT_TIMELINE_DAYS).is_ok());
        assert!(validate_timeline_days(MAX_TIMELINE_DAYS).is_ok());
        assert!(validate_timeline_days(0).is_err());
        assert!(validate_timeline_days(-3).is_err());
        assert!(validate_timeline_days(MAX_TIMELINE_DAYS + 1).is_err());
    }

    #[test]
    fn day_labels_match_calendar() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let dates = window_dates(now, 2);
        // 2025-06-09 Monday, 2025-06-10 Tuesday
        assert_eq!(dates[0].format("%a").to_string(), "Mon");
        assert_eq!(dates[1].format("%A").to_string(), "Tuesday");
    }

    #[test]
    fn overdue_analysis_serializes_absent_oldest_as_null() {
        let analysis = OverdueAnalysis {
            total_overdue: 0,
            by_priority: PriorityCounts {
                high: 0,
                medium: 0,
                low: 0,
            },
            by_category: BTreeMap::new(),
            oldest_overdue: None,
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["oldest_overdue"].is_null());
        assert_eq!(json["by_priority"]["high"], 0);
        assert_eq!(json["by_category"], serde_json::json!({}));
    }
}
