//! Todo service: CRUD, filtered listing, soft-delete lifecycle, and export.
//!
//! Every query is scoped by user_id. Soft-delete visibility is explicit per
//! function: listing/reading goes through active-only queries, `list_trashed`
//! reads tombstoned rows, and `force_delete` touches both.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pagination::{Paged, Pagination};
use crate::models::todo::{
    CreateTodo, DueFilter, StatusFilter, TodoFilters, TodoWithCategory, UpdateTodo,
};
use crate::services::stats::end_of_week;

/// Shared projection joining each todo with its category, if any.
const TODO_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.priority, t.due_date,
           t.is_completed, t.is_overdue, t.category_id,
           c.name AS category_name, c.color AS category_color,
           t.created_at, t.updated_at, t.deleted_at
    FROM todos t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

/// List active todos with filters and pagination.
pub async fn list(
    pool: &PgPool,
    user_id: Uuid,
    filters: &TodoFilters,
    pagination: &Pagination,
    now: DateTime<Utc>,
) -> Result<Paged<TodoWithCategory>, AppError> {
    let mut conditions: Vec<String> =
        vec!["t.user_id = $1".to_string(), "t.deleted_at IS NULL".to_string()];
    let mut param_index = 1u32;

    // Build dynamic WHERE clauses
    if filters.search.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(t.title ILIKE ${param_index} OR t.description ILIKE ${param_index})"
        ));
    }
    match filters.status {
        Some(StatusFilter::Completed) => conditions.push("t.is_completed = true".to_string()),
        Some(StatusFilter::Pending) => conditions.push("t.is_completed = false".to_string()),
        Some(StatusFilter::All) | None => {}
    }
    if filters.priority.is_some() {
        param_index += 1;
        conditions.push(format!("t.priority = ${param_index}"));
    }
    if filters.category_id.is_some() {
        param_index += 1;
        conditions.push(format!("t.category_id = ${param_index}"));
    }
    match filters.due {
        Some(DueFilter::Today) => {
            param_index += 1;
            conditions.push(format!("t.due_date::date = ${param_index}"));
        }
        Some(DueFilter::Week) => {
            param_index += 1;
            let start = param_index;
            param_index += 1;
            conditions.push(format!(
                "t.due_date >= ${start} AND t.due_date <= ${param_index}"
            ));
        }
        Some(DueFilter::Overdue) => {
            conditions.push("t.is_overdue = true AND t.is_completed = false".to_string());
        }
        Some(DueFilter::Upcoming) => {
            param_index += 1;
            conditions.push(format!(
                "t.due_date > ${param_index} AND t.is_completed = false"
            ));
        }
        None => {}
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM todos t {where_clause}");
    let data_sql = format!(
        "{TODO_SELECT} {where_clause} \
         ORDER BY t.is_completed ASC, t.priority DESC, t.due_date ASC, t.created_at DESC \
         LIMIT {} OFFSET {}",
        pagination.limit(),
        pagination.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, TodoWithCategory>(&data_sql);

    // Bind parameters in the same order for both queries
    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    bind_both!(user_id);
    if let Some(ref search) = filters.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }
    if let Some(priority) = filters.priority {
        bind_both!(priority);
    }
    if let Some(category_id) = filters.category_id {
        bind_both!(category_id);
    }
    match filters.due {
        Some(DueFilter::Today) => {
            bind_both!(now.date_naive());
        }
        Some(DueFilter::Week) => {
            let eow = end_of_week(now);
            bind_both!(now);
            bind_both!(eow);
        }
        Some(DueFilter::Upcoming) => {
            bind_both!(now);
        }
        Some(DueFilter::Overdue) | None => {}
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(Paged::new(items, total, pagination))
}

/// Create a new todo for the user.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: &CreateTodo,
    now: DateTime<Utc>,
) -> Result<TodoWithCategory, AppError> {
    validate_due_date(input.due_date, now)?;
    if let Some(category_id) = input.category_id {
        ensure_category_owned(pool, user_id, category_id).await?;
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO todos (title, description, priority, due_date, category_id, user_id, created_at, updated_at)
        VALUES ($1, $2, COALESCE($3, 'medium'), $4, $5, $6, $7, $7)
        RETURNING id
        "#,
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.priority)
    .bind(input.due_date)
    .bind(input.category_id)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, user_id, id).await
}

/// Find an active todo by ID.
pub async fn find_by_id(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<TodoWithCategory, AppError> {
    let sql = format!("{TODO_SELECT} WHERE t.id = $1 AND t.user_id = $2 AND t.deleted_at IS NULL");
    sqlx::query_as::<_, TodoWithCategory>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))
}

/// Update an active todo, then recompute its overdue flag.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateTodo,
    now: DateTime<Utc>,
) -> Result<TodoWithCategory, AppError> {
    // Verify the todo exists and belongs to the user
    find_by_id(pool, user_id, id).await?;

    if let Some(category_id) = input.category_id {
        ensure_category_owned(pool, user_id, category_id).await?;
    }

    sqlx::query(
        r#"
        UPDATE todos SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            priority = COALESCE($4, priority),
            due_date = COALESCE($5, due_date),
            is_completed = COALESCE($6, is_completed),
            category_id = COALESCE($7, category_id),
            updated_at = $8
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.priority)
    .bind(input.due_date)
    .bind(input.is_completed)
    .bind(input.category_id)
    .bind(now)
    .execute(pool)
    .await?;

    refresh_overdue(pool, id, now).await?;

    find_by_id(pool, user_id, id).await
}

/// Mark a todo completed. Completing clears the overdue flag.
pub async fn complete(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<TodoWithCategory, AppError> {
    let result = sqlx::query(
        "UPDATE todos SET is_completed = true, is_overdue = false, updated_at = $3
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".to_string()));
    }

    find_by_id(pool, user_id, id).await
}

/// Mark a todo pending again, recomputing its overdue flag.
pub async fn uncomplete(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<TodoWithCategory, AppError> {
    let result = sqlx::query(
        "UPDATE todos SET is_completed = false, updated_at = $3
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".to_string()));
    }

    refresh_overdue(pool, id, now).await?;

    find_by_id(pool, user_id, id).await
}

/// Soft-delete a todo by stamping its tombstone.
pub async fn soft_delete(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE todos SET deleted_at = $3, updated_at = $3
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".to_string()));
    }
    Ok(())
}

/// Restore a soft-deleted todo, recomputing its overdue flag.
pub async fn restore(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<TodoWithCategory, AppError> {
    let result = sqlx::query(
        "UPDATE todos SET deleted_at = NULL, updated_at = $3
         WHERE id = $1 AND user_id = $2 AND deleted_at IS NOT NULL",
    )
    .bind(id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found in trash".to_string()));
    }

    refresh_overdue(pool, id, now).await?;

    find_by_id(pool, user_id, id).await
}

/// Permanently delete a todo, trashed or not.
pub async fn force_delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".to_string()));
    }
    Ok(())
}

/// List soft-deleted todos, newest deletion first.
pub async fn list_trashed(
    pool: &PgPool,
    user_id: Uuid,
    pagination: &Pagination,
) -> Result<Paged<TodoWithCategory>, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM todos WHERE user_id = $1 AND deleted_at IS NOT NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        "{TODO_SELECT} WHERE t.user_id = $1 AND t.deleted_at IS NOT NULL \
         ORDER BY t.deleted_at DESC LIMIT $2 OFFSET $3"
    );
    let items = sqlx::query_as::<_, TodoWithCategory>(&sql)
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paged::new(items, total, pagination))
}

/// Fetch all active todos for export.
pub async fn export_all(pool: &PgPool, user_id: Uuid) -> Result<Vec<TodoWithCategory>, AppError> {
    let sql = format!(
        "{TODO_SELECT} WHERE t.user_id = $1 AND t.deleted_at IS NULL ORDER BY t.created_at DESC"
    );
    let todos = sqlx::query_as::<_, TodoWithCategory>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(todos)
}

/// Render todos as CSV with a header row.
pub fn write_csv(todos: &[TodoWithCategory]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "ID", "Title", "Description", "Priority", "Due Date", "Status", "Category",
            "Created At",
        ])
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;

    for todo in todos {
        writer
            .write_record([
                todo.id.to_string(),
                todo.title.clone(),
                todo.description.clone().unwrap_or_default(),
                todo.priority.as_str().to_string(),
                todo.due_date
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                if todo.is_completed {
                    "Completed".to_string()
                } else {
                    "Pending".to_string()
                },
                todo.category_name.clone().unwrap_or_default(),
                todo.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding failed: {e}")))
}

/// Recompute the cached overdue flag from the stored row.
///
/// The flag is only refreshed on write paths; between writes it can lag
/// `due_date < now`.
async fn refresh_overdue(pool: &PgPool, id: Uuid, now: DateTime<Utc>) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE todos
         SET is_overdue = (due_date IS NOT NULL AND due_date < $2 AND NOT is_completed)
         WHERE id = $1",
    )
    .bind(id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

/// New todos may not be due before today.
fn validate_due_date(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), AppError> {
    if let Some(due) = due_date {
        if due.date_naive() < now.date_naive() {
            return Err(AppError::Validation(
                "Due date cannot be in the past".to_string(),
            ));
        }
    }
    Ok(())
}

/// Reject todos referencing another user's (or a missing) category.
async fn ensure_category_owned(
    pool: &PgPool,
    user_id: Uuid,
    category_id: Uuid,
) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)",
    )
    .bind(category_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    if !exists {
        return Err(AppError::Validation(
            "Selected category does not exist".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::todo::Priority;
    use chrono::TimeZone;

    fn sample_todo(title: &str, description: Option<&str>) -> TodoWithCategory {
        TodoWithCategory {
            id: Uuid::nil(),
            title: title.to_string(),
            description: description.map(str::to_string),
            priority: Priority::High,
            due_date: None,
            is_completed: false,
            is_overdue: false,
            category_id: None,
            category_name: Some("Work".to_string()),
            category_color: Some("#FF8800".to_string()),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            deleted_at: None,
        }
    }

    #[test]
    fn csv_contains_header_and_rows() {
        let todos = vec![sample_todo("Write report", Some("quarterly numbers"))];
        let csv = write_csv(&todos).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Title,Description,Priority,Due Date,Status,Category,Created At"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("Write report"));
        assert!(row.contains("high"));
        assert!(row.contains("Pending"));
        assert!(row.contains("Work"));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let todos = vec![sample_todo("Buy milk, eggs", None)];
        let csv = write_csv(&todos).unwrap();
        assert!(csv.contains("\"Buy milk, eggs\""));
    }

    #[test]
    fn due_date_in_past_rejected() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let yesterday = Utc.with_ymd_and_hms(2025, 6, 9, 23, 0, 0).unwrap();
        assert!(validate_due_date(Some(yesterday), now).is_err());
    }

    #[test]
    fn due_date_earlier_today_allowed() {
        // "not before today" compares calendar dates, not instants
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let this_morning = Utc.with_ymd_and_hms(2025, 6, 10, 6, 0, 0).unwrap();
        assert!(validate_due_date(Some(this_morning), now).is_ok());
        assert!(validate_due_date(None, now).is_ok());
    }
}
