//! Category service: CRUD with per-category todo counts.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::category::{Category, CategoryWithCounts, CreateCategory, UpdateCategory};

/// Default display color for new categories.
const DEFAULT_COLOR: &str = "#3B82F6";

/// Per-category projection with active-todo counts joined in.
const CATEGORY_COUNTS_SELECT: &str = r#"
    SELECT c.id, c.name, c.color,
           COUNT(t.id) AS total_todos,
           COALESCE(SUM(CASE WHEN t.is_completed THEN 1 ELSE 0 END), 0) AS completed_todos,
           COALESCE(SUM(CASE WHEN NOT t.is_completed THEN 1 ELSE 0 END), 0) AS pending_todos,
           c.created_at, c.updated_at
    FROM categories c
    LEFT JOIN todos t ON t.category_id = c.id AND t.deleted_at IS NULL
"#;

/// List the user's categories ordered by name, with todo counts.
pub async fn list(pool: &PgPool, user_id: Uuid) -> Result<Vec<CategoryWithCounts>, AppError> {
    let sql = format!(
        "{CATEGORY_COUNTS_SELECT} WHERE c.user_id = $1 \
         GROUP BY c.id, c.name, c.color, c.created_at, c.updated_at \
         ORDER BY c.name ASC"
    );
    let categories = sqlx::query_as::<_, CategoryWithCounts>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

/// Create a new category for the user.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    input: &CreateCategory,
) -> Result<Category, AppError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, color, user_id)
        VALUES ($1, COALESCE($2, $3), $4)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.color)
    .bind(DEFAULT_COLOR)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("Category '{}' already exists", input.name))
        }
        _ => AppError::Database(e),
    })?;

    Ok(category)
}

/// Find a category by ID with todo counts.
pub async fn find_by_id(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<CategoryWithCounts, AppError> {
    let sql = format!(
        "{CATEGORY_COUNTS_SELECT} WHERE c.id = $1 AND c.user_id = $2 \
         GROUP BY c.id, c.name, c.color, c.created_at, c.updated_at"
    );
    sqlx::query_as::<_, CategoryWithCounts>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

/// Update a category's name or color.
pub async fn update(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    input: &UpdateCategory,
) -> Result<Category, AppError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories SET
            name = COALESCE($3, name),
            color = COALESCE($4, color),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.color)
    .fetch_optional(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A category with that name already exists".to_string())
        }
        _ => AppError::Database(e),
    })?
    .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(category)
}

/// Delete a category, detaching its todos rather than deleting them.
///
/// The detach and the delete run in one transaction so a concurrent reader
/// never sees todos pointing at a missing category.
pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND user_id = $2)",
    )
    .bind(id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    if !owned {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    sqlx::query("UPDATE todos SET category_id = NULL WHERE category_id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
