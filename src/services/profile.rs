//! Profile service: account details, password changes, settings, deletion.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{ChangePassword, UpdateProfile, UpdateSettings, User, UserResponse};
use crate::services::auth as auth_service;

/// Profile payload with todo/category counts.
#[derive(Debug, Serialize)]
pub struct ProfileOverview {
    pub user: UserResponse,
    pub todo_count: i64,
    pub category_count: i64,
}

/// Fetch the user's profile with active-todo and category counts.
pub async fn overview(pool: &PgPool, user_id: Uuid) -> Result<ProfileOverview, AppError> {
    let user = auth_service::find_user_by_id(pool, user_id).await?;

    let (todo_count, category_count) = tokio::try_join!(
        fetch_count(
            pool,
            "SELECT COUNT(*) FROM todos WHERE user_id = $1 AND deleted_at IS NULL",
            user_id,
        ),
        fetch_count(
            pool,
            "SELECT COUNT(*) FROM categories WHERE user_id = $1",
            user_id,
        ),
    )?;

    Ok(ProfileOverview {
        user: user.into(),
        todo_count,
        category_count,
    })
}

async fn fetch_count(pool: &PgPool, sql: &str, user_id: Uuid) -> Result<i64, AppError> {
    let count = sqlx::query_scalar::<_, i64>(sql)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Update name, email, or avatar.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    input: &UpdateProfile,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            avatar = COALESCE($4, avatar),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.avatar)
    .fetch_optional(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email already registered".to_string())
        }
        _ => AppError::Database(e),
    })?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(user)
}

/// Change the password after verifying the current one.
pub async fn change_password(
    pool: &PgPool,
    user_id: Uuid,
    input: &ChangePassword,
) -> Result<(), AppError> {
    let user = auth_service::find_user_by_id(pool, user_id).await?;

    if !auth_service::verify_password(&input.current_password, &user.password_hash)? {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = auth_service::hash_password(&input.password)?;
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(&new_hash)
        .execute(pool)
        .await?;

    Ok(())
}

/// Update notification, timezone, theme, and font preferences.
pub async fn update_settings(
    pool: &PgPool,
    user_id: Uuid,
    input: &UpdateSettings,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            email_notifications = COALESCE($2, email_notifications),
            timezone = COALESCE($3, timezone),
            theme_color = COALESCE($4, theme_color),
            font_size = COALESCE($5, font_size),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(input.email_notifications)
    .bind(&input.timezone)
    .bind(&input.theme_color)
    .bind(input.font_size)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(user)
}

/// Delete the account. Todos and categories cascade at the schema level.
pub async fn delete_account(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(())
}
