//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const DEMO_EMAIL: &str = "demo@taskforge.local";
const DEMO_PASSWORD: &str = "Demo123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== Taskforge Seed Script ===");

    let user_id = seed_demo_user(&pool).await?;
    let (work_id, home_id) = seed_categories(&pool, user_id).await?;
    seed_todos(&pool, user_id, work_id, home_id).await?;

    println!("\n=== Seed complete! ===");
    println!("Demo login: {DEMO_EMAIL} / {DEMO_PASSWORD}");

    Ok(())
}

async fn seed_demo_user(pool: &PgPool) -> anyhow::Result<Uuid> {
    let hash = taskforge::services::auth::hash_password(DEMO_PASSWORD)?;

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(DEMO_EMAIL)
        .fetch_optional(pool)
        .await?;

    if let Some(id) = existing {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&hash)
            .bind(id)
            .execute(pool)
            .await?;
        println!("[done] Updated demo user password");
        return Ok(id);
    }

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash) VALUES ('Demo User', $1, $2) RETURNING id",
    )
    .bind(DEMO_EMAIL)
    .bind(&hash)
    .fetch_one(pool)
    .await?;

    println!("[done] Created demo user");
    Ok(id)
}

async fn seed_categories(pool: &PgPool, user_id: Uuid) -> anyhow::Result<(Uuid, Uuid)> {
    let work_id = upsert_category(pool, user_id, "Work", "#EF4444").await?;
    let home_id = upsert_category(pool, user_id, "Home", "#22C55E").await?;
    upsert_category(pool, user_id, "Errands", "#F59E0B").await?;

    println!("[done] Seeded categories");
    Ok((work_id, home_id))
}

async fn upsert_category(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    color: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO categories (name, color, user_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, name) DO UPDATE SET color = EXCLUDED.color
         RETURNING id",
    )
    .bind(name)
    .bind(color)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_todos(
    pool: &PgPool,
    user_id: Uuid,
    work_id: Uuid,
    home_id: Uuid,
) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("[skip] Todos already present");
        return Ok(());
    }

    let now = Utc::now();

    // (title, priority, due offset in days, completed, category)
    let samples: &[(&str, &str, Option<i64>, bool, Option<Uuid>)] = &[
        ("Prepare quarterly report", "high", Some(2), false, Some(work_id)),
        ("Review pull requests", "medium", Some(0), false, Some(work_id)),
        ("Book dentist appointment", "low", Some(5), false, None),
        ("Pay electricity bill", "high", Some(-3), false, Some(home_id)),
        ("Water the plants", "low", None, true, Some(home_id)),
        ("Submit expense claims", "medium", Some(-1), false, Some(work_id)),
        ("Plan weekend trip", "low", Some(10), false, None),
        ("Update team roadmap", "medium", None, true, Some(work_id)),
        ("Clean the garage", "low", None, false, Some(home_id)),
        ("Renew gym membership", "medium", Some(7), false, None),
    ];

    for &(title, priority, due_offset, completed, category_id) in samples {
        let due_date = due_offset.map(|d| now + Duration::days(d));
        let is_overdue = !completed && due_date.map(|d| d < now).unwrap_or(false);

        sqlx::query(
            "INSERT INTO todos (title, priority, due_date, is_completed, is_overdue, category_id, user_id)
             VALUES ($1, $2::todo_priority, $3, $4, $5, $6, $7)",
        )
        .bind(title)
        .bind(priority)
        .bind(due_date)
        .bind(completed)
        .bind(is_overdue)
        .bind(category_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    }

    println!("[done] Seeded {} todos", samples.len());
    Ok(())
}
