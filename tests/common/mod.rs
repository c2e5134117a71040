use anyhow::Result;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::Mutex;

use ledger_api_rust::database::manager::DbExecutor;

/// Store-backed tests share one database; hold this across a whole test so
/// truncation in one test cannot race another.
pub static DB_LOCK: Mutex<()> = Mutex::const_new(());

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        user_name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        admin BOOLEAN NOT NULL DEFAULT FALSE,
        activated BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS workspaces (
        id BIGSERIAL PRIMARY KEY,
        owner_id BIGINT NOT NULL,
        name TEXT NOT NULL,
        default_currency TEXT NOT NULL DEFAULT 'EUR',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS taxes (
        id BIGSERIAL PRIMARY KEY,
        workspace_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        rate_in_bps INT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS expenses (
        id BIGSERIAL PRIMARY KEY,
        workspace_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        currency TEXT NOT NULL DEFAULT 'EUR',
        amount_cents BIGINT NOT NULL DEFAULT 0,
        date_paid DATE NOT NULL,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS incomes (
        id BIGSERIAL PRIMARY KEY,
        workspace_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        currency TEXT NOT NULL DEFAULT 'EUR',
        amount_cents BIGINT NOT NULL DEFAULT 0,
        date_received DATE NOT NULL,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS invoices (
        id BIGSERIAL PRIMARY KEY,
        workspace_id BIGINT NOT NULL,
        customer_id BIGINT NOT NULL,
        title TEXT NOT NULL,
        currency TEXT NOT NULL DEFAULT 'EUR',
        amount_cents BIGINT NOT NULL DEFAULT 0,
        date_issued DATE NOT NULL,
        due_date DATE NOT NULL,
        status TEXT NOT NULL DEFAULT 'draft',
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS workspace_access_tokens (
        id BIGSERIAL PRIMARY KEY,
        workspace_id BIGINT NOT NULL,
        token UUID NOT NULL,
        valid_till TIMESTAMPTZ NOT NULL,
        revoked BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

pub async fn connect() -> Result<DbExecutor> {
    let url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }
    sqlx::query(
        "TRUNCATE users, workspaces, taxes, expenses, incomes, invoices, \
         workspace_access_tokens RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(DbExecutor::new(pool, 4))
}

pub async fn seed_user(pool: &PgPool, user_name: &str, admin: bool) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (user_name, password_hash, admin) VALUES ($1, 'x', $2) RETURNING id",
    )
    .bind(user_name)
    .bind(admin)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn seed_workspace(pool: &PgPool, owner_id: i64, name: &str) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO workspaces (owner_id, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(owner_id)
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn seed_tax(
    pool: &PgPool,
    workspace_id: i64,
    title: &str,
    rate_in_bps: i32,
) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO taxes (workspace_id, title, rate_in_bps) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(workspace_id)
    .bind(title)
    .bind(rate_in_bps)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn seed_expense(
    pool: &PgPool,
    workspace_id: i64,
    title: &str,
    date_paid: NaiveDate,
) -> Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO expenses (workspace_id, title, date_paid) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(workspace_id)
    .bind(title)
    .bind(date_paid)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
