use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Connection options for the hosted database.
///
/// TLS is mandatory but the server certificate chain is not verified
/// (`Require` never checks the CA); hosted providers such as Render present
/// certificates we have no root for.
pub fn connect_options(cfg: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.name)
        .ssl_mode(PgSslMode::Require)
}

/// Builds the process-wide pool. No connection is opened here, so an
/// unreachable database never blocks startup.
pub fn connect(cfg: &DatabaseConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_lazy_with(connect_options(cfg))
}

/// Startup health check. Returns the server clock on success.
pub async fn check_connection(pool: &PgPool) -> Result<DateTime<Utc>, sqlx::Error> {
    sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()").fetch_one(pool).await
}

/// Logs the outcome of [`check_connection`]; never fails. Returns whether the database answered.
pub async fn log_connection_check(pool: &PgPool) -> bool {
    match check_connection(pool).await {
        Ok(now) => {
            tracing::info!(server_time = %now, "Conexión exitosa a PostgreSQL");
            true
        }
        Err(e) => {
            tracing::error!(error = ?e, "Error al conectar a PostgreSQL");
            false
        }
    }
}

const DEFAULT_CATEGORIES: [&str; 8] =
    ["Electrónica", "Hogar", "Moda", "Deportes", "Vehículos", "Libros", "Juguetes", "Otros"];

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            bio TEXT NULL,
            avatar_url TEXT NULL,
            phone TEXT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS categories (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category_id INTEGER NULL REFERENCES categories(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price BIGINT NOT NULL CHECK (price >= 0),
            image_url TEXT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS favorites (
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, post_id)
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_posts_created", "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC)"),
        ("idx_posts_user", "CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id)"),
        ("idx_posts_category", "CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category_id)"),
        ("idx_favorites_post", "CREATE INDEX IF NOT EXISTS idx_favorites_post ON favorites(post_id)"),
    ];
    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("No se pudo crear el índice {}: {}", name, e);
        }
    }

    for name in DEFAULT_CATEGORIES {
        sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
    }

    Ok(())
}
