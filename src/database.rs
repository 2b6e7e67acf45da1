use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::{
    error::{AppError, AuthError},
    models::{Item, ItemInput, User},
};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        tracing::info!("Connecting to database {}", database_url);
        let pool = SqlitePool::connect_with(options).await?;

        tracing::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a user row. A username collision surfaces as
    /// `AuthError::DuplicateUsername` rather than a raw database error.
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::Auth(AuthError::DuplicateUsername)
                }
                other => AppError::Database(other),
            })?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, quantity, price FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, name, quantity, price FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn create(&self, input: &ItemInput) -> Result<Item, AppError> {
        let result = sqlx::query("INSERT INTO items (name, quantity, price) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(input.quantity)
            .bind(input.price)
            .execute(&self.pool)
            .await?;

        Ok(Item {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            quantity: input.quantity,
            price: input.price,
        })
    }

    /// Overwrites every field of an existing item. Fails with
    /// `AppError::NotFound` when no row has the given id.
    pub async fn update(&self, id: i64, input: &ItemInput) -> Result<Item, AppError> {
        let result = sqlx::query("UPDATE items SET name = ?, quantity = ?, price = ? WHERE id = ?")
            .bind(&input.name)
            .bind(input.quantity)
            .bind(input.price)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(Item {
            id,
            name: input.name.clone(),
            quantity: input.quantity,
            price: input.price,
        })
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
