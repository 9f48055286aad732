use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::DatabaseInterface;
use crate::models::{
    NewOrder, NewProduct, NewReview, NewUser, Order, Product, ProductChanges, RatingSummary, Review,
    ReviewAuthor, ReviewUpdate, ReviewWithAuthor, Seller, User,
};

const REVIEW_COLUMNS: &str = "r.id, r.text, r.rating, r.product_id, r.user_id, r.parent_id, r.date";
const PRODUCT_COLUMNS: &str =
    "id, title, description, price, date, image_location, user_id, rating, rating_count";
const USER_COLUMNS: &str = "id, email, password, name, country, birthday, vendor_id, created";
const ORDER_COLUMNS: &str = "id, client_id, prof_id, product_id, description, date";

/// Timestamps are stored as unix milliseconds.
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

/// Current time truncated to the stored precision.
pub fn current_time() -> DateTime<Utc> {
    millis_to_datetime(Utc::now().timestamp_millis())
}

/// SQLite implementation of the marketplace database interface
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Connect to `database_url`, creating the file (and its directory) when missing,
    /// and make sure the schema exists.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::ConfigurationError(format!("Invalid database URL {}: {}", database_url, e))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database, so pin the pool to one.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to {}: {}", database_url, e))
        })?;

        let db = Self { pool };
        db.initialize().await?;
        tracing::info!("SQLite database ready at {}", database_url);
        Ok(db)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Create marketplace tables and indexes if they do not exist yet
    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                name TEXT,
                country TEXT,
                birthday INTEGER,
                vendor_id TEXT,
                created INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create users table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                date INTEGER NOT NULL,
                image_location TEXT,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                rating REAL,
                rating_count INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create posts table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                rating INTEGER,
                product_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                parent_id TEXT REFERENCES reviews(id) ON DELETE CASCADE,
                date INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create reviews table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id, date DESC)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create posts index: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_reviews_product_parent ON reviews(product_id, parent_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create reviews index: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_parent ON reviews(parent_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create reviews parent index: {}", e))
            })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS commands (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                prof_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                product_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                description TEXT,
                date INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create commands table: {}", e)))?;

        for (name, column) in [("idx_commands_client", "client_id"), ("idx_commands_prof", "prof_id")] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON commands({}, date DESC)",
                name, column
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create {}: {}", name, e)))?;
        }

        Ok(())
    }
}

async fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            AppError::ConfigurationError(format!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

fn row_error(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(format!("Failed to decode row: {}", e))
}

fn review_from_row(row: &SqliteRow) -> AppResult<Review> {
    Ok(Review {
        id: row.try_get("id").map_err(row_error)?,
        text: row.try_get("text").map_err(row_error)?,
        rating: row.try_get("rating").map_err(row_error)?,
        product_id: row.try_get("product_id").map_err(row_error)?,
        user_id: row.try_get("user_id").map_err(row_error)?,
        parent_id: row.try_get("parent_id").map_err(row_error)?,
        date: millis_to_datetime(row.try_get("date").map_err(row_error)?),
    })
}

fn product_from_row(row: &SqliteRow) -> AppResult<Product> {
    Ok(Product {
        id: row.try_get("id").map_err(row_error)?,
        title: row.try_get("title").map_err(row_error)?,
        description: row.try_get("description").map_err(row_error)?,
        price: row.try_get("price").map_err(row_error)?,
        date: millis_to_datetime(row.try_get("date").map_err(row_error)?),
        image_location: row.try_get("image_location").map_err(row_error)?,
        user_id: row.try_get("user_id").map_err(row_error)?,
        rating: row.try_get("rating").map_err(row_error)?,
        rating_count: row.try_get("rating_count").map_err(row_error)?,
    })
}

fn order_from_row(row: &SqliteRow) -> AppResult<Order> {
    Ok(Order {
        id: row.try_get("id").map_err(row_error)?,
        client_id: row.try_get("client_id").map_err(row_error)?,
        prof_id: row.try_get("prof_id").map_err(row_error)?,
        product_id: row.try_get("product_id").map_err(row_error)?,
        description: row.try_get("description").map_err(row_error)?,
        date: millis_to_datetime(row.try_get("date").map_err(row_error)?),
    })
}

impl SqliteDatabase {
    /// Orders matching `filter` (a `column = ?` clause, or none), newest first
    async fn query_orders(&self, filter: Option<(&str, &str)>) -> AppResult<Vec<Order>> {
        let rows = match filter {
            Some((column, value)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM commands WHERE {} = ? ORDER BY date DESC, rowid DESC",
                    ORDER_COLUMNS, column
                ))
                .bind(value)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM commands ORDER BY date DESC, rowid DESC",
                    ORDER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to list orders: {}", e)))?;

        rows.iter().map(order_from_row).collect()
    }
}

fn user_from_row(row: &SqliteRow) -> AppResult<User> {
    let birthday: Option<i64> = row.try_get("birthday").map_err(row_error)?;
    Ok(User {
        id: row.try_get("id").map_err(row_error)?,
        email: row.try_get("email").map_err(row_error)?,
        password_hash: row.try_get("password").map_err(row_error)?,
        name: row.try_get("name").map_err(row_error)?,
        country: row.try_get("country").map_err(row_error)?,
        birthday: birthday.map(millis_to_datetime),
        vendor_id: row.try_get("vendor_id").map_err(row_error)?,
        created: millis_to_datetime(row.try_get("created").map_err(row_error)?),
    })
}

#[async_trait]
impl DatabaseInterface for SqliteDatabase {
    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = current_time();

        sqlx::query(
            "INSERT INTO users (id, email, password, name, country, birthday, created) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.country)
        .bind(user.birthday.map(|b| b.timestamp_millis()))
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            _ => AppError::DatabaseError(format!("Failed to create user: {}", e)),
        })?;

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            name: Some(user.name),
            country: Some(user.country),
            birthday: user.birthday,
            vendor_id: None,
            created: now,
        })
    }

    async fn get_user(&self, id: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user {}: {}", id, e)))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete_user(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete user {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let id = Uuid::new_v4().to_string();
        let date = product.date.unwrap_or_else(current_time);

        sqlx::query(
            "INSERT INTO posts (id, title, description, price, date, image_location, user_id) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price)
        .bind(date.timestamp_millis())
        .bind(&product.image_location)
        .bind(&product.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create product: {}", e)))?;

        Ok(Product {
            id,
            title: product.title,
            description: product.description,
            price: product.price,
            date: millis_to_datetime(date.timestamp_millis()),
            image_location: product.image_location,
            user_id: product.user_id,
            rating: None,
            rating_count: 0,
        })
    }

    async fn get_product(&self, id: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get product {}: {}", id, e)))?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn get_seller(&self, product_id: &str) -> AppResult<Option<Seller>> {
        let row = sqlx::query(
            "SELECT u.id, u.name, u.country, u.email FROM posts p JOIN users u ON u.id = p.user_id WHERE p.id = ?",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to get seller of {}: {}", product_id, e))
        })?;

        match row {
            Some(row) => Ok(Some(Seller {
                id: row.try_get("id").map_err(row_error)?,
                name: row.try_get("name").map_err(row_error)?,
                country: row.try_get("country").map_err(row_error)?,
                email: row.try_get("email").map_err(row_error)?,
            })),
            None => Ok(None),
        }
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts ORDER BY date DESC, rowid DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list products: {}", e)))?;

        rows.iter().map(product_from_row).collect()
    }

    async fn list_products_for_user(&self, user_id: &str) -> AppResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE user_id = ? ORDER BY date DESC, rowid DESC",
            PRODUCT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list products of {}: {}", user_id, e))
        })?;

        rows.iter().map(product_from_row).collect()
    }

    async fn update_product(&self, id: &str, changes: ProductChanges) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE posts SET title = ?, description = ?, price = ?, date = COALESCE(?, date), image_location = COALESCE(?, image_location) WHERE id = ?",
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(changes.date.map(|d| d.timestamp_millis()))
        .bind(&changes.image_location)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update product {}: {}", id, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete product {}: {}", id, e))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_product_rating(
        &self,
        product_id: &str,
        summary: RatingSummary,
    ) -> AppResult<()> {
        sqlx::query("UPDATE posts SET rating = ?, rating_count = ? WHERE id = ?")
            .bind(summary.average)
            .bind(summary.count)
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to update rating of product {}: {}",
                    product_id, e
                ))
            })?;
        Ok(())
    }

    async fn get_review(&self, id: &str) -> AppResult<Option<Review>> {
        let row = sqlx::query(&format!("SELECT {} FROM reviews r WHERE r.id = ?", REVIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get review {}: {}", id, e)))?;

        row.as_ref().map(review_from_row).transpose()
    }

    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let id = Uuid::new_v4().to_string();
        let now = current_time();

        sqlx::query(
            "INSERT INTO reviews (id, text, rating, product_id, user_id, parent_id, date) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&review.text)
        .bind(review.rating)
        .bind(&review.product_id)
        .bind(&review.user_id)
        .bind(&review.parent_id)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create review: {}", e)))?;

        Ok(Review {
            id,
            text: review.text,
            rating: review.rating,
            product_id: review.product_id,
            user_id: review.user_id,
            parent_id: review.parent_id,
            date: now,
        })
    }

    async fn update_review(&self, id: &str, update: ReviewUpdate) -> AppResult<bool> {
        let now = current_time().timestamp_millis();

        let query = match update.rating {
            Some(rating) => sqlx::query("UPDATE reviews SET text = ?, date = ?, rating = ? WHERE id = ?")
                .bind(update.text)
                .bind(now)
                .bind(rating)
                .bind(id),
            None => sqlx::query("UPDATE reviews SET text = ?, date = ? WHERE id = ?")
                .bind(update.text)
                .bind(now)
                .bind(id),
        };

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update review {}: {}", id, e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_review(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete review {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_product_reviews(&self, product_id: &str) -> AppResult<Vec<ReviewWithAuthor>> {
        let rows = sqlx::query(&format!(
            "SELECT {}, u.name AS author_name FROM reviews r LEFT JOIN users u ON u.id = r.user_id WHERE r.product_id = ? ORDER BY r.date ASC, r.rowid ASC",
            REVIEW_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list reviews of {}: {}", product_id, e))
        })?;

        rows.iter()
            .map(|row| -> AppResult<ReviewWithAuthor> {
                let review = review_from_row(row)?;
                let author = ReviewAuthor {
                    id: review.user_id.clone(),
                    name: row.try_get("author_name").map_err(row_error)?,
                };
                Ok(ReviewWithAuthor { review, author })
            })
            .collect()
    }

    async fn rating_summary(&self, product_id: &str) -> AppResult<RatingSummary> {
        let row = sqlx::query(
            "SELECT AVG(rating) AS average, COUNT(rating) AS rating_count FROM reviews WHERE product_id = ? AND parent_id IS NULL AND rating IS NOT NULL",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to aggregate ratings of {}: {}",
                product_id, e
            ))
        })?;

        Ok(RatingSummary {
            average: row.try_get("average").map_err(row_error)?,
            count: row.try_get("rating_count").map_err(row_error)?,
        })
    }

    async fn list_rated_product_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT product_id FROM reviews WHERE user_id = ? AND parent_id IS NULL AND rating IS NOT NULL",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list rated products of {}: {}", user_id, e))
        })?;

        rows.iter()
            .map(|row| row.try_get("product_id").map_err(row_error))
            .collect()
    }

    async fn create_order(&self, order: NewOrder) -> AppResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = current_time();

        sqlx::query(
            "INSERT INTO commands (id, client_id, prof_id, product_id, description, date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&order.client_id)
        .bind(&order.prof_id)
        .bind(&order.product_id)
        .bind(&order.description)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create order: {}", e)))?;

        Ok(Order {
            id,
            client_id: order.client_id,
            prof_id: order.prof_id,
            product_id: order.product_id,
            description: order.description,
            date: now,
        })
    }

    async fn list_orders(&self) -> AppResult<Vec<Order>> {
        self.query_orders(None).await
    }

    async fn list_orders_for_client(&self, client_id: &str) -> AppResult<Vec<Order>> {
        self.query_orders(Some(("client_id", client_id))).await
    }

    async fn list_orders_for_professional(&self, prof_id: &str) -> AppResult<Vec<Order>> {
        self.query_orders(Some(("prof_id", prof_id))).await
    }
}
