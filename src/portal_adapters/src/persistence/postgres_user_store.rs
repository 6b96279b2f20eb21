use portal_core::{Email, PasswordHash, User, UserId, UserStore, UserStoreError};
use secrecy::{ExposeSecret, Secret};
use sqlx::{Pool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

pub struct PostgresUserStore {
    pool: sqlx::PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresUserStore { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, UserStoreError> {
    let unexpected = |e: sqlx::Error| UserStoreError::UnexpectedError(e.to_string());

    let id: Uuid = row.try_get("id").map_err(unexpected)?;
    let email: String = row.try_get("email").map_err(unexpected)?;
    let password_hash: String = row.try_get("password_hash").map_err(unexpected)?;

    let email = Email::try_from(Secret::new(email))
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

    Ok(User::from_parts(
        UserId::from(id),
        email,
        PasswordHash::new(Secret::new(password_hash)),
        row.try_get("is_active").map_err(unexpected)?,
        row.try_get("is_verified").map_err(unexpected)?,
        row.try_get("is_superuser").map_err(unexpected)?,
    ))
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn add_user(&self, user: User) -> Result<(), UserStoreError> {
        sqlx::query(
            r#"
                INSERT INTO users (id, email, password_hash, is_active, is_verified, is_superuser)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.password_hash().as_ref().expose_secret())
        .bind(user.is_active())
        .bind(user.is_verified())
        .bind(user.is_superuser())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return UserStoreError::UserAlreadyExists;
                }
            }
            UserStoreError::UnexpectedError(e.to_string())
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving user by email from PostgreSQL", skip_all)]
    async fn get_user_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, email, password_hash, is_active, is_verified, is_superuser
                FROM users
                WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(UserStoreError::UserNotFound);
        };

        user_from_row(&row)
    }

    #[tracing::instrument(name = "Retrieving user by id from PostgreSQL", skip(self))]
    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        let row = sqlx::query(
            r#"
                SELECT id, email, password_hash, is_active, is_verified, is_superuser
                FROM users
                WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(UserStoreError::UserNotFound);
        };

        user_from_row(&row)
    }
}
