use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::instrument;
use uuid::Uuid;

use catalog_auth::{Mobile, RoleFlags, User, UserName, UserStore};
use catalog_core::{StoreError, StoreResult, UserId};

use super::{PostgresStore, map_sqlx_error};

const TABLE: &str = "users";

const SELECT_USER: &str = r#"
    SELECT id, mobile, name, password_hash, is_active, is_staff, is_executive,
           is_superuser, last_login, date_joined
    FROM users
"#;

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode", "user", TABLE, e);
    let corrupt = |msg: &str| StoreError::backend(format!("corrupt user row: {msg}"));

    let mobile: String = row.try_get("mobile").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let id: Uuid = row.try_get("id").map_err(decode)?;

    Ok(User {
        id: UserId::from_uuid(id),
        mobile: Mobile::parse(mobile).map_err(corrupt)?,
        name: UserName::parse(name).map_err(corrupt)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        roles: RoleFlags {
            is_active: row.try_get("is_active").map_err(decode)?,
            is_staff: row.try_get("is_staff").map_err(decode)?,
            is_executive: row.try_get("is_executive").map_err(decode)?,
            is_superuser: row.try_get("is_superuser").map_err(decode)?,
        },
        last_login: row.try_get("last_login").map_err(decode)?,
        date_joined: row.try_get("date_joined").map_err(decode)?,
    })
}

#[async_trait]
impl UserStore for PostgresStore {
    #[instrument(skip_all, fields(user_id = %user.id), err)]
    async fn create_user(&self, user: User) -> StoreResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, mobile, name, password_hash, is_active, is_staff,
                is_executive, is_superuser, last_login, date_joined
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(user.mobile.as_str())
        .bind(user.name.as_str())
        .bind(&user.password_hash)
        .bind(user.roles.is_active)
        .bind(user.roles.is_staff)
        .bind(user.roles.is_executive)
        .bind(user.roles.is_superuser)
        .bind(user.last_login)
        .bind(user.date_joined)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("create_user", "user", TABLE, e))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_by_id", "user", TABLE, e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> StoreResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE mobile = $1");
        let row = sqlx::query(&sql)
            .bind(mobile.as_str())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_sqlx_error("find_by_mobile", "user", TABLE, e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip_all, fields(user_id = %user.id), err)]
    async fn update_user(&self, user: User) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET mobile = $2, name = $3, password_hash = $4, is_active = $5,
                is_staff = $6, is_executive = $7, is_superuser = $8
            WHERE id = $1
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(user.mobile.as_str())
        .bind(user.name.as_str())
        .bind(&user.password_hash)
        .bind(user.roles.is_active)
        .bind(user.roles.is_staff)
        .bind(user.roles.is_executive)
        .bind(user.roles.is_superuser)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_user", "user", TABLE, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(user)
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(at)
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("record_login", "user", TABLE, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
