//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::{CreateUser, User};
use crate::DbTx;

const COLUMNS: &str = "id, reg_num, name, email, role, dept, semester, available, \
                       project_type, company_name, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (reg_num, name, email, role, dept, semester, project_type, company_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.reg_num)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.role)
            .bind(&input.dept)
            .bind(input.semester)
            .bind(&input.project_type)
            .bind(&input.company_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_reg_num(pool: &PgPool, reg_num: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE reg_num = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(reg_num)
            .fetch_optional(pool)
            .await
    }

    /// Load several users at once. Unknown ids are simply absent.
    pub async fn find_many(pool: &PgPool, reg_nums: &[String]) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE reg_num = ANY($1) ORDER BY reg_num");
        sqlx::query_as::<_, User>(&query)
            .bind(reg_nums)
            .fetch_all(pool)
            .await
    }

    pub async fn find_tx(tx: &mut DbTx<'_>, reg_num: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE reg_num = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(reg_num)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load and row-lock a user until the transaction ends.
    ///
    /// Used to serialize capacity checks against the same staff member or
    /// invitee counts against the same inviter.
    pub async fn lock_tx(tx: &mut DbTx<'_>, reg_num: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE reg_num = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(reg_num)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set the project preference. `company_name` is stored as given
    /// (already cleared for internal projects).
    pub async fn update_project_type(
        pool: &PgPool,
        reg_num: &str,
        project_type: &str,
        company_name: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET project_type = $2, company_name = $3
             WHERE reg_num = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(reg_num)
            .bind(project_type)
            .bind(company_name)
            .fetch_optional(pool)
            .await
    }

    /// Flip a staff member to unavailable. Returns `true` if the flag changed.
    pub async fn set_unavailable_tx(tx: &mut DbTx<'_>, reg_num: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET available = false WHERE reg_num = $1 AND available")
            .bind(reg_num)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
