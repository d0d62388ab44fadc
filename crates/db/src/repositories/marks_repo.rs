//! Repository for the `review_marks` table.

use capstone_core::review::MarksCriteria;
use sqlx::PgPool;

use crate::models::review::ReviewMarks;

const COLUMNS: &str = "id, review_id, evaluator_reg_num, student_reg_num, literature_survey, aim, \
                       scope, need_for_study, proposed_methodology, work_plan, total, remarks, \
                       created_at, updated_at";

pub struct MarksRepo;

impl MarksRepo {
    /// Insert a marks entry. A second entry for the same review, evaluator
    /// and student violates `uq_review_marks_entry`.
    pub async fn create(
        pool: &PgPool,
        review_id: i64,
        evaluator_reg_num: &str,
        student_reg_num: Option<&str>,
        criteria: &MarksCriteria,
        remarks: Option<&str>,
    ) -> Result<ReviewMarks, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_marks
                (review_id, evaluator_reg_num, student_reg_num, literature_survey, aim, scope,
                 need_for_study, proposed_methodology, work_plan, total, remarks)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewMarks>(&query)
            .bind(review_id)
            .bind(evaluator_reg_num)
            .bind(student_reg_num)
            .bind(criteria.literature_survey)
            .bind(criteria.aim)
            .bind(criteria.scope)
            .bind(criteria.need_for_study)
            .bind(criteria.proposed_methodology)
            .bind(criteria.work_plan)
            .bind(criteria.total())
            .bind(remarks)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_review(pool: &PgPool, review_id: i64) -> Result<Vec<ReviewMarks>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM review_marks WHERE review_id = $1 ORDER BY evaluator_reg_num, student_reg_num"
        );
        sqlx::query_as::<_, ReviewMarks>(&query)
            .bind(review_id)
            .fetch_all(pool)
            .await
    }
}
