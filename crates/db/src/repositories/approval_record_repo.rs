//! Repository for the `approval_records` table.

use depot_core::approval::{ApprovalRecord, ApprovalStatus, DocumentKey, NewApproval};
use depot_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::approval::ApprovalRecordRow;

/// Column list for approval_records queries.
const COLUMNS: &str = "id, document_id, document_type, status, submitter_id, submit_time, \
    decider_id, decision_time, remark, flow_id, step_order";

pub struct ApprovalRecordRepo;

impl ApprovalRecordRepo {
    /// Insert a PENDING record. A second PENDING record for the same
    /// document violates `uq_approval_records_pending`.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewApproval,
    ) -> Result<ApprovalRecordRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_records
                (document_id, document_type, status, submitter_id, submit_time, remark, flow_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(input.key.document_id)
            .bind(input.key.document_type.as_str())
            .bind(ApprovalStatus::Pending.as_str())
            .bind(input.submitter_id)
            .bind(input.submit_time)
            .bind(&input.remark)
            .bind(&input.flow_id)
            .fetch_one(executor)
            .await
    }

    /// Write the outcome of a decision or cancellation. Matches only while
    /// the stored row is still PENDING; returns `None` otherwise.
    pub async fn update_pending<'e>(
        executor: impl PgExecutor<'e>,
        record: &ApprovalRecord,
    ) -> Result<Option<ApprovalRecordRow>, sqlx::Error> {
        let query = format!(
            "UPDATE approval_records
             SET status = $2, decider_id = $3, decision_time = $4, remark = $5
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(record.id)
            .bind(record.status.as_str())
            .bind(record.decider_id)
            .bind(record.decision_time)
            .bind(&record.remark)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ApprovalRecordRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_records WHERE id = $1");
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_pending(
        pool: &PgPool,
        key: DocumentKey,
    ) -> Result<Option<ApprovalRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_records
             WHERE document_id = $1 AND document_type = $2 AND status = 'PENDING'"
        );
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(key.document_id)
            .bind(key.document_type.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn exists_pending(pool: &PgPool, key: DocumentKey) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                SELECT 1 FROM approval_records
                WHERE document_id = $1 AND document_type = $2 AND status = 'PENDING'
             )",
        )
        .bind(key.document_id)
        .bind(key.document_type.as_str())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// All records for a document, newest submission first.
    pub async fn list_for_document(
        pool: &PgPool,
        key: DocumentKey,
    ) -> Result<Vec<ApprovalRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_records
             WHERE document_id = $1 AND document_type = $2
             ORDER BY submit_time DESC, id DESC"
        );
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(key.document_id)
            .bind(key.document_type.as_str())
            .fetch_all(pool)
            .await
    }

    /// PENDING records of the given types, newest first.
    pub async fn list_pending(
        pool: &PgPool,
        document_types: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_records
             WHERE status = 'PENDING' AND document_type = ANY($1)
             ORDER BY submit_time DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(document_types)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_pending(pool: &PgPool, document_types: &[String]) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM approval_records
             WHERE status = 'PENDING' AND document_type = ANY($1)",
        )
        .bind(document_types)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Records submitted by a user in any status, newest first.
    pub async fn list_by_submitter(
        pool: &PgPool,
        submitter_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalRecordRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_records
             WHERE submitter_id = $1
             ORDER BY submit_time DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ApprovalRecordRow>(&query)
            .bind(submitter_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_submitter(pool: &PgPool, submitter_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM approval_records WHERE submitter_id = $1")
                .bind(submitter_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
