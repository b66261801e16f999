use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent DDL applied at startup. Statuses are stored as text and
/// constrained here; the API validates them before they reach the database.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title       VARCHAR(255) NOT NULL,
        department  VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        form_schema JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_by  UUID,
        status      VARCHAR(20) NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'closed')),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        job_id          UUID NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
        candidate_name  VARCHAR(255) NOT NULL,
        candidate_email VARCHAR(255) NOT NULL,
        resume_url      TEXT,
        answers         JSONB NOT NULL DEFAULT '{}'::jsonb,
        score           INTEGER NOT NULL DEFAULT 0 CHECK (score BETWEEN 0 AND 100),
        status          VARCHAR(20) NOT NULL DEFAULT 'new'
                        CHECK (status IN ('new', 'shortlisted', 'interviewed', 'offered', 'rejected')),
        idempotency_key VARCHAR(128),
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_applications_job_id ON applications(job_id)",
    "CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status)",
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_idempotency_key
        ON applications(idempotency_key) WHERE idempotency_key IS NOT NULL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interviews (
        id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        application_id UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
        interviewer    UUID,
        scheduled_time TIMESTAMPTZ NOT NULL,
        meeting_link   TEXT,
        notes          TEXT,
        status         VARCHAR(20) NOT NULL DEFAULT 'scheduled'
                       CHECK (status IN ('scheduled', 'completed', 'cancelled')),
        created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_interviews_application_id ON interviews(application_id)",
    "CREATE INDEX IF NOT EXISTS idx_interviews_scheduled_time ON interviews(scheduled_time)",
    r#"
    CREATE TABLE IF NOT EXISTS offers (
        id               UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        application_id   UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
        position         VARCHAR(255) NOT NULL,
        salary           DOUBLE PRECISION NOT NULL CHECK (salary >= 0),
        offer_letter_url TEXT,
        status           VARCHAR(20) NOT NULL DEFAULT 'sent'
                         CHECK (status IN ('sent', 'accepted', 'rejected')),
        sent_at          TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_offers_application_id ON offers(application_id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates any missing tables and indexes.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Schema statement failed: {}", statement.trim()))?;
    }
    info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
