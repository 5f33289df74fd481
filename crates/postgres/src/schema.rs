use sqlx::PgPool;

const CREATE_CAMPAIGNS: &str = r#"
CREATE TABLE IF NOT EXISTS campaigns (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    goal NUMERIC(14, 2) NOT NULL CHECK (goal > 0),
    collected NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (collected >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_CONTRIBUTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS contributions (
    id BIGSERIAL PRIMARY KEY,
    campaign_id BIGINT NOT NULL REFERENCES campaigns (id),
    donor_name TEXT NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    contributed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_CONTRIBUTIONS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS contributions_campaign_id_idx ON contributions (campaign_id)
"#;

// Coordinates are both present or both absent
const CREATE_EMERGENCIES: &str = r#"
CREATE TABLE IF NOT EXISTS emergencies (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    animal TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    reported_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK ((latitude IS NULL) = (longitude IS NULL))
)
"#;

const CREATE_VOLUNTEERS: &str = r#"
CREATE TABLE IF NOT EXISTS volunteers (
    id BIGSERIAL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Creates any missing tables. Safe to run on every start-up.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in [
        CREATE_CAMPAIGNS,
        CREATE_CONTRIBUTIONS,
        CREATE_CONTRIBUTIONS_INDEX,
        CREATE_EMERGENCIES,
        CREATE_VOLUNTEERS,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    log::info!("🗄️ Database schema ready");
    Ok(())
}
