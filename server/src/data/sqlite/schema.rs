//! SQLite schema definitions
//!
//! `SCHEMA` is the version 1 baseline. Later versions are applied as
//! incremental migrations.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Version 1 schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Customer satisfaction survey
-- =============================================================================
CREATE TABLE IF NOT EXISTS nyc_open_data_311_customer_satisfaction_survey (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year TEXT,
    campaign TEXT,
    channel TEXT,
    survey_type TEXT,
    start_time TEXT,
    completion_time TEXT,
    survey_language TEXT,
    overall_satisfaction TEXT,
    wait_time TEXT,
    agent_customer_service TEXT,
    agent_job_knowledge TEXT,
    answer_satisfaction TEXT,
    nps INTEGER
);

-- =============================================================================
-- 2. Call center inquiries
-- =============================================================================
CREATE TABLE IF NOT EXISTS nyc_open_data_311_call_center_inquiry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hbc_unique_key TEXT,
    unique_id TEXT,
    date TEXT,
    time TEXT,
    date_time TEXT,
    agency TEXT,
    agency_name TEXT,
    inquiry_name TEXT,
    brief_description TEXT,
    call_resolution TEXT
);

-- =============================================================================
-- 3. Service requests
-- =============================================================================
CREATE TABLE IF NOT EXISTS nyc_open_data_311_service_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hbc_unique_key TEXT,
    unique_key TEXT,
    created_date TEXT,
    closed_date TEXT,
    due_date TEXT,
    resolution_action_updated_date TEXT,
    agency TEXT,
    agency_name TEXT,
    complaint_type TEXT,
    descriptor TEXT,
    location_type TEXT,
    incident_zip TEXT,
    incident_address TEXT,
    street_name TEXT,
    address_type TEXT,
    city TEXT,
    status TEXT,
    community_board TEXT,
    borough TEXT,
    latitude REAL,
    longitude REAL,
    x_coordinate_state_plane REAL,
    y_coordinate_state_plane REAL
);
"#;

/// Version 2: lookup indexes on the source-system keys
pub const MIGRATION_V2: &str = r#"
CREATE INDEX IF NOT EXISTS idx_call_center_hbc_key ON nyc_open_data_311_call_center_inquiry(hbc_unique_key);
CREATE INDEX IF NOT EXISTS idx_service_requests_hbc_key ON nyc_open_data_311_service_requests(hbc_unique_key);
CREATE INDEX IF NOT EXISTS idx_service_requests_created ON nyc_open_data_311_service_requests(created_date)
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::traits::Dataset;
    use crate::data::types::{CallCenterInquiry, CustomerSatisfactionSurvey, ServiceRequest};

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn test_schema_contains_dataset_tables() {
        let required_tables = [
            "schema_version",
            "schema_migrations",
            CustomerSatisfactionSurvey::TABLE,
            CallCenterInquiry::TABLE,
            ServiceRequest::TABLE,
        ];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "Schema missing table: {}",
                table
            );
        }
    }
}
