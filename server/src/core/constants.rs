// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "HBC";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "hbc";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".hbc";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "hbc.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "HBC_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "HBC_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "HBC_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "HBC_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5047;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "HBC_DATA_DIR";

/// Environment variable for the SQLite database file path
pub const ENV_DB_PATH: &str = "HBC_DB_PATH";

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "hbc.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for batch insert/upsert endpoints (32 MB)
pub const BATCH_BODY_LIMIT: usize = 32 * 1024 * 1024;

// =============================================================================
// Query Limits
// =============================================================================

/// Largest `$top` a caller may request
pub const QUERY_MAX_TOP: usize = 1000;

/// `$top` applied when the caller gives none
pub const QUERY_DEFAULT_TOP: usize = 100;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
