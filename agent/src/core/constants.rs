// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Tuning Agent";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "tuning_agent";

/// Agent version reported by the agent-info gatherer
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name (looked up in the working directory when no path is given)
pub const CONFIG_FILE_NAME: &str = "tuning-agent.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TUNING_AGENT_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "TUNING_AGENT_DEBUG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TUNING_AGENT_LOG";

/// Environment variable for the API key
pub const ENV_API_KEY: &str = "TUNING_AGENT_API_KEY";

/// Environment variable for the event name (one-shot event mode)
pub const ENV_EVENT: &str = "TUNING_AGENT_EVENT";

// =============================================================================
// Scheduling Defaults
// =============================================================================

/// Delay before the first collection cycle
pub const FIRST_COLLECTION_DELAY_SECS: u64 = 1;

/// Default collection period
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default config reload period
pub const DEFAULT_READ_CONFIG_SECS: u64 = 3600;

/// Default generate (recommendation) period
pub const DEFAULT_GENERATE_CONFIG_SECS: u64 = 43200;

/// Default upper bound for a single gatherer or repeater call
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Modes and Repeater Groups
// =============================================================================

/// Repeater group used by the collection timer
pub const GROUP_METRICS: &str = "Metrics";

/// Repeater group (and mode name) for configuration recommendations
pub const GROUP_CONFIGURATIONS: &str = "Configurations";

/// Repeater group (and mode name) for one-shot events
pub const GROUP_EVENTS: &str = "Events";

// =============================================================================
// Recommendation API
// =============================================================================

/// Default base URL of the recommendation API
pub const DEFAULT_API_URL: &str = "https://api.tuning-agent.io/v1";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Request timeout for API calls
pub const API_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// MySQL
// =============================================================================

/// Default MySQL host
pub const DEFAULT_MYSQL_HOST: &str = "127.0.0.1";

/// Default MySQL port
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default MySQL user
pub const DEFAULT_MYSQL_USER: &str = "tuning_agent";

/// Pool size for the agent's MySQL connections
pub const MYSQL_MAX_CONNECTIONS: u32 = 2;

/// Connection acquire timeout
pub const MYSQL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CloudWatch
// =============================================================================

/// CloudWatch namespace for RDS instance metrics
pub const CLOUDWATCH_RDS_NAMESPACE: &str = "AWS/RDS";

/// Dimension identifying the monitored RDS instance
pub const CLOUDWATCH_RDS_DIMENSION: &str = "DBInstanceIdentifier";

/// Resolution of each series in seconds
pub const CLOUDWATCH_PERIOD_SECS: i32 = 60;

/// Lookback window of the query in seconds
pub const CLOUDWATCH_LOOKBACK_SECS: i64 = 120;

/// Statistic requested for every series
pub const CLOUDWATCH_STAT: &str = "Average";
