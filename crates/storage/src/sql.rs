// SQLite Statements
//
// Content is keyed by content id. `xor` and `greater` are registered on every connection, see
// `utils::register_distance_functions`.

pub const CREATE_QUERY_DB: &str = "CREATE TABLE IF NOT EXISTS kvstore (
    key BLOB PRIMARY KEY,
    value BLOB NOT NULL
);";

pub const INSERT_QUERY: &str = "INSERT OR REPLACE INTO kvstore (key, value) VALUES (?1, ?2)";

pub const CONTENT_VALUE_LOOKUP_QUERY: &str = "SELECT value FROM kvstore WHERE key = (?1) LIMIT 1";

pub const CONTENT_KEY_LOOKUP_QUERY: &str = "SELECT key FROM kvstore WHERE key = (?1) LIMIT 1";

pub const DELETE_QUERY: &str = "DELETE FROM kvstore WHERE key = (?1)";

/// Entry count and the sum of key and value lengths.
pub const USAGE_STATS_QUERY: &str = "SELECT
    COUNT(*) AS count,
    TOTAL(length(key) + length(value)) AS used_capacity
    FROM kvstore";

/// Farthest content from the node id passed as `?1`.
pub const FARTHEST_QUERY: &str = "SELECT key FROM kvstore ORDER BY xor(key, (?1)) DESC LIMIT 1";

/// All content, farthest from the node id passed as `?1` first.
pub const FARTHEST_CONTENT_SIZES_QUERY: &str =
    "SELECT key, length(key) + length(value) AS content_size
    FROM kvstore
    ORDER BY xor(key, (?1)) DESC";

/// Deletes content farther from the node id `?1` than the radius `?2`.
pub const DELETE_OUT_OF_RADIUS_QUERY: &str =
    "DELETE FROM kvstore WHERE greater(xor(key, (?1)), (?2)) = 1";

/// WAL mode, with relaxed syncing, for concurrent readers during writes.
pub const ENABLE_WAL_MODE: &str = "PRAGMA journal_mode = WAL;PRAGMA synchronous = NORMAL;";
