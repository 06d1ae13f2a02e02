use std::{cmp::Ordering, path::Path};

use portal_api::types::distance::{compare_distance, xor_bytes};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{functions::FunctionFlags, Connection};
use tracing::info;

use crate::{
    error::ContentStoreError,
    sql::{CREATE_QUERY_DB, ENABLE_WAL_MODE},
    DATABASE_NAME,
};

/// Helper function for opening a SQLite connection pool.
///
/// Every pooled connection gets the distance functions registered.
pub fn setup_sql(node_data_dir: &Path) -> Result<Pool<SqliteConnectionManager>, ContentStoreError> {
    let sql_path = node_data_dir.join(DATABASE_NAME);
    info!(path = %sql_path.display(), "Setting up SqliteDB");

    let manager = SqliteConnectionManager::file(sql_path).with_init(|conn| {
        conn.execute_batch(ENABLE_WAL_MODE)?;
        register_distance_functions(conn)
    });
    let pool = Pool::new(manager)?;
    pool.get()?.execute_batch(CREATE_QUERY_DB)?;
    Ok(pool)
}

/// Registers `xor(a, b)` and `greater(a, b)` on `conn`.
///
/// `xor` is the byte-wise exclusive-or of two blobs, left padding the shorter one with zeros.
/// `greater` compares two blobs as unsigned big-endian integers.
pub fn register_distance_functions(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
    conn.create_scalar_function("xor", 2, flags, |ctx| {
        let a = ctx.get::<Vec<u8>>(0)?;
        let b = ctx.get::<Vec<u8>>(1)?;
        Ok(xor_bytes(&a, &b))
    })?;
    conn.create_scalar_function("greater", 2, flags, |ctx| {
        let a = ctx.get::<Vec<u8>>(0)?;
        let b = ctx.get::<Vec<u8>>(1)?;
        Ok(compare_distance(&a, &b) == Ordering::Greater)
    })
}
