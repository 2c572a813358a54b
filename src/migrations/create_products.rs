//! Create the `products` table
//!
//! Five columns: a surrogate `id` key, nullable `cost` and `name` business
//! columns, and `created_at`/`updated_at` timestamps. Both timestamps
//! default to the current UTC time at insert; an update trigger refreshes
//! `updated_at` on every row modification and never touches `created_at`.

use rusqlite::Connection;

use crate::error::ShiftError;
use crate::migrate::Migration;

/// SQL for creating the products table
///
/// No `IF NOT EXISTS`: applying on top of an existing table must fail with
/// a schema conflict and leave the original table intact.
const PRODUCTS_TABLE: &str = r#"
    CREATE TABLE products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        cost REAL,
        name TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
    );
"#;

/// SQL for the updated_at refresh trigger
const PRODUCTS_TOUCH_TRIGGER: &str = r#"
    CREATE TRIGGER products_touch_updated_at
    AFTER UPDATE ON products
    FOR EACH ROW
    BEGIN
        UPDATE products
        SET updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now')
        WHERE id = NEW.id;
    END;
"#;

/// Migration creating the `products` table
pub struct CreateProducts;

impl Migration for CreateProducts {
    fn version(&self) -> u64 {
        20170616211742
    }

    fn name(&self) -> &'static str {
        "create_products"
    }

    fn up(&self, conn: &Connection) -> Result<(), ShiftError> {
        conn.execute(PRODUCTS_TABLE, [])?;
        conn.execute(PRODUCTS_TOUCH_TRIGGER, [])?;
        Ok(())
    }

    fn down(&self, conn: &Connection) -> Result<(), ShiftError> {
        // Trigger first: dropping the table would take it along and leave
        // nothing for the symmetric drop to act on
        conn.execute("DROP TRIGGER products_touch_updated_at", [])?;
        conn.execute("DROP TABLE products", [])?;
        Ok(())
    }
}
