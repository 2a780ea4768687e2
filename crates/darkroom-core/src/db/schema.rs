//! Canonical SQLite projection schema for darkroom.
//!
//! The schema is normalized for queryability:
//! - `orders` keeps the latest aggregate fields for each order
//! - edge tables (`order_assignees`, `order_completions`) model the
//!   set-valued assignment and contribution fields
//! - `order_history` preserves an append-only audit trail of edits
//! - `notifications` holds short-lived alerts swept on a TTL

/// Migration v1: core normalized tables.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS orders (
    order_id TEXT PRIMARY KEY,
    customer TEXT NOT NULL,
    telecaller TEXT NOT NULL DEFAULT '',
    remark TEXT NOT NULL DEFAULT '',
    priority TEXT NOT NULL DEFAULT 'normal'
        CHECK (priority IN ('low', 'normal', 'high', 'urgent')),
    assignment TEXT NOT NULL DEFAULT 'direct'
        CHECK (assignment IN ('direct', 'broadcast', 'self')),
    status TEXT NOT NULL
        CHECK (status IN ('pending', 'in-progress', 'completed', 'waiting-approval')),
    sample_image_url TEXT,
    rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
    pending_edit TEXT,
    created_at_us INTEGER,
    completed_at_us INTEGER
);

CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at_us);

CREATE TABLE IF NOT EXISTS order_assignees (
    order_id TEXT NOT NULL REFERENCES orders(order_id) ON DELETE CASCADE,
    editor_id TEXT NOT NULL CHECK (length(trim(editor_id)) > 0),
    PRIMARY KEY (order_id, editor_id)
);

CREATE TABLE IF NOT EXISTS order_completions (
    order_id TEXT NOT NULL REFERENCES orders(order_id) ON DELETE CASCADE,
    editor_id TEXT NOT NULL CHECK (length(trim(editor_id)) > 0),
    PRIMARY KEY (order_id, editor_id)
);

CREATE TABLE IF NOT EXISTS editors (
    editor_id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'editor' CHECK (role IN ('editor', 'team-leader')),
    employment TEXT NOT NULL DEFAULT 'active'
        CHECK (employment IN ('active', 'terminated')),
    self_order_approved INTEGER NOT NULL DEFAULT 0 CHECK (self_order_approved IN (0, 1)),
    rating REAL,
    targets TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS order_history (
    entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id TEXT NOT NULL REFERENCES orders(order_id) ON DELETE CASCADE,
    action TEXT NOT NULL,
    actor TEXT NOT NULL,
    details TEXT NOT NULL DEFAULT '{}',
    at_us INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_order ON order_history(order_id, at_us);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipient TEXT NOT NULL,
    sender TEXT NOT NULL,
    message TEXT NOT NULL,
    order_id TEXT,
    order_name TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL DEFAULT 'info' CHECK (kind IN ('info', 'danger')),
    is_read INTEGER NOT NULL DEFAULT 0 CHECK (is_read IN (0, 1)),
    created_at_us INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient, is_read);
";
