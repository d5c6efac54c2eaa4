//! SQLite schema definition.

/// Complete database schema for the medicine directory.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Medicine Directory
-- ============================================================================

CREATE TABLE IF NOT EXISTS medicines (
    id INTEGER PRIMARY KEY,
    brand_name TEXT NOT NULL,
    manufacturer TEXT,
    price,                                        -- raw value, may not be numeric
    pack_size TEXT,
    composition TEXT,
    description TEXT,
    discontinued INTEGER NOT NULL DEFAULT 0
);

-- Exact-match key for alternatives
CREATE INDEX IF NOT EXISTS idx_medicines_composition ON medicines(composition);
CREATE INDEX IF NOT EXISTS idx_medicines_brand_name ON medicines(brand_name);

-- FTS5 virtual table for composition search
CREATE VIRTUAL TABLE IF NOT EXISTS medicines_fts USING fts5(
    composition,
    content='medicines',
    content_rowid='id'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS medicines_ai AFTER INSERT ON medicines BEGIN
    INSERT INTO medicines_fts(rowid, composition)
    VALUES (new.id, new.composition);
END;

CREATE TRIGGER IF NOT EXISTS medicines_ad AFTER DELETE ON medicines BEGIN
    INSERT INTO medicines_fts(medicines_fts, rowid, composition)
    VALUES ('delete', old.id, old.composition);
END;

CREATE TRIGGER IF NOT EXISTS medicines_au AFTER UPDATE ON medicines BEGIN
    INSERT INTO medicines_fts(medicines_fts, rowid, composition)
    VALUES ('delete', old.id, old.composition);
    INSERT INTO medicines_fts(rowid, composition)
    VALUES (new.id, new.composition);
END;
"#;
