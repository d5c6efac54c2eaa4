//! Medicine directory database operations.

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbResult, MedicineStore};
use crate::models::MedicineRecord;

const PRIMARY_WITH_COMPOSITION_SQL: &str = r#"
    SELECT id, brand_name, manufacturer, price, pack_size,
           composition, description, discontinued
    FROM medicines
    WHERE (brand_name LIKE ?1 ESCAPE '\'
           OR id IN (SELECT rowid FROM medicines_fts WHERE medicines_fts MATCH ?2))
    AND discontinued = 0
    ORDER BY
        CASE WHEN brand_name LIKE ?1 ESCAPE '\' THEN 1 ELSE 2 END,
        brand_name COLLATE NOCASE,
        id
    LIMIT ?3
"#;

const PRIMARY_BRAND_ONLY_SQL: &str = r#"
    SELECT id, brand_name, manufacturer, price, pack_size,
           composition, description, discontinued
    FROM medicines
    WHERE brand_name LIKE ?1 ESCAPE '\'
    AND discontinued = 0
    ORDER BY brand_name COLLATE NOCASE, id
    LIMIT ?2
"#;

const ALTERNATIVES_SQL: &str = r#"
    SELECT id, brand_name, manufacturer, price, pack_size,
           composition, description, discontinued
    FROM medicines
    WHERE composition = ?1
    AND id != ?2
    AND discontinued = 0
    ORDER BY brand_name COLLATE NOCASE, id
    LIMIT ?3
"#;

impl MedicineStore for Connection {
    fn primary_matches(&self, term: &str, limit: usize) -> DbResult<Vec<MedicineRecord>> {
        let pattern = like_pattern(term);
        let mut records = Vec::new();

        // Terms without any word (e.g. "%%") can only match by brand name
        match fts_match_expression(term) {
            Some(expression) => {
                let mut stmt = self.prepare_cached(PRIMARY_WITH_COMPOSITION_SQL)?;
                let rows =
                    stmt.query_map(params![pattern, expression, limit as i64], read_record)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = self.prepare_cached(PRIMARY_BRAND_ONLY_SQL)?;
                let rows = stmt.query_map(params![pattern, limit as i64], read_record)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }

        Ok(records)
    }

    fn alternatives_for(
        &self,
        composition: &str,
        exclude_id: i64,
        limit: usize,
    ) -> DbResult<Vec<MedicineRecord>> {
        let mut stmt = self.prepare_cached(ALTERNATIVES_SQL)?;
        let rows = stmt.query_map(params![composition, exclude_id, limit as i64], read_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

impl Database {
    /// Insert or update a medicine record.
    pub fn upsert_medicine(&self, record: &MedicineRecord) -> DbResult<()> {
        upsert(&self.conn, record)
    }

    /// Upsert many records in a single transaction. Returns the number written.
    pub fn upsert_medicines(&mut self, records: &[MedicineRecord]) -> DbResult<usize> {
        let tx = self.transaction()?;
        for record in records {
            upsert(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Get a medicine record by id, discontinued or not.
    pub fn get_medicine(&self, id: i64) -> DbResult<Option<MedicineRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT id, brand_name, manufacturer, price, pack_size,
                       composition, description, discontinued
                FROM medicines
                WHERE id = ?
                "#,
                [id],
                read_record,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Total number of records, discontinued included.
    pub fn count_medicines(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicines", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn upsert(conn: &Connection, record: &MedicineRecord) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO medicines (
            id, brand_name, manufacturer, price, pack_size,
            composition, description, discontinued
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            brand_name = excluded.brand_name,
            manufacturer = excluded.manufacturer,
            price = excluded.price,
            pack_size = excluded.pack_size,
            composition = excluded.composition,
            description = excluded.description,
            discontinued = excluded.discontinued
        "#,
        params![
            record.id,
            record.brand_name,
            record.manufacturer,
            record.price,
            record.pack_size,
            record.composition,
            record.description,
            record.discontinued,
        ],
    )?;
    Ok(())
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<MedicineRecord> {
    Ok(MedicineRecord {
        id: row.get(0)?,
        brand_name: row.get(1)?,
        manufacturer: row.get(2)?,
        price: raw_price(row, 3)?,
        pack_size: row.get(4)?,
        composition: row.get(5)?,
        description: row.get(6)?,
        discontinued: row.get(7)?,
    })
}

/// The price column is untyped; keep whatever was stored as text.
fn raw_price(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}

/// Substring `LIKE` pattern with wildcards in the term matched literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Build an FTS5 query matching any word of the term.
///
/// Each word is quoted so FTS5 operators (`AND`, `NEAR`, `*`) are taken
/// literally. Returns `None` when the term has no words.
fn fts_match_expression(term: &str) -> Option<String> {
    let words: Vec<String> = term
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{}\"", word))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" OR "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn medicine(id: i64, brand_name: &str, composition: Option<&str>) -> MedicineRecord {
        let mut record = MedicineRecord::new(id, brand_name.into());
        record.composition = composition.map(Into::into);
        record.manufacturer = Some("Acme Pharma".into());
        record.price = Some("10.00".into());
        record.pack_size = Some("strip of 10 tablets".into());
        record
    }

    fn ids(records: &[MedicineRecord]) -> Vec<i64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        let mut record = medicine(1, "Crocin Advance", Some("Paracetamol (500mg)"));
        record.description = Some("Pain reliever".into());
        db.upsert_medicine(&record).unwrap();

        let retrieved = db.get_medicine(1).unwrap().unwrap();
        assert_eq!(retrieved, record);
        assert!(db.get_medicine(2).unwrap().is_none());
    }

    #[test]
    fn test_upsert_updates() {
        let db = setup_db();

        let mut record = medicine(1, "Original Name", None);
        db.upsert_medicine(&record).unwrap();

        record.brand_name = "Updated Name".into();
        db.upsert_medicine(&record).unwrap();

        let retrieved = db.get_medicine(1).unwrap().unwrap();
        assert_eq!(retrieved.brand_name, "Updated Name");
        assert_eq!(db.count_medicines().unwrap(), 1);
    }

    #[test]
    fn test_upsert_many() {
        let mut db = setup_db();
        let records = vec![
            medicine(1, "Crocin", Some("Paracetamol (500mg)")),
            medicine(2, "Calpol", Some("Paracetamol (500mg)")),
        ];

        assert_eq!(db.upsert_medicines(&records).unwrap(), 2);
        assert_eq!(db.count_medicines().unwrap(), 2);
    }

    #[test]
    fn test_primary_by_brand_substring_case_insensitive() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Crocin Advance", None)).unwrap();
        db.upsert_medicine(&medicine(2, "Dolo 650", None)).unwrap();

        let results = db.primary_matches("ROCIN", 5).unwrap();
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_primary_by_composition() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Dolo 650", Some("Paracetamol (650mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(2, "Brufen", Some("Ibuprofen (400mg)")))
            .unwrap();

        let results = db.primary_matches("paracetamol", 5).unwrap();
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_primary_brand_matches_rank_first() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Alpha Tab", Some("Paracetamol (500mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(2, "Paracetamol IP", Some("Paracetamol (500mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(3, "Beta Tab", Some("Paracetamol (650mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(4, "Paracip", Some("Paracetamol (500mg)")))
            .unwrap();

        let results = db.primary_matches("paracetamol", 5).unwrap();
        // "Paracetamol IP" matches by brand; the rest by composition, by name
        assert_eq!(ids(&results), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_primary_orders_brand_names_ignoring_case() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Zyrtec para", None)).unwrap();
        db.upsert_medicine(&medicine(2, "aspara", None)).unwrap();
        db.upsert_medicine(&medicine(3, "Bpara", None)).unwrap();

        let results = db.primary_matches("para", 5).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.brand_name.as_str()).collect();
        assert_eq!(names, vec!["aspara", "Bpara", "Zyrtec para"]);

        // Same order when the term has no words
        db.upsert_medicine(&medicine(4, "zinc 5%", None)).unwrap();
        db.upsert_medicine(&medicine(5, "Acne 2%", None)).unwrap();
        let results = db.primary_matches("%", 5).unwrap();
        assert_eq!(ids(&results), vec![5, 4]);
    }

    #[test]
    fn test_primary_excludes_discontinued() {
        let db = setup_db();
        let mut record = medicine(1, "Crocin", Some("Paracetamol (500mg)"));
        record.discontinued = true;
        db.upsert_medicine(&record).unwrap();

        assert!(db.primary_matches("crocin", 5).unwrap().is_empty());
        assert!(db.primary_matches("paracetamol", 5).unwrap().is_empty());
    }

    #[test]
    fn test_primary_respects_limit() {
        let db = setup_db();
        for id in 1..=8 {
            db.upsert_medicine(&medicine(id, &format!("Crocin {}", id), None))
                .unwrap();
        }

        assert_eq!(db.primary_matches("crocin", 5).unwrap().len(), 5);
    }

    #[test]
    fn test_primary_wildcards_are_literal() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Zinc 50% Cream", None)).unwrap();
        db.upsert_medicine(&medicine(2, "Zinc 500 Tab", None)).unwrap();

        let results = db.primary_matches("50%", 5).unwrap();
        assert_eq!(ids(&results), vec![1]);

        let results = db.primary_matches("%", 5).unwrap();
        assert_eq!(ids(&results), vec![1]);

        assert!(db.primary_matches("_", 5).unwrap().is_empty());
    }

    #[test]
    fn test_primary_fts_operators_are_literal() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Combo", Some("Amoxycillin (500mg) AND Clavulanic Acid")))
            .unwrap();

        // Bare operators must not be parsed as FTS5 syntax
        let results = db.primary_matches("NOT", 5).unwrap();
        assert!(results.is_empty());

        let results = db.primary_matches("AND", 5).unwrap();
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_primary_no_match() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Crocin", Some("Paracetamol (500mg)")))
            .unwrap();

        assert!(db.primary_matches("zzzz", 5).unwrap().is_empty());
    }

    #[test]
    fn test_alternatives_exact_composition() {
        let db = setup_db();
        db.upsert_medicine(&medicine(1, "Crocin", Some("Paracetamol (500mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(2, "Calpol", Some("Paracetamol (500mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(3, "Pacimol", Some("paracetamol (500mg)")))
            .unwrap();
        db.upsert_medicine(&medicine(4, "Dolo", Some("Paracetamol (500mg) ")))
            .unwrap();
        db.upsert_medicine(&medicine(5, "Dolo 650", Some("Paracetamol (650mg)")))
            .unwrap();

        let results = db.alternatives_for("Paracetamol (500mg)", 1, 5).unwrap();
        assert_eq!(ids(&results), vec![2]);
    }

    #[test]
    fn test_alternatives_ordered_limited_and_exclude_discontinued() {
        let db = setup_db();
        let composition = "Cetirizine (10mg)";
        for (id, name) in [
            (1, "Okacet"),
            (2, "Zyrtec"),
            (3, "Alerid"),
            (4, "Cetzine"),
            (5, "Cetcip"),
            (6, "Incid"),
            (7, "Betacet"),
        ] {
            db.upsert_medicine(&medicine(id, name, Some(composition))).unwrap();
        }
        let mut discontinued = medicine(8, "Aardvark Cet", Some(composition));
        discontinued.discontinued = true;
        db.upsert_medicine(&discontinued).unwrap();

        let results = db.alternatives_for(composition, 1, 5).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.brand_name.as_str()).collect();
        assert_eq!(names, vec!["Alerid", "Betacet", "Cetcip", "Cetzine", "Incid"]);
    }

    #[test]
    fn test_alternatives_order_ignores_case() {
        let db = setup_db();
        let composition = "Levocetirizine (5mg)";
        db.upsert_medicine(&medicine(1, "Levocet", Some(composition))).unwrap();
        db.upsert_medicine(&medicine(2, "Xyzal", Some(composition))).unwrap();
        db.upsert_medicine(&medicine(3, "cetlev", Some(composition))).unwrap();
        db.upsert_medicine(&medicine(4, "Allercet", Some(composition))).unwrap();

        let results = db.alternatives_for(composition, 1, 5).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.brand_name.as_str()).collect();
        assert_eq!(names, vec!["Allercet", "cetlev", "Xyzal"]);
    }

    #[test]
    fn test_raw_price_round_trip() {
        let db = setup_db();
        let mut record = medicine(1, "Crocin", None);
        record.price = Some("₹ on request".into());
        db.upsert_medicine(&record).unwrap();

        db.conn()
            .execute("INSERT INTO medicines (id, brand_name, price) VALUES (2, 'Calpol', 12.5)", [])
            .unwrap();

        assert_eq!(
            db.get_medicine(1).unwrap().unwrap().price.as_deref(),
            Some("₹ on request")
        );
        let calpol = db.get_medicine(2).unwrap().unwrap();
        assert_eq!(calpol.price_value(), Some(12.5));
    }

    #[test]
    fn test_fts_match_expression() {
        assert_eq!(
            fts_match_expression("Paracetamol 500mg"),
            Some("\"Paracetamol\" OR \"500mg\"".into())
        );
        assert_eq!(fts_match_expression("(500mg)"), Some("\"500mg\"".into()));
        assert_eq!(fts_match_expression("%% --"), None);
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("crocin"), "%crocin%");
        assert_eq!(like_pattern("50%_x\\"), "%50\\%\\_x\\\\%");
    }
}
