use rusqlite::{Connection, Transaction, params};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::Result;
use crate::models::{
    AnnotatedReview, Review, SentimentAggregate, SentimentLabel, ThemeAggregate, ThemeSet,
};

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS banks (
                bank_id INTEGER PRIMARY KEY,
                bank_name TEXT UNIQUE NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reviews (
                review_id INTEGER PRIMARY KEY,
                review_text TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                review_date TEXT NOT NULL,
                bank_id INTEGER NOT NULL REFERENCES banks(bank_id),
                source TEXT,
                sentiment_label TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                identified_themes TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sentiment_summary (
                bank_id INTEGER NOT NULL REFERENCES banks(bank_id),
                rating INTEGER NOT NULL,
                mean_sentiment REAL NOT NULL,
                UNIQUE(bank_id, rating)
            );

            CREATE TABLE IF NOT EXISTS theme_summary (
                bank_id INTEGER NOT NULL REFERENCES banks(bank_id),
                theme TEXT NOT NULL,
                count INTEGER NOT NULL,
                UNIQUE(bank_id, theme)
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_bank_id ON reviews(bank_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_reviews_natural_key
                ON reviews(review_text, review_date, bank_id);
            "#,
        )?;

        Ok(())
    }

    /// Upserts annotated reviews keyed on (text, date, bank), creating banks by
    /// name as needed. A re-run overwrites the stored annotation instead of
    /// adding a copy. Rows with blank text are skipped. Returns the number
    /// written.
    pub fn save_reviews(&mut self, reviews: &[AnnotatedReview]) -> Result<usize> {
        let tx = self.conn.transaction()?;

        let bank_ids = upsert_banks(&tx, reviews.iter().map(|r| r.organization()))?;
        tracing::debug!("Banks table populated with {} names", bank_ids.len());

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO reviews (review_text, rating, review_date, bank_id, source, sentiment_label, sentiment_score, identified_themes)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(review_text, review_date, bank_id) DO UPDATE SET
                    rating = excluded.rating,
                    source = excluded.source,
                    sentiment_label = excluded.sentiment_label,
                    sentiment_score = excluded.sentiment_score,
                    identified_themes = excluded.identified_themes
                "#,
            )?;

            for review in reviews {
                if review.review.text.trim().is_empty() {
                    tracing::warn!(
                        "Skipping review with empty text for {} on {}",
                        review.organization(),
                        review.review.date
                    );
                    continue;
                }

                stmt.execute(params![
                    review.review.text,
                    review.review.rating,
                    review.review.date.format("%Y-%m-%d").to_string(),
                    bank_ids[review.organization()],
                    review.review.source,
                    review.sentiment_label.as_str(),
                    review.sentiment_score,
                    review.themes.label(),
                ])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        tracing::info!("Successfully loaded {} reviews into the database", inserted);
        Ok(inserted)
    }

    /// Replaces both summary tables with the rows of the latest run.
    pub fn save_summaries(
        &mut self,
        sentiment: &[SentimentAggregate],
        themes: &[ThemeAggregate],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM sentiment_summary", [])?;
        tx.execute("DELETE FROM theme_summary", [])?;

        let organizations = sentiment
            .iter()
            .map(|r| r.organization.as_str())
            .chain(themes.iter().map(|r| r.organization.as_str()));
        let bank_ids = upsert_banks(&tx, organizations)?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO sentiment_summary (bank_id, rating, mean_sentiment) VALUES (?1, ?2, ?3)",
            )?;
            for row in sentiment {
                stmt.execute(params![bank_ids[row.organization.as_str()], row.rating, row.mean_sentiment])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO theme_summary (bank_id, theme, count) VALUES (?1, ?2, ?3)",
            )?;
            for row in themes {
                stmt.execute(params![bank_ids[row.organization.as_str()], row.theme, row.count])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn bank_ids(&self) -> Result<HashMap<String, i64>> {
        let mut stmt = self.conn.prepare("SELECT bank_name, bank_id FROM banks")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<std::result::Result<HashMap<_, _>, _>>().map_err(Into::into)
    }

    pub fn review_count(&self, organization: Option<&str>) -> Result<u64> {
        let count: i64 = match organization {
            Some(name) => self.conn.query_row(
                r#"
                SELECT COUNT(*) FROM reviews r
                JOIN banks b ON r.bank_id = b.bank_id
                WHERE b.bank_name = ?1
                "#,
                params![name],
                |row| row.get(0),
            )?,
            None => self.conn.query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }

    /// Stored reviews in insertion order.
    pub fn load_reviews(&self) -> Result<Vec<AnnotatedReview>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT r.review_text, r.rating, r.review_date, b.bank_name, r.source,
                   r.sentiment_label, r.sentiment_score, r.identified_themes
            FROM reviews r
            JOIN banks b ON r.bank_id = b.bank_id
            ORDER BY r.review_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,         // review_text
                row.get::<_, u8>(1)?,             // rating
                row.get::<_, String>(2)?,         // review_date
                row.get::<_, String>(3)?,         // bank_name
                row.get::<_, Option<String>>(4)?, // source
                row.get::<_, String>(5)?,         // sentiment_label
                row.get::<_, f32>(6)?,            // sentiment_score
                row.get::<_, String>(7)?,         // identified_themes
            ))
        })?;

        let mut reviews = Vec::new();
        for row in rows {
            let (text, rating, date_str, organization, source, label_str, score, themes_str) = row?;

            let Some(date) = crate::storage::tabular::parse_date(&date_str) else {
                tracing::warn!("Skipping stored review with unreadable date '{}'", date_str);
                continue;
            };
            let sentiment_label = label_str.parse().unwrap_or(SentimentLabel::Neutral);

            reviews.push(AnnotatedReview {
                review: Review {
                    text,
                    rating,
                    date,
                    organization,
                    source: source.unwrap_or_default(),
                },
                sentiment_label,
                sentiment_score: score,
                themes: ThemeSet::parse_label(&themes_str),
            });
        }

        Ok(reviews)
    }

    pub fn load_sentiment_summary(&self) -> Result<Vec<SentimentAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT b.bank_name, s.rating, s.mean_sentiment
            FROM sentiment_summary s
            JOIN banks b ON s.bank_id = b.bank_id
            ORDER BY b.bank_name, s.rating
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(SentimentAggregate {
                organization: row.get(0)?,
                rating: row.get(1)?,
                mean_sentiment: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn load_theme_summary(&self) -> Result<Vec<ThemeAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT b.bank_name, t.theme, t.count
            FROM theme_summary t
            JOIN banks b ON t.bank_id = b.bank_id
            ORDER BY b.bank_name, t.count DESC, t.theme
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ThemeAggregate {
                organization: row.get(0)?,
                theme: row.get(1)?,
                count: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// Inserts any unknown bank names and returns the name to id map.
fn upsert_banks<'a>(
    tx: &Transaction<'_>,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, i64>> {
    let names: BTreeSet<&str> = names.collect();

    {
        let mut stmt = tx.prepare(
            "INSERT INTO banks (bank_name) VALUES (?1) ON CONFLICT(bank_name) DO NOTHING",
        )?;
        for name in &names {
            stmt.execute(params![name])?;
        }
    }

    let mut stmt = tx.prepare("SELECT bank_name, bank_id FROM banks")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<std::result::Result<HashMap<_, _>, _>>().map_err(Into::into)
}
