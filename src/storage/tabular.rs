//! CSV interchange. Column names and order are part of the contract with
//! downstream consumers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};

use crate::error::Result;
use crate::models::{AnnotatedReview, Review, SentimentAggregate, ThemeAggregate};

pub const REVIEW_COLUMNS: [&str; 5] = ["review", "rating", "date", "bank", "source"];
pub const ANNOTATED_COLUMNS: [&str; 8] = [
    "review",
    "rating",
    "date",
    "bank",
    "source",
    "sentiment_label",
    "sentiment_score",
    "identified_themes",
];
pub const SENTIMENT_SUMMARY_COLUMNS: [&str; 3] = ["bank", "rating", "mean_sentiment"];
pub const THEME_SUMMARY_COLUMNS: [&str; 3] = ["bank", "theme", "count"];

const DEFAULT_SOURCE: &str = "Google Play";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReviewRow {
    review: Option<String>,
    rating: Option<String>,
    date: Option<String>,
    bank: Option<String>,
    source: Option<String>,
}

#[derive(Serialize)]
struct AnnotatedRow<'a> {
    review: &'a str,
    rating: u8,
    date: String,
    bank: &'a str,
    source: &'a str,
    sentiment_label: &'static str,
    sentiment_score: f32,
    identified_themes: String,
}

#[derive(Serialize)]
struct SentimentSummaryRow<'a> {
    bank: &'a str,
    rating: u8,
    mean_sentiment: f64,
}

#[derive(Serialize)]
struct ThemeSummaryRow<'a> {
    bank: &'a str,
    theme: &'a str,
    count: u32,
}

#[derive(Debug, Default)]
pub struct LoadedReviews {
    pub reviews: Vec<Review>,
    /// Undecodable rows, and rows missing text, bank, a 1-5 rating or a
    /// parseable date.
    pub dropped: usize,
    /// Rows repeating an earlier (text, date) pair.
    pub duplicates: usize,
}

/// Reads `review, rating, date, bank, source` rows, dropping malformed rows
/// and (text, date) duplicates.
pub fn read_reviews<R: Read>(reader: R) -> Result<LoadedReviews> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<&str> = REVIEW_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        tracing::warn!("Review input is missing columns: {}", missing.join(", "));
    }

    let mut loaded = LoadedReviews::default();
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();

    for row in csv_reader.deserialize::<RawReviewRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Dropping undecodable review row: {}", e);
                loaded.dropped += 1;
                continue;
            }
        };
        let Some(review) = into_review(row) else {
            loaded.dropped += 1;
            continue;
        };

        if !seen.insert((review.text.clone(), review.date)) {
            loaded.duplicates += 1;
            continue;
        }
        loaded.reviews.push(review);
    }

    tracing::info!(
        "Loaded {} reviews ({} malformed rows dropped, {} duplicates removed)",
        loaded.reviews.len(),
        loaded.dropped,
        loaded.duplicates
    );

    Ok(loaded)
}

fn into_review(row: RawReviewRow) -> Option<Review> {
    let text = row.review.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
    let organization = row.bank.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())?;
    let rating = row.rating.as_deref().and_then(parse_rating)?;
    let date = row.date.as_deref().and_then(parse_date)?;
    let source = row
        .source
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    Some(Review {
        text,
        rating,
        date,
        organization,
        source,
    })
}

fn parse_rating(value: &str) -> Option<u8> {
    let value = value.trim();
    let rating = match value.parse::<u8>() {
        Ok(r) => r,
        // Exports from dataframe tools often write "5.0".
        Err(_) => {
            let float: f64 = value.parse().ok()?;
            if float.fract() != 0.0 {
                return None;
            }
            float as u8
        }
    };
    (1..=5).contains(&rating).then_some(rating)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

pub fn write_annotated<W: Write>(writer: W, reviews: &[AnnotatedReview]) -> Result<()> {
    let mut csv_writer = headerless_writer(writer, &ANNOTATED_COLUMNS)?;
    for review in reviews {
        csv_writer.serialize(AnnotatedRow {
            review: &review.review.text,
            rating: review.review.rating,
            date: review.review.date.format("%Y-%m-%d").to_string(),
            bank: &review.review.organization,
            source: &review.review.source,
            sentiment_label: review.sentiment_label.as_str(),
            sentiment_score: review.sentiment_score,
            identified_themes: review.themes.label(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_sentiment_summary<W: Write>(writer: W, rows: &[SentimentAggregate]) -> Result<()> {
    let mut csv_writer = headerless_writer(writer, &SENTIMENT_SUMMARY_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(SentimentSummaryRow {
            bank: &row.organization,
            rating: row.rating,
            mean_sentiment: row.mean_sentiment,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_theme_summary<W: Write>(writer: W, rows: &[ThemeAggregate]) -> Result<()> {
    let mut csv_writer = headerless_writer(writer, &THEME_SUMMARY_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(ThemeSummaryRow {
            bank: &row.organization,
            theme: &row.theme,
            count: row.count,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Header is written up front so empty tables still carry their columns.
fn headerless_writer<W: Write>(writer: W, columns: &[&str]) -> Result<csv::Writer<W>> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv_writer.write_record(columns)?;
    Ok(csv_writer)
}
