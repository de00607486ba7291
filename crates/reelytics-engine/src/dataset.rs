//! Dataset acquisition and parsing.
//!
//! The MovieLens 1M archive ships latin-1 encoded, `::`-separated `.dat`
//! files. [`ensure_movielens`] downloads the zip once and normalizes the
//! three tables into UTF-8 CSVs under the data directory; subsequent calls
//! skip all work when the CSVs already exist. Ratings can also arrive as a
//! user-supplied CSV upload with the same `userId,movieId,rating,timestamp`
//! header.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use reelytics_core::event::{MovieRow, RatingRow, UserRow};

pub const RATINGS_CSV: &str = "ratings.csv";
pub const USERS_CSV: &str = "users.csv";
pub const MOVIES_CSV: &str = "movies.csv";

/// The three source tables, post-parse.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub ratings: Vec<RatingRow>,
    pub users: Vec<UserRow>,
    pub movies: Vec<MovieRow>,
}

/// True when all three normalized CSVs are present under `data_dir`.
pub fn dataset_present(data_dir: &Path) -> bool {
    [RATINGS_CSV, USERS_CSV, MOVIES_CSV]
        .iter()
        .all(|name| data_dir.join(name).exists())
}

/// Idempotently fetch and normalize the MovieLens archive.
///
/// Skips everything when the CSVs already exist. Download and decode
/// failures are the loader's concern; callers get one error and no partial
/// CSV set (files are written only after all three tables parsed).
pub async fn ensure_movielens(data_dir: &Path, url: &str) -> Result<()> {
    if dataset_present(data_dir) {
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    info!(url, "Downloading MovieLens archive");
    let bytes = reqwest::get(url)
        .await
        .context("dataset download failed")?
        .error_for_status()
        .context("dataset download failed")?
        .bytes()
        .await
        .context("reading dataset body failed")?;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_ref()))
        .context("dataset archive is not a valid zip")?;

    let ratings = parse_dat_rows(&read_member(&mut archive, "ml-1m/ratings.dat")?, 4)?
        .into_iter()
        .map(|fields| parse_rating_fields(&fields))
        .collect::<Result<Vec<RatingRow>>>()?;
    let users = parse_dat_rows(&read_member(&mut archive, "ml-1m/users.dat")?, 5)?
        .into_iter()
        .map(|fields| parse_user_fields(&fields))
        .collect::<Result<Vec<UserRow>>>()?;
    // Titles may contain colons; genres is always the final field.
    let movies = parse_dat_rows(&read_member(&mut archive, "ml-1m/movies.dat")?, 3)?
        .into_iter()
        .map(|fields| parse_movie_fields(&fields))
        .collect::<Result<Vec<MovieRow>>>()?;

    write_csv(&data_dir.join(RATINGS_CSV), &ratings)?;
    write_csv(&data_dir.join(USERS_CSV), &users)?;
    write_csv(&data_dir.join(MOVIES_CSV), &movies)?;

    info!(
        ratings = ratings.len(),
        users = users.len(),
        movies = movies.len(),
        "Normalized MovieLens tables written as UTF-8 CSVs"
    );
    Ok(())
}

/// Load the normalized CSVs from `data_dir`.
pub fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    Ok(Dataset {
        ratings: read_csv(&data_dir.join(RATINGS_CSV))?,
        users: read_csv(&data_dir.join(USERS_CSV))?,
        movies: read_csv(&data_dir.join(MOVIES_CSV))?,
    })
}

/// Parse an uploaded ratings CSV (`userId,movieId,rating,timestamp` header).
/// UTF-8 first, latin-1 fallback, matching how the source files are encoded.
pub fn parse_ratings_csv(bytes: &[u8]) -> Result<Vec<RatingRow>> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => latin1_to_string(bytes),
    };

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.deserialize::<RatingRow>() {
        rows.push(record.context("invalid ratings row")?);
    }
    if rows.is_empty() {
        return Err(anyhow!("ratings upload contained no rows"));
    }
    Ok(rows)
}

/// Latin-1 maps each byte to the identical code point.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn read_member(
    archive: &mut zip::ZipArchive<std::io::Cursor<&[u8]>>,
    name: &str,
) -> Result<String> {
    let mut member = archive
        .by_name(name)
        .with_context(|| format!("archive member {name} missing"))?;
    let mut raw = Vec::new();
    member
        .read_to_end(&mut raw)
        .with_context(|| format!("reading {name}"))?;
    Ok(latin1_to_string(&raw))
}

/// Split `::`-separated lines into exactly `fields` columns. The final
/// column keeps any embedded separators (movie titles contain colons).
fn parse_dat_rows(text: &str, fields: usize) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<String> = line.splitn(fields, "::").map(str::to_string).collect();
        if parts.len() != fields {
            return Err(anyhow!(
                "malformed .dat line (expected {fields} fields): {line}"
            ));
        }
        rows.push(parts);
    }
    Ok(rows)
}

fn parse_rating_fields(fields: &[String]) -> Result<RatingRow> {
    Ok(RatingRow {
        user_id: fields[0].parse().context("ratings: bad userId")?,
        item_id: fields[1].parse().context("ratings: bad movieId")?,
        rating: fields[2].parse().context("ratings: bad rating")?,
        timestamp: fields[3].parse().context("ratings: bad timestamp")?,
    })
}

fn parse_user_fields(fields: &[String]) -> Result<UserRow> {
    Ok(UserRow {
        user_id: fields[0].parse().context("users: bad userId")?,
        gender: fields[1].clone(),
        age: fields[2].parse().context("users: bad age")?,
        occupation: fields[3].parse().context("users: bad occupation")?,
        zip: fields[4].clone(),
    })
}

fn parse_movie_fields(fields: &[String]) -> Result<MovieRow> {
    Ok(MovieRow {
        item_id: fields[0].parse().context("movies: bad movieId")?,
        title: fields[1].clone(),
        genres: fields[2].clone(),
    })
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("writing {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("reading {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<T>() {
        rows.push(record.with_context(|| format!("invalid row in {}", path.display()))?);
    }
    Ok(rows)
}
