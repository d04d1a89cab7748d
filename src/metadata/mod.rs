//! Movie metadata lookups.
//!
//! Provides a trait-based interface over the movie database and the normalized
//! record shape every lookup returns.

mod tmdb;
mod wire;

pub use tmdb::TmdbClient;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A movie, normalized so every lookup returns the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// TMDB movie ID.
    pub id: u64,
    /// Title.
    pub title: String,
    /// Synopsis.
    pub overview: String,
    /// Release date (if known).
    pub release_date: Option<NaiveDate>,
    /// Average vote, clamped to 0-10.
    pub rating: f32,
    /// Number of votes behind the rating.
    pub vote_count: u32,
    /// TMDB popularity score.
    pub popularity: f64,
    /// Poster path relative to the image base URL.
    pub poster_path: Option<String>,
    /// Top-billed cast names.
    pub cast: Vec<String>,
    /// Director name (if known).
    pub director: Option<String>,
}

impl MovieRecord {
    /// Full poster URL for the given image base.
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|p| format!("{}{}", image_base_url.trim_end_matches('/'), p))
    }

    /// Release year, for display.
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }
}

/// Trending time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a person played on a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersonRole {
    #[default]
    Cast,
    Director,
}

impl std::fmt::Display for PersonRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonRole::Cast => write!(f, "cast"),
            PersonRole::Director => write!(f, "director"),
        }
    }
}

/// Trait for movie metadata lookups.
///
/// Listing operations return an empty vector for empty-but-valid results.
/// Single-record lookups fail with `ReelError::NotFound` instead.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Movies matching all of the given genre names, most popular first.
    async fn search_by_genre(&self, genres: &BTreeSet<String>) -> Result<Vec<MovieRecord>>;

    /// The most popular movie matching a title.
    async fn search_by_title(&self, title: &str) -> Result<MovieRecord>;

    /// Movies similar to the best match for a title, excluding that movie.
    async fn find_similar(&self, title: &str) -> Result<Vec<MovieRecord>>;

    /// Trending movies, in trending rank order.
    async fn get_trending(&self, window: TimeWindow) -> Result<Vec<MovieRecord>>;

    /// Top rated movies, by rating then vote count.
    async fn get_top_rated(&self) -> Result<Vec<MovieRecord>>;

    /// Movies a person acted in or directed, most popular first.
    async fn search_by_person(&self, name: &str, role: PersonRole) -> Result<Vec<MovieRecord>>;
}

/// Sort by rating, ties broken by vote count, both descending.
pub fn sort_by_rating(movies: &mut [MovieRecord]) {
    movies.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| b.vote_count.cmp(&a.vote_count))
    });
}

/// Sort by popularity, descending.
pub fn sort_by_popularity(movies: &mut [MovieRecord]) {
    movies.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
}

#[cfg(test)]
pub(crate) fn sample_movie(id: u64, title: &str) -> MovieRecord {
    MovieRecord {
        id,
        title: title.to_string(),
        overview: String::new(),
        release_date: None,
        rating: 0.0,
        vote_count: 0,
        popularity: 0.0,
        poster_path: None,
        cast: Vec::new(),
        director: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: u64, rating: f32, votes: u32) -> MovieRecord {
        MovieRecord {
            rating,
            vote_count: votes,
            ..sample_movie(id, "m")
        }
    }

    #[test]
    fn test_sort_by_rating_breaks_ties_on_votes() {
        let mut movies = vec![rated(1, 8.5, 100), rated(2, 8.7, 10), rated(3, 8.5, 900)];
        sort_by_rating(&mut movies);
        let ids: Vec<_> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_poster_url() {
        let mut movie = sample_movie(1, "Inception");
        assert_eq!(movie.poster_url("https://image.tmdb.org/t/p/w500"), None);

        movie.poster_path = Some("/abc.jpg".to_string());
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p/w200/").as_deref(),
            Some("https://image.tmdb.org/t/p/w200/abc.jpg")
        );
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(serde_json::to_string(&TimeWindow::Day).unwrap(), "\"day\"");
        assert_eq!(
            serde_json::from_str::<PersonRole>("\"director\"").unwrap(),
            PersonRole::Director
        );
    }
}
