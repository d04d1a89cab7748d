//! Response shapes of the TMDB v3 API, reduced to the fields we read.
//!
//! Every field defaults so additive or missing upstream fields never fail decoding.

use super::MovieRecord;
use chrono::NaiveDate;
use serde::Deserialize;

/// Number of top-billed cast names kept on a record.
pub const CAST_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// A paged listing (`search`, `discover`, `trending`, `similar`, `top_rated`).
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u32,
    pub popularity: f64,
    pub poster_path: Option<String>,
}

impl Default for MovieSummary {
    fn default() -> Self {
        Self {
            id: 0,
            title: String::new(),
            overview: String::new(),
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            popularity: 0.0,
            poster_path: None,
        }
    }
}

impl From<MovieSummary> for MovieRecord {
    fn from(m: MovieSummary) -> Self {
        MovieRecord {
            id: m.id,
            title: m.title,
            overview: m.overview,
            release_date: m.release_date.as_deref().and_then(parse_date),
            rating: m.vote_average.clamp(0.0, 10.0) as f32,
            vote_count: m.vote_count,
            popularity: m.popularity,
            poster_path: m.poster_path.filter(|p| !p.is_empty()),
            cast: Vec::new(),
            director: None,
        }
    }
}

/// `GET /movie/{id}?append_to_response=credits`
#[derive(Debug, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default)]
    pub credits: Credits,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Deserialize)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

impl From<MovieDetails> for MovieRecord {
    fn from(details: MovieDetails) -> Self {
        let mut cast = details.credits.cast;
        cast.sort_by_key(|c| c.order);

        let director = details
            .credits
            .crew
            .into_iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name);

        MovieRecord {
            cast: cast.into_iter().take(CAST_LIMIT).map(|c| c.name).collect(),
            director,
            ..details.summary.into()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PersonSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub popularity: f64,
}

/// `GET /person/{id}/movie_credits`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PersonCredits {
    pub cast: Vec<MovieSummary>,
    pub crew: Vec<CrewCredit>,
}

#[derive(Debug, Deserialize)]
pub struct CrewCredit {
    #[serde(flatten)]
    pub movie: MovieSummary,
    #[serde(default)]
    pub job: String,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_normalization() {
        let details: MovieDetails = serde_json::from_str(
            r#"{
                "id": 157336,
                "title": "Interstellar",
                "overview": "A team of explorers travel through a wormhole.",
                "release_date": "2014-11-05",
                "vote_average": 8.4,
                "vote_count": 36000,
                "popularity": 140.2,
                "poster_path": "/gEU2QniE6E77NI6lCU6MxlNBvIx.jpg",
                "budget": 165000000,
                "credits": {
                    "cast": [
                        {"name": "Anne Hathaway", "order": 1},
                        {"name": "Matthew McConaughey", "order": 0},
                        {"name": "Jessica Chastain", "order": 2},
                        {"name": "Bill Irwin", "order": 3},
                        {"name": "Ellen Burstyn", "order": 4},
                        {"name": "Michael Caine", "order": 5}
                    ],
                    "crew": [
                        {"name": "Hans Zimmer", "job": "Original Music Composer"},
                        {"name": "Christopher Nolan", "job": "Director"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let record = MovieRecord::from(details);
        assert_eq!(record.id, 157336);
        assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2014, 11, 5));
        assert_eq!(record.cast.len(), CAST_LIMIT);
        assert_eq!(record.cast[0], "Matthew McConaughey");
        assert!(!record.cast.contains(&"Michael Caine".to_string()));
        assert_eq!(record.director.as_deref(), Some("Christopher Nolan"));
    }

    #[test]
    fn test_sparse_summary() {
        let summary: MovieSummary =
            serde_json::from_str(r#"{"id": 7, "release_date": "", "vote_average": 11.0}"#).unwrap();
        let record = MovieRecord::from(summary);
        assert_eq!(record.release_date, None);
        assert_eq!(record.rating, 10.0);
        assert!(record.title.is_empty());
    }
}
