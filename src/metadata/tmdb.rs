//! TMDB v3 implementation of the metadata client.

use super::wire::{GenreList, MovieDetails, MovieSummary, Page, PersonCredits, PersonSummary};
use super::{sort_by_popularity, sort_by_rating, MetadataClient, MovieRecord, PersonRole, TimeWindow};
use crate::config::{TmdbAuth, TmdbSettings};
use crate::error::{ReelError, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Search results considered when picking the best title or person match.
const BEST_MATCH_WINDOW: usize = 5;

/// TMDB-backed metadata client.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    auth: TmdbAuth,
    language: String,
    page_size: usize,
    trending_limit: usize,
    enrich_details: bool,
    enrich_concurrency: usize,
    retries: u32,
    retry_delay: Duration,
}

impl TmdbClient {
    /// Create a client, resolving credentials from settings or the environment.
    pub fn new(settings: &TmdbSettings) -> Result<Self> {
        let auth = settings.auth().ok_or_else(|| {
            ReelError::Config(format!(
                "TMDB credentials not set. Set tmdb.api_key in the config or export {}",
                crate::config::TMDB_API_KEY_ENV
            ))
        })?;
        Self::with_auth(settings, auth)
    }

    /// Create a client with explicit credentials.
    pub fn with_auth(settings: &TmdbSettings, auth: TmdbAuth) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth,
            language: settings.language.clone(),
            page_size: settings.page_size,
            trending_limit: settings.trending_limit,
            enrich_details: settings.enrich_details,
            enrich_concurrency: settings.enrich_concurrency.max(1),
            retries: settings.retries,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ReelError::Config(format!("Invalid TMDB URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let TmdbAuth::ApiKey(key) = &self.auth {
                pairs.append_pair("api_key", key);
            }
            pairs.append_pair("language", &self.language);
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// GET a JSON document, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path, query)?;
        let mut attempt = 0;

        loop {
            match self.send::<T>(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!("TMDB request to {} failed ({}), retry {}", path, e, attempt);
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    return Err(ReelError::Upstream(format!("TMDB request to {} failed: {}", path, e)));
                }
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url.path());

        let mut request = self.http.get(url);
        if let TmdbAuth::Bearer(token) = &self.auth {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    async fn movie_details(&self, movie_id: u64) -> Result<MovieDetails> {
        self.get_json(
            &format!("/movie/{}", movie_id),
            &[("append_to_response", "credits".to_string())],
        )
        .await
    }

    /// Pick the most popular of the first few title matches.
    async fn best_title_match(&self, title: &str) -> Result<MovieSummary> {
        let page: Page<MovieSummary> = self
            .get_json("/search/movie", &[("query", title.to_string())])
            .await?;

        page.results
            .into_iter()
            .take(BEST_MATCH_WINDOW)
            .reduce(|best, m| if m.popularity > best.popularity { m } else { best })
            .ok_or_else(|| ReelError::NotFound(format!("No movie matches the title '{}'", title)))
    }

    async fn best_person_match(&self, name: &str) -> Result<PersonSummary> {
        let page: Page<PersonSummary> = self
            .get_json("/search/person", &[("query", name.to_string())])
            .await?;

        page.results
            .into_iter()
            .take(BEST_MATCH_WINDOW)
            .reduce(|best, p| if p.popularity > best.popularity { p } else { best })
            .ok_or_else(|| ReelError::NotFound(format!("No person named '{}'", name)))
    }

    /// Fill in cast and director, keeping listing order and listing scores.
    ///
    /// A record whose details cannot be fetched is kept as listed.
    async fn enrich(&self, mut movies: Vec<MovieRecord>) -> Result<Vec<MovieRecord>> {
        if !self.enrich_details || movies.is_empty() {
            return Ok(movies);
        }

        debug!("Enriching {} movies", movies.len());

        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        let details: Vec<Result<MovieDetails>> = stream::iter(ids)
            .map(|id| self.movie_details(id))
            .buffered(self.enrich_concurrency)
            .collect()
            .await;

        for (movie, detail) in movies.iter_mut().zip(details) {
            let full = match detail {
                Ok(detail) => MovieRecord::from(detail),
                Err(e) => {
                    warn!("No details for {} ({}): {}", movie.title, movie.id, e);
                    continue;
                }
            };
            movie.cast = full.cast;
            movie.director = full.director;
            if movie.overview.is_empty() {
                movie.overview = full.overview;
            }
            if movie.poster_path.is_none() {
                movie.poster_path = full.poster_path;
            }
        }

        Ok(movies)
    }
}

#[async_trait]
impl MetadataClient for TmdbClient {
    #[instrument(skip(self))]
    async fn search_by_genre(&self, genres: &BTreeSet<String>) -> Result<Vec<MovieRecord>> {
        let list: GenreList = self.get_json("/genre/movie/list", &[]).await?;
        let vocabulary: HashMap<String, u64> = list
            .genres
            .into_iter()
            .map(|g| (g.name.to_lowercase(), g.id))
            .collect();

        let ids: Vec<String> = genres
            .iter()
            .filter_map(|g| vocabulary.get(&g.trim().to_lowercase()))
            .map(|id| id.to_string())
            .collect();

        if ids.is_empty() {
            let mut known: Vec<_> = vocabulary.keys().cloned().collect();
            known.sort();
            return Err(ReelError::NotFound(format!(
                "No known genre among {:?}. Known genres: {}",
                genres,
                known.join(", ")
            )));
        }

        let page: Page<MovieSummary> = self
            .get_json(
                "/discover/movie",
                &[
                    ("with_genres", ids.join(",")),
                    ("sort_by", "popularity.desc".to_string()),
                ],
            )
            .await?;

        let mut movies: Vec<MovieRecord> = page.results.into_iter().map(Into::into).collect();
        sort_by_popularity(&mut movies);
        movies.truncate(self.page_size);
        self.enrich(movies).await
    }

    #[instrument(skip(self))]
    async fn search_by_title(&self, title: &str) -> Result<MovieRecord> {
        let best = self.best_title_match(title).await?;
        debug!("Best match for '{}': {} ({})", title, best.title, best.id);

        let details = self.movie_details(best.id).await?;
        Ok(details.into())
    }

    #[instrument(skip(self))]
    async fn find_similar(&self, title: &str) -> Result<Vec<MovieRecord>> {
        let source = self.best_title_match(title).await?;

        let page: Page<MovieSummary> = self
            .get_json(&format!("/movie/{}/similar", source.id), &[])
            .await?;

        let movies: Vec<MovieRecord> = page
            .results
            .into_iter()
            .filter(|m| m.id != source.id)
            .take(self.page_size)
            .map(Into::into)
            .collect();

        self.enrich(movies).await
    }

    #[instrument(skip(self))]
    async fn get_trending(&self, window: TimeWindow) -> Result<Vec<MovieRecord>> {
        let page: Page<MovieSummary> = self
            .get_json(&format!("/trending/movie/{}", window.as_str()), &[])
            .await?;

        let movies = page
            .results
            .into_iter()
            .take(self.trending_limit)
            .map(Into::into)
            .collect();

        self.enrich(movies).await
    }

    #[instrument(skip(self))]
    async fn get_top_rated(&self) -> Result<Vec<MovieRecord>> {
        let page: Page<MovieSummary> = self.get_json("/movie/top_rated", &[]).await?;

        let mut movies: Vec<MovieRecord> = page.results.into_iter().map(Into::into).collect();
        sort_by_rating(&mut movies);
        movies.truncate(self.page_size);
        self.enrich(movies).await
    }

    #[instrument(skip(self))]
    async fn search_by_person(&self, name: &str, role: PersonRole) -> Result<Vec<MovieRecord>> {
        let person = self.best_person_match(name).await?;
        debug!("Resolved '{}' to {} ({})", name, person.name, person.id);

        let credits: PersonCredits = self
            .get_json(&format!("/person/{}/movie_credits", person.id), &[])
            .await?;

        let works: Vec<MovieSummary> = match role {
            PersonRole::Cast => credits.cast,
            PersonRole::Director => credits
                .crew
                .into_iter()
                .filter(|c| c.job == "Director")
                .map(|c| c.movie)
                .collect(),
        };

        let mut seen = HashSet::new();
        let mut movies: Vec<MovieRecord> = works
            .into_iter()
            .filter(|m| seen.insert(m.id))
            .map(Into::into)
            .collect();

        sort_by_popularity(&mut movies);
        movies.truncate(self.page_size);
        self.enrich(movies).await
    }
}
