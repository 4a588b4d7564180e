//! Baiscope search backend implementation.
//!
//! The site is a WordPress install; listing entries are `<h2
//! class="entry-title">` anchors and search results paginate through
//! numbered `page-numbers` links.

use std::time::Duration;

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use tracing::debug;

use crate::catalog::SeasonNumber;
use crate::config::SiteConfig;

use super::{EpisodeHit, MovieHit, SearchError, SiteSearcher};

/// Baiscope search backend implementation.
pub struct BaiscopeSearcher {
    client: Client,
    config: SiteConfig,
}

impl BaiscopeSearcher {
    /// Create a new BaiscopeSearcher with the given configuration.
    pub fn new(config: SiteConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn search_url(&self, query: &str, page: u32) -> String {
        let host = self.config.url.trim_end_matches('/');
        let encoded = urlencoding::encode(query);
        if page <= 1 {
            format!("{}/?s={}", host, encoded)
        } else {
            format!("{}/page/{}/?s={}", host, page, encoded)
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, SearchError> {
        debug!(url = url, "Fetching search page");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl SiteSearcher for BaiscopeSearcher {
    fn name(&self) -> &str {
        "baiscope"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieHit>, SearchError> {
        let html = self.fetch_page(&self.search_url(query, 1)).await?;
        let hits = parse_movie_hits(&html, self.config.max_movie_results as usize);

        debug!(query = query, hits = hits.len(), "Movie search complete");
        Ok(hits)
    }

    async fn discover_series(&self, series_name: &str) -> Result<Vec<EpisodeHit>, SearchError> {
        let first = self.fetch_page(&self.search_url(series_name, 1)).await?;
        let pages = max_result_page(&first);

        let mut hits = parse_episode_hits(&first, series_name);
        for page in 2..=pages {
            let html = self.fetch_page(&self.search_url(series_name, page)).await?;
            hits.extend(parse_episode_hits(&html, series_name));
        }

        debug!(
            series = series_name,
            pages = pages,
            hits = hits.len(),
            "Series discovery complete"
        );
        Ok(hits)
    }
}

// ============================================================================
// Listing page parsing (pure)
// ============================================================================

fn entry_anchor_regex() -> Regex {
    Regex::new(
        r#"<h2[^>]*class="[^"]*entry-title[^"]*"[^>]*>\s*<a[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#,
    )
    .expect("valid entry-title regex")
}

/// Extract (page_url, title text) pairs from listing entry headings.
fn entry_anchors(html: &str) -> Vec<(String, String)> {
    entry_anchor_regex()
        .captures_iter(html)
        .map(|cap| (cap[1].to_string(), cap[2].trim().to_string()))
        .collect()
}

/// Highest page number advertised by the pagination links, 1 when absent.
pub(crate) fn max_result_page(html: &str) -> u32 {
    let re = Regex::new(r#"<a[^>]*class="[^"]*page-numbers[^"]*"[^>]*>\s*(\d+)\s*</a>"#)
        .expect("valid page-numbers regex");

    re.captures_iter(html)
        .filter_map(|cap| cap[1].parse::<u32>().ok())
        .max()
        .unwrap_or(1)
}

/// Parse movie hits: listing entries whose title carries a "(YYYY)" marker.
pub(crate) fn parse_movie_hits(html: &str, limit: usize) -> Vec<MovieHit> {
    let year_re = Regex::new(r"\((\d{4})\)").expect("valid year regex");

    let mut hits = Vec::new();
    for (url, text) in entry_anchors(html) {
        if hits.len() >= limit {
            break;
        }
        let Some(found) = year_re.captures(&text) else {
            continue;
        };
        let marker_end = found.get(0).map_or(text.len(), |m| m.end());
        let title = text[..marker_end].trim().to_string();
        let search_title = title
            .split(" (")
            .next()
            .unwrap_or(&title)
            .trim()
            .to_string();

        hits.push(MovieHit {
            title,
            search_title,
            year: found[1].to_string(),
            page_url: url,
        });
    }
    hits
}

/// Parse episode hits: listing entries with a "[Sxx : Eyy" marker whose
/// title mentions the series name.
pub(crate) fn parse_episode_hits(html: &str, series_name: &str) -> Vec<EpisodeHit> {
    let marker_re = Regex::new(r"\[S(\d{1,2})\s*:?\s*E(\d{1,2})").expect("valid episode regex");
    let needle = series_name.to_lowercase();

    let mut hits = Vec::new();
    for (url, text) in entry_anchors(html) {
        let Some(found) = marker_re.captures(&text) else {
            continue;
        };
        if !text.to_lowercase().contains(&needle) {
            continue;
        }
        let (Ok(season), Ok(episode)) = (found[1].parse::<u8>(), found[2].parse::<u32>()) else {
            continue;
        };

        let series_title = text
            .split(" [")
            .next()
            .unwrap_or(&text)
            .split(" (")
            .next()
            .unwrap_or(&text)
            .trim()
            .to_string();

        hits.push(EpisodeHit {
            series_title,
            season: SeasonNumber::new(season),
            episode,
            page_url: url,
        });
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIE_LISTING: &str = r#"
        <article>
          <h2 class="entry-title">
            <a href="https://example.lk/titanic-1997-sub" rel="bookmark">Titanic (1997) Sinhala Subtitles</a>
          </h2>
        </article>
        <article>
          <h2 class="entry-title">
            <a href="https://example.lk/some-series-s01e01" rel="bookmark">Some Series [S01 : E01] Sinhala Subtitles</a>
          </h2>
        </article>
        <article>
          <h2 class="entry-title">
            <a href="https://example.lk/inception-2010-sub" rel="bookmark">Inception (2010) Sinhala Subtitles</a>
          </h2>
        </article>
    "#;

    const SERIES_LISTING: &str = r#"
        <h2 class="entry-title"><a href="https://example.lk/bb-s02e03">Breaking Bad (2008) [S02 : E03] Sinhala Subtitles</a></h2>
        <h2 class="entry-title"><a href="https://example.lk/bb-s2e1">Breaking Bad [S2:E1] Sinhala Subtitles</a></h2>
        <h2 class="entry-title"><a href="https://example.lk/other-show">Other Show [S01 : E05] Sinhala Subtitles</a></h2>
        <h2 class="entry-title"><a href="https://example.lk/bb-movie">Breaking Bad El Camino (2019) Sinhala Subtitles</a></h2>
        <nav>
          <a class="page-numbers" href="/page/2/?s=breaking+bad">2</a>
          <a class="page-numbers" href="/page/3/?s=breaking+bad">3</a>
          <a class="next page-numbers" href="/page/2/?s=breaking+bad">Next</a>
        </nav>
    "#;

    #[test]
    fn test_parse_movie_hits_requires_year_marker() {
        let hits = parse_movie_hits(MOVIE_LISTING, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Titanic (1997)");
        assert_eq!(hits[0].search_title, "Titanic");
        assert_eq!(hits[0].year, "1997");
        assert_eq!(hits[0].page_url, "https://example.lk/titanic-1997-sub");
        assert_eq!(hits[1].search_title, "Inception");
    }

    #[test]
    fn test_parse_movie_hits_respects_limit() {
        let hits = parse_movie_hits(MOVIE_LISTING, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_parse_episode_hits_filters_by_series_name() {
        let hits = parse_episode_hits(SERIES_LISTING, "Breaking Bad");
        assert_eq!(hits.len(), 2);

        assert_eq!(hits[0].series_title, "Breaking Bad");
        assert_eq!(hits[0].season, SeasonNumber::new(2));
        assert_eq!(hits[0].episode, 3);

        // Marker without padding or spacing still parses.
        assert_eq!(hits[1].season, SeasonNumber::new(2));
        assert_eq!(hits[1].episode, 1);
    }

    #[test]
    fn test_parse_episode_hits_ignores_movie_entries() {
        let hits = parse_episode_hits(SERIES_LISTING, "El Camino");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_max_result_page() {
        assert_eq!(max_result_page(SERIES_LISTING), 3);
        assert_eq!(max_result_page(MOVIE_LISTING), 1);
    }

    #[test]
    fn test_search_url_building() {
        let searcher = BaiscopeSearcher::new(SiteConfig {
            url: "https://example.lk/".to_string(),
            archive_link_marker: "/?tmstv=".to_string(),
            timeout_secs: 30,
            max_movie_results: 5,
        });

        assert_eq!(
            searcher.search_url("breaking bad", 1),
            "https://example.lk/?s=breaking%20bad"
        );
        assert_eq!(
            searcher.search_url("breaking bad", 2),
            "https://example.lk/page/2/?s=breaking%20bad"
        );
    }
}
