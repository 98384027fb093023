//! Data model for the Search-Enrich-Select pipeline
//!
//! Filter state and derived queries flow toward the catalog; raw candidates come back,
//! get enriched into [`EnrichedMovie`]s, and may be copied into the selection set.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Filters
// ============================================================================

/// Live filter state mutated by the view layer
///
/// Genres are a set; ordering is kept sorted so derived queries are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
}

/// A single user interaction against [`FilterState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FilterChange {
    Title { title: Option<String> },
    Year { year: Option<String> },
    Genre { genre: String, checked: bool },
    Replace { filters: FilterState },
}

impl FilterState {
    pub fn set_title(&mut self, title: Option<String>) -> bool {
        replace_if_changed(&mut self.title, title)
    }

    pub fn set_year(&mut self, year: Option<String>) -> bool {
        replace_if_changed(&mut self.year, year)
    }

    /// Checked inserts the genre, unchecked removes it
    pub fn toggle_genre(&mut self, genre: impl Into<String>, checked: bool) -> bool {
        let genre = genre.into();
        if checked {
            self.genres.insert(genre)
        } else {
            self.genres.remove(&genre)
        }
    }

    /// Apply a change; returns whether the state differs afterwards
    pub fn apply(&mut self, change: FilterChange) -> bool {
        match change {
            FilterChange::Title { title } => self.set_title(title),
            FilterChange::Year { year } => self.set_year(year),
            FilterChange::Genre { genre, checked } => self.toggle_genre(genre, checked),
            FilterChange::Replace { filters } => {
                let changed = *self != filters;
                *self = filters;
                changed
            }
        }
    }
}

fn replace_if_changed(slot: &mut Option<String>, value: Option<String>) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Catalog search body derived from [`FilterState`]; absent fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    /// Pipe-joined genre names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
}

// ============================================================================
// Catalog records
// ============================================================================

/// Record returned by the catalog before enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    /// Internal id; zero-padded into the external identifier
    #[serde(rename = "imdbId", deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    /// Pipe-delimited genre names
    #[serde(default, deserialize_with = "nullable_string_or_number")]
    pub genres: String,
    #[serde(default, deserialize_with = "nullable_string_or_number")]
    pub year: String,
    #[serde(default, deserialize_with = "nullable_string_or_number")]
    pub rated: String,
    /// Ignored; enrichment always supplies the poster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(u64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Integer(n) => n.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

/// Catalog emits some identifiers as JSON numbers and others as strings
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

/// Like [`string_or_number`], with JSON `null` read as an empty string
fn nullable_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Movie with catalog fields merged with provider metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMovie {
    /// Canonical `tt`-prefixed identifier; unique key across results and selection
    pub external_id: String,
    pub title: String,
    pub genres: Vec<String>,
    pub year: String,
    pub rated: String,
    pub poster_url: String,
    pub plot: String,
}

// ============================================================================
// Clustering
// ============================================================================

/// Feature used by the downstream clustering view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringDimension {
    Title,
    Genres,
}

impl ClusteringDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringDimension::Title => "title",
            ClusteringDimension::Genres => "genres",
        }
    }
}

impl fmt::Display for ClusteringDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_genre_inserts_and_removes() {
        let mut filters = FilterState::default();
        assert!(filters.toggle_genre("Drama", true));
        assert!(!filters.toggle_genre("Drama", true));
        assert!(filters.toggle_genre("Drama", false));
        assert!(!filters.toggle_genre("Drama", false));
        assert!(filters.genres.is_empty());
    }

    #[test]
    fn test_apply_reports_change() {
        let mut filters = FilterState::default();
        assert!(filters.apply(FilterChange::Title {
            title: Some("Alien".to_string())
        }));
        assert!(!filters.apply(FilterChange::Title {
            title: Some("Alien".to_string())
        }));
        assert!(filters.apply(FilterChange::Year {
            year: Some("1979".to_string())
        }));
        assert!(filters.apply(FilterChange::Replace {
            filters: FilterState::default()
        }));
        assert_eq!(filters, FilterState::default());
    }

    #[test]
    fn test_filter_change_wire_format() {
        let change: FilterChange =
            serde_json::from_str(r#"{"field":"genre","genre":"Action","checked":true}"#).unwrap();
        assert_eq!(
            change,
            FilterChange::Genre {
                genre: "Action".to_string(),
                checked: true
            }
        );
    }

    #[test]
    fn test_raw_candidate_accepts_numeric_id_and_year() {
        let raw: RawCandidate = serde_json::from_str(
            r#"{"title":"X","genres":"Action|Drama","imdbId":42,"year":2000,"rated":"PG"}"#,
        )
        .unwrap();
        assert_eq!(raw.id, "42");
        assert_eq!(raw.year, "2000");
        assert!(raw.poster_url.is_none());
    }

    #[test]
    fn test_raw_candidate_reads_null_fields_as_empty() {
        let raw: RawCandidate = serde_json::from_str(
            r#"{"title":"X","genres":null,"imdbId":42,"year":null,"rated":null}"#,
        )
        .unwrap();
        assert_eq!(raw.id, "42");
        assert_eq!(raw.genres, "");
        assert_eq!(raw.year, "");
        assert_eq!(raw.rated, "");

        let raw: RawCandidate =
            serde_json::from_str(r#"{"title":"X","genres":"A","imdbId":42,"year":2000,"rated":null}"#)
                .unwrap();
        assert_eq!(raw.year, "2000");
        assert_eq!(raw.rated, "");
    }

    #[test]
    fn test_raw_candidate_accepts_string_id() {
        let raw: RawCandidate = serde_json::from_str(
            r#"{"title":"X","genres":"","imdbId":"0114709","year":"1995","rated":"G","posterUrl":"x.jpg"}"#,
        )
        .unwrap();
        assert_eq!(raw.id, "0114709");
        assert_eq!(raw.poster_url.as_deref(), Some("x.jpg"));
    }

    #[test]
    fn test_enriched_movie_uses_camel_case() {
        let movie = EnrichedMovie {
            external_id: "tt0000042".to_string(),
            title: "X".to_string(),
            genres: vec!["Action".to_string()],
            year: "2000".to_string(),
            rated: "PG".to_string(),
            poster_url: "p.jpg".to_string(),
            plot: "...".to_string(),
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["externalId"], "tt0000042");
        assert_eq!(json["posterUrl"], "p.jpg");
    }

    #[test]
    fn test_dimension_wire_names() {
        let dims: Vec<ClusteringDimension> = serde_json::from_str(r#"["title","genres"]"#).unwrap();
        assert_eq!(dims, vec![ClusteringDimension::Title, ClusteringDimension::Genres]);
        assert_eq!(ClusteringDimension::Genres.to_string(), "genres");
    }
}
