//! Clustering query encoder
//!
//! Turns the selection plus clustering options into the query string handed to the
//! downstream clustering view: `imdbList=<ids>&options=<dimensions>&k=<k>`.

use crate::error::DiscoverError;
use crate::models::ClusteringDimension;
use crate::selection::SelectionSet;
use serde::{Deserialize, Serialize};
use url::form_urlencoded::byte_serialize;

/// Smallest k the clustering view accepts
pub const MIN_K: i64 = 3;

/// k used when the options input supplies a non-positive value
pub const DEFAULT_K: i64 = 10;

/// Dimensions used when the options input supplies none
pub const DEFAULT_DIMENSIONS: [ClusteringDimension; 2] =
    [ClusteringDimension::Genres, ClusteringDimension::Title];

/// Path of the clustering view
pub const CLUSTERING_VIEW_PATH: &str = "/movies";

/// In-progress clustering options
///
/// Starts at `{ [], 0 }`, so submitting before any options input is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringOptions {
    pub dimensions: Vec<ClusteringDimension>,
    pub k: i64,
}

impl ClusteringOptions {
    /// Options from user input with defaults applied
    ///
    /// Empty dimensions become `[genres, title]`, `k <= 0` becomes 10, and repeated
    /// dimensions collapse keeping first-seen order. A positive k below [`MIN_K`] is kept
    /// as entered; it is refused at submit time.
    pub fn from_input(dimensions: Vec<ClusteringDimension>, k: i64) -> Self {
        let mut unique = Vec::with_capacity(dimensions.len());
        for dimension in dimensions {
            if !unique.contains(&dimension) {
                unique.push(dimension);
            }
        }
        if unique.is_empty() {
            unique = DEFAULT_DIMENSIONS.to_vec();
        }

        Self {
            dimensions: unique,
            k: if k <= 0 { DEFAULT_K } else { k },
        }
    }
}

/// Validated parameters ready for the clustering view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteringSpec {
    pub selected_ids: Vec<String>,
    pub dimensions: Vec<ClusteringDimension>,
    pub k: u64,
}

impl ClusteringSpec {
    /// Validate the stored options against the current selection
    ///
    /// # Errors
    /// `ValidationRefused` when `k < 3`; no query is produced.
    pub fn prepare(
        selection: &SelectionSet,
        options: &ClusteringOptions,
    ) -> Result<Self, DiscoverError> {
        if options.k < MIN_K {
            return Err(DiscoverError::ValidationRefused { k: options.k });
        }
        Ok(Self {
            selected_ids: selection.ids(),
            dimensions: options.dimensions.clone(),
            k: options.k.unsigned_abs(),
        })
    }

    /// Query string with stable field order `imdbList`, `options`, `k`
    ///
    /// List separators stay literal commas; the items themselves are form-encoded.
    pub fn to_query_string(&self) -> String {
        let ids = join_encoded(self.selected_ids.iter().map(String::as_str));
        let dimensions = join_encoded(self.dimensions.iter().map(ClusteringDimension::as_str));
        format!("imdbList={}&options={}&k={}", ids, dimensions, self.k)
    }

    /// Relative URL the view layer opens in a new tab
    pub fn navigation_target(&self) -> String {
        format!("{}?{}", CLUSTERING_VIEW_PATH, self.to_query_string())
    }
}

fn join_encoded<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|item| byte_serialize(item.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}
