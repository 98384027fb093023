//! User selection set
//!
//! Ordered, unique by external id, and owned separately from the search results:
//! a new search never prunes it.

use crate::models::EnrichedMovie;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    movies: Vec<EnrichedMovie>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless a movie with the same external id is already present
    pub fn add(&mut self, movie: EnrichedMovie) -> bool {
        if self.contains(&movie.external_id) {
            return false;
        }
        self.movies.push(movie);
        true
    }

    /// Remove the matching movie; no-op when absent
    pub fn remove(&mut self, external_id: &str) -> bool {
        let before = self.movies.len();
        self.movies.retain(|m| m.external_id != external_id);
        self.movies.len() != before
    }

    pub fn contains(&self, external_id: &str) -> bool {
        self.movies.iter().any(|m| m.external_id == external_id)
    }

    /// External ids in selection order
    pub fn ids(&self) -> Vec<String> {
        self.movies.iter().map(|m| m.external_id.clone()).collect()
    }

    pub fn movies(&self) -> &[EnrichedMovie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str) -> EnrichedMovie {
        EnrichedMovie {
            external_id: id.to_string(),
            title: format!("Movie {}", id),
            genres: vec!["Drama".to_string()],
            year: "2000".to_string(),
            rated: "PG".to_string(),
            poster_url: String::new(),
            plot: String::new(),
        }
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut selection = SelectionSet::new();
        assert!(selection.add(movie("tt0000002")));
        assert!(selection.add(movie("tt0000001")));
        assert_eq!(selection.ids(), vec!["tt0000002", "tt0000001"]);
    }

    #[test]
    fn test_add_is_idempotent_by_external_id() {
        let mut selection = SelectionSet::new();
        selection.add(movie("tt0000001"));
        selection.add(movie("tt0000002"));

        let mut duplicate = movie("tt0000001");
        duplicate.title = "Different title".to_string();
        assert!(!selection.add(duplicate));

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.ids(), vec!["tt0000001", "tt0000002"]);
        assert_eq!(selection.movies()[0].title, "Movie tt0000001");
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut selection = SelectionSet::new();
        selection.add(movie("tt0000001"));
        let before = selection.clone();

        assert!(!selection.remove("tt9999999"));
        assert_eq!(selection, before);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut selection = SelectionSet::new();
        for id in ["tt0000001", "tt0000002", "tt0000003"] {
            selection.add(movie(id));
        }
        assert!(selection.remove("tt0000002"));
        assert_eq!(selection.ids(), vec!["tt0000001", "tt0000003"]);
        assert!(!selection.contains("tt0000002"));
    }

    #[test]
    fn test_readd_after_remove_goes_to_end() {
        let mut selection = SelectionSet::new();
        selection.add(movie("tt0000001"));
        selection.add(movie("tt0000002"));
        selection.remove("tt0000001");
        selection.add(movie("tt0000001"));
        assert_eq!(selection.ids(), vec!["tt0000002", "tt0000001"]);
    }
}
