//! End-to-end pipeline tests against mocked catalog and metadata services
//!
//! Both external services are wiremock servers; the session is built from
//! configuration exactly as the binary builds it.

use reelsift_common::config::{EnrichmentPolicy, TomlConfig};
use reelsift_common::events::{EventBus, FailureKind, ReelsiftEvent};
use reelsift_search::models::{ClusteringDimension, EnrichedMovie, FilterChange, FilterState};
use reelsift_search::{CycleOutcome, SearchSession};
use serde_json::json;
use std::collections::BTreeSet;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Services {
    catalog: MockServer,
    omdb: MockServer,
}

impl Services {
    async fn start() -> Self {
        Self {
            catalog: MockServer::start().await,
            omdb: MockServer::start().await,
        }
    }

    fn config(&self, policy: EnrichmentPolicy) -> TomlConfig {
        TomlConfig {
            catalog_url: format!("{}/api/movies/", self.catalog.uri()),
            omdb_url: format!("{}/", self.omdb.uri()),
            omdb_api_key: Some("test-key".to_string()),
            request_timeout_secs: 5,
            enrichment_policy: policy,
            ..TomlConfig::default()
        }
    }

    fn session(&self, policy: EnrichmentPolicy) -> SearchSession {
        SearchSession::from_config(&self.config(policy), EventBus::new(100)).unwrap()
    }

    async fn mount_omdb(&self, external_id: &str, poster: &str) {
        Mock::given(method("GET"))
            .and(query_param("i", external_id))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Poster": poster,
                "Rated": "PG",
                "Plot": "...",
                "Response": "True"
            })))
            .mount(&self.omdb)
            .await;
    }
}

#[tokio::test]
async fn test_single_candidate_end_to_end() {
    let services = Services::start().await;
    Mock::given(method("POST"))
        .and(path("/api/movies/"))
        .and(body_json(json!({"title": "X"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"imdbId": "42", "title": "X", "genres": "Action|Drama", "year": "2000", "rated": "PG"}
        ])))
        .expect(1)
        .mount(&services.catalog)
        .await;
    services.mount_omdb("tt0000042", "p.jpg").await;

    let session = services.session(EnrichmentPolicy::PartialSuccess);
    let outcome = session
        .refresh(FilterChange::Title {
            title: Some("X".to_string()),
        })
        .await;

    assert_eq!(
        outcome,
        CycleOutcome::Applied {
            cycle: 1,
            movie_count: 1,
            failed_ids: Vec::new()
        }
    );
    let view = session.results().await;
    assert_eq!(
        view.movies,
        vec![EnrichedMovie {
            external_id: "tt0000042".to_string(),
            title: "X".to_string(),
            genres: vec!["Action".to_string(), "Drama".to_string()],
            year: "2000".to_string(),
            rated: "PG".to_string(),
            poster_url: "p.jpg".to_string(),
            plot: "...".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_query_omits_empty_fields_on_the_wire() {
    let services = Services::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"year": "1995", "genres": "Crime|Drama"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&services.catalog)
        .await;

    let session = services.session(EnrichmentPolicy::PartialSuccess);
    let filters = FilterState {
        title: Some(String::new()),
        year: Some("1995".to_string()),
        genres: BTreeSet::from(["Drama".to_string(), "Crime".to_string()]),
    };
    let outcome = session.refresh(FilterChange::Replace { filters }).await;
    assert!(matches!(outcome, CycleOutcome::Applied { movie_count: 0, .. }));
}

#[tokio::test]
async fn test_provider_failure_policies() {
    let services = Services::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"imdbId": 1, "title": "A", "genres": "Drama", "year": 1990, "rated": "PG"},
            {"imdbId": 2, "title": "B", "genres": "Drama", "year": 1991, "rated": "PG"}
        ])))
        .mount(&services.catalog)
        .await;
    services.mount_omdb("tt0000001", "a.jpg").await;
    Mock::given(method("GET"))
        .and(query_param("i", "tt0000002"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&services.omdb)
        .await;

    let partial = services.session(EnrichmentPolicy::PartialSuccess);
    let outcome = partial.refresh(FilterChange::Year { year: None }).await;
    assert_eq!(
        outcome,
        CycleOutcome::Applied {
            cycle: 1,
            movie_count: 1,
            failed_ids: vec!["tt0000002".to_string()]
        }
    );
    assert_eq!(partial.results().await.movies[0].poster_url, "a.jpg");

    let strict = services.session(EnrichmentPolicy::AllOrNothing);
    let outcome = strict.refresh(FilterChange::Year { year: None }).await;
    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            cycle: 1,
            kind: FailureKind::EnrichmentFailed
        }
    );
    assert!(strict.results().await.movies.is_empty());
}

#[tokio::test]
async fn test_catalog_outage_is_search_unavailable_without_retry() {
    let services = Services::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&services.catalog)
        .await;

    let session = services.session(EnrichmentPolicy::PartialSuccess);
    let mut rx = session.event_bus().subscribe();
    let outcome = session
        .refresh(FilterChange::Genre {
            genre: "Drama".to_string(),
            checked: true,
        })
        .await;

    assert_eq!(
        outcome,
        CycleOutcome::Failed {
            cycle: 1,
            kind: FailureKind::SearchUnavailable
        }
    );

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let ReelsiftEvent::SearchFailed { kind, .. } = event {
            kinds.push(kind);
        }
    }
    assert_eq!(kinds, vec![FailureKind::SearchUnavailable]);
}

#[tokio::test]
async fn test_select_and_encode_clustering_query() {
    let services = Services::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"imdbId": "114709", "title": "Toy Story", "genres": "Animation", "year": "1995", "rated": "G"},
            {"imdbId": "113497", "title": "Jumanji", "genres": "Adventure", "year": "1995", "rated": "PG"}
        ])))
        .mount(&services.catalog)
        .await;
    services.mount_omdb("tt0114709", "toy.jpg").await;
    services.mount_omdb("tt0113497", "jumanji.jpg").await;

    let session = services.session(EnrichmentPolicy::PartialSuccess);
    session.refresh(FilterChange::Title { title: None }).await;

    session.select("tt0113497").await.unwrap();
    session.select("tt0114709").await.unwrap();
    session.select("tt0113497").await.unwrap();

    session
        .set_clustering_options(vec![ClusteringDimension::Title], 4)
        .await;
    let spec = session.submit_clustering().await.unwrap();
    assert_eq!(
        spec.to_query_string(),
        "imdbList=tt0113497,tt0114709&options=title&k=4"
    );
}
