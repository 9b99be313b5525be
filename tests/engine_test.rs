mod common;

use std::{sync::Arc, time::Duration};

use common::{FakeCatalog, FakeProfiles, ids, test_config, track};
use seedlist::{
    config::EngineConfig,
    recommend::{
        FixedRandom, MAX_LIMIT, RecommendationEngine, RecommendationError, ScoringConfig,
        SeededRandom,
    },
    types::{ArtistRef, GenreCount, ListeningProfile, RecommendationMode, StrategyKind, Track},
};

fn engine(catalog: Arc<FakeCatalog>, profiles: FakeProfiles) -> RecommendationEngine {
    engine_with(catalog, profiles, test_config())
}

fn engine_with(
    catalog: Arc<FakeCatalog>,
    profiles: FakeProfiles,
    config: EngineConfig,
) -> RecommendationEngine {
    RecommendationEngine::with_random(
        catalog,
        Arc::new(profiles),
        config,
        Arc::new(FixedRandom(0.0)),
    )
}

fn air_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .respond(
            "artist:Air",
            vec![
                track("in1", "Sexy Boy", "Air", 80),
                track("c1", "All I Need", "Air", 50),
                track("c2", "In the Waiting Line", "Zero 7", 90),
                track("c1", "All I Need", "Air", 50),
            ],
        )
        .respond(
            "air",
            vec![
                track("c2", "In the Waiting Line", "Zero 7", 90),
                track("c3", "Venus", "Air", 10),
            ],
        )
}

/// One track credited to every artist in `names`.
fn collaboration(id: &str, names: &[&str]) -> Track {
    let mut t = track(id, "Collab", names[0], 50);
    t.artists = names
        .iter()
        .map(|name| ArtistRef {
            id: name.to_lowercase(),
            name: name.to_string(),
            genres: Vec::new(),
        })
        .collect();
    t
}

fn calls_with_prefix(catalog: &FakeCatalog, prefix: &str) -> Vec<(String, u32)> {
    catalog
        .calls()
        .into_iter()
        .filter(|(q, _, _)| q.starts_with(prefix))
        .map(|(q, limit, _)| (q, limit))
        .collect()
}

fn alice() -> ListeningProfile {
    let mut profile = ListeningProfile::new("alice");
    profile.top_tracks.short_term = vec![track("p1", "One More Time", "Daft Punk", 85)];
    profile.saved_tracks = vec![track("s1", "Around the World", "Daft Punk", 70)];
    profile.top_genres = vec![GenreCount {
        name: "french house".to_string(),
        count: 5,
    }];
    profile
}

fn daft_punk_catalog() -> FakeCatalog {
    FakeCatalog::new()
        .respond(
            "artist:\"Daft Punk\"",
            vec![
                track("s1", "Around the World", "Daft Punk", 70),
                track("n1", "Robot Rock", "Daft Punk", 60),
                track("p1", "One More Time", "Daft Punk", 85),
            ],
        )
        .respond(
            "genre:\"french house\"",
            vec![track("n2", "Music Sounds Better with You", "Stardust", 65)],
        )
        .respond("daft", vec![track("n3", "Da Funk", "Daft Punk", 55)])
}

#[tokio::test]
async fn test_independent_excludes_inputs_and_duplicates() {
    let catalog = Arc::new(air_catalog());
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(catalog.clone(), FakeProfiles::new())
        .recommend_independent(&inputs, 20)
        .await
        .unwrap();

    // c2 0.9, c1 0.5 + artist bonus 0.3, c3 0.1 + artist bonus 0.3
    assert_eq!(ids(&result.recommendations), vec!["c2", "c1", "c3"]);
    assert!((result.recommendations[0].score - 0.9).abs() < 1e-9);
    assert!((result.recommendations[1].score - 0.8).abs() < 1e-9);

    let meta = &result.metadata;
    assert_eq!(meta.mode, RecommendationMode::Independent);
    assert_eq!(meta.input_count, 1);
    assert_eq!(meta.seeds_used, vec!["in1"]);
    assert_eq!(meta.total_candidates, 6);
    assert_eq!(meta.final_count, 3);

    let kinds: Vec<StrategyKind> = meta.strategies.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![StrategyKind::Artist, StrategyKind::Keyword]);
    assert!(!catalog.queries().iter().any(|q| q.starts_with("genre:")));
}

#[tokio::test]
async fn test_independent_budgets_for_limit_twenty() {
    let catalog = Arc::new(air_catalog());
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(catalog, FakeProfiles::new())
        .recommend_independent(&inputs, 20)
        .await
        .unwrap();

    let budgets: Vec<usize> = result.metadata.strategies.iter().map(|s| s.budget).collect();
    assert_eq!(budgets, vec![30, 30]);
}

#[tokio::test]
async fn test_result_never_exceeds_limit() {
    let catalog = Arc::new(air_catalog());
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(catalog, FakeProfiles::new())
        .recommend_independent(&inputs, 2)
        .await
        .unwrap();

    assert_eq!(ids(&result.recommendations), vec!["c2", "c1"]);
    assert_eq!(result.metadata.final_count, 2);
    // artist budget 3 stops after three results, keyword budget 3 gets two
    assert_eq!(result.metadata.total_candidates, 5);
}

#[tokio::test]
async fn test_strategy_stays_within_budget() {
    let catalog = Arc::new(air_catalog());
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(catalog, FakeProfiles::new())
        .recommend_independent(&inputs, 1)
        .await
        .unwrap();

    let artist = &result.metadata.strategies[0];
    assert_eq!(artist.budget, 1);
    assert_eq!(artist.returned, 1);
    // the only artist result is the input itself
    assert_eq!(ids(&result.recommendations), vec!["c2"]);
}

#[tokio::test]
async fn test_empty_catalog_is_not_an_error() {
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(Arc::new(FakeCatalog::new()), FakeProfiles::new())
        .recommend_independent(&inputs, 10)
        .await
        .unwrap();

    assert!(result.recommendations.is_empty());
    assert_eq!(result.metadata.final_count, 0);
    assert_eq!(result.metadata.total_candidates, 0);
}

#[tokio::test]
async fn test_independent_requires_inputs() {
    let err = engine(Arc::new(FakeCatalog::new()), FakeProfiles::new())
        .recommend_independent(&[], 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::InvalidInput(_)));
}

#[tokio::test]
async fn test_zero_limit_is_invalid() {
    let catalog = Arc::new(FakeCatalog::new());
    let engine = engine(catalog.clone(), FakeProfiles::new().with(alice()));
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let independent = engine.recommend_independent(&inputs, 0).await.unwrap_err();
    let user_based = engine
        .recommend_user_based("alice", &inputs, 0)
        .await
        .unwrap_err();

    assert!(matches!(independent, RecommendationError::InvalidInput(_)));
    assert!(matches!(user_based, RecommendationError::InvalidInput(_)));
    assert!(catalog.queries().is_empty());
}

#[tokio::test]
async fn test_input_tracks_without_ids_are_not_seeds() {
    let catalog = Arc::new(air_catalog());
    let mut anonymous = track("", "Local File", "Nobody Known", 99);
    anonymous.id = None;
    let inputs = vec![anonymous, track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(catalog.clone(), FakeProfiles::new())
        .recommend_independent(&inputs, 10)
        .await
        .unwrap();

    assert_eq!(result.metadata.seeds_used, vec!["in1"]);
    assert!(
        !catalog
            .queries()
            .iter()
            .any(|q| q.contains("Nobody Known"))
    );
}

#[tokio::test]
async fn test_user_based_uses_profile_and_excludes_known_tracks() {
    let catalog = Arc::new(daft_punk_catalog());

    let result = engine(catalog.clone(), FakeProfiles::new().with(alice()))
        .recommend_user_based("alice", &[], 10)
        .await
        .unwrap();

    let mut got = ids(&result.recommendations);
    got.sort();
    assert_eq!(got, vec!["n1", "n2", "n3"]);

    let meta = &result.metadata;
    assert_eq!(meta.mode, RecommendationMode::UserBased);
    assert_eq!(meta.seeds_used, vec!["p1"]);

    let kinds: Vec<StrategyKind> = meta.strategies.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![StrategyKind::Artist, StrategyKind::Genre, StrategyKind::Keyword]
    );
    let budgets: Vec<usize> = meta.strategies.iter().map(|s| s.budget).collect();
    assert_eq!(budgets, vec![12, 9, 9]);

    assert!(
        catalog
            .queries()
            .contains(&"genre:\"french house\"".to_string())
    );
}

#[tokio::test]
async fn test_known_tracks_can_be_recommended_when_not_excluded() {
    let inputs = vec![track("p1", "One More Time", "Daft Punk", 85)];

    let excluding = engine(
        Arc::new(daft_punk_catalog()),
        FakeProfiles::new().with(alice()),
    )
    .recommend_user_based("alice", &inputs, 10)
    .await
    .unwrap();
    assert!(!ids(&excluding.recommendations).contains(&"s1"));

    let config = EngineConfig {
        exclude_known_tracks: false,
        ..test_config()
    };
    let including = engine_with(
        Arc::new(daft_punk_catalog()),
        FakeProfiles::new().with(alice()),
        config,
    )
    .recommend_user_based("alice", &inputs, 10)
    .await
    .unwrap();
    let got = ids(&including.recommendations);
    assert!(got.contains(&"s1"));
    assert!(!got.contains(&"p1"));
}

#[tokio::test]
async fn test_genre_fallback_after_rejected_query() {
    let catalog = Arc::new(
        daft_punk_catalog()
            .fail("genre:\"french house\"")
            .respond("french", vec![track("n4", "Lady", "Modjo", 60)]),
    );

    let result = engine(catalog.clone(), FakeProfiles::new().with(alice()))
        .recommend_user_based("alice", &[], 10)
        .await
        .unwrap();

    assert!(ids(&result.recommendations).contains(&"n4"));
    let genre = &result.metadata.strategies[1];
    assert_eq!(genre.kind, StrategyKind::Genre);
    assert_eq!(genre.failed_queries, 1);
    assert_eq!(genre.returned, 1);
}

#[tokio::test]
async fn test_genre_fallback_not_used_for_empty_results() {
    let catalog = Arc::new(
        FakeCatalog::new().respond("french", vec![track("n4", "Lady", "Modjo", 60)]),
    );

    engine(catalog.clone(), FakeProfiles::new().with(alice()))
        .recommend_user_based("alice", &[], 10)
        .await
        .unwrap();

    assert!(!catalog.queries().contains(&"french".to_string()));
}

#[tokio::test]
async fn test_failed_query_does_not_stop_strategy() {
    let catalog = Arc::new(
        FakeCatalog::new()
            .fail("artist:Alpha")
            .respond("artist:Beta", vec![track("x1", "Found", "Beta", 40)]),
    );
    let inputs = vec![
        track("a1", "First", "Alpha", 60),
        track("b1", "Second", "Beta", 50),
    ];

    let result = engine(catalog, FakeProfiles::new())
        .recommend_independent(&inputs, 10)
        .await
        .unwrap();

    assert_eq!(ids(&result.recommendations), vec!["x1"]);
    assert_eq!(result.metadata.strategies[0].failed_queries, 1);
}

#[tokio::test]
async fn test_missing_profile_without_inputs() {
    let err = engine(Arc::new(FakeCatalog::new()), FakeProfiles::new())
        .recommend_user_based("bob", &[], 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::NoDataAvailable(ref user) if user == "bob"));
}

#[tokio::test]
async fn test_empty_profile_without_inputs() {
    let profiles = FakeProfiles::new().with(ListeningProfile::new("carol"));

    let err = engine(Arc::new(FakeCatalog::new()), profiles)
        .recommend_user_based("carol", &[], 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::NoDataAvailable(_)));
}

#[tokio::test]
async fn test_user_based_with_inputs_and_no_profile() {
    let catalog = Arc::new(air_catalog());
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let result = engine(catalog, FakeProfiles::new())
        .recommend_user_based("dave", &inputs, 10)
        .await
        .unwrap();

    assert_eq!(result.metadata.mode, RecommendationMode::UserBased);
    assert_eq!(result.metadata.strategies[1].kind, StrategyKind::Genre);
    assert_eq!(result.metadata.strategies[1].returned, 0);
    assert_eq!(result.metadata.final_count, 3);
}

#[tokio::test]
async fn test_profile_store_failure() {
    let err = engine(Arc::new(FakeCatalog::new()), FakeProfiles::broken())
        .recommend_user_based("alice", &[], 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::ProfileStore(_)));
}

#[tokio::test(start_paused = true)]
async fn test_searches_within_a_strategy_are_paced() {
    let catalog = Arc::new(FakeCatalog::new());
    let config = EngineConfig {
        search_delay: Duration::from_millis(100),
        ..test_config()
    };
    let inputs = vec![
        track("a1", "First", "Alpha", 60),
        track("b1", "Second", "Beta", 50),
        track("g1", "Third", "Gamma", 40),
    ];

    let started = tokio::time::Instant::now();
    engine_with(catalog.clone(), FakeProfiles::new(), config)
        .recommend_independent(&inputs, 10)
        .await
        .unwrap();

    let artist_calls: Vec<_> = catalog
        .calls()
        .into_iter()
        .filter(|(q, _, _)| q.starts_with("artist:"))
        .map(|(_, _, at)| at)
        .collect();
    assert_eq!(artist_calls.len(), 3);
    assert!(artist_calls[0] - started < Duration::from_millis(100));
    for pair in artist_calls.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(100));
    }

    // artist and keyword strategies run side by side
    assert!(started.elapsed() < Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_reports_catalog_unavailable() {
    let config = EngineConfig {
        request_timeout: Duration::from_secs(1),
        ..test_config()
    };
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    let err = engine_with(Arc::new(FakeCatalog::hanging()), FakeProfiles::new(), config)
        .recommend_independent(&inputs, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, RecommendationError::CatalogUnavailable(_)));
}

#[tokio::test]
async fn test_seeded_random_is_reproducible() {
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];
    let candidates: Vec<Track> = (0..12)
        .map(|i| track(&format!("r{i}"), "Same", "Other", 50))
        .collect();

    let run = || {
        let catalog = Arc::new(FakeCatalog::new().respond("artist:Air", candidates.clone()));
        RecommendationEngine::with_random(
            catalog,
            Arc::new(FakeProfiles::new()),
            test_config(),
            Arc::new(SeededRandom::new(42)),
        )
    };

    let first = run().recommend_independent(&inputs, 5).await.unwrap();
    let second = run().recommend_independent(&inputs, 5).await.unwrap();

    assert_eq!(ids(&first.recommendations), ids(&second.recommendations));
}

#[tokio::test]
async fn test_limit_above_maximum_is_invalid() {
    let catalog = Arc::new(FakeCatalog::new());
    let engine = engine(catalog.clone(), FakeProfiles::new().with(alice()));
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    for limit in [MAX_LIMIT + 1, usize::MAX / 2, usize::MAX] {
        let independent = engine
            .recommend_independent(&inputs, limit)
            .await
            .unwrap_err();
        let user_based = engine
            .recommend_user_based("alice", &inputs, limit)
            .await
            .unwrap_err();

        assert!(matches!(independent, RecommendationError::InvalidInput(_)));
        assert!(matches!(user_based, RecommendationError::InvalidInput(_)));
    }
    assert!(catalog.queries().is_empty());

    let result = engine
        .recommend_independent(&inputs, MAX_LIMIT)
        .await
        .unwrap();
    assert_eq!(result.metadata.strategies[0].budget, 150);
}

#[tokio::test]
async fn test_artist_searches_capped_at_five_artists() {
    let catalog = Arc::new(FakeCatalog::new());
    let inputs = vec![
        collaboration("m1", &["Alpha", "Bravo", "Charlie"]),
        collaboration("m2", &["Delta", "Echo", "Foxtrot", "Golf"]),
    ];

    engine(catalog.clone(), FakeProfiles::new())
        .recommend_independent(&inputs, 10)
        .await
        .unwrap();

    assert_eq!(
        calls_with_prefix(&catalog, "artist:"),
        vec![
            ("artist:Alpha".to_string(), 10),
            ("artist:Bravo".to_string(), 10),
            ("artist:Charlie".to_string(), 10),
            ("artist:Delta".to_string(), 10),
            ("artist:Echo".to_string(), 10),
        ]
    );
}

#[tokio::test]
async fn test_keyword_searches_capped_at_five_words() {
    let catalog = Arc::new(FakeCatalog::new());
    let inputs = vec![
        collaboration("m1", &["Alpha", "Bravo", "Charlie"]),
        collaboration("m2", &["Delta", "Echo", "Foxtrot", "Golf"]),
    ];

    engine(catalog.clone(), FakeProfiles::new())
        .recommend_independent(&inputs, 10)
        .await
        .unwrap();

    let keyword_calls: Vec<(String, u32)> = catalog
        .calls()
        .into_iter()
        .filter(|(q, _, _)| !q.contains(':'))
        .map(|(q, limit, _)| (q, limit))
        .collect();
    assert_eq!(
        keyword_calls,
        vec![
            ("alpha".to_string(), 6),
            ("bravo".to_string(), 6),
            ("charlie".to_string(), 6),
            ("delta".to_string(), 6),
            ("echo".to_string(), 6),
        ]
    );
}

#[tokio::test]
async fn test_genre_searches_capped_at_three_genres() {
    let mut profile = ListeningProfile::new("frank");
    profile.top_genres = ["ambient", "house", "techno", "dub"]
        .iter()
        .enumerate()
        .map(|(i, name)| GenreCount {
            name: name.to_string(),
            count: 10 - i as u32,
        })
        .collect();
    let catalog = Arc::new(FakeCatalog::new().fail("genre:house"));
    let inputs = vec![track("in1", "Sexy Boy", "Air", 80)];

    engine(catalog.clone(), FakeProfiles::new().with(profile))
        .recommend_user_based("frank", &inputs, 10)
        .await
        .unwrap();

    assert_eq!(
        calls_with_prefix(&catalog, "genre:"),
        vec![
            ("genre:ambient".to_string(), 8),
            ("genre:house".to_string(), 8),
            ("genre:techno".to_string(), 8),
        ]
    );
    assert!(catalog.calls().iter().any(|(q, limit, _)| q == "house" && *limit == 5));
    assert!(!catalog.queries().iter().any(|q| q.contains("dub")));
}

#[tokio::test]
async fn test_artist_without_id_is_still_searched() {
    let catalog = Arc::new(
        FakeCatalog::new().respond("artist:\"Local Hero\"", vec![track("x1", "Found", "Local Hero", 40)]),
    );
    let mut local = track("l1", "Home Demo", "Local Hero", 70);
    local.artists[0].id = String::new();
    let mut shouting = track("l2", "Home Demo II", "LOCAL HERO", 60);
    shouting.artists[0].id = String::new();

    let result = engine(catalog.clone(), FakeProfiles::new())
        .recommend_independent(&[local, shouting], 10)
        .await
        .unwrap();

    assert_eq!(
        calls_with_prefix(&catalog, "artist:"),
        vec![("artist:\"Local Hero\"".to_string(), 10)]
    );
    assert_eq!(ids(&result.recommendations), vec!["x1"]);
}

fn genre_bonus_config() -> EngineConfig {
    EngineConfig {
        scoring: ScoringConfig {
            genre_match_bonus: 0.5,
            ..ScoringConfig::default()
        },
        ..test_config()
    }
}

#[tokio::test]
async fn test_genre_bonus_uses_catalog_artist_genres() {
    let catalog = Arc::new(
        daft_punk_catalog()
            .artist_genres("stardust", &["French House", "disco"])
            .artist_genres("daft-punk", &["electro"]),
    );

    let result = engine_with(
        catalog.clone(),
        FakeProfiles::new().with(alice()),
        genre_bonus_config(),
    )
    .recommend_user_based("alice", &[], 10)
    .await
    .unwrap();

    // n2 0.65 + genre bonus 0.5, n1 0.6 + artist bonus 0.3, n3 0.55 + 0.3
    assert_eq!(ids(&result.recommendations), vec!["n2", "n1", "n3"]);
    assert!((result.recommendations[0].score - 1.15).abs() < 1e-9);
    assert_eq!(
        catalog.genre_lookups(),
        vec![vec!["daft-punk".to_string(), "stardust".to_string()]]
    );
}

#[tokio::test]
async fn test_failed_genre_lookup_still_ranks() {
    let catalog = Arc::new(daft_punk_catalog().fail_genre_lookup());

    let result = engine_with(
        catalog.clone(),
        FakeProfiles::new().with(alice()),
        genre_bonus_config(),
    )
    .recommend_user_based("alice", &[], 10)
    .await
    .unwrap();

    assert_eq!(ids(&result.recommendations), vec!["n1", "n3", "n2"]);
    assert_eq!(catalog.genre_lookups().len(), 1);
}

#[tokio::test]
async fn test_genres_not_looked_up_without_bonus() {
    let catalog = Arc::new(daft_punk_catalog());

    engine(catalog.clone(), FakeProfiles::new().with(alice()))
        .recommend_user_based("alice", &[], 10)
        .await
        .unwrap();
    engine(catalog.clone(), FakeProfiles::new())
        .recommend_independent(&[track("p1", "One More Time", "Daft Punk", 85)], 10)
        .await
        .unwrap();

    assert!(catalog.genre_lookups().is_empty());
}
