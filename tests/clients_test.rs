use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use httptest::{Expectation, Server, matchers::*, responders::*};
use serde_json::json;

use sptfy::{
    error::{AuthError, ClientError},
    spotify::{
        auth::TokenSource, browse::BrowseClient, playlist::PlaylistClient,
        resource::ResourceClient, search::SearchClient,
    },
    types::{PlaylistOptions, SearchOperator, SearchQuery, SearchType},
};

type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Always hands out the same token and counts requests for it.
struct StaticToken {
    token: &'static str,
    calls: AtomicUsize,
}

impl StaticToken {
    fn new(token: &'static str) -> Arc<Self> {
        Arc::new(Self {
            token,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.to_string())
    }
}

struct Unconfigured;

#[async_trait]
impl TokenSource for Unconfigured {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Err(AuthError::Configuration(
            "client id is required to request a token".to_string(),
        ))
    }
}

fn api_url(server: &Server) -> String {
    format!("http://{}/v1", server.addr())
}

#[tokio::test]
async fn search_sends_app_token_and_query() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::headers(contains(("authorization", "Bearer app-token"))),
            request::query(url_decoded(contains(("q", "love artist:queen")))),
            request::query(url_decoded(contains(("type", "track,album")))),
            request::query(url_decoded(contains(("limit", "5")))),
        ])
        .respond_with(json_encoded(json!({ "tracks": { "items": [] } }))),
    );

    let tokens = StaticToken::new("app-token");
    let client = SearchClient::new(tokens.clone()).with_api_url(api_url(&server));
    let query = SearchQuery {
        artist: Some("queen".to_string()),
        ..SearchQuery::text("love")
    };

    let result = client
        .search(&query, &[SearchType::Track, SearchType::Album], Some(5))
        .await?;
    assert_eq!(result, json!({ "tracks": { "items": [] } }));
    assert_eq!(tokens.calls(), 1);

    Ok(())
}

#[tokio::test]
async fn track_lookup_filters_on_track_name() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::query(url_decoded(contains(("q", "track:Yesterday")))),
            request::query(url_decoded(contains(("type", "track")))),
            request::query(url_decoded(contains(("limit", "1")))),
        ])
        .respond_with(json_encoded(json!({
            "tracks": { "items": [ { "uri": "spotify:track:yesterday" } ] }
        }))),
    );

    let client = SearchClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    assert_eq!(client.track_uri("Yesterday").await?, "spotify:track:yesterday");

    Ok(())
}

#[tokio::test]
async fn playlist_lookup_filters_on_playlist_name() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::query(url_decoded(contains(("q", "playlist:Road trip")))),
            request::query(url_decoded(contains(("type", "playlist")))),
        ])
        .respond_with(json_encoded(json!({
            "playlists": { "items": [ { "id": "p2", "name": "Road trip" } ] }
        }))),
    );

    let client = SearchClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    assert_eq!(client.playlist_id("Road trip").await?, "p2");

    Ok(())
}

#[tokio::test]
async fn search_operators_extend_the_query() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::query(url_decoded(contains(("q", "artist:queen NOT live")))),
        ])
        .respond_with(json_encoded(json!({}))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::query(url_decoded(contains(("q", "love OR hate")))),
        ])
        .respond_with(json_encoded(json!({}))),
    );

    let client = SearchClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    let not = SearchQuery {
        artist: Some("queen".to_string()),
        ..Default::default()
    }
    .with_operator(SearchOperator::Not, "live");
    client.search(&not, &[SearchType::Track], None).await?;

    let or = SearchQuery::text("love").with_operator(SearchOperator::Or, "hate");
    client.search(&or, &[SearchType::Track], None).await?;

    Ok(())
}

#[tokio::test]
async fn out_of_range_limit_falls_back_to_default() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::query(url_decoded(contains(("type", "track")))),
            request::query(url_decoded(contains(("limit", "20")))),
        ])
        .respond_with(json_encoded(json!({}))),
    );

    let client = SearchClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    client.search(&SearchQuery::text("love"), &[], Some(500)).await?;

    Ok(())
}

#[tokio::test]
async fn empty_query_is_rejected_without_a_token() -> TestResult {
    let tokens = StaticToken::new("app-token");
    let client = SearchClient::new(tokens.clone()).with_api_url("http://127.0.0.1:1/v1");

    let err = client
        .search(&SearchQuery::default(), &[SearchType::Track], None)
        .await
        .expect_err("nothing to search for");
    assert!(matches!(err, ClientError::InvalidArgument(_)), "{err:?}");
    assert_eq!(tokens.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn provider_error_reaches_caller_unchanged() -> TestResult {
    let client = BrowseClient::new(Arc::new(Unconfigured)).with_api_url("http://127.0.0.1:1/v1");

    let err = client
        .new_releases(None, None)
        .await
        .expect_err("provider is not configured");
    assert!(
        matches!(err, ClientError::Auth(AuthError::Configuration(_))),
        "{err:?}"
    );

    Ok(())
}

#[tokio::test]
async fn api_errors_carry_status_and_message() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/v1/browse/categories/nope"))
            .respond_with(status_code(404).body(
                json!({ "error": { "status": 404, "message": "Invalid category id" } }).to_string(),
            )),
    );

    let client = BrowseClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    let err = client
        .category("nope", None, None)
        .await
        .expect_err("unknown category");
    assert!(
        matches!(&err, ClientError::Api { status: 404, message } if message == "Invalid category id"),
        "{err:?}"
    );

    Ok(())
}

#[tokio::test]
async fn category_playlists_send_country_and_limit() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/browse/categories/party/playlists"),
            request::headers(contains(("authorization", "Bearer app-token"))),
            request::query(url_decoded(contains(("country", "SE")))),
            request::query(url_decoded(contains(("limit", "10")))),
        ])
        .respond_with(json_encoded(json!({ "playlists": { "items": [] } }))),
    );

    let client = BrowseClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    client.category_playlists("party", Some("SE"), Some(10)).await?;

    Ok(())
}

#[tokio::test]
async fn create_playlist_uses_user_token() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/v1/users/someone/playlists"),
            request::headers(contains(("authorization", "Bearer user-token"))),
            request::body(json_decoded(eq(json!({
                "name": "Road trip",
                "description": "A playlist",
                "public": false,
                "collaborative": true,
            })))),
        ])
        .respond_with(json_encoded(json!({
            "id": "pl1",
            "name": "Road trip",
            "description": "A playlist",
            "public": false,
            "collaborative": true,
        }))),
    );

    let app = StaticToken::new("app-token");
    let user = StaticToken::new("user-token");
    let client = PlaylistClient::new(app.clone(), user.clone(), Some("someone".to_string()))
        .with_api_url(api_url(&server));

    let options = PlaylistOptions {
        public: false,
        collaborative: true,
        description: None,
    };
    let created = client.create("Road trip", &options).await?;
    assert_eq!(created.id, "pl1");
    assert_eq!(user.calls(), 1);
    assert_eq!(app.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn create_playlist_requires_user_id() -> TestResult {
    let user = StaticToken::new("user-token");
    let client = PlaylistClient::new(StaticToken::new("app-token"), user.clone(), None)
        .with_api_url("http://127.0.0.1:1/v1");

    let err = client
        .create("Road trip", &PlaylistOptions::default())
        .await
        .expect_err("no user id");
    assert!(matches!(err, ClientError::InvalidArgument(_)), "{err:?}");
    assert_eq!(user.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn reading_a_playlist_uses_app_token() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/playlists/pl1"),
            request::headers(contains(("authorization", "Bearer app-token"))),
            request::query(url_decoded(contains(("market", "DE")))),
        ])
        .respond_with(json_encoded(json!({ "id": "pl1", "name": "Road trip" }))),
    );

    let app = StaticToken::new("app-token");
    let user = StaticToken::new("user-token");
    let client = PlaylistClient::new(app.clone(), user.clone(), None).with_api_url(api_url(&server));

    let playlist = client.get("pl1", Some("DE")).await?;
    assert_eq!(playlist["name"], "Road trip");
    assert_eq!(app.calls(), 1);
    assert_eq!(user.calls(), 0);

    Ok(())
}

#[tokio::test]
async fn adding_tracks_resolves_names_and_batches() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::headers(contains(("authorization", "Bearer app-token"))),
            request::query(url_decoded(contains(("q", "track:Bohemian Rhapsody")))),
            request::query(url_decoded(contains(("limit", "1")))),
        ])
        .respond_with(json_encoded(json!({
            "tracks": { "items": [ { "uri": "spotify:track:bohemian" } ] }
        }))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/v1/playlists/pl1/tracks"),
            request::headers(contains(("authorization", "Bearer user-token"))),
        ])
        .times(2)
        .respond_with(json_encoded(json!({ "snapshot_id": "snap" }))),
    );

    let client = PlaylistClient::new(
        StaticToken::new("app-token"),
        StaticToken::new("user-token"),
        None,
    )
    .with_api_url(api_url(&server));

    let mut tracks: Vec<String> = (0..120).map(|i| format!("spotify:track:t{i}")).collect();
    tracks.push("Bohemian Rhapsody".to_string());

    let uris = client.resolve_tracks(&tracks).await?;
    assert_eq!(uris.len(), 121);
    assert_eq!(uris[120], "spotify:track:bohemian");

    let snapshot = client.add_tracks("pl1", &uris).await?;
    assert_eq!(snapshot.snapshot_id, "snap");

    Ok(())
}

#[tokio::test]
async fn removing_tracks_sends_track_objects() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("DELETE", "/v1/playlists/pl1/tracks"),
            request::headers(contains(("authorization", "Bearer user-token"))),
            request::body(json_decoded(eq(json!({
                "tracks": [ { "uri": "spotify:track:a" } ]
            })))),
        ])
        .respond_with(json_encoded(json!({ "snapshot_id": "snap2" }))),
    );

    let client = PlaylistClient::new(
        StaticToken::new("app-token"),
        StaticToken::new("user-token"),
        None,
    )
    .with_api_url(api_url(&server));

    let snapshot = client
        .remove_tracks("pl1", &["spotify:track:a".to_string()])
        .await?;
    assert_eq!(snapshot.snapshot_id, "snap2");

    Ok(())
}

#[tokio::test]
async fn find_playlist_requires_exact_name() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/search"),
            request::query(url_decoded(contains(("type", "playlist")))),
            request::query(url_decoded(contains(("limit", "50")))),
        ])
        .times(2)
        .respond_with(json_encoded(json!({
            "playlists": { "items": [
                { "id": "p1", "name": "Road trip 2" },
                { "id": "p2", "name": "Road trip" },
            ] }
        }))),
    );

    let client = PlaylistClient::new(
        StaticToken::new("app-token"),
        StaticToken::new("user-token"),
        None,
    )
    .with_api_url(api_url(&server));

    assert_eq!(client.find_id("Road trip").await?, "p2");
    let err = client.find_id("Road").await.expect_err("no exact match");
    assert!(matches!(err, ClientError::NotFound(_)), "{err:?}");

    Ok(())
}

#[tokio::test]
async fn category_playlist_matches_exact_name() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/browse/categories/toplists/playlists"),
            request::headers(contains(("authorization", "Bearer app-token"))),
            request::query(url_decoded(contains(("country", "SE")))),
        ])
        .times(2)
        .respond_with(json_encoded(json!({
            "playlists": { "items": [
                { "id": "p1", "name": "Today's Top Hits" },
                { "id": "p2", "name": "Top 50 - Sweden" },
            ] }
        }))),
    );

    let client = BrowseClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));

    let playlist = client
        .category_playlist("Top 50 - Sweden", "toplists", Some("SE"), None)
        .await?;
    assert_eq!(playlist["id"], "p2");

    let err = client
        .category_playlist("Top 50", "toplists", Some("SE"), None)
        .await
        .expect_err("no exact match");
    assert!(matches!(err, ClientError::NotFound(_)), "{err:?}");

    Ok(())
}

#[tokio::test]
async fn album_and_artist_lookups_use_app_token() -> TestResult {
    let server = Server::run();
    for path in [
        "/v1/albums/al1",
        "/v1/albums/al1/tracks",
        "/v1/artists/ar1",
        "/v1/artists/ar1/albums",
        "/v1/artists/ar1/related-artists",
    ] {
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", path),
                request::headers(contains(("authorization", "Bearer app-token"))),
            ])
            .respond_with(json_encoded(json!({ "path": path }))),
        );
    }

    let app = StaticToken::new("app-token");
    let client = ResourceClient::new(app.clone()).with_api_url(api_url(&server));

    assert_eq!(client.album("al1").await?["path"], "/v1/albums/al1");
    assert_eq!(client.album_tracks("al1").await?["path"], "/v1/albums/al1/tracks");
    assert_eq!(client.artist("ar1").await?["path"], "/v1/artists/ar1");
    assert_eq!(client.artist_albums("ar1").await?["path"], "/v1/artists/ar1/albums");
    assert_eq!(
        client.related_artists("ar1").await?["path"],
        "/v1/artists/ar1/related-artists"
    );
    assert_eq!(app.calls(), 5);

    Ok(())
}

#[tokio::test]
async fn top_tracks_send_uppercased_country() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/artists/ar1/top-tracks"),
            request::query(url_decoded(contains(("country", "SE")))),
        ])
        .respond_with(json_encoded(json!({ "tracks": [] }))),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/v1/artists/ar1/top-tracks"),
            request::query(url_decoded(contains(("country", "US")))),
        ])
        .respond_with(json_encoded(json!({ "tracks": [] }))),
    );

    let client = ResourceClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    client.artist_top_tracks("ar1", Some("se")).await?;
    client.artist_top_tracks("ar1", None).await?;

    Ok(())
}

#[tokio::test]
async fn unknown_album_is_an_api_error() -> TestResult {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/v1/albums/nope")).respond_with(
            status_code(400)
                .body(json!({ "error": { "status": 400, "message": "invalid id" } }).to_string()),
        ),
    );

    let client = ResourceClient::new(StaticToken::new("app-token")).with_api_url(api_url(&server));
    let err = client.album("nope").await.expect_err("invalid id");
    assert!(
        matches!(&err, ClientError::Api { status: 400, message } if message == "invalid id"),
        "{err:?}"
    );

    Ok(())
}
