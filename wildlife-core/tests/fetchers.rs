//! Fetchers against a mocked upstream.

use std::time::Duration;

use serde_json::{Value, json};
use wildlife_core::{
    ClimateSource, Envelope, FetchErrorKind, GbifSpeciesFetcher, HttpSettings,
    OpenMeteoClimateFetcher, ProviderId, ResearchBrief,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn species_fetcher(server: &MockServer) -> GbifSpeciesFetcher {
    GbifSpeciesFetcher::new(&HttpSettings::for_provider(ProviderId::Gbif).with_base_url(server.uri()))
}

fn climate_fetcher(server: &MockServer) -> OpenMeteoClimateFetcher {
    OpenMeteoClimateFetcher::new(
        &HttpSettings::for_provider(ProviderId::OpenMeteo).with_base_url(server.uri()),
    )
}

/// Base URL of a port nobody listens on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn tiger_body() -> Value {
    json!({
        "offset": 0,
        "limit": 20,
        "endOfRecords": true,
        "count": 1,
        "results": [{
            "key": 5219416,
            "scientificName": "Panthera tigris (Linnaeus, 1758)",
            "kingdom": "Animalia",
            "phylum": "Chordata",
            "class": "Mammalia",
            "rank": "SPECIES",
            "taxonomicStatus": "ACCEPTED"
        }]
    })
}

fn forecast_body() -> Value {
    json!({
        "latitude": 40.710335,
        "longitude": -73.99307,
        "timezone": "America/New_York",
        "current_weather": {"temperature": 15.2, "windspeed": 11.3, "weathercode": 2, "time": "2024-05-01T14:00"},
        "daily": {
            "time": ["2024-05-01"],
            "temperature_2m_max": [18.4],
            "temperature_2m_min": [9.9],
            "precipitation_sum": [0.0]
        }
    })
}

#[tokio::test]
async fn species_success_passes_body_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/species/search"))
        .and(query_param("q", "tiger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tiger_body()))
        .expect(1)
        .mount(&server)
        .await;

    let env = species_fetcher(&server).fetch("tiger").await;

    assert!(env.is_success());
    assert_eq!(env.to_value(), tiger_body());
    let page = env.payload().expect("payload");
    assert_eq!(page.count(), 1);
    assert_eq!(page.end_of_records(), Some(true));
    assert_eq!(page.results()[0]["kingdom"], "Animalia");
}

#[tokio::test]
async fn species_name_is_url_escaped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/species/search"))
        .and(query_param("q", "Panthera tigris & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "count": 0, "endOfRecords": true})))
        .expect(1)
        .mount(&server)
        .await;

    let env = species_fetcher(&server).fetch("Panthera tigris & co").await;
    assert!(env.is_success());
}

#[tokio::test]
async fn empty_species_name_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/species/search"))
        .and(query_param("q", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [], "count": 0, "endOfRecords": true})))
        .expect(1)
        .mount(&server)
        .await;

    let env = species_fetcher(&server).fetch("").await;
    assert_eq!(env.payload().map(|p| p.count()), Some(0));
}

#[tokio::test]
async fn species_timeout_yields_failure_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tiger_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let settings = HttpSettings::for_provider(ProviderId::Gbif)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let env = GbifSpeciesFetcher::new(&settings).fetch("tiger").await;

    assert_eq!(env.error().map(|e| e.kind()), Some(FetchErrorKind::Timeout));
    let value = env.to_value();
    assert!(value["error"].as_str().unwrap().contains("timeout"));
    assert_eq!(value["results"], json!([]));
    assert_eq!(value["count"], json!(0));
}

#[tokio::test]
async fn species_connection_refused() {
    let settings = HttpSettings::for_provider(ProviderId::Gbif).with_base_url(closed_port_url());
    let env = GbifSpeciesFetcher::new(&settings).fetch("tiger").await;

    assert_eq!(
        env.to_value(),
        json!({
            "error": "Connection error while accessing GBIF API",
            "results": [],
            "count": 0
        })
    );
}

#[tokio::test]
async fn species_http_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/species/search"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"results": [1], "count": 9})))
        .mount(&server)
        .await;

    let env = species_fetcher(&server).fetch("tiger").await;

    assert_eq!(
        env.to_value(),
        json!({
            "error": "HTTP error 503: Service Unavailable",
            "results": [],
            "count": 0
        })
    );
}

#[tokio::test]
async fn species_non_object_body_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Panthera tigris"])))
        .mount(&server)
        .await;

    let env = species_fetcher(&server).fetch("tiger").await;

    assert_eq!(env.error().map(|e| e.kind()), Some(FetchErrorKind::InvalidResponse));
    assert_eq!(
        env.to_value()["error"],
        json!("Invalid response format from GBIF API")
    );
}

#[tokio::test]
async fn species_undecodable_body_is_request_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let env = species_fetcher(&server).fetch("tiger").await;

    assert_eq!(env.error().map(|e| e.kind()), Some(FetchErrorKind::Request));
    let value = env.to_value();
    assert!(value["error"].as_str().unwrap().starts_with("Request failed: "));
    assert_eq!(value["count"], json!(0));
}

#[tokio::test]
async fn repeated_species_calls_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/species/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tiger_body()))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = species_fetcher(&server);
    let first = fetcher.fetch("tiger").await;
    let second = fetcher.fetch("tiger").await;

    assert_eq!(first, second);
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn climate_new_york_temperature() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "40.71"))
        .and(query_param("longitude", "-74.01"))
        .and(query_param("current_weather", "true"))
        .and(query_param(
            "daily",
            "temperature_2m_max,temperature_2m_min,precipitation_sum",
        ))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let env = climate_fetcher(&server).fetch("New York").await;

    let report = env.payload().expect("payload");
    assert_eq!(report.current_temperature(), Some(15.2));
    assert!(!report.resolution().is_fallback());
    assert_eq!(env.to_value(), forecast_body());
    assert_eq!(env.to_value()["current_weather"]["temperature"], json!(15.2));
}

#[tokio::test]
async fn climate_unknown_location_uses_default_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "40.71"))
        .and(query_param("longitude", "-74.01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = climate_fetcher(&server);
    for location in ["Unknown City", "Tokyo"] {
        let env = fetcher.fetch_climate_data(location).await;
        let report = env.payload().expect("payload");
        assert!(report.resolution().is_fallback());
        assert_eq!(report.resolution().coordinates.lat, 40.71);
        assert_eq!(report.resolution().coordinates.lon, -74.01);
    }
}

#[tokio::test]
async fn climate_timeout_yields_empty_mappings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let settings = HttpSettings::for_provider(ProviderId::OpenMeteo)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let env = OpenMeteoClimateFetcher::new(&settings).fetch("NY").await;

    assert_eq!(
        env.to_value(),
        json!({
            "error": "Request timeout while fetching climate data",
            "current_weather": {},
            "daily": {}
        })
    );
}

#[tokio::test]
async fn climate_connection_refused() {
    let settings =
        HttpSettings::for_provider(ProviderId::OpenMeteo).with_base_url(closed_port_url());
    let env = OpenMeteoClimateFetcher::new(&settings).fetch("New York").await;

    assert_eq!(env.error().map(|e| e.kind()), Some(FetchErrorKind::Connection));
    assert_eq!(
        env.to_value()["error"],
        json!("Connection error while accessing Open Meteo API")
    );
}

#[tokio::test]
async fn climate_http_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": true, "reason": "bad"})))
        .mount(&server)
        .await;

    let env = climate_fetcher(&server).fetch("New York").await;

    assert_eq!(
        env.to_value(),
        json!({
            "error": "HTTP error 400: Bad Request",
            "current_weather": {},
            "daily": {}
        })
    );
}

#[tokio::test]
async fn climate_non_object_body_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(42)))
        .mount(&server)
        .await;

    let env = climate_fetcher(&server).fetch("New York").await;

    assert_eq!(
        env.to_value()["error"],
        json!("Invalid response format from Open Meteo API")
    );
    assert_eq!(env.to_value()["daily"], json!({}));
}

#[tokio::test]
async fn brief_over_real_fetchers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/species/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tiger_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let brief = ResearchBrief::gather(
        &species_fetcher(&server),
        &climate_fetcher(&server),
        "tiger",
        "New York",
    )
    .await;

    assert!(brief.has_errors());
    assert!(matches!(brief.species, Envelope::Success(_)));
    let ctx = brief.to_prompt_context();
    assert!(ctx.contains("Panthera tigris (Linnaeus, 1758)"));
    assert!(ctx.contains("HTTP error 500: Internal Server Error"));
}
