//! Adapter tests against a mock OpenWeather server.

use skycast_core::{Config, OpenWeatherClient, WeatherApi, WeatherError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    Config {
        api_key: Some("TESTKEY".into()),
        weather_base_url: Some(server.uri()),
        geocode_base_url: Some(server.uri()),
        ..Config::default()
    }
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "name": "London",
        "sys": { "country": "GB" },
        "main": { "temp": 21.6, "humidity": 71 },
        "weather": [ { "main": "Rain", "icon": "10d" } ],
        "wind": { "speed": 4.1 },
        "visibility": 8500
    })
}

#[tokio::test]
async fn current_conditions_maps_provider_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TESTKEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(&test_config(&server)).unwrap();
    let cc = client.current_conditions("London").await.unwrap();

    assert_eq!(cc.temperature_c, 22);
    assert_eq!(cc.visibility_km, 9);
    assert_eq!(cc.condition, "Rain");
    assert_eq!(cc.icon, "10d");
    assert_eq!(cc.humidity_pct, 71);
    assert_eq!(cc.display_location, "London, GB");
}

#[tokio::test]
async fn current_conditions_by_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "48.85"))
        .and(query_param("lon", "2.35"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(&test_config(&server)).unwrap();
    let cc = client.current_at(48.85, 2.35).await.unwrap();

    assert_eq!(cc.display_location, "London, GB");
}

#[tokio::test]
async fn non_2xx_yields_generic_provider_error_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404", "message": "city not found"
            })),
        )
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(&test_config(&server)).unwrap();
    let err = client.current_conditions("Atlantis").await.unwrap_err();

    // The user-visible message stays generic; the status rides along.
    assert_eq!(err.to_string(), "failed to fetch current weather");
    assert_eq!(
        err,
        WeatherError::provider("failed to fetch current weather", Some(404))
    );
}

#[tokio::test]
async fn non_2xx_with_multibyte_body_still_returns_the_generic_error() {
    let server = MockServer::start().await;

    // A body of 3-byte characters; its diagnostics truncation must cut on a
    // char boundary. The subscriber makes the logging actually evaluate the
    // truncated body instead of skipping it.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(std::io::sink)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_string("€".repeat(100)))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(&test_config(&server)).unwrap();
    let err = client.current_conditions("Atlantis").await.unwrap_err();

    assert_eq!(
        err,
        WeatherError::provider("failed to fetch current weather", Some(404))
    );
}

#[tokio::test]
async fn transport_failure_yields_same_generic_message() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    // Point at a closed port.
    config.weather_base_url = Some("http://127.0.0.1:1".into());

    let client = OpenWeatherClient::new(&config).unwrap();
    let err = client.current_conditions("London").await.unwrap_err();

    assert_eq!(err.to_string(), "failed to fetch current weather");
    assert_eq!(
        err,
        WeatherError::provider("failed to fetch current weather", None)
    );
}

#[tokio::test]
async fn missing_api_key_fails_before_any_network_call() {
    let server = MockServer::start().await;

    // No request of any kind may reach the server.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.api_key = None;

    let client = OpenWeatherClient::new(&config).unwrap();

    let err = client.current_conditions("London").await.unwrap_err();
    assert_eq!(err, WeatherError::Configuration("OPENWEATHER_API_KEY"));

    let err = client.current_at(51.51, -0.13).await.unwrap_err();
    assert_eq!(err, WeatherError::Configuration("OPENWEATHER_API_KEY"));

    let err = client.forecast("London").await.unwrap_err();
    assert_eq!(err, WeatherError::Configuration("OPENWEATHER_API_KEY"));

    let err = client.search_locations("London").await.unwrap_err();
    assert_eq!(err, WeatherError::Configuration("OPENWEATHER_API_KEY"));
}

#[tokio::test]
async fn forecast_subsamples_noon_entries() {
    let server = MockServer::start().await;

    let mut list = Vec::new();
    for day in 10..=15 {
        for hour in (0..24).step_by(3) {
            list.push(serde_json::json!({
                "dt_txt": format!("2026-03-{day} {hour:02}:00:00"),
                "main": { "temp_min": 9.4, "temp_max": 14.6, "humidity": 55 },
                "weather": [ { "main": "Clouds", "icon": "04d" } ],
                "wind": { "speed": 2.2 }
            }));
        }
    }

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Berlin"))
        .and(query_param("units", "metric"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "list": list })),
        )
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(&test_config(&server)).unwrap();
    let forecast = client.forecast("Berlin").await.unwrap();

    assert_eq!(forecast.len(), 5);
    assert_eq!(forecast[0].date, "2026-03-10");
    assert_eq!(forecast[4].date, "2026-03-14");
    assert_eq!(forecast[0].temp_min_c, 9);
    assert_eq!(forecast[0].temp_max_c, 15);
}

#[tokio::test]
async fn search_locations_caps_at_five_and_preserves_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/direct"))
        .and(query_param("q", "Paris"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Paris", "country": "FR", "lat": 48.85, "lon": 2.35 },
            { "name": "Paris", "country": "US", "lat": 33.66, "lon": -95.55 }
        ])))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(&test_config(&server)).unwrap();

    let first = client.search_locations("Paris").await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].country, "FR");
    assert_eq!(first[1].country, "US");

    // Identical mocked response, structurally equal result.
    let second = client.search_locations("Paris").await.unwrap();
    assert_eq!(first, second);
}
