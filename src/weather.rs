//! Weather readings from the OpenWeather One Call API or a local fixture.
//!
//! [`WeatherSource::fetch`] never fails: any transport, status or parse
//! error is logged and replaced by [`WeatherReading::fallback`], so the
//! display always has something to show.
//!
//! ## Rust concepts
//! - Trait objects (`Box<dyn RawSource>`) to pick live or fixture data at startup
//! - `thiserror` for a small error enum with `From` conversions
//! - Serde `Deserialize` for just the fields we read from a large response

use crate::config::SourceConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const API_BASE_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// The fake response bundled for offline runs.
pub const BUNDLED_FIXTURE: &str = include_str!("../fixtures/onecall.json");

// ── Reading ──────────────────────────────────────────────────────────

/// One normalised observation. Temperatures are whole degrees Fahrenheit,
/// times are unix timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeatherReading {
    pub temperature_f: i32,
    pub icon_code: String,
    pub observed_at: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub daily_min: i32,
    pub daily_max: i32,
}

impl WeatherReading {
    /// Shown whenever a fetch fails: a mild clear day at the epoch.
    pub fn fallback() -> Self {
        Self {
            temperature_f: 70,
            icon_code: "01d".to_string(),
            observed_at: 0,
            sunrise: 0,
            sunset: 43_200,
            daily_min: 60,
            daily_max: 80,
        }
    }
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self::fallback()
    }
}

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Network error, timeout, TLS failure...
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("weather API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not read fixture {}: {source}", path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid weather JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("weather response has no {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Request(err.to_string())
    }
}

// ── Raw sources ──────────────────────────────────────────────────────

/// Something that produces a One Call JSON document.
pub trait RawSource {
    fn fetch_raw(&mut self) -> Result<String, WeatherError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Live data over HTTPS.
pub struct LiveSource {
    http: reqwest::blocking::Client,
    base_url: String,
    lat: f64,
    lon: f64,
    api_key: String,
}

impl LiveSource {
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(
        lat: f64,
        lon: f64,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            lat,
            lon,
            api_key: api_key.into(),
        })
    }

    /// Point at a different endpoint (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self) -> reqwest::blocking::RequestBuilder {
        self.http.get(&self.base_url).query(&[
            ("lat", self.lat.to_string()),
            ("lon", self.lon.to_string()),
            ("units", "imperial".to_string()),
            ("exclude", "minutely,hourly,alerts".to_string()),
            ("appid", self.api_key.clone()),
        ])
    }
}

impl RawSource for LiveSource {
    fn fetch_raw(&mut self) -> Result<String, WeatherError> {
        let response = self.request().send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn name(&self) -> &'static str {
        "OpenWeather API"
    }
}

/// Canned data for running without network access.
pub enum FixtureSource {
    /// A JSON document held in memory.
    Inline(String),
    /// A JSON file, re-read on every fetch so it can be edited live.
    File(PathBuf),
}

impl FixtureSource {
    pub fn bundled() -> Self {
        Self::Inline(BUNDLED_FIXTURE.to_string())
    }
}

impl RawSource for FixtureSource {
    fn fetch_raw(&mut self) -> Result<String, WeatherError> {
        match self {
            Self::Inline(json) => Ok(json.clone()),
            Self::File(path) => {
                std::fs::read_to_string(&*path).map_err(|source| WeatherError::Fixture {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "fake data"
    }
}

// ── Source with fallback ─────────────────────────────────────────────

pub struct WeatherSource {
    raw: Box<dyn RawSource>,
}

impl WeatherSource {
    pub fn new(raw: impl RawSource + 'static) -> Self {
        Self { raw: Box::new(raw) }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, WeatherError> {
        let source = match config {
            SourceConfig::Live {
                api_key,
                lat,
                lon,
                timeout,
            } => Self::new(LiveSource::new(*lat, *lon, api_key.clone(), *timeout)?),
            SourceConfig::Fixture(None) => Self::new(FixtureSource::bundled()),
            SourceConfig::Fixture(Some(path)) => Self::new(FixtureSource::File(path.clone())),
        };
        Ok(source)
    }

    pub fn name(&self) -> &'static str {
        self.raw.name()
    }

    /// Fetch and normalise, substituting the fallback reading on any error.
    pub fn fetch(&mut self) -> WeatherReading {
        match self.try_fetch() {
            Ok(reading) => {
                tracing::info!(
                    "Weather from {}: {}°F {} (range {}..{})",
                    self.raw.name(),
                    reading.temperature_f,
                    reading.icon_code,
                    reading.daily_min,
                    reading.daily_max
                );
                reading
            }
            Err(e) => {
                tracing::warn!("Weather fetch error: {}", e);
                WeatherReading::fallback()
            }
        }
    }

    pub fn try_fetch(&mut self) -> Result<WeatherReading, WeatherError> {
        let body = self.raw.fetch_raw()?;
        tracing::debug!("Weather response: {}", body);
        parse_one_call(&body)
    }
}

// ── Parsing ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct OneCall {
    current: Current,
    daily: Vec<Daily>,
}

#[derive(Deserialize)]
struct Current {
    temp: f64,
    weather: Vec<Condition>,
    dt: i64,
    sunrise: i64,
    sunset: i64,
}

#[derive(Deserialize)]
struct Condition {
    icon: String,
}

#[derive(Deserialize)]
struct Daily {
    temp: DailyTemp,
}

#[derive(Deserialize)]
struct DailyTemp {
    min: f64,
    max: f64,
}

/// Normalise a One Call response. Temperatures are truncated toward zero.
pub fn parse_one_call(json: &str) -> Result<WeatherReading, WeatherError> {
    let data: OneCall = serde_json::from_str(json)?;

    let icon_code = data
        .current
        .weather
        .into_iter()
        .next()
        .ok_or(WeatherError::MissingField("current.weather[0]"))?
        .icon;
    let today = data
        .daily
        .first()
        .ok_or(WeatherError::MissingField("daily[0]"))?;

    Ok(WeatherReading {
        temperature_f: data.current.temp as i32,
        icon_code,
        observed_at: data.current.dt,
        sunrise: data.current.sunrise,
        sunset: data.current.sunset,
        daily_min: today.temp.min as i32,
        daily_max: today.temp.max as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use tempfile::TempDir;

    struct FailingTransport;

    impl RawSource for FailingTransport {
        fn fetch_raw(&mut self) -> Result<String, WeatherError> {
            Err(WeatherError::Request("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn fixture_reading() -> WeatherReading {
        WeatherReading {
            temperature_f: 45,
            icon_code: "13d".to_string(),
            observed_at: 1_739_992_024,
            sunrise: 1_739_966_652,
            sunset: 1_740_006_242,
            daily_min: 40,
            daily_max: 60,
        }
    }

    /// Serve one HTTP response on a local port and return its base URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/onecall")
    }

    #[test]
    fn fallback_matches_documented_defaults() {
        let fallback = WeatherReading::fallback();
        assert_eq!(
            fallback,
            WeatherReading {
                temperature_f: 70,
                icon_code: "01d".to_string(),
                observed_at: 0,
                sunrise: 0,
                sunset: 43_200,
                daily_min: 60,
                daily_max: 80,
            }
        );
    }

    #[test]
    fn transport_failure_returns_fallback() {
        let mut source = WeatherSource::new(FailingTransport);
        assert!(source.try_fetch().is_err());
        assert_eq!(source.fetch(), WeatherReading::fallback());
    }

    #[test]
    fn bundled_fixture_normalises() {
        let mut source = WeatherSource::new(FixtureSource::bundled());
        assert_eq!(source.fetch(), fixture_reading());
    }

    #[rstest]
    #[case("not json")]
    #[case("{}")]
    #[case(r#"{"current": {"temp": 1, "weather": [], "dt": 0, "sunrise": 0, "sunset": 1}, "daily": [{"temp": {"min": 0, "max": 1}}]}"#)]
    #[case(r#"{"current": {"temp": 1, "weather": [{"icon": "01d"}], "dt": 0, "sunrise": 0, "sunset": 1}, "daily": []}"#)]
    #[case(r#"{"current": {"temp": "warm", "weather": [{"icon": "01d"}], "dt": 0, "sunrise": 0, "sunset": 1}, "daily": [{"temp": {"min": 0, "max": 1}}]}"#)]
    fn malformed_responses_fall_back(#[case] json: &str) {
        assert!(parse_one_call(json).is_err());
        let mut source = WeatherSource::new(FixtureSource::Inline(json.to_string()));
        assert_eq!(source.fetch(), WeatherReading::fallback());
    }

    #[test]
    fn missing_weather_entry_is_reported() {
        let json = r#"{"current": {"temp": 1, "weather": [], "dt": 0, "sunrise": 0, "sunset": 1}, "daily": [{"temp": {"min": 0, "max": 1}}]}"#;
        let err = parse_one_call(json).unwrap_err();
        assert!(err.to_string().contains("current.weather[0]"), "{err}");
    }

    #[rstest]
    #[case(45.99, 45)]
    #[case(-3.7, -3)]
    #[case(0.2, 0)]
    fn temperatures_truncate_toward_zero(#[case] temp: f64, #[case] expected: i32) {
        let json = format!(
            r#"{{"current": {{"temp": {temp}, "weather": [{{"icon": "10n"}}], "dt": 5, "sunrise": 1, "sunset": 9}}, "daily": [{{"temp": {{"min": {temp}, "max": 99.9}}}}]}}"#
        );
        let reading = parse_one_call(&json).unwrap();
        assert_eq!(reading.temperature_f, expected);
        assert_eq!(reading.daily_min, expected);
        assert_eq!(reading.daily_max, 99);
    }

    #[test]
    fn fixture_file_is_read_on_each_fetch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("weather.json");
        std::fs::write(&path, BUNDLED_FIXTURE).unwrap();

        let mut source = WeatherSource::new(FixtureSource::File(path.clone()));
        assert_eq!(source.fetch(), fixture_reading());

        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(source.fetch(), WeatherReading::fallback());
    }

    #[test]
    fn missing_fixture_file_falls_back() {
        let tmp = TempDir::new().unwrap();
        let mut raw = FixtureSource::File(tmp.path().join("absent.json"));
        assert!(matches!(raw.fetch_raw(), Err(WeatherError::Fixture { .. })));
    }

    #[test]
    fn live_request_carries_query_parameters() {
        let source = LiveSource::new(37.2135, -80.0374, "secret", Duration::from_secs(5)).unwrap();
        let request = source.request().build().unwrap();
        let url = request.url();

        assert_eq!(url.host_str(), Some("api.openweathermap.org"));
        assert_eq!(url.path(), "/data/3.0/onecall");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![
                ("lat".to_string(), "37.2135".to_string()),
                ("lon".to_string(), "-80.0374".to_string()),
                ("units".to_string(), "imperial".to_string()),
                ("exclude".to_string(), "minutely,hourly,alerts".to_string()),
                ("appid".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn live_source_reads_successful_response() {
        let url = serve_once("200 OK", BUNDLED_FIXTURE);
        let live = LiveSource::new(0.0, 0.0, "key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(url);
        let mut source = WeatherSource::new(live);
        assert_eq!(source.try_fetch().unwrap(), fixture_reading());
    }

    #[test]
    fn live_source_error_status_falls_back() {
        let url = serve_once("401 Unauthorized", r#"{"cod":401}"#);
        let mut live = LiveSource::new(0.0, 0.0, "bad", Duration::from_secs(5))
            .unwrap()
            .with_base_url(url);
        match live.fetch_raw() {
            Err(WeatherError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("401"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn live_source_connection_refused_falls_back() {
        // Grab a free port, then close it so nothing is listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let live = LiveSource::new(0.0, 0.0, "key", Duration::from_secs(2))
            .unwrap()
            .with_base_url(format!("http://127.0.0.1:{port}/onecall"));
        let mut source = WeatherSource::new(live);
        assert_eq!(source.fetch(), WeatherReading::fallback());
    }

    #[test]
    fn source_from_config_picks_transport() {
        let live = WeatherSource::from_config(&SourceConfig::Live {
            api_key: "key".to_string(),
            lat: 1.0,
            lon: 2.0,
            timeout: Duration::from_secs(3),
        })
        .unwrap();
        assert_eq!(live.name(), "OpenWeather API");

        let fake = WeatherSource::from_config(&SourceConfig::Fixture(None)).unwrap();
        assert_eq!(fake.name(), "fake data");
    }

    #[test]
    fn client_error_display() {
        let err = WeatherError::Client("no TLS backend".to_string());
        assert_eq!(err.to_string(), "could not build HTTP client: no TLS backend");
    }

    #[test]
    fn error_display() {
        let err = WeatherError::Status {
            status: 500,
            body: "oops".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("oops"));
    }
}
