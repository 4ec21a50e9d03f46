//! HTTP boundary: the desk mileage server, a forward geocoder and a driving
//! router. Each has a trait so the resolver can run against in-process fakes.

use serde::{Deserialize, Serialize};

use crate::config::MileageConfig;
use crate::error::MileageError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaneRequest {
    pub origin: String,
    pub dest: String,
}

impl LaneRequest {
    pub fn new(origin: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            dest: dest.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneResult {
    pub origin: String,
    pub dest: String,
    #[serde(default)]
    pub miles: Option<f64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

/// One geocoder candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoHit {
    pub coords: Coords,
    pub kind: Option<String>,
    pub address_type: Option<String>,
}

const SETTLEMENT_KINDS: [&str; 6] = ["city", "town", "village", "hamlet", "suburb", "neighbourhood"];

/// First settlement-like hit, else the first hit. Counties often share a
/// city's name and would route to the wrong point.
pub fn pick_place(hits: &[GeoHit]) -> Option<Coords> {
    let is_settlement =
        |k: &Option<String>| k.as_deref().map(|k| SETTLEMENT_KINDS.contains(&k)).unwrap_or(false);
    hits.iter()
        .find(|h| is_settlement(&h.kind) || is_settlement(&h.address_type))
        .or_else(|| hits.first())
        .map(|h| h.coords)
}

pub const METERS_PER_MILE: f64 = 1609.34;

pub fn meters_to_miles(meters: f64) -> f64 {
    (meters / METERS_PER_MILE).round()
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
pub trait MileageServer: Send + Sync {
    /// One result per requested lane; `miles` is `None` for lanes the server
    /// could not route.
    async fn bulk(&self, lanes: &[LaneRequest]) -> Result<Vec<LaneResult>, MileageError>;

    async fn single(&self, lane: &LaneRequest) -> Result<Option<f64>, MileageError>;
}

#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, place: &str) -> Result<Vec<GeoHit>, MileageError>;
}

#[async_trait::async_trait]
pub trait Router: Send + Sync {
    /// Driving distance in meters; `None` when the service finds no route.
    async fn driving_meters(&self, from: Coords, to: Coords) -> Result<Option<f64>, MileageError>;
}

fn http_client(cfg: &MileageConfig) -> Result<reqwest::Client, MileageError> {
    reqwest::Client::builder()
        .timeout(cfg.timeout())
        .build()
        .map_err(|e| MileageError::Transport(format!("http client build failed: {e}")))
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, MileageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let mut message: String = body.chars().take(200).collect();
    if message.trim().is_empty() {
        message = status.canonical_reason().unwrap_or("unknown").to_string();
    }
    Err(MileageError::Api {
        status: Some(status.as_u16()),
        message,
    })
}

// ---------------------------------------------------------------------------
// Desk mileage server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpMileageServer {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMileageServer {
    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(cfg: &MileageConfig, base_url: String) -> Result<Self, MileageError> {
        Ok(Self {
            http: http_client(cfg)?,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    lanes: &'a [LaneRequest],
}

#[derive(Deserialize)]
struct BulkResponse {
    #[serde(default)]
    results: Vec<LaneResult>,
}

#[derive(Deserialize)]
struct SingleResponse {
    #[serde(default)]
    miles: Option<f64>,
}

#[async_trait::async_trait]
impl MileageServer for HttpMileageServer {
    async fn bulk(&self, lanes: &[LaneRequest]) -> Result<Vec<LaneResult>, MileageError> {
        let resp = self
            .http
            .post(self.url("/api/mileage/bulk"))
            .json(&BulkRequest { lanes })
            .send()
            .await?;
        let body: BulkResponse = check_status(resp).await?.json().await?;
        Ok(body.results)
    }

    async fn single(&self, lane: &LaneRequest) -> Result<Option<f64>, MileageError> {
        let resp = self
            .http
            .post(self.url("/api/mileage"))
            .json(lane)
            .send()
            .await?;
        let body: SingleResponse = check_status(resp).await?.json().await?;
        Ok(body.miles)
    }
}

// ---------------------------------------------------------------------------
// Nominatim-style geocoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    http: reqwest::Client,
    search_url: String,
    user_agent: String,
}

impl HttpGeocoder {
    pub fn new_with_base_url(search_url: String, user_agent: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            search_url,
            user_agent,
        }
    }

    pub fn from_config(cfg: &MileageConfig) -> Result<Self, MileageError> {
        Ok(Self {
            http: http_client(cfg)?,
            search_url: cfg.geocode_url.clone(),
            user_agent: cfg.user_agent.clone(),
        })
    }
}

#[derive(Deserialize)]
struct PlaceRow {
    lat: String,
    lon: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    addresstype: Option<String>,
}

impl PlaceRow {
    fn into_hit(self) -> Result<GeoHit, MileageError> {
        let parse = |v: &str, what: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| MileageError::Decode(format!("bad {what} '{v}'")))
        };
        Ok(GeoHit {
            coords: Coords {
                lat: parse(&self.lat, "lat")?,
                lon: parse(&self.lon, "lon")?,
            },
            kind: self.kind,
            address_type: self.addresstype,
        })
    }
}

#[async_trait::async_trait]
impl Geocoder for HttpGeocoder {
    async fn search(&self, place: &str) -> Result<Vec<GeoHit>, MileageError> {
        let resp = self
            .http
            .get(&self.search_url)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .query(&[
                ("q", place),
                ("format", "json"),
                ("limit", "5"),
                ("countrycodes", "us"),
            ])
            .send()
            .await?;
        let rows: Vec<PlaceRow> = check_status(resp).await?.json().await?;
        rows.into_iter().map(PlaceRow::into_hit).collect()
    }
}

// ---------------------------------------------------------------------------
// OSRM-style router
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpRouter {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRouter {
    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(cfg: &MileageConfig) -> Result<Self, MileageError> {
        Ok(Self {
            http: http_client(cfg)?,
            base_url: cfg.route_url.clone(),
        })
    }

    fn route_url(&self, from: Coords, to: Coords) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.base_url.trim_end_matches('/'),
            from.lon,
            from.lat,
            to.lon,
            to.lat
        )
    }
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<RouteLeg>,
}

#[derive(Deserialize)]
struct RouteLeg {
    distance: f64,
}

#[async_trait::async_trait]
impl Router for HttpRouter {
    async fn driving_meters(&self, from: Coords, to: Coords) -> Result<Option<f64>, MileageError> {
        let resp = self
            .http
            .get(self.route_url(from, to))
            .query(&[("overview", "false")])
            .send()
            .await?;
        let body: RouteResponse = check_status(resp).await?.json().await?;
        if body.code != "Ok" {
            return Ok(None);
        }
        Ok(body.routes.first().map(|r| r.distance))
    }
}
