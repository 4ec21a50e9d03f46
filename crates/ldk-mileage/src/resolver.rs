use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{GeoCache, LaneCache};
use crate::client::{
    meters_to_miles, pick_place, Coords, Geocoder, HttpGeocoder, HttpMileageServer, HttpRouter,
    LaneRequest, MileageServer, Router,
};
use crate::config::MileageConfig;
use crate::error::MileageError;

/// Outcome of one tier for one lane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved(f64),
    /// This tier has no answer; hand the lane to the next one.
    Next,
}

impl Resolution {
    fn miles(self) -> Option<f64> {
        match self {
            Resolution::Resolved(m) if m.is_finite() && m > 0.0 => Some(m),
            _ => None,
        }
    }
}

/// One remote tier of the resolver chain.
#[async_trait::async_trait]
pub trait MileageStrategy: Send {
    fn name(&self) -> &'static str;

    /// One resolution per lane in `pending`, same order. Failures are
    /// reported as [`Resolution::Next`], never as errors.
    async fn resolve(&mut self, pending: &[LaneRequest]) -> Vec<Resolution>;
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn pair_key(origin: &str, dest: &str) -> (String, String) {
    (origin.trim().to_lowercase(), dest.trim().to_lowercase())
}

// ---------------------------------------------------------------------------
// Server tier
// ---------------------------------------------------------------------------

/// Asks the desk mileage server. A single lane goes to the single-lane
/// endpoint, anything more to the bulk endpoint.
pub struct ServerLookup {
    server: Box<dyn MileageServer>,
}

impl ServerLookup {
    pub fn new(server: Box<dyn MileageServer>) -> Self {
        Self { server }
    }
}

#[async_trait::async_trait]
impl MileageStrategy for ServerLookup {
    fn name(&self) -> &'static str {
        "server"
    }

    async fn resolve(&mut self, pending: &[LaneRequest]) -> Vec<Resolution> {
        if let [lane] = pending {
            return match self.server.single(lane).await {
                Ok(Some(m)) => vec![Resolution::Resolved(m)],
                Ok(None) => vec![Resolution::Next],
                Err(e) => {
                    warn!(origin = %lane.origin, dest = %lane.dest, error = %e, "mileage server lookup failed");
                    vec![Resolution::Next]
                }
            };
        }

        let results = match self.server.bulk(pending).await {
            Ok(r) => r,
            Err(e) => {
                warn!(lanes = pending.len(), error = %e, "bulk mileage lookup failed");
                return vec![Resolution::Next; pending.len()];
            }
        };

        let by_lane: HashMap<(String, String), f64> = results
            .into_iter()
            .filter_map(|r| r.miles.map(|m| (pair_key(&r.origin, &r.dest), m)))
            .collect();

        pending
            .iter()
            .map(|l| match by_lane.get(&pair_key(&l.origin, &l.dest)) {
                Some(m) => Resolution::Resolved(*m),
                None => Resolution::Next,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Direct tier
// ---------------------------------------------------------------------------

/// Geocode both ends, then ask the router. Lanes run one at a time; only
/// geocoder calls that missed the cache are followed by a delay.
pub struct DirectLookup {
    geocoder: Box<dyn Geocoder>,
    router: Box<dyn Router>,
    geo: GeoCache,
    origin_delay_ms: u64,
    dest_delay_ms: u64,
    lane_delay_ms: u64,
}

impl DirectLookup {
    pub fn new(geocoder: Box<dyn Geocoder>, router: Box<dyn Router>, cfg: &MileageConfig) -> Self {
        Self {
            geocoder,
            router,
            geo: GeoCache::default(),
            origin_delay_ms: cfg.origin_geocode_delay_ms,
            dest_delay_ms: cfg.dest_geocode_delay_ms,
            lane_delay_ms: cfg.lane_delay_ms,
        }
    }

    pub fn geo_cache(&self) -> &GeoCache {
        &self.geo
    }

    async fn locate(&mut self, place: &str, delay_ms: u64) -> Option<Coords> {
        if let Some(hit) = self.geo.get(place) {
            debug!(place, "geocode cache hit");
            return Some(hit);
        }
        let found = match self.geocoder.search(place).await {
            Ok(hits) => pick_place(&hits),
            Err(e) => {
                warn!(place, error = %e, "geocode failed");
                None
            }
        };
        if let Some(c) = found {
            self.geo.insert(place, c);
        }
        pause(delay_ms).await;
        found
    }

    async fn lane_miles(&mut self, lane: &LaneRequest) -> Option<f64> {
        let from = self.locate(&lane.origin, self.origin_delay_ms).await?;
        let to = self.locate(&lane.dest, self.dest_delay_ms).await?;
        match self.router.driving_meters(from, to).await {
            Ok(Some(m)) => Some(meters_to_miles(m)),
            Ok(None) => {
                debug!(origin = %lane.origin, dest = %lane.dest, "no route");
                None
            }
            Err(e) => {
                warn!(origin = %lane.origin, dest = %lane.dest, error = %e, "route lookup failed");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl MileageStrategy for DirectLookup {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn resolve(&mut self, pending: &[LaneRequest]) -> Vec<Resolution> {
        let mut out = Vec::with_capacity(pending.len());
        for lane in pending {
            let r = match self.lane_miles(lane).await {
                Some(m) => Resolution::Resolved(m),
                None => Resolution::Next,
            };
            out.push(r);
            pause(self.lane_delay_ms).await;
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedLane {
    pub origin: String,
    pub dest: String,
    pub miles: f64,
    /// `cache` or the name of the tier that answered.
    pub source: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResolveReport {
    pub resolved: Vec<ResolvedLane>,
    /// Lanes no tier could answer. Miles for these have to be entered by hand
    /// through [`LaneCache::upsert`].
    pub failed: Vec<LaneRequest>,
}

impl ResolveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lane cache first, then each strategy in order, then the failure list.
pub struct DistanceResolver {
    lanes: LaneCache,
    strategies: Vec<Box<dyn MileageStrategy>>,
}

impl DistanceResolver {
    pub fn new(lanes: LaneCache, strategies: Vec<Box<dyn MileageStrategy>>) -> Self {
        Self { lanes, strategies }
    }

    /// Server tier when a server is configured, then the direct tier.
    pub fn from_config(cfg: &MileageConfig, lanes: LaneCache) -> Result<Self, MileageError> {
        let mut strategies: Vec<Box<dyn MileageStrategy>> = Vec::new();
        if let Some(url) = cfg.server_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let server = HttpMileageServer::from_config(cfg, url.to_string())?;
            strategies.push(Box::new(ServerLookup::new(Box::new(server))));
        }
        strategies.push(Box::new(DirectLookup::new(
            Box::new(HttpGeocoder::from_config(cfg)?),
            Box::new(HttpRouter::from_config(cfg)?),
            cfg,
        )));
        Ok(Self::new(lanes, strategies))
    }

    pub fn lanes(&self) -> &LaneCache {
        &self.lanes
    }

    pub fn lanes_mut(&mut self) -> &mut LaneCache {
        &mut self.lanes
    }

    pub fn into_lanes(self) -> LaneCache {
        self.lanes
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Cached miles only; no network.
    pub fn miles(&self, origin: &str, dest: &str) -> Option<f64> {
        self.lanes.miles(origin, dest)
    }

    /// Resolve every requested lane. Duplicate requests (ignoring case) are
    /// looked up once. Every answer from a remote tier is written to the lane
    /// cache before the report is returned.
    pub async fn resolve(&mut self, requests: &[LaneRequest]) -> ResolveReport {
        let mut report = ResolveReport::default();
        let mut seen = BTreeSet::new();
        let mut pending: Vec<LaneRequest> = Vec::new();

        for req in requests {
            if !seen.insert(pair_key(&req.origin, &req.dest)) {
                continue;
            }
            match self.lanes.miles(&req.origin, &req.dest) {
                Some(miles) => report.resolved.push(ResolvedLane {
                    origin: req.origin.clone(),
                    dest: req.dest.clone(),
                    miles,
                    source: "cache",
                }),
                None => pending.push(req.clone()),
            }
        }

        for strategy in self.strategies.iter_mut() {
            if pending.is_empty() {
                break;
            }
            let name = strategy.name();
            let results = strategy.resolve(&pending).await;
            if results.len() != pending.len() {
                warn!(
                    tier = name,
                    expected = pending.len(),
                    got = results.len(),
                    "tier returned wrong number of results; skipping it"
                );
                continue;
            }

            let mut still = Vec::new();
            for (lane, r) in pending.into_iter().zip(results) {
                match r.miles() {
                    Some(miles) => {
                        self.lanes.upsert(&lane.origin, &lane.dest, miles);
                        debug!(tier = name, origin = %lane.origin, dest = %lane.dest, miles, "lane resolved");
                        report.resolved.push(ResolvedLane {
                            origin: lane.origin,
                            dest: lane.dest,
                            miles,
                            source: name,
                        });
                    }
                    None => still.push(lane),
                }
            }
            pending = still;
        }

        report.failed = pending;
        info!(
            resolved = report.resolved.len(),
            failed = report.failed.len(),
            "lane resolution finished"
        );
        report
    }

    /// One lane through the whole chain.
    pub async fn single_lane(&mut self, origin: &str, dest: &str) -> Option<f64> {
        let report = self.resolve(&[LaneRequest::new(origin, dest)]).await;
        report.resolved.first().map(|r| r.miles)
    }
}
