//! ldk-mileage
//!
//! Truck mileage between a mill origin and a delivery point.
//!
//! Resolution runs a fixed chain per lane: the local lane cache, the desk
//! mileage server, a direct geocode-and-route lookup, and finally a failure
//! list for a human to fill in. A lane answered by any remote tier is written
//! back to the cache. Network failures are logged and demote the lane to the
//! next tier; nothing here guesses a distance.

mod cache;
mod client;
mod config;
mod error;
mod resolver;

pub use cache::{GeoCache, LaneCache, Upsert, LANES_KEY};
pub use client::{
    meters_to_miles, pick_place, Coords, GeoHit, Geocoder, HttpGeocoder, HttpMileageServer,
    HttpRouter, LaneRequest, LaneResult, MileageServer, Router, METERS_PER_MILE,
};
pub use config::MileageConfig;
pub use error::MileageError;
pub use resolver::{
    DirectLookup, DistanceResolver, MileageStrategy, Resolution, ResolveReport, ResolvedLane,
    ServerLookup,
};
