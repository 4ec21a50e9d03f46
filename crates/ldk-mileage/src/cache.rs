//! Lane and geocode caches. Both grow without bound; a desk works a few hundred
//! lanes at most.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use ldk_schemas::Lane;
use ldk_store::{load_as, save_as, KvStore, StoreError};
use tracing::debug;

use crate::client::Coords;

/// Store key the lane list lives under.
pub const LANES_KEY: &str = "lanes";

type LaneKey = (String, String);

fn place_key(s: &str) -> String {
    s.trim().to_lowercase()
}

fn lane_key(origin: &str, dest: &str) -> LaneKey {
    (place_key(origin), place_key(dest))
}

/// `"Warren, AR"` -> (`"warren"`, `"ar"`). Input must already be lowercased.
fn split_place(s: &str) -> (&str, &str) {
    let mut parts = s.split(',');
    let city = parts.next().unwrap_or("").trim();
    let state = parts.next().unwrap_or("").trim();
    (city, state)
}

fn place_matches(cached: &str, query: &str) -> bool {
    let (c_city, c_state) = split_place(cached);
    let (q_city, q_state) = split_place(query);
    !q_city.is_empty()
        && c_city.contains(q_city)
        && (q_state.is_empty() || c_state.is_empty() || q_state == c_state)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    Unchanged,
    /// Miles were zero, negative or not a number.
    Rejected,
}

/// Known lanes keyed by case-insensitive `(origin, dest)`.
#[derive(Clone, Debug, Default)]
pub struct LaneCache {
    lanes: BTreeMap<LaneKey, Lane>,
}

impl LaneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries win when two lanes share a key.
    pub fn from_lanes<I: IntoIterator<Item = Lane>>(lanes: I) -> Self {
        let mut cache = Self::new();
        for lane in lanes {
            cache.upsert_at(&lane.origin, &lane.dest, lane.miles, lane.added);
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.values()
    }

    /// Exact case-insensitive match, else the first lane (in key order) whose
    /// origin and destination city segments contain the queried ones and
    /// whose states agree where both sides give one.
    pub fn get(&self, origin: &str, dest: &str) -> Option<&Lane> {
        if origin.trim().is_empty() || dest.trim().is_empty() {
            return None;
        }
        let key = lane_key(origin, dest);
        if let Some(hit) = self.lanes.get(&key) {
            return Some(hit);
        }
        self.lanes
            .iter()
            .find(|((o, d), _)| place_matches(o, &key.0) && place_matches(d, &key.1))
            .map(|(_, lane)| lane)
    }

    /// Cached miles for a lane. A stored zero counts as unknown.
    pub fn miles(&self, origin: &str, dest: &str) -> Option<f64> {
        self.get(origin, dest)
            .map(|l| l.miles)
            .filter(|m| m.is_finite() && *m > 0.0)
    }

    pub fn upsert(&mut self, origin: &str, dest: &str, miles: f64) -> Upsert {
        self.upsert_at(origin, dest, miles, Utc::now())
    }

    /// Insert or overwrite by exact case-insensitive `(origin, dest)`. An
    /// existing lane keeps its spelling; its miles and timestamp change only
    /// when the miles differ.
    pub fn upsert_at(&mut self, origin: &str, dest: &str, miles: f64, at: DateTime<Utc>) -> Upsert {
        if !miles.is_finite() || miles <= 0.0 || origin.trim().is_empty() || dest.trim().is_empty()
        {
            return Upsert::Rejected;
        }
        match self.lanes.entry(lane_key(origin, dest)) {
            Entry::Occupied(mut e) => {
                let existing = e.get_mut();
                if existing.miles == miles {
                    return Upsert::Unchanged;
                }
                debug!(origin, dest, old = existing.miles, new = miles, "lane updated");
                existing.miles = miles;
                existing.added = at;
                Upsert::Updated
            }
            Entry::Vacant(v) => {
                v.insert(Lane {
                    origin: origin.trim().to_string(),
                    dest: dest.trim().to_string(),
                    miles,
                    added: at,
                });
                Upsert::Inserted
            }
        }
    }

    pub fn load(store: &dyn KvStore) -> Result<Self, StoreError> {
        let lanes: Vec<Lane> = load_as(store, LANES_KEY)?.unwrap_or_default();
        Ok(Self::from_lanes(lanes))
    }

    pub fn save(&self, store: &mut dyn KvStore) -> Result<(), StoreError> {
        let lanes: Vec<&Lane> = self.iter().collect();
        save_as(store, LANES_KEY, &lanes)
    }
}

/// Geocoder results by lowercased, trimmed place name.
#[derive(Clone, Debug, Default)]
pub struct GeoCache {
    places: HashMap<String, Coords>,
}

impl GeoCache {
    pub fn get(&self, place: &str) -> Option<Coords> {
        self.places.get(&place_key(place)).copied()
    }

    pub fn insert(&mut self, place: &str, coords: Coords) {
        self.places.insert(place_key(place), coords);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldk_store::MemoryStore;

    fn cache() -> LaneCache {
        let mut c = LaneCache::new();
        c.upsert("Warren, AR", "Cincinnati, OH", 650.0);
        c
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let c = cache();
        assert_eq!(c.miles("WARREN, AR", "CINCINNATI, OH"), Some(650.0));
        assert_eq!(c.miles("  warren, ar ", "cincinnati, oh"), Some(650.0));
    }

    #[test]
    fn lookup_by_partial_city() {
        let c = cache();
        assert_eq!(c.miles("Warren", "Cincinnati"), Some(650.0));
        assert_eq!(c.miles("warr", "Cinci, OH"), Some(650.0));
        assert_eq!(c.miles("Warren, TX", "Cincinnati"), None);
        assert_eq!(c.miles("Dierks, AR", "Cincinnati, OH"), None);
        assert_eq!(c.miles("", "Cincinnati, OH"), None);
        assert_eq!(c.miles(", AR", ", OH"), None);
    }

    #[test]
    fn upsert_never_duplicates() {
        let mut c = cache();
        assert_eq!(c.upsert("warren, ar", "CINCINNATI, OH", 650.0), Upsert::Unchanged);
        assert_eq!(c.upsert("warren, ar", "CINCINNATI, OH", 655.0), Upsert::Updated);
        assert_eq!(c.len(), 1);
        let lane = c.iter().next().unwrap();
        assert_eq!(lane.origin, "Warren, AR");
        assert_eq!(lane.miles, 655.0);
    }

    #[test]
    fn unusable_miles_are_rejected() {
        let mut c = LaneCache::new();
        assert_eq!(c.upsert("Warren, AR", "Dallas, TX", 0.0), Upsert::Rejected);
        assert_eq!(c.upsert("Warren, AR", "Dallas, TX", f64::NAN), Upsert::Rejected);
        assert_eq!(c.upsert("", "Dallas, TX", 300.0), Upsert::Rejected);
        assert!(c.is_empty());
    }

    #[test]
    fn stored_zero_reads_as_unknown() {
        let c = LaneCache::from_lanes(vec![Lane {
            origin: "A, AR".into(),
            dest: "B, TX".into(),
            miles: 0.0,
            added: Utc::now(),
        }]);
        // from_lanes goes through upsert, which refuses zero.
        assert!(c.is_empty());
        assert_eq!(c.miles("A, AR", "B, TX"), None);
    }

    #[test]
    fn store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(LaneCache::load(&store).unwrap().is_empty());

        cache().save(&mut store).unwrap();
        let back = LaneCache::load(&store).unwrap();
        assert_eq!(back.miles("Warren", "Cincinnati"), Some(650.0));
    }

    #[test]
    fn geo_cache_keys_are_normalized() {
        let mut g = GeoCache::default();
        let pt = Coords { lat: 33.6, lon: -92.07 };
        g.insert(" Warren, AR ", pt);
        assert_eq!(g.get("warren, ar"), Some(pt));
        assert_eq!(g.len(), 1);
    }
}
