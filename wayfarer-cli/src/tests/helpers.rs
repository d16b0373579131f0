//! Test helpers for writing trip requests and itineraries to disk.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use tempfile::TempDir;
use wayfarer_core::test_support::{location, planned_itinerary, timestamp};
use wayfarer_core::{Itinerary, ModeSelection, OptimizationPreference, OptimizeRequest};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Two walkable paid stops, listed far one first.
pub(super) fn two_stop_request(budget: f64) -> OptimizeRequest {
    OptimizeRequest {
        locations: vec![
            location("gallery", 0.02, 0.0)
                .dwell_minutes(45)
                .cost(12.0)
                .build()
                .expect("valid gallery"),
            location("bakery", 0.01, 0.0)
                .dwell_minutes(20)
                .cost(6.0)
                .build()
                .expect("valid bakery"),
        ],
        start: Coord { x: 0.0, y: 0.0 },
        start_time: timestamp(10, 0),
        modes: ModeSelection::default(),
        preference: OptimizationPreference::TimeEfficient,
        budget,
    }
}

pub(super) fn write_request(path: &Utf8Path, request: &OptimizeRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialize request");
    write_utf8(path, payload.as_bytes());
}

/// Itinerary costing 150 against a budget of 100.
pub(super) fn over_budget_itinerary() -> Itinerary {
    planned_itinerary(&[("tower", 90.0), ("market", 60.0)], timestamp(10, 0), 100.0)
        .expect("valid itinerary")
}

pub(super) fn write_itinerary(path: &Utf8Path, itinerary: &Itinerary) {
    let payload = serde_json::to_string_pretty(itinerary).expect("serialize itinerary");
    write_utf8(path, payload.as_bytes());
}
