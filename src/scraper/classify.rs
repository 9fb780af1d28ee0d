//! Race-type and distance classification from race names.

use regex::Regex;

use crate::types::RaceKind;

/// Distances for "N tindar" mountain races, by peak count.
const TINDAR_DISTANCES: [(u32, f64); 4] = [(1, 7.0), (3, 19.0), (5, 27.0), (7, 37.0)];

/// Classify a race by keywords in its name, defaulting to `Other`.
pub fn classify_race(name: &str) -> RaceKind {
    let lower = name.to_lowercase();

    // Order matters: "half marathon" before "marathon".
    if lower.contains("hálfmaraþon")
        || lower.contains("hálft maraþon")
        || lower.contains("half marathon")
        || lower.contains("21,1")
        || lower.contains("21.1")
    {
        return RaceKind::HalfMarathon;
    }
    if lower.contains("maraþon") || lower.contains("marathon") || lower.contains("42,2") {
        return RaceKind::Marathon;
    }
    if lower.contains("tindar") || lower.contains("tindur") {
        return RaceKind::Trail;
    }
    if lower.contains("10k") || lower.contains("10 km") {
        return RaceKind::TenK;
    }
    if lower.contains("5k") || lower.contains("5 km") {
        return RaceKind::FiveK;
    }
    RaceKind::Other
}

/// Parse a distance in kilometers from the first numeric-plus-unit token in
/// the name, or from the peak count of a "N tindar" name.
pub fn extract_distance_km(name: &str) -> Option<f64> {
    let lower = name.to_lowercase();

    let km_re = Regex::new(r"(\d+(?:[.,]\d+)?)\s*km\b").unwrap();
    if let Some(caps) = km_re.captures(&lower) {
        return caps[1].replace(',', ".").parse().ok();
    }

    let tindar_re = Regex::new(r"(\d+)\s*tind").unwrap();
    if let Some(caps) = tindar_re.captures(&lower) {
        let peaks: u32 = caps[1].parse().ok()?;
        return TINDAR_DISTANCES
            .iter()
            .find(|(n, _)| *n == peaks)
            .map(|(_, km)| *km);
    }

    match classify_race(name) {
        RaceKind::Marathon => Some(42.195),
        RaceKind::HalfMarathon => Some(21.1),
        RaceKind::TenK => Some(10.0),
        RaceKind::FiveK => Some(5.0),
        _ => None,
    }
}
