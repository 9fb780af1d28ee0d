//! Static fallback dataset.
//!
//! Served whenever the source host is unreachable, mock mode is forced, or a
//! live extraction comes back empty where data was expected. The shapes match
//! live records exactly so callers cannot tell them apart structurally; the
//! `/data-source` endpoint is the place to ask which one is being served.

use chrono::Utc;

use crate::scraper::classify::{classify_race, extract_distance_km};
use crate::types::{
    ContestantDetail, ContestantStatus, Event, Identifier, Race, RaceResult, Split,
};

pub fn events(limit: usize) -> Vec<Event> {
    let all = vec![
        Event {
            id: Identifier::Source("rvkmarathon-2025".into()),
            name: "Reykjavíkurmaraþon 2025".into(),
            date: "23.08.2025".into(),
            url: "https://timataka.net/rvkmarathon-2025/".into(),
        },
        Event {
            id: Identifier::Source("midnaeturhlaup-2025".into()),
            name: "Miðnæturhlaup Suzuki 2025".into(),
            date: "21.06.2025".into(),
            url: "https://timataka.net/midnaeturhlaup-2025/".into(),
        },
        Event {
            id: Identifier::Source("tindahlaup-2025".into()),
            name: "Tindahlaup Mosfellsbæjar 2025".into(),
            date: "30.08.2025".into(),
            url: "https://timataka.net/tindahlaup-2025/".into(),
        },
    ];
    all.into_iter().take(limit).collect()
}

pub fn races(event_id: &str) -> Vec<Race> {
    let names: &[&str] = match event_id {
        id if id.contains("tindahlaup") => &["7 tindar (37 km)", "5 tindar (27 km)", "3 tindar (19 km)"],
        id if id.contains("midnaeturhlaup") => &["10 km", "5 km", "3 km skemmtiskokk"],
        _ => &["Maraþon", "Hálft maraþon", "10 km hlaup"],
    };

    names
        .iter()
        .enumerate()
        .map(|(i, name)| Race {
            id: Identifier::Synthetic(format!("race-{}", i + 1)),
            name: (*name).into(),
            url: super::race_results_url(event_id, i as u32 + 1, "overall"),
            event_id: Some(Identifier::Source(event_id.to_string())),
            kind: classify_race(name),
            distance_km: extract_distance_km(name),
        })
        .collect()
}

/// Friendly name for a mock race id, for denormalized result rows.
pub fn race_display_name(race_id: &str) -> String {
    match race_id {
        "race-1" => "Maraþon",
        "race-2" => "Hálft maraþon",
        "race-3" => "10 km hlaup",
        _ => "Hlaup",
    }
    .to_string()
}

pub fn results(race_id: &str, race_name: &str) -> Vec<RaceResult> {
    let rows: [(&str, &str, &str, &str, &str, &str, Option<&str>); 4] = [
        ("1", "101", "Jón Jónsson", "ÍR", "M 35-39", "2:34:56", Some("1988")),
        ("2", "204", "Anna Sigríðardóttir", "Breiðablik", "K 30-34", "2:41:12", Some("1992")),
        ("3", "310", "Guðrún Pálsdóttir", "FH", "K 40-44", "2:45:03", Some("1983")),
        ("4", "412", "Einar Einarsson", "UMFK", "M 50-54", "2:52:47", None),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (position, bib, name, club, category, time, year))| RaceResult {
            id: Identifier::Synthetic(format!("{}-{}-{}", race_id, i, super::parsers::slugify(name))),
            position: (*position).into(),
            name: (*name).into(),
            bib: (*bib).into(),
            club: (*club).into(),
            category: (*category).into(),
            time: (*time).into(),
            birth_year: (*year).map(str::to_string),
            race_id: race_id.to_string(),
            race_name: race_name.to_string(),
        })
        .collect()
}

pub fn contestant(contestant_id: &str) -> Option<ContestantDetail> {
    // The mock roster only carries detail for the race winner; other ids
    // reconstruct from their results row or fall through to a not-found
    // record in the orchestration layer.
    let known = results("race-1", "Maraþon");
    let row = known.iter().find(|r| r.id.as_str() == contestant_id)?;

    let mut detail = ContestantDetail::from_result(row);
    detail.splits = vec![
        Split {
            checkpoint: "Elliðaárdalur".into(),
            distance: "10 km".into(),
            split_time: "36:10".into(),
            cumulative_time: "36:10".into(),
            position: "4".into(),
        },
        Split {
            checkpoint: "Kársnes".into(),
            distance: "21.1 km".into(),
            split_time: "40:25".into(),
            cumulative_time: "1:16:35".into(),
            position: "3".into(),
        },
        Split {
            checkpoint: "Endamark".into(),
            distance: "42.2 km".into(),
            split_time: "1:18:21".into(),
            cumulative_time: detail.final_time.clone(),
            position: row.position.clone(),
        },
    ];
    detail.checkpoint_count = detail.splits.len();
    detail.last_updated = Utc::now();
    detail.status = ContestantStatus::Finished;
    Some(detail)
}
