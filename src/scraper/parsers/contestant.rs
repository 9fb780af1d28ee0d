//! Contestant detail parser.
//!
//! A detail page carries a header block with the contestant's name, bib,
//! club and category, followed by a table of split times. Pages for
//! contestants who have not started yet have neither splits nor a final
//! time.

use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{element_text, extract_birth_year};
use crate::types::{ContestantDetail, ContestantStatus, Identifier, Split};

/// Fewer columns than this is not a split row.
const MIN_SPLIT_COLUMNS: usize = 3;

/// Parser for contestant detail pages
pub struct ContestantParser;

impl ContestantParser {
    /// Parse a detail page. Returns `None` when the page carries no
    /// recognizable contestant block at all.
    pub fn parse(html: &str, contestant_id: &str) -> Option<ContestantDetail> {
        let document = Html::parse_document(html);

        let name = Self::header_text(&document)?;
        let bib = Self::labeled_value(&document, &["Rásnúmer", "Bib"]).unwrap_or_default();
        let club = Self::labeled_value(&document, &["Félag", "Club"]).unwrap_or_default();
        let category = Self::labeled_value(&document, &["Flokkur", "Category"]).unwrap_or_default();

        let birth_year = extract_birth_year(None, &name, &format!("{} {}", category, club));

        let splits = Self::parse_splits(&document);
        let final_time = Self::final_time(&document, &splits);

        let status = if !final_time.is_empty() {
            ContestantStatus::Finished
        } else if !splits.is_empty() {
            ContestantStatus::InProgress
        } else {
            ContestantStatus::NotStarted
        };

        Some(ContestantDetail {
            id: Identifier::Source(contestant_id.to_string()),
            name: super::strip_year_parens(&name),
            bib,
            category,
            club,
            birth_year,
            final_time,
            checkpoint_count: splits.len(),
            splits,
            last_updated: Utc::now(),
            status,
        })
    }

    /// Contestant name from the page header, most specific selector first.
    fn header_text(document: &Html) -> Option<String> {
        for selector_str in ["div.ibox-title h5", "h2", "h1"] {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(el) = document.select(&selector).next() {
                    let text = element_text(&el);
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
        }
        None
    }

    /// Value of a `<label>: <value>` pair in the header block.
    fn labeled_value(document: &Html, labels: &[&str]) -> Option<String> {
        let selector = Selector::parse("td, dd, span, p").ok()?;
        for el in document.select(&selector) {
            let text = element_text(&el);
            for &label in labels {
                if let Some(rest) = text.strip_prefix(label) {
                    let value = rest.trim_start_matches(':').trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
        None
    }

    fn parse_splits(document: &Html) -> Vec<Split> {
        let strategies = ["div.ibox-content table", "table.table", "table"];

        for selector_str in strategies {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            if let Some(table) = document.select(&selector).next() {
                let splits = Self::splits_from_table(&table);
                if !splits.is_empty() {
                    return splits;
                }
            }
        }

        debug!("no splits table found");
        Vec::new()
    }

    fn splits_from_table(table: &ElementRef) -> Vec<Split> {
        let row_selector = Selector::parse("tr").unwrap();
        let td_selector = Selector::parse("td").unwrap();
        let mut splits = Vec::new();

        // Row 0 is the header.
        for row in table.select(&row_selector).skip(1) {
            let cells: Vec<String> = row.select(&td_selector).map(|c| element_text(&c)).collect();
            if cells.len() < MIN_SPLIT_COLUMNS {
                continue;
            }

            // Column layouts seen in the wild:
            //   checkpoint | distance | split | cumulative | position
            //   checkpoint | split | cumulative | position
            //   checkpoint | split | cumulative
            let split = match cells.len() {
                3 => Split {
                    checkpoint: cells[0].clone(),
                    distance: String::new(),
                    split_time: cells[1].clone(),
                    cumulative_time: cells[2].clone(),
                    position: String::new(),
                },
                4 => Split {
                    checkpoint: cells[0].clone(),
                    distance: String::new(),
                    split_time: cells[1].clone(),
                    cumulative_time: cells[2].clone(),
                    position: cells[3].clone(),
                },
                _ => Split {
                    checkpoint: cells[0].clone(),
                    distance: cells[1].clone(),
                    split_time: cells[2].clone(),
                    cumulative_time: cells[3].clone(),
                    position: cells[4].clone(),
                },
            };
            splits.push(split);
        }

        splits
    }

    /// Final time from a labeled element, falling back to the last
    /// cumulative split when the label is absent.
    fn final_time(document: &Html, splits: &[Split]) -> String {
        if let Some(time) = Self::labeled_value(document, &["Tími", "Time"]) {
            let time_re = Regex::new(r"\d{1,2}:\d{2}(?::\d{2})?").unwrap();
            if let Some(m) = time_re.find(&time) {
                return m.as_str().to_string();
            }
        }

        // Only a finish-line split counts as a final time.
        if let Some(last) = splits.last() {
            let checkpoint = last.checkpoint.to_lowercase();
            if checkpoint.contains("endamark")
                || checkpoint.contains("finish")
                || checkpoint.contains("mark")
            {
                return last.cumulative_time.clone();
            }
        }
        String::new()
    }
}
