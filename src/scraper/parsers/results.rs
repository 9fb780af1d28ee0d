//! Results-table parser for a race results page.
//!
//! Rows are positional: row 0 is the header and is skipped by position, and a
//! data row must have a minimum number of columns. Short rows are silently
//! dropped, never an error.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{
    element_text, extract_birth_year, identifier_from_url, query_param, slugify,
    strip_year_parens,
};
use crate::types::{Identifier, RaceResult};

/// Fewer columns than this is not a data row.
const MIN_RESULT_COLUMNS: usize = 4;

/// Parser for race results tables
pub struct ResultsParser;

impl ResultsParser {
    pub fn parse(html: &str, race_id: &str, race_name: &str) -> Vec<RaceResult> {
        let document = Html::parse_document(html);

        let Some(table) = Self::find_table(&document) else {
            debug!("no results table found for race {}", race_id);
            return Vec::new();
        };

        let row_selector = Selector::parse("tr").unwrap();
        let mut results = Vec::new();

        // Row 0 is the header.
        for (i, row) in table.select(&row_selector).enumerate().skip(1) {
            if let Some(result) = Self::parse_row(&row, i - 1, race_id, race_name) {
                results.push(result);
            }
        }

        results
    }

    /// Locate the results table, most specific container first.
    fn find_table<'a>(document: &'a Html) -> Option<ElementRef<'a>> {
        let strategies = ["div.ibox-content table", "table.table", "table"];

        for selector_str in strategies {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(table) = document.select(&selector).next() {
                    return Some(table);
                }
            }
        }
        None
    }

    fn parse_row(
        row: &ElementRef,
        index: usize,
        race_id: &str,
        race_name: &str,
    ) -> Option<RaceResult> {
        let td_selector = Selector::parse("td").unwrap();
        let cells: Vec<_> = row.select(&td_selector).collect();

        if cells.len() < MIN_RESULT_COLUMNS {
            return None;
        }

        let position = element_text(&cells[0]);
        let bib = element_text(&cells[1]);

        // The contestant name normally carries an anchor to the detail page.
        let anchor_selector = Selector::parse("a[href]").unwrap();
        let anchor = row.select(&anchor_selector).next();

        let (name_idx, raw_name, anchor_title, anchor_href) = match anchor {
            Some(a) => {
                let idx = cells
                    .iter()
                    .position(|c| c.select(&anchor_selector).next().is_some())
                    .unwrap_or(2);
                (
                    idx,
                    element_text(&a),
                    a.value().attr("title").map(str::to_string),
                    a.value().attr("href").map(str::to_string),
                )
            }
            None => (2, element_text(&cells[2]), None, None),
        };

        if raw_name.is_empty() {
            return None;
        }

        let club = cells
            .get(name_idx + 1)
            .map(element_text)
            .unwrap_or_default();
        let category = cells
            .get(name_idx + 2)
            .map(element_text)
            .unwrap_or_default();

        let birth_year = extract_birth_year(
            anchor_title.as_deref(),
            &raw_name,
            &format!("{} {}", category, club),
        );
        let name = strip_year_parens(&raw_name);

        // Finish time is the rightmost time-shaped cell; placeholders like
        // "DNF" fall through to the last column as-is.
        let time_re = Regex::new(r"^\d{1,2}:\d{2}(?::\d{2})?$").unwrap();
        let time = cells
            .iter()
            .rev()
            .map(element_text)
            .find(|t| time_re.is_match(t))
            .unwrap_or_else(|| element_text(cells.last().unwrap()));

        let id = anchor_href
            .as_deref()
            .and_then(Self::contestant_id)
            .unwrap_or_else(|| {
                Identifier::Synthetic(format!("{}-{}-{}", race_id, index, slugify(&name)))
            });

        Some(RaceResult {
            id,
            position,
            name,
            bib,
            club,
            category,
            time,
            birth_year,
            race_id: race_id.to_string(),
            race_name: race_name.to_string(),
        })
    }

    /// Site-assigned contestant id from the anchor URL when discoverable.
    fn contestant_id(href: &str) -> Option<Identifier> {
        for param in ["u", "contestant"] {
            if let Some(value) = query_param(href, param) {
                if !value.is_empty() {
                    return Some(Identifier::Source(value));
                }
            }
        }
        identifier_from_url(href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="ibox-content">
<table class="table">
  <tr>
    <th>Sæti</th><th>Rásnúmer</th><th>Nafn</th><th>Félag</th><th>Flokkur</th><th>Tími</th>
  </tr>
  <tr>
    <td>1</td>
    <td>101</td>
    <td><a href="?race=1&u=5501" title="Jón Jónsson (1988)">Jón Jónsson</a></td>
    <td>ÍR</td>
    <td>M 35-39</td>
    <td>2:34:56</td>
  </tr>
  <tr>
    <td>2</td>
    <td>204</td>
    <td>Anna Sigríðardóttir (1992)</td>
    <td>Breiðablik</td>
    <td>K 30-34</td>
    <td>2:41:12</td>
  </tr>
  <tr>
    <td>3</td>
    <td>310</td>
    <td>Guðrún Pálsdóttir</td>
    <td>FH 1985</td>
    <td>K 40-44</td>
    <td>2:45:03</td>
  </tr>
  <tr>
    <td>DNF</td>
    <td>412</td>
    <td>Einar Einarsson</td>
    <td>UMFK</td>
    <td>M 50-54</td>
    <td>DNF</td>
  </tr>
  <tr>
    <td>colspan filler</td>
    <td>too short</td>
  </tr>
</table>
</div>
</body>
</html>"#;

    #[test]
    fn test_parse_results_table() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");

        assert_eq!(results.len(), 4);

        let first = &results[0];
        assert_eq!(first.position, "1");
        assert_eq!(first.bib, "101");
        assert_eq!(first.name, "Jón Jónsson");
        assert_eq!(first.club, "ÍR");
        assert_eq!(first.category, "M 35-39");
        assert_eq!(first.time, "2:34:56");
        assert_eq!(first.race_id, "race-1");
        assert_eq!(first.race_name, "Maraþon");
    }

    #[test]
    fn test_site_assigned_id_from_anchor() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(results[0].id, Identifier::Source("5501".into()));
    }

    #[test]
    fn test_synthetic_composite_id_without_anchor() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(
            results[1].id,
            Identifier::Synthetic("race-1-1-anna-sigríðardóttir".into())
        );
    }

    #[test]
    fn test_birth_year_from_title_attribute() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(results[0].birth_year.as_deref(), Some("1988"));
    }

    #[test]
    fn test_birth_year_from_name_parens() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(results[1].birth_year.as_deref(), Some("1992"));
        // The year token is stripped from the stored name.
        assert_eq!(results[1].name, "Anna Sigríðardóttir");
    }

    #[test]
    fn test_birth_year_from_club_column() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(results[2].birth_year.as_deref(), Some("1985"));
    }

    #[test]
    fn test_birth_year_never_guessed() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(results[3].birth_year, None);
    }

    #[test]
    fn test_non_numeric_position_kept_as_text() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert_eq!(results[3].position, "DNF");
        assert_eq!(results[3].time, "DNF");
    }

    #[test]
    fn test_short_rows_skipped_silently() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert!(results.iter().all(|r| r.name != "colspan filler"));
    }

    #[test]
    fn test_header_row_skipped_by_position() {
        let results = ResultsParser::parse(SAMPLE_HTML, "race-1", "Maraþon");
        assert!(results.iter().all(|r| r.position != "Sæti"));
    }

    #[test]
    fn test_empty_html() {
        let results = ResultsParser::parse("<html></html>", "race-1", "x");
        assert!(results.is_empty());
    }
}
