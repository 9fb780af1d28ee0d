//! Contestant search across recent race results.
//!
//! Matching is case-insensitive substring containment, attempted both with
//! Icelandic characters folded to their closest Latin equivalents and with
//! the raw lowercased text. A birth year in the query acts as a strict
//! filter when it can be satisfied; otherwise the name-only matches are
//! returned with the first one annotated.

use regex::Regex;

use crate::types::RaceResult;

/// A parsed search query: the bare name portion plus an optional birth year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: String,
    pub birth_year: Option<String>,
}

/// Parse a raw query, recognizing a birth year as either a bare 4-digit
/// 19xx/20xx token or a parenthesized one, anywhere in the query. The year
/// token is stripped from the name portion.
pub fn parse_query(raw: &str) -> SearchQuery {
    let paren_re = Regex::new(r"\(((?:19|20)\d{2})\)").unwrap();
    let bare_re = Regex::new(r"\b((?:19|20)\d{2})\b").unwrap();

    let (year, stripped) = if let Some(caps) = paren_re.captures(raw) {
        let year = caps[1].to_string();
        (Some(year), paren_re.replace(raw, "").into_owned())
    } else if let Some(caps) = bare_re.captures(raw) {
        let year = caps[1].to_string();
        (Some(year), bare_re.replace(raw, "").into_owned())
    } else {
        (None, raw.to_string())
    };

    let name = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    SearchQuery {
        name,
        birth_year: year,
    }
}

/// Fold Icelandic accented and special characters to unaccented Latin
/// equivalents, lowercasing along the way.
pub fn fold_icelandic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match c {
            'á' => out.push('a'),
            'í' => out.push('i'),
            'ó' => out.push('o'),
            'ú' => out.push('u'),
            'ý' => out.push('y'),
            'é' => out.push('e'),
            'ö' => out.push('o'),
            'þ' => out.push_str("th"),
            'æ' => out.push_str("ae"),
            'ð' => out.push('d'),
            _ => out.push(c),
        }
    }
    out
}

/// Substring containment, tried folded and raw-lowercased.
fn text_matches(query: &str, candidate: &str) -> bool {
    if query.is_empty() {
        return false;
    }
    fold_icelandic(candidate).contains(&fold_icelandic(query))
        || candidate.to_lowercase().contains(&query.to_lowercase())
}

/// Search a window of race results. Output order is source iteration order;
/// duplicates of the same person across races are collapsed, keeping the
/// first occurrence.
pub fn search(candidates: &[RaceResult], raw_query: &str) -> Vec<RaceResult> {
    let query = parse_query(raw_query);

    let mut matches: Vec<RaceResult> = candidates
        .iter()
        .filter(|r| text_matches(&query.name, &r.name))
        .cloned()
        .collect();

    // Secondary fallback pass only: category text.
    if matches.is_empty() {
        matches = candidates
            .iter()
            .filter(|r| text_matches(&query.name, &r.category))
            .cloned()
            .collect();
    }

    if let Some(year) = &query.birth_year {
        let exact: Vec<RaceResult> = matches
            .iter()
            .filter(|r| r.birth_year.as_deref() == Some(year.as_str()))
            .cloned()
            .collect();

        if !exact.is_empty() {
            // Strict filter, not a ranking boost.
            matches = exact;
        } else if let Some(first) = matches.first_mut() {
            // Document the unconfirmed year rather than silently lying.
            first.name = format!("{} (birth year {} not found)", first.name, year);
        }
    }

    dedupe(matches)
}

/// Collapse the same person appearing in multiple races. The key is
/// `name|club|birthYear` with missing fields as empty strings; this is a
/// heuristic, not identity resolution.
fn dedupe(results: Vec<RaceResult>) -> Vec<RaceResult> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();

    for result in results {
        let key = format!(
            "{}|{}|{}",
            result.name,
            result.club,
            result.birth_year.as_deref().unwrap_or("")
        );
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(result);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identifier;

    fn result(name: &str, club: &str, year: Option<&str>, race_id: &str) -> RaceResult {
        RaceResult {
            id: Identifier::Synthetic(format!("{}-{}", race_id, name)),
            position: "1".into(),
            name: name.into(),
            bib: "100".into(),
            club: club.into(),
            category: "M 35-39".into(),
            time: "1:23:45".into(),
            birth_year: year.map(str::to_string),
            race_id: race_id.into(),
            race_name: "Maraþon".into(),
        }
    }

    #[test]
    fn test_parse_query_bare_year() {
        let q = parse_query("Jón Jónsson 1988");
        assert_eq!(q.name, "Jón Jónsson");
        assert_eq!(q.birth_year.as_deref(), Some("1988"));
    }

    #[test]
    fn test_parse_query_parenthesized_year() {
        let q = parse_query("Jón Jónsson (1988)");
        assert_eq!(q.name, "Jón Jónsson");
        assert_eq!(q.birth_year.as_deref(), Some("1988"));
    }

    #[test]
    fn test_parse_query_without_year() {
        let q = parse_query("  Jón   Jónsson ");
        assert_eq!(q.name, "Jón Jónsson");
        assert_eq!(q.birth_year, None);
    }

    #[test]
    fn test_fold_icelandic() {
        assert_eq!(fold_icelandic("Þórður Guðmundsson"), "thordur gudmundsson");
        assert_eq!(fold_icelandic("Ægir Örn"), "aegir orn");
    }

    #[test]
    fn test_match_folded_and_raw() {
        let candidates = vec![result("Þórður Guðmundsson", "ÍR", None, "r1")];
        // Folded query matches the folded candidate.
        assert_eq!(search(&candidates, "thordur").len(), 1);
        // Raw accented query matches raw-lowercased.
        assert_eq!(search(&candidates, "Þórður").len(), 1);
        assert!(search(&candidates, "nobody").is_empty());
    }

    #[test]
    fn test_year_is_strict_filter() {
        let candidates = vec![
            result("Jón Jónsson", "ÍR", Some("1988"), "r1"),
            result("Jón Jónsson", "FH", Some("1971"), "r1"),
        ];
        let found = search(&candidates, "Jón Jónsson 1988");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].birth_year.as_deref(), Some("1988"));
        assert_eq!(found[0].club, "ÍR");
    }

    #[test]
    fn test_unmatched_year_annotates_first_name_match() {
        let candidates = vec![result("Anna Brá", "Breiðablik", Some("1990"), "r1")];
        let found = search(&candidates, "Anna 1999");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Anna Brá (birth year 1999 not found)");
    }

    #[test]
    fn test_category_is_secondary_fallback_only() {
        let mut by_category = result("Einar Einarsson", "UMFK", None, "r1");
        by_category.category = "Öldungar".into();
        let candidates = vec![
            result("Öldunga Jóna", "ÍR", None, "r1"),
            by_category,
        ];
        // A name match suppresses the category pass entirely.
        let found = search(&candidates, "öldunga");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Öldunga Jóna");

        // With no name match, the category pass kicks in.
        let found = search(&candidates, "Öldungar");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Einar Einarsson");
    }

    #[test]
    fn test_dedup_across_races_keeps_first() {
        let candidates = vec![
            result("Jón Jónsson", "ÍR", Some("1988"), "r1"),
            result("Jón Jónsson", "ÍR", Some("1988"), "r2"),
            result("Jón Jónsson", "FH", Some("1988"), "r3"),
        ];
        let found = search(&candidates, "Jón Jónsson");
        // Same club+year collapses; a club change splits (known heuristic).
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].race_id, "r1");
    }

    #[test]
    fn test_search_is_idempotent() {
        let candidates = vec![
            result("Jón Jónsson", "ÍR", Some("1988"), "r1"),
            result("Jón Jónsson", "ÍR", Some("1988"), "r2"),
        ];
        let a = search(&candidates, "jón");
        let b = search(&candidates, "jón");
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].race_id, b[0].race_id);
    }

    #[test]
    fn test_missing_fields_dedupe_as_empty() {
        let candidates = vec![
            result("Stakur Maður", "", None, "r1"),
            result("Stakur Maður", "", None, "r2"),
        ];
        assert_eq!(search(&candidates, "stakur").len(), 1);
    }
}
