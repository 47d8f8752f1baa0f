//! Naming conventions of the TREC archive shared by the assembler and the page builder.

pub const COVID_EDITION: &str = "trec-covid";
pub const OVERVIEW_PID: &str = "overview";
pub const RESULTS_BASE_URL: &str = "https://trec.nist.gov/results";
pub const PUBS_BASE_URL: &str = "https://trec.nist.gov/pubs";
pub const FIRST_EDITION_YEAR: i32 = 1992;

pub fn is_covid_edition(trec: &str) -> bool {
    trec == COVID_EDITION
}

/// Numeric part of `trecN`.
pub fn edition_number(trec: &str) -> Option<u32> {
    trec.strip_prefix("trec")?.parse().ok()
}

pub fn edition_year(trec: &str) -> Option<i32> {
    if is_covid_edition(trec) {
        return Some(2020);
    }
    edition_number(trec).map(|number| FIRST_EDITION_YEAR - 1 + number as i32)
}

pub fn edition_label(trec: &str) -> String {
    if is_covid_edition(trec) {
        return "TREC-COVID".to_string();
    }
    match (edition_number(trec), edition_year(trec)) {
        (Some(number), Some(year)) => format!("TREC-{number} ({year})"),
        _ => trec.to_string(),
    }
}

/// Newest edition first; TREC-COVID sorts by its 2020 year.
pub fn edition_order(a: &str, b: &str) -> std::cmp::Ordering {
    let year_a = edition_year(a).unwrap_or(i32::MIN);
    let year_b = edition_year(b).unwrap_or(i32::MIN);
    year_b.cmp(&year_a).then_with(|| a.cmp(b))
}

pub fn is_overview_paper(pid: &str) -> bool {
    pid == OVERVIEW_PID
}

pub fn is_session_track(track: &str) -> bool {
    track == "session"
}

/// `.RL1`..`.RL4` session variants collapse into one logical run.
pub fn session_logical_run_id(runid: &str) -> &str {
    match runid.rsplit_once('.') {
        Some((stem, level))
            if level.len() > 2
                && level.starts_with("RL")
                && level[2..].chars().all(|c| c.is_ascii_digit()) =>
        {
            stem
        }
        _ => runid,
    }
}

/// Run id used to join a run with its parsed results.
pub fn results_run_id<'a>(track: &str, runid: &'a str) -> &'a str {
    if is_session_track(track) {
        session_logical_run_id(runid)
    } else {
        runid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edition_years_follow_numbering() {
        assert_eq!(edition_year("trec1"), Some(1992));
        assert_eq!(edition_year("trec33"), Some(2024));
        assert_eq!(edition_year("trec-covid"), Some(2020));
        assert_eq!(edition_year("notes"), None);
    }

    #[test]
    fn edition_labels_include_year() {
        assert_eq!(edition_label("trec7"), "TREC-7 (1998)");
        assert_eq!(edition_label("trec-covid"), "TREC-COVID");
    }

    #[test]
    fn edition_order_is_newest_first() {
        let mut editions = vec!["trec2", "trec-covid", "trec30", "trec29"];
        editions.sort_by(|a, b| edition_order(a, b));
        assert_eq!(editions, vec!["trec30", "trec-covid", "trec29", "trec2"]);
    }

    #[test]
    fn session_levels_collapse() {
        assert_eq!(session_logical_run_id("CWIrun.RL3"), "CWIrun");
        assert_eq!(session_logical_run_id("uog.run.RL1"), "uog.run");
        assert_eq!(session_logical_run_id("plain"), "plain");
        assert_eq!(session_logical_run_id("run.v2"), "run.v2");
        assert_eq!(results_run_id("web", "CWIrun.RL3"), "CWIrun.RL3");
    }
}
