use super::*;

const LEGACY_MARKERS: [&str; 5] = [
    "Queryid (Num):       all",
    "Queryid (Num):       39topics",
    "Queryid (Num):       43topics",
    "Queryid (Num):       45topics",
    "Queryid (Num):       50topics",
];

const LEGACY_BLOCK_LINES: usize = 31;

const GD_EVALS: [&str; 10] = [
    "gdeval",
    "risk-a0-gd",
    "risk-a1-gd",
    "risk-a5-gd",
    "risk-a10-gd",
    "risk-rm-a0-gd",
    "risk-terrier-a0-gd",
    "risk-rm-a5-gd",
    "risk-terrier-a5-gd",
    "std-gd",
];

const ND_EVALS: [&str; 10] = [
    "ndeval",
    "risk-a0-nd",
    "risk-a1-nd",
    "risk-a5-nd",
    "risk-a10-nd",
    "risk-rm-a0-nd",
    "risk-terrier-a0-nd",
    "risk-rm-a5-nd",
    "risk-terrier-a5-nd",
    "std-nd",
];

const EARLY_WEB_EDITIONS: [&str; 3] = ["trec10", "trec11", "trec12"];

/// One extracted aggregate score; `tabs` aligns it in the summary block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Measure {
    pub(super) name: String,
    pub(super) tabs: usize,
    pub(super) score: String,
}

pub(super) fn measure(name: impl Into<String>, tabs: usize, score: impl Into<String>) -> Measure {
    Measure {
        name: name.into(),
        tabs,
        score: score.into(),
    }
}

/// Renders `\t{measure}{tabs}all{separator}{score}\n` per measure.
pub(super) fn summary_block(measures: &[Measure], separator: char) -> String {
    measures
        .iter()
        .map(|m| format!("\t{}{}all{separator}{}\n", m.name, "\t".repeat(m.tabs), m.score))
        .collect()
}

pub(super) fn token<'a>(parts: &[&'a str], idx: usize) -> Result<&'a str> {
    parts
        .get(idx)
        .copied()
        .with_context(|| format!("line has no field {}", idx + 1))
}

fn line_at<'a>(lines: &[&'a str], idx: usize) -> Result<&'a str> {
    lines
        .get(idx)
        .copied()
        .with_context(|| format!("summary has no line {}", idx + 1))
}

fn value_after_colon(line: &str) -> Result<String> {
    let parts: Vec<&str> = line.trim().split(':').collect();
    Ok(token(&parts, 1)?.trim().to_string())
}

fn last_token(line: &str) -> Result<&str> {
    line.split_whitespace()
        .last()
        .context("summary line is blank")
}

/// A summary file's content with the context needed to pick its format.
pub(super) struct SummaryInput<'a> {
    pub(super) catalog: &'a Catalog,
    pub(super) trec: &'a str,
    pub(super) track: &'a str,
    pub(super) eval: &'a str,
    pub(super) text: &'a str,
    pub(super) lines: Vec<&'a str>,
}

/// Extracts the all-topics measures of a summary file in whichever
/// edition-specific layout applies, falling back to a trec_eval dump.
pub(super) fn evaluation_measures(input: &SummaryInput<'_>) -> Result<Vec<Measure>> {
    let SummaryInput {
        catalog,
        trec,
        track,
        eval,
        text,
        ..
    } = *input;
    let lines = input.lines.as_slice();
    let early_web = track == "web" && EARLY_WEB_EDITIONS.contains(&trec);

    if catalog.is_legacy_summary_track(trec, track) || (early_web && lines.len() > 308) {
        return legacy_report(lines);
    }

    if track == "web" {
        if early_web {
            return reciprocal_rank(lines);
        }
        if trec != "trec13" && eval != "trec_eval" {
            if GD_EVALS.contains(&eval) {
                let row = amean_row(text)?;
                return Ok(vec![
                    measure("err", 3, csv_value(&row, "err@20")?),
                    measure("ndcg", 2, csv_value(&row, "ndcg@20")?),
                ]);
            }
            if ND_EVALS.contains(&eval) {
                let row = amean_row(text)?;
                return Ok(vec![
                    measure("ERR-IA@10", 2, csv_value(&row, "ERR-IA@10")?),
                    measure("alpha-nDCG@10", 1, csv_value(&row, "alpha-nDCG@10")?),
                    measure("P-IA@10", 3, csv_value(&row, "P-IA@10")?),
                    measure("MAP-IA", 3, csv_value(&row, "MAP-IA")?),
                ]);
            }
        }
    }

    if track == "novelty" && ["trec11", "trec12", "trec13"].contains(&trec) {
        return novelty(trec, lines);
    }

    if track == "enterprise" && trec == "trec17" && eval != "expert" {
        return enterprise(lines);
    }

    if track == "task" && trec == "trec26" {
        let row = amean_row(text)?;
        return Ok(vec![
            measure("ERR-IA@10", 2, csv_value(&row, "ERR-IA@10")?),
            measure("alpha-nDCG@10", 1, csv_value(&row, "alpha-nDCG@10")?),
        ]);
    }
    if track == "task" && trec == "trec25" {
        return tasks_trec25(lines);
    }

    if track == "microblog" && eval != "adhoc" {
        if trec == "trec23" {
            return microblog_trec23(lines);
        }
        if trec == "trec24" {
            if let Some(found) = microblog_trec24(lines) {
                return Ok(found);
            }
        }
    }

    if track == "hp" && (trec == "trec6" || trec == "trec7") {
        return high_precision(trec, lines);
    }

    if track == "genomics" {
        if trec == "trec14" && lines.len() < 13 {
            return Ok(genomics_trec14(lines));
        }
        if trec == "trec15" || trec == "trec16" {
            return genomics_map(lines);
        }
    }

    trec_eval_dump(lines, eval, catalog.measures_for(eval))
}

fn legacy_report(lines: &[&str]) -> Result<Vec<Measure>> {
    let mut block = Vec::new();
    let mut remaining = 0;
    for line in lines {
        if LEGACY_MARKERS.iter().any(|marker| line.contains(marker)) {
            remaining = LEGACY_BLOCK_LINES;
        }
        if remaining > 0 {
            block.push(*line);
            remaining -= 1;
        }
    }

    Ok(vec![
        measure("P_10", 2, value_after_colon(line_at(&block, 22)?)?),
        measure("P_100", 2, value_after_colon(line_at(&block, 25)?)?),
        measure("P_1000", 2, value_after_colon(line_at(&block, 28)?)?),
        measure("Rprec", 2, value_after_colon(line_at(&block, 30)?)?),
        measure("map", 3, line_at(&block, 18)?.trim()),
    ])
}

fn reciprocal_rank(lines: &[&str]) -> Result<Vec<Measure>> {
    let mrr = lines
        .iter()
        .filter(|line| line.contains("reciprocal rank"))
        .filter_map(|line| line.split(':').next_back())
        .last()
        .context("summary has no reciprocal rank line")?;
    Ok(vec![measure("mrr", 3, mrr.trim())])
}

/// Splits one CSV line, honoring double-quoted cells.
pub(super) fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

/// The `amean` row of a per-topic CSV evaluation, keyed by header.
fn amean_row(text: &str) -> Result<HashMap<String, String>> {
    let mut rows = text.lines().filter(|line| !line.trim().is_empty());
    let header = split_csv_line(rows.next().context("csv summary is empty")?);
    let topic = header
        .iter()
        .position(|column| column == "topic")
        .context("csv summary has no topic column")?;

    for row in rows {
        let cells = split_csv_line(row);
        if cells.get(topic).map(String::as_str) == Some("amean") {
            return Ok(header.into_iter().zip(cells).collect());
        }
    }
    bail!("csv summary has no amean row")
}

fn csv_value(row: &HashMap<String, String>, column: &str) -> Result<String> {
    row.get(column)
        .cloned()
        .with_context(|| format!("csv summary has no {column} column"))
}

fn novelty(trec: &str, lines: &[&str]) -> Result<Vec<Measure>> {
    let at = |idx: usize| -> Result<String> { value_after_colon(line_at(lines, idx)?) };

    let (relevant, new) = match trec {
        "trec11" => (Some(56), 170),
        _ if lines.len() > 64 => (Some(57), 119),
        _ => (None, 57),
    };

    let mut measures = Vec::new();
    if let Some(start) = relevant {
        measures.push(measure("Precision (relevant sentences)", 2, at(start)?));
        measures.push(measure("Recall (relevant sentences)", 3, at(start + 1)?));
        measures.push(measure("F-score (relevant sentences)", 2, at(start + 2)?));
    }
    measures.push(measure("Precision (new sentences)", 3, at(new)?));
    measures.push(measure("Recall (new sentences)", 4, at(new + 1)?));
    measures.push(measure("F-score (new sentences)", 4, at(new + 2)?));
    Ok(measures)
}

fn enterprise(lines: &[&str]) -> Result<Vec<Measure>> {
    let mut inf_ndcg = None;
    let mut inf_ap = None;
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() > 2 && parts[1] == "all" {
            match parts[0] {
                "infNDCG" => inf_ndcg = Some(parts[2]),
                "infAP" => inf_ap = Some(parts[2]),
                _ => {}
            }
        }
    }

    Ok(vec![
        measure("infNDCG", 2, inf_ndcg.context("summary has no infNDCG line")?),
        measure("infAP", 2, inf_ap.context("summary has no infAP line")?),
    ])
}

fn tasks_trec25(lines: &[&str]) -> Result<Vec<Measure>> {
    let mut err = None;
    let mut alpha_ndcg = None;
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let name = token(&parts, 0)?;
        let topic = token(&parts, 1)?;
        if topic != "all" {
            continue;
        }
        match name {
            "ERR-IA@10" => err = Some(token(&parts, 2)?),
            "alpha-nDCG@10" => alpha_ndcg = Some(token(&parts, 2)?),
            _ => {}
        }
    }

    Ok(vec![
        measure("ERR-IA@10", 2, err.context("summary has no ERR-IA@10 line")?),
        measure(
            "alpha-nDCG@10",
            1,
            alpha_ndcg.context("summary has no alpha-nDCG@10 line")?,
        ),
    ])
}

fn microblog_trec23(lines: &[&str]) -> Result<Vec<Measure>> {
    let mut found = None;
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if token(&parts, 1)? == "all" {
            found = Some(vec![
                measure("unweighted_recall", 2, token(&parts, 2)?),
                measure("weighted_recall", 3, token(&parts, 3)?),
                measure("precision", 4, token(&parts, 4)?),
            ]);
        }
    }
    found.context("summary has no all-topics line")
}

fn microblog_trec24(lines: &[&str]) -> Option<Vec<Measure>> {
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [_, "all", ndcg] => return Some(vec![measure("nDCG", 2, *ndcg)]),
            [_, "all", elg, ncg] => {
                return Some(vec![measure("ELG", 2, *elg), measure("nCG", 2, *ncg)]);
            }
            _ => {}
        }
    }
    None
}

fn high_precision(trec: &str, lines: &[&str]) -> Result<Vec<Measure>> {
    let (marker, cutoff) = if trec == "trec6" {
        ("Queryid (Num):\tall", 10)
    } else {
        ("Queryid (Num):       all", 15)
    };
    let idx = lines
        .iter()
        .position(|line| line.contains(marker))
        .unwrap_or(lines.len());

    Ok(vec![
        measure(format!("Precision@{cutoff}"), 4, last_token(line_at(lines, idx + 5)?)?),
        measure(
            format!("Relative Precision@{cutoff}"),
            2,
            last_token(line_at(lines, idx + 6)?)?,
        ),
        measure(
            format!("Unranked Avg. Precision@{cutoff}"),
            1,
            last_token(line_at(lines, idx + 7)?)?,
        ),
    ])
}

fn genomics_trec14(lines: &[&str]) -> Vec<Measure> {
    lines
        .iter()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["Precision:", score, ..] => Some(measure("Precision", 1, *score)),
                ["Recall:", score, ..] => Some(measure("Recall", 2, *score)),
                ["F-score:", score, ..] => Some(measure("F-score", 2, *score)),
                _ => None,
            }
        })
        .collect()
}

fn genomics_map(lines: &[&str]) -> Result<Vec<Measure>> {
    let mut measures = Vec::new();
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if token(&parts, 2)? == "MAP" {
            measures.push(measure(
                format!("MAP ({})", token(&parts, 1)?),
                2,
                token(&parts, 3)?,
            ));
        }
    }
    Ok(measures)
}

fn trec_eval_tabs(name: &str) -> usize {
    match name {
        "map" => 4,
        "recip_rank" | "ndcg_cut_10" | "recall_10" | "recall_100" | "recall_1000" => 2,
        "ndcg_cut_100" | "ndcg_cut_1000" => 1,
        _ => 3,
    }
}

/// `measure<TAB>topic<TAB>score` lines (whitespace-separated for sample_eval).
fn trec_eval_dump(lines: &[&str], eval: &str, allowed: &[String]) -> Result<Vec<Measure>> {
    let mut measures = Vec::new();
    for line in lines {
        let parts: Vec<&str> = if eval == "sample-eval" {
            line.split_whitespace().collect()
        } else {
            line.split('\t').collect()
        };
        if parts.len() < 2 {
            continue;
        }

        let name = match parts[0].trim() {
            "P10" => "P_10",
            "P100" => "P_100",
            "P1000" => "P_1000",
            other => other,
        };
        let score = token(&parts, 2)?;
        if parts[1] == "all" && allowed.iter().any(|allowed| allowed == name) {
            measures.push(measure(name, trec_eval_tabs(name), score));
        }
    }
    Ok(measures)
}
