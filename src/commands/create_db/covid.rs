use super::*;

pub(super) const COVID_ROUNDS: usize = 5;

pub(super) fn covid_round(round: usize) -> String {
    format!("round{round}")
}

pub(super) fn covid_runs_table(archive_root: &Path, round: &str) -> PathBuf {
    archive_root
        .join(COVID_EDITION)
        .join(round)
        .join("reports")
        .join("runs_table")
}

const ROUND1_FILES: &[(&str, &str)] = &[
    ("means-bpref", "bpref"),
    ("means-map", "map"),
    ("means-ndcg", "ndcg"),
    ("means-P5", "P_5"),
];

const ROUND2_FILES: &[(&str, &str)] = &[
    ("means-bpref", "bpref"),
    ("means-map", "map"),
    ("means-ndcg", "ndcg"),
    ("means-P5", "P_5"),
    ("means-rbp_p5", "rbp_p5"),
];

const ROUND4_FILES: &[(&str, &str)] = &[
    ("mean-bpref", "bpref"),
    ("mean-map", "map"),
    ("mean-ndcg20", "ndcg_20"),
    ("mean-P20", "P_20"),
    ("mean-rbp_p5", "rbp_p5"),
];

/// Per-measure files of a round, as (file name, measure).
fn round_measure_files(round: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match round {
        "round1" => Some(ROUND1_FILES),
        "round2" | "round3" => Some(ROUND2_FILES),
        "round4" | "round5" => Some(ROUND4_FILES),
        _ => None,
    }
}

/// `runid score` lines in file order.
pub(super) fn parse_means(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            Some((parts.next()?.to_string(), parts.next()?.to_string()))
        })
        .collect()
}

/// Joins the per-measure columns of a round on run id. Only runs scored in
/// every file are kept, in the order of the first file.
pub(super) fn join_round_means(columns: &[(&str, Vec<(String, String)>)]) -> Vec<(String, Vec<Measure>)> {
    let Some(((_, first), rest)) = columns.split_first() else {
        return Vec::new();
    };
    let lookups: Vec<(&str, HashMap<&str, &str>)> = rest
        .iter()
        .map(|(name, values)| {
            (
                *name,
                values
                    .iter()
                    .map(|(runid, score)| (runid.as_str(), score.as_str()))
                    .collect(),
            )
        })
        .collect();
    let first_name = columns[0].0;

    first
        .iter()
        .filter_map(|(runid, score)| {
            let mut measures = vec![measure(first_name, covid_tabs(first_name), score.as_str())];
            for (name, lookup) in &lookups {
                measures.push(measure(*name, covid_tabs(name), *lookup.get(runid.as_str())?));
            }
            Some((runid.clone(), measures))
        })
        .collect()
}

fn covid_tabs(name: &str) -> usize {
    if name == "map" || name == "P_5" { 3 } else { 2 }
}

/// Result rows of one TREC-COVID round from its `eval/` directory.
pub(super) fn covid_round_results(archive_root: &Path, round: &str) -> Result<Vec<ResultRow>> {
    let files = round_measure_files(round)
        .with_context(|| format!("no evaluation layout for TREC-COVID {round}"))?;
    let eval_dir = archive_root.join(COVID_EDITION).join(round).join("eval");

    let mut columns = Vec::with_capacity(files.len());
    for (file, name) in files {
        let text = read_lossy_text(&eval_dir.join(file))?;
        columns.push((*name, parse_means(&text)));
    }

    let mut rows = Vec::new();
    for (runid, measures) in join_round_means(&columns) {
        for m in &measures {
            rows.push(ResultRow {
                trec: COVID_EDITION.to_string(),
                track: round.to_string(),
                runid: runid.clone(),
                eval: "trec_eval".to_string(),
                topic: "all".to_string(),
                measure: m.name.clone(),
                score: m.score.clone(),
            });
        }
        rows.push(ResultRow {
            trec: COVID_EDITION.to_string(),
            track: round.to_string(),
            runid,
            eval: "trec_eval".to_string(),
            topic: "all".to_string(),
            measure: "summary".to_string(),
            score: summary_block(&measures, '\t'),
        });
    }
    Ok(rows)
}
