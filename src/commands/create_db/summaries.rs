use super::*;

const SKIPPED_SUFFIXES: [&str; 11] = [
    ".tsv", ".csv", ".rbp", ".tar", ".gz", ".tgz", ".Z", ".pdf", ".eps", ".ps", ".DS_Store",
];

const MISINFO_MEASURES: [&str; 3] = ["P_10", "ndcg", "compatibility"];

/// Rows parsed from the summaries of one edition, plus the files that failed.
#[derive(Debug, Default)]
pub(super) struct SummaryHarvest {
    pub(super) rows: Vec<ResultRow>,
    pub(super) skipped_files: Vec<String>,
}

pub(super) fn is_parsed_summary_file(file_name: &str) -> bool {
    if SKIPPED_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
    {
        return false;
    }
    if file_name.contains("trec_eval(2)") {
        return false;
    }
    !file_name
        .split('.')
        .any(|segment| segment == "short" || segment == "long")
}

/// Directory holding a track's summaries; trec28 CAsT still lives under `converse`.
pub(super) fn summaries_dir(archive_root: &Path, trec: &str, track: &str) -> PathBuf {
    let dir_track = if trec == "trec28" && track == "cast" {
        "converse"
    } else {
        track
    };
    archive_root.join(trec).join(dir_track).join("summaries")
}

/// Parses every summary file of the edition's tracks. Tracks without
/// summaries, or with formats that are not parsed, are passed over.
pub(super) fn harvest_edition(
    books: &RuleBooks,
    archive_root: &Path,
    trec: &str,
    tracks: &[&str],
) -> SummaryHarvest {
    let mut harvest = SummaryHarvest::default();

    for track in tracks {
        if books.summary.is_absent_track(trec, track)
            || books.catalog.is_unparsed_summary_track(trec, track)
        {
            continue;
        }
        let dir = summaries_dir(archive_root, trec, track);
        if !dir.is_dir() {
            continue;
        }

        let walker = WalkDir::new(&dir).sort_by(|a, b| {
            a.file_name()
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.file_name().to_string_lossy().to_lowercase())
        });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(trec, track, error = %err, "failed to walk summaries directory");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_parsed_summary_file(&file_name) {
                continue;
            }

            let parsed = read_lossy_text(entry.path()).and_then(|text| {
                parse_summary_file(&books.catalog, trec, track, &file_name, &text)
            });
            match parsed {
                Ok(rows) => harvest.rows.extend(rows),
                Err(err) => {
                    warn!(trec, track, file = %file_name, error = %err, "skipping summary file");
                    harvest
                        .skipped_files
                        .push(format!("{trec}/{track}/{file_name}: {err}"));
                }
            }
        }
    }

    harvest
}

fn result_row(trec: &str, track: &str, runid: &str, eval: &str, measure: &str, score: &str) -> ResultRow {
    ResultRow {
        trec: trec.to_string(),
        track: track.to_string(),
        runid: runid.to_string(),
        eval: eval.to_string(),
        topic: "all".to_string(),
        measure: measure.to_string(),
        score: score.to_string(),
    }
}

/// Result rows for one evaluation block, closed by its `summary` row.
fn block_rows(
    trec: &str,
    track: &str,
    runid: &str,
    eval: &str,
    measures: &[Measure],
    separator: char,
) -> Vec<ResultRow> {
    let mut rows: Vec<ResultRow> = measures
        .iter()
        .map(|m| result_row(trec, track, runid, eval, &m.name, &m.score))
        .collect();
    let summary = summary_block(measures, separator);
    if !summary.is_empty() {
        rows.push(result_row(trec, track, runid, eval, "summary", &summary));
    }
    rows
}

/// Parses one summary file into result rows.
pub(super) fn parse_summary_file(
    catalog: &Catalog,
    trec: &str,
    track: &str,
    file_name: &str,
    text: &str,
) -> Result<Vec<ResultRow>> {
    let runid = catalog.strip_summary_affixes(file_name);
    let lines: Vec<&str> = text.lines().collect();

    if track == "misinfo" {
        let eval = catalog.eval_type(file_name, trec, track);
        return Ok(misinfo_rows(trec, track, &runid, &eval, &lines));
    }
    if is_session_track(track) {
        return session_rows(catalog, trec, track, file_name, &runid, &lines);
    }

    let eval = catalog.eval_type(file_name, trec, track);
    let input = SummaryInput {
        catalog,
        trec,
        track,
        eval: &eval,
        text,
        lines,
    };
    let measures = evaluation_measures(&input)?;
    Ok(block_rows(trec, track, &runid, &eval, &measures, '\t'))
}

/// Misinfo summaries qualify each measure by its qrels and keep the raw lines.
fn misinfo_rows(trec: &str, track: &str, runid: &str, eval: &str, lines: &[&str]) -> Vec<ResultRow> {
    let mut rows = Vec::new();
    let mut summary = String::new();

    for line in lines {
        let parts: Vec<&str> = line.split('\t').collect();
        let [_, qrels, name, topic, score] = parts.as_slice() else {
            continue;
        };
        let name = name.trim();
        if *topic != "all" || !MISINFO_MEASURES.contains(&name) {
            continue;
        }
        rows.push(result_row(trec, track, runid, eval, &format!("{name} ({qrels})"), score));
        summary.push('\t');
        summary.push_str(line);
        summary.push('\n');
    }

    if !summary.is_empty() {
        rows.push(result_row(trec, track, runid, eval, "summary", &summary));
    }
    rows
}

fn session_rows(
    catalog: &Catalog,
    trec: &str,
    track: &str,
    file_name: &str,
    runid: &str,
    lines: &[&str],
) -> Result<Vec<ResultRow>> {
    let mut rows = Vec::new();

    if trec == "trec20" {
        let subtopics = catalog.eval_type(file_name, trec, track);
        for line in lines {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if token(&parts, 1)? != "all" {
                continue;
            }
            let eval = format!("{} [{subtopics}]", token(&parts, 0)?.trim_matches('.'));
            let measures = [
                measure("err", 3, token(&parts, 2)?),
                measure("ndcg", 2, token(&parts, 6)?),
                measure("map", 3, token(&parts, 8)?),
            ];
            rows.extend(block_rows(trec, track, runid, &eval, &measures, ' '));
        }
        return Ok(rows);
    }

    let mut levels = None;
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if token(&parts, 0)? == "all" {
            levels = Some(session_levels(trec, &parts)?);
        }
    }
    let levels = levels.context("session summary has no all-topics line")?;

    for (level, measures) in levels {
        rows.extend(block_rows(trec, track, runid, &level, &measures, ' '));
    }
    Ok(rows)
}

/// Per-RL measures from a session `all` line: map, err, ndcg and P@k
/// columns, each block holding one column per level.
fn session_levels(trec: &str, parts: &[&str]) -> Result<Vec<(String, Vec<Measure>)>> {
    let (level_count, map_at, err_at, ndcg_at, pk_at) = if trec == "trec21" {
        (4, 1, 5, 13, 29)
    } else {
        (3, 1, 4, 10, 22)
    };

    let mut levels = Vec::with_capacity(level_count);
    for level in 0..level_count {
        levels.push((
            format!("RL{}", level + 1),
            vec![
                measure("map", 3, token(parts, map_at + level)?),
                measure("err", 3, token(parts, err_at + level)?),
                measure("ndcg", 2, token(parts, ndcg_at + level)?),
                measure("P_k", 3, token(parts, pk_at + level)?),
            ],
        ));
    }
    Ok(levels)
}
