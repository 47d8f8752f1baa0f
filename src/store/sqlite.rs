use super::*;

pub const DB_SCHEMA_VERSION: &str = "1.0.0";

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    let connection =
        Connection::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    configure_connection(&connection)?;
    Ok(connection)
}

const SCHEMA: &str = "
    DROP TABLE IF EXISTS metadata;
    DROP TABLE IF EXISTS tracks;
    DROP TABLE IF EXISTS runs;
    DROP TABLE IF EXISTS participants;
    DROP TABLE IF EXISTS publications;
    DROP TABLE IF EXISTS datasets;
    DROP TABLE IF EXISTS results;

    CREATE TABLE metadata (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    CREATE TABLE tracks (
      trec TEXT NOT NULL,
      track TEXT NOT NULL,
      fullname TEXT,
      description TEXT,
      coordinators TEXT,
      tasks TEXT,
      webpage TEXT
    );

    CREATE TABLE runs (
      trec TEXT NOT NULL,
      track TEXT NOT NULL,
      runid TEXT NOT NULL,
      pid TEXT NOT NULL,
      year INTEGER NOT NULL,
      type TEXT,
      fields TEXT,
      task TEXT,
      date TEXT,
      judge TEXT,
      description TEXT,
      md5 TEXT,
      input_url TEXT,
      summary_url TEXT,
      appendix_url TEXT,
      other TEXT
    );

    CREATE TABLE participants (
      trec TEXT NOT NULL,
      pid TEXT NOT NULL,
      organization TEXT,
      name TEXT
    );

    CREATE TABLE publications (
      trec TEXT NOT NULL,
      track TEXT NOT NULL,
      key TEXT NOT NULL,
      pid TEXT NOT NULL,
      title TEXT,
      author TEXT,
      abstract TEXT,
      url TEXT,
      biburl TEXT,
      bibtex TEXT,
      doi TEXT
    );

    CREATE TABLE datasets (
      trec TEXT NOT NULL,
      track TEXT NOT NULL,
      corpus TEXT,
      topics TEXT,
      qrels TEXT,
      ir_datasets TEXT,
      trec_webpage TEXT,
      other TEXT
    );

    CREATE TABLE results (
      trec TEXT NOT NULL,
      track TEXT NOT NULL,
      runid TEXT NOT NULL,
      eval TEXT NOT NULL,
      topic TEXT NOT NULL,
      measure TEXT NOT NULL,
      score TEXT
    );

    CREATE INDEX idx_runs_track ON runs(trec, track);
    CREATE INDEX idx_results_run ON results(trec, track, runid);
";

fn link_text(link: Option<&Link>) -> Option<String> {
    link.map(Link::to_text)
}

fn map_text(map: Option<&BTreeMap<String, String>>) -> Result<Option<String>> {
    map.filter(|entries| !entries.is_empty())
        .map(serde_json::to_string)
        .transpose()
        .context("failed to serialize map column")
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Rebuilds every table from scratch inside one transaction.
pub fn write_tables(
    connection: &mut Connection,
    tables: &Tables,
    metadata: &[(&str, String)],
) -> Result<()> {
    let tx = connection
        .transaction()
        .context("failed to start table rebuild transaction")?;
    tx.execute_batch(SCHEMA).context("failed to recreate schema")?;

    {
        let mut stmt = tx.prepare("INSERT INTO metadata(key, value) VALUES (?1, ?2)")?;
        for (key, value) in metadata {
            stmt.execute(params![key, value])
                .with_context(|| format!("failed to write metadata {key}"))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO tracks(trec, track, fullname, description, coordinators, tasks, webpage)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for track in &tables.tracks {
            stmt.execute(params![
                track.trec,
                track.track,
                track.fullname,
                track.description,
                track.coordinators,
                map_text(track.tasks.as_ref())?,
                track.webpage,
            ])
            .with_context(|| format!("failed to insert track {}/{}", track.trec, track.track))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO runs(trec, track, runid, pid, year, type, fields, task, date, judge,
                              description, md5, input_url, summary_url, appendix_url, other)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        )?;
        for run in &tables.runs {
            stmt.execute(params![
                run.trec,
                run.track,
                run.runid,
                run.pid,
                run.year,
                run.run_type,
                run.fields,
                run.task,
                run.date,
                run.judge,
                run.description,
                run.md5,
                link_text(run.input_url.as_ref()),
                link_text(run.summary_url.as_ref()),
                link_text(run.appendix_url.as_ref()),
                map_text(run.other.as_ref())?,
            ])
            .with_context(|| format!("failed to insert run {}/{}/{}", run.trec, run.track, run.runid))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO participants(trec, pid, organization, name) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for participant in &tables.participants {
            stmt.execute(params![
                participant.trec,
                participant.pid,
                participant.organization,
                participant.name,
            ])
            .with_context(|| format!("failed to insert participant {}/{}", participant.trec, participant.pid))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO publications(trec, track, key, pid, title, author, abstract, url, biburl, bibtex, doi)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for publication in &tables.publications {
            stmt.execute(params![
                publication.trec,
                publication.track,
                publication.key,
                publication.pid,
                publication.title,
                publication.author,
                publication.abstract_text,
                publication.url,
                publication.biburl,
                publication.bibtex,
                publication.doi,
            ])
            .with_context(|| format!("failed to insert publication {}", publication.key))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO datasets(trec, track, corpus, topics, qrels, ir_datasets, trec_webpage, other)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for dataset in &tables.datasets {
            stmt.execute(params![
                dataset.trec,
                dataset.track,
                link_text(dataset.corpus.as_ref()),
                link_text(dataset.topics.as_ref()),
                link_text(dataset.qrels.as_ref()),
                link_text(dataset.ir_datasets.as_ref()),
                link_text(dataset.trec_webpage.as_ref()),
                link_text(dataset.other.as_ref()),
            ])
            .with_context(|| format!("failed to insert dataset {}/{}", dataset.trec, dataset.track))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO results(trec, track, runid, eval, topic, measure, score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in &tables.results {
            stmt.execute(params![
                row.trec, row.track, row.runid, row.eval, row.topic, row.measure, row.score,
            ])
            .with_context(|| format!("failed to insert result for {}/{}", row.trec, row.runid))?;
        }
    }

    tx.commit().context("failed to commit table rebuild")?;
    let counts = tables.counts();
    info!(
        tracks = counts.tracks,
        runs = counts.runs,
        participants = counts.participants,
        publications = counts.publications,
        datasets = counts.datasets,
        results = counts.results,
        "wrote sqlite tables"
    );
    Ok(())
}

fn text(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<String>> {
    row.get::<_, Option<String>>(column).map(blank_to_none)
}

fn link(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<Link>> {
    Ok(text(row, column)?.and_then(|value| Link::from_text(&value)))
}

fn string_map(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<BTreeMap<String, String>>> {
    Ok(text(row, column)?
        .and_then(|value| serde_json::from_str::<BTreeMap<String, String>>(&value).ok())
        .filter(|entries| !entries.is_empty()))
}

fn load<T>(
    connection: &Connection,
    sql: &str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = connection
        .prepare(sql)
        .with_context(|| format!("failed to prepare: {sql}"))?;
    let rows = stmt
        .query_map([], map)
        .with_context(|| format!("failed to query: {sql}"))?
        .collect::<rusqlite::Result<Vec<T>>>()
        .with_context(|| format!("failed to read rows: {sql}"))?;
    Ok(rows)
}

pub fn read_tables(connection: &Connection) -> Result<Tables> {
    let tracks = load(connection, "SELECT * FROM tracks", |row| {
        Ok(Track {
            trec: row.get("trec")?,
            track: row.get("track")?,
            fullname: text(row, "fullname")?,
            description: text(row, "description")?,
            coordinators: text(row, "coordinators")?,
            tasks: string_map(row, "tasks")?,
            webpage: text(row, "webpage")?,
        })
    })?;

    let runs = load(connection, "SELECT * FROM runs", |row| {
        Ok(Run {
            trec: row.get("trec")?,
            track: row.get("track")?,
            runid: row.get("runid")?,
            pid: row.get("pid")?,
            year: row.get("year")?,
            run_type: text(row, "type")?,
            fields: text(row, "fields")?,
            task: text(row, "task")?,
            date: text(row, "date")?,
            judge: text(row, "judge")?,
            description: text(row, "description")?,
            md5: text(row, "md5")?,
            input_url: link(row, "input_url")?,
            summary_url: link(row, "summary_url")?,
            appendix_url: link(row, "appendix_url")?,
            other: string_map(row, "other")?,
        })
    })?;

    let participants = load(connection, "SELECT * FROM participants", |row| {
        Ok(Participant {
            trec: row.get("trec")?,
            pid: row.get("pid")?,
            organization: text(row, "organization")?,
            name: text(row, "name")?,
        })
    })?;

    let publications = load(connection, "SELECT * FROM publications", |row| {
        Ok(Publication {
            trec: row.get("trec")?,
            track: row.get("track")?,
            key: row.get("key")?,
            pid: row.get("pid")?,
            title: text(row, "title")?,
            author: text(row, "author")?,
            abstract_text: text(row, "abstract")?,
            url: text(row, "url")?,
            biburl: text(row, "biburl")?,
            bibtex: text(row, "bibtex")?,
            doi: text(row, "doi")?,
        })
    })?;

    let datasets = load(connection, "SELECT * FROM datasets", |row| {
        Ok(Dataset {
            trec: row.get("trec")?,
            track: row.get("track")?,
            corpus: link(row, "corpus")?,
            topics: link(row, "topics")?,
            qrels: link(row, "qrels")?,
            ir_datasets: link(row, "ir_datasets")?,
            trec_webpage: link(row, "trec_webpage")?,
            other: link(row, "other")?,
        })
    })?;

    let results = load(connection, "SELECT * FROM results", |row| {
        Ok(ResultRow {
            trec: row.get("trec")?,
            track: row.get("track")?,
            runid: row.get("runid")?,
            eval: row.get("eval")?,
            topic: row.get("topic")?,
            measure: row.get("measure")?,
            score: row.get::<_, Option<String>>("score")?.unwrap_or_default(),
        })
    })?;

    let mut tables = Tables {
        tracks,
        runs,
        participants,
        publications,
        datasets,
        results,
    };
    tables.normalize();
    Ok(tables)
}

pub fn read_metadata(connection: &Connection, key: &str) -> Result<Option<String>> {
    connection
        .query_row("SELECT value FROM metadata WHERE key = ?1", params![key], |row| row.get(0))
        .optional()
        .with_context(|| format!("failed to read metadata {key}"))
}

pub fn query_count(connection: &Connection, sql: &str) -> Result<i64> {
    connection
        .query_row(sql, [], |row| row.get::<_, i64>(0))
        .with_context(|| format!("failed query: {sql}"))
}
