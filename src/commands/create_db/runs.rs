use super::*;

/// A run that made it through the rule engine, with the warnings raised on the way.
#[derive(Debug, Clone)]
pub(super) struct AssembledRun {
    pub(super) run: Run,
    pub(super) warnings: Vec<String>,
}

/// Applies the per-edition rule books to parsed `runs_table` records.
pub(super) struct RunAssembler<'a> {
    books: &'a RuleBooks,
    md5_pattern: Regex,
}

impl<'a> RunAssembler<'a> {
    pub(super) fn new(books: &'a RuleBooks) -> Result<Self> {
        Ok(Self {
            books,
            md5_pattern: Regex::new(r"[a-fA-F\d]{32}").context("invalid md5 regex")?,
        })
    }

    /// Runs the full correction pipeline. An error means the record is skipped.
    pub(super) fn assemble(&self, mut record: Record) -> Result<AssembledRun> {
        let fields = &self.books.fields;

        fields.rename_track(&mut record);
        fields
            .apply_pre_assignments(&mut record)
            .context("failed to reassign fields")?;
        fields
            .assemble_description(&mut record)
            .context("failed to assemble description")?;
        self.check_md5(&mut record);

        let input_url = self
            .books
            .input
            .resolve(&record)
            .context("failed to derive input url")?;
        let summary_url = self
            .books
            .summary
            .resolve(&record)
            .context("failed to derive summary url")?;
        let appendix_url = self
            .books
            .appendix
            .resolve(&record)
            .context("failed to derive appendix url")?;

        let other = self.books.other.assemble(&record);

        fields
            .apply_post_assignments(&mut record)
            .context("failed to correct fields")?;

        let catalog = &self.books.catalog;
        let task = non_empty(record.value_str("task")).filter(|task| !catalog.is_ignored_task(task));
        let run_type =
            non_empty(record.value_str("type")).filter(|kind| catalog.is_known_run_type(kind));

        let run = Run {
            task,
            run_type,
            input_url,
            summary_url,
            appendix_url,
            other: other.bag,
            ..base_run(&record)?
        };

        Ok(AssembledRun {
            run,
            warnings: other.warnings,
        })
    }

    /// TREC-COVID rounds: no summary, task or `other` derivation and no type filter.
    pub(super) fn assemble_covid(&self, mut record: Record, round: &str) -> Result<AssembledRun> {
        record.set("track", round.to_string());
        self.books
            .fields
            .assemble_description(&mut record)
            .context("failed to assemble description")?;
        self.check_md5(&mut record);

        let input_url = self
            .books
            .input
            .resolve(&record)
            .context("failed to derive input url")?;
        let appendix_url = self
            .books
            .appendix
            .resolve(&record)
            .context("failed to derive appendix url")?;

        let run = Run {
            run_type: non_empty(record.value_str("type")),
            input_url,
            appendix_url,
            ..base_run(&record)?
        };

        Ok(AssembledRun {
            run,
            warnings: Vec::new(),
        })
    }

    fn check_md5(&self, record: &mut Record) {
        let Some(md5) = record.value_str("md5") else {
            return;
        };
        if self.md5_pattern.find_iter(md5).count() != 1 {
            record.remove("md5");
        }
    }
}

fn required(record: &Record, field: &str) -> Result<String> {
    non_empty(record.value_str(field)).with_context(|| format!("record has no {field}"))
}

/// The run fields copied straight from the record; derived fields start empty.
fn base_run(record: &Record) -> Result<Run> {
    Ok(Run {
        trec: required(record, "trec")?,
        track: required(record, "track")?,
        runid: required(record, "runid")?,
        pid: required(record, "pid")?,
        year: record.year(),
        run_type: None,
        fields: non_empty(record.value_str("fields")),
        task: None,
        date: non_empty(record.value_str("date")),
        judge: non_empty(record.value_str("judge")),
        description: non_empty(record.value_str("description")),
        md5: non_empty(record.value_str("md5")),
        input_url: None,
        summary_url: None,
        appendix_url: None,
        other: None,
    })
}

/// Early participant tables shifted the contact columns; rebuilds the name.
pub(super) fn repair_contact_name(record: &mut Record) {
    let year = record.year();
    let (Some(name), Some(email)) = (
        non_empty(record.value_str("name")),
        non_empty(record.value_str("email")),
    ) else {
        return;
    };

    if (2006..2009).contains(&year) {
        record.set("name", email);
    } else if year < 2006 {
        record.set("name", format!("{name} {email}"));
    }
}

pub(super) fn participant_from_record(mut record: Record) -> Result<Participant> {
    repair_contact_name(&mut record);
    Ok(Participant {
        trec: required(&record, "trec")?,
        pid: required(&record, "pid")?,
        organization: non_empty(record.value_str("organization")),
        name: non_empty(record.value_str("name")),
    })
}

pub(super) fn covid_participant_from_record(record: &Record) -> Result<Participant> {
    Ok(Participant {
        trec: required(record, "trec")?,
        pid: required(record, "pid")?,
        organization: None,
        name: None,
    })
}

/// Keeps the first participant seen per (edition, pid).
pub(super) fn dedup_participants(participants: Vec<Participant>) -> Vec<Participant> {
    let mut seen = HashSet::new();
    participants
        .into_iter()
        .filter(|participant| seen.insert((participant.trec.clone(), participant.pid.clone())))
        .collect()
}
