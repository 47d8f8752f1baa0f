use super::*;

const RUN_FIELDS: [&str; 18] = [
    "runid",
    "pid",
    "email",
    "track",
    "type",
    "fields",
    "task",
    "date",
    "of_1",
    "of_2",
    "of_3",
    "judge",
    "merge",
    "of_4",
    "of_5",
    "description",
    "md5",
    "notes",
];

const PARTICIPANT_FIELDS: [&str; 14] = [
    "pid",
    "organization",
    "email",
    "name",
    "address",
    "phone",
    "fax",
    "track-interest",
    "date",
    "ad-form",
    "tipster-form",
    "trec-form-disk4",
    "trec-form-disk5",
    "notes",
];

const COVID_FIELDS: [&str; 13] = [
    "runid",
    "pid",
    "email",
    "task",
    "date",
    "type",
    "num",
    "judge",
    "of_4",
    "of_5",
    "description",
    "md5",
    "notes",
];

/// Positional layout of a colon-delimited archive table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TableSchema {
    Runs,
    Participants,
    CovidRuns,
    CovidParticipants,
}

impl TableSchema {
    pub(super) fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::Runs => &RUN_FIELDS,
            Self::Participants => &PARTICIPANT_FIELDS,
            Self::CovidRuns | Self::CovidParticipants => &COVID_FIELDS,
        }
    }

    pub(super) fn as_str(self) -> &'static str {
        match self {
            Self::Runs => "runs",
            Self::Participants => "participants",
            Self::CovidRuns => "covid-runs",
            Self::CovidParticipants => "covid-participants",
        }
    }
}

fn is_dropout(first_field: &str) -> bool {
    let lowered = first_field.to_ascii_lowercase();
    lowered.contains("dropout") || lowered.contains("drop-out")
}

/// Splits table text into records. Comment, blank, dropout, registration and
/// excluded-track lines are left out; fields past the schema are ignored.
pub(super) fn parse_table_text(
    text: &str,
    trec: &str,
    schema: TableSchema,
    catalog: &Catalog,
) -> Vec<Record> {
    let names = schema.field_names();
    let mut records = Vec::new();

    for line in text.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let values: Vec<&str> = line.split(':').collect();
        if is_dropout(values[0]) {
            continue;
        }

        let record = Record::with_fields(
            trec,
            names.iter().zip(values.iter()).map(|(name, value)| (*name, *value)),
        );
        if record.value_str("task") == Some("registration") {
            continue;
        }
        if record
            .value_str("track")
            .is_some_and(|track| catalog.is_excluded_track(track))
        {
            continue;
        }
        records.push(record);
    }

    records
}

pub(super) fn read_table(
    path: &Path,
    trec: &str,
    schema: TableSchema,
    catalog: &Catalog,
) -> Result<Vec<Record>> {
    let text = read_lossy_text(path)
        .with_context(|| format!("failed to read {} table for {trec}", schema.as_str()))?;
    Ok(parse_table_text(&text, trec, schema, catalog))
}
