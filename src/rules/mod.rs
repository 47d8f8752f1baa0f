//! Data-driven per-edition rules: artifact naming, field corrections and the
//! free-form `other` bag. The rule books are compiled into the binary.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::conventions::edition_year;

mod artifacts;
mod catalog;
mod fields;
mod matcher;
mod other;
mod template;

pub use artifacts::ArtifactBook;
pub use catalog::{Catalog, PageCatalog, contains_pair};
pub use fields::FieldBook;
pub use matcher::RuleMatch;
pub use other::OtherBook;
pub use template::{RecordView, Template, TemplateError};

const CATALOG_JSON: &str = include_str!("../../rules/catalog.json");
const INPUT_JSON: &str = include_str!("../../rules/input.json");
const SUMMARY_JSON: &str = include_str!("../../rules/summary.json");
const APPENDIX_JSON: &str = include_str!("../../rules/appendix.json");
const FIELDS_JSON: &str = include_str!("../../rules/fields.json");
const OTHER_JSON: &str = include_str!("../../rules/other.json");

#[derive(Debug, Clone)]
pub struct RuleBooks {
    pub catalog: Catalog,
    pub input: ArtifactBook,
    pub summary: ArtifactBook,
    pub appendix: ArtifactBook,
    pub fields: FieldBook,
    pub other: OtherBook,
}

impl RuleBooks {
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            catalog: parse_book("catalog.json", CATALOG_JSON)?,
            input: parse_book("input.json", INPUT_JSON)?,
            summary: parse_book("summary.json", SUMMARY_JSON)?,
            appendix: parse_book("appendix.json", APPENDIX_JSON)?,
            fields: parse_book("fields.json", FIELDS_JSON)?,
            other: parse_book("other.json", OTHER_JSON)?,
        })
    }
}

/// Only the page-builder lists, for stages that never touch run records.
pub fn embedded_page_catalog() -> Result<PageCatalog> {
    let catalog: Catalog = parse_book("catalog.json", CATALOG_JSON)?;
    Ok(catalog.pages)
}

fn parse_book<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("failed to parse rule book {name}"))
}

/// A parsed table row: named attributes plus `trec` and `year`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(trec: &str) -> Self {
        let mut record = Self::default();
        record.set("trec", trec.to_string());
        if let Some(year) = edition_year(trec) {
            record.set("year", year.to_string());
        }
        record
    }

    pub fn with_fields<I, K, V>(trec: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new(trec);
        for (key, value) in fields {
            record.fields.insert(key.into(), value.into());
        }
        record
    }

    pub fn set(&mut self, field: &str, value: String) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    pub fn value_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn year(&self) -> i32 {
        self.value_str("year")
            .and_then(|year| year.parse().ok())
            .unwrap_or_default()
    }
}

impl RecordView for Record {
    fn value(&self, field: &str) -> Option<&str> {
        self.value_str(field)
    }
}
