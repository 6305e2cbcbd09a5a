//! Utilities for exporting data from the database
use anyhow::anyhow;
use clap::ValueEnum;
use serde::Serialize;
use table::TaskctlTable;
use tabled::{Table, Tabled};

pub(crate) mod rows;
pub(crate) mod table;

/// Data format for exporting data from the database
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    /// Human readable table of data
    #[default]
    Table,
    /// Comma-separated values for importing into a spreadsheet
    Csv,
    /// JSON-formatted objects
    Json,
    /// YAML-formatted objects
    Yaml,
}

/// Serialize a single object into the given data format
pub(crate) fn format_one<T>(item: T, fmt: OutputFormat) -> anyhow::Result<String>
where
    T: Tabled + Serialize + 'static,
{
    match fmt {
        OutputFormat::Table => {
            let tbuilder = Table::builder(vec![item]).index().column(0).transpose();
            Ok(format!("{}", tbuilder.build().styled()))
        }
        OutputFormat::Csv => Err(anyhow!("CSV format is not valid for single items")),
        OutputFormat::Json => serde_json::to_string(&item).map_err(|e| e.into()),
        OutputFormat::Yaml => serde_yaml::to_string(&item).map_err(|e| e.into()),
    }
}

/// Serialize a sequence of objects into the given data format
pub(crate) fn format_seq<I>(items: I, fmt: OutputFormat) -> anyhow::Result<String>
where
    I: IntoIterator,
    <I as IntoIterator>::Item: Tabled + Serialize + 'static,
{
    let iter = items.into_iter();
    match fmt {
        OutputFormat::Table => {
            let mut table = Table::new(iter);
            let n = table.count_rows() - 1;
            Ok(format!("{}\n{} records found", table.styled(), n))
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            iter.map(|item| writer.serialize(item))
                .collect::<Result<Vec<_>, _>>()?;
            writer.flush()?;
            String::from_utf8(writer.into_inner()?).map_err(|e| e.into())
        }
        OutputFormat::Json => {
            serde_json::to_string(&iter.collect::<Vec<_>>()).map_err(|e| e.into())
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&iter.collect::<Vec<_>>()).map_err(|e| e.into())
        }
    }
}

/// Serialize a value that has no tabular form. Only the structured formats are
/// supported.
pub(crate) fn format_document<T: Serialize>(item: &T, fmt: OutputFormat) -> anyhow::Result<String> {
    match fmt {
        OutputFormat::Json => serde_json::to_string_pretty(item).map_err(|e| e.into()),
        OutputFormat::Yaml => serde_yaml::to_string(item).map_err(|e| e.into()),
        OutputFormat::Table | OutputFormat::Csv => {
            Err(anyhow!("{fmt:?} format is not valid for nested documents"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    #[tabled(rename_all = "PascalCase")]
    struct Row {
        id: i64,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, name: "one" },
            Row { id: 2, name: "two" },
        ]
    }

    #[test]
    fn table_counts_records() {
        let out = format_seq(rows(), OutputFormat::Table).unwrap();
        assert!(out.contains("Name"));
        assert!(out.ends_with("2 records found"));

        let out = format_seq(Vec::<Row>::new(), OutputFormat::Table).unwrap();
        assert!(out.ends_with("0 records found"));
    }

    #[test]
    fn csv_has_header() {
        let out = format_seq(rows(), OutputFormat::Csv).unwrap();
        assert_eq!(out, "id,name\n1,one\n2,two\n");
    }

    #[test]
    fn json_sequence() {
        let out = format_seq(rows(), OutputFormat::Json).unwrap();
        assert_eq!(out, r#"[{"id":1,"name":"one"},{"id":2,"name":"two"}]"#);
    }

    #[test]
    fn single_item_formats() {
        assert!(format_one(Row { id: 3, name: "three" }, OutputFormat::Csv).is_err());
        let out = format_one(Row { id: 3, name: "three" }, OutputFormat::Yaml).unwrap();
        assert_eq!(out, "id: 3\nname: three\n");
        let out = format_one(Row { id: 3, name: "three" }, OutputFormat::Table).unwrap();
        assert!(out.contains("three"));
    }

    #[test]
    fn documents_need_structured_format() {
        assert!(format_document(&rows()[0], OutputFormat::Table).is_err());
        assert!(format_document(&rows()[0], OutputFormat::Csv).is_err());
        let out = format_document(&rows()[0], OutputFormat::Json).unwrap();
        assert!(out.contains("\"name\": \"one\""));
    }
}
