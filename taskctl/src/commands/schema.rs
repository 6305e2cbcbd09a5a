use crate::{
    cli::OutputArgs,
    output::{self, OutputFormat, rows::FieldRow, table::TaskctlTable},
};
use anyhow::Result;
use libtask::core::schema::Registry;
use tabled::Table;

pub(crate) fn handle_command(output: OutputArgs) -> Result<()> {
    let registry = Registry::default();
    match output.format {
        OutputFormat::Table => {
            for schema in registry.schemas() {
                let mut rows: Vec<FieldRow> = schema
                    .fields
                    .iter()
                    .map(|f| FieldRow::new(schema, f))
                    .collect();
                if output.full {
                    rows.extend(FieldRow::timestamps(schema));
                }
                println!("{} (collection '{}')", schema.name, schema.collection);
                println!("{}\n", Table::new(rows).styled());
            }
        }
        fmt => {
            let rows = registry.schemas().iter().flat_map(|schema| {
                let timestamps = match output.full {
                    true => FieldRow::timestamps(schema),
                    false => Vec::new(),
                };
                schema
                    .fields
                    .iter()
                    .map(move |f| FieldRow::new(schema, f))
                    .chain(timestamps)
            });
            println!("{}", output::format_seq(rows, fmt)?);
        }
    }
    Ok(())
}
