//! Records command - inspect the reference records.

use clap::Args;
use console::style;

use docmatch_core::{InMemoryStore, ReferenceStore};

use super::load_config;

/// Arguments for the records command.
#[derive(Args)]
pub struct RecordsArgs {
    /// Record id to show (lists all ids when omitted)
    id: Option<String>,
}

pub fn run(args: RecordsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = InMemoryStore::from_config(&config.reference)?;

    match args.id {
        Some(id) => {
            let Some(record) = store.lookup(&id)? else {
                anyhow::bail!("Record not found: {}", id);
            };
            for (field, value) in record.iter() {
                println!("{}: {}", style(field).bold(), value);
            }
        }
        None => {
            for id in store.ids() {
                let name = store
                    .lookup(id)?
                    .and_then(|r| r.get(docmatch_core::Field::Name).map(str::to_string))
                    .unwrap_or_default();
                println!("{}\t{}", id, name);
            }
            eprintln!("{} {} records", style("ℹ").blue(), store.len());
        }
    }

    Ok(())
}
