use std::path::PathBuf;

use clap::Args;

use crate::schema::{generate_schemas, load_tool_set};

#[derive(Debug, Args, Clone)]
pub struct SchemaArgs {
    /// Tool descriptor file (`.json` for JSON, anything else is TOML).
    pub file: PathBuf,
    /// Print on one line.
    #[arg(long)]
    pub compact: bool,
}

pub fn run(args: SchemaArgs) -> Result<(), String> {
    let set = load_tool_set(&args.file).map_err(|err| err.to_string())?;
    let schemas = generate_schemas(&set.functions).map_err(|err| err.to_string())?;

    let rendered = if args.compact {
        serde_json::to_string(&schemas)
    } else {
        serde_json::to_string_pretty(&schemas)
    }
    .map_err(|err| format!("Failed to render schemas: {err}"))?;
    println!("{rendered}");
    Ok(())
}
