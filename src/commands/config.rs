use clap::{Args, Subcommand};
use owo_colors::{OwoColorize, Stream};

use crate::config;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    /// Parse the config file and validate its profiles.
    Check {
        #[arg(long)]
        profile: Option<String>,
    },
    /// Print the resolved config file path.
    Path,
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.command {
        ConfigSubcommand::Check { profile } => {
            let path = config::validate_config(profile.as_deref()).map_err(|err| err.to_string())?;
            println!(
                "{} {}",
                "config OK:".if_supports_color(Stream::Stdout, |text| text.green()),
                path.display()
            );
            Ok(())
        }
        ConfigSubcommand::Path => {
            let path = config::config_path().map_err(|err| err.to_string())?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
