use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use fnkit::commands::ask::{self, AskArgs};
use fnkit::commands::config::{self, ConfigArgs};
use fnkit::commands::encode::{self, EncodeImageArgs};
use fnkit::commands::schema::{self, SchemaArgs};
use owo_colors::{OwoColorize, Stream};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("FNKIT_GIT_SHA"),
    "\nbuilt: ",
    env!("FNKIT_BUILD_TS")
);

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  fnkit schema tools.toml\n  fnkit ask --provider openai --model gpt-4o-mini \"2+2?\"\n  fnkit ask --model gpt-4o-mini --tools tools.toml \"Weather in Paris?\"\n  fnkit encode-image --data-url photo.jpg\n  fnkit completion bash > ~/.local/share/bash-completion/completions/fnkit";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  fnkit ask --provider fireworks --model accounts/fireworks/models/kimi-k2-instruct-0905 \"2+2?\"\n  echo \"List three colors\" | fnkit ask --model gpt-4o-mini --json\n  fnkit ask --model gpt-4o-mini --image cat.png --dry-run \"What is this?\"";

#[derive(Debug, Parser)]
#[command(
    name = "fnkit",
    about = "Chat-completions helpers and tool schema generation",
    version = VERSION,
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Ask a model for a text, JSON or tool-calling response", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Print tool schemas for a descriptor file")]
    Schema(SchemaArgs),
    #[command(about = "Base64-encode an image file")]
    EncodeImage(EncodeImageArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "fnkit", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "fnkit", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "fnkit", &mut io::stdout()),
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args),
        Commands::Schema(args) => schema::run(args),
        Commands::EncodeImage(args) => encode::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!(
            "{} {err}",
            "error:".if_supports_color(Stream::Stderr, |text| text.red())
        );
        process::exit(1);
    }
}
