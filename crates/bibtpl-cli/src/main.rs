//! bibtpl CLI: render BibTeX bibliographies through `@...@` directive templates.
//!
//! Three commands: `render` runs one or more conversions, `inspect` prints the
//! grouped data a conversion would see, and `init` scaffolds a new project.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use bibtpl_core::config::{SortOrder, CONFIG_FILE};
use bibtpl_core::project::StarterStyle;

use commands::OptionOverrides;

#[derive(Parser)]
#[command(
    name = "bibtpl",
    about = "Render BibTeX bibliographies through directive templates",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the options file (ignored when missing)
    #[arg(long, global = true, env = "BIBTPL_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a bibliography through one or more templates
    Render {
        /// BibTeX source file
        #[arg(long, short)]
        source: PathBuf,

        /// Template file(s); several templates render concurrently
        #[arg(long, short, required = true, num_args = 1..)]
        template: Vec<PathBuf>,

        /// Output file for a single template, output directory for several
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: OptionOverrides,
    },

    /// Print the grouped data of a bibliography as JSON
    Inspect {
        /// BibTeX source file
        #[arg(long, short)]
        source: PathBuf,

        #[command(flatten)]
        overrides: OptionOverrides,
    },

    /// Create a new project with an options file, a starter template and a sample source
    Init {
        /// Project name (creates a directory with this name)
        name: String,

        /// Starter template style
        #[arg(long, value_enum)]
        style: Option<StyleChoice>,

        /// Locale id written to the options file
        #[arg(long, default_value = "en")]
        lang: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OrderChoice {
    Asc,
    Desc,
    None,
}

impl From<OrderChoice> for SortOrder {
    fn from(choice: OrderChoice) -> Self {
        match choice {
            OrderChoice::Asc => SortOrder::Asc,
            OrderChoice::Desc => SortOrder::Desc,
            OrderChoice::None => SortOrder::None,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StyleChoice {
    Html,
    Markdown,
    Plain,
}

impl From<StyleChoice> for StarterStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Html => StarterStyle::Html,
            StyleChoice::Markdown => StarterStyle::Markdown,
            StyleChoice::Plain => StarterStyle::Plain,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            source,
            template,
            output,
            overrides,
        } => {
            commands::render::run(&cli.config, &source, &template, output.as_deref(), overrides).await?;
        }
        Commands::Inspect { source, overrides } => {
            commands::inspect::run(&cli.config, &source, overrides).await?;
        }
        Commands::Init { name, style, lang } => {
            commands::init::run(&name, style, &lang).await?;
        }
    }

    Ok(())
}
