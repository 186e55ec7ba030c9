//! grant-qualifier CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use grant_qualifier::{
    commands::{cmd_ingest, cmd_qualify, cmd_status, print_status, ProfileOutcome},
    config::Config,
    embed::create_embedder,
    error::{Error, Result},
    llm::create_language_model,
    progress::LogWriterFactory,
    prompt::PromptTemplate,
    store::open_store,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "grant-qualifier")]
#[command(version, about = "Index grant proposals and judge company eligibility with a local LLM", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "GRANT_QUALIFIER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file populated with the current defaults
    Init {
        /// Where to write the config file
        #[arg(default_value = "grant-qualifier.toml")]
        path: PathBuf,

        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Index the company profile and every proposal PDF
    Ingest {
        /// Company profile JSON file
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Directory holding proposal PDFs
        #[arg(long)]
        proposals: Option<PathBuf>,
    },

    /// Judge every indexed proposal against the company profile
    Qualify {
        /// Directory holding proposal PDFs
        #[arg(long)]
        proposals: Option<PathBuf>,

        /// Response shape requested from the model
        #[arg(short, long, value_enum)]
        template: Option<PromptTemplate>,

        /// Number of chunks retrieved per proposal
        #[arg(short)]
        k: Option<usize>,
    },

    /// Show vector store contents and configuration
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    // Handle completions command (doesn't need config or store)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "grant-qualifier", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { path, force } => {
            if path.exists() && !force {
                return Err(Error::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            config.save(&path)?;
            println!("✓ Wrote {}", path.display());
        }

        Commands::Ingest { profile, proposals } => {
            if let Some(profile) = profile {
                config.inputs.profile_file = profile;
            }
            if let Some(proposals) = proposals {
                config.inputs.proposals_dir = proposals;
            }

            let store = open_store(&config).await?;
            let embedder = create_embedder(&config)?;
            let stats = cmd_ingest(&config, store.as_ref(), embedder.as_ref()).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let profile = match &stats.profile {
                    ProfileOutcome::Missing => "missing".to_string(),
                    ProfileOutcome::Invalid(reason) => format!("invalid ({})", reason),
                    ProfileOutcome::AlreadyIndexed => "already indexed".to_string(),
                    ProfileOutcome::Indexed => "indexed".to_string(),
                };
                println!("\nCompany profile: {}", profile);
                println!("Proposals processed: {}", stats.proposals_processed);
                println!("Chunks created: {}", stats.chunks_created);
            }
        }

        Commands::Qualify {
            proposals,
            template,
            k,
        } => {
            if let Some(proposals) = proposals {
                config.inputs.proposals_dir = proposals;
            }
            if let Some(template) = template {
                config.retrieval.template = template;
            }
            if let Some(k) = k {
                config.retrieval.k = k;
            }
            config.validate()?;

            let store = open_store(&config).await?;
            let embedder = create_embedder(&config)?;
            let llm = create_language_model(&config)?;

            let results =
                cmd_qualify(&config, store.as_ref(), embedder.as_ref(), llm.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }

        Commands::Status => {
            let store = open_store(&config).await?;
            let status = cmd_status(&config, store.as_ref()).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
