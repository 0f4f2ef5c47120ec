use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graph_console::config::ConsoleConfig;
use graph_console::domain::is_valid_url;
use graph_console::graphql::{validate_query, ClientSchema, QueryError};
use log::{debug, info};
use shared::{ActionSchemaSelection, ModelMutationType};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "console", version, about = "Project console edit-session tooling")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, value_name = "PATH", env = "CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a trigger fragment against an introspection schema
    CheckFragment {
        /// Introspection JSON file
        #[arg(long, value_name = "PATH")]
        schema: PathBuf,
        /// Query text
        #[arg(long, conflicts_with = "query_file")]
        query: Option<String>,
        /// File holding the query text
        #[arg(long, value_name = "PATH")]
        query_file: Option<PathBuf>,
    },
    /// Check whether a webhook URL would be accepted
    CheckUrl { url: String },
    /// Print the effective configuration
    ShowConfig,
    /// Fetch the action schema of a model mutation from the API
    FetchActionSchema {
        #[arg(long)]
        project: String,
        #[arg(long)]
        model: String,
        #[arg(long, value_enum)]
        mutation_type: MutationTypeArg,
        /// Write the schema here instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MutationTypeArg {
    Created,
    Updated,
    Deleted,
}

impl From<MutationTypeArg> for ModelMutationType {
    fn from(arg: MutationTypeArg) -> Self {
        match arg {
            MutationTypeArg::Created => ModelMutationType::Created,
            MutationTypeArg::Updated => ModelMutationType::Updated,
            MutationTypeArg::Deleted => ModelMutationType::Deleted,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = ConsoleConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    env_logger::Builder::new()
        .parse_filters(&config.log_filter)
        .init();
    debug!("Using API endpoint {}", config.api_endpoint);

    match cli.command {
        Command::CheckFragment {
            schema,
            query,
            query_file,
        } => check_fragment(&schema, query, query_file.as_deref()),
        Command::CheckUrl { url } => {
            if is_valid_url(&url) {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::ShowConfig => {
            print!("{}", config.redacted_yaml().context("Failed to render configuration")?);
            Ok(ExitCode::SUCCESS)
        }
        Command::FetchActionSchema {
            project,
            model,
            mutation_type,
            output,
        } => {
            let client = config.client().context("Failed to set up the API client")?;
            let selection = ActionSchemaSelection {
                model_id: model,
                mutation_type: mutation_type.into(),
            };
            let schema = client
                .fetch_action_schema(&project, &selection)
                .await
                .with_context(|| format!("Failed to fetch action schema from {}", client.endpoint()))?;

            let Some(schema) = schema else {
                bail!("Project {} has no action schema for {:?}", project, selection);
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, schema)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("💾 Action schema written to {}", path.display());
                }
                None => println!("{}", schema),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check_fragment(schema_path: &Path, query: Option<String>, query_file: Option<&Path>) -> Result<ExitCode> {
    let source = std::fs::read_to_string(schema_path)
        .with_context(|| format!("Failed to read schema {}", schema_path.display()))?;
    let schema = ClientSchema::from_introspection_str(&source)
        .with_context(|| format!("Failed to build schema from {}", schema_path.display()))?;
    info!("📚 Loaded schema with {} types", schema.type_count());

    let query = match (query, query_file) {
        (Some(query), _) => query,
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query {}", path.display()))?,
        (None, None) => bail!("Pass the query with --query or --query-file"),
    };

    match validate_query(&schema, &query) {
        Ok(()) => {
            println!("valid");
            Ok(ExitCode::SUCCESS)
        }
        Err(QueryError::Invalid(violations)) => {
            for violation in &violations {
                println!("{}", violation);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
