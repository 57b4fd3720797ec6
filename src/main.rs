use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ember::config;
use ember::ember::{Application, Ember};
use ember::resource::ResourceSchemaConfig;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Sql,
}

/// Ember - compile resource declarations into relational table models
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML file with resource declarations
    #[arg(long)]
    schema: PathBuf,

    /// Output format of the compiled schema
    #[arg(long, value_enum, default_value_t = OutputFormat::Sql)]
    format: OutputFormat,

    /// Common base recorded on every generated model
    #[arg(long, default_value = "Model")]
    model_base: String,

    /// Database schema used to qualify table names
    #[arg(long)]
    db_schema: Option<String>,

    /// Do not add an `id` primary key to resources that declare none
    #[arg(long)]
    no_auto_primary_key: bool,

    /// Column name of automatically added primary keys
    #[arg(long, default_value = "id")]
    primary_key_column: String,

    /// Default table name generator (snake_case, lower_case, upper_snake_case, identity)
    #[arg(long, default_value = "snake_case")]
    tablename_generator: String,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            model_base: cli.model_base.clone(),
            schema: cli.db_schema.clone(),
            auto_primary_key: !cli.no_auto_primary_key, // Invert the flag
            primary_key_column: cli.primary_key_column.clone(),
            tablename_generator: cli.tablename_generator.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = config::CompilerConfig::from_cli((&cli).into())
        .context("Invalid compiler configuration")?;

    let declarations = ResourceSchemaConfig::from_yaml_file(&cli.schema)
        .with_context(|| format!("Failed to load {}", cli.schema.display()))?;

    let mut ember = Ember::new(config);
    declarations
        .declare_into(&mut ember)
        .context("Failed to declare resources")?;

    let mut app = Application::new(declarations.name.clone().unwrap_or_else(|| "ember".to_string()));
    let schema = ember
        .init_app(&mut app)
        .context("Failed to compile resources")?;

    match cli.format {
        OutputFormat::Sql => println!("{}", schema.to_sql()),
        OutputFormat::Json => println!(
            "{}",
            schema.to_json().context("Failed to render compiled schema")?
        ),
    }
    Ok(())
}
