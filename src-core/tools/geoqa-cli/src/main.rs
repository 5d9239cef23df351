// FICHIER : src-core/tools/geoqa-cli/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "geoqa-cli")]
#[command(about = "Contrôle qualité des couches ArcGIS REST", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Évalue un catalogue de couches et imprime le rapport sur stdout
    Run(commands::run::RunArgs),

    /// Liste les neuf règles et leur politique
    Rules(commands::rules::RulesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. CHARGEMENT DU .ENV (facultatif)
    let _ = dotenvy::dotenv();

    // 2. Parsing & Dispatch
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let code = commands::run::handle(args).await?;
            tracing::debug!(code, "Fin de l'exécution du CLI");
            std::process::exit(code);
        }
        Commands::Rules(args) => commands::rules::handle(args)?,
    }
    Ok(())
}
