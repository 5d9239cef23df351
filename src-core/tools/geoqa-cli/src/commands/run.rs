// FICHIER : src-core/tools/geoqa-cli/src/commands/run.rs

use anyhow::{Context, Result};
use clap::Args;
use geoqa::qa_engine::{load_catalog, BatchOutcome, BatchRunner, LayerEvaluator};
use geoqa::report::{self, ReportFormat};
use geoqa::source::FixtureSource;
use geoqa::utils::context::{init_logging, AppConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Catalogue JSON des couches à contrôler
    #[arg(long, env = "GEOQA_CATALOG")]
    pub catalog: PathBuf,

    /// Dossier des réponses de services capturées (un fichier JSON par couche)
    #[arg(long, env = "GEOQA_FIXTURES")]
    pub fixtures: PathBuf,

    /// Fichier de configuration JSON (optionnel)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Taille maximale de l'échantillon d'entités (prioritaire sur la configuration)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Nombre de couches évaluées simultanément (prioritaire sur la configuration)
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,

    /// Écrit aussi un document JSON par couche dans ce dossier
    #[arg(long)]
    pub issues_dir: Option<PathBuf>,
}

/// Renvoie le code de sortie du lot.
pub async fn handle(args: RunArgs) -> Result<i32> {
    let config = AppConfig::init(resolve_config(&args)?);
    init_logging(&config.log_settings());

    let (report, outcome) = execute(&args, config).await?;
    println!("{}", report);

    if let Some(dir) = &args.issues_dir {
        let written = write_issue_documents(dir, &outcome).await?;
        tracing::info!(count = written, dir = %dir.display(), "Documents de couche écrits");
    }
    Ok(outcome.exit_code())
}

/// Fichier (ou défauts), puis variables `GEOQA_*`, puis drapeaux de la ligne de commande.
fn resolve_config(args: &RunArgs) -> Result<AppConfig> {
    let base = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Configuration illisible : {}", path.display()))?,
        None => AppConfig::default(),
    };
    let mut config = base.apply_env_overrides()?;
    if let Some(n) = args.sample_size {
        config.sample_size = n;
    }
    if let Some(n) = args.concurrency {
        config.concurrency = n;
    }
    config.validate()?;
    Ok(config)
}

async fn execute(args: &RunArgs, config: &AppConfig) -> Result<(String, BatchOutcome)> {
    let source = FixtureSource::from_dir(&args.fixtures)
        .await
        .with_context(|| format!("Fixtures illisibles : {}", args.fixtures.display()))?;
    let catalog = load_catalog(&args.catalog)
        .with_context(|| format!("Catalogue illisible : {}", args.catalog.display()))?;

    let evaluator = LayerEvaluator::new(Arc::new(source), config.qa_settings());
    let runner = BatchRunner::new(evaluator, config.concurrency);
    let outcome = runner
        .run(&catalog, &args.catalog.display().to_string())
        .await;

    let report = match args.format {
        ReportFormat::Markdown => report::render_markdown(&outcome.results, &outcome.summary),
        ReportFormat::Csv => report::render_csv(&outcome.results),
        ReportFormat::Json => report::render_json(&outcome.results, &outcome.summary)?,
    };
    Ok((report, outcome))
}

async fn write_issue_documents(dir: &Path, outcome: &BatchOutcome) -> Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Création de {} impossible", dir.display()))?;
    let docs = report::issue_documents(&outcome.results, outcome.summary.timestamp)?;
    for (stem, doc) in &docs {
        let path = dir.join(format!("{}.json", stem));
        tokio::fs::write(&path, serde_json::to_string_pretty(doc)?)
            .await
            .with_context(|| format!("Écriture de {} impossible", path.display()))?;
    }
    Ok(docs.len())
}
