//! convert CLI - turns one PDF/DOCX résumé into the branded Maltem DOCX

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_converter::config::Config;
use cv_converter::extraction::{self, SourceFormat};
use cv_converter::pipeline::output_file_name;
use cv_converter::render;
use cv_converter::structuring::{CvStructurer, LlmStructurer};

const TOTAL_STEPS: u32 = 3;

#[derive(Parser)]
#[command(name = "convert")]
#[command(version)]
#[command(about = "Convertit un CV (PDF/DOCX) au format Maltem Africa", long_about = None)]
struct Cli {
    /// Source résumé (PDF or DOCX)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Also save the structured data as JSON
    #[arg(short, long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Print the structured data and debug logs
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(path) => {
            println!("\n✓ Conversion réussie : {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ ERREUR : {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cv_converter={level}"))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<PathBuf> {
    let config = Config::from_env()?;

    // Checks before any work
    if config.nvidia_api_key.is_none() {
        bail!("La variable d'environnement NVIDIA_API_KEY n'est pas définie.");
    }
    let input = std::path::absolute(&cli.input)
        .with_context(|| format!("Chemin invalide : {}", cli.input.display()))?;
    if !input.exists() {
        bail!("Fichier introuvable : {}", input.display());
    }
    SourceFormat::detect(&input.to_string_lossy())?;

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Impossible de créer {}", cli.output.display()))?;

    println!("Fichier source : {}", input.display());
    println!("Dossier sortie : {}\n", cli.output.display());

    step(1, "Extraction du texte du CV");
    let text = extraction::extract_text(&input).context("Échec de l'extraction")?;
    if text.trim().is_empty() {
        bail!("Aucun texte extrait. Le fichier semble vide ou protégé.");
    }
    println!("✓ Texte extrait ({} caractères)", text.chars().count());

    step(2, "Analyse et structuration du CV");
    let structurer = LlmStructurer::new(
        config.nvidia_api_key.clone(),
        config.llm_settings(),
        config.truncation(),
    )?;
    let record = structurer
        .structure(&text)
        .await
        .context("Échec de l'analyse")?;
    println!("✓ CV analysé : {} | {}", record.full_name, record.job_title);

    if cli.verbose {
        println!("\n── Données extraites ──");
        println!("{}\n", serde_json::to_string_pretty(&record)?);
    }
    if let Some(json_path) = &cli.json {
        write_json(json_path, &record)?;
        println!("  JSON sauvegardé : {}", json_path.display());
    }

    step(3, "Génération du CV au format Maltem Africa");
    let output = cli.output.join(output_file_name(&record.full_name, None));
    let bytes = render::render_cv(&record, &config.render_options())
        .context("Échec de la génération DOCX")?;
    std::fs::write(&output, bytes)
        .with_context(|| format!("Impossible d'écrire {}", output.display()))?;
    println!("✓ CV généré");

    Ok(output)
}

fn step(n: u32, message: &str) {
    println!("[{n}/{TOTAL_STEPS}] {message}...");
}

fn write_json(path: &Path, record: &cv_converter::models::cv::CvRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {}", path.display()))
}
