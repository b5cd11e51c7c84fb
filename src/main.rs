use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use reviewscope::models::AnalysisReport;
use reviewscope::storage::tabular;
use reviewscope::text::NormalizeMode;
use reviewscope::{
    Aggregator, ClassificationPipeline, Config, HuggingFaceModel, LexiconModel, PipelineConfig,
    SentimentModel, Storage, ThemeGrouping, ThemeTaxonomy,
};

#[derive(Parser, Debug)]
#[command(name = "reviewscope")]
#[command(version = "0.1.0")]
#[command(about = "Classify bank app reviews by sentiment and theme, then summarize per bank")]
struct Args {
    /// CSV file with review, rating, date, bank, source columns
    #[arg(short, long, required_unless_present = "from_database")]
    input: Option<String>,

    /// Directory for annotated_reviews.csv, sentiment_summary.csv and theme_summary.csv
    #[arg(long)]
    output_dir: Option<String>,

    /// Report format (json, text, markdown)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Database path for storing results (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,

    /// Reviews per sentiment model call (overrides SENTIMENT_BATCH_SIZE)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Use the built-in lexicon model instead of the inference API
    #[arg(long)]
    offline: bool,

    /// JSON theme taxonomy (overrides THEME_TAXONOMY_PATH)
    #[arg(long)]
    taxonomy: Option<String>,

    /// Drop stop-words and fold plurals before keyword matching
    #[arg(long)]
    lemmatize: bool,

    /// Count each theme of a multi-theme review separately
    #[arg(long)]
    per_theme: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Re-aggregate reviews already stored in the database
    #[arg(long)]
    from_database: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("reviewscope=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load configuration, CLI flags win over the environment
    let mut config = Config::from_env()?;
    if let Some(ref database) = args.database {
        config.database_path = database.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(ref taxonomy) = args.taxonomy {
        config.taxonomy_path = Some(taxonomy.clone());
    }
    config.validate()?;

    let pipeline_config = PipelineConfig {
        normalize_mode: if args.lemmatize {
            NormalizeMode::Lemmatized
        } else {
            NormalizeMode::Basic
        },
        theme_grouping: if args.per_theme {
            ThemeGrouping::PerTheme
        } else {
            ThemeGrouping::Combined
        },
        show_progress: !args.no_progress,
        ..PipelineConfig::from(&config)
    };

    let mut storage = Storage::new(&config.database_path)?;

    let report = if args.from_database {
        let reviews = storage.load_reviews()?;
        tracing::info!("Re-aggregating {} stored reviews", reviews.len());
        let (sentiment_summary, theme_summary) =
            Aggregator::new(pipeline_config.theme_grouping).aggregate(&reviews);
        AnalysisReport {
            reviews,
            sentiment_summary,
            theme_summary,
        }
    } else {
        let input = args
            .input
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--input is required"))?;

        let taxonomy = match config.taxonomy_path {
            Some(ref path) => ThemeTaxonomy::from_path(path)?,
            None => ThemeTaxonomy::banking()?,
        };

        let model: Arc<dyn SentimentModel> = match (&config.huggingface_token, args.offline) {
            (Some(token), false) => Arc::new(HuggingFaceModel::new(token, &config.sentiment_model)?),
            (None, false) => {
                tracing::info!("HF_API_TOKEN not set, using the offline lexicon model");
                Arc::new(LexiconModel::new())
            }
            (_, true) => Arc::new(LexiconModel::new()),
        };

        let pipeline = ClassificationPipeline::with_model(model, &taxonomy, &pipeline_config)?;

        let loaded = tabular::read_reviews(File::open(input)?)?;

        tracing::info!("Starting analysis of {} reviews", loaded.reviews.len());
        let report = pipeline.analyze(&loaded.reviews).await;

        storage.save_reviews(&report.reviews)?;
        storage.save_summaries(&report.sentiment_summary, &report.theme_summary)?;
        tracing::info!("Results saved to {}", config.database_path);

        report
    };

    if let Some(ref dir) = args.output_dir {
        export_tables(&report, Path::new(dir))?;
    }

    output_report(&report, &args)?;

    Ok(())
}

fn export_tables(report: &AnalysisReport, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;

    tabular::write_annotated(
        BufWriter::new(File::create(dir.join("annotated_reviews.csv"))?),
        &report.reviews,
    )?;
    tabular::write_sentiment_summary(
        BufWriter::new(File::create(dir.join("sentiment_summary.csv"))?),
        &report.sentiment_summary,
    )?;
    tabular::write_theme_summary(
        BufWriter::new(File::create(dir.join("theme_summary.csv"))?),
        &report.theme_summary,
    )?;

    tracing::info!("Tables written to: {}", dir.display());
    Ok(())
}

fn output_report(report: &AnalysisReport, args: &Args) -> anyhow::Result<()> {
    let output = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(report)?,
        "markdown" => reviewscope::report::format_markdown(report),
        _ => reviewscope::report::format_text(report),
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}
