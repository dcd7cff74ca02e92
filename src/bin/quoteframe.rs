use std::{
    collections::HashSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quoteframe", version)]
#[command(about = "Filter, rank and caption background images for quote posts")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter and rank candidate images, printing the ranked list as JSON.
    Rank(RankArgs),
    /// Render a quote onto a local image.
    Render(RenderArgs),
    /// Filter, rank and render the top candidates into a preview directory.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// JSON array of `{ "url", "alt_text" }` candidates.
    #[arg(long)]
    candidates: PathBuf,

    /// File with already used URLs, one per line.
    #[arg(long)]
    seen: Option<PathBuf>,

    /// Pipeline config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of ranked candidates to keep.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Parser, Debug)]
struct RankArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Write the ranked JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Quote text.
    #[arg(long)]
    quote: String,

    /// Pipeline config JSON (only the `overlay` section is used).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = quoteframe::DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Also write the layout decisions as JSON.
    #[arg(long)]
    layout: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Quote text.
    #[arg(long)]
    quote: String,

    /// Directory receiving the JPEGs and manifest.json.
    #[arg(long)]
    out_dir: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = quoteframe::DEFAULT_JPEG_QUALITY)]
    quality: u8,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Rank(args) => cmd_rank(args),
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<quoteframe::PipelineConfig> {
    match path {
        Some(p) => Ok(quoteframe::PipelineConfig::from_path(p)?),
        None => Ok(quoteframe::PipelineConfig::default()),
    }
}

fn read_candidates(path: &Path) -> anyhow::Result<Vec<quoteframe::CandidateDescriptor>> {
    let f = File::open(path).with_context(|| format!("open candidates '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| "parse candidates JSON")
}

fn read_seen(path: Option<&Path>) -> anyhow::Result<HashSet<String>> {
    let Some(path) = path else {
        return Ok(HashSet::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read seen urls '{}'", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

fn filter_and_rank(
    source: &SourceArgs,
    cfg: &quoteframe::PipelineConfig,
    fetcher: &quoteframe::HttpFetcher,
) -> anyhow::Result<Vec<quoteframe::RankedCandidate>> {
    let descriptors = read_candidates(&source.candidates)?;
    let seen = read_seen(source.seen.as_deref())?;

    if cfg.filter.ocr == quoteframe::OcrMode::Tesseract && !quoteframe::is_tesseract_on_path() {
        anyhow::bail!(
            "tesseract not found on PATH; install it or set \"filter\": {{ \"ocr\": \"none\" }} in the config"
        );
    }
    let recognizer = cfg.filter.recognizer();
    let filter = quoteframe::CandidateFilter::new(cfg.filter.clone(), fetcher, recognizer.as_ref())?;
    let report = filter.filter_candidates(&descriptors, &seen)?;

    let limit = source.limit.unwrap_or(cfg.ranking.limit);
    Ok(quoteframe::rank_with_weights(
        &report.accepted,
        limit,
        &cfg.ranking.weights,
    )?)
}

fn cmd_rank(args: RankArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.source.config.as_deref())?;
    let fetcher = quoteframe::HttpFetcher::from_config(&cfg.filter)?;
    let ranked = filter_and_rank(&args.source, &cfg, &fetcher)?;

    let json = serde_json::to_string_pretty(&ranked).context("serialize ranked candidates")?;
    match &args.out {
        Some(out) => {
            quoteframe::save_text(out, &json)?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let image = image::open(&args.image)
        .with_context(|| format!("open image '{}'", args.image.display()))?
        .to_rgba8();

    let renderer = quoteframe::OverlayRenderer::new(cfg.overlay)?;
    let rendered = renderer.render(&image, &args.quote)?;
    rendered.save_jpeg(&args.out, args.quality)?;
    eprintln!("wrote {}", args.out.display());

    if let Some(layout_path) = &args.layout {
        let json =
            serde_json::to_string_pretty(&rendered.layout).context("serialize overlay layout")?;
        quoteframe::save_text(layout_path, &json)?;
        eprintln!("wrote {}", layout_path.display());
    }
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.source.config.as_deref())?;
    let fetcher = quoteframe::HttpFetcher::from_config(&cfg.filter)?;
    let renderer = quoteframe::OverlayRenderer::new(cfg.overlay.clone())?;
    let ranked = filter_and_rank(&args.source, &cfg, &fetcher)?;

    let previews = quoteframe::build_previews(
        &ranked,
        &args.quote,
        &renderer,
        &fetcher,
        cfg.filter.workers,
    )?;
    let manifest =
        quoteframe::write_previews(&previews, &args.quote, &args.out_dir, args.quality)?;
    for entry in &manifest.previews {
        eprintln!("wrote {}", entry.path.display());
    }
    eprintln!(
        "wrote {}",
        args.out_dir.join(quoteframe::MANIFEST_FILE_NAME).display()
    );
    Ok(())
}
