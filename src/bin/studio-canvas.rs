use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use studio_canvas::export::pdf::export_pages;
use studio_canvas::export::raster::export_raster;
use studio_canvas::{
    CanvasDocument, CpuRenderer, ElementKind, ExportQuality, FsImageLoader, ImageCache, ProductType,
    ProjectId, StudioConfig, generate_pages,
};

#[derive(Parser, Debug)]
#[command(name = "studio-canvas", version)]
struct Cli {
    /// Log engine diagnostics down to debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a canvas document as a PNG.
    Render(RenderArgs),
    /// Paginate a canvas document and render every page.
    Pages(PagesArgs),
    /// Validate a canvas document and print a summary.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input canvas document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Target resolution.
    #[arg(long, conflicts_with = "quality")]
    dpi: Option<f64>,

    /// Named resolution preset (standard, high, professional).
    #[arg(long)]
    quality: Option<ExportQuality>,
}

#[derive(Parser, Debug)]
struct PagesArgs {
    /// Input canvas document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Product to paginate for (book, calendar, poster).
    #[arg(long)]
    product: ProductType,

    /// Project id used in page ids.
    #[arg(long, default_value_t = 0)]
    project_id: u64,

    /// Directory receiving `page-<n>.png` and `pages.json`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Target resolution.
    #[arg(long, default_value_t = 96.0)]
    dpi: f64,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input canvas document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Pages(args) => cmd_pages(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<CanvasDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    CanvasDocument::from_json(&raw).with_context(|| format!("parse document '{}'", path.display()))
}

fn loader_for(config: &StudioConfig, in_path: &Path) -> FsImageLoader {
    let root = config.asset_root.clone().unwrap_or_else(|| {
        in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    });
    FsImageLoader::new(root)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = StudioConfig::from_env();
    let doc = read_document(&args.in_path)?;
    let loader = loader_for(&config, &args.in_path);
    let dpi = args
        .dpi
        .or(args.quality.map(ExportQuality::dpi))
        .unwrap_or(config.baseline_dpi);

    let mut renderer = CpuRenderer::new(&config);
    let mut images = ImageCache::new();
    let export = pollster::block_on(export_raster(&mut renderer, &doc, &mut images, &loader, dpi))?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &export.png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{} @ {} dpi)",
        args.out.display(),
        export.width,
        export.height,
        export.dpi
    );
    Ok(())
}

fn cmd_pages(args: PagesArgs) -> anyhow::Result<()> {
    let config = StudioConfig::from_env();
    let doc = read_document(&args.in_path)?;
    let loader = loader_for(&config, &args.in_path);

    let mut paged = generate_pages(ProjectId(args.project_id), args.product, &doc.elements);
    let mut renderer = CpuRenderer::new(&config);
    let mut images = ImageCache::new();
    let descriptors = pollster::block_on(export_pages(
        &mut renderer,
        &doc,
        &mut paged,
        &mut images,
        &loader,
        args.dpi,
    ))?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for d in &descriptors {
        let path = args.out_dir.join(format!("page-{}.png", d.page_number));
        std::fs::write(&path, d.png.as_slice())
            .with_context(|| format!("write png '{}'", path.display()))?;
    }

    let manifest = serde_json::json!({
        "projectId": paged.project_id,
        "product": paged.product,
        "pages": paged
            .pages
            .iter()
            .zip(&descriptors)
            .map(|(page, d)| serde_json::json!({
                "id": page.id,
                "pageNumber": page.page_number,
                "elementCount": page.elements.len(),
                "widthMm": d.width_mm,
                "heightMm": d.height_mm,
                "orientation": d.orientation,
            }))
            .collect::<Vec<_>>(),
    });
    let manifest_path = args.out_dir.join("pages.json");
    std::fs::write(&manifest_path, serde_json::to_vec_pretty(&manifest)?)
        .with_context(|| format!("write manifest '{}'", manifest_path.display()))?;

    eprintln!(
        "wrote {} pages to {}",
        descriptors.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let images = doc
        .elements
        .iter()
        .filter(|e| e.kind() == ElementKind::Image)
        .count();
    println!(
        "ok: {}x{} canvas, {} elements ({} image, {} text)",
        doc.width,
        doc.height,
        doc.elements.len(),
        images,
        doc.elements.len() - images
    );
    Ok(())
}
