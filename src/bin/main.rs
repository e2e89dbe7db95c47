//! Item Icon Renderer CLI
//!
//! Resolve item references and render them into PNG icons.

use clap::{Parser, Subcommand};
use item_icon_renderer::{
    load_catalog, AssetFetcher, DirectoryFetcher, HttpFetcher, IconConfig, IconError,
    IconPipeline, MirrorConfig, RenderKind, RenderOutput, RenderPayload, ResolvedAsset, Result,
    ZipFetcher,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "item-icons")]
#[command(author, version, about = "Render Minecraft item references into isometric icons", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read assets from a resource pack (ZIP or directory) instead of HTTP
    #[arg(short, long, global = true)]
    pack: Option<PathBuf>,

    /// Disable the 3D model renderer
    #[arg(long, global = true)]
    no_3d: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference and print what it points to
    Resolve {
        /// Reference (e.g., "pylon:machines/pipes/tin_pipe" or "item/diamond")
        reference: String,
    },

    /// Render one image reference to a PNG file
    Render {
        /// Image reference (e.g., "pylon:tools/hammer" or "minecraft:item/diamond")
        image: String,

        /// Fallback image reference
        #[arg(short, long)]
        fallback: Option<String>,

        /// Icon edge length in pixels
        #[arg(short, long)]
        size: Option<u32>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Draw one texture location with a fixed strategy
    Draw {
        /// Texture location, relative to the asset source
        location: String,

        /// Strategy: head, cube, pipe
        #[arg(short, long, default_value = "cube")]
        kind: String,

        /// Icon edge length in pixels
        #[arg(short, long)]
        size: Option<u32>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render every item of a catalog into a directory
    Catalog {
        /// Location of the directory holding `_categories.json`
        #[arg(short, long)]
        base: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Icon edge length in pixels
        #[arg(short, long)]
        size: Option<u32>,
    },
}

/// The asset source picked on the command line.
enum Source {
    Http(HttpFetcher),
    Directory(DirectoryFetcher),
    Zip(ZipFetcher),
}

impl AssetFetcher for Source {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        match self {
            Source::Http(fetcher) => fetcher.fetch(location).await,
            Source::Directory(fetcher) => fetcher.fetch(location).await,
            Source::Zip(fetcher) => fetcher.fetch(location).await,
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (source, config) = setup(&cli)?;
    let pipeline = IconPipeline::new(Rc::new(source), config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Resolve { reference } => resolve(&pipeline, &reference).await,
            Commands::Render {
                image,
                fallback,
                size,
                output,
            } => render(&pipeline, &image, fallback.as_deref(), size, &output).await,
            Commands::Draw {
                location,
                kind,
                size,
                output,
            } => draw(&pipeline, &location, &kind, size, &output).await,
            Commands::Catalog { base, output, size } => {
                render_catalog(&pipeline, &base, &output, size).await
            }
        }
    })?;

    Ok(())
}

/// Pick the asset source and load the configuration.
///
/// With `--pack` and no config file, both mirrors point at the pack's
/// `assets/<namespace>` directories.
fn setup(cli: &Cli) -> Result<(Source, IconConfig)> {
    let mut config = match &cli.config {
        Some(path) => IconConfig::from_json_file(path)?,
        None => IconConfig::default(),
    };

    let source = match &cli.pack {
        Some(pack) => {
            if cli.config.is_none() {
                config = config
                    .with_minecraft_mirror(MirrorConfig::with_base("assets/minecraft"))
                    .with_pylon_mirror(MirrorConfig::with_base("assets/pylonbase"));
            }
            open_pack(pack)?
        }
        None => Source::Http(HttpFetcher::new(config.http_timeout())?),
    };

    if cli.no_3d {
        config = config.with_3d(false);
    }
    Ok((source, config))
}

fn open_pack(path: &Path) -> Result<Source> {
    if path.is_dir() {
        println!("Reading assets from directory {:?}", path);
        Ok(Source::Directory(DirectoryFetcher::new(path)))
    } else {
        println!("Loading resource pack from {:?}...", path);
        let fetcher = ZipFetcher::from_path(path)?;
        println!("  Found {} entries", fetcher.len());
        Ok(Source::Zip(fetcher))
    }
}

async fn resolve(pipeline: &IconPipeline<Source>, reference: &str) -> Result<()> {
    match pipeline.resolver().resolve(reference).await? {
        ResolvedAsset::Texture(texture) => {
            println!("Texture: {}:{}", texture.namespace, texture.path);
            println!("  Location: {}", pipeline.config().texture_location(&texture));
        }
        ResolvedAsset::Model(resolved) => {
            println!("Model: {}", resolved.location);
            println!("  Elements: {}", resolved.model.elements().len());
            for (key, value) in resolved.resolved_textures() {
                println!("  #{} = {}", key, value);
            }
            let distinct = resolved.distinct_textures();
            println!("  Distinct textures: {}", distinct.len());
        }
    }
    Ok(())
}

async fn render(
    pipeline: &IconPipeline<Source>,
    image: &str,
    fallback: Option<&str>,
    size: Option<u32>,
    output: &Path,
) -> Result<()> {
    let result = pipeline.icon_for(image, fallback, size).await;
    println!("Trace: {:?}", result.trace.states);

    match &result.output {
        RenderOutput::Image(icon) => {
            icon.save(output)?;
            println!(
                "  Wrote {}x{} {} icon to {:?}",
                icon.width,
                icon.height,
                icon.strategy.name(),
                output
            );
        }
        RenderOutput::Passthrough(location) => {
            println!("  Nothing rendered; show {} instead", location);
        }
    }
    Ok(())
}

async fn draw(
    pipeline: &IconPipeline<Source>,
    location: &str,
    kind: &str,
    size: Option<u32>,
    output: &Path,
) -> Result<()> {
    let kind = RenderKind::from_name(kind)
        .ok_or_else(|| IconError::InvalidConfig(format!("unknown render kind '{}'", kind)))?;
    let size = size.unwrap_or(pipeline.config().render.default_size);

    let payload = RenderPayload::texture(location);
    match pipeline.dispatcher().render(kind, &payload, size).await {
        RenderOutput::Image(icon) => {
            icon.save(output)?;
            println!("Wrote {} icon to {:?}", kind.name(), output);
        }
        RenderOutput::Passthrough(location) => {
            println!("Could not draw {} as {}", location, kind.name());
        }
    }
    Ok(())
}

async fn render_catalog(
    pipeline: &IconPipeline<Source>,
    base: &str,
    output: &Path,
    size: Option<u32>,
) -> Result<()> {
    let categories = load_catalog(pipeline.fetcher(), base).await?;
    fs::create_dir_all(output)?;

    let (mut rendered, mut passthrough) = (0, 0);
    for category in &categories {
        println!("Category {} ({} items)", category.name, category.items.len());
        for item in &category.items {
            let result = pipeline.icon_for_item(item, size).await;
            match &result.output {
                RenderOutput::Image(icon) => {
                    icon.save(output.join(format!("{}.png", item.id)))?;
                    rendered += 1;
                }
                RenderOutput::Passthrough(location) => {
                    println!("  {}: {}", item.id, location);
                    passthrough += 1;
                }
            }
        }
    }

    println!(
        "Rendered {} icons, {} items left as plain images",
        rendered, passthrough
    );
    Ok(())
}
