use chiaki_site::{config, generate, output, process, scan};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that render thumbnails.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the thumbnail cache and re-encode every image
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("CHIAKI_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("CHIAKI_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "chiaki-site")]
#[command(about = "Static site generator for the 千秋稻荷社 character portfolio")]
#[command(long_about = "\
Static site generator for the 千秋稻荷社 character portfolio

Artwork folders become gallery projects. The folder name carries the date,
the commissioned artist and the title; file names carry the R18 marker.

Content structure:

  content/
  ├── config.toml                        # Site config (optional)
  ├── landing.md                         # Landing page body (optional)
  ├── character.md                       # Character profile body (optional)
  ├── assets/                            # Copied to the output root
  │   ├── character/live2d/...           # Avatar model
  │   └── character/art/                 # Gallery projects
  │       ├── 20250505_Friend_Big_Poster/
  │       │   ├── project.toml           # Title/author/layout/crop overrides
  │       │   ├── poster.png
  │       │   ├── poster_r18.png         # R18 marker before the extension
  │       │   └── poster.psd             # Non-image files become downloads
  │       ├── 20250326_廢墟桌布/           # Date + title, default author
  │       └── Sketches/                  # Title only
  └── fonts/...

Folder naming:
  YYYYMMDD_Author_Title words  → date, author, title
  YYYYMMDD_Title               → date, title (default author)
  Anything else                → title only

Run 'chiaki-site gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (project index, thumbnails)
    #[arg(long, default_value = ".chiaki-site-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the assets directory into a project index
    Index,
    /// Render large and small thumbnails for every gallery image
    Thumbs {
        #[command(flatten)]
        cache: CacheArgs,
        /// Remove all generated thumbnails before rendering
        #[arg(long)]
        clean: bool,
    },
    /// Produce the final HTML site from the project index
    Generate,
    /// Run the full pipeline: index → thumbs → generate
    Build(CacheArgs),
    /// Validate config and content without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chiaki_site=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.source)?;
    let index_path = cli.temp_dir.join("index.json");
    let thumbs_dir = cli.temp_dir.join("thumbs");
    let has_config = cli.source.join("config.toml").exists();

    match cli.command {
        Command::Index => {
            let index = scan::scan_or_empty(&cli.source, &site_config);
            process::write_index(&index, &index_path)?;
            output::print_index_output(&index, &site_config.gallery.assets_dir, has_config);
        }
        Command::Thumbs { cache, clean } => {
            if clean {
                process::clean(&thumbs_dir)?;
            }
            run_thumbs(
                &index_path,
                &cli.source,
                &thumbs_dir,
                &site_config,
                !cache.no_cache,
            )?;
        }
        Command::Generate => {
            let result = generate::generate(
                &index_path,
                &cli.source,
                &thumbs_dir,
                &cli.output,
                &site_config,
            )?;
            output::print_generate_output(&result);
        }
        Command::Build(cache) => {
            println!("==> Stage 1: Indexing {}", cli.source.display());
            let index = scan::scan_or_empty(&cli.source, &site_config);
            process::write_index(&index, &index_path)?;
            output::print_index_output(&index, &site_config.gallery.assets_dir, has_config);

            println!("==> Stage 2: Rendering thumbnails");
            run_thumbs(
                &index_path,
                &cli.source,
                &thumbs_dir,
                &site_config,
                !cache.no_cache,
            )?;

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            let result = generate::generate(
                &index_path,
                &cli.source,
                &thumbs_dir,
                &cli.output,
                &site_config,
            )?;
            output::print_generate_output(&result);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let index = scan::scan(&cli.source, &site_config)?;
            output::print_index_output(&index, &site_config.gallery.assets_dir, has_config);
            println!("{}", output::format_totals(&index));
            println!("==> Content is valid");
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Render thumbnails with a printer thread streaming per-image progress,
/// then write the index back with the measured dimensions.
fn run_thumbs(
    index_path: &Path,
    content_root: &Path,
    thumbs_dir: &Path,
    site_config: &config::SiteConfig,
    use_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&site_config.processing);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(
        index_path,
        content_root,
        thumbs_dir,
        site_config,
        use_cache,
        Some(tx),
    )?;
    if printer.join().is_err() {
        tracing::warn!("progress printer thread panicked");
    }
    process::write_index(&result.index, index_path)?;
    println!("Thumbnails: {}", result.cache_stats);
    if result.failures != 0 {
        println!("Failed: {} image(s)", result.failures);
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
