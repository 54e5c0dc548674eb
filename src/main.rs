use clap::{Parser, Subcommand};
use simple_shrink::config::{self, DEFAULT_MAX_SIZE_BYTES, ShrinkConfig};
use simple_shrink::imaging::RustBackend;
use simple_shrink::process::{self, WebpOptions};
use simple_shrink::request::{ShrinkRequest, handle_request};
use simple_shrink::sink::TracingSink;
use simple_shrink::{batch, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-shrink")]
#[command(about = "Resize and compress images to fit a size budget")]
#[command(long_about = "\
Resize and compress images to fit a size budget

Landscape images are capped at a maximum width; portrait images are set to a
fixed width. Images over the byte budget are re-encoded with a JPEG quality
derived from how far over budget they are. Images that already fit are copied
unchanged.

Settings are read from shrink.toml when present; flags override the file.
Progress is logged to stderr (filter with RUST_LOG). --json writes the result
record to stdout.

Run 'simple-shrink gen-config' to generate a documented shrink.toml.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags that override values from `shrink.toml`.
#[derive(clap::Args, Clone)]
struct ConfigArgs {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "shrink.toml")]
    config: PathBuf,

    /// Max width for landscape images
    #[arg(long)]
    landscape_width: Option<u32>,

    /// Leave narrower landscape images at their size
    #[arg(long, value_name = "BOOL")]
    landscape_keep_small: Option<bool>,

    /// Width portrait images are set to
    #[arg(long)]
    portrait_width: Option<u32>,

    /// Leave narrower portrait images at their size
    #[arg(long, value_name = "BOOL")]
    portrait_keep_small: Option<bool>,

    /// Write lossless PNG instead of JPEG
    #[arg(long)]
    lossless: bool,

    /// Base JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Re-encode even images that already fit
    #[arg(long)]
    no_skip: bool,

    /// Baseline JPEG with the linear quality curve
    #[arg(long)]
    standard: bool,

    /// Output size budget in KB
    #[arg(long)]
    max_size_kb: Option<u64>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<ShrinkConfig, config::ConfigError> {
        let mut config = config::load_config(&self.config)?;
        let sizes = &mut config.sizes;
        if let Some(w) = self.landscape_width {
            sizes.landscape_width = w;
        }
        if let Some(keep) = self.landscape_keep_small {
            sizes.landscape_keep_small = keep;
        }
        if let Some(w) = self.portrait_width {
            sizes.portrait_width = w;
        }
        if let Some(keep) = self.portrait_keep_small {
            sizes.portrait_keep_small = keep;
        }

        let compression = &mut config.compression;
        if self.lossless {
            compression.use_lossless = true;
        }
        if let Some(q) = self.quality {
            compression.jpeg_quality = q;
        }
        if self.no_skip {
            compression.skip_if_optimal = false;
        }
        if self.standard {
            compression.use_advanced_compression = false;
        }
        if let Some(kb) = self.max_size_kb {
            compression.max_size_bytes = kb.saturating_mul(1024);
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Shrink one image, or every image in a directory
    Run {
        /// Input file or directory
        input: PathBuf,
        /// Output file or directory
        output: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
        /// Print the outcome (or batch summary) as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Convert one image to WebP at its original size
    Webp {
        input: PathBuf,
        /// Output path (extension is replaced with .webp)
        output: PathBuf,
        /// Lossy quality (1-100)
        #[arg(long, default_value_t = 85)]
        quality: u32,
        #[arg(long)]
        lossless: bool,
        /// Size budget in KB the result is checked against
        #[arg(long, default_value_t = DEFAULT_MAX_SIZE_BYTES / 1024)]
        max_size_kb: u64,
        #[arg(long)]
        json: bool,
    },
    /// Run a JSON request file and print the JSON response
    Request {
        /// Path to a request file
        file: PathBuf,
    },
    /// Print a stock shrink.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(false)
        .without_time()
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let backend = RustBackend::new();
    let sink = TracingSink;

    match cli.command {
        Command::Run {
            input,
            output: target,
            config,
            json,
        } => {
            let config = config.resolve()?;
            tracing::info!("Settings: {}", output::describe_settings(&config));

            if input.is_dir() {
                let summary =
                    batch::transform_directory(&backend, &input, &target, &config, &sink)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                if summary.failed() > 0 {
                    return Err(format!(
                        "{} of {} files failed",
                        summary.failed(),
                        summary.total_files
                    )
                    .into());
                }
            } else {
                let outcome = process::transform_image(&backend, &input, &target, &config, &sink)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
            }
        }
        Command::Webp {
            input,
            output,
            quality,
            lossless,
            max_size_kb,
            json,
        } => {
            let options = WebpOptions {
                quality,
                lossless,
                max_size_bytes: max_size_kb.saturating_mul(1024),
            };
            let outcome = process::convert_to_webp(&backend, &input, &output, &options, &sink)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Command::Request { file } => {
            let content = std::fs::read_to_string(&file)?;
            let request: ShrinkRequest = serde_json::from_str(&content)?;
            let response = handle_request(&backend, &request, &sink);
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
