//! spmpix CLI - Command-line interface for scanning probe microscopy sessions.
//!
//! Triage a data directory of metadata, raw channel and preview bitmap files,
//! annotate single bitmaps, and tile annotated figures into slide pages.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use spmpix_core::metadata::X_PIXELS_KEY;
use spmpix_core::{Metadata, PipelineConfig, SlideDeckConfig};
use spmpix_io::{
    batch_process_directory, check_channel_file, export_slides, read_metadata_file,
    render_annotation, BatchOptions, ChannelCheck,
};
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    SpmpixIo(#[from] spmpix_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] spmpix_core::Error),

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

/// Scanning probe microscopy session processor.
#[derive(Parser)]
#[command(name = "spmpix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every metadata file in a data directory
    Process {
        /// Directory holding metadata, channel and bitmap files
        data_dir: PathBuf,

        /// Channel keyword (repeatable, replaces the defaults)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Output directory name inside the data directory
        #[arg(long, default_value = "Processed")]
        output_subdir: String,

        /// JSON pipeline configuration; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scan width (nm) for metadata files without XScanRange
        #[arg(long)]
        fallback_scan_range: Option<f64>,

        /// Square canvas size of annotated figures (pixels)
        #[arg(long)]
        canvas_size: Option<u32>,

        /// Annotation font size (pixels)
        #[arg(long)]
        font_size: Option<u32>,

        /// TrueType font for annotations
        #[arg(long)]
        font: Option<PathBuf>,

        /// Process metadata files in parallel
        #[arg(long)]
        parallel: bool,

        /// Also export slide pages with this many images per page
        #[arg(long)]
        slides: Option<usize>,
    },

    /// Parse a metadata file and print its parameters and channels
    Inspect {
        /// Metadata file
        metadata: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a channel file is informative
    Check {
        /// Raw channel file
        channel: PathBuf,

        /// Channel width in pixels
        #[arg(long)]
        width: u32,

        /// Channel height in pixels
        #[arg(long)]
        height: u32,
    },

    /// Annotate one bitmap in place
    Annotate {
        /// Bitmap to overwrite with the annotated canvas
        bitmap: PathBuf,

        /// Physical scan width (nm); defaults to the metadata value
        #[arg(long)]
        scan_range: Option<f64>,

        /// Raw channel width (pixels); defaults to the metadata value
        #[arg(long)]
        pixel_width: Option<u32>,

        /// Metadata file supplying the text box parameters
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// JSON pipeline configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Tile the bitmaps of a directory into slide pages
    Slides {
        /// Directory of (annotated) bitmaps
        image_dir: PathBuf,

        /// Directory for slide_001.png, slide_002.png, ...
        #[arg(short, long)]
        output: PathBuf,

        /// Images per page: 1, 2, 4, 6 or 9
        #[arg(short = 'n', long, default_value = "4")]
        images_per_slide: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Process {
            data_dir,
            keywords,
            output_subdir,
            config,
            fallback_scan_range,
            canvas_size,
            font_size,
            font,
            parallel,
            slides,
        } => {
            let mut config = load_config(config.as_deref())?;
            if !keywords.is_empty() {
                config = config.with_keywords(keywords);
            }
            if let Some(scan_range_nm) = fallback_scan_range {
                config = config.with_fallback_scan_range(scan_range_nm);
            }
            let mut annotation = config.annotation.clone();
            if let Some(size) = canvas_size {
                annotation = annotation.with_canvas_size(size, size);
            }
            if let Some(size) = font_size {
                annotation = annotation.with_font_size(size);
            }
            if let Some(path) = font {
                annotation = annotation.with_font_path(path);
            }
            annotation.validate()?;
            let config = config.with_annotation(annotation);

            let options = BatchOptions::default()
                .with_output_subdir(output_subdir)
                .with_parallel(parallel);

            log::debug!("Keywords: {:?}", config.keywords);
            let start = Instant::now();
            let summary = batch_process_directory(&data_dir, &options, &config)?;

            print!("{summary}");
            println!(
                "Processed {} metadata file(s) in {:.2}s, output in {}",
                summary.reports.len(),
                start.elapsed().as_secs_f64(),
                summary.output_dir.display()
            );

            if let Some(images_per_slide) = slides {
                let deck = SlideDeckConfig::default().with_images_per_slide(images_per_slide);
                let pages = export_slides(
                    &summary.output_dir,
                    &summary.output_dir.join("slides"),
                    &deck,
                )?;
                println!("Slide pages: {}", pages.len());
            }
        }

        Commands::Inspect { metadata, json } => {
            let parsed = read_metadata_file(&metadata)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print_metadata(&metadata, &parsed);
            }
        }

        Commands::Check {
            channel,
            width,
            height,
        } => {
            let check = check_channel_file(&channel, width, height);
            println!("{}: {check}", channel.display());
            if let ChannelCheck::SizeMismatch { expected, .. } = check {
                log::debug!("{width} x {height} x 4 = {expected} bytes expected");
            }
            if !check.is_informative() {
                std::process::exit(2);
            }
        }

        Commands::Annotate {
            bitmap,
            scan_range,
            pixel_width,
            metadata,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let parsed = match metadata {
                Some(path) => read_metadata_file(&path)?,
                None => Metadata::default(),
            };

            let scan_range_nm =
                scan_range.unwrap_or_else(|| parsed.scan_range_nm(config.fallback_scan_range_nm));
            let pixel_width = pixel_width
                .or_else(|| parsed.params.pixel_count(X_PIXELS_KEY))
                .ok_or_else(|| {
                    CliError::Usage(format!(
                        "--pixel-width is required when the metadata has no {X_PIXELS_KEY}"
                    ))
                })?;

            let report = render_annotation(
                &bitmap,
                scan_range_nm,
                pixel_width,
                &parsed.params,
                &config.annotation,
            )?;
            println!(
                "{}: {}x{} canvas, {} nm scale bar",
                bitmap.display(),
                report.canvas_width,
                report.canvas_height,
                report.scale_bar.length_nm
            );
        }

        Commands::Slides {
            image_dir,
            output,
            images_per_slide,
        } => {
            let deck = SlideDeckConfig::default().with_images_per_slide(images_per_slide);
            let pages = export_slides(&image_dir, &output, &deck)?;
            for page in &pages {
                println!("{}", page.display());
            }
        }
    }

    Ok(())
}

/// Load a JSON pipeline configuration, or the defaults without a file.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn print_metadata(path: &Path, metadata: &Metadata) {
    println!("File: {}", path.display());
    match metadata.pixel_dimensions() {
        Some((width, height)) => println!("Pixels: {width} x {height}"),
        None => println!("Pixels: missing"),
    }
    println!("Parameters: {}", metadata.params.len());
    for (key, value) in metadata.params.iter() {
        println!("  {key}: {value}");
    }
    println!("Channels: {}", metadata.channels.len());
    for channel in &metadata.channels {
        println!("  {channel}");
    }
}
