//! sheetpix CLI - pull row-named pictures out of Excel workbooks
//!
//! Extracts the images anchored in one worksheet column and names each one
//! after a cell in the same row.

use clap::Parser;
use clap::Subcommand;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sheetpix::normalize::safe_folder_name;
use sheetpix::{column::index_to_column_letter, ImageBundler, ImageExtractor, Settings};
use std::fs;
use std::path::{Path, PathBuf};

/// Extract named images from Excel workbooks
#[derive(Parser)]
#[command(
    name = "sheetpix",
    author = "iyulab",
    version,
    about = "Extract named images from Excel workbooks",
    long_about = "sheetpix - pull the pictures out of an Excel column and name them.\n\n\
                  Images anchored in one column of the first worksheet are paired with\n\
                  the text of another column in the same row."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract images into a ZIP bundle (or PNG files with --png)
    Extract {
        /// Input .xlsx files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Column holding the pictures (e.g. B)
        #[arg(short, long)]
        image_column: String,

        /// Column holding the names (e.g. C)
        #[arg(short, long)]
        name_column: String,

        /// Output path: ZIP file, or directory with --png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when a workbook has more images than this (0 = unlimited)
        #[arg(long)]
        max_images: Option<usize>,

        /// Write uniquely named PNG files instead of a ZIP bundle
        #[arg(long)]
        png: bool,
    },

    /// Show the first worksheet's drawing and picture anchors
    Inspect {
        /// Input .xlsx file
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Extract {
            inputs,
            image_column,
            name_column,
            output,
            max_images,
            png,
        } => {
            let mut settings = Settings::from_env();
            if max_images.is_some() {
                settings = settings.with_max_images(max_images);
            }

            if png {
                extract_png(&inputs, &image_column, &name_column, output, &settings)?;
            } else {
                extract_bundle(&inputs, &image_column, &name_column, output, &settings)?;
            }
        }

        Commands::Inspect { input, json } => {
            let pb = create_spinner("Reading workbook...");
            let extractor = ImageExtractor::open(&input)?;
            let drawing = extractor.drawing_path()?;
            let anchors = extractor.anchors()?;
            let images = extractor.anchored_images()?;
            pb.finish_and_clear();

            if json {
                let value = serde_json::json!({
                    "file": display_name(&input),
                    "sheet": extractor.sheet_parts(),
                    "drawing": drawing,
                    "anchors": anchors,
                    "images": images,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            let sheet = extractor.sheet_parts();
            println!("{}", "Workbook Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "File".bold(), display_name(&input));
            println!("{}: {}", "Sheet".bold(), sheet.name);
            println!("{}: {}", "Sheet part".bold(), sheet.xml_path);
            println!(
                "{}: {}",
                "Drawing".bold(),
                drawing.as_deref().unwrap_or("(none)")
            );
            println!("{}: {}", "Anchors".bold(), anchors.len());

            if !images.is_empty() {
                println!("\n{}", "Pictures".cyan().bold());
                println!("{}", "─".repeat(40));
                for img in &images {
                    println!(
                        "  {}{:<6} {}",
                        index_to_column_letter(img.col),
                        img.row + 1,
                        img.media_path
                    );
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn extract_bundle(
    inputs: &[PathBuf],
    image_column: &str,
    name_column: &str,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut bundler = ImageBundler::new(settings);
    let pb = create_spinner("Extracting images...");

    for input in inputs {
        let name = display_name(input);
        pb.set_message(format!("Extracting {}...", name));
        let data = fs::read(input)?;

        match bundler
            .try_process_workbook(&name, &data, image_column, name_column)
            .map_err(|e| format!("{}: {}", name, e))?
        {
            Some(count) => pb.println(format!("{} {}: {} images", "✓".green().bold(), name, count)),
            None => pb.println(format!(
                "{} {}: no images in column {}",
                "!".yellow().bold(),
                name,
                image_column.to_uppercase()
            )),
        }
    }

    if bundler.workbook_count() == 0 {
        pb.finish_and_clear();
        return Err(sheetpix::Error::NoImagesFound.into());
    }

    pb.set_message("Writing bundle...");
    let summary = bundler.summary();
    let bytes = bundler.finish()?;
    let path = output.unwrap_or_else(|| default_bundle_path(inputs));
    fs::write(&path, bytes)?;
    pb.finish_and_clear();

    println!(
        "{} Bundled {} images to {} ({} saved, {} duplicate)",
        "✓".green().bold(),
        summary.processed,
        path.display(),
        summary.saved,
        summary.duplicate
    );
    Ok(())
}

fn extract_png(
    inputs: &[PathBuf],
    image_column: &str,
    name_column: &str,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    for (index, input) in inputs.iter().enumerate() {
        let name = display_name(input);
        let len = fs::metadata(input)?.len();
        settings.check_workbook(&name, len, index)?;

        let pb = create_spinner(&format!("Extracting {}...", name));
        let data = fs::read(input)?;
        let images = sheetpix::extract_png_images(&data, image_column, name_column, settings.max_images)
            .map_err(|e| format!("{}: {}", name, e))?;

        // One folder per workbook when several are given
        let dir = match (&output, inputs.len()) {
            (Some(out), 1) => out.clone(),
            (Some(out), _) => out.join(safe_folder_name(&name)),
            (None, _) => PathBuf::from(safe_folder_name(&name)),
        };
        fs::create_dir_all(&dir)?;
        for image in &images {
            image.save_to(dir.join(&image.filename))?;
        }

        pb.finish_and_clear();
        if images.is_empty() {
            println!(
                "{} {}: no images in column {}",
                "!".yellow().bold(),
                name,
                image_column.to_uppercase()
            );
        } else {
            println!(
                "{} Extracted {} images to {}",
                "✓".green().bold(),
                images.len(),
                dir.display()
            );
        }
    }
    Ok(())
}

fn default_bundle_path(inputs: &[PathBuf]) -> PathBuf {
    match inputs {
        [single] => PathBuf::from(format!("{}_images.zip", safe_folder_name(&display_name(single)))),
        _ => PathBuf::from("images.zip"),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn print_version() {
    println!("{} {}", "sheetpix".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Extract row-anchored images from Excel workbooks");
    println!();
    println!("Supported formats: XLSX");
    println!("Environment: SHEETPIX_MAX_UPLOAD_MB, SHEETPIX_MAX_IMAGES, SHEETPIX_MAX_FILES");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
