//! radcal CLI - Landsat radiometric calibration

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use radcal_algorithms::atmosphere::{dos_correction, DosParams};
use radcal_algorithms::imagery::ndvi;
use radcal_algorithms::radiometry::{brightness_temperature, radiance, reflectance, BandContext};
use radcal_algorithms::thermal::{surface_temperature, AtmosphericProfile, Emissivity};
use radcal_core::io::{read_geotiff, save_as_georaster};
use radcal_core::{BandSelector, Raster, SceneMetadata};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "radcal")]
#[command(author, version, about = "Landsat radiometric calibration", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Band raster, output and the metadata needed to calibrate it
#[derive(Args)]
struct BandArgs {
    /// Band raster with digital numbers
    band: PathBuf,
    /// Output file
    output: PathBuf,
    /// Scene metadata (JSON)
    #[arg(short, long)]
    metadata: PathBuf,
    /// Band number in the metadata; 0 or omitted matches on file name
    #[arg(short, long)]
    band_number: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// At-sensor spectral radiance
    Radiance {
        #[command(flatten)]
        band: BandArgs,
    },
    /// Top-of-atmosphere reflectance (reflective bands)
    Reflectance {
        #[command(flatten)]
        band: BandArgs,
    },
    /// At-sensor brightness temperature in Celsius (thermal bands)
    BrightnessTemperature {
        #[command(flatten)]
        band: BandArgs,
    },
    /// Surface reflectance by dark-object subtraction (reflective bands)
    Dos {
        #[command(flatten)]
        band: BandArgs,
        /// Radiance percentile taken as the dark object
        #[arg(long, default_value = "0.01")]
        percentile: f64,
        /// Reflectance assumed for the dark object
        #[arg(long, default_value = "0.01")]
        reference_reflectance: f64,
    },
    /// Land-surface temperature in Kelvin (thermal bands)
    Lst {
        #[command(flatten)]
        band: BandArgs,
        /// Upwelling atmospheric radiance
        #[arg(long)]
        upwelling: f64,
        /// Downwelling atmospheric radiance
        #[arg(long)]
        downwelling: f64,
        /// Atmospheric transmittance
        #[arg(long)]
        transmittance: f64,
        /// Land-surface emissivity raster
        #[arg(long, conflicts_with = "ndvi", required_unless_present = "ndvi")]
        emissivity: Option<PathBuf>,
        /// NDVI raster; emissivity is estimated from it
        #[arg(long)]
        ndvi: Option<PathBuf>,
    },
    /// NDVI from NIR and red reflectance rasters
    Ndvi {
        /// Near-infrared reflectance
        nir: PathBuf,
        /// Red reflectance
        red: PathBuf,
        /// Output file
        output: PathBuf,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_raster(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path, None)
        .with_context(|| format!("Failed to read raster {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn open_band(args: &BandArgs) -> Result<BandContext> {
    let scene = SceneMetadata::from_json_file(&args.metadata)
        .with_context(|| format!("Failed to read metadata {}", args.metadata.display()))?;
    let selector = BandSelector::from_number_or_path(args.band_number.as_deref(), args.band.clone());

    let pb = spinner("Reading band...");
    let ctx = BandContext::open(&args.band, &scene, &selector)
        .with_context(|| format!("Failed to open {}", selector))?;
    pb.finish_and_clear();

    let (rows, cols) = ctx.shape();
    info!("Input: {} x {} ({} band)", cols, rows, ctx.band_type());
    Ok(ctx)
}

fn write_result(ctx: &BandContext, raster: &Raster<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    ctx.save(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            if !raster.is_empty() {
                println!(
                    "  Valid cells: {} ({:.1}%)",
                    stats.valid_count,
                    100.0 * stats.valid_count as f64 / raster.len() as f64
                );
            }
        }

        Commands::Radiance { band } => {
            let ctx = open_band(&band)?;
            let start = Instant::now();
            let result = radiance(&ctx).context("Failed to compute radiance")?;
            let elapsed = start.elapsed();
            write_result(&ctx, &result, &band.output)?;
            done("Radiance", &band.output, elapsed);
        }

        Commands::Reflectance { band } => {
            let ctx = open_band(&band)?;
            let start = Instant::now();
            let result = reflectance(&ctx, None).context("Failed to compute reflectance")?;
            let elapsed = start.elapsed();
            write_result(&ctx, &result, &band.output)?;
            done("Reflectance", &band.output, elapsed);
        }

        Commands::BrightnessTemperature { band } => {
            let ctx = open_band(&band)?;
            let start = Instant::now();
            let result =
                brightness_temperature(&ctx).context("Failed to compute brightness temperature")?;
            let elapsed = start.elapsed();
            write_result(&ctx, &result, &band.output)?;
            done("Brightness temperature", &band.output, elapsed);
        }

        Commands::Dos {
            band,
            percentile,
            reference_reflectance,
        } => {
            let ctx = open_band(&band)?;
            let params = DosParams {
                dark_object_percentile: percentile,
                dark_object_reflectance: reference_reflectance,
            };
            let start = Instant::now();
            let l = radiance(&ctx).context("Failed to compute radiance")?;
            let result =
                dos_correction(&ctx, &l, &params).context("Failed to apply dark-object subtraction")?;
            let elapsed = start.elapsed();
            write_result(&ctx, &result, &band.output)?;
            done("DOS reflectance", &band.output, elapsed);
        }

        Commands::Lst {
            band,
            upwelling,
            downwelling,
            transmittance,
            emissivity,
            ndvi,
        } => {
            let ctx = open_band(&band)?;
            let atmosphere = AtmosphericProfile {
                upwelling_radiance: upwelling,
                downwelling_radiance: downwelling,
                transmittance,
            };
            let (source, from_ndvi) = match (emissivity, ndvi) {
                (Some(path), _) => (read_raster(&path)?, false),
                (None, Some(path)) => (read_raster(&path)?, true),
                (None, None) => anyhow::bail!("Either --emissivity or --ndvi is required"),
            };
            let lse = if from_ndvi {
                Emissivity::FromNdvi(&source)
            } else {
                Emissivity::Raster(&source)
            };

            let start = Instant::now();
            let result = surface_temperature(&ctx, lse, &atmosphere)
                .context("Failed to retrieve land-surface temperature")?;
            let elapsed = start.elapsed();
            write_result(&ctx, &result, &band.output)?;
            done("Land-surface temperature", &band.output, elapsed);
        }

        Commands::Ndvi { nir, red, output } => {
            let nir_band = read_raster(&nir)?;
            let red_band = read_raster(&red)?;
            let start = Instant::now();
            let result = ndvi(&nir_band, &red_band).context("Failed to compute NDVI")?;
            let elapsed = start.elapsed();

            let pb = spinner("Writing output...");
            save_as_georaster(&result, &output, &nir_band).context("Failed to write output")?;
            pb.finish_and_clear();
            done("NDVI", &output, elapsed);
        }
    }

    Ok(())
}
