//! armor-detector CLI: run the armor plate detector on a single image.

use armor_detector::core::LightColor;
use armor_detector::debug::draw_results;
use armor_detector::detect::{gray_to_image, rgb_view};
use armor_detector::io::{DetectConfig, DetectReport, NumberClassifierConfig};
use armor_detector::number::NumberClassifierParams;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "armor-detector")]
#[command(about = "Detect armor plates (paired light bars) in RGB images")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect armors in an image and print a JSON report.
    Detect(CliDetectArgs),

    /// Print the default JSON config.
    DefaultConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorArg {
    Red,
    Blue,
}

impl From<ColorArg> for LightColor {
    fn from(c: ColorArg) -> Self {
        match c {
            ColorArg::Red => LightColor::Red,
            ColorArg::Blue => LightColor::Blue,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct CliDetectArgs {
    /// Input image (overrides `image_path` from the config).
    image: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Light color to pair.
    #[arg(long, value_enum)]
    color: Option<ColorArg>,

    /// Binarization threshold (gray levels above it are foreground).
    #[arg(long)]
    threshold: Option<u8>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the frame with lights and armors drawn on top.
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Write the binary mask.
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Write the stacked numeral patches.
    #[arg(long)]
    numbers: Option<PathBuf>,

    /// Numeral classifier model (JSON MLP).
    #[arg(long, requires = "labels")]
    model: Option<PathBuf>,

    /// Numeral classifier labels, one per line.
    #[arg(long, requires = "model")]
    labels: Option<PathBuf>,
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

impl CliDetectArgs {
    fn apply(&self, cfg: &mut DetectConfig) {
        if let Some(image) = &self.image {
            cfg.image_path = Some(path_string(image));
        }
        if let Some(color) = self.color {
            cfg.params.detect_color = color.into();
        }
        if let Some(threshold) = self.threshold {
            cfg.params.binary_threshold = threshold;
        }
        for (target, arg) in [
            (&mut cfg.report_path, &self.report),
            (&mut cfg.overlay_path, &self.overlay),
            (&mut cfg.binary_path, &self.binary),
            (&mut cfg.numbers_path, &self.numbers),
        ] {
            if let Some(p) = arg {
                *target = Some(path_string(p));
            }
        }
        if let (Some(model), Some(labels)) = (&self.model, &self.labels) {
            let params = cfg
                .number_classifier
                .take()
                .map(|nc| nc.params)
                .unwrap_or_else(NumberClassifierParams::default);
            cfg.number_classifier = Some(NumberClassifierConfig {
                model_path: path_string(model),
                label_path: path_string(labels),
                params,
            });
        }
    }
}

fn init_logging(verbose: u8) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        armor_detector::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        armor_detector::core::init_with_level(level)?;
    }
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&DetectConfig::default())?);
            Ok(())
        }
    }
}

fn run_detect(args: &CliDetectArgs) -> CliResult<()> {
    let mut cfg = match &args.config {
        Some(path) => DetectConfig::load_json(path)?,
        None => DetectConfig::default(),
    };
    args.apply(&mut cfg);

    let image_path = cfg
        .image_path
        .clone()
        .ok_or("no input image: pass IMAGE or set image_path in the config")?;
    info!("loading image: {image_path}");
    let img = image::open(&image_path)?.to_rgb8();
    let (w, h) = (img.width() as usize, img.height() as usize);

    let mut detector = cfg.build_detector()?;
    let armors = detector.detect(&rgb_view(&img));
    info!(
        "{}x{}: {} lights, {} armors",
        w,
        h,
        detector.lights().len(),
        armors.len()
    );
    for armor in &armors {
        if armor.classification_result.is_empty() {
            info!("{:?} armor at {:?}", armor.armor_type, armor.center);
        } else {
            info!(
                "{:?} armor at {:?}: {}",
                armor.armor_type, armor.center, armor.classification_result
            );
        }
    }

    let report = DetectReport::from_detector(&detector, Some(image_path), w, h);
    match cfg.report_path() {
        Some(path) => {
            report.write_json(&path)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &cfg.overlay_path {
        let mut canvas = img.clone();
        draw_results(&mut canvas, detector.lights(), detector.armors());
        canvas.save(path)?;
    }
    if let Some(path) = &cfg.binary_path {
        gray_to_image(detector.binary_image()).save(path)?;
    }
    if let Some(path) = &cfg.numbers_path {
        gray_to_image(&detector.all_numbers_image()).save(path)?;
    }
    Ok(())
}
