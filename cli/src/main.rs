use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use mlcanvas::config::{CanvasConfig, ConfigError};
use mlcanvas::engine::EngineCore;
use mlcanvas::geometry::{ImagePlacement, PlacementRequest, Point};
use mlcanvas::input::{DrawingMode, InputEvent};
use mlcanvas::inspect::Magnifier;
use mlcanvas::load::{self, ImageSize, ImageSource, LoadError};
use serde_json::Value;
use tracing::{debug, info};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid event on line {line}: {message}")]
    InvalidEvent { line: usize, message: String },
    #[error("point ({x}, {y}) is outside the placed image")]
    OffImage { x: f64, y: f64 },
    #[error("failed to write image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Parser, Debug)]
#[command(name = "mlcanvas-cli", about = "Offline tools for the annotation canvas")]
struct Cli {
    #[arg(long, env = "MLCANVAS_CANVAS_WIDTH", default_value_t = 800.0)]
    canvas_width: f64,

    #[arg(long, env = "MLCANVAS_CANVAS_HEIGHT", default_value_t = 600.0)]
    canvas_height: f64,

    #[arg(long, env = "MLCANVAS_CONFIG", help = "Canvas config JSON file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    canvas_width: f64,
    canvas_height: f64,
    config: CanvasConfig,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print image size and the placement it would get on the canvas.
    Info(InfoArgs),
    /// Run a JSONL input-event script and print the resulting shapes.
    Replay(ReplayArgs),
    /// Write the magnifier view around a canvas point as a PNG.
    Magnify(MagnifyArgs),
}

#[derive(Args, Debug)]
struct InfoArgs {
    image: PathBuf,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(long, help = "Image to place before replaying")]
    image: Option<PathBuf>,

    #[arg(long, value_enum, help = "Drawing mode (overrides the config file)")]
    mode: Option<ModeArg>,

    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    input: String,
}

#[derive(Args, Debug)]
struct MagnifyArgs {
    image: PathBuf,

    #[arg(long)]
    x: f64,

    #[arg(long)]
    y: f64,

    #[arg(long, help = "Output PNG path")]
    out: PathBuf,

    #[arg(long)]
    size: Option<u32>,

    #[arg(long)]
    zoom: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ModeArg {
    None,
    Rectangle,
    Polygon,
    Freestyle,
}

impl From<ModeArg> for DrawingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::None => Self::None,
            ModeArg::Rectangle => Self::Rectangle,
            ModeArg::Polygon => Self::Polygon,
            ModeArg::Freestyle => Self::Freestyle,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let ctx = CliContext {
        canvas_width: cli.canvas_width,
        canvas_height: cli.canvas_height,
        config: read_config(cli.config.as_deref())?,
    };

    match cli.command {
        Command::Info(args) => run_info(&ctx, args).await,
        Command::Replay(args) => run_replay(&ctx, args).await,
        Command::Magnify(args) => run_magnify(&ctx, args).await,
    }
}

fn read_config(path: Option<&Path>) -> Result<CanvasConfig, CliError> {
    let Some(path) = path else {
        return Ok(CanvasConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_owned(), source })?;
    let config = CanvasConfig::from_json(&raw)?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

async fn run_info(ctx: &CliContext, args: InfoArgs) -> Result<(), CliError> {
    let mut core = EngineCore::new(ctx.canvas_width, ctx.canvas_height, ctx.config.clone());
    let ImageSize { width, height } = core.add_image(ImageSource::Path(args.image), PlacementRequest::default()).await?;
    print_json(&serde_json::json!({
        "width": width,
        "height": height,
        "placement": core.placement(),
    }))
}

async fn run_replay(ctx: &CliContext, args: ReplayArgs) -> Result<(), CliError> {
    let mut config = ctx.config.clone();
    if let Some(mode) = args.mode {
        config.drawing_mode = mode.into();
    }
    let mut core = EngineCore::new(ctx.canvas_width, ctx.canvas_height, config);
    if let Some(image) = args.image {
        core.add_image(ImageSource::Path(image), PlacementRequest::default()).await?;
    }

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input).map_err(|source| CliError::Io { path: PathBuf::from(&args.input), source })?;
        Box::new(BufReader::new(file))
    };

    let mut replayed = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io { path: PathBuf::from(&args.input), source })?;
        let Some(event) = parse_event_line(&line, index + 1)? else {
            continue;
        };
        core.handle_input(&event);
        replayed += 1;
    }

    info!(events = replayed, shapes = core.drawn_shapes().len(), "replay finished");
    print_json(&serde_json::to_value(core.drawn_shapes())?)
}

fn parse_event_line(line: &str, line_no: usize) -> Result<Option<InputEvent>, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| CliError::InvalidEvent { line: line_no, message: e.to_string() })
}

async fn run_magnify(ctx: &CliContext, args: MagnifyArgs) -> Result<(), CliError> {
    let image = load::load_image(ImageSource::Path(args.image)).await?;
    let placement = ImagePlacement::fit(
        f64::from(image.width()),
        f64::from(image.height()),
        ctx.canvas_width,
        ctx.canvas_height,
        PlacementRequest::default(),
    );
    let mut magnifier = Magnifier::from_config(&ctx.config);
    if let Some(size) = args.size {
        magnifier.size = size;
    }
    if let Some(zoom) = args.zoom {
        magnifier.zoom = zoom;
    }

    let view = magnifier
        .view(&image, &placement, Point::new(args.x, args.y))
        .ok_or(CliError::OffImage { x: args.x, y: args.y })?;
    view.image.save(&args.out)?;
    info!(out = %args.out.display(), "magnifier written");
    print_json(&serde_json::json!({
        "imagePoint": view.image_point,
        "source": view.source,
        "center": view.center,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
