use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use provglyph::fonts::CosmicTextMeasure;
use provglyph::raster::{svg_to_pdf, svg_to_png};
use provglyph::{EventConfig, Scene, Timeline, TreeTheme};
use tracing_subscriber::EnvFilter;

/// Render provenance tree nodes to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "provglyph")]
#[command(version)]
#[command(about = "Render provenance tree nodes to SVG, PNG or PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene file of positioned nodes
    Render {
        /// Scene file (.toml, .yaml, .yml or .json)
        #[arg(value_name = "SCENE")]
        scene: PathBuf,

        /// Output file path (extension determines format: .svg, .png or .pdf)
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Built-in theme name or path to an Alacritty/native theme file
        #[arg(short, long, value_name = "THEME")]
        theme: Option<String>,

        /// Glyph configuration file, replacing the scene's own
        #[arg(short, long, value_name = "GLYPHS")]
        glyphs: Option<PathBuf>,

        /// Freeze label opacity at this many milliseconds after mount
        #[arg(long, value_name = "MS")]
        at: Option<f64>,

        /// Raster scale multiplier for PNG output
        #[arg(long, default_value_t = 1.0)]
        png_scale: f32,

        /// Padding around the scene in pixels
        #[arg(long, default_value_t = 20.0)]
        padding: f32,
    },
    /// Validate a glyph configuration file
    CheckGlyphs {
        #[arg(value_name = "GLYPHS")]
        path: PathBuf,
    },
    /// List built-in themes
    Themes,
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), String> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            scene,
            output,
            theme,
            glyphs,
            at,
            png_scale,
            padding,
        } => render(RenderArgs {
            scene,
            output,
            theme,
            glyphs,
            at,
            png_scale,
            padding,
        }),
        Command::CheckGlyphs { path } => {
            let config = EventConfig::load(&path).map_err(|e| e.to_string())?;
            let types: Vec<&str> = config.event_types().collect();
            println!("{}: {} event type(s): {}", path.display(), types.len(), types.join(", "));
            Ok(())
        }
        Command::Themes => {
            for name in TreeTheme::list_builtins() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "provglyph", &mut std::io::stdout());
            Ok(())
        }
    }
}

struct RenderArgs {
    scene: PathBuf,
    output: PathBuf,
    theme: Option<String>,
    glyphs: Option<PathBuf>,
    at: Option<f64>,
    png_scale: f32,
    padding: f32,
}

fn render(args: RenderArgs) -> Result<(), String> {
    let theme = match args.theme.as_deref() {
        Some(name) => TreeTheme::load(name)?,
        None => TreeTheme::default(),
    };

    let mut scene = Scene::load(&args.scene).map_err(|e| e.to_string())?;
    if let Some(ref path) = args.glyphs {
        scene.event_config = Some(EventConfig::load(path).map_err(|e| e.to_string())?);
    }

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    // Raster backends ignore SMIL, so they get a frozen frame.
    let timeline = match (args.at, output_ext.as_str()) {
        (Some(ms), _) => Timeline::At(ms),
        (None, "svg") => Timeline::Animated,
        (None, _) => Timeline::At(f64::INFINITY),
    };
    tracing::debug!(?timeline, "rendering scene");

    let mut measure = CosmicTextMeasure::new();
    let svg = scene.render_document(&theme, timeline, &mut measure, args.padding);

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(&args.output, &svg)
                .map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", args.output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale).map_err(|e| e.to_string())?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", args.output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg).map_err(|e| e.to_string())?;
            std::fs::write(&args.output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", args.output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    Ok(())
}
