//! fog-rt: sphere ray caster with distance fog
//!
//! Renders a green sphere with two colored satellites, fading every hit by its
//! distance from the viewport plane.
//!
//! Usage:
//!   fog-rt render -o out.ppm      - Render one frame to a PPM file
//!   fog-rt interactive            - Adjust parameters live in the terminal
//!   fog-rt check-config           - Validate the configuration file

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fog_rt::{
    config::{AppConfig, StatsFormat},
    params::RenderParameters,
    stats::{format_stats, RenderStats},
    terminal::{frame_to_halfblock, parse_key_event, Action, TerminalDisplay},
    RenderSession, RenderWorker, Renderer, SceneLayout,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Orbit,
    Stacked,
}

impl From<LayoutArg> for SceneLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Orbit => SceneLayout::Orbit,
            LayoutArg::Stacked => SceneLayout::Stacked,
        }
    }
}

#[derive(Parser)]
#[command(name = "fog-rt")]
#[command(version = "0.1.0")]
#[command(about = "Sphere ray caster with distance fog")]
#[command(long_about = "
fog-rt casts one ray per pixel into a scene of three spheres and shades each
hit by its distance from the viewport plane:
  - Green central sphere with red and blue satellites
  - Orbit or stacked satellite layouts
  - PPM output or a live truecolor terminal view

Example usage:
  fog-rt render --config config.yaml -o frame.ppm
  fog-rt interactive --fog 40
")]
struct Cli {
    /// Path to config file (defaults to ./config.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Override render threads (0 = one per core, 1 = sequential)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single frame to a PPM file
    Render {
        /// Output file
        #[arg(short, long, default_value = "render.ppm")]
        output: PathBuf,

        #[command(flatten)]
        overrides: RenderOverrides,
    },

    /// Show frames in the terminal and adjust parameters with the keyboard
    Interactive {
        #[command(flatten)]
        overrides: RenderOverrides,
    },

    /// Validate configuration file
    CheckConfig,
}

/// Per-run overrides for the configured render parameters
#[derive(Debug, Default, Args)]
struct RenderOverrides {
    /// World units per output pixel
    #[arg(long)]
    pixel_size: Option<f64>,
    /// Distance of the viewport plane from the camera
    #[arg(long)]
    vp_distance: Option<f64>,
    /// Distance of the central sphere
    #[arg(long)]
    s_distance: Option<f64>,
    /// Central sphere radius
    #[arg(long)]
    s_r: Option<f64>,
    /// Fog distance
    #[arg(long)]
    fog: Option<f64>,
    /// Satellite rotation in degrees
    #[arg(long)]
    rot: Option<f64>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
}

impl RenderOverrides {
    fn apply(&self, config: &mut AppConfig) {
        let render = &mut config.render;
        if let Some(v) = self.pixel_size {
            render.pixel_size = v;
        }
        if let Some(v) = self.vp_distance {
            render.vp_distance = v;
        }
        if let Some(v) = self.s_distance {
            render.s_distance = v;
        }
        if let Some(v) = self.s_r {
            render.s_r = v;
        }
        if let Some(v) = self.fog {
            render.fog = v;
        }
        if let Some(v) = self.rot {
            render.rot = v;
        }
        if let Some(v) = self.width {
            render.width = v;
        }
        if let Some(v) = self.height {
            render.height = v;
        }
        if let Some(layout) = self.layout {
            config.scene.layout = layout.into();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Log lines would tear the interactive view, so it only reports warnings
    // unless asked otherwise
    let fallback = match &cli.command {
        Commands::Interactive { .. } => "warn",
        _ => "info",
    };
    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render { output, overrides } => {
            let mut config = load_config_or_exit(cli.config.as_deref());
            overrides.apply(&mut config);
            if let Some(threads) = cli.threads {
                config.threads = threads;
            }
            run_render(&config, &output)?;
        }
        Commands::Interactive { overrides } => {
            let mut config = load_config_or_exit(cli.config.as_deref());
            overrides.apply(&mut config);
            if let Some(threads) = cli.threads {
                config.threads = threads;
            }
            run_interactive(&config)?;
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Render one frame and write it as PPM
fn run_render(config: &AppConfig, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = Renderer::new(config.threads)?;
    let mut session = RenderSession::new(renderer, config.scene.layout);

    tracing::info!(
        width = config.render.width,
        height = config.render.height,
        layout = ?config.scene.layout,
        "Rendering frame"
    );

    let out = session.render(&config.render)?;
    out.frame.save_ppm(output)?;

    tracing::info!(path = %output.display(), bytes = out.frame.as_bytes().len(), "Frame written");
    log_stats(config, &out.stats);

    Ok(())
}

fn log_stats(config: &AppConfig, stats: &RenderStats) {
    if !config.stats.enabled {
        return;
    }
    let formatted = format_stats(stats, config.stats.format);
    if config.stats.format == StatsFormat::Compact {
        tracing::info!("{}", formatted);
    } else {
        tracing::info!("\n{}", formatted);
    }
}

/// Live terminal viewer. Renders run on the background worker so key input
/// stays responsive while a frame is in flight.
fn run_interactive(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = Renderer::new(config.threads)?;
    let mut worker = RenderWorker::spawn(RenderSession::new(renderer, config.scene.layout))?;
    let mut terminal = TerminalDisplay::new()?;

    let mut params = config.render;
    let (width, height) = terminal.frame_size();
    params.width = width;
    params.height = height;

    let mut layout = config.scene.layout;
    let mut layout_changed = false;
    let mut dirty = true;
    let mut content = String::new();

    'main_loop: loop {
        if terminal.check_resize() {
            let (width, height) = terminal.frame_size();
            params.width = width;
            params.height = height;
            dirty = true;
        }

        match terminal.poll_input(Duration::from_millis(16)) {
            Ok(Some(key)) => match parse_key_event(key) {
                Action::Quit => break 'main_loop,
                Action::Adjust(slider, steps) => {
                    params.adjust(slider, steps);
                    dirty = true;
                }
                Action::Reset => {
                    params = RenderParameters {
                        width: params.width,
                        height: params.height,
                        ..config.render
                    };
                    dirty = true;
                }
                Action::ToggleLayout => {
                    layout = match layout {
                        SceneLayout::Orbit => SceneLayout::Stacked,
                        SceneLayout::Stacked => SceneLayout::Orbit,
                    };
                    layout_changed = true;
                    dirty = true;
                }
                Action::None => {}
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read input"),
        }

        if dirty {
            if layout_changed {
                worker.submit_with_layout(params, layout)?;
                layout_changed = false;
            } else {
                worker.submit(params)?;
            }
            dirty = false;
        }

        if let Some(reply) = worker.try_latest()? {
            let status = match reply.result {
                Ok(out) => {
                    content = frame_to_halfblock(&out.frame);
                    status_line(&params, layout, &format!("{:.1}ms", out.stats.duration_ms))
                }
                Err(e) => status_line(&params, layout, &format!("error: {}", e)),
            };
            if let Err(e) = terminal.render(&content, &status) {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    break 'main_loop;
                }
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn status_line(params: &RenderParameters, layout: SceneLayout, detail: &str) -> String {
    format!(
        "px {:.3} vp {:.2} dist {:.0} r {:.0} fog {:.0} rot {:.0} {:?} | {} | p/P v/V d/D s/S f/F <-/-> l r q",
        params.pixel_size,
        params.vp_distance,
        params.s_distance,
        params.s_r,
        params.fog,
        params.rot,
        layout,
        detail,
    )
}

/// Validate configuration file
fn check_config(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let result = AppConfig::load_or_default(config_path).and_then(|config| {
        config.validate()?;
        Ok(config)
    });

    match result {
        Ok(config) => {
            println!("✓ Configuration is valid\n");
            println!("Render:");
            println!("  Size: {}x{}", config.render.width, config.render.height);
            println!("  Pixel size: {}", config.render.pixel_size);
            println!("  Viewport distance: {}", config.render.vp_distance);
            println!("  Sphere distance: {}", config.render.s_distance);
            println!("  Sphere radius: {}", config.render.s_r);
            println!("  Fog: {}", config.render.fog);
            println!("  Rotation: {}", config.render.rot);
            println!("\nScene:");
            println!("  Layout: {:?}", config.scene.layout);
            println!("\nThreads: {}", match config.threads {
                0 => "one per core".to_string(),
                1 => "sequential".to_string(),
                n => n.to_string(),
            });
            println!("\nStats:");
            println!("  Enabled: {}", config.stats.enabled);
            println!("  Format: {:?}", config.stats.format);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load configuration or exit with error
fn load_config_or_exit(config_path: Option<&Path>) -> AppConfig {
    match AppConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            eprintln!("\nYou can copy config.yaml.default and modify it:");
            eprintln!("  cp config.yaml.default config.yaml");
            std::process::exit(1);
        }
    }
}
