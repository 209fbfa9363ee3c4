use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use neoncap::builder::RenderSettings;
use neoncap::compile::{compile, CompileOptions, Compiled};
use neoncap::engine::{self, EncodeConfig, DEFAULT_DURATION};
use neoncap::job::load_job;
use neoncap::palette::Palette;
use neoncap::spec::{BackgroundMode, EffectSpec, GlowStyle};

#[derive(Debug, Parser)]
#[command(name = "neoncap")]
#[command(about = "Neon caption compiler for video")]
#[command(version, long_version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compile the caption effect and run ffmpeg over the input video.
    Render {
        input: PathBuf,
        output: PathBuf,
        text: String,
        #[command(flatten)]
        effect: EffectArgs,
        /// Treat unknown colors and missing fonts as errors.
        #[arg(long)]
        strict: bool,
        /// Print the engine command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the compiled descriptor without touching any file.
    Explain {
        text: String,
        #[command(flatten)]
        effect: EffectArgs,
        #[arg(long)]
        strict: bool,
        /// Emit a stable JSON object instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Run a render described by a JSON job file.
    Job {
        file: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        dry_run: bool,
    },
    /// List the color names of a palette.
    Colors {
        #[arg(long, default_value = "electric")]
        palette: String,
    },
}

#[derive(Debug, Args)]
struct EffectArgs {
    /// Caption color name; unknown names fall back to white unless --strict.
    #[arg(long, default_value = "white")]
    color: String,
    /// Horizontal position, 0 = left edge, 1 = right edge.
    #[arg(long, default_value_t = 0.5)]
    x: f64,
    /// Vertical position, 0 = top edge, 1 = bottom edge.
    #[arg(long, default_value_t = 0.7)]
    y: f64,
    /// Font size in pixels; estimated from the text length when omitted.
    #[arg(long)]
    size: Option<u32>,
    /// Glow style: shadow, clean-split, multi-layer, blend, enhanced.
    #[arg(long, default_value = "clean-split")]
    style: String,
    /// Layer count for the multi-layer style.
    #[arg(long)]
    layers: Option<u8>,
    /// Crop to fit instead of compositing over a blurred background.
    #[arg(long)]
    no_blur_background: bool,
    /// Color palette: electric or studio.
    #[arg(long, default_value = "electric")]
    palette: String,
    /// Explicit font file; candidate paths are probed when omitted.
    #[arg(long)]
    font: Option<PathBuf>,
}

impl EffectArgs {
    fn to_spec(&self, text: &str) -> Result<EffectSpec> {
        let style = GlowStyle::parse(&self.style, self.layers)?;
        Ok(EffectSpec {
            text: text.to_owned(),
            color: self.color.clone(),
            x: self.x,
            y: self.y,
            font_size: self.size,
            background: if self.no_blur_background {
                BackgroundMode::CroppedOnly
            } else {
                BackgroundMode::Blurred
            },
            style,
        })
    }

    fn to_options(&self, strict: bool, settings: RenderSettings) -> Result<CompileOptions> {
        Ok(CompileOptions {
            palette: Palette::by_name(&self.palette)?,
            font: self.font.clone(),
            settings,
            strict,
        })
    }
}

fn long_version() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("NEONCAP_GIT_HASH") {
        Some(hash) => format!("{version} ({hash})"),
        None => version.to_owned(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            output,
            text,
            effect,
            strict,
            dry_run,
        } => {
            let spec = effect.to_spec(&text)?;
            let options = effect.to_options(strict, RenderSettings::default())?;
            run_render(&input, &output, &spec, options, dry_run)
        }
        Commands::Explain {
            text,
            effect,
            strict,
            json,
        } => {
            let spec = effect.to_spec(&text)?;
            let options = effect.to_options(strict, RenderSettings::default())?;
            run_explain(&spec, &options, json)
        }
        Commands::Job {
            file,
            strict,
            dry_run,
        } => {
            let job = load_job(&file)?;
            let mut options = CompileOptions {
                strict,
                ..CompileOptions::default()
            };
            if let Some(palette) = &job.palette {
                options.palette = Palette::by_name(palette)?;
            }
            options.font = job.font.clone();
            run_render(&job.input, &job.output, &job.spec, options, dry_run)
        }
        Commands::Colors { palette } => run_colors(&palette),
    }
}

/// Size canvases to the real input duration when ffprobe can tell us;
/// otherwise warn and keep the default.
fn render_settings_for(input: &Path) -> RenderSettings {
    let mut settings = RenderSettings::default();
    match engine::probe_duration(input) {
        Ok(duration) => settings.canvas_duration = duration,
        Err(error) => {
            eprintln!(
                "warning: duration probe failed ({error}); using {DEFAULT_DURATION}s canvases"
            );
        }
    }
    settings
}

fn run_render(
    input: &Path,
    output: &Path,
    spec: &EffectSpec,
    mut options: CompileOptions,
    dry_run: bool,
) -> Result<()> {
    if !input.is_file() {
        bail!("input video does not exist: {}", input.display());
    }

    options.settings = render_settings_for(input);
    let compiled = compile(spec, &options)?;
    report_warnings(&compiled);
    eprintln!(
        "Compiled {} style, font size {}px, {} filter statements",
        spec.style.name(),
        compiled.font_size,
        compiled.descriptor.split(';').count()
    );

    let config = EncodeConfig::default();
    if dry_run {
        let args = engine::engine_args(input, output, &compiled, &config);
        println!("{}", engine::command_line(&args));
        return Ok(());
    }

    eprintln!("Running ffmpeg...");
    engine::run(input, output, &compiled, &config)
        .with_context(|| format!("failed rendering {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExplainOutput {
    style: &'static str,
    font_size: u32,
    video_label: String,
    audio_label: String,
    descriptor: String,
    statements: Vec<String>,
    warnings: Vec<String>,
}

fn run_explain(spec: &EffectSpec, options: &CompileOptions, json: bool) -> Result<()> {
    let compiled = compile(spec, options)?;

    if json {
        let output = ExplainOutput {
            style: spec.style.name(),
            font_size: compiled.font_size,
            video_label: compiled.video_label.clone(),
            audio_label: compiled.audio_label.clone(),
            statements: compiled.descriptor.split(';').map(str::to_owned).collect(),
            descriptor: compiled.descriptor,
            warnings: compiled.warnings,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    report_warnings(&compiled);
    println!("style: {}", spec.style.name());
    println!("font size: {}px", compiled.font_size);
    println!("map video: [{}]", compiled.video_label);
    println!("map audio: {}", compiled.audio_label);
    println!("descriptor:");
    for statement in compiled.descriptor.split(';') {
        println!("  {statement}");
    }
    Ok(())
}

fn run_colors(palette: &str) -> Result<()> {
    let palette = Palette::by_name(palette)?;
    println!("palette: {}", palette.name());
    for (name, set) in palette.entries() {
        println!("  {name:<10} core {} glow {}", set.core, set.glow);
    }
    Ok(())
}

fn report_warnings(compiled: &Compiled) {
    for warning in &compiled.warnings {
        eprintln!("warning: {warning}");
    }
}
