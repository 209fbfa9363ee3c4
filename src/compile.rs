use std::path::PathBuf;

use crate::builder::{build_graph, RenderSettings};
use crate::descriptor::serialize;
use crate::error::{NeonError, NeonResult};
use crate::font;
use crate::palette::Palette;
use crate::spec::EffectSpec;
use crate::split::legalize;
use crate::style::plan_for;

/// Knobs for one compilation beyond the effect spec itself.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub palette: Palette,
    /// Explicit font file; when absent the candidate paths are probed.
    pub font: Option<PathBuf>,
    pub settings: RenderSettings,
    /// Promote color/font fallbacks from warnings to configuration errors.
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            palette: Palette::electric(),
            font: None,
            settings: RenderSettings::default(),
            strict: false,
        }
    }
}

/// A fully compiled effect: the descriptor plus everything the engine
/// invocation and the caller's diagnostics need.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub descriptor: String,
    pub video_label: String,
    pub audio_label: String,
    pub font_size: u32,
    pub font_file: PathBuf,
    /// Non-fatal lookup fallbacks, one line each, for the caller to surface.
    pub warnings: Vec<String>,
}

/// Compile an effect spec into an engine descriptor: validate, estimate the
/// font size, resolve the style table, build the graph, legalize fan-out,
/// serialize. Pure except for the font-file existence probe.
pub fn compile(spec: &EffectSpec, options: &CompileOptions) -> NeonResult<Compiled> {
    spec.validate()?;

    let mut warnings = Vec::new();

    let color = options.palette.resolve(&spec.color);
    if let Some(requested) = &color.fallback {
        if options.strict {
            return Err(NeonError::config(format!(
                "unknown color '{requested}' in palette '{}'",
                options.palette.name()
            )));
        }
        warnings.push(format!(
            "unknown color '{requested}' in palette '{}', using '{}'",
            options.palette.name(),
            crate::palette::DEFAULT_COLOR
        ));
    }

    let resolved_font = font::resolve_font(options.font.as_deref());
    if resolved_font.fallback {
        if options.strict {
            return Err(NeonError::config(format!(
                "font file not found: {}",
                resolved_font.path.display()
            )));
        }
        warnings.push(format!(
            "font file not found, passing {} to the engine anyway",
            resolved_font.path.display()
        ));
    }

    let font_size = font::estimate(&spec.text, spec.font_size);

    let plan = plan_for(spec.style);
    let mut graph = build_graph(
        spec,
        &plan,
        &color.set,
        &resolved_font,
        font_size,
        &options.settings,
    )?;
    legalize(&mut graph);
    let serialized = serialize(&graph)?;

    Ok(Compiled {
        descriptor: serialized.descriptor,
        video_label: serialized.video_label,
        audio_label: serialized.audio_label,
        font_size,
        font_file: resolved_font.path,
        warnings,
    })
}
