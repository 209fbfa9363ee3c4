use crate::descriptor::fmt_num;
use crate::error::NeonResult;
use crate::font::ResolvedFont;
use crate::graph::{AspectFit, FilterOp, Graph, TextParams};
use crate::palette::ColorSet;
use crate::spec::{BackgroundMode, EffectSpec};
use crate::style::{GlowLayer, LayerMode, StylePlan};

pub const BACKGROUND_BLUR_SIGMA: f64 = 15.0;

/// Frame geometry and canvas timing for one compilation. Canvas duration is
/// only consulted for styles that render layers on transparent canvases.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub frame_width: u32,
    pub frame_height: u32,
    pub canvas_duration: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_width: 1080,
            frame_height: 1920,
            canvas_duration: 30.0,
        }
    }
}

/// Build the raw operation graph for one effect spec. The result is not yet
/// legal for serialization: pads may have multiple consumers until the
/// splitter pass has run.
pub fn build_graph(
    spec: &EffectSpec,
    plan: &StylePlan,
    colors: &ColorSet,
    font: &ResolvedFont,
    font_size: u32,
    settings: &RenderSettings,
) -> NeonResult<Graph> {
    plan.validate()?;

    let mut graph = Graph::new();
    let (video, audio) = graph.add_source();

    let base = emit_background(&mut graph, spec.background, &video, settings);

    let mut current = base;
    for layer in &plan.layers {
        current = emit_layer(&mut graph, spec, layer, colors, font, font_size, settings, &current);
    }

    graph.set_video_out(&current);
    graph.set_audio_out(&audio);
    Ok(graph)
}

fn emit_background(
    graph: &mut Graph,
    mode: BackgroundMode,
    video: &str,
    settings: &RenderSettings,
) -> String {
    let (w, h) = (settings.frame_width, settings.frame_height);
    let cover = FilterOp::Scale {
        width: w,
        height: h,
        fit: AspectFit::Cover,
    };
    match mode {
        BackgroundMode::Blurred => {
            let covered = graph.add(cover, &[video], "cover");
            let cropped = graph.add(FilterOp::Crop { width: w, height: h }, &[&covered], "crop");
            let bg = graph.add(
                FilterOp::Blur {
                    sigma: BACKGROUND_BLUR_SIGMA,
                },
                &[&cropped],
                "bg",
            );
            let main = graph.add(
                FilterOp::Scale {
                    width: w,
                    height: h,
                    fit: AspectFit::Fit,
                },
                &[video],
                "main",
            );
            graph.add(
                FilterOp::Overlay {
                    x: Some("(W-w)/2".to_owned()),
                    y: Some("(H-h)/2".to_owned()),
                },
                &[&bg, &main],
                "base",
            )
        }
        BackgroundMode::CroppedOnly => {
            let covered = graph.add(cover, &[video], "cover");
            graph.add(FilterOp::Crop { width: w, height: h }, &[&covered], "base")
        }
    }
}

fn emit_layer(
    graph: &mut Graph,
    spec: &EffectSpec,
    layer: &GlowLayer,
    colors: &ColorSet,
    font: &ResolvedFont,
    font_size: u32,
    settings: &RenderSettings,
    current: &str,
) -> String {
    let params = TextParams {
        text: spec.text.clone(),
        font_file: font.path.to_string_lossy().into_owned(),
        font_size,
        color: colors.role(layer.role).to_owned(),
        alpha: layer.alpha,
        x: position_expr("w", "text_w", spec.x, layer.offset.0),
        y: position_expr("h", "text_h", spec.y, layer.offset.1),
    };

    match layer.mode {
        LayerMode::Canvas => {
            // TODO: nullsrc frames are not truly transparent; evaluate
            // color=black@0 as the canvas source for additive glow stacking.
            let canvas = graph.add(
                FilterOp::NullCanvas {
                    width: settings.frame_width,
                    height: settings.frame_height,
                    duration: settings.canvas_duration,
                },
                &[],
                "canvas",
            );
            let text = graph.add(FilterOp::DrawText(params), &[&canvas], "txt");
            let glow = if layer.sigma > 0.0 {
                graph.add(FilterOp::Blur { sigma: layer.sigma }, &[&text], "glow")
            } else {
                text
            };
            graph.add(
                FilterOp::Overlay { x: None, y: None },
                &[current, &glow],
                "cmp",
            )
        }
        LayerMode::Composite if layer.sigma > 0.0 => {
            // The running composite feeds both the drawtext chain and the
            // overlay bottom; the splitter turns this reuse into an explicit
            // fan-out node.
            let text = graph.add(FilterOp::DrawText(params), &[current], "txt");
            let glow = graph.add(FilterOp::Blur { sigma: layer.sigma }, &[&text], "glow");
            graph.add(
                FilterOp::Overlay { x: None, y: None },
                &[current, &glow],
                "cmp",
            )
        }
        LayerMode::Composite => graph.add(FilterOp::DrawText(params), &[current], "txt"),
    }
}

/// Centered position expression: `w*X-text_w/2`, plus a pixel offset for
/// drop-shadow layers.
fn position_expr(frame_var: &str, text_var: &str, fraction: f64, offset: i32) -> String {
    let mut expr = format!("{frame_var}*{}-{text_var}/2", fmt_num(fraction));
    if offset != 0 {
        if offset > 0 {
            expr.push('+');
        }
        expr.push_str(&offset.to_string());
    }
    expr
}
