use crate::error::{NeonError, NeonResult};
use crate::graph::{AspectFit, FilterOp, Graph, Node, TextParams};

/// A serialized filter graph: the descriptor string plus the two labels the
/// engine maps to its outputs.
#[derive(Debug, Clone)]
pub struct Serialized {
    pub descriptor: String,
    pub video_label: String,
    pub audio_label: String,
}

/// Serialize the graph into the engine's descriptor language, one statement
/// per node, joined by `;` with no trailing separator.
///
/// Insertion order is taken as the serialization order, but it is verified,
/// not trusted: a pad referenced before its producer, referenced twice, or a
/// missing designated output fails with a graph-construction error. Those can
/// only arise from builder or splitter bugs, so they are fatal.
pub fn serialize(graph: &Graph) -> NeonResult<Serialized> {
    let video_label = graph
        .video_out()
        .ok_or_else(|| NeonError::graph("no designated video output pad"))?
        .to_owned();
    let audio_label = graph
        .audio_out()
        .ok_or_else(|| NeonError::graph("no designated audio output pad"))?
        .to_owned();

    let mut produced: Vec<String> = Vec::new();
    let mut consumed: Vec<String> = Vec::new();
    let mut statements: Vec<String> = Vec::new();

    for node in graph.nodes() {
        for input in &node.inputs {
            if !produced.iter().any(|label| label == input) {
                return Err(NeonError::graph(format!(
                    "pad '{input}' referenced before it is produced"
                )));
            }
            if consumed.iter().any(|label| label == input) {
                return Err(NeonError::graph(format!(
                    "pad '{input}' consumed more than once; fan-out was not legalized"
                )));
            }
            consumed.push(input.clone());
        }
        for output in &node.outputs {
            if produced.iter().any(|label| label == output) {
                return Err(NeonError::graph(format!("pad '{output}' produced twice")));
            }
            produced.push(output.clone());
        }
        if !matches!(node.op, FilterOp::Source) {
            statements.push(statement(node));
        }
    }

    for (kind, label) in [("video", &video_label), ("audio", &audio_label)] {
        if !produced.iter().any(|produced| produced == label) {
            return Err(NeonError::graph(format!(
                "designated {kind} output pad '{label}' is never produced"
            )));
        }
        if consumed.iter().any(|consumed| consumed == label) {
            return Err(NeonError::graph(format!(
                "designated {kind} output pad '{label}' is also consumed by a filter"
            )));
        }
    }

    Ok(Serialized {
        descriptor: statements.join(";"),
        video_label,
        audio_label,
    })
}

fn statement(node: &Node) -> String {
    let mut out = String::new();
    for input in &node.inputs {
        out.push('[');
        out.push_str(input);
        out.push(']');
    }
    out.push_str(&filter_text(&node.op));
    for output in &node.outputs {
        out.push('[');
        out.push_str(output);
        out.push(']');
    }
    out
}

fn filter_text(op: &FilterOp) -> String {
    match op {
        FilterOp::Source => String::new(),
        FilterOp::Scale { width, height, fit } => {
            let fit = match fit {
                AspectFit::Cover => "increase",
                AspectFit::Fit => "decrease",
            };
            format!("scale=w={width}:h={height}:force_original_aspect_ratio={fit}")
        }
        FilterOp::Crop { width, height } => format!("crop=w={width}:h={height}"),
        FilterOp::Blur { sigma } => format!("gblur=sigma={}", fmt_num(*sigma)),
        FilterOp::DrawText(params) => drawtext(params),
        FilterOp::Overlay { x, y } => match (x, y) {
            (Some(x), Some(y)) => format!("overlay=x={x}:y={y}"),
            _ => "overlay".to_owned(),
        },
        FilterOp::NullCanvas {
            width,
            height,
            duration,
        } => format!("nullsrc=size={width}x{height}:duration={}", fmt_num(*duration)),
        FilterOp::Split { copies } => format!("split=outputs={copies}"),
    }
}

fn drawtext(params: &TextParams) -> String {
    let mut color = params.color.clone();
    if params.alpha < 1.0 {
        color = format!("{color}@{}", fmt_num(params.alpha));
    }
    format!(
        "drawtext=text='{}':fontfile={}:fontsize={}:fontcolor={}:x={}:y={}",
        escape_text(&params.text),
        params.font_file,
        params.font_size,
        color,
        params.x,
        params.y
    )
}

/// Encode caption text for embedding in a quoted drawtext value.
///
/// Rules, applied in one pass:
/// - the two-character marker `\n` becomes a literal newline, which the text
///   drawer renders as a line break;
/// - remaining `\`, `'` and `:` are backslash-escaped so they survive the
///   descriptor grammar's quoting and key-value separators.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if chars.peek() == Some(&'n') {
                    chars.next();
                    out.push('\n');
                } else {
                    out.push_str("\\\\");
                }
            }
            '\'' => out.push_str("\\'"),
            ':' => out.push_str("\\:"),
            _ => out.push(ch),
        }
    }
    out
}

/// Locale-independent numeric formatting: integral values print bare
/// (`15`, not `15.0`), everything else keeps its shortest decimal form.
pub fn fmt_num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
