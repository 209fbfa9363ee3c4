use std::collections::HashSet;

/// Stable node identifier, assigned in insertion order. Insertion order is
/// the serialization order, so ids survive mid-vector inserts.
pub type NodeId = usize;

pub const SOURCE_VIDEO_PAD: &str = "0:v";
pub const SOURCE_AUDIO_PAD: &str = "0:a";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectFit {
    /// `force_original_aspect_ratio=increase`: cover the frame, spill over.
    Cover,
    /// `force_original_aspect_ratio=decrease`: fit inside the frame.
    Fit,
}

/// Drawtext parameters carried by a text node. Position values are engine
/// expressions, already offset-adjusted by the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    pub text: String,
    pub font_file: String,
    pub font_size: u32,
    /// `#RRGGBB` color for this pass.
    pub color: String,
    /// Opacity in [0, 1]; 1.0 is emitted without an alpha suffix.
    pub alpha: f64,
    pub x: String,
    pub y: String,
}

/// One operation in the graph. `Source` wraps the demuxed input and emits no
/// statement of its own; `Split` is only ever introduced by the legalization
/// pass.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Source,
    Scale {
        width: u32,
        height: u32,
        fit: AspectFit,
    },
    Crop {
        width: u32,
        height: u32,
    },
    Blur {
        sigma: f64,
    },
    DrawText(TextParams),
    Overlay {
        x: Option<String>,
        y: Option<String>,
    },
    NullCanvas {
        width: u32,
        height: u32,
        duration: f64,
    },
    Split {
        copies: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub op: FilterOp,
    /// Ordered input pad labels.
    pub inputs: Vec<String>,
    /// Ordered output pad labels; exactly one for everything except Source
    /// and Split.
    pub outputs: Vec<String>,
}

/// A directed acyclic graph of filter operations. Nodes are kept in insertion
/// order, which the builder guarantees to be a valid topological order; the
/// serializer re-verifies that instead of trusting it.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    labels: HashSet<String>,
    next_id: NodeId,
    video_out: Option<String>,
    audio_out: Option<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            labels: HashSet::new(),
            next_id: 0,
            video_out: None,
            audio_out: None,
        }
    }

    /// Add the input source node exposing the demuxed video and audio pads.
    pub fn add_source(&mut self) -> (String, String) {
        let video = SOURCE_VIDEO_PAD.to_owned();
        let audio = SOURCE_AUDIO_PAD.to_owned();
        self.labels.insert(video.clone());
        self.labels.insert(audio.clone());
        let id = self.bump_id();
        self.nodes.push(Node {
            id,
            op: FilterOp::Source,
            inputs: Vec::new(),
            outputs: vec![video.clone(), audio.clone()],
        });
        (video, audio)
    }

    /// Append an operation consuming `inputs`, returning its freshly labeled
    /// output pad. Label allocation is bare-first (`base`), then numbered
    /// (`base2`, `base3`, ...).
    pub fn add(&mut self, op: FilterOp, inputs: &[&str], prefix: &str) -> String {
        let label = self.unique_label(prefix);
        let id = self.bump_id();
        self.nodes.push(Node {
            id,
            op,
            inputs: inputs.iter().map(|input| (*input).to_owned()).collect(),
            outputs: vec![label.clone()],
        });
        label
    }

    /// Reserve a label that does not collide with any pad seen so far.
    pub(crate) fn unique_label(&mut self, prefix: &str) -> String {
        let mut candidate = prefix.to_owned();
        let mut counter = 2usize;
        while !self.labels.insert(candidate.clone()) {
            candidate = format!("{prefix}{counter}");
            counter += 1;
        }
        candidate
    }

    pub(crate) fn bump_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert an already-assembled node at `position` in serialization order.
    /// Used by the splitter to place fan-out nodes directly after producers.
    pub(crate) fn insert_node(&mut self, position: usize, node: Node) {
        self.nodes.insert(position, node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn set_video_out(&mut self, label: &str) {
        self.video_out = Some(label.to_owned());
    }

    pub fn set_audio_out(&mut self, label: &str) {
        self.audio_out = Some(label.to_owned());
    }

    pub(crate) fn set_video_out_raw(&mut self, label: String) {
        self.video_out = Some(label);
    }

    pub(crate) fn set_audio_out_raw(&mut self, label: String) {
        self.audio_out = Some(label);
    }

    pub fn video_out(&self) -> Option<&str> {
        self.video_out.as_deref()
    }

    pub fn audio_out(&self) -> Option<&str> {
        self.audio_out.as_deref()
    }

    /// Index of the node producing `label` in serialization order.
    pub fn producer_index(&self, label: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.outputs.iter().any(|output| output == label))
    }

    /// Number of times `label` is consumed: filter inputs plus the designated
    /// output mappings.
    pub fn consumer_count(&self, label: &str) -> usize {
        let inputs = self
            .nodes
            .iter()
            .flat_map(|node| node.inputs.iter())
            .filter(|input| input.as_str() == label)
            .count();
        let mapped = [self.video_out.as_deref(), self.audio_out.as_deref()]
            .into_iter()
            .flatten()
            .filter(|mapped| *mapped == label)
            .count();
        inputs + mapped
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
