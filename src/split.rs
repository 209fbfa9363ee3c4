use crate::graph::{FilterOp, Graph, Node};

/// Rewrite every pad with more than one consumer into an explicit fan-out:
/// one `split` node with exactly as many freshly labeled outputs as there
/// were consumer edges, wired in the original edge order. The designated
/// video/audio mappings count as consumers and are rewired the same way.
///
/// The pass is idempotent: split outputs each carry exactly one consumer, so
/// a second run finds nothing to rewrite. It never reorders existing nodes;
/// the split is inserted directly after the producer, which keeps insertion
/// order topologically valid.
pub fn legalize(graph: &mut Graph) {
    let labels: Vec<String> = graph
        .nodes()
        .iter()
        .flat_map(|node| node.outputs.iter().cloned())
        .collect();

    for label in labels {
        let Some(producer) = graph.producer_index(&label) else {
            continue;
        };
        if matches!(graph.nodes()[producer].op, FilterOp::Split { .. }) {
            continue;
        }
        let count = graph.consumer_count(&label);
        if count < 2 {
            continue;
        }

        let stem = label_stem(&label);
        let outputs: Vec<String> = (0..count)
            .map(|index| graph.unique_label(&format!("{stem}{index}")))
            .collect();
        let split_id = graph.bump_id();
        graph.insert_node(
            producer + 1,
            Node {
                id: split_id,
                op: FilterOp::Split { copies: count },
                inputs: vec![label.clone()],
                outputs: outputs.clone(),
            },
        );

        let mut next = 0usize;
        for node in graph.nodes_mut() {
            if node.id == split_id {
                continue;
            }
            for input in &mut node.inputs {
                if *input == label {
                    *input = outputs[next].clone();
                    next += 1;
                }
            }
        }
        if graph.video_out() == Some(label.as_str()) {
            graph.set_video_out_raw(outputs[next].clone());
            next += 1;
        }
        if graph.audio_out() == Some(label.as_str()) {
            graph.set_audio_out_raw(outputs[next].clone());
        }
    }
}

// Split copies need engine-legal labels; keep alphanumerics and underscores,
// so the source pad "0:v" fans out as "0v0", "0v1", ...
fn label_stem(label: &str) -> String {
    let stem: String = label
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect();
    if stem.is_empty() {
        "s".to_owned()
    } else {
        stem
    }
}
