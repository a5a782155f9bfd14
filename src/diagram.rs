use itertools::Itertools;
use nannou::glam::*;
use ordered_float::OrderedFloat;

use crate::network::{layer_start, valves, Inlet, ValveNetwork};
use crate::util::saturate;

/// Horizontal distance between neighboring valves is twice this value.
const X_SPACING: f32 = 1.0;
/// Vertical distance between layers.
const Y_SPACING: f32 = 1.0;

const VALVE_BASE_SIZE: f64 = 1000.0;
const OUTPUT_BASE_SIZE: f64 = 800.0;
const EDGE_WIDTH: f64 = 3.0;

/// The visual encoding of a processed valve network. Positions are in diagram units with the
/// root valve at the origin and each layer one unit further down.
#[derive(Debug, Clone)]
pub struct Diagram {
    /// All drawable nodes. The first entries are the valves in index order, followed by the
    /// output leaves of the terminal layer.
    pub nodes: Vec<DiagramNode>,
    /// The pipes connecting nodes, drawn beneath them.
    pub edges: Vec<DiagramEdge>,
    /// The flow amount that maps to full size and color intensity.
    pub max_flow: f64,
}

#[derive(Debug, Clone)]
pub struct DiagramNode {
    pub kind: NodeKind,
    pub position: Vec2,
    /// The node area; scales linearly with the flow through the node.
    pub size: f32,
    pub color: colorous::Color,
    pub label: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NodeKind {
    Valve(usize),
    /// A synthetic leaf showing one output of a terminal valve. Port 1 or 2.
    Output { valve: usize, port: u8 },
}

#[derive(Debug, Copy, Clone)]
pub struct DiagramEdge {
    /// The indices of the connected nodes (child, parent).
    pub nodes: (usize, usize),
    pub width: f32,
}

impl Diagram {
    pub fn new(network: &ValveNetwork) -> Self {
        let max_flow = network.initial_amount;
        let data = network.outputs();

        let mut nodes = Vec::with_capacity(data.len() + 2 * network.num_layers());
        let mut edges = vec![];

        for v in valves(network.num_layers()) {
            let Some(valve) = data.get(v.index) else {
                break;
            };

            let percent = network.percentage(v.index).unwrap_or_default();

            nodes.push(DiagramNode {
                kind: NodeKind::Valve(v.index),
                position: valve_position(v.layer, v.position),
                size: node_size(VALVE_BASE_SIZE, valve.input, max_flow),
                color: flow_color(valve.input, max_flow),
                label: format!("{}%", percent),
            });

            // A merged valve draws half of its input through each of its two pipes.

            let inlet = v.inlet();
            let flow = match inlet {
                Inlet::Merge(..) => valve.input / 2.0,
                _ => valve.input,
            };

            for parent in inlet.parents() {
                edges.push(DiagramEdge {
                    nodes: (v.index, parent),
                    width: edge_width(flow, max_flow),
                });
            }
        }

        // Spawn two output leaves beneath every valve of the terminal layer.

        if !data.is_empty() && nodes.len() == data.len() {
            let terminal = layer_start(network.num_layers() - 1)..data.len();

            for i in terminal {
                let valve = &data[i];
                let center = nodes[i].position;

                let ports = [
                    (1, valve.output1, center + Vec2::new(-X_SPACING / 2.0, -Y_SPACING)),
                    (2, valve.output2, center + Vec2::new(X_SPACING / 2.0, -Y_SPACING)),
                ];

                for (port, amount, position) in ports {
                    edges.push(DiagramEdge {
                        nodes: (nodes.len(), i),
                        width: edge_width(amount, max_flow),
                    });

                    nodes.push(DiagramNode {
                        kind: NodeKind::Output { valve: i, port },
                        position,
                        size: node_size(OUTPUT_BASE_SIZE, amount, max_flow),
                        color: flow_color(amount, max_flow),
                        label: format!("{:.1}", amount),
                    });
                }
            }
        }

        Self {
            nodes,
            edges,
            max_flow,
        }
    }

    /// Find the valve node closest to [point], ignoring output leaves.
    pub fn nearest_valve(&self, point: Vec2) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n.kind {
                NodeKind::Valve(index) => Some((index, n.position)),
                NodeKind::Output { .. } => None,
            })
            .min_by_key(|(_, p)| OrderedFloat(p.distance_squared(point)))
            .map(|(index, _)| index)
    }

    /// Get the lower-left and upper-right corners bounding every node position.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let xs = self.nodes.iter().map(|n| OrderedFloat(n.position.x));
        let ys = self.nodes.iter().map(|n| OrderedFloat(n.position.y));

        let (min_x, max_x) = xs.minmax().into_option()?;
        let (min_y, max_y) = ys.minmax().into_option()?;

        Some((Vec2::new(min_x.0, min_y.0), Vec2::new(max_x.0, max_y.0)))
    }
}

/// Get the diagram position of the valve at [position] within [layer].
pub fn valve_position(layer: usize, position: usize) -> Vec2 {
    let valves_in_layer = (layer + 1) as f32;
    let x = (position as f32 - valves_in_layer / 2.0 + 0.5) * X_SPACING * 2.0;
    let y = -(layer as f32) * Y_SPACING;
    Vec2::new(x, y)
}

/// The fraction of [max_flow] carried by [value]. A non-positive maximum yields zero intensity
/// instead of a non-finite ratio.
pub fn flow_ratio(value: f64, max_flow: f64) -> f64 {
    if max_flow <= 0.0 {
        return 0.0;
    }

    value / max_flow
}

/// Sample the Blues scale between 0.3 and 1.0 according to the flow ratio.
pub fn flow_color(value: f64, max_flow: f64) -> colorous::Color {
    let intensity = saturate(flow_ratio(value, max_flow));
    colorous::BLUES.eval_continuous(0.3 + 0.7 * intensity)
}

fn node_size(base: f64, value: f64, max_flow: f64) -> f32 {
    (base + base * flow_ratio(value, max_flow)) as f32
}

fn edge_width(value: f64, max_flow: f64) -> f32 {
    (EDGE_WIDTH * flow_ratio(value, max_flow)) as f32
}
