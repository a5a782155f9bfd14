/// Where a valve draws its input from, determined by its position in the triangle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Inlet {
    /// The root valve, fed directly by the initial amount.
    Source,
    /// Fed by the first output of the leftmost valve of the previous layer.
    Left(usize),
    /// Fed by the second output of the rightmost valve of the previous layer.
    Right(usize),
    /// Fed by the second output of the left parent plus the first output of the right parent.
    Merge(usize, usize),
}

impl Inlet {
    /// Get the parent valve indices this inlet is connected to.
    pub fn parents(&self) -> Vec<usize> {
        match *self {
            Inlet::Source => vec![],
            Inlet::Left(parent) | Inlet::Right(parent) => vec![parent],
            Inlet::Merge(left, right) => vec![left, right],
        }
    }
}

/// A valve address in the triangular network.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ValvePosition {
    /// The sequential valve index (layer-major, left to right).
    pub index: usize,
    /// The 0-indexed layer; layer k holds k + 1 valves.
    pub layer: usize,
    /// The position of the valve within its layer.
    pub position: usize,
}

impl ValvePosition {
    pub fn inlet(&self) -> Inlet {
        inlet(self.layer, self.position)
    }
}

/// Total number of valves in a network with [num_layers] layers.
pub const fn node_count(num_layers: usize) -> usize {
    num_layers * (num_layers + 1) / 2
}

/// Index of the first valve of [layer].
pub const fn layer_start(layer: usize) -> usize {
    node_count(layer)
}

/// Resolve the inlet of the valve at [position] within [layer].
pub fn inlet(layer: usize, position: usize) -> Inlet {
    if layer == 0 {
        return Inlet::Source;
    }

    let valves_in_layer = layer + 1;
    let prev_layer_start = layer_start(layer - 1);

    if position == 0 {
        Inlet::Left(prev_layer_start)
    } else if position == valves_in_layer - 1 {
        Inlet::Right(prev_layer_start + layer - 1)
    } else {
        Inlet::Merge(prev_layer_start + position - 1, prev_layer_start + position)
    }
}

/// Iterate over every valve of a network in processing order. Each valve only depends on valves
/// from the previous layer, so this order is also the only valid evaluation order.
pub fn valves(num_layers: usize) -> ValveIterator {
    ValveIterator {
        num_layers,
        index: 0,
        layer: 0,
        position: 0,
    }
}

pub struct ValveIterator {
    num_layers: usize,
    index: usize,
    layer: usize,
    position: usize,
}

impl Iterator for ValveIterator {
    type Item = ValvePosition;

    fn next(&mut self) -> Option<Self::Item> {
        if self.layer >= self.num_layers {
            return None;
        }

        let curr = ValvePosition {
            index: self.index,
            layer: self.layer,
            position: self.position,
        };

        self.index += 1;
        self.position += 1;

        if self.position > self.layer {
            self.layer += 1;
            self.position = 0;
        }

        Some(curr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = node_count(self.num_layers).saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ValveIterator {}
