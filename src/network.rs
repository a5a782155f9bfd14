pub mod routing;
pub mod valve;

pub use routing::{layer_start, node_count, valves, Inlet};
pub use valve::ValveData;

/// The largest number of layers the window lets the user configure.
pub const MAX_LAYERS: usize = 5;

/// A triangular cascade of valves. Layer k holds k + 1 valves and each valve splits its input
/// into two outputs that feed the valves below it.
#[derive(Debug, Clone)]
pub struct ValveNetwork {
    /// The amount fed into the root valve.
    pub initial_amount: f64,
    num_layers: usize,
    /// The split percentage of each valve, indexed layer-major.
    percentages: Vec<f64>,
    /// The computed state of each valve. Empty until the flow has been processed.
    data: Vec<ValveData>,
}

impl ValveNetwork {
    pub fn new(initial_amount: f64, num_layers: usize) -> Self {
        Self {
            initial_amount,
            num_layers,
            percentages: vec![0.0; node_count(num_layers)],
            data: vec![],
        }
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Set the percentage of valve [index]. Indices outside the network are ignored.
    pub fn set_percentage(&mut self, index: usize, percent: f64) {
        if let Some(p) = self.percentages.get_mut(index) {
            *p = percent;
        }
    }

    pub fn percentage(&self, index: usize) -> Option<f64> {
        self.percentages.get(index).copied()
    }

    /// Recompute every valve from scratch, replacing any previous results.
    pub fn process_flow(&mut self) -> &[ValveData] {
        // Valves added by a larger layer count start at 0 percent.
        self.percentages.resize(node_count(self.num_layers), 0.0);

        self.data.clear();
        self.data.reserve(self.percentages.len());

        for v in valves(self.num_layers) {
            // Parents always precede the valve in processing order, so their data is ready.

            let input = match v.inlet() {
                Inlet::Source => self.initial_amount,
                Inlet::Left(parent) => self.data[parent].output1,
                Inlet::Right(parent) => self.data[parent].output2,
                Inlet::Merge(left, right) => self.data[left].output2 + self.data[right].output1,
            };

            self.data.push(ValveData::new(input, self.percentages[v.index]));
        }

        &self.data
    }

    /// The results of the last [process_flow] call.
    pub fn outputs(&self) -> &[ValveData] {
        &self.data
    }

    pub fn valve(&self, index: usize) -> Option<&ValveData> {
        self.data.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn network(initial_amount: f64, num_layers: usize, percentages: &[f64]) -> ValveNetwork {
        let mut network = ValveNetwork::new(initial_amount, num_layers);

        for (i, p) in percentages.iter().enumerate() {
            network.set_percentage(i, *p);
        }

        network.process_flow();
        network
    }

    fn tuple(network: &ValveNetwork, index: usize) -> (f64, f64, f64) {
        let v = network.valve(index).unwrap();
        (v.input, v.output1, v.output2)
    }

    #[test]
    fn two_layers_even_split() {
        let n = network(1000.0, 2, &[50.0; 3]);

        assert_eq!(n.outputs().len(), 3);
        assert_eq!(tuple(&n, 0), (1000.0, 500.0, 500.0));
        assert_eq!(tuple(&n, 1), (500.0, 250.0, 250.0));
        assert_eq!(tuple(&n, 2), (500.0, 250.0, 250.0));
    }

    #[test]
    fn three_layers_merge_middle_valve() {
        let n = network(1000.0, 3, &[50.0; 6]);

        assert_eq!(tuple(&n, 0), (1000.0, 500.0, 500.0));
        assert_eq!(tuple(&n, 1), (500.0, 250.0, 250.0));
        assert_eq!(tuple(&n, 2), (500.0, 250.0, 250.0));
        assert_eq!(tuple(&n, 3), (250.0, 125.0, 125.0));
        assert_eq!(tuple(&n, 4), (500.0, 250.0, 250.0));
        assert_eq!(tuple(&n, 5), (250.0, 125.0, 125.0));
    }

    #[test]
    fn middle_valve_takes_only_inward_outputs() {
        let n = network(1000.0, 3, &[30.0, 20.0, 70.0, 0.0, 0.0, 0.0]);

        let left = n.valve(1).unwrap();
        let right = n.valve(2).unwrap();
        let middle = n.valve(4).unwrap();

        assert_relative_eq!(middle.input, left.output2 + right.output1);
        assert_relative_eq!(n.valve(3).unwrap().input, left.output1);
        assert_relative_eq!(n.valve(5).unwrap().input, right.output2);
    }

    #[test]
    fn all_zero_passes_flow_through_second_output() {
        let n = network(750.0, 4, &[]);

        for v in n.outputs() {
            assert_eq!(v.output1, 0.0);
            assert_eq!(v.output2, v.input);
        }

        // Everything drains down the right edge of the triangle.
        assert_eq!(n.valve(layer_start(3) + 3).unwrap().input, 750.0);
    }

    #[test]
    fn all_hundred_passes_flow_through_first_output() {
        let n = network(750.0, 4, &[100.0; 10]);

        for v in n.outputs() {
            assert_eq!(v.output1, v.input);
            assert_eq!(v.output2, 0.0);
        }

        assert_eq!(n.valve(layer_start(3)).unwrap().input, 750.0);
    }

    #[test]
    fn set_percentage_ignores_out_of_range() {
        let mut n = ValveNetwork::new(100.0, 2);
        n.set_percentage(3, 50.0);
        n.set_percentage(usize::MAX, 50.0);
        n.set_percentage(2, 25.0);

        assert_eq!(n.percentage(0), Some(0.0));
        assert_eq!(n.percentage(2), Some(25.0));
        assert_eq!(n.percentage(3), None);
    }

    #[test]
    fn process_flow_replaces_previous_results() {
        let mut n = network(1000.0, 2, &[50.0; 3]);

        n.initial_amount = 10.0;
        n.set_percentage(0, 100.0);
        n.process_flow();

        assert_eq!(n.outputs().len(), 3);
        assert_eq!(tuple(&n, 0), (10.0, 10.0, 0.0));
        assert_eq!(tuple(&n, 2), (0.0, 0.0, 0.0));
    }

    #[test]
    fn unprocessed_network_has_no_outputs() {
        let n = ValveNetwork::new(1000.0, 3);
        assert!(n.outputs().is_empty());
        assert_eq!(n.num_layers(), 3);
    }

    #[test]
    fn process_flow_follows_grown_layer_count() {
        let mut n = network(1000.0, 2, &[50.0; 3]);

        n.num_layers = 3;
        n.process_flow();

        assert_eq!(n.outputs().len(), 6);
        assert_eq!(n.percentage(5), Some(0.0));
        assert_eq!(tuple(&n, 3), (250.0, 0.0, 250.0));
        assert_eq!(tuple(&n, 4), (500.0, 0.0, 500.0));
        assert_eq!(tuple(&n, 5), (250.0, 0.0, 250.0));
    }

    #[test]
    fn terminal_outputs_conserve_initial_amount() {
        let n = network(1000.0, 3, &[35.0, 60.0, 10.0, 45.0, 90.0, 5.0]);

        // Each inward output of a layer feeds exactly one valve below it, so the terminal layer
        // outputs must still add up to the initial amount.
        let total: f64 = n.outputs()[layer_start(2)..]
            .iter()
            .map(|v| v.output1 + v.output2)
            .sum();

        assert_relative_eq!(total, 1000.0, max_relative = 1e-12);
    }

    proptest! {
        #[test]
        fn outputs_sum_to_input(
            amount in 0.0f64..1e6,
            layers in 1usize..=MAX_LAYERS,
            steps in proptest::collection::vec(0u32..=20, 15),
        ) {
            let percentages: Vec<f64> = steps.iter().map(|s| (*s * 5) as f64).collect();
            let n = network(amount, layers, &percentages);

            prop_assert_eq!(n.outputs().len(), node_count(layers));
            prop_assert_eq!(n.valve(0).unwrap().input, amount);

            for v in n.outputs() {
                prop_assert!((v.output1 + v.output2 - v.input).abs() <= 1e-9 * amount.max(1.0));
            }
        }
    }
}
