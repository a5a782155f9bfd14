use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use itertools::Itertools;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::network::{node_count, ValveNetwork, MAX_LAYERS};
use crate::util::step_clamp;

/// The number of valves in the largest configurable network.
pub const MAX_VALVES: usize = node_count(MAX_LAYERS);

pub const PERCENT_STEP: f64 = 5.0;
pub const AMOUNT_STEP: f64 = 100.0;

const DEFAULT_AMOUNT: f64 = 1000.0;
const DEFAULT_LAYERS: usize = 3;

/// Interactive cascade of flow-splitting valves
#[derive(Parser, Debug, Default)]
#[command(name = "valves")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file with the initial network configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Amount fed into the root valve
    #[arg(short, long, allow_negative_numbers = true)]
    pub amount: Option<f64>,

    /// Number of valve layers (1-5)
    #[arg(short, long)]
    pub layers: Option<usize>,

    /// Valve percentages in index order, comma separated
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    pub percent: Vec<f64>,

    /// Render a single frame to this PNG file and exit
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Number of layers must be between 1 and {max}, got {layers}")]
    InvalidLayers { layers: usize, max: usize },

    #[error("Initial amount must be a finite non-negative number, got {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Percentage of valve {index} must be between 0 and 100, got {percent}")]
    InvalidPercentage { index: usize, percent: f64 },

    #[error("Got {count} percentages but the network has at most {max} valves")]
    TooManyPercentages { count: usize, max: usize },
}

/// The on-disk configuration format. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub initial_amount: Option<f64>,
    pub num_layers: Option<usize>,
    #[serde(default)]
    pub percentages: Vec<f64>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// The user-controlled inputs of the valve network.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub initial_amount: f64,
    pub num_layers: usize,
    /// The percentage of every valve of the largest network, keyed by valve index. Valves beyond
    /// the current layer count keep their value until the network grows back.
    percentages: Vec<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_amount: DEFAULT_AMOUNT,
            num_layers: DEFAULT_LAYERS,
            percentages: vec![0.0; MAX_VALVES],
        }
    }
}

impl Settings {
    /// Resolve the settings from the defaults, the optional config file, then the command line.
    pub fn load(args: &Args) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(path) = args.config.as_deref() {
            let file = FileConfig::read(path)?;

            settings.apply(file.initial_amount, file.num_layers, &file.percentages)?;

            info!(path = %path.display(), "loaded config file");
        }

        settings.apply(args.amount, args.layers, &args.percent)?;

        Ok(settings)
    }

    /// Override the settings with any provided values, rejecting invalid ones.
    pub fn apply(
        &mut self,
        amount: Option<f64>,
        layers: Option<usize>,
        percentages: &[f64],
    ) -> Result<()> {
        if let Some(amount) = amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(SettingsError::InvalidAmount { amount });
            }
            self.initial_amount = amount;
        }

        if let Some(layers) = layers {
            if !(1..=MAX_LAYERS).contains(&layers) {
                return Err(SettingsError::InvalidLayers {
                    layers,
                    max: MAX_LAYERS,
                });
            }
            self.num_layers = layers;
        }

        if percentages.len() > MAX_VALVES {
            return Err(SettingsError::TooManyPercentages {
                count: percentages.len(),
                max: MAX_VALVES,
            });
        }

        for (index, percent) in percentages.iter().cloned().enumerate() {
            if !(0.0..=100.0).contains(&percent) {
                return Err(SettingsError::InvalidPercentage { index, percent });
            }
        }

        self.percentages[..percentages.len()].copy_from_slice(percentages);

        Ok(())
    }

    pub fn num_valves(&self) -> usize {
        node_count(self.num_layers)
    }

    pub fn percentage(&self, index: usize) -> f64 {
        self.percentages.get(index).copied().unwrap_or_default()
    }

    /// The percentages of the valves in the current network.
    pub fn active_percentages(&self) -> &[f64] {
        &self.percentages[..self.num_valves()]
    }

    /// Build a fresh network from the settings and process its flow.
    pub fn network(&self) -> ValveNetwork {
        let mut network = ValveNetwork::new(self.initial_amount, self.num_layers);

        for (i, percent) in self.active_percentages().iter().enumerate() {
            network.set_percentage(i, *percent);
        }

        network.process_flow();
        network
    }

    /// Move the percentage of valve [index] by [steps] increments of 5, within \[0, 100\].
    pub fn adjust_percentage(&mut self, index: usize, steps: i32) {
        if let Some(p) = self.percentages.get_mut(index) {
            *p = step_clamp(*p, steps as f64 * PERCENT_STEP, 0.0, 100.0);
        }
    }

    /// Move the layer count by [delta], within 1 to [MAX_LAYERS].
    pub fn adjust_layers(&mut self, delta: i32) {
        let layers = self.num_layers as i64 + delta as i64;
        self.num_layers = layers.clamp(1, MAX_LAYERS as i64) as usize;
    }

    /// Move the initial amount by [steps] increments of 100, never below zero.
    pub fn adjust_amount(&mut self, steps: i32) {
        self.initial_amount = step_clamp(
            self.initial_amount,
            steps as f64 * AMOUNT_STEP,
            0.0,
            f64::MAX,
        );
    }

    pub fn reset_percentages(&mut self) {
        self.percentages.fill(0.0);
    }

    /// A short description of the settings for log output.
    pub fn summary(&self) -> String {
        format!(
            "amount={} layers={} percentages=[{}]",
            self.initial_amount,
            self.num_layers,
            self.active_percentages().iter().join(", ")
        )
    }
}
