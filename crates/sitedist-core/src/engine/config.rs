use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use super::error::SelectionError;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// How the returned subset of candidate indices is generated.
///
/// - `Uniform`: the separation between each successive site and all previously
///   selected sites is maximized.
/// - `Cluster`: the separation between each successive site and all previously
///   selected sites is minimized.
/// - `Random`: a uniform random permutation; no distances are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Uniform,
    Cluster,
    Random,
}

impl FromStr for Mode {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Mode::Uniform),
            "cluster" => Ok(Mode::Cluster),
            "random" => Ok(Mode::Random),
            _ => Err(SelectionError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Uniform => "uniform",
            Mode::Cluster => "cluster",
            Mode::Random => "random",
        };
        f.write_str(name)
    }
}

/// The cluster-size schedule of a selection.
///
/// Consecutively yielded indices are grouped into clusters whose sizes either
/// stay fixed or cycle through a sequence, restarting when exhausted, until
/// every candidate has been scheduled. A size of 1 (the default) degenerates
/// to plain one-site-at-a-time selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClusterSizes {
    Fixed(usize),
    Cycle(Vec<usize>),
}

impl Default for ClusterSizes {
    fn default() -> Self {
        ClusterSizes::Fixed(1)
    }
}

impl From<usize> for ClusterSizes {
    fn from(size: usize) -> Self {
        ClusterSizes::Fixed(size)
    }
}

impl From<Vec<usize>> for ClusterSizes {
    fn from(sizes: Vec<usize>) -> Self {
        ClusterSizes::Cycle(sizes)
    }
}

impl ClusterSizes {
    pub fn validate(&self) -> Result<(), SelectionError> {
        match self {
            ClusterSizes::Fixed(0) => Err(SelectionError::ZeroClusterSize { position: 0 }),
            ClusterSizes::Fixed(_) => Ok(()),
            ClusterSizes::Cycle(sizes) if sizes.is_empty() => {
                Err(SelectionError::EmptyClusterSizes)
            }
            ClusterSizes::Cycle(sizes) => match sizes.iter().position(|&size| size == 0) {
                Some(position) => Err(SelectionError::ZeroClusterSize { position }),
                None => Ok(()),
            },
        }
    }

    /// Expands the schedule into one flag per greedy pick, `true` marking the
    /// first member of a new cluster. The caller validates the schedule first;
    /// an all-`false` expansion is impossible because every cluster starts
    /// with a `true`.
    pub(crate) fn boundary_flags(&self, picks: usize) -> Vec<bool> {
        let mut flags = Vec::with_capacity(picks);
        match self {
            ClusterSizes::Fixed(size) => {
                for i in 0..picks {
                    flags.push(i % size == 0);
                }
            }
            ClusterSizes::Cycle(sizes) => {
                for &size in sizes.iter().cycle() {
                    if flags.len() >= picks {
                        break;
                    }
                    flags.push(true);
                    for _ in 1..size {
                        if flags.len() >= picks {
                            break;
                        }
                        flags.push(false);
                    }
                }
            }
        }
        flags
    }
}

/// Parameters of one distribution call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistributionConfig {
    /// Selection mode; `uniform` when omitted.
    #[serde(default)]
    pub mode: Mode,
    /// Fraction of the candidate indices to return, in `(0.0, 1.0]`.
    pub fraction: f64,
    /// Use the edge-following surface metric instead of Euclidean separation.
    #[serde(default)]
    pub follow_edge: bool,
    /// Explicit starting row of the candidate-restricted distance matrix.
    #[serde(default)]
    pub start: Option<usize>,
    /// Cluster-size schedule; single sites when omitted.
    #[serde(default)]
    pub cluster_sizes: ClusterSizes,
    /// Probability in `[0.0, 1.0]` of overriding a greedy pick with a random
    /// still-available site; never when omitted.
    #[serde(default)]
    pub randomness: Option<f64>,
}

impl DistributionConfig {
    pub fn builder() -> DistributionConfigBuilder {
        DistributionConfigBuilder::new()
    }

    /// Checks every range constraint eagerly, before any computation.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if !(self.fraction > 0.0 && self.fraction <= 1.0) {
            return Err(SelectionError::FractionOutOfRange(self.fraction));
        }
        if let Some(randomness) = self.randomness {
            if !(0.0..=1.0).contains(&randomness) {
                return Err(SelectionError::RandomnessOutOfRange(randomness));
            }
        }
        self.cluster_sizes.validate()
    }
}

#[derive(Default)]
pub struct DistributionConfigBuilder {
    mode: Option<Mode>,
    fraction: Option<f64>,
    follow_edge: Option<bool>,
    start: Option<usize>,
    cluster_sizes: Option<ClusterSizes>,
    randomness: Option<f64>,
}

impl DistributionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn fraction(mut self, fraction: f64) -> Self {
        self.fraction = Some(fraction);
        self
    }
    pub fn follow_edge(mut self, follow_edge: bool) -> Self {
        self.follow_edge = Some(follow_edge);
        self
    }
    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }
    pub fn cluster_sizes(mut self, sizes: impl Into<ClusterSizes>) -> Self {
        self.cluster_sizes = Some(sizes.into());
        self
    }
    pub fn randomness(mut self, randomness: f64) -> Self {
        self.randomness = Some(randomness);
        self
    }

    pub fn build(self) -> Result<DistributionConfig, ConfigError> {
        Ok(DistributionConfig {
            mode: self.mode.ok_or(ConfigError::MissingParameter("mode"))?,
            fraction: self
                .fraction
                .ok_or(ConfigError::MissingParameter("fraction"))?,
            follow_edge: self.follow_edge.unwrap_or(false),
            start: self.start,
            cluster_sizes: self.cluster_sizes.unwrap_or_default(),
            randomness: self.randomness,
        })
    }
}
