#![forbid(unsafe_code)]

//! Dithering configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::diffusion::Kernel;
use crate::quantize::{MAX_BITS, MIN_BITS};

/// Environment variable naming the algorithm.
pub const ENV_ALGORITHM: &str = "TESSERA_DITHER";
/// Environment variable holding the bit depth.
pub const ENV_BITS: &str = "TESSERA_DITHER_BITS";
/// Environment variable pointing at a custom threshold matrix PNG.
pub const ENV_MATRIX: &str = "TESSERA_DITHER_MATRIX";

/// Vertical error multiplier for the stable diffusion variants.
pub const DEFAULT_STABLE_DECAY: f32 = 0.5;
/// Pixels with opacity below this are left alone.
pub const DEFAULT_OPACITY_SKIP_THRESHOLD: f32 = 0.05;
pub const DEFAULT_BITS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DitherAlgorithm {
    /// Plain quantization.
    None,
    /// 8×8 Bayer.
    Ordered,
    /// Threshold matrix: the configured PNG, or built-in blue noise.
    #[default]
    BlueNoise,
    FloydSteinberg,
    FloydSteinbergStable,
    Atkinson,
    AtkinsonStable,
    Sierra,
    SierraStable,
}

impl DitherAlgorithm {
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::Ordered,
        Self::BlueNoise,
        Self::FloydSteinberg,
        Self::FloydSteinbergStable,
        Self::Atkinson,
        Self::AtkinsonStable,
        Self::Sierra,
        Self::SierraStable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ordered => "ordered",
            Self::BlueNoise => "blue-noise",
            Self::FloydSteinberg => "floyd-steinberg",
            Self::FloydSteinbergStable => "floyd-steinberg-stable",
            Self::Atkinson => "atkinson",
            Self::AtkinsonStable => "atkinson-stable",
            Self::Sierra => "sierra",
            Self::SierraStable => "sierra-stable",
        }
    }

    /// Diffusion kernel and whether the stable decay applies.
    pub fn kernel(self) -> Option<(Kernel, bool)> {
        match self {
            Self::FloydSteinberg => Some((Kernel::FLOYD_STEINBERG, false)),
            Self::FloydSteinbergStable => Some((Kernel::FLOYD_STEINBERG, true)),
            Self::Atkinson => Some((Kernel::ATKINSON, false)),
            Self::AtkinsonStable => Some((Kernel::ATKINSON, true)),
            Self::Sierra => Some((Kernel::SIERRA, false)),
            Self::SierraStable => Some((Kernel::SIERRA, true)),
            Self::None | Self::Ordered | Self::BlueNoise => None,
        }
    }

    /// Output depends only on pixel position and value.
    pub fn is_temporally_stable(self) -> bool {
        matches!(self, Self::None | Self::Ordered | Self::BlueNoise)
    }
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let algorithm = match normalized.as_str() {
            "none" | "off" => Self::None,
            "ordered" | "bayer" => Self::Ordered,
            "blue-noise" | "bluenoise" | "threshold" => Self::BlueNoise,
            "floyd-steinberg" | "fs" => Self::FloydSteinberg,
            "floyd-steinberg-stable" | "fs-stable" => Self::FloydSteinbergStable,
            "atkinson" => Self::Atkinson,
            "atkinson-stable" => Self::AtkinsonStable,
            "sierra" => Self::Sierra,
            "sierra-stable" => Self::SierraStable,
            _ => return Err(ConfigError::UnknownAlgorithm(s.to_string())),
        };
        Ok(algorithm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownAlgorithm(String),
    InvalidBits(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlgorithm(s) => write!(f, "unknown dither algorithm: {s:?}"),
            Self::InvalidBits(s) => {
                write!(f, "invalid bit depth {s:?} (expected {MIN_BITS}..={MAX_BITS})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a bit depth, rejecting values outside `[1, 8]`.
pub fn parse_bits(s: &str) -> Result<u8, ConfigError> {
    match s.trim().parse::<u8>() {
        Ok(bits) if (MIN_BITS..=MAX_BITS).contains(&bits) => Ok(bits),
        _ => Err(ConfigError::InvalidBits(s.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DitherConfig {
    pub algorithm: DitherAlgorithm,
    /// Bits per channel; clamped to `[1, 8]` when applied.
    pub bits: u8,
    /// Threshold matrix used by [`DitherAlgorithm::BlueNoise`] instead of
    /// the built-in one.
    pub matrix_path: Option<PathBuf>,
    pub stable_decay: f32,
    pub opacity_skip_threshold: f32,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            algorithm: DitherAlgorithm::default(),
            bits: DEFAULT_BITS,
            matrix_path: None,
            stable_decay: DEFAULT_STABLE_DECAY,
            opacity_skip_threshold: DEFAULT_OPACITY_SKIP_THRESHOLD,
        }
    }
}

impl DitherConfig {
    pub fn new(algorithm: DitherAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits.clamp(MIN_BITS, MAX_BITS);
        self
    }

    #[must_use]
    pub fn with_matrix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.matrix_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_stable_decay(mut self, decay: f32) -> Self {
        self.stable_decay = decay;
        self
    }

    #[must_use]
    pub fn with_opacity_skip_threshold(mut self, threshold: f32) -> Self {
        self.opacity_skip_threshold = threshold;
        self
    }

    /// Defaults overridden by `TESSERA_DITHER`, `TESSERA_DITHER_BITS` and
    /// `TESSERA_DITHER_MATRIX`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_ALGORITHM) {
            match raw.parse() {
                Ok(algorithm) => config.algorithm = algorithm,
                Err(err) => {
                    tracing::warn!(target: "tessera::dither", %err, "ignoring {ENV_ALGORITHM}");
                }
            }
        }
        if let Some(raw) = lookup(ENV_BITS) {
            match parse_bits(&raw) {
                Ok(bits) => config.bits = bits,
                Err(err) => tracing::warn!(target: "tessera::dither", %err, "ignoring {ENV_BITS}"),
            }
        }
        if let Some(path) = lookup(ENV_MATRIX).filter(|p| !p.trim().is_empty()) {
            config.matrix_path = Some(PathBuf::from(path));
        }
        config
    }
}
