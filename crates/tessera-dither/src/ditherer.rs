#![forbid(unsafe_code)]

//! The dithering context: configuration plus the caches and scratch buffers
//! that make repeated frames allocation-free.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DitherAlgorithm, DitherConfig};
use crate::diffusion::ErrorDiffuser;
use crate::matrix::{MatrixCache, ThresholdMatrix, dither_threshold};
use crate::ordered::dither_ordered;
use crate::quantize::{Quantizer, quantize_in_place};

#[derive(Debug, Default)]
pub struct Ditherer {
    config: DitherConfig,
    matrices: MatrixCache,
    diffuser: ErrorDiffuser,
    /// Matrix paths that already failed; these fall back without retrying.
    failed_paths: HashSet<PathBuf>,
}

impl Ditherer {
    pub fn new(config: DitherConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DitherConfig {
        &self.config
    }

    /// Replace the configuration. Cached matrices are kept.
    pub fn set_config(&mut self, config: DitherConfig) {
        self.config = config;
    }

    pub fn matrices(&mut self) -> &mut MatrixCache {
        &mut self.matrices
    }

    /// Drop cached matrices and forget failed paths.
    pub fn clear_caches(&mut self) {
        self.matrices.clear();
        self.failed_paths.clear();
    }

    fn quantizer(&self) -> Quantizer {
        Quantizer::new(self.config.bits).with_opacity_skip(self.config.opacity_skip_threshold)
    }

    /// Load the threshold matrix ahead of the first frame so the render path
    /// never touches the filesystem.
    ///
    /// Returns `false` when the configured algorithm has already degraded to
    /// ordered dithering because its matrix could not be loaded.
    pub fn preload(&mut self) -> bool {
        self.config.algorithm != DitherAlgorithm::BlueNoise || self.threshold_matrix().is_some()
    }

    /// Matrix for [`DitherAlgorithm::BlueNoise`], or `None` when the
    /// configured path cannot be used.
    fn threshold_matrix(&mut self) -> Option<Arc<ThresholdMatrix>> {
        let Some(path) = self.config.matrix_path.clone() else {
            return Some(self.matrices.blue_noise());
        };
        if self.failed_paths.contains(&path) {
            return None;
        }
        match self.matrices.load(&path) {
            Ok(matrix) => Some(matrix),
            Err(err) => {
                tracing::warn!(
                    target: "tessera::dither",
                    path = %path.display(),
                    error = %err,
                    "threshold matrix unavailable, falling back to ordered dithering"
                );
                self.failed_paths.insert(path);
                None
            }
        }
    }

    /// Dither an RGBA buffer in place.
    ///
    /// Returns the algorithm actually applied, which differs from the
    /// configured one only when a matrix load failed.
    pub fn dither(&mut self, pixels: &mut [u8], width: usize, height: usize) -> DitherAlgorithm {
        let quantizer = self.quantizer();
        let algorithm = self.config.algorithm;
        match algorithm {
            DitherAlgorithm::None => {
                quantize_in_place(pixels, width, height, quantizer);
                algorithm
            }
            DitherAlgorithm::Ordered => {
                dither_ordered(pixels, width, height, quantizer);
                algorithm
            }
            DitherAlgorithm::BlueNoise => match self.threshold_matrix() {
                Some(matrix) => {
                    dither_threshold(pixels, width, height, quantizer, &matrix);
                    algorithm
                }
                None => {
                    dither_ordered(pixels, width, height, quantizer);
                    DitherAlgorithm::Ordered
                }
            },
            _ => {
                if let Some((kernel, stable)) = algorithm.kernel() {
                    let scale = if stable { self.config.stable_decay } else { 1.0 };
                    self.diffuser
                        .dither(pixels, width, height, quantizer, &kernel, scale);
                }
                algorithm
            }
        }
    }
}
