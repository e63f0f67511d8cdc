//! Accelerated backend over a shared linear memory
//!
//! Calls follow a fixed convention: the backend writes a header and the
//! operands into the input region, invokes an export, and reads results
//! from the output region. Offsets live here and nowhere else.
//!
//! ```text
//! word 0                16                16 + R            16 + 2R
//! | header (16 words)   | input region (R) | output region (R) |
//! ```
//!
//! The memory is reused across calls, so every call holds the lock for
//! its whole write → invoke → read sequence.

use parking_lot::Mutex;

use crate::color::Lab;
use crate::config::AcceleratedConfig;
use crate::difference::{DeltaEAlgorithm, is_closer};
use crate::simd;
use crate::{Error, Result};

use super::backend::MathBackend;

/// Reserved words at the start of the memory
pub const HEADER_WORDS: usize = 16;

/// Smallest input/output region the backend will run with
pub const MIN_REGION_WORDS: usize = 64;

const EXPORT_SLOT: usize = 0;
const COUNT_SLOT: usize = 1;
const ALGORITHM_SLOT: usize = 2;

/// Entry points of the accelerated module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Export {
    RgbToLab = 1,
    DeltaE76 = 2,
    DeltaE94 = 3,
    DeltaE2000 = 4,
    DistanceMatrix = 5,
    NearestColor = 6,
}

impl Export {
    fn from_word(word: f64) -> Option<Self> {
        Some(match word as u8 {
            1 => Self::RgbToLab,
            2 => Self::DeltaE76,
            3 => Self::DeltaE94,
            4 => Self::DeltaE2000,
            5 => Self::DistanceMatrix,
            6 => Self::NearestColor,
            _ => return None,
        })
    }
}

fn algorithm_word(algorithm: DeltaEAlgorithm) -> f64 {
    match algorithm {
        DeltaEAlgorithm::Cie76 => 0.0,
        DeltaEAlgorithm::Cie94 => 1.0,
        DeltaEAlgorithm::Ciede2000 => 2.0,
    }
}

fn algorithm_from_word(word: f64) -> DeltaEAlgorithm {
    match word as u8 {
        0 => DeltaEAlgorithm::Cie76,
        1 => DeltaEAlgorithm::Cie94,
        _ => DeltaEAlgorithm::Ciede2000,
    }
}

/// Flat f64 memory split into header, input and output regions
#[derive(Debug)]
pub struct LinearMemory {
    words: Vec<f64>,
    region: usize,
}

impl LinearMemory {
    /// Allocate `total_words`, split evenly after the header
    pub fn new(total_words: usize) -> Result<Self> {
        let region = total_words.saturating_sub(HEADER_WORDS) / 2;
        if region < MIN_REGION_WORDS {
            return Err(Error::BufferSize {
                expected: HEADER_WORDS + 2 * MIN_REGION_WORDS,
                actual: total_words,
            });
        }
        Ok(Self {
            words: vec![0.0; HEADER_WORDS + 2 * region],
            region,
        })
    }

    /// Words available in each of the input and output regions
    pub fn region_words(&self) -> usize {
        self.region
    }

    /// Triples that fit in one region
    fn triple_capacity(&self) -> usize {
        self.region / 3
    }

    fn write(&mut self, export: Export, count: usize, algorithm: DeltaEAlgorithm, input: &[f64]) -> Result<()> {
        if input.len() > self.region {
            return Err(Error::BufferSize {
                expected: input.len(),
                actual: self.region,
            });
        }
        self.words[EXPORT_SLOT] = export as u8 as f64;
        self.words[COUNT_SLOT] = count as f64;
        self.words[ALGORITHM_SLOT] = algorithm_word(algorithm);
        self.words[HEADER_WORDS..HEADER_WORDS + input.len()].copy_from_slice(input);
        Ok(())
    }

    fn output(&self, len: usize) -> &[f64] {
        let start = HEADER_WORDS + self.region;
        &self.words[start..start + len]
    }

    /// Run the export named in the header; returns the output word count
    fn invoke(&mut self) -> Result<usize> {
        let region = self.region;
        let (header, rest) = self.words.split_at_mut(HEADER_WORDS);
        let (input, output) = rest.split_at_mut(region);

        let export = Export::from_word(header[EXPORT_SLOT])
            .ok_or_else(|| Error::InvalidRequest(format!("no export {}", header[EXPORT_SLOT])))?;
        let count = header[COUNT_SLOT] as usize;
        let algorithm = algorithm_from_word(header[ALGORITHM_SLOT]);

        let need_input = match export {
            Export::RgbToLab | Export::DistanceMatrix => 3 * count,
            Export::DeltaE76 | Export::DeltaE94 | Export::DeltaE2000 => 6,
            Export::NearestColor => 3 + 3 * count,
        };
        let need_output = match export {
            Export::RgbToLab => 3 * count,
            Export::DistanceMatrix => count * count,
            Export::DeltaE76 | Export::DeltaE94 | Export::DeltaE2000 => 1,
            Export::NearestColor => 2,
        };
        for need in [need_input, need_output] {
            if need > region {
                return Err(Error::BufferSize {
                    expected: need,
                    actual: region,
                });
            }
        }

        let input: &[[f64; 3]] = bytemuck::cast_slice(&input[..need_input]);
        match export {
            Export::RgbToLab => {
                let out: &mut [[f64; 3]] = bytemuck::cast_slice_mut(&mut output[..need_output]);
                simd::rgb_to_lab_batch(input, out);
            }
            Export::DeltaE76 | Export::DeltaE94 | Export::DeltaE2000 => {
                let algorithm = match export {
                    Export::DeltaE76 => DeltaEAlgorithm::Cie76,
                    Export::DeltaE94 => DeltaEAlgorithm::Cie94,
                    _ => DeltaEAlgorithm::Ciede2000,
                };
                simd::delta_e_batch(input[0], &input[1..2], algorithm, &mut output[..1]);
            }
            Export::DistanceMatrix => {
                simd::distance_matrix(input, algorithm, &mut output[..need_output]);
            }
            Export::NearestColor => {
                let (index, distance) = simd::nearest(input[0], &input[1..], algorithm)
                    .map_or((-1.0, f64::INFINITY), |(i, d)| (i as f64, d));
                output[0] = index;
                output[1] = distance;
            }
        }
        Ok(need_output)
    }

    fn call(&mut self, export: Export, count: usize, algorithm: DeltaEAlgorithm, input: &[f64]) -> Result<&[f64]> {
        self.write(export, count, algorithm, input)?;
        let len = self.invoke()?;
        Ok(self.output(len))
    }
}

fn lab_words(labs: &[Lab]) -> Vec<f64> {
    labs.iter().flat_map(|lab| lab.to_array()).collect()
}

/// Backend that runs the multiversioned SIMD kernels through linear memory
#[derive(Debug)]
pub struct AcceleratedBackend {
    memory: Mutex<LinearMemory>,
    features: &'static str,
}

impl AcceleratedBackend {
    /// Set up the module according to `config`
    pub fn load(config: &AcceleratedConfig) -> Result<Self> {
        if !config.enabled {
            return Err(Error::AcceleratedUnavailable("disabled by configuration".into()));
        }
        let memory = LinearMemory::new(config.memory_words)
            .map_err(|err| Error::AcceleratedUnavailable(err.to_string()))?;
        Ok(Self {
            memory: Mutex::new(memory),
            features: simd::active_features(),
        })
    }

    /// Instruction set the kernels dispatched to
    pub fn features(&self) -> &'static str {
        self.features
    }

    fn delta_e(&self, export: Export, a: Lab, b: Lab) -> Result<f64> {
        let mut input = [0.0; 6];
        input[..3].copy_from_slice(&a.to_array());
        input[3..].copy_from_slice(&b.to_array());
        let mut memory = self.memory.lock();
        let out = memory.call(export, 1, DeltaEAlgorithm::default(), &input)?;
        Ok(out[0])
    }
}

impl MathBackend for AcceleratedBackend {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn rgb_to_lab(&self, rgb: [f64; 3]) -> Result<Lab> {
        let mut memory = self.memory.lock();
        let out = memory.call(Export::RgbToLab, 1, DeltaEAlgorithm::default(), &rgb)?;
        Ok(Lab::new(out[0], out[1], out[2]))
    }

    fn delta_e_cie76(&self, a: Lab, b: Lab) -> Result<f64> {
        self.delta_e(Export::DeltaE76, a, b)
    }

    fn delta_e_cie94(&self, a: Lab, b: Lab) -> Result<f64> {
        self.delta_e(Export::DeltaE94, a, b)
    }

    fn delta_e_2000(&self, a: Lab, b: Lab) -> Result<f64> {
        self.delta_e(Export::DeltaE2000, a, b)
    }

    fn batch_rgb_to_lab(&self, rgb: &[[f64; 3]]) -> Result<Vec<Lab>> {
        let mut memory = self.memory.lock();
        let chunk = memory.triple_capacity();
        let mut labs = Vec::with_capacity(rgb.len());
        for part in rgb.chunks(chunk) {
            let out = memory.call(
                Export::RgbToLab,
                part.len(),
                DeltaEAlgorithm::default(),
                bytemuck::cast_slice(part),
            )?;
            labs.extend(out.chunks_exact(3).map(|v| Lab::new(v[0], v[1], v[2])));
        }
        Ok(labs)
    }

    fn distance_matrix(&self, labs: &[Lab], algorithm: DeltaEAlgorithm) -> Result<Vec<f64>> {
        let input = lab_words(labs);
        let mut memory = self.memory.lock();
        let out = memory.call(Export::DistanceMatrix, labs.len(), algorithm, &input)?;
        Ok(out.to_vec())
    }

    fn find_nearest(
        &self,
        target: Lab,
        candidates: &[Lab],
        algorithm: DeltaEAlgorithm,
    ) -> Result<Option<(usize, f64)>> {
        let mut memory = self.memory.lock();
        let chunk = memory.triple_capacity() - 1;

        let mut best: Option<(usize, f64)> = None;
        for (n, part) in candidates.chunks(chunk).enumerate() {
            let mut input = Vec::with_capacity(3 + 3 * part.len());
            input.extend_from_slice(&target.to_array());
            input.extend(lab_words(part));

            let out = memory.call(Export::NearestColor, part.len(), algorithm, &input)?;
            if out[0] < 0.0 {
                continue;
            }
            let found = (n * chunk + out[0] as usize, out[1]);
            if is_closer(found.1, best) {
                best = Some(found);
            }
        }
        Ok(best)
    }
}
