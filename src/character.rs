use crate::config::{InkDensity, Settings};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub const INK_CAPACITY: u32 = 800;

const MAX_ROTATION_DEG: f64 = 1.5;
const MAX_VERTICAL_OFFSET_PX: f64 = 0.75;
const GHOST_PROBABILITY: f64 = 0.05;

/// Source of uniform samples in `[0, 1)` for strike imperfections.
pub trait RandomSource: fmt::Debug {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling once exhausted.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    samples: VecDeque<f64>,
}

impl SequenceSource {
    pub fn new<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        match self.samples.pop_front() {
            Some(v) => {
                self.samples.push_back(v);
                v
            }
            None => 0.5,
        }
    }
}

/// one strike on the paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedCharacter {
    pub char: char,
    pub rotation: f64,
    #[serde(rename = "offsetY", alias = "verticalOffset")]
    pub vertical_offset: f64,
    pub ink_density: InkDensity,
    pub has_ghost: bool,
    pub is_strikethrough: bool,
    pub is_red_ink: bool,
}

/// Density the ribbon alone can still deliver.
pub fn ribbon_density(ink_remaining: u32) -> InkDensity {
    // 30% and 60% of capacity, kept in integers
    let remaining = ink_remaining as u64 * 10;
    let capacity = INK_CAPACITY as u64;
    if remaining < capacity * 3 {
        InkDensity::Low
    } else if remaining < capacity * 6 {
        InkDensity::Medium
    } else {
        InkDensity::High
    }
}

/// Worse of the configured density and what the ribbon can deliver.
pub fn effective_density(configured: InkDensity, ink_remaining: u32) -> InkDensity {
    configured.min(ribbon_density(ink_remaining))
}

/// Builds a strike for `c`. Samples are drawn in the order rotation,
/// vertical offset, ghost.
pub fn generate(
    c: char,
    settings: &Settings,
    ink_remaining: u32,
    rng: &mut dyn RandomSource,
) -> TypedCharacter {
    let rotation = (rng.next_unit() - 0.5) * MAX_ROTATION_DEG * 2.0;
    let vertical_offset = (rng.next_unit() - 0.5) * MAX_VERTICAL_OFFSET_PX * 2.0;
    let has_ghost = rng.next_unit() < GHOST_PROBABILITY;

    TypedCharacter {
        char: c,
        rotation,
        vertical_offset,
        ink_density: effective_density(settings.ink_density, ink_remaining),
        has_ghost,
        is_strikethrough: false,
        is_red_ink: settings.is_red_ink,
    }
}
