use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HousingColor {
    #[default]
    ForestGreen,
    Burgundy,
    Black,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PaperType {
    #[default]
    Standard,
    CoffeeStained,
    Yellowed,
}

/// How dark a strike lands on the paper.
///
/// Variants are declared from worst to best so `Ord` matches print quality:
/// `Low < Medium < High`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum InkDensity {
    Low,
    Medium,
    #[default]
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub housing_color: HousingColor,
    pub paper_type: PaperType,
    pub ink_density: InkDensity,
    pub sound_enabled: bool,
    pub margin_bell_enabled: bool,
    pub jam_simulation_enabled: bool,
    pub is_red_ink: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            housing_color: HousingColor::ForestGreen,
            paper_type: PaperType::Standard,
            ink_density: InkDensity::High,
            sound_enabled: true,
            margin_bell_enabled: true,
            jam_simulation_enabled: true,
            is_red_ink: false,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub housing_color: Option<HousingColor>,
    pub paper_type: Option<PaperType>,
    pub ink_density: Option<InkDensity>,
    pub sound_enabled: Option<bool>,
    pub margin_bell_enabled: Option<bool>,
    pub jam_simulation_enabled: Option<bool>,
    pub is_red_ink: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Settings {
    /// Shallow merge: every field set in `patch` replaces the current one.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.housing_color {
            self.housing_color = v;
        }
        if let Some(v) = patch.paper_type {
            self.paper_type = v;
        }
        if let Some(v) = patch.ink_density {
            self.ink_density = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = patch.margin_bell_enabled {
            self.margin_bell_enabled = v;
        }
        if let Some(v) = patch.jam_simulation_enabled {
            self.jam_simulation_enabled = v;
        }
        if let Some(v) = patch.is_red_ink {
            self.is_red_ink = v;
        }
    }
}

/// The variant after `current` in declaration order, wrapping around.
pub fn cycle<T: ValueEnum + PartialEq + Clone>(current: &T) -> T {
    let variants = T::value_variants();
    let next = variants
        .iter()
        .position(|v| v == current)
        .map_or(0, |i| (i + 1) % variants.len());
    variants[next].clone()
}
