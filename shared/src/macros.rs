//! Macronutrient allocation
//!
//! Turns a calorie budget and a percentage split into gram targets. Gram
//! amounts are always rounded down so the targets never add up to more
//! energy than the budget.

use serde::{Deserialize, Serialize};

use crate::units::lenient_number;

/// Energy density of protein (kcal/g)
pub const KCAL_PER_G_PROTEIN: i64 = 4;
/// Energy density of carbohydrate (kcal/g)
pub const KCAL_PER_G_CARBS: i64 = 4;
/// Energy density of fat (kcal/g)
pub const KCAL_PER_G_FAT: i64 = 9;

pub const DEFAULT_PROTEIN_PCT: i32 = 30;
pub const DEFAULT_CARBS_PCT: i32 = 50;
pub const DEFAULT_FAT_PCT: i32 = 20;

/// Percentage split as supplied by the user (possibly partial or unnormalized)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MacroSplit {
    #[serde(default, alias = "protein", deserialize_with = "lenient_number")]
    pub protein_pct: Option<f64>,
    #[serde(default, alias = "carbs", deserialize_with = "lenient_number")]
    pub carbs_pct: Option<f64>,
    #[serde(default, alias = "fat", deserialize_with = "lenient_number")]
    pub fat_pct: Option<f64>,
}

impl MacroSplit {
    pub fn new(protein_pct: f64, carbs_pct: f64, fat_pct: f64) -> Self {
        Self {
            protein_pct: Some(protein_pct),
            carbs_pct: Some(carbs_pct),
            fat_pct: Some(fat_pct),
        }
    }

    /// Resolve defaults and rescale so the three shares sum to exactly 100
    pub fn normalize(&self) -> NormalizedSplit {
        let protein = whole_pct(self.protein_pct, DEFAULT_PROTEIN_PCT);
        let carbs = whole_pct(self.carbs_pct, DEFAULT_CARBS_PCT);
        let fat = whole_pct(self.fat_pct, DEFAULT_FAT_PCT);

        let total = protein + carbs + fat;
        if total <= 0 {
            return NormalizedSplit::default();
        }
        if total == 100 {
            return NormalizedSplit {
                protein_pct: protein as i32,
                carbs_pct: carbs as i32,
                fat_pct: fat as i32,
            };
        }

        let scale = 100.0 / total as f64;
        let protein = (protein as f64 * scale).round() as i32;
        let mut carbs = (carbs as f64 * scale).round() as i32;
        let mut fat = 100 - protein - carbs;
        // Two halves rounding up together can overshoot by one point
        if fat < 0 {
            carbs += fat;
            fat = 0;
        }

        NormalizedSplit {
            protein_pct: protein,
            carbs_pct: carbs,
            fat_pct: fat,
        }
    }
}

/// Largest share taken at face value before rescaling
const MAX_SHARE: f64 = i32::MAX as f64;

/// Missing shares take their default; fractions truncate; negatives count as zero
///
/// Shares are capped at [`MAX_SHARE`] and widened to `i64`, so three of them
/// always sum without overflow.
fn whole_pct(value: Option<f64>, default: i32) -> i64 {
    match value {
        Some(v) if v.is_finite() => v.trunc().clamp(0.0, MAX_SHARE) as i64,
        Some(_) => 0,
        None => i64::from(default),
    }
}

/// Percentages that are guaranteed to sum to exactly 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSplit {
    pub protein_pct: i32,
    pub carbs_pct: i32,
    pub fat_pct: i32,
}

impl Default for NormalizedSplit {
    fn default() -> Self {
        Self {
            protein_pct: DEFAULT_PROTEIN_PCT,
            carbs_pct: DEFAULT_CARBS_PCT,
            fat_pct: DEFAULT_FAT_PCT,
        }
    }
}

impl NormalizedSplit {
    /// Convert a calorie budget into gram targets using this split
    pub fn allocate(&self, calories: i32) -> MacroTargets {
        let calories = i64::from(calories.max(0));
        let grams = |pct: i32, kcal_per_g: i64| -> i32 {
            // both operands are non-negative, so integer division is a floor
            (calories * i64::from(pct) / (100 * kcal_per_g)) as i32
        };

        MacroTargets {
            protein_g: grams(self.protein_pct, KCAL_PER_G_PROTEIN),
            carbs_g: grams(self.carbs_pct, KCAL_PER_G_CARBS),
            fats_g: grams(self.fat_pct, KCAL_PER_G_FAT),
            protein_pct: self.protein_pct,
            carbs_pct: self.carbs_pct,
            fat_pct: self.fat_pct,
        }
    }
}

/// Gram targets plus the percentages they were derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fats_g: i32,
    pub protein_pct: i32,
    pub carbs_pct: i32,
    pub fat_pct: i32,
}

impl MacroTargets {
    /// Energy actually covered by the gram targets
    pub fn total_kcal(&self) -> i64 {
        i64::from(self.protein_g) * KCAL_PER_G_PROTEIN
            + i64::from(self.carbs_g) * KCAL_PER_G_CARBS
            + i64::from(self.fats_g) * KCAL_PER_G_FAT
    }

    /// The split these targets were built from
    pub fn split(&self) -> NormalizedSplit {
        NormalizedSplit {
            protein_pct: self.protein_pct,
            carbs_pct: self.carbs_pct,
            fat_pct: self.fat_pct,
        }
    }
}

/// Allocate a calorie budget across macros
///
/// `split` may be missing, partial, or not sum to 100; see [`MacroSplit::normalize`].
pub fn allocate_macros(calories: i32, split: Option<&MacroSplit>) -> MacroTargets {
    split
        .map(MacroSplit::normalize)
        .unwrap_or_default()
        .allocate(calories)
}
