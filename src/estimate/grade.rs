//! Letter grade assignment.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Eco score, best (A) to worst (E).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum EcoScore {
    A,
    B,
    C,
    D,
    E,
}

impl EcoScore {
    /// Grade for a cleaner-than percentile: ≥90 A, ≥75 B, ≥50 C, ≥25 D, else E.
    pub fn from_percentile(cleaner_than_percent: u8) -> Self {
        match cleaner_than_percent {
            90..=u8::MAX => EcoScore::A,
            75..=89 => EcoScore::B,
            50..=74 => EcoScore::C,
            25..=49 => EcoScore::D,
            _ => EcoScore::E,
        }
    }
}

/// Shorthand for [`EcoScore::from_percentile`].
pub fn grade(cleaner_than_percent: u8) -> EcoScore {
    EcoScore::from_percentile(cleaner_than_percent)
}
