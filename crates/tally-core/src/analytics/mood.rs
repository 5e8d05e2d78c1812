//! Spending mood: a gamified read of this month's expense-to-income ratio

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Mood tiers, best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Excellent,
    Good,
    Okay,
    Worried,
    Dead,
}

/// Inclusive upper bound of the expense ratio (percent) for each tier.
/// Anything above the last bound is `Dead`.
const TIERS: [(u32, Mood); 4] = [
    (25, Mood::Excellent),
    (40, Mood::Good),
    (60, Mood::Okay),
    (80, Mood::Worried),
];

impl Mood {
    /// Classify a month from its income and expenses.
    ///
    /// Zero income is always `Dead`, whatever the expenses. So is a ratio too
    /// large to represent.
    pub fn classify(income: Decimal, expenses: Decimal) -> Self {
        if income.is_zero() {
            return Self::Dead;
        }
        expenses
            .checked_div(income)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Self::Dead, Self::from_ratio)
    }

    /// Tier for an expense ratio expressed in percent
    pub fn from_ratio(ratio: Decimal) -> Self {
        TIERS
            .iter()
            .find(|(bound, _)| ratio <= Decimal::from(*bound))
            .map(|(_, mood)| *mood)
            .unwrap_or(Self::Dead)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Excellent => "😎",
            Self::Good => "😊",
            Self::Okay => "😐",
            Self::Worried => "😰",
            Self::Dead => "💀",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Okay => "Okay",
            Self::Worried => "Worried",
            Self::Dead => "Dead",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

/// Serialized as `{"emoji": "😊", "text": "Good"}`
impl Serialize for Mood {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Mood", 2)?;
        state.serialize_field("emoji", self.emoji())?;
        state.serialize_field("text", self.label())?;
        state.end()
    }
}
