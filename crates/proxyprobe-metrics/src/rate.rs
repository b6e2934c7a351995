use std::fmt;

/// A percentage rounded to one decimal place, or an explicit "not applicable"
/// when the denominator is empty. Never a fabricated zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateValue {
    NotApplicable,
    Pct(f64),
}

impl RateValue {
    pub fn from_counts(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            RateValue::NotApplicable
        } else {
            let pct = numerator as f64 / denominator as f64 * 100.0;
            RateValue::Pct((pct * 10.0).round() / 10.0)
        }
    }

    pub fn as_pct(&self) -> Option<f64> {
        match self {
            RateValue::NotApplicable => None,
            RateValue::Pct(v) => Some(*v),
        }
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::NotApplicable => write!(f, "N/A"),
            RateValue::Pct(v) => write!(f, "{v:.1}%"),
        }
    }
}
