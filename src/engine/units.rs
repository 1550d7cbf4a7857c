//! Length normalization to centimeters.

use crate::engine::error::{Result, StatsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
    Inch,
    Foot,
    Mile,
}

impl LengthUnit {
    /// Detects the unit inside a free-form suffix such as " ft" or "Meters".
    ///
    /// Matching is by substring and the order matters: "mm" and "cm" are
    /// tried before a bare "m", which must not be part of "mm", "mi" or "km".
    pub fn detect(unit: &str) -> Option<Self> {
        let unit = unit.trim().to_lowercase();

        if unit.contains("mm") {
            Some(Self::Millimeter)
        } else if unit.contains("cm") {
            Some(Self::Centimeter)
        } else if unit.contains('m')
            && !unit.contains("mm")
            && !unit.contains("mi")
            && !unit.contains("km")
        {
            Some(Self::Meter)
        } else if unit.contains("km") {
            Some(Self::Kilometer)
        } else if unit.contains("in") {
            Some(Self::Inch)
        } else if unit.contains("ft") {
            Some(Self::Foot)
        } else if unit.contains("mi") {
            Some(Self::Mile)
        } else {
            None
        }
    }

    pub fn to_cm(&self) -> f64 {
        match self {
            Self::Millimeter => 0.1,
            Self::Centimeter => 1.0,
            Self::Meter => 100.0,
            Self::Kilometer => 100_000.0,
            Self::Inch => 2.54,
            Self::Foot => 30.48,
            Self::Mile => 160_934.0,
        }
    }
}

/// Converts `value` in `unit` to centimeters. Unknown or empty units are
/// taken as centimeters already.
pub fn normalize(value: f64, unit: &str) -> Result<f64> {
    let factor = LengthUnit::detect(unit).map_or(1.0, |u| u.to_cm());
    let cm = value * factor;

    if !cm.is_finite() || cm <= 0.0 {
        return Err(StatsError::InvalidMagnitude(cm));
    }
    Ok(cm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn detects_units_in_priority_order() {
        assert_eq!(LengthUnit::detect(" MM"), Some(LengthUnit::Millimeter));
        assert_eq!(LengthUnit::detect("cm"), Some(LengthUnit::Centimeter));
        assert_eq!(LengthUnit::detect(" meters"), Some(LengthUnit::Meter));
        assert_eq!(LengthUnit::detect("km"), Some(LengthUnit::Kilometer));
        assert_eq!(LengthUnit::detect(" in"), Some(LengthUnit::Inch));
        assert_eq!(LengthUnit::detect(" ft"), Some(LengthUnit::Foot));
        assert_eq!(LengthUnit::detect("mi"), Some(LengthUnit::Mile));
        assert_eq!(LengthUnit::detect(" lbs"), None);
        assert_eq!(LengthUnit::detect(""), None);
    }

    #[test]
    fn unknown_unit_falls_back_to_cm() {
        assert_eq!(normalize(42.0, " lbs").unwrap(), 42.0);
        assert_eq!(normalize(42.0, "").unwrap(), 42.0);
    }

    #[test]
    fn conversion_factors() {
        assert!(close(normalize(10.0, "mm").unwrap(), 1.0));
        assert!(close(normalize(6.0, " ft").unwrap(), 182.88));
        assert!(close(normalize(2.0, "km").unwrap(), 200_000.0));
        assert!(close(normalize(1.0, "miles").unwrap(), 160_934.0));
        assert!(close(normalize(12.0, "inches").unwrap(), 30.48));
    }

    #[test]
    fn linear_in_value() {
        for unit in ["mm", "cm", "m", "km", "in", "ft", "mi", "", "stone"] {
            let v = 3.7;
            assert!(
                close(normalize(2.0 * v, unit).unwrap(), 2.0 * normalize(v, unit).unwrap()),
                "not linear for {unit:?}"
            );
        }
    }

    #[test]
    fn cross_unit_equivalence() {
        assert!(close(normalize(1_000.0, "m").unwrap(), normalize(100_000.0, "cm").unwrap()));
        assert!(close(normalize(1.0, "km").unwrap(), normalize(100_000.0, "cm").unwrap()));
    }

    #[test]
    fn non_positive_is_invalid() {
        assert!(matches!(normalize(0.0, "ft"), Err(StatsError::InvalidMagnitude(_))));
        assert!(matches!(normalize(-3.0, "cm"), Err(StatsError::InvalidMagnitude(_))));
        assert!(matches!(normalize(f64::NAN, "cm"), Err(StatsError::InvalidMagnitude(_))));
    }
}
