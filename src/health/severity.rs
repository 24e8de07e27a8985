//! The three-level severity scale shared by classifiers and the ranker.

use serde::Serialize;

/// Health severity of an entity or a single dimension.
///
/// The discriminants are the ranking weights: OK=1, WARNING=2, ERROR=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Ok = 1,
    Warning = 2,
    Error = 4,
}

impl Severity {
    /// Derive the entity severity from its aggregate `has` flags.
    pub fn from_flags(error_has: bool, warning_has: bool) -> Self {
        if error_has {
            Severity::Error
        } else if warning_has {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// Tier a value against exclusive error and warning thresholds.
    ///
    /// Non-finite values (a zero denominator upstream) never alert.
    pub fn tier(value: f64, error_above: f64, warn_above: f64) -> Self {
        if !value.is_finite() {
            Severity::Ok
        } else if value > error_above {
            Severity::Error
        } else if value > warn_above {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// Ranking weight.
    pub fn weight(self) -> u8 {
        self as u8
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARN",
            Severity::Error => "ERR",
        }
    }

    /// Returns the full label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Number of entities at each severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeverityCounts {
    pub ok: usize,
    pub warning: usize,
    pub error: usize,
}

impl SeverityCounts {
    /// Count the severities yielded by an iterator.
    pub fn tally(severities: impl IntoIterator<Item = Severity>) -> Self {
        let mut counts = Self::default();
        for severity in severities {
            match severity {
                Severity::Ok => counts.ok += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts
    }

    /// Total entities counted.
    pub fn total(&self) -> usize {
        self.ok + self.warning + self.error
    }

    /// The worst severity present, `Ok` when empty.
    pub fn worst(&self) -> Severity {
        Severity::from_flags(self.error > 0, self.warning > 0)
    }
}

impl std::ops::Add for SeverityCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            ok: self.ok + other.ok,
            warning: self.warning + other.warning,
            error: self.error + other.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights() {
        assert_eq!(Severity::Ok.weight(), 1);
        assert_eq!(Severity::Warning.weight(), 2);
        assert_eq!(Severity::Error.weight(), 4);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
    }

    #[test]
    fn test_from_flags_error_wins() {
        assert_eq!(Severity::from_flags(true, true), Severity::Error);
        assert_eq!(Severity::from_flags(true, false), Severity::Error);
        assert_eq!(Severity::from_flags(false, true), Severity::Warning);
        assert_eq!(Severity::from_flags(false, false), Severity::Ok);
    }

    #[test]
    fn test_tier_is_exclusive() {
        assert_eq!(Severity::tier(90.0, 90.0, 80.0), Severity::Warning);
        assert_eq!(Severity::tier(90.01, 90.0, 80.0), Severity::Error);
        assert_eq!(Severity::tier(80.0, 90.0, 80.0), Severity::Ok);
        assert_eq!(Severity::tier(f64::NAN, 90.0, 80.0), Severity::Ok);
        assert_eq!(Severity::tier(f64::INFINITY, 90.0, 80.0), Severity::Ok);
    }

    #[test]
    fn test_counts() {
        let counts = SeverityCounts::tally([
            Severity::Ok,
            Severity::Error,
            Severity::Warning,
            Severity::Ok,
        ]);
        assert_eq!(counts, SeverityCounts { ok: 2, warning: 1, error: 1 });
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.worst(), Severity::Error);
        assert_eq!(SeverityCounts::default().worst(), Severity::Ok);
    }

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
    }
}
