use crate::error::InvalidInput;
use crate::footprint::ExtendedPolygon;

/// The check an instant failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// The safety envelopes overlap.
    Overlap,
    /// The longitudinal gap is smaller than the RSS distance.
    InsufficientGap,
    /// Both of the above.
    OverlapAndInsufficientGap,
}

impl Criterion {
    pub(crate) fn from_checks(overlap: bool, insufficient_gap: bool) -> Option<Self> {
        match (overlap, insufficient_gap) {
            (true, true) => Some(Self::OverlapAndInsufficientGap),
            (true, false) => Some(Self::Overlap),
            (false, true) => Some(Self::InsufficientGap),
            (false, false) => None,
        }
    }

    /// A short identifier, e.g. for debug output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overlap => "overlap",
            Self::InsufficientGap => "insufficient_gap",
            Self::OverlapAndInsufficientGap => "overlap_and_insufficient_gap",
        }
    }
}

/// Evidence of an unsafe instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ViolationRecord {
    /// The index of the object trajectory.
    pub object: usize,
    /// The time of the instant in s.
    pub time: f64,
    /// Ego's safety envelope.
    pub ego_polygon: ExtendedPolygon,
    /// The object's safety envelope.
    pub object_polygon: ExtendedPolygon,
    /// The required longitudinal distance, if the pair was aligned.
    pub rss_distance: Option<f64>,
    /// The actual longitudinal gap, if the pair was aligned.
    pub gap: Option<f64>,
    /// The criterion that failed.
    pub criterion: Criterion,
}

/// An object input that could not be evaluated and was skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct Anomaly {
    /// The index of the object trajectory.
    pub object: usize,
    /// The instant skipped, or `None` if the whole trajectory was skipped.
    pub time: Option<f64>,
    /// Why the input was skipped.
    pub cause: InvalidInput,
}

/// The outcome of checking one object trajectory.
#[derive(Clone, Debug, Default)]
pub(crate) struct PairOutcome {
    pub violations: Vec<ViolationRecord>,
    pub anomalies: Vec<Anomaly>,
}

/// The result of checking an ego trajectory against a set of objects.
#[derive(Clone, Debug, PartialEq)]
pub struct SafetyVerdict {
    violations: Vec<ViolationRecord>,
    anomalies: Vec<Anomaly>,
}

impl SafetyVerdict {
    /// Combines per-object outcomes, in object order.
    pub(crate) fn from_outcomes(outcomes: impl IntoIterator<Item = PairOutcome>) -> Self {
        let mut verdict = Self {
            violations: vec![],
            anomalies: vec![],
        };
        for outcome in outcomes {
            verdict.violations.extend(outcome.violations);
            verdict.anomalies.extend(outcome.anomalies);
        }
        verdict
    }

    /// Whether every checked instant passed against every object.
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether every checked instant passed against the given object.
    pub fn is_object_safe(&self, object: usize) -> bool {
        !self.violations.iter().any(|v| v.object == object)
    }

    /// The violations, ordered by object and then by time.
    pub fn violations(&self) -> &[ViolationRecord] {
        &self.violations
    }

    /// Inputs that were skipped.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }
}
