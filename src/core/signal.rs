//! Signal state machine mapping classifications to one lit indicator.
//!
//! RED requires two consecutive outlier ticks; a lone outlier tick falls
//! through to the class colour.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of the outlier model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierFlag {
    Inlier,
    Outlier,
}

impl OutlierFlag {
    /// Map a raw model output (`-1` = outlier) to a flag.
    pub fn from_raw(raw: i64) -> Self {
        if raw == -1 {
            OutlierFlag::Outlier
        } else {
            OutlierFlag::Inlier
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            OutlierFlag::Inlier => 1,
            OutlierFlag::Outlier => -1,
        }
    }

    pub fn is_outlier(self) -> bool {
        self == OutlierFlag::Outlier
    }
}

/// Label produced by the two-class model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLabel {
    Class0,
    Class1,
}

impl ClassLabel {
    /// Map a raw model label; anything other than `0` is class 1.
    pub fn from_raw(raw: i64) -> Self {
        if raw == 0 {
            ClassLabel::Class0
        } else {
            ClassLabel::Class1
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            ClassLabel::Class0 => 0,
            ClassLabel::Class1 => 1,
        }
    }
}

/// Output of the classifier ensemble for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub outlier: OutlierFlag,
    pub class: ClassLabel,
}

impl ClassificationResult {
    pub fn new(outlier: OutlierFlag, class: ClassLabel) -> Self {
        Self { outlier, class }
    }
}

/// The three physical indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Red,
    Green,
    Blue,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Red, Indicator::Green, Indicator::Blue];
}

/// Exclusive output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    /// Anomaly confirmed by two consecutive outlier ticks
    Red,
    /// Normal, class 0
    Green,
    /// Normal, class 1
    Blue,
}

impl SignalState {
    /// The indicator lit in this state.
    pub fn indicator(self) -> Indicator {
        match self {
            SignalState::Red => Indicator::Red,
            SignalState::Green => Indicator::Green,
            SignalState::Blue => Indicator::Blue,
        }
    }

    /// Indicator writes in the order they are applied.
    ///
    /// RED clears blue and green before lighting; GREEN and BLUE clear red
    /// first, then set their own pair.
    pub fn transitions(self) -> [(Indicator, bool); 3] {
        match self {
            SignalState::Red => [
                (Indicator::Blue, false),
                (Indicator::Green, false),
                (Indicator::Red, true),
            ],
            SignalState::Green => [
                (Indicator::Red, false),
                (Indicator::Blue, false),
                (Indicator::Green, true),
            ],
            SignalState::Blue => [
                (Indicator::Red, false),
                (Indicator::Blue, true),
                (Indicator::Green, false),
            ],
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalState::Red => write!(f, "RED"),
            SignalState::Green => write!(f, "GREEN"),
            SignalState::Blue => write!(f, "BLUE"),
        }
    }
}

/// Debounced state machine with one tick of outlier memory.
#[derive(Debug, Clone)]
pub struct SignalStateMachine {
    last_outlier: OutlierFlag,
    current: Option<SignalState>,
}

impl SignalStateMachine {
    pub fn new() -> Self {
        Self {
            last_outlier: OutlierFlag::Inlier,
            current: None,
        }
    }

    /// Decide this tick's state, then remember the outlier flag.
    pub fn step(&mut self, result: ClassificationResult) -> SignalState {
        let state = if result.outlier.is_outlier() && self.last_outlier.is_outlier() {
            SignalState::Red
        } else {
            match result.class {
                ClassLabel::Class0 => SignalState::Green,
                ClassLabel::Class1 => SignalState::Blue,
            }
        };

        self.last_outlier = result.outlier;
        self.current = Some(state);
        state
    }

    /// State decided on the most recent tick, if any.
    pub fn current(&self) -> Option<SignalState> {
        self.current
    }

    pub fn last_outlier(&self) -> OutlierFlag {
        self.last_outlier
    }
}

impl Default for SignalStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outlier: bool, class: i64) -> ClassificationResult {
        ClassificationResult::new(
            OutlierFlag::from_raw(if outlier { -1 } else { 1 }),
            ClassLabel::from_raw(class),
        )
    }

    #[test]
    fn test_single_outlier_never_red() {
        let mut machine = SignalStateMachine::new();
        assert_eq!(machine.step(result(true, 0)), SignalState::Green);
        assert_eq!(machine.step(result(false, 0)), SignalState::Green);
        assert_eq!(machine.step(result(true, 1)), SignalState::Blue);
        assert_eq!(machine.step(result(false, 1)), SignalState::Blue);
    }

    #[test]
    fn test_two_consecutive_outliers_go_red() {
        let mut machine = SignalStateMachine::new();
        assert_eq!(machine.step(result(true, 1)), SignalState::Blue);
        assert_eq!(machine.step(result(true, 1)), SignalState::Red);
        assert_eq!(machine.step(result(true, 0)), SignalState::Red);
        assert_eq!(machine.step(result(false, 0)), SignalState::Green);
    }

    #[test]
    fn test_first_tick_outlier_is_debounced() {
        let mut machine = SignalStateMachine::new();
        assert_eq!(machine.last_outlier(), OutlierFlag::Inlier);
        assert_eq!(machine.current(), None);
        assert_eq!(machine.step(result(true, 0)), SignalState::Green);
        assert_eq!(machine.last_outlier(), OutlierFlag::Outlier);
    }

    #[test]
    fn test_transitions_light_exactly_one() {
        for state in [SignalState::Red, SignalState::Green, SignalState::Blue] {
            let writes = state.transitions();
            let lit: Vec<Indicator> = writes
                .iter()
                .filter(|(_, on)| *on)
                .map(|(indicator, _)| *indicator)
                .collect();
            assert_eq!(lit, vec![state.indicator()]);
            for indicator in Indicator::ALL {
                assert!(writes.iter().any(|(i, _)| *i == indicator));
            }
        }
    }

    #[test]
    fn test_raw_label_mapping() {
        assert_eq!(OutlierFlag::from_raw(-1), OutlierFlag::Outlier);
        assert_eq!(OutlierFlag::from_raw(1), OutlierFlag::Inlier);
        assert_eq!(ClassLabel::from_raw(0), ClassLabel::Class0);
        assert_eq!(ClassLabel::from_raw(1), ClassLabel::Class1);
        assert_eq!(ClassLabel::from_raw(7), ClassLabel::Class1);
    }
}
