//! Generated-or-degraded result wrapper

use serde::{Serialize, Serializer};

/// Value produced by an LLM-backed step.
///
/// Steps never fail outright: when the LLM call or decode fails they hand back a
/// sentinel value alongside the error that caused it. Serializes as the inner
/// value so the wire shape does not depend on which variant was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Decoded from a genuine model response
    Generated(T),
    /// Sentinel substituted after a failure
    Degraded { value: T, error: String },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Generated(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Generated(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// The failure that produced a degraded value
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Generated(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}
