//! Tri-state confidence of an endpoint tuple

use super::error::{TraceError, TraceResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// The calculated confidence of an endpoint tuple.
///
/// A defined value lies in `[0, 1]` and states how likely a trace link between
/// the two endpoints would be correct. An unset confidence means the node made
/// no statement at all; it is not the same as a confidence of `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Confidence(Option<f64>);

impl Confidence {
    /// A confidence without value (the node abstains)
    pub const fn unset() -> Self {
        Self(None)
    }

    /// A confidence with the given value; fails outside `[0, 1]`
    pub fn of(value: f64) -> TraceResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(TraceError::InvalidArgument(format!(
                "confidence value must be between 0 and 1, got {}",
                value
            )));
        }
        Ok(Self(Some(value)))
    }

    pub fn has_value(&self) -> bool {
        self.0.is_some()
    }

    /// The value of this confidence, or `NoValue` if unset
    pub fn value(&self) -> TraceResult<f64> {
        self.0.ok_or(TraceError::NoValue)
    }

    /// The value as an option, for read paths that treat unset as absence
    pub fn as_option(&self) -> Option<f64> {
        self.0
    }
}

impl PartialEq for Confidence {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// Values are never NaN (rejected in `of`), so the order is total.
impl Eq for Confidence {}

impl PartialOrd for Confidence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Confidence {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "no value"),
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(value) => Confidence::of(value).map_err(serde::de::Error::custom),
            None => Ok(Confidence::unset()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn values_in_range_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let p: f64 = rng.gen_range(0.0..=1.0);
            assert_eq!(Confidence::of(p).unwrap().value().unwrap(), p);
        }
        assert_eq!(Confidence::of(0.0).unwrap().value().unwrap(), 0.0);
        assert_eq!(Confidence::of(1.0).unwrap().value().unwrap(), 1.0);
    }

    #[test]
    fn values_out_of_range_rejected() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let above: f64 = rng.gen_range(1.000001..100.0);
            let below: f64 = -rng.gen_range(0.000001..100.0);
            assert!(matches!(Confidence::of(above), Err(TraceError::InvalidArgument(_))));
            assert!(matches!(Confidence::of(below), Err(TraceError::InvalidArgument(_))));
        }
        assert!(Confidence::of(f64::NAN).is_err());
        assert!(Confidence::of(f64::INFINITY).is_err());
    }

    #[test]
    fn unset_has_no_value() {
        let c = Confidence::unset();
        assert!(!c.has_value());
        assert!(matches!(c.value(), Err(TraceError::NoValue)));
        assert_eq!(c.to_string(), "no value");
    }

    #[test]
    fn unset_orders_below_every_value() {
        let unset = Confidence::unset();
        let zero = Confidence::of(0.0).unwrap();
        let half = Confidence::of(0.5).unwrap();
        assert!(unset < zero);
        assert!(zero < half);
        assert_eq!(unset, Confidence::default());
        assert_ne!(unset, zero);
        assert_eq!(half, Confidence::of(0.5).unwrap());

        let mut all = vec![half, unset, zero];
        all.sort();
        assert_eq!(all, vec![unset, zero, half]);
    }

    #[test]
    fn serializes_as_nullable_number() {
        let json = serde_json::to_string(&vec![Confidence::unset(), Confidence::of(0.25).unwrap()]).unwrap();
        assert_eq!(json, "[null,0.25]");
        let back: Vec<Confidence> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[1], Confidence::of(0.25).unwrap());
        assert!(serde_json::from_str::<Confidence>("1.5").is_err());
    }
}
