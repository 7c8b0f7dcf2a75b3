//! Listener priority tiers.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Dispatch-order tier of a listener binding.
///
/// Lower weights run earlier. [`Priority::Monitor`] is the observe-only tier
/// and always runs last, after every other listener had its chance to change
/// the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// Weight 1.
    First,
    /// Weight 2.
    Second,
    /// Weight 3.
    #[default]
    Third,
    /// Weight 4.
    Fourth,
    /// Weight 5.
    Fifth,
    /// Weight 100. Listeners here should only observe the final state.
    Monitor,
}

impl Priority {
    /// All tiers in dispatch order.
    pub const ALL: [Priority; 6] = [
        Priority::First,
        Priority::Second,
        Priority::Third,
        Priority::Fourth,
        Priority::Fifth,
        Priority::Monitor,
    ];

    /// Returns the numeric weight of this tier.
    pub const fn weight(self) -> u8 {
        match self {
            Priority::First => 1,
            Priority::Second => 2,
            Priority::Third => 3,
            Priority::Fourth => 4,
            Priority::Fifth => 5,
            Priority::Monitor => 100,
        }
    }

    /// Returns the tier with the given weight, if any.
    pub fn from_weight(weight: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.weight() == weight)
    }

    /// Returns the lowercase name of this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::First => "first",
            Priority::Second => "second",
            Priority::Third => "third",
            Priority::Fourth => "fourth",
            Priority::Fifth => "fifth",
            Priority::Monitor => "monitor",
        }
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight().cmp(&other.weight())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
