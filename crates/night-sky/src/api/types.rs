/// Unique identifier for a live entity (meteor or explosion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Visual quality tier, selected once per session by the capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Tier {
    Low,
    #[default]
    Mid,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

/// Named spatial arrangement for a batch of meteor spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowerPattern {
    Single,
    Parallel,
    Radial,
    VFormation,
    Cluster,
    /// Weighted pick among the others, favoring `Single`.
    Random,
}

impl ShowerPattern {
    /// Concrete patterns (everything but `Random`).
    pub const CONCRETE: [ShowerPattern; 5] = [
        Self::Single, Self::Parallel, Self::Radial, Self::VFormation, Self::Cluster,
    ];

    /// Parse a host-supplied pattern name. Empty input means `Random`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "random" => Some(Self::Random),
            "single" => Some(Self::Single),
            "parallel" => Some(Self::Parallel),
            "radial" => Some(Self::Radial),
            "vformation" | "v-formation" | "v" => Some(Self::VFormation),
            "cluster" => Some(Self::Cluster),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Parallel => "parallel",
            Self::Radial => "radial",
            Self::VFormation => "vformation",
            Self::Cluster => "cluster",
            Self::Random => "random",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ordering_low_to_high() {
        assert!(Tier::Low < Tier::Mid);
        assert!(Tier::Mid < Tier::High);
    }

    #[test]
    fn pattern_parse_round_trip() {
        for p in ShowerPattern::CONCRETE {
            assert_eq!(ShowerPattern::parse(p.as_str()), Some(p));
        }
        assert_eq!(ShowerPattern::parse(""), Some(ShowerPattern::Random));
        assert_eq!(ShowerPattern::parse("spiral"), None);
    }
}
