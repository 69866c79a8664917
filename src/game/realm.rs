//! Cultivation realms and the experience thresholds that gate them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The nine cultivation ranks, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    QiRefining,
    FoundationEstablishment,
    CoreFormation,
    NascentSoul,
    SpiritSevering,
    VoidRefinement,
    BodyIntegration,
    Mahayana,
    Tribulation,
}

impl Realm {
    pub const ALL: [Realm; 9] = [
        Realm::QiRefining,
        Realm::FoundationEstablishment,
        Realm::CoreFormation,
        Realm::NascentSoul,
        Realm::SpiritSevering,
        Realm::VoidRefinement,
        Realm::BodyIntegration,
        Realm::Mahayana,
        Realm::Tribulation,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Realm> {
        Self::ALL.get(ordinal).copied()
    }

    /// The realm directly above this one, if any.
    pub fn next(self) -> Option<Realm> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Realm::QiRefining => "Qi Refining",
            Realm::FoundationEstablishment => "Foundation Establishment",
            Realm::CoreFormation => "Core Formation",
            Realm::NascentSoul => "Nascent Soul",
            Realm::SpiritSevering => "Spirit Severing",
            Realm::VoidRefinement => "Void Refinement",
            Realm::BodyIntegration => "Body Integration",
            Realm::Mahayana => "Mahayana",
            Realm::Tribulation => "Tribulation Crossing",
        }
    }

    fn snake_name(self) -> &'static str {
        match self {
            Realm::QiRefining => "qi_refining",
            Realm::FoundationEstablishment => "foundation_establishment",
            Realm::CoreFormation => "core_formation",
            Realm::NascentSoul => "nascent_soul",
            Realm::SpiritSevering => "spirit_severing",
            Realm::VoidRefinement => "void_refinement",
            Realm::BodyIntegration => "body_integration",
            Realm::Mahayana => "mahayana",
            Realm::Tribulation => "tribulation",
        }
    }
}

impl Default for Realm {
    fn default() -> Self {
        Realm::QiRefining
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Realm {
    type Err = String;

    /// Accepts `core_formation`, `Core Formation`, `core-formation` and the
    /// realm's ordinal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        if let Ok(ordinal) = wanted.parse::<usize>() {
            return Realm::from_ordinal(ordinal).ok_or_else(|| format!("unknown realm: {}", s));
        }
        Realm::ALL
            .iter()
            .copied()
            .find(|realm| {
                realm.snake_name() == wanted
                    || realm.display_name().to_ascii_lowercase().replace(' ', "_") == wanted
            })
            .ok_or_else(|| format!("unknown realm: {}", s))
    }
}

/// Minimum total experience required to hold each realm, indexed by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmThresholds(pub [u64; 9]);

impl Default for RealmThresholds {
    fn default() -> Self {
        Self([
            0, 1_000, 5_000, 20_000, 50_000, 100_000, 200_000, 500_000, 1_000_000,
        ])
    }
}

impl RealmThresholds {
    pub fn threshold(&self, realm: Realm) -> u64 {
        self.0[realm.ordinal()]
    }

    /// The highest realm whose threshold `exp` meets.
    pub fn highest_reachable(&self, exp: u64) -> Realm {
        Realm::ALL
            .iter()
            .rev()
            .copied()
            .find(|realm| exp >= self.threshold(*realm))
            .unwrap_or(Realm::QiRefining)
    }

    /// Experience still needed to reach the realm above `realm`.
    pub fn exp_to_next(&self, realm: Realm, exp: u64) -> Option<(Realm, u64)> {
        let next = realm.next()?;
        Some((next, self.threshold(next).saturating_sub(exp)))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.0[0] != 0 {
            return Err("the first realm must start at 0 exp".into());
        }
        if self.0.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("realm thresholds must be strictly increasing".into());
        }
        Ok(())
    }
}
