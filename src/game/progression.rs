use serde::Serialize;

use crate::game::realm::{Realm, RealmThresholds};
use crate::game::types::PlayerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakthrough {
    pub from: Realm,
    pub to: Realm,
    pub max_spiritual_power: u32,
}

/// Advances the player by at most one realm once their experience meets the
/// next threshold. Breaking through raises the spiritual power ceiling by
/// `power_bonus` and refills it.
pub fn try_breakthrough(
    player: &mut PlayerRecord,
    thresholds: &RealmThresholds,
    power_bonus: u32,
) -> Option<Breakthrough> {
    let from = player.realm;
    let to = Realm::ALL
        .iter()
        .copied()
        .filter(|realm| *realm > from)
        .find(|realm| player.exp >= thresholds.threshold(*realm))?;

    player.realm = to;
    player.max_spiritual_power = player.max_spiritual_power.saturating_add(power_bonus);
    player.spiritual_power = player.max_spiritual_power;
    log::info!(
        "player {} broke through from {} to {} ({} exp)",
        player.id,
        from,
        to,
        player.exp
    );
    Some(Breakthrough {
        from,
        to,
        max_spiritual_power: player.max_spiritual_power,
    })
}

/// Adds experience and runs the breakthrough check.
pub fn gain_exp(
    player: &mut PlayerRecord,
    amount: u64,
    thresholds: &RealmThresholds,
    power_bonus: u32,
) -> Option<Breakthrough> {
    player.exp = player.exp.saturating_add(amount);
    try_breakthrough(player, thresholds, power_bonus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn breakthrough_at_threshold_refills_power() {
        let mut p = PlayerRecord::new(1, "shi", "Shi Hao", Utc::now());
        p.spiritual_power = 12;
        let bt = gain_exp(&mut p, 1_000, &RealmThresholds::default(), 50).unwrap();
        assert_eq!(bt.from, Realm::QiRefining);
        assert_eq!(bt.to, Realm::FoundationEstablishment);
        assert_eq!(p.max_spiritual_power, 150);
        assert_eq!(p.spiritual_power, 150);
    }

    #[test]
    fn below_threshold_nothing_happens() {
        let mut p = PlayerRecord::new(1, "shi", "Shi Hao", Utc::now());
        assert!(gain_exp(&mut p, 999, &RealmThresholds::default(), 50).is_none());
        assert_eq!(p.realm, Realm::QiRefining);
        assert_eq!(p.max_spiritual_power, 100);
    }

    #[test]
    fn one_realm_per_check() {
        let thresholds = RealmThresholds::default();
        let mut p = PlayerRecord::new(1, "shi", "Shi Hao", Utc::now());
        p.exp = 60_000;
        let first = try_breakthrough(&mut p, &thresholds, 50).unwrap();
        assert_eq!(first.to, Realm::FoundationEstablishment);
        let second = try_breakthrough(&mut p, &thresholds, 50).unwrap();
        assert_eq!(second.to, Realm::CoreFormation);
        assert_eq!(p.max_spiritual_power, 200);
    }

    #[test]
    fn top_realm_stays_put() {
        let mut p = PlayerRecord::new(1, "shi", "Shi Hao", Utc::now());
        p.realm = Realm::Tribulation;
        p.exp = u64::MAX;
        assert!(try_breakthrough(&mut p, &RealmThresholds::default(), 50).is_none());
    }
}
