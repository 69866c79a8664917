//! The weapon shop: browse the catalog, buy, equip.
//!
//! Buying a weapon the player already owns replaces the old instance with a
//! fresh, unenhanced one and charges the full price again. If the old one was
//! equipped the new one stays equipped.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::game::catalog::{Catalog, WeaponEntry};
use crate::game::errors::ActionError;
use crate::game::realm::Realm;
use crate::game::types::{PlayerRecord, WeaponInstance};

impl WeaponInstance {
    pub fn from_entry(entry: &WeaponEntry, acquired_at: DateTime<Utc>) -> Self {
        Self {
            name: entry.name.clone(),
            weapon_type: entry.weapon_type,
            attack: entry.attack,
            rarity: entry.rarity,
            required_realm: entry.required_realm,
            enhancement_level: 0,
            acquired_at,
        }
    }
}

/// Weapons open to `realm`, cheapest first. With `budget` set only
/// affordable ones are listed.
pub fn list_available<'a>(catalog: &'a Catalog, realm: Realm, budget: Option<u64>) -> Vec<&'a WeaponEntry> {
    let mut weapons: Vec<_> = catalog
        .weapons
        .iter()
        .filter(|w| w.required_realm <= realm)
        .filter(|w| budget.map_or(true, |b| w.price <= b))
        .collect();
    weapons.sort_by_key(|w| (w.price, w.required_realm));
    weapons
}

/// Weapons whose requirement is exactly `realm`.
pub fn weapons_for_realm(catalog: &Catalog, realm: Realm) -> Vec<&WeaponEntry> {
    catalog
        .weapons
        .iter()
        .filter(|w| w.required_realm == realm)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOutcome {
    pub weapon: WeaponInstance,
    pub price: u64,
    pub remaining_spirit_stones: u64,
    /// Level of the instance this purchase replaced, if the player already
    /// owned the weapon.
    pub replaced_level: Option<u8>,
}

pub fn buy(
    player: &mut PlayerRecord,
    catalog: &Catalog,
    name: &str,
    now: DateTime<Utc>,
) -> Result<PurchaseOutcome, ActionError> {
    let entry = catalog
        .weapon(name)
        .ok_or_else(|| ActionError::UnknownWeapon(name.to_string()))?;
    if player.realm < entry.required_realm {
        return Err(ActionError::RealmTooLow {
            required: entry.required_realm,
            current: player.realm,
        });
    }
    player.inventory.spend_spirit_stones(entry.price)?;

    let weapon = WeaponInstance::from_entry(entry, now);
    let replaced = player.add_weapon(weapon.clone());
    Ok(PurchaseOutcome {
        weapon,
        price: entry.price,
        remaining_spirit_stones: player.inventory.spirit_stones,
        replaced_level: replaced.map(|w| w.enhancement_level),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipOutcome {
    pub equipped: String,
    pub previous: Option<String>,
    pub total_attack: u32,
}

pub fn equip(player: &mut PlayerRecord, name: &str) -> Result<EquipOutcome, ActionError> {
    let owned = player
        .owned_weapon_name(name)
        .map(str::to_string)
        .ok_or_else(|| ActionError::WeaponNotOwned(name.to_string()))?;
    let previous = player.equipped_weapon.clone();
    player.equip(&owned)?;
    Ok(EquipOutcome {
        equipped: owned,
        previous,
        total_attack: player.total_attack(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_player(realm: Realm, stones: u64) -> PlayerRecord {
        let mut p = PlayerRecord::new(9, "mu", "Mu Chen", Utc::now());
        p.realm = realm;
        p.exp = Catalog::builtin().realms.threshold(realm);
        p.inventory.spirit_stones = stones;
        p
    }

    #[test]
    fn listing_filters_by_realm_and_budget() {
        let catalog = Catalog::builtin();
        let all = list_available(&catalog, Realm::FoundationEstablishment, None);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].name, "Azure Wood Sword");
        let affordable = list_available(&catalog, Realm::FoundationEstablishment, Some(500));
        assert_eq!(affordable.len(), 4);
        assert_eq!(weapons_for_realm(&catalog, Realm::Tribulation).len(), 3);
    }

    #[test]
    fn buy_checks_name_realm_then_funds() {
        let catalog = Catalog::builtin();
        let mut p = rich_player(Realm::QiRefining, 100);
        let now = Utc::now();
        assert_eq!(
            buy(&mut p, &catalog, "Moon Staff", now).unwrap_err(),
            ActionError::UnknownWeapon("Moon Staff".into())
        );
        assert_eq!(
            buy(&mut p, &catalog, "Chaos Hammer", now).unwrap_err(),
            ActionError::RealmTooLow {
                required: Realm::Tribulation,
                current: Realm::QiRefining
            }
        );
        assert_eq!(
            buy(&mut p, &catalog, "Azure Wood Sword", now).unwrap_err(),
            ActionError::InsufficientCurrency {
                required: 150,
                available: 100
            }
        );
        assert!(p.inventory.weapons.is_empty());
        assert_eq!(p.inventory.spirit_stones, 100);
    }

    #[test]
    fn successful_purchase_deducts_price() {
        let catalog = Catalog::builtin();
        let mut p = rich_player(Realm::QiRefining, 400);
        let outcome = buy(&mut p, &catalog, "frost spear", Utc::now()).unwrap();
        assert_eq!(outcome.price, 300);
        assert_eq!(outcome.remaining_spirit_stones, 100);
        assert_eq!(outcome.replaced_level, None);
        let spear = p.weapon("Frost Spear").unwrap();
        assert_eq!(spear.attack, 25);
        assert_eq!(spear.enhancement_level, 0);
    }

    #[test]
    fn equip_requires_ownership() {
        let catalog = Catalog::builtin();
        let mut p = rich_player(Realm::QiRefining, 150);
        assert!(matches!(
            equip(&mut p, "Azure Wood Sword"),
            Err(ActionError::WeaponNotOwned(_))
        ));
        buy(&mut p, &catalog, "Azure Wood Sword", Utc::now()).unwrap();
        let outcome = equip(&mut p, "azure wood sword").unwrap();
        assert_eq!(outcome.equipped, "Azure Wood Sword");
        assert_eq!(outcome.previous, None);
        assert_eq!(outcome.total_attack, 25);
    }
}
