//! Read-only summaries of a player: status sheet and inventory valuation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::game::catalog::Catalog;
use crate::game::cooldown::{remaining_secs, ActionKind};
use crate::game::enhancement::{weapon_details, WeaponDetails};
use crate::game::realm::Realm;
use crate::game::rules::GameRules;
use crate::game::types::{PlayerId, PlayerRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CooldownStatus {
    pub action: ActionKind,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub id: PlayerId,
    pub display_name: String,
    pub realm: Realm,
    pub exp: u64,
    /// The next realm and the experience still missing for it.
    pub next_realm: Option<(Realm, u64)>,
    pub spiritual_power: u32,
    pub max_spiritual_power: u32,
    pub max_hp: u32,
    pub base_attack: u32,
    pub total_attack: u32,
    pub defense: u32,
    pub equipped_weapon: Option<String>,
    pub spirit_stones: u64,
    pub cooldowns: Vec<CooldownStatus>,
}

pub fn status(
    player: &PlayerRecord,
    catalog: &Catalog,
    rules: &GameRules,
    now: DateTime<Utc>,
) -> StatusReport {
    StatusReport {
        id: player.id,
        display_name: player.display_name.clone(),
        realm: player.realm,
        exp: player.exp,
        next_realm: catalog.realms.exp_to_next(player.realm, player.exp),
        spiritual_power: player.spiritual_power,
        max_spiritual_power: player.max_spiritual_power,
        max_hp: player.max_hp,
        base_attack: player.attack,
        total_attack: player.total_attack(),
        defense: player.defense,
        equipped_weapon: player.equipped_weapon.clone(),
        spirit_stones: player.inventory.spirit_stones,
        cooldowns: ActionKind::ALL
            .iter()
            .map(|action| CooldownStatus {
                action: *action,
                remaining_secs: remaining_secs(
                    player.last_action_at(*action),
                    rules.cooldowns.seconds_for(*action),
                    now,
                ),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialLine {
    pub name: String,
    pub quantity: u64,
    /// `None` for materials the market does not buy.
    pub unit_value: Option<u64>,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryReport {
    pub spirit_stones: u64,
    pub materials: Vec<MaterialLine>,
    pub materials_value: u64,
    pub dungeon_materials: BTreeMap<String, u64>,
    pub weapons: Vec<WeaponDetails>,
}

pub fn inventory(player: &PlayerRecord, catalog: &Catalog) -> InventoryReport {
    let materials: Vec<MaterialLine> = player
        .inventory
        .materials
        .iter()
        .map(|(name, quantity)| {
            let unit_value = catalog.material_value(name);
            MaterialLine {
                name: name.clone(),
                quantity: *quantity,
                unit_value,
                value: unit_value.unwrap_or(0).saturating_mul(*quantity),
            }
        })
        .collect();
    let materials_value = materials
        .iter()
        .fold(0u64, |acc, line| acc.saturating_add(line.value));

    InventoryReport {
        spirit_stones: player.inventory.spirit_stones,
        materials,
        materials_value,
        dungeon_materials: player.inventory.dungeon_materials.clone(),
        // Listing every owned weapon cannot fail.
        weapons: weapon_details(player, None, &catalog.enhancement).unwrap_or_default(),
    }
}
