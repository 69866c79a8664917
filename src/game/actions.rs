//! Cooldown-gated actions: meditation, herb gathering, mining and dungeon
//! challenges, plus selling gathered materials.
//!
//! Every action validates before it mutates. A returned `ActionError` means
//! the record is exactly as it was passed in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::game::catalog::{Catalog, DungeonStage, Encounter, StageRewards};
use crate::game::combat::{self, BattleReport, CombatStats};
use crate::game::cooldown::{self, ActionKind};
use crate::game::errors::ActionError;
use crate::game::progression::{gain_exp, Breakthrough};
use crate::game::realm::Realm;
use crate::game::rules::GameRules;
use crate::game::types::{PlayerRecord, SPIRIT_STONE};

/// Puts a reward where it belongs: spirit stones into the balance,
/// everything else into sellable materials.
fn credit_reward(player: &mut PlayerRecord, item: &str, quantity: u64) {
    if item == SPIRIT_STONE {
        player.inventory.add_spirit_stones(quantity);
    } else {
        player.inventory.add_material(item, quantity);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeditationOutcome {
    pub exp_gained: u64,
    pub spirit_cost: u32,
    pub spirit_recovered: u32,
    pub breakthrough: Option<Breakthrough>,
    pub exp: u64,
    pub spiritual_power: u32,
    pub max_spiritual_power: u32,
    pub next_realm: Option<(Realm, u64)>,
}

pub fn meditate<R: Rng + ?Sized>(
    player: &mut PlayerRecord,
    catalog: &Catalog,
    rules: &GameRules,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<MeditationOutcome, ActionError> {
    let m = &rules.meditation;
    cooldown::check_cooldown(player, ActionKind::Meditation, &rules.cooldowns, now)?;
    cooldown::check_spiritual_power(player, m.spirit_cost)?;

    cooldown::commit(player, ActionKind::Meditation, m.spirit_cost, now);
    let exp_gained = m.exp.roll(rng);
    let breakthrough = gain_exp(player, exp_gained, &catalog.realms, rules.breakthrough_power_bonus);
    let spirit_recovered = match breakthrough {
        Some(_) => 0,
        None => {
            let amount = m.recovery.roll(rng).min(u64::from(u32::MAX)) as u32;
            player.restore_spiritual_power(amount)
        }
    };

    Ok(MeditationOutcome {
        exp_gained,
        spirit_cost: m.spirit_cost,
        spirit_recovered,
        breakthrough,
        exp: player.exp,
        spiritual_power: player.spiritual_power,
        max_spiritual_power: player.max_spiritual_power,
        next_realm: catalog.realms.exp_to_next(player.realm, player.exp),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatherOutcome {
    pub location: String,
    pub herb: String,
    pub amount: u64,
    pub exp_gained: u64,
    pub spirit_cost: u32,
    pub spiritual_power: u32,
    pub breakthrough: Option<Breakthrough>,
}

pub fn gather_herbs<R: Rng + ?Sized>(
    player: &mut PlayerRecord,
    catalog: &Catalog,
    rules: &GameRules,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<GatherOutcome, ActionError> {
    let action = ActionKind::HerbGathering;
    cooldown::check_cooldown(player, action, &rules.cooldowns, now)?;

    let eligible = catalog.herb_locations_for(player.realm);
    let location = *eligible
        .choose(rng)
        .ok_or(ActionError::NoEligibleTarget { action })?;
    cooldown::check_spiritual_power(player, location.spirit_cost)?;
    let herb = location
        .herbs
        .choose(rng)
        .ok_or(ActionError::NoEligibleTarget { action })?;
    let amount = location.amount.roll(rng);
    let exp_gained = location.exp.roll(rng);

    cooldown::commit(player, action, location.spirit_cost, now);
    credit_reward(player, herb, amount);
    let breakthrough = gain_exp(player, exp_gained, &catalog.realms, rules.breakthrough_power_bonus);

    Ok(GatherOutcome {
        location: location.name.clone(),
        herb: herb.clone(),
        amount,
        exp_gained,
        spirit_cost: location.spirit_cost,
        spiritual_power: player.spiritual_power,
        breakthrough,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiningOutcome {
    pub location: String,
    /// Everything that dropped, spirit stones included.
    pub rewards: BTreeMap<String, u64>,
    pub exp_gained: u64,
    pub spirit_cost: u32,
    pub spiritual_power: u32,
    pub breakthrough: Option<Breakthrough>,
}

pub fn mine<R: Rng + ?Sized>(
    player: &mut PlayerRecord,
    catalog: &Catalog,
    rules: &GameRules,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<MiningOutcome, ActionError> {
    let action = ActionKind::Mining;
    cooldown::check_cooldown(player, action, &rules.cooldowns, now)?;

    let eligible = catalog.mining_locations_for(player.realm);
    let location = *eligible
        .choose(rng)
        .ok_or(ActionError::NoEligibleTarget { action })?;
    cooldown::check_spiritual_power(player, location.spirit_cost)?;

    let mut rewards = BTreeMap::new();
    for slot in &location.rewards {
        if rng.gen_bool(location.drop_chance) {
            let amount = slot.range.roll(rng);
            if amount > 0 {
                *rewards.entry(slot.item.clone()).or_insert(0) += amount;
            }
        }
    }
    let exp_gained = location.exp.roll(rng);

    cooldown::commit(player, action, location.spirit_cost, now);
    for (item, amount) in &rewards {
        credit_reward(player, item, *amount);
    }
    let breakthrough = gain_exp(player, exp_gained, &catalog.realms, rules.breakthrough_power_bonus);

    Ok(MiningOutcome {
        location: location.name.clone(),
        rewards,
        exp_gained,
        spirit_cost: location.spirit_cost,
        spiritual_power: player.spiritual_power,
        breakthrough,
    })
}

/// What a won challenge paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageLoot {
    pub exp: u64,
    pub spirit_stones: u64,
    /// Dungeon materials, rare drops included.
    pub items: BTreeMap<String, u64>,
}

pub fn roll_stage_rewards<R: Rng + ?Sized>(rewards: &StageRewards, rng: &mut R) -> StageLoot {
    let mut loot = StageLoot {
        exp: rewards.exp.roll(rng),
        spirit_stones: 0,
        items: BTreeMap::new(),
    };
    for slot in &rewards.items {
        let amount = slot.range.roll(rng);
        if slot.item == SPIRIT_STONE {
            loot.spirit_stones += amount;
        } else if amount > 0 {
            *loot.items.entry(slot.item.clone()).or_insert(0) += amount;
        }
    }
    for rare in &rewards.rare_items {
        if rng.gen_bool(rare.chance) {
            *loot.items.entry(rare.item.clone()).or_insert(0) += 1;
        }
    }
    loot
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeOutcome {
    pub stage: String,
    pub spirit_cost: u32,
    pub battle: BattleReport,
    /// `None` when the battle was lost.
    pub loot: Option<StageLoot>,
    pub breakthrough: Option<Breakthrough>,
}

impl ChallengeOutcome {
    pub fn victory(&self) -> bool {
        self.battle.victory
    }
}

/// Fights through a named dungeon stage. Losing is not an error: the cost
/// and cooldown are spent and nothing is awarded.
pub fn challenge_dungeon<R: Rng + ?Sized>(
    player: &mut PlayerRecord,
    catalog: &Catalog,
    rules: &GameRules,
    stage_name: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ChallengeOutcome, ActionError> {
    let action = ActionKind::DungeonChallenge;
    cooldown::check_cooldown(player, action, &rules.cooldowns, now)?;
    let stage: &DungeonStage = catalog
        .stage(stage_name)
        .ok_or_else(|| ActionError::UnknownStage(stage_name.to_string()))?;
    if player.realm < stage.min_realm {
        return Err(ActionError::RealmTooLow {
            required: stage.min_realm,
            current: player.realm,
        });
    }
    cooldown::check_spiritual_power(player, stage.spirit_cost)?;

    cooldown::commit(player, action, stage.spirit_cost, now);
    let battle = combat::resolve(&CombatStats::of(player), &stage.encounter, rng);

    let mut loot = None;
    let mut breakthrough = None;
    if battle.victory {
        let won = roll_stage_rewards(&stage.rewards, rng);
        player.inventory.add_spirit_stones(won.spirit_stones);
        for (item, amount) in &won.items {
            player.inventory.add_dungeon_material(item, *amount);
        }
        breakthrough = gain_exp(player, won.exp, &catalog.realms, rules.breakthrough_power_bonus);
        loot = Some(won);
    }

    Ok(ChallengeOutcome {
        stage: stage.name.clone(),
        spirit_cost: stage.spirit_cost,
        battle,
        loot,
        breakthrough,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageListing {
    pub name: String,
    pub min_realm: Realm,
    pub spirit_cost: u32,
    pub boss: bool,
    pub opponents: Vec<String>,
    pub eligible: bool,
}

pub fn list_stages(player: &PlayerRecord, catalog: &Catalog) -> Vec<StageListing> {
    catalog
        .dungeon
        .stages
        .iter()
        .map(|stage| {
            let (boss, opponents) = match &stage.encounter {
                Encounter::Monsters(ms) => (false, ms.iter().map(|m| m.name.clone()).collect()),
                Encounter::Boss(b) => (true, vec![b.name.clone()]),
            };
            StageListing {
                name: stage.name.clone(),
                min_realm: stage.min_realm,
                spirit_cost: stage.spirit_cost,
                boss,
                opponents,
                eligible: player.realm >= stage.min_realm,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleLine {
    pub material: String,
    pub amount: u64,
    pub unit_price: u64,
    pub total: u64,
}

/// Sells `amount` of one material at catalog price.
pub fn sell_material(
    player: &mut PlayerRecord,
    catalog: &Catalog,
    name: &str,
    amount: u64,
) -> Result<SaleLine, ActionError> {
    if amount == 0 {
        return Err(ActionError::InvalidQuantity);
    }
    let name = name.trim();
    let owned = player
        .inventory
        .materials
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .cloned();
    let material = match owned {
        Some(material) => material,
        None if player
            .inventory
            .dungeon_materials
            .keys()
            .any(|k| k.eq_ignore_ascii_case(name)) =>
        {
            return Err(ActionError::NotSellable(name.to_string()));
        }
        None if catalog.material_value(name).is_some() => name.to_string(),
        None => return Err(ActionError::UnknownMaterial(name.to_string())),
    };
    let unit_price = match catalog.material_value(&material) {
        Some(price) if material != SPIRIT_STONE => price,
        _ => return Err(ActionError::NotSellable(material)),
    };

    player.inventory.remove_material(&material, amount)?;
    let total = unit_price.saturating_mul(amount);
    player.inventory.add_spirit_stones(total);
    Ok(SaleLine {
        material,
        amount,
        unit_price,
        total,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSale {
    pub sold: Vec<SaleLine>,
    pub total: u64,
    pub spirit_stones: u64,
    /// Materials without a price, left in the inventory.
    pub unsellable: Vec<String>,
    pub dungeon_materials_kept: bool,
}

/// Sells every priced material. Dungeon materials are never touched.
pub fn sell_all_materials(player: &mut PlayerRecord, catalog: &Catalog) -> BulkSale {
    let mut sold = Vec::new();
    let mut unsellable = Vec::new();
    let stock: Vec<(String, u64)> = player
        .inventory
        .materials
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();

    for (material, amount) in stock {
        match catalog.material_value(&material) {
            Some(unit_price) if material != SPIRIT_STONE => {
                player.inventory.materials.remove(&material);
                let total = unit_price.saturating_mul(amount);
                sold.push(SaleLine {
                    material,
                    amount,
                    unit_price,
                    total,
                });
            }
            _ => unsellable.push(material),
        }
    }

    let total = sold.iter().fold(0u64, |acc, line| acc.saturating_add(line.total));
    player.inventory.add_spirit_stones(total);
    BulkSale {
        sold,
        total,
        spirit_stones: player.inventory.spirit_stones,
        unsellable,
        dungeon_materials_kept: !player.inventory.dungeon_materials.is_empty(),
    }
}
