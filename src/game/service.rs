//! The persistence gateway every command goes through.
//!
//! A call locks the player, loads (or creates) the record, applies passive
//! regeneration, runs one engine operation and saves the result. Validation
//! failures leave the stored record as it was, apart from any regeneration
//! that had already been written.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::actions::{
    self, BulkSale, ChallengeOutcome, GatherOutcome, MeditationOutcome, MiningOutcome, SaleLine,
    StageListing,
};
use crate::game::catalog::{Catalog, WeaponEntry};
use crate::game::enhancement::{self, EnhanceOutcome, WeaponDetails};
use crate::game::errors::{ActionError, GameError};
use crate::game::locks::PlayerLocks;
use crate::game::progression::Breakthrough;
use crate::game::realm::Realm;
use crate::game::regen::apply_passive_regen;
use crate::game::report::{self, InventoryReport, StatusReport};
use crate::game::rules::GameRules;
use crate::game::shop::{self, EquipOutcome, PurchaseOutcome};
use crate::game::storage::{PlayerRepository, PlayerStore};
use crate::game::types::{LeaderboardEntry, PlayerIdentity, PlayerRecord};
use crate::logutil::sanitize_for_log;

/// Async entry point for every player action. Serializes work per player,
/// applies regeneration on load and persists only records that pass the
/// invariant check.
pub struct GameService<S: PlayerRepository = PlayerStore> {
    store: S,
    catalog: Arc<Catalog>,
    rules: GameRules,
    locks: PlayerLocks,
    rng: Mutex<StdRng>,
}

impl<S: PlayerRepository> GameService<S> {
    pub fn new(store: S, catalog: Arc<Catalog>, rules: GameRules) -> Self {
        Self::with_rng(store, catalog, rules, StdRng::from_entropy())
    }

    /// Deterministic randomness, for replays and tests.
    pub fn with_seed(store: S, catalog: Arc<Catalog>, rules: GameRules, seed: u64) -> Self {
        Self::with_rng(store, catalog, rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: S, catalog: Arc<Catalog>, rules: GameRules, rng: StdRng) -> Self {
        Self {
            store,
            catalog,
            rules,
            locks: PlayerLocks::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads or creates the record and settles regeneration. Anything that
    /// changed here is written before the caller sees the record.
    fn prepare(&self, identity: &PlayerIdentity, now: DateTime<Utc>) -> Result<PlayerRecord, GameError> {
        let mut player = match self.store.load(identity.id)? {
            Some(player) => player,
            None => self.store.create(identity)?,
        };
        let mut dirty = false;
        if player.username != identity.username || player.display_name != identity.display_name {
            player.username = identity.username.clone();
            player.display_name = identity.display_name.clone();
            dirty = true;
        }
        let restored = apply_passive_regen(&mut player, now, self.rules.regen_interval_secs);
        if restored > 0 {
            log::debug!("player {} regenerated {} spiritual power", player.id, restored);
            dirty = true;
        }
        if dirty {
            player = self.store.save(player)?;
        }
        Ok(player)
    }

    /// Lock, prepare, mutate, validate, save.
    async fn mutate<T, F>(&self, identity: &PlayerIdentity, op: F) -> Result<T, GameError>
    where
        F: FnOnce(
            &mut PlayerRecord,
            &Catalog,
            &GameRules,
            DateTime<Utc>,
            &mut StdRng,
        ) -> Result<T, ActionError>,
    {
        let _guard = self.locks.acquire(identity.id).await;
        self.mutate_locked(identity, op)
    }

    fn mutate_locked<T, F>(&self, identity: &PlayerIdentity, op: F) -> Result<T, GameError>
    where
        F: FnOnce(
            &mut PlayerRecord,
            &Catalog,
            &GameRules,
            DateTime<Utc>,
            &mut StdRng,
        ) -> Result<T, ActionError>,
    {
        let now = Utc::now();
        let mut player = self.prepare(identity, now)?;
        let outcome = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            op(&mut player, &self.catalog, &self.rules, now, &mut *rng)
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("player {} action rejected: {}", identity.id, err);
                return Err(err.into());
            }
        };
        player
            .check_invariants(&self.catalog.realms)
            .map_err(GameError::Invariant)?;
        self.store.save(player)?;
        Ok(outcome)
    }

    /// Lock, prepare, then read without saving further.
    async fn read<T, F>(&self, identity: &PlayerIdentity, op: F) -> Result<T, GameError>
    where
        F: FnOnce(&PlayerRecord, &Catalog, &GameRules, DateTime<Utc>)
            -> Result<T, ActionError>,
    {
        let _guard = self.locks.acquire(identity.id).await;
        let now = Utc::now();
        let player = self.prepare(identity, now)?;
        Ok(op(&player, &self.catalog, &self.rules, now)?)
    }

    /// The current record, regeneration applied.
    pub async fn player(&self, identity: &PlayerIdentity) -> Result<PlayerRecord, GameError> {
        self.read(identity, |p, _, _, _| Ok(p.clone())).await
    }

    pub async fn status(&self, identity: &PlayerIdentity) -> Result<StatusReport, GameError> {
        self.read(identity, |p, catalog, rules, now| Ok(report::status(p, catalog, rules, now)))
            .await
    }

    pub async fn inventory(&self, identity: &PlayerIdentity) -> Result<InventoryReport, GameError> {
        self.read(identity, |p, catalog, _, _| Ok(report::inventory(p, catalog)))
            .await
    }

    pub async fn meditate(&self, identity: &PlayerIdentity) -> Result<MeditationOutcome, GameError> {
        let out = self.mutate(identity, actions::meditate).await?;
        log::info!(
            "{} meditated: +{} exp, +{} spiritual power",
            sanitize_for_log(&identity.username),
            out.exp_gained,
            out.spirit_recovered
        );
        log_breakthrough(identity, out.breakthrough.as_ref());
        Ok(out)
    }

    pub async fn gather_herbs(&self, identity: &PlayerIdentity) -> Result<GatherOutcome, GameError> {
        let out = self.mutate(identity, actions::gather_herbs).await?;
        log::info!(
            "{} gathered {} x{} at {}",
            sanitize_for_log(&identity.username),
            out.herb,
            out.amount,
            out.location
        );
        log_breakthrough(identity, out.breakthrough.as_ref());
        Ok(out)
    }

    pub async fn mine(&self, identity: &PlayerIdentity) -> Result<MiningOutcome, GameError> {
        let out = self.mutate(identity, actions::mine).await?;
        log::info!(
            "{} mined at {}: {} reward kinds",
            sanitize_for_log(&identity.username),
            out.location,
            out.rewards.len()
        );
        log_breakthrough(identity, out.breakthrough.as_ref());
        Ok(out)
    }

    /// A lost fight is a successful call: the attempt is still paid for and
    /// recorded.
    pub async fn challenge_dungeon(
        &self,
        identity: &PlayerIdentity,
        stage: &str,
    ) -> Result<ChallengeOutcome, GameError> {
        let out = self
            .mutate(identity, |p, catalog, rules, now, rng| {
                actions::challenge_dungeon(p, catalog, rules, stage, now, rng)
            })
            .await?;
        log::info!(
            "{} challenged {}: {}",
            sanitize_for_log(&identity.username),
            out.stage,
            if out.victory() { "victory" } else { "defeat" }
        );
        log_breakthrough(identity, out.breakthrough.as_ref());
        Ok(out)
    }

    pub async fn list_stages(&self, identity: &PlayerIdentity) -> Result<Vec<StageListing>, GameError> {
        self.read(identity, |p, catalog, _, _| Ok(actions::list_stages(p, catalog)))
            .await
    }

    /// Weapons the player's realm allows, cheapest first. With
    /// `affordable_only` the current balance also filters the list.
    pub async fn list_weapons(
        &self,
        identity: &PlayerIdentity,
        affordable_only: bool,
    ) -> Result<Vec<WeaponEntry>, GameError> {
        self.read(identity, |p, catalog, _, _| {
            let budget = affordable_only.then_some(p.inventory.spirit_stones);
            Ok(shop::list_available(catalog, p.realm, budget)
                .into_iter()
                .cloned()
                .collect())
        })
        .await
    }

    pub fn weapons_for_realm(&self, realm: Realm) -> Vec<WeaponEntry> {
        shop::weapons_for_realm(&self.catalog, realm)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn buy_weapon(
        &self,
        identity: &PlayerIdentity,
        name: &str,
    ) -> Result<PurchaseOutcome, GameError> {
        let out = self
            .mutate(identity, |p, catalog, _, now, _| shop::buy(p, catalog, name, now))
            .await?;
        log::info!(
            "{} bought {} for {}",
            sanitize_for_log(&identity.username),
            out.weapon.name,
            out.price
        );
        Ok(out)
    }

    pub async fn equip_weapon(
        &self,
        identity: &PlayerIdentity,
        name: &str,
    ) -> Result<EquipOutcome, GameError> {
        self.mutate(identity, |p, _, _, _, _| shop::equip(p, name)).await
    }

    /// Returns the name of the weapon that was equipped, if any.
    pub async fn unequip_weapon(&self, identity: &PlayerIdentity) -> Result<Option<String>, GameError> {
        self.mutate(identity, |p, _, _, _, _| Ok(p.unequip())).await
    }

    /// Every attempt is saved, failures included, since the cost is spent
    /// either way.
    pub async fn enhance_weapon(
        &self,
        identity: &PlayerIdentity,
        name: &str,
    ) -> Result<EnhanceOutcome, GameError> {
        let out = self
            .mutate(identity, |p, catalog, _, _, rng| {
                enhancement::enhance(p, name, &catalog.enhancement, rng)
            })
            .await?;
        log::info!(
            "{} enhanced {} +{} -> +{} ({}%): {}",
            sanitize_for_log(&identity.username),
            out.weapon,
            out.old_level,
            out.new_level,
            out.success_rate,
            if out.success { "success" } else { "failure" }
        );
        Ok(out)
    }

    pub async fn weapon_details(
        &self,
        identity: &PlayerIdentity,
        name: Option<&str>,
    ) -> Result<Vec<WeaponDetails>, GameError> {
        self.read(identity, |p, catalog, _, _| {
            enhancement::weapon_details(p, name, &catalog.enhancement)
        })
        .await
    }

    pub async fn sell_material(
        &self,
        identity: &PlayerIdentity,
        name: &str,
        amount: u64,
    ) -> Result<SaleLine, GameError> {
        self.mutate(identity, |p, catalog, _, _, _| {
            actions::sell_material(p, catalog, name, amount)
        })
        .await
    }

    pub async fn sell_all_materials(&self, identity: &PlayerIdentity) -> Result<BulkSale, GameError> {
        let out = self
            .mutate(identity, |p, catalog, _, _, _| Ok(actions::sell_all_materials(p, catalog)))
            .await?;
        log::info!(
            "{} sold {} material kinds for {}",
            sanitize_for_log(&identity.username),
            out.sold.len(),
            out.total
        );
        Ok(out)
    }

    /// Top players by experience; `None` uses the configured size.
    pub fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<LeaderboardEntry>, GameError> {
        let limit = limit.unwrap_or(self.rules.leaderboard_size);
        Ok(self.store.top_by_experience(limit)?)
    }

    pub fn player_count(&self) -> Result<usize, GameError> {
        Ok(self.store.player_count()?)
    }
}

fn log_breakthrough(identity: &PlayerIdentity, breakthrough: Option<&Breakthrough>) {
    if let Some(b) = breakthrough {
        log::info!(
            "{} broke through from {} to {}",
            sanitize_for_log(&identity.username),
            b.from,
            b.to
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::SPIRIT_STONE;
    use tempfile::tempdir;

    fn service(dir: &std::path::Path) -> GameService {
        let store = PlayerStore::open(dir).unwrap();
        GameService::with_seed(store, Arc::new(Catalog::builtin()), GameRules::default(), 11)
    }

    #[tokio::test]
    async fn first_contact_creates_the_player() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        let id = PlayerIdentity::new(1, "xiao", "Xiao Yan");
        let p = svc.player(&id).await.unwrap();
        assert_eq!(p.realm, Realm::QiRefining);
        assert_eq!(p.inventory.spirit_stones, 0);
        assert_eq!(svc.player_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn rejected_action_saves_nothing() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        let id = PlayerIdentity::new(2, "lin", "Lin Dong");
        svc.meditate(&id).await.unwrap();
        let before = svc.store().get(2).unwrap();
        let err = svc.meditate(&id).await.unwrap_err();
        assert!(matches!(
            err.as_action(),
            Some(ActionError::CooldownNotElapsed { .. })
        ));
        let after = svc.store().get(2).unwrap();
        assert_eq!(before.exp, after.exp);
        assert_eq!(before.spiritual_power, after.spiritual_power);
        assert_eq!(before.last_meditation_time, after.last_meditation_time);
    }

    #[tokio::test]
    async fn renamed_identity_is_refreshed() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        svc.player(&PlayerIdentity::new(3, "old", "Old Name")).await.unwrap();
        let p = svc
            .player(&PlayerIdentity::new(3, "new", "New Name"))
            .await
            .unwrap();
        assert_eq!(p.display_name, "New Name");
        assert_eq!(svc.store().get(3).unwrap().username, "new");
    }

    #[tokio::test]
    async fn purchase_then_equip_persists() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        let id = PlayerIdentity::new(4, "han", "Han Li");
        let err = svc.buy_weapon(&id, "Azure Wood Sword").await.unwrap_err();
        assert!(matches!(
            err.as_action(),
            Some(ActionError::InsufficientCurrency { required: 150, available: 0 })
        ));
        let mut p = svc.player(&id).await.unwrap();
        p.inventory.add_spirit_stones(200);
        svc.store().save(p).unwrap();

        svc.buy_weapon(&id, "Azure Wood Sword").await.unwrap();
        let eq = svc.equip_weapon(&id, "azure wood sword").await.unwrap();
        assert_eq!(eq.total_attack, 25);
        let stored = svc.store().get(4).unwrap();
        assert_eq!(stored.inventory.spirit_stones, 50);
        assert_eq!(stored.equipped_weapon.as_deref(), Some("Azure Wood Sword"));
        assert_eq!(svc.unequip_weapon(&id).await.unwrap().as_deref(), Some("Azure Wood Sword"));
    }

    #[tokio::test]
    async fn sale_credits_spirit_stones() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        let id = PlayerIdentity::new(5, "ye", "Ye Fan");
        let mut p = svc.player(&id).await.unwrap();
        p.inventory.add_material("Star Iron", 3);
        svc.store().save(p).unwrap();
        let line = svc.sell_material(&id, "star iron", 2).await.unwrap();
        assert_eq!(line.total, 1_000);
        let stored = svc.store().get(5).unwrap();
        assert_eq!(stored.inventory.spirit_stones, 1_000);
        assert_eq!(stored.inventory.material_count("Star Iron"), 1);
        assert_eq!(stored.inventory.material_count(SPIRIT_STONE), 0);
    }

    #[tokio::test]
    async fn owned_weapon_names_ignore_case_everywhere() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        let id = PlayerIdentity::new(6, "shi", "Shi Hao");
        let mut p = svc.player(&id).await.unwrap();
        p.inventory.add_spirit_stones(10_000);
        svc.store().save(p).unwrap();

        svc.buy_weapon(&id, "azure wood sword").await.unwrap();
        let eq = svc.equip_weapon(&id, "azure wood sword").await.unwrap();
        assert_eq!(eq.equipped, "Azure Wood Sword");
        let out = svc.enhance_weapon(&id, "AZURE wood sword").await.unwrap();
        assert_eq!(out.weapon, "Azure Wood Sword");
        assert_eq!(out.old_level, 0);
        let details = svc
            .weapon_details(&id, Some("azure wood SWORD"))
            .await
            .unwrap();
        assert_eq!(details.len(), 1);
        assert!(details[0].equipped);
        assert_eq!(details[0].enhancement_level, out.new_level);
    }

    #[tokio::test]
    async fn invariant_violation_is_not_persisted() {
        let tmp = tempdir().unwrap();
        let svc = service(tmp.path());
        let id = PlayerIdentity::new(7, "wang", "Wang Lin");
        let mut p = svc.player(&id).await.unwrap();
        p.realm = Realm::CoreFormation;
        p.exp = 0;
        svc.store().save(p).unwrap();
        let before = svc.store().get(7).unwrap();

        let err = svc.meditate(&id).await.unwrap_err();
        assert!(matches!(err, GameError::Invariant(_)), "{:?}", err);
        let after = svc.store().get(7).unwrap();
        assert_eq!(after.exp, before.exp);
        assert_eq!(after.last_meditation_time, None);
        assert_eq!(after.realm, Realm::CoreFormation);
    }
}
