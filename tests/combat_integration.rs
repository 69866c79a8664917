//! Combat resolution and dungeon challenges through the service.

mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;
use xiuxian::game::catalog::{BossSkill, BossTemplate, Encounter, MonsterTemplate};
use xiuxian::game::combat::{damage, resolve, BattleEvent, CombatStats};
use xiuxian::game::{ActionError, Realm};

#[test]
fn one_hit_boss_takes_a_single_exchange() {
    let boss = Encounter::Boss(BossTemplate {
        name: "Paper Tiger".into(),
        hp: 40,
        attack: 999,
        defense: 10,
        skills: vec![BossSkill {
            name: "Roar".into(),
            damage: 999,
        }],
    });
    let hero = CombatStats {
        max_hp: 100,
        attack: 60,
        defense: 5,
    };
    let report = resolve(&hero, &boss, &mut StdRng::seed_from_u64(1));
    assert!(report.victory);
    assert_eq!(report.exchanges, 1);
    assert_eq!(report.player_hp, 100);
    assert_eq!(report.defeated, vec!["Paper Tiger".to_string()]);
    assert!(report.log().len() >= 2);
    assert!(matches!(report.events[0], BattleEvent::Encounter { boss: true, .. }));
}

#[test]
fn every_blow_lands_for_at_least_one() {
    assert_eq!(damage(5, 500), 1);
    assert_eq!(damage(0, 0), 1);
    assert_eq!(damage(30, 10), 20);

    let wall = Encounter::Monsters(vec![MonsterTemplate {
        name: "Stone Wall".into(),
        hp: 3,
        attack: 1,
        defense: 1_000,
    }]);
    let hero = CombatStats {
        max_hp: 50,
        attack: 1,
        defense: 1_000,
    };
    let report = resolve(&hero, &wall, &mut StdRng::seed_from_u64(2));
    assert!(report.victory);
    assert_eq!(report.exchanges, 3);
    assert_eq!(report.player_hp, 48);
    for event in &report.events {
        match event {
            BattleEvent::PlayerStrike { damage, .. } | BattleEvent::OpponentStrike { damage, .. } => {
                assert!(*damage >= 1)
            }
            _ => {}
        }
    }
}

#[test]
fn later_monsters_are_never_fought_after_a_defeat() {
    let pack = Encounter::Monsters(vec![
        MonsterTemplate {
            name: "Brute".into(),
            hp: 1_000,
            attack: 60,
            defense: 0,
        },
        MonsterTemplate {
            name: "Second".into(),
            hp: 1,
            attack: 1,
            defense: 0,
        },
    ]);
    let hero = CombatStats {
        max_hp: 100,
        attack: 10,
        defense: 10,
    };
    let report = resolve(&hero, &pack, &mut StdRng::seed_from_u64(3));
    assert!(!report.victory);
    assert!(report.player_hp <= 0);
    assert!(matches!(
        report.events.last(),
        Some(BattleEvent::PlayerDefeated { opponent }) if opponent == "Brute"
    ));
    assert!(!report.log().iter().any(|l| l.contains("Second")));
}

#[tokio::test]
async fn a_lost_challenge_is_paid_for_and_saved() {
    let tmp = tempdir().unwrap();
    let service = common::seeded_service(tmp.path(), 7);
    let me = common::identity(1);

    // A fresh cultivator deals 1 damage a blow to the first guardian.
    let out = service
        .challenge_dungeon(&me, "Hall of Dao Scripture")
        .await
        .unwrap();
    assert!(!out.victory());
    assert!(out.loot.is_none());
    assert_eq!(out.spirit_cost, 30);

    let stored = service.store().get(1).unwrap();
    assert_eq!(stored.spiritual_power, 70);
    assert_eq!(stored.exp, 0);
    assert!(stored.last_challenge_time.is_some());

    let again = service
        .challenge_dungeon(&me, "Hall of Dao Scripture")
        .await
        .unwrap_err();
    assert!(matches!(
        again.as_action(),
        Some(ActionError::CooldownNotElapsed { .. })
    ));
}

#[tokio::test]
async fn a_strong_cultivator_clears_the_first_hall() {
    let tmp = tempdir().unwrap();
    let service = common::seeded_service(tmp.path(), 8);
    let me = common::identity(2);
    common::seed_player(&service, &me, |p| {
        p.attack = 500;
        p.defense = 100;
    });

    let out = service
        .challenge_dungeon(&me, "hall of dao scripture")
        .await
        .unwrap();
    assert!(out.victory());
    let loot = out.loot.expect("loot on victory");
    let stored = service.store().get(2).unwrap();
    assert_eq!(stored.exp, loot.exp);
    assert_eq!(stored.inventory.spirit_stones, loot.spirit_stones);
    for (item, qty) in &loot.items {
        assert_eq!(stored.inventory.dungeon_material_count(item), *qty);
    }
}

#[tokio::test]
async fn high_stages_refuse_low_realms() {
    let tmp = tempdir().unwrap();
    let service = common::seeded_service(tmp.path(), 9);
    let me = common::identity(3);
    let err = service
        .challenge_dungeon(&me, "Primordial Sanctum")
        .await
        .unwrap_err();
    assert_eq!(
        err.as_action(),
        Some(&ActionError::RealmTooLow {
            required: Realm::SpiritSevering,
            current: Realm::QiRefining,
        })
    );
    let err = service.challenge_dungeon(&me, "Nowhere").await.unwrap_err();
    assert!(matches!(err.as_action(), Some(ActionError::UnknownStage(_))));
    assert!(service.store().get(3).unwrap().last_challenge_time.is_none());
}
