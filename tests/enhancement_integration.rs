//! Enhancement odds, fees and the shop's re-purchase rule.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use xiuxian::game::enhancement::{enhance, EnhancementTable};
use xiuxian::game::shop;
use xiuxian::game::{ActionError, Catalog, PlayerRecord};

fn armed_player(stones: u64) -> PlayerRecord {
    let catalog = Catalog::builtin();
    let mut p = PlayerRecord::new(9, "shi", "Shi Hao", Utc::now());
    p.inventory.spirit_stones = stones + 150;
    shop::buy(&mut p, &catalog, "Azure Wood Sword", Utc::now()).unwrap();
    p
}

#[test]
fn first_level_always_succeeds() {
    let table = EnhancementTable::default();
    let mut rng = StdRng::seed_from_u64(1);
    for seed in 0..50u64 {
        let mut p = armed_player(100);
        let mut rng_i = StdRng::seed_from_u64(seed);
        let out = enhance(&mut p, "Azure Wood Sword", &table, &mut rng_i).unwrap();
        assert!(out.success);
        assert_eq!(out.new_level, 1);
        assert_eq!(out.new_attack, 25);
        assert_eq!(out.remaining_spirit_stones, 0);
    }
    // And a second attempt is now unaffordable.
    let mut p = armed_player(100);
    enhance(&mut p, "Azure Wood Sword", &table, &mut rng).unwrap();
    assert_eq!(
        enhance(&mut p, "Azure Wood Sword", &table, &mut rng).unwrap_err(),
        ActionError::InsufficientCurrency { required: 200, available: 0 }
    );
}

#[test]
fn level_ten_succeeds_about_half_the_time() {
    let table = EnhancementTable::default();
    assert_eq!(table.success_rate(10), 50);
    let trials = 10_000u64;
    let mut p = armed_player(trials * table.cost(10));
    {
        let w = p.weapon_mut("Azure Wood Sword").unwrap();
        w.enhancement_level = 10;
    }
    let base_attack = p.weapon("Azure Wood Sword").unwrap().attack;
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    let mut successes = 0u64;
    for _ in 0..trials {
        let out = enhance(&mut p, "Azure Wood Sword", &table, &mut rng).unwrap();
        if out.success {
            successes += 1;
            assert_eq!(out.new_attack, base_attack + table.attack_bonus(11));
            let w = p.weapon_mut("Azure Wood Sword").unwrap();
            w.enhancement_level = 10;
            w.attack = base_attack;
        } else {
            assert_eq!(out.new_level, 10);
            assert_eq!(out.new_attack, base_attack);
        }
    }
    assert!(
        (4_700..=5_300).contains(&successes),
        "{} successes out of {}",
        successes,
        trials
    );
    // Every attempt was paid for.
    assert_eq!(p.inventory.spirit_stones, 0);
}

#[test]
fn failures_keep_level_but_charge() {
    let table = EnhancementTable {
        success_rates: vec![1; 21],
        ..EnhancementTable::default()
    };
    let mut p = armed_player(10_000);
    let mut rng = StdRng::seed_from_u64(3);
    let mut failures = 0u32;
    for _ in 0..20 {
        let out = enhance(&mut p, "Azure Wood Sword", &table, &mut rng).unwrap();
        if !out.success {
            failures += 1;
            assert_eq!(out.old_level, out.new_level);
        }
    }
    assert!(failures > 0);
    let level = p.weapon("Azure Wood Sword").unwrap().enhancement_level;
    assert_eq!(u32::from(level) + failures, 20);
    let spent: u64 = 10_000 - p.inventory.spirit_stones;
    assert!(spent >= 20 * 100);
}

#[test]
fn cannot_enhance_past_the_cap_or_unowned() {
    let table = EnhancementTable::default();
    let mut rng = StdRng::seed_from_u64(4);
    let mut p = armed_player(1_000_000);
    p.weapon_mut("Azure Wood Sword").unwrap().enhancement_level = 20;
    let before = p.inventory.spirit_stones;
    assert!(matches!(
        enhance(&mut p, "Azure Wood Sword", &table, &mut rng),
        Err(ActionError::MaxLevelReached { level: 20, .. })
    ));
    assert!(matches!(
        enhance(&mut p, "Chaos Hammer", &table, &mut rng),
        Err(ActionError::WeaponNotOwned(_))
    ));
    assert_eq!(p.inventory.spirit_stones, before);
}

#[test]
fn buying_an_owned_weapon_replaces_it_with_a_fresh_copy() {
    let catalog = Catalog::builtin();
    let table = EnhancementTable::default();
    let mut rng = StdRng::seed_from_u64(5);
    let mut p = armed_player(100 + 150);
    enhance(&mut p, "Azure Wood Sword", &table, &mut rng).unwrap();
    p.equip("Azure Wood Sword").unwrap();
    assert_eq!(p.total_attack(), 10 + 25);

    let out = shop::buy(&mut p, &catalog, "Azure Wood Sword", Utc::now()).unwrap();
    assert_eq!(out.replaced_level, Some(1));
    assert_eq!(out.remaining_spirit_stones, 0);
    let w = p.weapon("Azure Wood Sword").unwrap();
    assert_eq!(w.enhancement_level, 0);
    assert_eq!(w.attack, 15);
    assert_eq!(p.equipped_weapon.as_deref(), Some("Azure Wood Sword"));
    assert_eq!(p.total_attack(), 25);
}
