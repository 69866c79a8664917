use serde::{Deserialize, Serialize};

use crate::game::realm::Realm;
use crate::game::types::{Rarity, WeaponType};

/// A weapon the shop sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponEntry {
    pub name: String,
    pub weapon_type: WeaponType,
    pub attack: u32,
    pub rarity: Rarity,
    pub required_realm: Realm,
    pub price: u64,
    #[serde(default)]
    pub description: String,
}

fn entry(
    name: &str,
    weapon_type: WeaponType,
    rarity: Rarity,
    required_realm: Realm,
    price: u64,
    attack: u32,
    description: &str,
) -> WeaponEntry {
    WeaponEntry {
        name: name.to_string(),
        weapon_type,
        attack,
        rarity,
        required_realm,
        price,
        description: description.to_string(),
    }
}

/// Three weapons per realm, cheapest first.
#[rustfmt::skip]
pub fn builtin_weapons() -> Vec<WeaponEntry> {
    use Rarity::*;
    use Realm::*;
    use WeaponType::*;
    vec![
        entry("Azure Wood Sword", Sword, Common, QiRefining, 150, 15,
            "Carved from thousand-year azure wood; light in the hand."),
        entry("Blazing Sun Saber", Saber, Fine, QiRefining, 250, 20,
            "Quenched in sunfire, its edge never cools."),
        entry("Frost Spear", Spear, Rare, QiRefining, 300, 25,
            "A spear tip of northern ice that numbs what it pierces."),
        entry("Mountain-Splitting Axe", Axe, Common, FoundationEstablishment, 500, 40,
            "Heavy enough to split a hillside in one swing."),
        entry("Violet Lightning Sword", Sword, Fine, FoundationEstablishment, 700, 50,
            "Crackles with violet arcs when drawn."),
        entry("Raging Flame Halberd", Halberd, Rare, FoundationEstablishment, 800, 60,
            "Its blade burns with a fire that water cannot quench."),
        entry("Dragon-Pattern Sword", Sword, Fine, CoreFormation, 1_200, 80,
            "Dragon scales are etched along the blade."),
        entry("Falling Star Hammer", Hammer, Rare, CoreFormation, 1_400, 90,
            "Forged from the iron of a fallen star."),
        entry("Heavenly Gang Spear", Spear, Rare, CoreFormation, 1_600, 100,
            "Channels the thirty-six Heavenly Gang stars."),
        entry("Crimson Sky Sword", Sword, Rare, NascentSoul, 2_000, 130,
            "Its red light is said to cut the evening sky."),
        entry("Azure Rainbow Saber", Saber, Rare, NascentSoul, 2_500, 150,
            "Leaves an azure arc hanging in the air."),
        entry("Black Dragon Halberd", Halberd, Epic, NascentSoul, 3_000, 180,
            "Holds the remnant soul of a black dragon."),
        entry("Nine Suns Sword", Sword, Epic, SpiritSevering, 4_000, 200,
            "Nine suns burn within the blade."),
        entry("Frost Soul Spear", Spear, Epic, SpiritSevering, 4_500, 220,
            "Freezes the soul of whatever it strikes."),
        entry("Heaven-Breaking Hammer", Hammer, Legendary, SpiritSevering, 5_000, 250,
            "One blow is said to crack the sky."),
        entry("Primordial Unity Sword", Sword, Legendary, VoidRefinement, 6_000, 300,
            "Tempered in primordial chaos."),
        entry("Crimson Thunder Saber", Saber, Legendary, VoidRefinement, 6_500, 320,
            "Red thunder rolls with every cut."),
        entry("Mystic Light Halberd", Halberd, Legendary, VoidRefinement, 7_000, 350,
            "Its dark glow swallows the light around it."),
        entry("Heavenly Dao Sword", Sword, Legendary, BodyIntegration, 8_000, 400,
            "Carries a thread of the Heavenly Dao."),
        entry("World-Ending Saber", Saber, Legendary, BodyIntegration, 8_500, 450,
            "Forged to end worlds."),
        entry("Firmament Hammer", Hammer, Legendary, BodyIntegration, 9_000, 500,
            "Heavy as the vault of heaven."),
        entry("Divine Empyrean Sword", Sword, Divine, Mahayana, 10_000, 600,
            "Descended from the empyrean heights."),
        entry("Myriad Tribulation Spear", Spear, Divine, Mahayana, 11_000, 650,
            "Survived ten thousand heavenly tribulations."),
        entry("Heaven and Earth Halberd", Halberd, Divine, Mahayana, 12_000, 700,
            "Holds heaven and earth within its shaft."),
        entry("Samsara Sword", Sword, Artifact, Tribulation, 15_000, 800,
            "Governs the wheel of rebirth."),
        entry("Heaven-Slaying Saber", Saber, Artifact, Tribulation, 16_000, 850,
            "Made to slay the heavens themselves."),
        entry("Chaos Hammer", Hammer, Artifact, Tribulation, 17_000, 900,
            "Shaped from the chaos before creation."),
    ]
}
