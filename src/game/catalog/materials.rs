use std::collections::BTreeMap;

/// Spirit-stone value of every sellable material. Anything missing here
/// cannot be sold.
pub fn builtin_material_values() -> BTreeMap<String, u64> {
    const VALUES: &[(&str, u64)] = &[
        // herbs
        ("Common Herb", 10),
        ("Spirit Grass", 20),
        ("Azure Dragon Grass", 30),
        ("White Tiger Leaf", 40),
        ("Low-Grade Spirit Medicine", 50),
        ("Mid-Grade Spirit Medicine", 100),
        ("Violet Sun Flower", 150),
        ("Starlight Grass", 200),
        ("Dragon Blood Grass", 250),
        ("Sun God Grass", 300),
        ("Moon Essence Grass", 400),
        ("Nine-Leaf Heaven Chrysanthemum", 500),
        ("High-Grade Spirit Medicine", 500),
        ("Undying Divine Medicine", 1_000),
        ("Chaos Azure Lotus", 1_500),
        ("Eternal Life Grass", 2_000),
        ("Supreme Spirit Medicine", 2_000),
        ("Chaos Body Grass", 2_500),
        ("Immortal Medicine", 3_000),
        ("Nine-Turn Soul Return Grass", 4_000),
        ("Divine King Grass", 5_000),
        ("Primeval Divine Medicine", 8_000),
        ("Elixir of Undying", 10_000),
        ("Divine Emperor Grass", 12_000),
        ("Genesis Divine Medicine", 15_000),
        ("Immortal Realm Divine Medicine", 20_000),
        ("Longevity Grass", 25_000),
        ("Chaos Divine Medicine", 30_000),
        ("Great Dao Treasure Medicine", 40_000),
        ("Genesis Eternal Medicine", 50_000),
        // graded stones
        ("Spirit Stone", 1),
        ("Low-Grade Spirit Stone", 10),
        ("Mid-Grade Spirit Stone", 100),
        ("High-Grade Spirit Stone", 1_000),
        ("Supreme Spirit Stone", 10_000),
        ("Divine Spirit Stone", 100_000),
        ("Primeval Divine Stone", 1_000_000),
        ("Immortal Realm Divine Stone", 10_000_000),
        // ores
        ("Bronze Source Ore", 50),
        ("Dark Iron Ore", 100),
        ("Refined Steel Ore", 200),
        ("Star Iron", 500),
        ("Sun Essence Gold", 1_000),
        ("Moonlight Jade", 1_500),
        ("Dragon Bone Gold", 3_000),
        ("Phoenix Marrow Jade", 5_000),
        ("Chaos Stone", 10_000),
        ("Immortal Source Ore", 20_000),
        ("Imperishable Gold", 50_000),
        ("Eternal Source Essence", 100_000),
        ("Chaos Divine Gold", 200_000),
        ("Great Dao Source Stone", 500_000),
    ];
    VALUES
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}
