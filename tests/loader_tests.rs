use runeforge::error::RuneError;
use runeforge::loader::{load_context, load_pools, parse_pools, save_pools};
use runeforge::model::{Category, EffectName, Role};
use runeforge::synthetic::{generate, SynthSpec};
use std::fs::File;
use std::io::Write;

#[test]
fn test_flat_array_is_split_by_category() {
    let json = r#"[
        {"id": "w1", "name": "Blade", "category": "weapon",
         "effects": [{"name": "attack_increase", "value": 12, "kind": "permanent"}]},
        {"id": "a1", "name": "Helm", "category": "armor"},
        {"id": "e1", "name": "Sigil", "category": "emblem",
         "awakening": {"duration": 20, "baseCooldown": 90,
                       "effects": [{"name": "damage_increase", "value": 30, "kind": "awakening"}]}},
        {"id": "c1", "name": "Ring", "category": "accessory", "skill": "nova"}
    ]"#;
    let pools = parse_pools(json).unwrap();
    assert_eq!(pools.weapons.len(), 1);
    assert_eq!(pools.armor.len(), 1);
    assert_eq!(pools.emblems.len(), 1);
    assert_eq!(pools.accessories.len(), 1);
    assert_eq!(pools.weapons[0].effects[0].name, EffectName::AttackIncrease);
    assert!(pools.emblems[0].awakening.is_some());
    assert_eq!(pools.accessories[0].skill.as_deref(), Some("nova"));
}

#[test]
fn test_object_form_fills_category_from_key() {
    let json = r#"{
        "weapons": [{"id": "w1", "name": "Blade"}],
        "accessories": [{"id": "c1", "name": "Ring"}, {"id": "c2", "name": "Band"}]
    }"#;
    let pools = parse_pools(json).unwrap();
    assert_eq!(pools.weapons[0].category, Category::Weapon);
    assert_eq!(pools.accessories.len(), 2);
    assert!(pools.armor.is_empty());
}

#[test]
fn test_malformed_and_duplicate_records_are_dropped() {
    let json = r#"[
        {"id": "w1", "name": "Blade", "category": "weapon"},
        {"id": "w1", "name": "Blade again", "category": "weapon"},
        {"id": "bad", "category": "weapon"},
        {"id": "w2", "name": "Axe", "category": "weapon",
         "effects": [{"name": "damage_increase", "value": 5}]},
        42
    ]"#;
    let pools = parse_pools(json).unwrap();
    // Missing name, missing effect kind and a bare number are all skipped.
    let ids: Vec<&str> = pools.weapons.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["w1"]);
    assert_eq!(pools.weapons[0].name, "Blade");
}

#[test]
fn test_malformed_awakening_keeps_the_emblem() {
    let json = r#"[
        {"id": "e1", "name": "Sigil", "category": "emblem",
         "awakening": {"duration": "long", "baseCooldown": 90}},
        {"id": "e2", "name": "Crest", "category": "emblem",
         "awakening": {"duration": 15,
                       "effects": [{"name": "damage_increase", "value": 30, "kind": "awakening"}]}},
        {"id": "e3", "name": "Seal", "category": "emblem", "awakening": null}
    ]"#;
    let pools = parse_pools(json).unwrap();
    assert_eq!(pools.emblems.len(), 3);
    assert_eq!(pools.emblems[0].awakening, None);

    let crest = pools.emblems[1].awakening.as_ref().unwrap();
    assert_eq!(crest.duration, 15.0);
    assert_eq!(crest.base_cooldown, 0.0);
    assert_eq!(crest.effects.len(), 1);

    assert_eq!(pools.emblems[2].awakening, None);
}

#[test]
fn test_misfiled_item_is_dropped() {
    let json = r#"{"armor": [{"id": "x", "name": "X", "category": "weapon"}]}"#;
    let pools = parse_pools(json).unwrap();
    assert!(pools.armor.is_empty());
    assert!(pools.weapons.is_empty());
}

#[test]
fn test_rejects_bad_shapes() {
    assert!(matches!(parse_pools("12"), Err(RuneError::Validation(_))));
    assert!(matches!(
        parse_pools(r#"{"armor": {"id": "a"}}"#),
        Err(RuneError::Validation(_))
    ));
    assert!(matches!(parse_pools("{"), Err(RuneError::Json(_))));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pools.json");
    let pools = generate(&SynthSpec::default());

    save_pools(&path, &pools).unwrap();
    let loaded = load_pools(&path).unwrap();
    assert_eq!(loaded.weapons, pools.weapons);
    assert_eq!(loaded.armor, pools.armor);
    assert_eq!(loaded.emblems, pools.emblems);
    assert_eq!(loaded.accessories, pools.accessories);
}

#[test]
fn test_load_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("context.json");
    let mut file = File::create(&path).unwrap();
    writeln!(
        file,
        r#"{{"role": "striker", "class": "Warrior", "stats": {{"critChance": 25}}}}"#
    )
    .unwrap();

    let context = load_context(&path).unwrap();
    assert_eq!(context.role, Some(Role::Striker));
    assert_eq!(context.class.as_deref(), Some("Warrior"));
    assert_eq!(context.stats.crit_chance, 25.0);
    assert_eq!(context.enhancement_target, 15);
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        load_pools("/no/such/pools.json"),
        Err(RuneError::Io(_))
    ));
}
