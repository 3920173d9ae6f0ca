mod common;

use common::flat;
use rstest::rstest;
use runeforge::config::ScoringWeights;
use runeforge::model::{Category, Effect, EffectKind, EffectName, Item, ScoringContext};
use runeforge::reducer::{expand_selection, rank_pool};
use runeforge::scorer::Scorer;

fn scorer() -> Scorer {
    Scorer::new(ScoringWeights::default(), ScoringContext::default())
}

fn values(values: &[f64]) -> Vec<Item> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| flat(&format!("a{}", i), Category::Armor, *v))
        .collect()
}

#[test]
fn test_sorted_by_bound_descending() {
    let items = values(&[3.0, 9.0, 1.0, 7.0, 5.0, 8.0]);
    let ranked = rank_pool(&items, &scorer(), 10);
    let order: Vec<usize> = ranked.all_sorted.iter().map(|r| r.index).collect();
    assert_eq!(order, vec![1, 5, 3, 4, 0, 2]);
    assert!(ranked.all_sorted.windows(2).all(|w| w[0].max >= w[1].max));
}

#[test]
fn test_top_n_is_union_of_base_and_bound_leaders() {
    // Item 0 has the best base; item 1 the best bound (a trigger effect is
    // discounted in base but not in the bound).
    let mut items = values(&[10.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    items[1] = Item::new("trigger", "trigger", Category::Armor).with_effect(Effect::new(
        EffectName::DamageIncrease,
        14.0,
        EffectKind::Trigger,
    ));

    let ranked = rank_pool(&items, &scorer(), 5);
    // Armor needs five slots, so N is at least 5.
    assert!(ranked.top_n.len() >= 5);
    assert!(ranked.top_n.contains(&0));
    assert!(ranked.top_n.contains(&1));
    assert!(!ranked.top_n.contains(&2));
}

#[test]
fn test_class_filter_drops_unusable_items() {
    let mut items = values(&[5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    items[5].classes = vec!["Mage".into()];
    items[4].classes = vec!["warrior".into(), "rogue".into()];

    let context = ScoringContext {
        class: Some("Warrior".into()),
        ..Default::default()
    };
    let s = Scorer::new(ScoringWeights::default(), context);
    let ranked = rank_pool(&items, &s, 10);
    let kept: Vec<usize> = ranked.all_sorted.iter().map(|r| r.index).collect();
    assert_eq!(kept, vec![4, 3, 2, 1, 0]);

    // No class in the context: everyone may equip everything.
    assert_eq!(rank_pool(&items, &scorer(), 10).all_sorted.len(), 6);
}

#[rstest]
#[case(&[4], 1, &[3, 4, 5])]
#[case(&[0], 2, &[0, 1, 2])]
#[case(&[9], 3, &[6, 7, 8, 9])]
#[case(&[2, 6], 1, &[1, 2, 3, 5, 6, 7])]
#[case(&[3, 4], 0, &[3, 4])]
fn test_expand_selection_windows(
    #[case] selected: &[usize],
    #[case] radius: usize,
    #[case] expected: &[usize],
) {
    // Pool index == rank position here.
    let items = values(&[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    let ranked = rank_pool(&items, &scorer(), 3);
    assert_eq!(expand_selection(selected, &ranked.all_sorted, radius), expected);
}

#[test]
fn test_expand_keeps_selected_items() {
    let items = values(&[4.0, 3.0, 2.0, 1.0]);
    let ranked = rank_pool(&items, &scorer(), 2);
    let expanded = expand_selection(&ranked.top_n, &ranked.all_sorted, 0);
    for i in &ranked.top_n {
        assert!(expanded.contains(i));
    }
}
