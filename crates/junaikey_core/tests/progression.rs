mod common;

use common::FaultyStorage;
use junaikey_core::growth::leveling::exp_to_next_level;
use junaikey_core::storage::PROGRESSION_NAMESPACE;
use junaikey_core::{LoadSource, MemoryStorage, ProgressionStore, StoragePort, StoreError};
use std::sync::Arc;

fn fresh_store() -> (Arc<MemoryStorage>, ProgressionStore) {
    let storage = Arc::new(MemoryStorage::new());
    let store = ProgressionStore::load(storage.clone());
    (storage, store)
}

#[test]
fn thousand_exp_from_level_one_lands_on_level_four() {
    let (_, mut store) = fresh_store();

    let award = store.add_exp("fire", 1000).unwrap().unwrap();

    assert_eq!(award.spirit.level, 4);
    assert_eq!(award.spirit.exp, 99);
    assert_eq!(award.spirit.levels_gained, 3);
    let spirit = store.spirit("fire").unwrap();
    assert_eq!((spirit.level, spirit.exp), (4, 99));
}

#[test]
fn award_advances_linked_avatar_by_the_same_amount() {
    let (_, mut store) = fresh_store();

    let award = store.add_exp("fire", 1000).unwrap().unwrap();

    let avatar = award.avatar.unwrap();
    assert_eq!(avatar.avatar_id, "avatar_blaze");
    assert_eq!((avatar.progress.level, avatar.progress.exp), (4, 99));
    let stored = store.avatar_for_spirit("fire").unwrap();
    assert_eq!((stored.level, stored.exp), (4, 99));

    let untouched = store.avatar_for_spirit("water").unwrap();
    assert_eq!((untouched.level, untouched.exp), (1, 0));
}

#[test]
fn spirit_without_avatar_still_levels() {
    let (_, mut store) = fresh_store();

    let award = store.add_exp("earth", 100).unwrap().unwrap();

    assert!(award.avatar.is_none());
    assert_eq!(store.spirit("earth").unwrap().level, 2);
}

#[test]
fn unknown_spirit_is_a_silent_no_op() {
    let (storage, mut store) = fresh_store();
    let before = store.snapshot();

    assert!(store.add_exp("plasma", 5_000).unwrap().is_none());

    assert_eq!(store.snapshot(), before);
    assert_eq!(storage.get(PROGRESSION_NAMESPACE).unwrap(), None);
}

#[test]
fn profession_bonus_applies_only_to_listed_spirits() {
    let (_, mut store) = fresh_store();
    store.select_profession("alchemist").unwrap();

    let fire = store.add_exp("fire", 100).unwrap().unwrap();
    assert_eq!(fire.multiplier, Some(1.5));
    assert_eq!(fire.applied_amount, 150);
    assert_eq!((fire.spirit.level, fire.spirit.exp), (2, 50));

    let water = store.add_exp("water", 100).unwrap().unwrap();
    assert_eq!(water.multiplier, None);
    assert_eq!(water.applied_amount, 100);
}

#[test]
fn fractional_bonus_is_floored() {
    let (_, mut store) = fresh_store();
    store.select_profession("navigator").unwrap();

    let award = store.add_exp("wind", 7).unwrap().unwrap();

    // 7 * 1.2 = 8.4
    assert_eq!(award.applied_amount, 8);
}

#[test]
fn unknown_profession_is_stored_but_grants_nothing() {
    let (_, mut store) = fresh_store();
    store.select_profession("bard").unwrap();

    assert_eq!(store.selected_profession_id(), Some("bard"));
    assert!(store.selected_profession().is_none());

    let award = store.add_exp("light", 100).unwrap().unwrap();
    assert_eq!(award.applied_amount, 100);
}

#[test]
fn clearing_profession_removes_bonus() {
    let (_, mut store) = fresh_store();
    store.select_profession("sage").unwrap();
    store.clear_profession().unwrap();

    let award = store.add_exp("light", 100).unwrap().unwrap();

    assert_eq!(store.selected_profession_id(), None);
    assert_eq!(award.applied_amount, 100);
}

#[test]
fn crossing_level_five_reports_first_milestone() {
    let (_, mut store) = fresh_store();
    let to_five: u64 = (1..5).map(exp_to_next_level).sum();

    let award = store.add_exp("time", to_five).unwrap().unwrap();

    assert_eq!((award.spirit.level, award.spirit.exp), (5, 0));
    assert_eq!(award.milestones.len(), 1);
    assert_eq!(award.milestones[0].title, "Awakened");
}

#[test]
fn state_survives_reload() {
    let (storage, mut store) = fresh_store();
    store.select_profession("chronomancer").unwrap();
    store.add_exp("time", 400).unwrap();

    let reloaded = ProgressionStore::load(storage.clone());

    assert_eq!(reloaded.load_source(), LoadSource::Stored);
    assert_eq!(reloaded.snapshot(), store.snapshot());
    assert_eq!(reloaded.selected_profession_id(), Some("chronomancer"));
}

#[test]
fn corrupt_document_falls_back_to_seed() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(PROGRESSION_NAMESPACE, "{\"spirits\": [oops")
        .unwrap();

    let store = ProgressionStore::load(storage.clone());

    assert_eq!(store.load_source(), LoadSource::Corrupt);
    assert_eq!(store.state().spirits.len(), 12);
    assert!(store
        .state()
        .spirits
        .iter()
        .all(|spirit| spirit.level == 1 && spirit.exp == 0));
}

#[test]
fn out_of_range_document_is_normalized_on_load() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(
            PROGRESSION_NAMESPACE,
            r#"{"spirits":[{"id":"fire","name":"Ignis","level":0,"exp":250}],"avatars":[]}"#,
        )
        .unwrap();

    let store = ProgressionStore::load(storage.clone());

    let fire = store.spirit("fire").unwrap();
    assert_eq!((fire.level, fire.exp), (2, 150));
    // Missing catalog entries are restored.
    assert_eq!(store.state().spirits.len(), 12);
    assert_eq!(store.state().avatars.len(), 8);
}

#[test]
fn failed_write_leaves_state_unchanged() {
    let storage = Arc::new(FaultyStorage::new());
    let mut store = ProgressionStore::load(storage.clone());
    let before = store.snapshot();
    storage.fail_writes(PROGRESSION_NAMESPACE);

    let err = store.add_exp("fire", 1000).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
    assert!(store.select_profession("sage").is_err());
    assert_eq!(store.snapshot(), before);

    storage.heal();
    assert!(store.add_exp("fire", 1000).unwrap().is_some());
}

#[test]
fn exp_stays_below_threshold_across_many_awards() {
    let (_, mut store) = fresh_store();
    store.select_profession("architect").unwrap();
    let spirits = ["fire", "earth", "wood", "time", "void"];

    for step in 0u64..300 {
        let spirit_id = spirits[(step % spirits.len() as u64) as usize];
        store.add_exp(spirit_id, (step * 37) % 911).unwrap();
    }

    for spirit in &store.state().spirits {
        assert!(spirit.level >= 1);
        assert!(spirit.exp < exp_to_next_level(spirit.level));
    }
    for avatar in &store.state().avatars {
        assert!(avatar.level >= 1);
        assert!(avatar.exp < exp_to_next_level(avatar.level));
    }
}

#[test]
fn summoner_level_sums_spirit_levels() {
    let (_, mut store) = fresh_store();
    assert_eq!(store.summoner_level(), 12);

    store.add_exp("fire", 1000).unwrap();

    assert_eq!(store.summoner_level(), 15);
}
