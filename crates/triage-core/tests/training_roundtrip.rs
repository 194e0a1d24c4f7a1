//! Train on rule-labeled tickets, persist to disk, reload, predict.

mod common;

use triage_core::{
    assign_category, assign_priority, normalize, train, train_and_persist, Category,
    FsModelStore, ModelStore, Priority, TrainedModel, TrainingConfig,
};

#[test]
fn persisted_model_predicts_like_in_memory_model() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsModelStore::new(dir.path().join("models")).unwrap();
    let examples = common::examples();

    let (outcome, saved) =
        train_and_persist(&examples, &TrainingConfig::default(), &store).unwrap();
    assert!(store.is_trained().unwrap());
    assert!(dir.path().join("models/vectorizador.json").exists());
    assert!(dir.path().join("models/modelo_entrenado.json").exists());
    assert_ne!(saved.vectorizer, saved.ensemble);

    let reopened = FsModelStore::open(dir.path().join("models"));
    let loaded = TrainedModel::load(&reopened).unwrap();
    for text in common::RAW_TICKETS
        .iter()
        .copied()
        .chain(["algo totalmente nuevo", ""])
    {
        let normalized = normalize(text);
        assert_eq!(
            loaded.predict(&normalized),
            outcome.model.predict(&normalized),
            "{text}"
        );
    }
}

#[test]
fn vpn_ticket_is_ti_by_rule_and_by_ensemble() {
    let text = "No puedo acceder a mi VPN, error de contraseña";
    assert_eq!(assign_category(text), Category::Ti);

    let outcome = train(&common::examples(), &TrainingConfig::default()).unwrap();
    let category = outcome.model.predict(&normalize(text));
    assert_eq!(category, Category::Ti);
    assert_eq!(assign_priority(text, category), Priority::Alta);
}

#[test]
fn ensemble_agrees_with_rules_on_training_tickets() {
    let outcome = train(&common::examples(), &TrainingConfig::default()).unwrap();
    for example in common::examples() {
        assert_eq!(
            outcome.model.predict(&example.normalized_text),
            example.category,
            "{}",
            example.normalized_text
        );
    }
    assert_eq!(outcome.test_rows, 24);
    assert_eq!(outcome.train_rows, 96);
    println!("{}", outcome.report.render());
}

#[test]
fn same_seed_same_model() {
    let a = train(&common::examples(), &TrainingConfig::default()).unwrap();
    let b = train(&common::examples(), &TrainingConfig::default()).unwrap();
    assert_eq!(a.model, b.model);
}
