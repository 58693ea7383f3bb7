//! Public-API tests for the prefs-core domain types.

use prefs_core::{
    migrate_selection_name, GpuDevice, KeyValueStore, MemoryStore, ModelDefaults, ModelField,
    ModelProfile, SettingValue, ValueKind,
};

#[test]
fn test_every_field_default_has_the_field_kind() {
    let defaults = ModelDefaults::default();

    for field in ModelField::ALL {
        assert_eq!(defaults.value(field).kind(), field.kind(), "field {field}");
    }
}

#[test]
fn test_field_names_round_trip_through_from_str() {
    for field in ModelField::ALL {
        let parsed: ModelField = field.key().parse().expect("known key");
        assert_eq!(parsed, field);
    }
    assert!("volume".parse::<ModelField>().is_err());
}

#[test]
fn test_generation_fields_are_a_subset_of_all() {
    for field in ModelField::GENERATION {
        assert!(ModelField::ALL.contains(&field));
    }
    assert!(!ModelField::GENERATION.contains(&ModelField::Name));
}

#[test]
fn test_setting_values_serialize_untagged_to_json() {
    let values = vec![
        SettingValue::Bool(true),
        SettingValue::Int(40),
        SettingValue::Double(0.7),
        SettingValue::from("Dark"),
    ];

    let json = serde_json::to_string(&values).expect("serialize");

    assert_eq!(json, r#"[true,40,0.7,"Dark"]"#);
}

#[test]
fn test_coercion_falls_back_to_zero_value() {
    assert_eq!(
        SettingValue::from("not a number").coerce(ValueKind::Int),
        SettingValue::Int(0)
    );
    assert_eq!(
        SettingValue::from("yes").coerce(ValueKind::Timestamp),
        ValueKind::Timestamp.zero()
    );
}

#[test]
fn test_memory_store_remove_group_leaves_other_models() {
    // Arrange
    let store = MemoryStore::new();
    store.set(&ModelField::TopP.storage_key("a"), SettingValue::Double(0.9));
    store.set(&ModelField::TopK.storage_key("a"), SettingValue::Int(10));
    store.set(&ModelField::TopK.storage_key("ab"), SettingValue::Int(20));

    // Act
    store.remove_group("model-a");

    // Assert
    assert_eq!(store.keys(), vec!["model-ab/topK".to_string()]);
}

#[test]
fn test_cloned_profile_saves_metadata_under_new_id() {
    let original = ModelProfile::new("base", ModelDefaults::default());

    let clone = original.clone_as_new();

    assert_ne!(clone.id, original.id);
    assert!(clone.should_save_metadata);
    assert_eq!(clone.defaults.value(ModelField::IsClone), SettingValue::Bool(true));
}

#[test]
fn test_selection_names_are_stable_after_migration() {
    let gpu = GpuDevice::new("kompute", "Radeon RX 7900");

    let name = gpu.selection_name();

    assert_eq!(name, "Vulkan: Radeon RX 7900");
    assert_eq!(migrate_selection_name(&name), name);
    assert_eq!(migrate_selection_name("Radeon RX 7900"), name);
}
