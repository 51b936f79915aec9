use std::fs;

use tempfile::TempDir;
use vectorsearch::persistence::{load_store, save_store, StoreSnapshot};
use vectorsearch::reflect::{
    ElementKind, FieldValue, InMemoryHostResolver, InMemoryTypeRegistry, NullHostResolver,
    RecordBlob, RecordType, TypeDescriptor, TypeRef,
};
use vectorsearch::vector_store::{DistanceMetric, Payload, VectorRecord, VectorStore};
use vectorsearch::VectorSearchError;

fn weapon_type() -> TypeRef {
    RecordType::builder("FWeapon")
        .text("title", 16)
        .int32("damage")
        .array("upgrades", ElementKind::Float32, 4)
        .host_reference("mesh")
        .opaque("sockets", "map", 8)
        .build()
}

fn weapon(title: &str, damage: i32) -> RecordBlob {
    RecordBlob::new(weapon_type())
        .with("title", title)
        .and_then(|b| b.with("damage", damage))
        .and_then(|b| b.with("upgrades", FieldValue::Float32Array(vec![0.25, 0.5])))
        .unwrap()
}

#[test]
fn test_round_trip_preserves_every_record() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("armory.json");
    let registry = InMemoryTypeRegistry::new().with_type(weapon_type());

    let mut store = VectorStore::with_metric(DistanceMetric::Cosine);
    let described = VectorRecord::new(vec![1.0, 0.0, 0.0], Payload::from("a sword"), "text")
        .with_metadata("source", "lore");
    store.insert(described).unwrap();
    store.add_text(vec![0.0, 1.0, 0.0], "a bow", "").unwrap();
    store.add(vec![0.0, 0.0, 1.0], weapon("Axe", 12), "weapons").unwrap();
    store.add(vec![0.5, 0.5, 0.0], weapon("Spear", 7), "weapons").unwrap();

    let snapshot = save_store(&store, &path, &NullHostResolver).unwrap();
    assert_eq!(snapshot.name(), "armory");
    assert_eq!(snapshot.len(), 4);

    let loaded = load_store(&path, &registry, &NullHostResolver).unwrap();
    assert_eq!(loaded.len(), store.len());
    assert_eq!(loaded.distance_metric(), DistanceMetric::Cosine);

    for (original, restored) in store.iter().zip(loaded.iter()) {
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.embedding, original.embedding);
        assert_eq!(restored.category, original.category);
        assert_eq!(restored.metadata, original.metadata);
        assert_eq!(restored.payload, original.payload);
    }
}

#[test]
fn test_record_bytes_travel_as_base64() {
    let ty = weapon_type();
    let mut bytes = weapon("Mace", 4).as_bytes().to_vec();
    let sockets = ty.fields().iter().find(|f| f.name == "sockets").unwrap();
    bytes[sockets.range()].fill(0x5A);

    let mut store = VectorStore::new();
    store.add_record(vec![1.0, 1.0], ty.clone(), &bytes, "").unwrap();

    let json = StoreSnapshot::from_store("raw", &store, &NullHostResolver).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entry = &value["entries"][0];
    assert_eq!(entry["entry_type"], "record_blob");
    assert_eq!(entry["struct_type"], "FWeapon");
    assert!(entry["struct_data"].is_string());

    // The byte-level path keeps fields the field-level documents cannot carry.
    let registry = InMemoryTypeRegistry::new().with_type(ty);
    let loaded = StoreSnapshot::from_json(&json)
        .unwrap()
        .to_store(&registry, &NullHostResolver);
    let payload = loaded.records()[0].payload.as_ref().unwrap();
    assert_eq!(payload.as_record().unwrap().as_bytes(), bytes.as_slice());
}

#[test]
fn test_unknown_type_drops_only_that_payload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("partial.json");

    let mut store = VectorStore::new();
    store.add_text(vec![1.0, 0.0], "kept", "notes").unwrap();
    store.add(vec![0.0, 1.0], weapon("Lost", 1), "weapons").unwrap();
    store.add_text(vec![1.0, 1.0], "also kept", "notes").unwrap();
    save_store(&store, &path, &NullHostResolver).unwrap();

    let loaded = load_store(&path, &InMemoryTypeRegistry::new(), &NullHostResolver).unwrap();
    assert_eq!(loaded.len(), 3);
    assert!(loaded.records()[1].payload.is_none());
    assert_eq!(loaded.records()[1].category, "weapons");
    assert_eq!(loaded.records()[1].embedding, vec![0.0, 1.0]);
    assert_eq!(loaded.top_n_texts(&[1.0, 0.0], 5, &[]), vec!["kept", "also kept"]);
    assert_eq!(loaded.stats().empty_payload_count, 1);
}

#[test]
fn test_malformed_document_aborts_load() {
    let temp_dir = TempDir::new().unwrap();

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ \"entries\": [ {\"vector\": [1.0,").unwrap();
    let err = load_store(&broken, &InMemoryTypeRegistry::new(), &NullHostResolver).unwrap_err();
    assert!(matches!(err, VectorSearchError::Format { .. }));

    let no_entries = temp_dir.path().join("no_entries.json");
    fs::write(&no_entries, r#"{ "name": "empty" }"#).unwrap();
    let err = load_store(&no_entries, &InMemoryTypeRegistry::new(), &NullHostResolver).unwrap_err();
    assert!(matches!(err, VectorSearchError::Format { .. }));

    let missing = temp_dir.path().join("missing.json");
    let err = load_store(&missing, &InMemoryTypeRegistry::new(), &NullHostResolver).unwrap_err();
    assert!(matches!(err, VectorSearchError::NotFound { .. }));
}

#[test]
fn test_malformed_record_is_skipped_without_losing_the_rest() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mixed.json");
    fs::write(
        &path,
        r#"{
            "entries": [
                { "vector": [1.0], "entry_type": "text", "string_value": "survivor" },
                { "vector": [2.0], "entry_type": "text", "id": "not-a-uuid" },
                { "vector": [3.0], "entry_type": "widget" },
                { "vector": [4.0], "entry_type": "text", "metadata": { "weight": 3 } }
            ]
        }"#,
    )
    .unwrap();

    let loaded = load_store(&path, &InMemoryTypeRegistry::new(), &NullHostResolver).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.top_n_texts(&[1.0], 5, &[]), vec!["survivor"]);
}

#[test]
fn test_non_finite_embeddings_never_reach_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("finite.json");

    let mut store = VectorStore::new();
    store.add_text(vec![0.5, 1.0], "finite", "").unwrap();
    assert!(matches!(
        store.add_text(vec![f32::NAN, 1.0], "nan", "").unwrap_err(),
        VectorSearchError::InvalidArgument { .. }
    ));
    assert!(store.add_text(vec![f32::INFINITY, 1.0], "inf", "").is_err());

    save_store(&store, &path, &NullHostResolver).unwrap();
    let loaded = load_store(&path, &InMemoryTypeRegistry::new(), &NullHostResolver).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.records()[0].embedding, vec![0.5, 1.0]);
}

#[test]
fn test_null_vector_component_skips_only_that_record() {
    let store = StoreSnapshot::from_json(
        r#"{
            "entries": [
                { "vector": [null, 1.0], "entry_type": "text", "string_value": "broken" },
                { "vector": [0.0, 1.0], "entry_type": "text", "string_value": "fine" }
            ]
        }"#,
    )
    .unwrap()
    .to_store(&InMemoryTypeRegistry::new(), &NullHostResolver);

    assert_eq!(store.len(), 1);
    assert_eq!(store.top_n_texts(&[0.0, 1.0], 5, &[]), vec!["fine"]);
}

#[test]
fn test_newer_format_version_is_rejected() {
    let err = StoreSnapshot::from_json(r#"{ "format_version": 2, "entries": [] }"#).unwrap_err();
    assert!(matches!(err, VectorSearchError::Format { .. }));

    let minimal = StoreSnapshot::from_json(r#"{ "entries": [] }"#).unwrap();
    assert!(minimal.is_empty());
}

#[test]
fn test_host_references_are_restored_by_path() {
    let ty = weapon_type();
    let registry = InMemoryTypeRegistry::new().with_type(ty.clone());

    let mut resolver = InMemoryHostResolver::new();
    let target = resolver.register("/Game/Actors/Training_Dummy");
    let mesh = resolver.register("/Game/Meshes/Axe");

    let mut store = VectorStore::new();
    store.add_host_reference(vec![1.0, 0.0], target, "actors").unwrap();
    store
        .add(vec![0.0, 1.0], weapon("Axe", 12).with("mesh", mesh).unwrap(), "weapons")
        .unwrap();

    let json = StoreSnapshot::from_store("refs", &store, &resolver).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["entries"][0]["object_path"], "/Game/Actors/Training_Dummy");
    assert_eq!(value["entries"][1]["struct_refs"]["mesh"], "/Game/Meshes/Axe");

    // A fresh resolver in another session hands out different handles for the same paths.
    let mut session = InMemoryHostResolver::new();
    session.register("/Game/Unrelated");
    let mesh_again = session.register("/Game/Meshes/Axe");
    let target_again = session.register("/Game/Actors/Training_Dummy");

    let loaded = StoreSnapshot::from_json(&json).unwrap().to_store(&registry, &session);
    assert_eq!(loaded.top_n_host_references(&[1.0, 0.0], 1, &[]), vec![target_again]);
    let blob = loaded.records()[1].payload.as_ref().and_then(Payload::as_record).unwrap();
    assert_eq!(blob.get("mesh").unwrap(), FieldValue::HostReference(Some(mesh_again)));

    // Paths the session cannot resolve come back null.
    let lost = StoreSnapshot::from_json(&json).unwrap().to_store(&registry, &NullHostResolver);
    assert_eq!(
        lost.records()[0].payload,
        Some(Payload::HostReference(None))
    );
    let blob = lost.records()[1].payload.as_ref().and_then(Payload::as_record).unwrap();
    assert_eq!(blob.get("mesh").unwrap(), FieldValue::HostReference(None));
}

#[test]
fn test_field_level_records_still_load() {
    let registry = InMemoryTypeRegistry::new().with_type(weapon_type());
    let json = r#"{
        "name": "legacy",
        "entries": [
            {
                "vector": [1.0, 2.0],
                "entry_type": "record_blob",
                "category": "weapons",
                "struct_type": "FWeapon",
                "struct_fields": { "title": "Club", "damage": 3, "upgrades": [1.5] }
            }
        ]
    }"#;

    let store = StoreSnapshot::from_json(json).unwrap().to_store(&registry, &NullHostResolver);
    assert_eq!(store.len(), 1);

    let blob = store.records()[0].payload.as_ref().and_then(Payload::as_record).unwrap();
    assert_eq!(blob.get("title").unwrap(), FieldValue::Text("Club".into()));
    assert_eq!(blob.get("damage").unwrap(), FieldValue::Int32(3));
    assert_eq!(blob.get("upgrades").unwrap(), FieldValue::Float32Array(vec![1.5]));
}

#[test]
fn test_records_of_another_dimension_are_skipped_on_load() {
    let json = r#"{
        "entries": [
            { "vector": [1.0, 0.0], "entry_type": "text", "string_value": "two" },
            { "vector": [1.0, 0.0, 0.0], "entry_type": "text", "string_value": "three" },
            { "vector": [0.0, 1.0], "entry_type": "text", "string_value": "also two" }
        ]
    }"#;

    let store = StoreSnapshot::from_json(json)
        .unwrap()
        .to_store(&InMemoryTypeRegistry::new(), &NullHostResolver);
    assert_eq!(store.len(), 2);
    assert_eq!(store.dimension(), 2);
}

#[test]
fn test_save_replaces_previous_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");

    let mut store = VectorStore::new();
    store.add_text(vec![1.0], "one", "").unwrap();
    save_store(&store, &path, &NullHostResolver).unwrap();

    store.add_text(vec![2.0], "two", "").unwrap();
    save_store(&store, &path, &NullHostResolver).unwrap();

    let reloaded = StoreSnapshot::load_from_file(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    let leftovers = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}
