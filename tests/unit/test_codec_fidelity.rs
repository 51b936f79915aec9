use vectorsearch::reflect::{
    deep_copy, deep_copy_into, deserialize, serialize, ElementKind, FieldValue, HostHandle,
    InMemoryHostResolver, NullHostResolver, RecordBlob, RecordType, TypeDescriptor, TypeRef,
};

fn character_type() -> TypeRef {
    let stats = RecordType::builder("FStats")
        .int32("health")
        .float32("stamina")
        .build();

    RecordType::builder("FCharacter")
        .bool("alive")
        .int32("level")
        .float32("speed")
        .float64("experience")
        .text("display_name", 24)
        .name("archetype", 16)
        .array("inventory_ids", ElementKind::Int32, 4)
        .array("weights", ElementKind::Float32, 3)
        .array("tags", ElementKind::Text { capacity: 8 }, 3)
        .record("stats", stats)
        .host_reference("portrait")
        .opaque("skills", "map", 16)
        .build()
}

fn populated(ty: &TypeRef) -> RecordBlob {
    RecordBlob::new(ty.clone())
        .with("alive", true)
        .and_then(|b| b.with("level", 42))
        .and_then(|b| b.with("speed", 3.5f32))
        .and_then(|b| b.with("experience", 1234.5f64))
        .and_then(|b| b.with("display_name", "Aria"))
        .and_then(|b| b.with("archetype", FieldValue::Name("Ranger".into())))
        .and_then(|b| b.with("inventory_ids", FieldValue::Int32Array(vec![7, 9])))
        .and_then(|b| b.with("weights", FieldValue::Float32Array(vec![0.5, 1.5, 2.5])))
        .and_then(|b| b.with("tags", FieldValue::TextArray(vec!["elf".into(), "scout".into()])))
        .and_then(|b| b.with("stats.health", 90))
        .and_then(|b| b.with("stats.stamina", 0.75f32))
        .unwrap()
}

/// Raw bytes with the opaque `skills` region filled with a marker.
fn bytes_with_opaque_marker(ty: &TypeRef, blob: &RecordBlob) -> Vec<u8> {
    let mut bytes = blob.as_bytes().to_vec();
    let skills = ty.fields().iter().find(|f| f.name == "skills").unwrap();
    bytes[skills.range()].fill(0xAB);
    bytes
}

#[test]
fn test_deep_copy_is_field_wise_equal() {
    let ty = character_type();
    let source = populated(&ty);

    let copy = deep_copy(ty.as_ref(), source.as_bytes()).unwrap();
    assert_eq!(copy, source.as_bytes());
}

#[test]
fn test_deep_copy_never_aliases_the_source() {
    let ty = character_type();
    let mut source = populated(&ty);
    let mut copy = source.deep_copy();

    copy.set("display_name", "Changed").unwrap();
    copy.set("stats.health", 1).unwrap();
    assert_eq!(source.get("display_name").unwrap(), FieldValue::Text("Aria".into()));
    assert_eq!(source.get("stats.health").unwrap(), FieldValue::Int32(90));

    source.set("level", 1).unwrap();
    assert_eq!(copy.get("level").unwrap(), FieldValue::Int32(42));
}

#[test]
fn test_deep_copy_nulls_host_references() {
    let ty = character_type();
    let source = populated(&ty)
        .with("portrait", HostHandle::new(77).unwrap())
        .unwrap();

    let copy = RecordBlob::from_bytes(ty.clone(), source.as_bytes()).unwrap();
    assert_eq!(copy.get("portrait").unwrap(), FieldValue::HostReference(None));
    assert_eq!(
        source.get("portrait").unwrap(),
        FieldValue::HostReference(HostHandle::new(77))
    );
}

#[test]
fn test_deep_copy_copies_opaque_bytes() {
    let ty = character_type();
    let bytes = bytes_with_opaque_marker(&ty, &populated(&ty));

    let copy = deep_copy(ty.as_ref(), &bytes).unwrap();
    assert_eq!(copy, bytes);
}

#[test]
fn test_deep_copy_into_rejects_mismatched_buffers() {
    let ty = character_type();
    let source = populated(&ty);

    let mut short = vec![0x11u8; 8];
    assert!(deep_copy_into(ty.as_ref(), &mut short, source.as_bytes()).is_err());
    assert!(short.iter().all(|b| *b == 0x11));

    let mut dest = vec![0x11u8; ty.byte_size()];
    deep_copy_into(ty.as_ref(), &mut dest, source.as_bytes()).unwrap();
    assert_eq!(dest, source.as_bytes());
}

#[test]
fn test_document_round_trip_of_supported_kinds() {
    let ty = character_type();
    let source = populated(&ty);

    let doc = serialize(ty.as_ref(), source.as_bytes(), &NullHostResolver).unwrap();
    let restored = deserialize(ty.as_ref(), &doc, &NullHostResolver);

    assert_eq!(restored, source.as_bytes());
    assert_eq!(doc["archetype"], serde_json::json!("Ranger"));
    assert_eq!(doc["stats"]["health"], serde_json::json!(90));
    assert_eq!(doc["tags"], serde_json::json!(["elf", "scout"]));
}

#[test]
fn test_unsupported_kinds_are_omitted_from_documents() {
    let ty = character_type();
    let blob = populated(&ty);
    let bytes = bytes_with_opaque_marker(&ty, &blob);

    let doc = serialize(ty.as_ref(), &bytes, &NullHostResolver).unwrap();
    assert!(!doc.contains_key("skills"));

    // Document round trips lose unsupported fields: they come back default-initialized.
    let restored = deserialize(ty.as_ref(), &doc, &NullHostResolver);
    let skills = ty.fields().iter().find(|f| f.name == "skills").unwrap();
    assert!(restored[skills.range()].iter().all(|b| *b == 0));
    assert_ne!(restored, bytes);
}

#[test]
fn test_host_reference_document_uses_refpath() {
    let ty = character_type();
    let mut resolver = InMemoryHostResolver::new();
    let portrait = resolver.register("/Game/UI/Portraits/Aria");

    let blob = populated(&ty).with("portrait", portrait).unwrap();
    let doc = serialize(ty.as_ref(), blob.as_bytes(), &resolver).unwrap();

    assert!(doc["portrait"].is_null());
    assert_eq!(doc["portrait_refpath"], serde_json::json!("/Game/UI/Portraits/Aria"));

    let restored = RecordBlob::from_document(ty.clone(), &doc, &resolver);
    assert_eq!(
        restored.get("portrait").unwrap(),
        FieldValue::HostReference(Some(portrait))
    );

    // A resolver that no longer knows the path leaves the field null.
    let lost = RecordBlob::from_document(ty, &doc, &NullHostResolver);
    assert_eq!(lost.get("portrait").unwrap(), FieldValue::HostReference(None));
}
