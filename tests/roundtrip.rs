use contextfont::{
    deserialize, load, save, serialize, Anchor, ContextError, Font, Glyph, Layer, Master, Node,
    ObjectRuntime, Path, Shape,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// A font with one master, one glyph ("A") drawn as a closed rectangle,
/// and an anchor.
fn rectangle_font() -> Font {
    let mut font = Font::new();
    font.upm = 1000;

    let mut name = contextfont::I18NDictionary::new();
    name.insert("en", "Regular");
    font.masters.push(Master::new(name, "M1"));

    let mut layer = Layer::new(500);
    layer.master = Some("M1".to_string());
    let mut rect = Path::new();
    rect.nodes = vec![
        Node::line(0, 0),
        Node::line(100, 0),
        Node::line(100, 100),
        Node::line(0, 100),
    ];
    layer.push_path(rect);
    layer.anchors.push(Anchor::new("top", 250, 700));

    let mut glyph = Glyph::new("A");
    glyph.codepoints = vec![0x41];
    glyph.layers.push(layer);
    font.glyphs.append(glyph).unwrap();
    font
}

#[test]
fn test_in_memory_round_trip_is_identity() {
    let font = rectangle_font();
    let reloaded = deserialize(&serialize(&font).unwrap()).unwrap();
    assert_eq!(reloaded, font);
}

#[test]
fn test_round_trip_reproduces_the_graph() {
    let font = rectangle_font();
    let reloaded = deserialize(&serialize(&font).unwrap()).unwrap();

    assert_eq!(reloaded.masters[0].id, "M1");
    assert_eq!(reloaded.masters[0].name.get("en"), Some("Regular"));
    let glyph = reloaded.glyphs.get("A").unwrap();
    assert_eq!(glyph.layers[0].width, 500);
    let anchor = glyph.layers[0].anchor("top").unwrap();
    assert_eq!((anchor.x, anchor.y), (250, 700));
    match &glyph.layers[0].shapes[0] {
        Shape::Path(path) => {
            assert!(path.closed);
            assert_eq!(path.nodes.len(), 4);
            assert_eq!(
                path.nodes.iter().map(|n| (n.x, n.y)).collect::<Vec<_>>(),
                [(0, 0), (100, 0), (100, 100), (0, 100)]
            );
            assert!(path.nodes.iter().all(|n| n.type_code() == "l"));
        }
        Shape::Component(_) => panic!("expected a path"),
    }
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("Test.contextfont");
    let font = rectangle_font();
    save(&font, &bundle).unwrap();
    assert!(bundle.join("info.json").is_file());
    assert!(bundle.join("glyphs.json").is_file());

    let loaded = load(&bundle).unwrap();
    assert_eq!(loaded, font);
    assert_eq!(loaded.source.as_deref(), Some(bundle.as_path()));

    // A loaded font can save itself back to where it came from.
    loaded.save().unwrap();
    assert_eq!(load(&bundle).unwrap(), font);
}

#[test]
fn test_missing_glyph_document_is_a_broken_reference() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("Test.contextfont");
    save(&rectangle_font(), &bundle).unwrap();
    std::fs::remove_file(bundle.join("glyphs.json")).unwrap();
    assert!(matches!(
        load(&bundle).unwrap_err(),
        ContextError::MalformedDocument { .. }
    ));
}

#[test]
fn test_vendor_data_survives_load_modify_save() {
    let mut font = rectangle_font();
    font.format_specific
        .insert("com.example.editor", json!({"zoom": 1.5, "panels": ["glyphs"]}));
    font.glyphs
        .get_mut("A")
        .unwrap()
        .format_specific
        .insert("com.example.lock", json!(true));

    let mut reloaded = deserialize(&serialize(&font).unwrap()).unwrap();
    // Modify something unrelated, then save again.
    reloaded.note = Some("touched".to_string());
    let again = deserialize(&serialize(&reloaded).unwrap()).unwrap();

    assert_eq!(
        again.format_specific.get("com.example.editor"),
        Some(&json!({"zoom": 1.5, "panels": ["glyphs"]}))
    );
    assert_eq!(
        again.glyphs.get("A").unwrap().format_specific.get("com.example.lock"),
        Some(&json!(true))
    );
}

#[test]
fn test_unknown_keys_are_preserved_not_rejected() {
    let font = rectangle_font();
    let mut documents = serialize(&font).unwrap();
    let patched = documents["info.json"].replacen(
        "\"upm\": 1000,",
        "\"upm\": 1000, \"com.vendor.experimental\": [1, 2],",
        1,
    );
    documents.insert("info.json".to_string(), patched);

    let loaded = deserialize(&documents).unwrap();
    assert_eq!(
        loaded.format_specific.get("com.vendor.experimental"),
        Some(&json!([1, 2]))
    );
    // And it comes back out under the reserved key.
    let saved = serialize(&loaded).unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&saved["info.json"]).unwrap();
    assert_eq!(reparsed["_"]["com.vendor.experimental"], json!([1, 2]));
}

#[test]
fn test_dangling_master_reference_loads_but_does_not_resolve() {
    let mut font = rectangle_font();
    font.glyphs.get_mut("A").unwrap().layers[0].master = Some("unknown".to_string());
    let loaded = deserialize(&serialize(&font).unwrap()).unwrap();
    let layer = &loaded.glyphs.get("A").unwrap().layers[0];
    assert_eq!(layer.master.as_deref(), Some("unknown"));
    assert!(matches!(
        loaded.layer_master(layer).unwrap_err(),
        ContextError::NotFound { key, .. } if key == "unknown"
    ));
}

#[test]
fn test_glyph_collection_is_one_record_per_line() {
    let mut font = rectangle_font();
    font.glyphs.append(Glyph::new("B")).unwrap();
    font.glyphs.append(Glyph::new("C")).unwrap();
    let documents = serialize(&font).unwrap();
    let glyph_doc = &documents["glyphs.json"];
    for name in ["\"A\"", "\"B\"", "\"C\""] {
        assert_eq!(
            glyph_doc.lines().filter(|l| l.contains(name)).count(),
            1,
            "glyph {} should start on its own line",
            name
        );
    }
}

#[test]
fn test_serialized_guide_uses_wire_alias() {
    let mut font = rectangle_font();
    let mut guide = contextfont::Guide::new(contextfont::Position::new(0.0, 500.0, 0.0));
    guide.name = Some("half".to_string());
    font.masters[0].guides.push(guide);
    let documents = serialize(&font).unwrap();
    let info: serde_json::Value = serde_json::from_str(&documents["info.json"]).unwrap();
    let guide = &info["masters"][0]["guides"][0];
    assert_eq!(guide["pos"], json!([0, 500, 0]));
    assert!(guide.get("position").is_none());

    let reloaded = deserialize(&documents).unwrap();
    assert_eq!(
        reloaded.masters[0].guides[0].position(),
        contextfont::Position::new(0.0, 500.0, 0.0)
    );
}

#[test]
fn test_empty_master_list_is_rejected_at_load() {
    let font = rectangle_font();
    let mut documents = serialize(&font).unwrap();
    let patched = documents["info.json"].lines().collect::<Vec<_>>().join("\n");
    // Surgically empty the master list.
    let start = patched.find("\"masters\": [").unwrap();
    let end = patched[start..].find(']').unwrap() + start;
    let patched = format!("{}\"masters\": [{}", &patched[..start], &patched[end..]);
    documents.insert("info.json".to_string(), patched);
    assert!(matches!(
        deserialize(&documents).unwrap_err(),
        ContextError::Validation { field: "masters", .. }
    ));
}

#[test]
fn test_loaded_graph_is_clean_and_edits_dirty_it() {
    let font = rectangle_font();
    let mut loaded = deserialize(&serialize(&font).unwrap()).unwrap();
    assert!(!loaded.is_dirty());
    loaded.set_ot_value("OS/2", "fsType", json!(0));
    assert!(loaded.is_dirty());
    loaded.mark_all_clean();
    assert!(!loaded.is_dirty());
}

#[test]
fn test_date_round_trips_at_second_precision() {
    let font = rectangle_font();
    let documents = serialize(&font).unwrap();
    let info: serde_json::Value = serde_json::from_str(&documents["info.json"]).unwrap();
    let date = info["date"].as_str().unwrap();
    assert_eq!(date.len(), 19, "expected YYYY-MM-DD HH:MM:SS, got {}", date);
    let reloaded = deserialize(&documents).unwrap();
    assert_eq!(reloaded.date, font.date);
}
