// End-to-end scenarios: discovery, filtering, export and import through the panel

mod common;

use common::fixtures::{PanelFixture, BASIC_CATALOG};
use modconfig::services::transfer::ImportReport;
use modconfig::model::SettingType;
use modconfig::services::convert::{ConvertError, Converter, ConverterRegistry};
use modconfig::view::settings::{FilterToggle, PanelError};
use serde_json::Value;
use serde_json::json;

#[test]
fn test_module_without_settings_is_not_a_group() {
    let fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();

    let groups = fixture.panel.groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].info.id, "a.b");
    assert_eq!(fixture.listed(), vec!["Volume"]);
    assert_eq!(
        fixture.panel.discovered().modules_without_settings,
        vec!["ModB"]
    );
}

#[test]
fn test_search_keeps_or_empties_the_list() {
    let mut fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();

    fixture.panel.set_search("volume");
    assert_eq!(fixture.panel.groups().len(), 1);
    assert_eq!(fixture.listed(), vec!["Volume"]);

    fixture.panel.set_search("missing");
    assert!(fixture.panel.groups().is_empty());
}

#[test]
fn test_only_changed_drops_entries_at_default() {
    let catalog = json!({
        "modules": [
            { "id": "a.b", "name": "ModA", "version": "1.0", "settings": [
                { "category": "General", "name": "Volume", "type": "integer", "value": 5, "default": 10 },
                { "category": "General", "name": "Pitch", "type": "float", "value": 1.5, "default": 1.5 },
                { "category": "General", "name": "Label", "type": "text", "value": "x" }
            ] }
        ]
    });
    let mut fixture = PanelFixture::from_value(catalog).unwrap().opened();
    assert_eq!(fixture.listed(), vec!["Label", "Pitch", "Volume"]);

    fixture.panel.set_toggle(FilterToggle::OnlyChanged, true);
    assert_eq!(fixture.listed(), vec!["Volume"]);
}

#[test]
fn test_export_then_import_restores_drifted_value() {
    let mut fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();

    let exported = fixture.panel.export().unwrap();
    assert_eq!(exported, 1);
    let contents = fixture.read_export().unwrap();
    insta::assert_snapshot!(contents.trim_end(), @"a.b|General|Volume|5");

    fixture.set_value("a.b", "General", "Volume", json!(7));
    let report = fixture.panel.import().unwrap();
    assert_eq!(
        report,
        ImportReport {
            imported: 1,
            malformed: 0,
            skipped: 0
        }
    );
    assert_eq!(fixture.value("a.b", "General", "Volume"), Some(json!(5)));
}

#[test]
fn test_malformed_line_is_skipped() {
    let mut fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();
    fixture
        .write_export("a.b|General|Volume\n\na.b|General|Volume|3\n")
        .unwrap();

    let report = fixture.panel.import().unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.malformed, 1);
    assert_eq!(fixture.value("a.b", "General", "Volume"), Some(json!(3)));
}

#[test]
fn test_import_missing_file_is_reported() {
    let mut fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();
    let result = fixture.panel.import();
    assert!(matches!(result, Err(PanelError::Transfer(_))));
    assert_eq!(fixture.value("a.b", "General", "Volume"), Some(json!(5)));
}

#[test]
fn test_import_rediscovers_and_keeps_collapse_state() {
    let mut fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();
    assert!(fixture.panel.groups()[0].collapsed());
    assert!(fixture.panel.toggle_collapse(0));

    fixture.panel.export().unwrap();
    fixture.set_value("a.b", "General", "Volume", json!(9));
    fixture.panel.import().unwrap();

    assert!(!fixture.panel.groups()[0].collapsed());
    // Freshly discovered entries read the restored value
    let entry = fixture.panel.groups()[0].settings().next().unwrap().clone();
    assert_eq!(entry.get().unwrap(), json!(5));
}

#[test]
fn test_delimiters_in_names_survive_export() {
    let catalog = json!({
        "modules": [
            { "id": "p.q", "name": "Pipes", "version": "1", "settings": [
                { "category": "A|B", "name": "Path\\Name", "type": "text", "value": "x|y\nz" }
            ] }
        ]
    });
    let mut fixture = PanelFixture::from_value(catalog).unwrap().opened();
    fixture.panel.export().unwrap();
    let contents = fixture.read_export().unwrap();
    insta::assert_snapshot!(contents.trim_end(), @r"p.q|A\|B|Path\\Name|x\|y\nz");

    fixture.set_value("p.q", "A|B", "Path\\Name", json!("changed"));
    let report = fixture.panel.import().unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(fixture.value("p.q", "A|B", "Path\\Name"), Some(json!("x|y\nz")));
}

#[test]
fn test_toggles_persist_across_panels() {
    let mut fixture = PanelFixture::new(BASIC_CATALOG).unwrap().opened();
    fixture.panel.set_toggle(FilterToggle::Advanced, true);
    fixture.panel.close();

    let config = modconfig::config_io::load_config(&fixture.dirs);
    assert!(config.show_advanced);
}

#[test]
fn test_unchanged_round_trip_keeps_stored_spelling() {
    let catalog = json!({
        "modules": [
            { "id": "a.b", "name": "ModA", "version": "1.0", "settings": [
                { "category": "General", "name": "Scale", "type": "float", "value": 5, "default": 5 },
                { "category": "General", "name": "Tint", "type": "color", "value": "#ff8800", "default": "#ff8800" },
                { "category": "General", "name": "Key", "type": "keyboard_shortcut", "value": "ctrl+k", "default": "ctrl+k" }
            ] }
        ]
    });
    let mut fixture = PanelFixture::from_value(catalog).unwrap().opened();
    fixture.panel.export().unwrap();

    let report = fixture.panel.import().unwrap();
    assert_eq!(report.imported, 3);
    assert_eq!(fixture.value("a.b", "General", "Scale"), Some(json!(5)));
    assert_eq!(fixture.value("a.b", "General", "Tint"), Some(json!("#ff8800")));
    assert_eq!(fixture.value("a.b", "General", "Key"), Some(json!("ctrl+k")));

    fixture.panel.set_toggle(FilterToggle::OnlyChanged, true);
    assert!(fixture.listed().is_empty());
}

#[test]
fn test_whole_float_at_default_is_not_changed() {
    let catalog = json!({
        "modules": [
            { "id": "a.b", "name": "ModA", "version": "1.0", "settings": [
                { "category": "General", "name": "Scale", "type": "float", "value": 5, "default": 5.0 }
            ] }
        ]
    });
    let mut fixture = PanelFixture::from_value(catalog).unwrap().opened();
    fixture.panel.set_toggle(FilterToggle::OnlyChanged, true);
    assert!(fixture.listed().is_empty());
}

fn parse_vector(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    text.split(',')
        .map(|part| part.trim().parse::<i64>().map(Value::from))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
        .map_err(|_| ConvertError::Unsupported {
            text: text.to_string(),
            setting_type: "vector".into(),
        })
}

fn vector_text(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

#[test]
fn test_custom_type_imports_only_with_registered_converter() {
    let catalog = json!({
        "modules": [
            { "id": "a.b", "name": "ModA", "version": "1.0", "settings": [
                { "category": "Space", "name": "Origin", "type": { "custom": "vector" }, "value": [1, 2, 3] }
            ] }
        ]
    });

    let mut plain = PanelFixture::from_value(catalog.clone()).unwrap().opened();
    plain.write_export("a.b|Space|Origin|4,5,6\n").unwrap();
    let report = plain.panel.import().unwrap();
    assert_eq!((report.imported, report.skipped), (0, 1));
    assert_eq!(plain.value("a.b", "Space", "Origin"), Some(json!([1, 2, 3])));

    let mut converters = ConverterRegistry::with_builtin();
    converters.register(
        SettingType::Custom("vector".into()).kind(),
        Converter {
            to_text: vector_text,
            from_text: parse_vector,
        },
    );
    let mut fixture = PanelFixture::from_value(catalog)
        .unwrap()
        .with_converters(converters)
        .opened();
    fixture.panel.export().unwrap();
    insta::assert_snapshot!(fixture.read_export().unwrap().trim_end(), @"a.b|Space|Origin|1,2,3");

    fixture.write_export("a.b|Space|Origin|4,5,6\n").unwrap();
    let report = fixture.panel.import().unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(fixture.value("a.b", "Space", "Origin"), Some(json!([4, 5, 6])));
}
