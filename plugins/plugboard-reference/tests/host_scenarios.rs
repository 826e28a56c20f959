//! End-to-end tests: reference plugins registered with a PluginRegistry

use std::sync::{Arc, Mutex};

use plugboard_api::{Markup, Message, Model, get_state};
use plugboard_core::{HostConfig, MigrationSet, PluginDefinition, PluginRegistry};
use plugboard_reference::{counter, descriptors, register_messages, slider};
use serde_json::{Value, json};

fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new(HostConfig::default())
        .with_registrar(|_definition: Arc<PluginDefinition>| true);
    for descriptor in descriptors() {
        registry.register(descriptor).unwrap();
    }
    register_messages(registry.messages_mut());
    registry
}

#[test]
fn slider_tab_is_listed_and_rendered() {
    let registry = registry();

    let tabs: Vec<&str> = registry.tabs().iter().map(|t| t.tab.as_str()).collect();
    assert_eq!(tabs, vec![slider::TAB]);

    let model = registry.update(
        &Message::new(slider::UPDATE_VALUE, json!({"value": 42})),
        &Model::new(),
    );
    assert_eq!(get_state(slider::PLUGIN_ID, &model)["value"], json!(42));

    let markup = registry.render(slider::TAB, &model).unwrap();
    assert!(markup.as_str().contains("value=\"42\""));
}

#[test]
fn legacy_flat_counter_is_migrated_then_doubled() {
    let registry = registry();
    let legacy = Model::from_value(json!({"Counter": 3})).unwrap();

    let model = MigrationSet::reference().migrate(&legacy).unwrap();
    let model = registry.update(&Message::bare(counter::DOUBLE), &model);

    assert_eq!(model.get("CounterState"), Some(&json!({"Counter": 6})));
    assert_eq!(
        get_state(counter::PLUGIN_ID, &model)["lastOperation"],
        json!("double")
    );
    assert!(get_state(slider::PLUGIN_ID, &model).is_empty());
}

#[test]
fn invalid_slider_payload_keeps_model() {
    let registry = registry();
    let before = Model::from_value(json!({"CustomState": {"slider": {"value": 10}}})).unwrap();

    let outcome = registry.route(
        &Message::new(slider::UPDATE_VALUE, json!({"value": "high"})),
        &before,
    );

    assert_eq!(outcome.model, before);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].plugin_id, slider::PLUGIN_ID);
}

#[test]
fn counter_view_dispatches_through_host() {
    let registry = registry();
    let sent: Arc<Mutex<Vec<Value>>> = Arc::default();
    let sink = sent.clone();
    registry.install_dispatch(move |wire: Value| sink.lock().unwrap().push(wire));

    assert!(registry.render(counter::PLUGIN_ID, &Model::new()).is_some());
    assert!(registry.bridge().dispatch(counter::DOUBLE, json!({"currentValue": 0})));
    assert_eq!(
        *sent.lock().unwrap(),
        vec![json!(["DoubleCounter", {"currentValue": 0}])]
    );
}

#[test]
fn counter_decorates_host_counter_markup() {
    let registry = registry();
    let model = Model::from_value(json!({"CounterState": {"Counter": 2}})).unwrap();
    let host_counter = Markup::new("<h2>Count: 2</h2>");

    let markup = registry.render_with_default(counter::PLUGIN_ID, &model, &host_counter);

    assert!(markup.as_str().contains("<div class=\"default-counter\"><h2>Count: 2</h2></div>"));
    assert!(markup.as_str().contains("counter-double-button"));
}

#[test]
fn message_table_has_plugin_namespaces() {
    let registry = registry();
    let namespaces: Vec<&str> = registry.messages().namespaces().collect();
    assert_eq!(namespaces, vec!["COUNTER_EXT", "SLIDER"]);
    assert_eq!(registry.messages().core("NAVIGATE_TO"), Some("NavigateTo"));
}
