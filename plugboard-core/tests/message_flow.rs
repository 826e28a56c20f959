//! Integration tests for message routing and view rendering
//!
//! Each test registers small plugins and replays messages through
//! PluginRegistry::update, checking the resulting model.

use std::sync::Arc;

use chrono::DateTime;
use plugboard_api::{HandlerError, Markup, Message, Model, PluginDescriptor, get_state};
use plugboard_core::{HostConfig, PluginDefinition, PluginRegistry};
use serde_json::{Value, json};

fn registry() -> PluginRegistry {
    PluginRegistry::new(HostConfig::default())
        .with_registrar(|_definition: Arc<PluginDefinition>| true)
}

fn model(value: Value) -> Model {
    Model::from_value(value).unwrap()
}

fn double_counter() -> PluginDescriptor {
    PluginDescriptor::builder("counter")
        .update(|args| {
            if args.kind != "Double" {
                return Ok(None);
            }
            let counter = args
                .model
                .get("Counter")
                .and_then(Value::as_i64)
                .ok_or_else(|| HandlerError::InvalidState("Counter is not a number".into()))?;
            Ok(Some(args.model.with("Counter", counter * 2)))
        })
        .build()
}

fn slider() -> PluginDescriptor {
    PluginDescriptor::builder("slider")
        .tab("slider")
        .on("UpdateSliderValue", |payload, model, state| {
            let next = state.merge(
                model,
                json!({
                    "value": payload["value"],
                    "lastUpdated": chrono::Utc::now().to_rfc3339(),
                }),
            )?;
            Ok(Some(next))
        })
        .view(|args| {
            let value = args.state.value(args.model, "value").unwrap_or(json!(50));
            Ok(Markup::new(format!("<input type=\"range\" value=\"{value}\">")))
        })
        .build()
}

// ==================== Reference Scenarios ====================

#[test]
fn counter_double_leaves_custom_state_untouched() {
    let mut registry = registry();
    registry.register(double_counter()).unwrap();

    let before = model(json!({"Counter": 3, "CustomState": {"slider": {"value": 5}}}));
    let after = registry.update(&Message::bare("Double"), &before);

    assert_eq!(after.get("Counter"), Some(&json!(6)));
    assert_eq!(after.get("CustomState"), before.get("CustomState"));
    assert_eq!(before.get("Counter"), Some(&json!(3)));
}

#[test]
fn slider_update_writes_own_namespace() {
    let mut registry = registry();
    registry.register(slider()).unwrap();

    let after = registry.update(
        &Message::new("UpdateSliderValue", json!({"value": 42})),
        &model(json!({"Counter": 1})),
    );

    let state = get_state("slider", &after);
    assert_eq!(state["value"], json!(42));
    let stamp = state["lastUpdated"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    assert_eq!(after.get("Counter"), Some(&json!(1)));

    let markup = registry.render("slider", &after).unwrap();
    assert!(markup.as_str().contains("value=\"42\""));
}

#[test]
fn raw_messages_in_every_legacy_shape() {
    let mut registry = registry();
    registry.register(double_counter()).unwrap();
    let start = model(json!({"Counter": 1}));

    let mut current = start;
    for raw in [
        json!("Double"),
        json!(["Double", {}]),
        json!({"type": "Double"}),
        json!({"msgType": "Double", "payload": {}}),
        json!({"messageType": "Double"}),
    ] {
        current = registry.update_raw(&raw, &current).unwrap();
    }

    assert_eq!(current.get("Counter"), Some(&json!(32)));
}

// ==================== Failure Isolation ====================

#[test]
fn failing_update_leaves_model_unchanged() {
    let mut registry = registry();
    registry.register(double_counter()).unwrap();

    let before = model(json!({"Counter": "three"}));
    let outcome = registry.route(&Message::bare("Double"), &before);

    assert_eq!(outcome.model, before);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.handled_by.is_empty());
}

#[test]
fn panicking_update_leaves_model_unchanged() {
    let mut registry = registry();
    registry
        .register(
            PluginDescriptor::builder("panicky")
                .on("Boom", |_payload, _model, _state| panic!("handler exploded"))
                .build(),
        )
        .unwrap();
    registry.register(double_counter()).unwrap();

    let before = model(json!({"Counter": 2}));
    let after = registry.update(&Message::bare("Boom"), &before);
    assert_eq!(after, before);

    let after = registry.update(&Message::bare("Double"), &before);
    assert_eq!(after.get("Counter"), Some(&json!(4)));
}

#[test]
fn panicking_view_renders_nothing() {
    let mut registry = registry();
    registry
        .register(
            PluginDescriptor::builder("broken")
                .view(|_args| panic!("template missing"))
                .build(),
        )
        .unwrap();

    assert!(registry.render("broken", &Model::new()).is_none());
}

// ==================== State Isolation ====================

#[test]
fn plugins_only_touch_their_own_state() {
    let mut registry = registry();
    for id in ["notes", "todos"] {
        registry
            .register(
                PluginDescriptor::builder(id)
                    .on("Save", |payload, model, state| {
                        Ok(Some(state.merge(model, json!({"text": payload["text"]}))?))
                    })
                    .build(),
            )
            .unwrap();
    }

    let before = model(json!({"CustomState": {"todos": {"done": 3}}}));
    let after = registry.update(&Message::new("Save", json!({"text": "hi"})), &before);

    assert_eq!(get_state("notes", &after), json!({"text": "hi"}).as_object().unwrap().clone());
    assert_eq!(
        get_state("todos", &after),
        json!({"done": 3, "text": "hi"}).as_object().unwrap().clone()
    );
    assert_eq!(
        before.custom_state().unwrap()["todos"],
        json!({"done": 3})
    );
}

#[test]
fn handler_cannot_rewrite_another_plugins_state() {
    let mut registry = registry();
    registry
        .register(
            PluginDescriptor::builder("evil")
                .on("Tick", |_payload, model, _state| {
                    Ok(Some(
                        model
                            .with("CustomState", json!({"victim": {"hijacked": true}}))
                            .with("Ticks", 1),
                    ))
                })
                .build(),
        )
        .unwrap();

    let before = model(json!({"CustomState": {"victim": {"secret": 1}}}));
    let after = registry.update(&Message::bare("Tick"), &before);

    assert_eq!(
        get_state("victim", &after),
        json!({"secret": 1}).as_object().unwrap().clone()
    );
    assert!(get_state("evil", &after).is_empty());
    assert_eq!(after.get("Ticks"), Some(&json!(1)));
}

#[test]
fn views_share_the_host_bridge() {
    let mut registry = registry();
    registry
        .register(
            PluginDescriptor::builder("counter-view")
                .view(|args| {
                    let sent = args.dispatch.dispatch("Increment", json!({}));
                    Ok(Markup::new(format!("sent={sent}")))
                })
                .build(),
        )
        .unwrap();

    assert_eq!(
        registry.render("counter-view", &Model::new()).unwrap().as_str(),
        "sent=false"
    );

    registry.install_dispatch(|_wire: Value| {});
    assert_eq!(
        registry.render("counter-view", &Model::new()).unwrap().as_str(),
        "sent=true"
    );
}
