//! Counter decorator plugin
//!
//! Adds "Double" and "Reset" buttons next to the host counter. When the host
//! passes its own counter markup the view wraps it; otherwise it renders the
//! counter value itself. The counter
//! itself lives at `CounterState.Counter`; the plugin's own state records the
//! last operation and when it happened.

use chrono::Utc;
use plugboard_api::prelude::*;
use serde_json::{Map, Value, json};

pub const PLUGIN_ID: &str = "counter";
pub const NAMESPACE: &str = "COUNTER_EXT";

pub const DOUBLE: &str = "DoubleCounter";
pub const RESET: &str = "ResetCounter";

/// `(constant name, message kind)` pairs for the message table
pub const MESSAGES: &[(&str, &str)] = &[("DOUBLE", DOUBLE), ("RESET", RESET)];

const COUNTER_STATE_KEY: &str = "CounterState";
const COUNTER_KEY: &str = "Counter";

/// Read the host counter. A model without one counts as zero.
pub fn counter_value(model: &Model) -> Result<i64, HandlerError> {
    match model
        .get(COUNTER_STATE_KEY)
        .and_then(|state| state.get(COUNTER_KEY))
    {
        None => Ok(0),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| HandlerError::InvalidState(format!("Counter is not an integer: {value}"))),
    }
}

/// Return a copy of `model` with the host counter set to `value`
pub fn with_counter(model: &Model, value: i64) -> Model {
    let mut state = model
        .get(COUNTER_STATE_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);
    state.insert(COUNTER_KEY.to_string(), json!(value));
    model.with(COUNTER_STATE_KEY, Value::Object(state))
}

fn update(args: &UpdateArgs<'_>) -> HandlerResult {
    let now = Utc::now().to_rfc3339();

    match args.kind {
        DOUBLE => {
            let current = counter_value(args.model)?;
            let doubled = current
                .checked_mul(2)
                .ok_or_else(|| HandlerError::InvalidState(format!("Counter overflow doubling {current}")))?;
            let next = with_counter(args.model, doubled);
            Ok(Some(args.state.merge(
                &next,
                json!({ "lastOperation": "double", "lastDoubledAt": now }),
            )?))
        }
        RESET => {
            let next = with_counter(args.model, 0);
            Ok(Some(args.state.merge(
                &next,
                json!({ "lastOperation": "reset", "lastResetAt": now }),
            )?))
        }
        _ => Ok(None),
    }
}

fn view(args: &ViewArgs<'_>) -> Result<Markup, HandlerError> {
    let counter = match args.default {
        Some(default) => format!("<div class=\"default-counter\">{default}</div>"),
        None => format!("<span class=\"counter-value\">{}</span>", counter_value(args.model)?),
    };
    let state = args.state.get(args.model);

    let last = match state.get("lastOperation").and_then(Value::as_str) {
        Some(operation) => {
            let at = state
                .get("lastDoubledAt")
                .or_else(|| state.get("lastResetAt"))
                .and_then(Value::as_str)
                .unwrap_or("");
            format!("<p class=\"counter-last-operation\">Last operation: {operation} ({at})</p>")
        }
        None => String::new(),
    };

    Ok(Markup::new(format!(
        "<div class=\"counter-container\">\
         {counter}\
         <button class=\"counter-double-button\" data-msg=\"{DOUBLE}\">Double</button>\
         <button class=\"counter-reset-button\" data-msg=\"{RESET}\">Reset</button>\
         {last}</div>"
    )))
}

/// Counter decorator descriptor
pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::builder(PLUGIN_ID)
        .name("Counter Tab Decorator Plugin")
        .version("1.0.0")
        .update(update)
        .view(view)
        .init(|ctx| {
            ctx.log_debug("Counter decorator ready");
            Ok(())
        })
        .build()
}
