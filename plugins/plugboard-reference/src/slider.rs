//! Slider tab plugin
//!
//! Claims the `slider` tab, renders a range input and persists the value in
//! `CustomState.slider` together with the time it was last changed.

use chrono::Utc;
use plugboard_api::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};

pub const PLUGIN_ID: &str = "slider";
pub const TAB: &str = "slider";
pub const NAMESPACE: &str = "SLIDER";

pub const UPDATE_VALUE: &str = "UpdateSliderValue";

/// `(constant name, message kind)` pairs for the message table
pub const MESSAGES: &[(&str, &str)] = &[("UPDATE_VALUE", UPDATE_VALUE)];

const MIN: i64 = 0;
const MAX: i64 = 100;

#[derive(Debug, Deserialize)]
struct SliderUpdate {
    value: i64,
}

fn update_value(payload: &Value, model: &Model, state: &StateScope) -> HandlerResult {
    let SliderUpdate { value } = serde_json::from_value(payload.clone())?;
    if !(MIN..=MAX).contains(&value) {
        return Err(HandlerError::InvalidPayload(format!(
            "slider value {value} outside {MIN}..={MAX}"
        )));
    }

    tracing::debug!(plugin = PLUGIN_ID, value, "Slider value updated");
    Ok(Some(state.merge(
        model,
        json!({ "value": value, "lastUpdated": Utc::now().to_rfc3339() }),
    )?))
}

/// Feedback bar color for a slider position
pub fn color_for(value: i64) -> &'static str {
    if value < 34 {
        "#3498db"
    } else if value < 67 {
        "#2ecc71"
    } else {
        "#e74c3c"
    }
}

fn view(args: &ViewArgs<'_>) -> Result<Markup, HandlerError> {
    let value = args
        .state
        .value(args.model, "value")
        .and_then(|v| v.as_i64())
        .unwrap_or(MIN);
    let color = color_for(value);

    Ok(Markup::new(format!(
        "<div class=\"slider-container\">\
         <h1>Slider</h1>\
         <input type=\"range\" class=\"slider\" min=\"{MIN}\" max=\"{MAX}\" value=\"{value}\" data-msg=\"{UPDATE_VALUE}\">\
         <div class=\"slider-value\"><span>Value: {value}</span></div>\
         <div class=\"slider-visual-feedback\" style=\"width: {value}%; background-color: {color}\"></div>\
         </div>"
    )))
}

/// Slider tab descriptor
pub fn descriptor() -> PluginDescriptor {
    PluginDescriptor::builder(PLUGIN_ID)
        .name("Slider Tab Plugin")
        .version("1.0.0")
        .tab(TAB)
        .on(UPDATE_VALUE, update_value)
        .view(view)
        .build()
}
