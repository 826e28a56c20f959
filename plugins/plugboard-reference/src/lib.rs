//! plugboard-reference - Reference plugins
//!
//! Two small plugins that exercise the authoring API end to end:
//!
//! - [`counter`]: decorates the host counter with `DoubleCounter` and
//!   `ResetCounter` messages and remembers the last operation in its state
//! - [`slider`]: claims the `slider` tab and persists the slider position

pub mod counter;
pub mod slider;

use plugboard_api::{MessageTable, PluginDescriptor};

/// Descriptors of every reference plugin, in registration order
pub fn descriptors() -> Vec<PluginDescriptor> {
    vec![counter::descriptor(), slider::descriptor()]
}

/// Add the reference plugins' message constants to a table
pub fn register_messages(table: &mut MessageTable) {
    table.register_messages(counter::NAMESPACE, counter::MESSAGES.iter().copied());
    table.register_messages(slider::NAMESPACE, slider::MESSAGES.iter().copied());
}
