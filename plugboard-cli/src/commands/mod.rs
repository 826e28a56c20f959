pub mod messages;
pub mod plugins;
pub mod replay;
