//! Ready-made plugins
//!
//! Each plugin implements the hook trait of the stage it is meant for and has an
//! `into_plugin` helper binding it to that stage.

mod annotate;
mod proxy;
mod user_agent;

pub use annotate::RecordAnnotator;
pub use proxy::ProxyRotator;
pub use user_agent::UserAgentPlugin;
