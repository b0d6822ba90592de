use crate::config::UserAgentConfig;
use crate::engine::{Plugin, WorkItemHook};
use crate::item::WorkItem;

/// Sets the `User-Agent` header on every item before it is fetched
#[derive(Debug, Clone)]
pub struct UserAgentPlugin {
    value: String,
}

impl UserAgentPlugin {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn from_config(config: &UserAgentConfig) -> Self {
        Self::new(config.header_value())
    }

    /// Binds the plugin to the pre-fetch stage
    pub fn into_plugin(self) -> Plugin {
        Plugin::pre_fetch(self)
    }
}

impl WorkItemHook for UserAgentPlugin {
    fn execute(&self, item: &mut WorkItem) {
        item.set_header("User-Agent", self.value.as_str());
    }
}
