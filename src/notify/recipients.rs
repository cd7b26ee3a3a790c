use std::collections::HashMap;

pub const DEFAULT_RECIPIENT: &str = "anonymous";

/// Static application → people lookup, case-insensitive on the application.
#[derive(Debug, Clone, Default)]
pub struct Recipients {
    by_application: HashMap<String, String>,
}

impl Recipients {
    pub fn new(map: &HashMap<String, String>) -> Self {
        Self {
            by_application: map
                .iter()
                .map(|(app, who)| (app.to_lowercase(), who.clone()))
                .collect(),
        }
    }

    pub fn lookup(&self, application: &str) -> &str {
        self.by_application
            .get(&application.to_lowercase())
            .map(String::as_str)
            .unwrap_or(DEFAULT_RECIPIENT)
    }
}
