// JSON output for scripting

use serde_json::{json, Value as JsonValue};

use super::RoleReport;
use crate::hosts::Resolution;
use crate::registry::TaskRegistry;

/// JSON output manager, one document per command
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        JsonOutput
    }

    pub fn print_resolution(&self, resolution: &Resolution) {
        self.emit_json(&self.resolution_json(resolution));
    }

    pub fn resolution_json(&self, resolution: &Resolution) -> JsonValue {
        serde_json::to_value(resolution).unwrap_or(JsonValue::Null)
    }

    pub fn print_task_list(&self, registry: &TaskRegistry) {
        self.emit_json(&self.task_list_json(registry));
    }

    pub fn task_list_json(&self, registry: &TaskRegistry) -> JsonValue {
        let tasks: Vec<JsonValue> = registry
            .task_names()
            .into_iter()
            .map(|name| {
                let task = registry.resolve(&name);
                json!({
                    "name": name,
                    "task": task,
                })
            })
            .collect();

        let defaults: serde_json::Map<String, JsonValue> = registry
            .defaults()
            .into_iter()
            .map(|(group, target)| (group, JsonValue::String(target)))
            .collect();

        json!({
            "tasks": tasks,
            "defaults": defaults,
        })
    }

    pub fn print_roles(&self, roles: &[RoleReport]) {
        self.emit_json(&json!({ "roles": roles }));
    }

    fn emit_json(&self, value: &JsonValue) {
        match serde_json::to_string(value) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to serialize output: {}", e),
        }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        JsonOutput::new()
    }
}
