//! Auto-registering tool/resource/prompt registry (spec.md §4.8): three
//! tables keyed by name/URI, built once at startup and treated as immutable
//! afterwards so concurrent request handlers can read it lock-free.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::{AppError, PromptDescriptor, ResourceDescriptor, ToolDescriptor};
use crate::schema::SchemaNode;
use crate::AppState;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> SchemaNode;
    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError>;
}

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn uri(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn mime_type(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn read(&self, state: &AppState) -> Result<Value, AppError>;
}

/// A resource whose URI contains a path parameter (`movies://posters/{movie_id}`)
/// - matched separately from the exact-URI table since it isn't listable by
/// a single static descriptor per instance.
#[async_trait]
pub trait ResourceTemplateHandler: Send + Sync {
    fn uri_prefix(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn mime_type(&self) -> &'static str;
    async fn read(&self, state: &AppState, param: &str) -> Result<Value, AppError>;
}

#[async_trait]
pub trait PromptHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn arguments(&self) -> Vec<(&'static str, &'static str, bool)>;
    async fn render(&self, arguments: Value) -> Result<String, AppError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate tool registration: {0}")]
    DuplicateTool(String),
    #[error("duplicate resource registration: {0}")]
    DuplicateResource(String),
    #[error("duplicate prompt registration: {0}")]
    DuplicatePrompt(String),
}

#[derive(Default)]
pub struct Registry {
    tool_order: Vec<String>,
    tools: HashMap<String, Arc<dyn ToolHandler>>,
    resource_order: Vec<String>,
    resources: HashMap<String, Arc<dyn ResourceHandler>>,
    resource_templates: Vec<Arc<dyn ResourceTemplateHandler>>,
    prompt_order: Vec<String>,
    prompts: HashMap<String, Arc<dyn PromptHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tool(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = handler.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.tool_order.push(name.clone());
        self.tools.insert(name, handler);
        Ok(())
    }

    pub fn register_resource(&mut self, handler: Arc<dyn ResourceHandler>) -> Result<(), RegistryError> {
        let uri = handler.uri().to_string();
        if self.resources.contains_key(&uri) {
            return Err(RegistryError::DuplicateResource(uri));
        }
        self.resource_order.push(uri.clone());
        self.resources.insert(uri, handler);
        Ok(())
    }

    pub fn register_resource_template(&mut self, handler: Arc<dyn ResourceTemplateHandler>) {
        self.resource_templates.push(handler);
    }

    pub fn register_prompt(&mut self, handler: Arc<dyn PromptHandler>) -> Result<(), RegistryError> {
        let name = handler.name().to_string();
        if self.prompts.contains_key(&name) {
            return Err(RegistryError::DuplicatePrompt(name));
        }
        self.prompt_order.push(name.clone());
        self.prompts.insert(name, handler);
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    pub fn get_resource(&self, uri: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.resources.get(uri).cloned()
    }

    /// Finds a template handler matching `uri`, returning the handler and the
    /// trailing path parameter (e.g. `"42"` for `movies://posters/42`).
    pub fn match_resource_template(&self, uri: &str) -> Option<(Arc<dyn ResourceTemplateHandler>, String)> {
        self.resource_templates.iter().find_map(|handler| {
            uri.strip_prefix(handler.uri_prefix())
                .map(|param| (Arc::clone(handler), param.to_string()))
        })
    }

    pub fn get_prompt(&self, name: &str) -> Option<Arc<dyn PromptHandler>> {
        self.prompts.get(name).cloned()
    }

    /// Returns tool schemas in registration order (spec.md §4.8).
    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.tool_order
            .iter()
            .map(|name| {
                let handler = &self.tools[name];
                ToolDescriptor {
                    name: handler.name().to_string(),
                    description: handler.description().to_string(),
                    input_schema: handler.input_schema().to_json_schema(),
                }
            })
            .collect()
    }

    pub fn resource_descriptors(&self) -> Vec<ResourceDescriptor> {
        self.resource_order
            .iter()
            .map(|uri| {
                let handler = &self.resources[uri];
                ResourceDescriptor {
                    uri: handler.uri().to_string(),
                    name: handler.name().to_string(),
                    mime_type: handler.mime_type().to_string(),
                    description: Some(handler.description().to_string()),
                }
            })
            .collect()
    }

    pub fn prompt_descriptors(&self) -> Vec<PromptDescriptor> {
        self.prompt_order
            .iter()
            .map(|name| {
                let handler = &self.prompts[name];
                PromptDescriptor {
                    name: handler.name().to_string(),
                    description: handler.description().to_string(),
                    arguments: handler
                        .arguments()
                        .into_iter()
                        .map(|(name, description, required)| crate::protocol::PromptArgument {
                            name: name.to_string(),
                            description: description.to_string(),
                            required,
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyTool(&'static str);

    #[async_trait]
    impl ToolHandler for DummyTool {
        fn name(&self) -> &'static str {
            self.0
        }
        fn description(&self) -> &'static str {
            "dummy"
        }
        fn input_schema(&self) -> SchemaNode {
            SchemaNode::object().build()
        }
        async fn call(&self, _state: &AppState, _arguments: Value) -> Result<Value, AppError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn duplicate_tool_registration_is_rejected() {
        let mut registry = Registry::new();
        registry.register_tool(Arc::new(DummyTool("a"))).unwrap();
        let err = registry.register_tool(Arc::new(DummyTool("a"))).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(_)));
    }

    #[test]
    fn tool_descriptors_preserve_registration_order() {
        let mut registry = Registry::new();
        registry.register_tool(Arc::new(DummyTool("z"))).unwrap();
        registry.register_tool(Arc::new(DummyTool("a"))).unwrap();
        let names: Vec<_> = registry.tool_descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["z".to_string(), "a".to_string()]);
    }
}
