//! A tagged-variant representation of the JSON Schema subset tool arguments
//! are described by (spec.md §4.6). The validator switches on the variant
//! instead of walking a dynamic `serde_json::Value` schema tree, and the
//! same tree renders itself to standard JSON Schema for `tools/list`.

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Date,
    DateTime,
    Uri,
}

impl StringFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Uri => "uri",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub enum_values: Option<Vec<String>>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub format: Option<StringFormat>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SchemaNode {
    String(StringSchema),
    Integer(NumberSchema),
    Number(NumberSchema),
    Boolean,
    Array(ArraySchema),
    Object(ObjectSchema),
}

impl SchemaNode {
    pub fn string() -> StringSchema {
        StringSchema::default()
    }

    pub fn integer() -> NumberSchema {
        NumberSchema::default()
    }

    pub fn number() -> NumberSchema {
        NumberSchema::default()
    }

    pub fn boolean() -> SchemaNode {
        SchemaNode::Boolean
    }

    pub fn array(items: SchemaNode) -> ArraySchema {
        ArraySchema {
            items: Box::new(items),
            min_items: None,
            max_items: None,
            description: None,
        }
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::default()
    }

    /// Renders this node as standard JSON Schema, for `tools/list` /
    /// `resources/list` consumption by MCP clients.
    pub fn to_json_schema(&self) -> Value {
        match self {
            SchemaNode::String(s) => {
                let mut v = json!({"type": "string"});
                let obj = v.as_object_mut().unwrap();
                if let Some(values) = &s.enum_values {
                    obj.insert("enum".to_string(), json!(values));
                }
                if let Some(n) = s.min_length {
                    obj.insert("minLength".to_string(), json!(n));
                }
                if let Some(n) = s.max_length {
                    obj.insert("maxLength".to_string(), json!(n));
                }
                if let Some(p) = &s.pattern {
                    obj.insert("pattern".to_string(), json!(p));
                }
                if let Some(f) = s.format {
                    obj.insert("format".to_string(), json!(f.as_str()));
                }
                if let Some(d) = &s.description {
                    obj.insert("description".to_string(), json!(d));
                }
                v
            }
            SchemaNode::Integer(n) => number_schema_json("integer", n),
            SchemaNode::Number(n) => number_schema_json("number", n),
            SchemaNode::Boolean => json!({"type": "boolean"}),
            SchemaNode::Array(a) => {
                let mut v = json!({"type": "array", "items": a.items.to_json_schema()});
                let obj = v.as_object_mut().unwrap();
                if let Some(n) = a.min_items {
                    obj.insert("minItems".to_string(), json!(n));
                }
                if let Some(n) = a.max_items {
                    obj.insert("maxItems".to_string(), json!(n));
                }
                if let Some(d) = &a.description {
                    obj.insert("description".to_string(), json!(d));
                }
                v
            }
            SchemaNode::Object(o) => {
                let properties: serde_json::Map<String, Value> = o
                    .properties
                    .iter()
                    .map(|(name, node)| (name.clone(), node.to_json_schema()))
                    .collect();
                let mut v = json!({
                    "type": "object",
                    "properties": properties,
                    "additionalProperties": false,
                });
                let obj = v.as_object_mut().unwrap();
                if !o.required.is_empty() {
                    obj.insert("required".to_string(), json!(o.required));
                }
                if let Some(d) = &o.description {
                    obj.insert("description".to_string(), json!(d));
                }
                v
            }
        }
    }
}

fn number_schema_json(ty: &str, n: &NumberSchema) -> Value {
    let mut v = json!({"type": ty});
    let obj = v.as_object_mut().unwrap();
    if let Some(m) = n.minimum {
        obj.insert("minimum".to_string(), json!(m));
    }
    if let Some(m) = n.maximum {
        obj.insert("maximum".to_string(), json!(m));
    }
    if let Some(d) = &n.description {
        obj.insert("description".to_string(), json!(d));
    }
    v
}

// Builder-style chain methods, used when constructing each tool's schema.

impl StringSchema {
    pub fn build(self) -> SchemaNode {
        SchemaNode::String(self)
    }

    pub fn enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, p: impl Into<String>) -> Self {
        self.pattern = Some(p.into());
        self
    }

    pub fn format(mut self, f: StringFormat) -> Self {
        self.format = Some(f);
        self
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }
}

impl NumberSchema {
    pub fn build_integer(self) -> SchemaNode {
        SchemaNode::Integer(self)
    }

    pub fn build_number(self) -> SchemaNode {
        SchemaNode::Number(self)
    }

    pub fn minimum(mut self, m: f64) -> Self {
        self.minimum = Some(m);
        self
    }

    pub fn maximum(mut self, m: f64) -> Self {
        self.maximum = Some(m);
        self
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }
}

impl ArraySchema {
    pub fn build(self) -> SchemaNode {
        SchemaNode::Array(self)
    }

    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }
}

impl ObjectSchema {
    pub fn build(self) -> SchemaNode {
        SchemaNode::Object(self)
    }

    pub fn property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.properties.push((name.into(), node));
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required = names.iter().map(|s| s.to_string()).collect();
        self
    }
}
