//! Tool schema generation.
//!
//! Turns a described callable (anything implementing [`Introspect`]) into the
//! `{"type": "function", "function": {...}}` document that chat-completions
//! tool-calling endpoints accept.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

pub mod descriptor;

pub use descriptor::{DescriptorError, FunctionDescriptor, ParamDescriptor, ToolSet, load_tool_set};

/// Declared type of a parameter, as far as schema generation cares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Annotation {
    Text,
    Integer,
    Float,
    Boolean,
    Sequence,
    Mapping,
    NoneType,
    /// A named type outside the recognized set.
    Other(String),
    /// No annotation at all.
    #[default]
    Unspecified,
}

impl Annotation {
    /// Parses a type name leniently. Unknown names become [`Annotation::Other`].
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::Unspecified,
            "str" | "string" | "text" => Self::Text,
            "int" | "integer" | "i32" | "i64" | "u32" | "u64" => Self::Integer,
            "float" | "number" | "f32" | "f64" => Self::Float,
            "bool" | "boolean" => Self::Boolean,
            "list" | "array" | "sequence" | "vec" => Self::Sequence,
            "dict" | "object" | "map" | "mapping" => Self::Mapping,
            "null" | "none" | "unit" => Self::NoneType,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// JSON schema type tag. Unrecognized and missing annotations map to `string`.
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Text => ParamType::String,
            Self::Integer => ParamType::Integer,
            Self::Float => ParamType::Number,
            Self::Boolean => ParamType::Boolean,
            Self::Sequence => ParamType::Array,
            Self::Mapping => ParamType::Object,
            Self::NoneType => ParamType::Null,
            Self::Other(_) | Self::Unspecified => ParamType::String,
        }
    }
}

impl From<String> for Annotation {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// JSON schema primitive types emitted for tool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

/// One formal parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub annotation: Annotation,
    /// Declared default. `Some(Value::Null)` is still a default.
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Ordered parameter list of a callable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Parameter>,
}

/// The callable exposes no retrievable parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct IntrospectionError {
    pub reason: String,
}

impl IntrospectionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Read-only metadata of something that can be offered to a model as a tool.
pub trait Introspect {
    fn name(&self) -> &str;

    fn doc(&self) -> Option<&str> {
        None
    }

    fn signature(&self) -> Result<Signature, IntrospectionError>;
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to get signature for function {name}: {source}")]
    SignatureUnavailable {
        name: String,
        #[source]
        source: IntrospectionError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ParamType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersSchema {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub properties: IndexMap<String, PropertySchema>,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: ParametersSchema,
}

/// Tool declaration in chat-completions function-calling format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub function: FunctionSchema,
}

impl ToolSchema {
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Builds the tool schema for one callable.
///
/// Fails only when the callable's parameter list cannot be retrieved.
pub fn generate_schema<C: Introspect + ?Sized>(callable: &C) -> Result<ToolSchema, SchemaError> {
    let name = callable.name().to_string();
    let signature = callable
        .signature()
        .map_err(|source| SchemaError::SignatureUnavailable {
            name: name.clone(),
            source,
        })?;
    let description = callable.doc().unwrap_or_default().trim().to_string();

    let mut properties = IndexMap::with_capacity(signature.params.len());
    for param in &signature.params {
        let previous = properties.insert(
            param.name.clone(),
            PropertySchema {
                kind: param.annotation.param_type(),
            },
        );
        if previous.is_some() {
            return Err(SchemaError::SignatureUnavailable {
                name,
                source: IntrospectionError::new(format!("duplicate parameter '{}'", param.name)),
            });
        }
    }

    let required = signature
        .params
        .iter()
        .filter(|param| !param.has_default())
        .map(|param| param.name.clone())
        .collect::<Vec<_>>();

    trace!(function = %name, params = properties.len(), required = required.len(), "generated tool schema");

    Ok(ToolSchema {
        kind: ToolKind::Function,
        function: FunctionSchema {
            name,
            description,
            parameters: ParametersSchema {
                kind: ObjectKind::Object,
                properties,
                required,
            },
        },
    })
}

/// Maps [`generate_schema`] over a slice, stopping at the first failure.
pub fn generate_schemas<C: Introspect>(callables: &[C]) -> Result<Vec<ToolSchema>, SchemaError> {
    callables.iter().map(generate_schema).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn greet() -> FunctionDescriptor {
        FunctionDescriptor::new("greet")
            .doc("Say hello.")
            .param("name", Annotation::Unspecified)
            .param_with_default("times", Annotation::Unspecified, json!(1))
    }

    #[test]
    fn greet_matches_wire_shape() {
        let schema = generate_schema(&greet()).unwrap();
        assert_eq!(
            serde_json::to_string(&schema).unwrap(),
            r#"{"type":"function","function":{"name":"greet","description":"Say hello.","parameters":{"type":"object","properties":{"name":{"type":"string"},"times":{"type":"string"}},"required":["name"]}}}"#
        );
    }

    #[test]
    fn zero_params_gives_empty_properties_and_required() {
        let schema = generate_schema(&FunctionDescriptor::new("ping")).unwrap();
        assert!(schema.function.parameters.properties.is_empty());
        assert!(schema.function.parameters.required.is_empty());
        assert_eq!(
            schema.to_json().unwrap()["function"]["parameters"],
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn all_defaulted_params_are_optional() {
        let callable = FunctionDescriptor::new("configure")
            .param_with_default("verbose", Annotation::Boolean, json!(false))
            .param_with_default("label", Annotation::Text, json!(""))
            .param_with_default("limit", Annotation::Integer, json!(0))
            .param_with_default("extra", Annotation::NoneType, Value::Null);
        let schema = generate_schema(&callable).unwrap();
        assert!(schema.function.parameters.required.is_empty());
        assert_eq!(schema.function.parameters.properties.len(), 4);
    }

    #[test]
    fn recognized_annotations_map_exactly() {
        let cases = [
            (Annotation::Text, "string"),
            (Annotation::Integer, "integer"),
            (Annotation::Float, "number"),
            (Annotation::Boolean, "boolean"),
            (Annotation::Sequence, "array"),
            (Annotation::Mapping, "object"),
            (Annotation::NoneType, "null"),
        ];
        let mut callable = FunctionDescriptor::new("typed");
        for (index, (annotation, _)) in cases.iter().enumerate() {
            callable = callable.param(format!("p{index}"), annotation.clone());
        }

        let body = generate_schema(&callable).unwrap().to_json().unwrap();
        for (index, (_, tag)) in cases.iter().enumerate() {
            assert_eq!(
                body["function"]["parameters"]["properties"][format!("p{index}")]["type"],
                *tag
            );
        }
    }

    #[test]
    fn unannotated_and_unknown_types_fall_back_to_string() {
        let callable = FunctionDescriptor::new("loose")
            .param("a", Annotation::Unspecified)
            .param("b", Annotation::parse("Path"));
        let schema = generate_schema(&callable).unwrap();
        let properties = &schema.function.parameters.properties;
        assert_eq!(properties["a"].kind, ParamType::String);
        assert_eq!(properties["b"].kind, ParamType::String);
    }

    #[test]
    fn required_follows_declaration_order() {
        let callable = FunctionDescriptor::new("order")
            .param("zeta", Annotation::Text)
            .param_with_default("mid", Annotation::Text, json!("x"))
            .param("alpha", Annotation::Integer)
            .param("beta", Annotation::Float);
        let schema = generate_schema(&callable).unwrap();
        assert_eq!(schema.function.parameters.required, ["zeta", "alpha", "beta"]);
        let keys = schema
            .function
            .parameters
            .properties
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>();
        assert_eq!(keys, ["zeta", "mid", "alpha", "beta"]);
    }

    #[test]
    fn description_is_trimmed_or_empty() {
        let documented = FunctionDescriptor::new("f").doc("\n   Does things.  \n");
        assert_eq!(
            generate_schema(&documented).unwrap().function.description,
            "Does things."
        );
        let undocumented = FunctionDescriptor::new("g");
        assert_eq!(generate_schema(&undocumented).unwrap().function.description, "");
    }

    #[test]
    fn generation_is_idempotent() {
        let callable = greet();
        assert_eq!(
            generate_schema(&callable).unwrap(),
            generate_schema(&callable).unwrap()
        );
    }

    #[test]
    fn opaque_callable_reports_signature_unavailable() {
        let callable = FunctionDescriptor::opaque("builtin_len", "no signature found for builtin");
        let err = generate_schema(&callable).unwrap_err();
        let SchemaError::SignatureUnavailable { name, .. } = &err;
        assert_eq!(name, "builtin_len");
        let message = err.to_string();
        assert!(message.contains("builtin_len"));
        assert!(message.contains("no signature found for builtin"));
    }

    #[test]
    fn custom_introspect_impl_is_supported() {
        struct Native;

        impl Introspect for Native {
            fn name(&self) -> &str {
                "native"
            }

            fn signature(&self) -> Result<Signature, IntrospectionError> {
                Err(IntrospectionError::new("opaque native callable"))
            }
        }

        assert!(matches!(
            generate_schema(&Native),
            Err(SchemaError::SignatureUnavailable { .. })
        ));
    }

    #[test]
    fn duplicate_names_from_custom_impl_are_rejected() {
        struct Twice;

        impl Introspect for Twice {
            fn name(&self) -> &str {
                "twice"
            }

            fn signature(&self) -> Result<Signature, IntrospectionError> {
                Ok(Signature {
                    params: vec![
                        Parameter::new("x", Annotation::Integer),
                        Parameter::new("x", Annotation::Text),
                    ],
                })
            }
        }

        let err = generate_schema(&Twice).unwrap_err();
        assert!(err.to_string().contains("duplicate parameter 'x'"));
    }

    #[test]
    fn generate_schemas_stops_at_first_failure() {
        let callables = vec![greet(), FunctionDescriptor::opaque("bad", "nope"), greet()];
        assert!(generate_schemas(&callables).is_err());
        let ok = generate_schemas(&[greet(), FunctionDescriptor::new("ping")]).unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn annotation_parse_is_lenient() {
        assert_eq!(Annotation::parse("str"), Annotation::Text);
        assert_eq!(Annotation::parse(" Integer "), Annotation::Integer);
        assert_eq!(Annotation::parse("dict"), Annotation::Mapping);
        assert_eq!(Annotation::parse("None"), Annotation::NoneType);
        assert_eq!(Annotation::parse(""), Annotation::Unspecified);
        assert_eq!(Annotation::parse("Widget"), Annotation::Other("Widget".to_string()));
    }
}
