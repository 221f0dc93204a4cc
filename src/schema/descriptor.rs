use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use super::{Annotation, Introspect, IntrospectionError, Parameter, Signature};

/// Declarative description of a callable.
///
/// A descriptor whose `params` is `None` has no retrievable signature, which
/// is how opaque callables are represented.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    #[serde(default, alias = "description")]
    pub doc: Option<String>,
    #[serde(default)]
    pub params: Option<Vec<ParamDescriptor>>,
    #[serde(skip)]
    opaque_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(
        default,
        rename = "type",
        alias = "annotation",
        deserialize_with = "parse_annotation"
    )]
    pub annotation: Annotation,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
}

// Distinguishes an explicit `null` default from a missing field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn parse_annotation<'de, D>(deserializer: D) -> Result<Annotation, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|name| Annotation::parse(&name))
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Some(Vec::new()),
            opaque_reason: None,
        }
    }

    /// A callable whose parameter list cannot be retrieved.
    pub fn opaque(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: None,
            opaque_reason: Some(reason.into()),
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(self, name: impl Into<String>, annotation: Annotation) -> Self {
        self.push(ParamDescriptor {
            name: name.into(),
            annotation,
            default: None,
        })
    }

    pub fn param_with_default(
        self,
        name: impl Into<String>,
        annotation: Annotation,
        default: Value,
    ) -> Self {
        self.push(ParamDescriptor {
            name: name.into(),
            annotation,
            default: Some(default),
        })
    }

    fn push(mut self, param: ParamDescriptor) -> Self {
        self.params.get_or_insert_with(Vec::new).push(param);
        self
    }
}

impl Introspect for FunctionDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn signature(&self) -> Result<Signature, IntrospectionError> {
        let params = self.params.as_ref().ok_or_else(|| {
            IntrospectionError::new(
                self.opaque_reason
                    .clone()
                    .unwrap_or_else(|| "no parameter list declared".to_string()),
            )
        })?;
        let mut seen = HashSet::with_capacity(params.len());
        for param in params {
            if !seen.insert(param.name.as_str()) {
                return Err(IntrospectionError::new(format!(
                    "duplicate parameter '{}'",
                    param.name
                )));
            }
        }

        Ok(Signature {
            params: params
                .iter()
                .map(|param| Parameter {
                    name: param.name.clone(),
                    annotation: param.annotation.clone(),
                    default: param.default.clone(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ToolSet {
    #[serde(default)]
    pub functions: Vec<FunctionDescriptor>,
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Failed to read tool file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse tool file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl ToolSet {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Loads a tool file. `.json` files are parsed as JSON, everything else as TOML.
pub fn load_tool_set(path: &Path) -> Result<ToolSet, DescriptorError> {
    let raw = fs::read_to_string(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        ToolSet::from_json_str(&raw).map_err(|err| err.to_string())
    } else {
        ToolSet::from_toml_str(&raw).map_err(|err| err.to_string())
    };

    parsed.map_err(|message| DescriptorError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
