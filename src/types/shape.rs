//! Response shape descriptors.

use std::path::PathBuf;

use serde_json::Value;

/// How the raw response is turned into a result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Deserialize the body into the target type.
    #[default]
    Structured,
    /// Deserialize what can be deserialized and keep the raw bytes.
    StructuredWithBinary,
    /// Write the raw body to the given path.
    ToFile(PathBuf),
}

/// Opt-in deserialization adjustments applied before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    single_value_as_array: Vec<String>,
}

impl DeserializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a single value where the target expects a list, at the body root.
    pub fn single_value_as_array(self) -> Self {
        self.single_value_as_array_at("")
    }

    /// Accept a single value where the target expects a list, at a JSON pointer
    /// (for example `/data/renditions`).
    pub fn single_value_as_array_at(mut self, pointer: impl Into<String>) -> Self {
        let pointer = pointer.into();
        if !self.single_value_as_array.contains(&pointer) {
            self.single_value_as_array.push(pointer);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.single_value_as_array.is_empty()
    }

    /// Rewrite `value` in place. Arrays, nulls and missing locations are left as they are.
    pub fn apply(&self, value: &mut Value) {
        for pointer in &self.single_value_as_array {
            if let Some(target) = value.pointer_mut(pointer)
                && !target.is_array()
                && !target.is_null()
            {
                let single = target.take();
                *target = Value::Array(vec![single]);
            }
        }
    }
}

/// Describes how one response is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseShape {
    pub mode: OutputMode,
    pub options: DeserializeOptions,
}

impl ResponseShape {
    pub fn structured() -> Self {
        Self::default()
    }

    pub fn with_binary() -> Self {
        Self {
            mode: OutputMode::StructuredWithBinary,
            options: DeserializeOptions::default(),
        }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: OutputMode::ToFile(path.into()),
            options: DeserializeOptions::default(),
        }
    }

    pub fn options(mut self, options: DeserializeOptions) -> Self {
        self.options = options;
        self
    }
}
