use natives_core::ExpandError;

/// Error type for code generation operations.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// Reading an input or writing the generated document failed.
    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    /// A definition file or resource failed to expand.
    #[error("{file}: {source}")]
    Expand { file: String, source: ExpandError },

    /// The output template is malformed.
    #[error("invalid template: {0}")]
    Template(String),
}

impl CodegenError {
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        CodegenError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn expand(file: impl AsRef<std::path::Path>, source: ExpandError) -> Self {
        CodegenError::Expand {
            file: file.as_ref().display().to_string(),
            source,
        }
    }

    /// JSON form used by `--output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            CodegenError::Io { path, message } => serde_json::json!({
                "kind": "io",
                "path": path,
                "message": message,
            }),
            CodegenError::Expand { file, source } => {
                let mut v = source.to_json_value();
                if let Some(obj) = v.as_object_mut() {
                    obj.insert("resource".to_string(), serde_json::json!(file));
                    obj.insert("message".to_string(), serde_json::json!(source.to_string()));
                }
                v
            }
            CodegenError::Template(msg) => serde_json::json!({
                "kind": "template",
                "message": msg,
            }),
        }
    }
}
