//! Accumulating blob declarations and writing the finished document.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::CodegenError;
use crate::naming::ModuleName;
use crate::render::{encode, render_blob, render_encoded, Encoding};
use crate::template::OutputTemplate;

/// Registration statement for one key/value blob pair.
pub fn initializer(module: &ModuleName) -> String {
    let key = module.key_var();
    let value = module.value_var();
    format!(
        "CHECK(target->Set(env->context(),
                  v8::String::NewFromUtf8(env->isolate(),
                                          {key}.data(),
                                          v8::NewStringType::kNormal,
                                          arraysize(raw_{key})).ToLocalChecked(),
                  {value}.ToStringChecked(env->isolate())).FromJust());
"
    )
}

/// Collects declarations and registrations in emission order.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    definitions: String,
    initializers: String,
    modules: Vec<String>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the key and value blobs for `module` and its registration.
    /// Returns the encoding chosen for `body`.
    pub fn add_module(&mut self, module: &ModuleName, body: &str) -> Encoding {
        let blob = encode(body);
        tracing::debug!(
            module = %module.path,
            width = blob.encoding.width(),
            units = blob.len(),
            "embedding module"
        );
        self.definitions
            .push_str(&render_blob(&module.key_var(), &module.path));
        self.definitions
            .push_str(&render_encoded(&module.value_var(), &blob));
        self.initializers.push_str(&initializer(module));
        self.modules.push(module.path.clone());
        blob.encoding
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub fn finish(self, template: &OutputTemplate) -> GeneratedDocument {
        let text = template.render(&self.definitions, &self.initializers);
        GeneratedDocument {
            modules: self.modules,
            text,
        }
    }
}

/// Result of a write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// The rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    /// Registered module paths, in order, shims included.
    pub modules: Vec<String>,
    pub text: String,
}

impl GeneratedDocument {
    pub fn sha256_hex(&self) -> String {
        format!("{:x}", Sha256::digest(self.text.as_bytes()))
    }

    /// Write the document, leaving the file untouched when its content
    /// already matches.
    pub fn write_if_changed(&self, path: &Path) -> Result<WriteOutcome, CodegenError> {
        if let Ok(existing) = std::fs::read(path) {
            if existing == self.text.as_bytes() {
                tracing::info!(output = %path.display(), "output unchanged");
                return Ok(WriteOutcome::Unchanged);
            }
        }
        std::fs::write(path, &self.text).map_err(|e| CodegenError::io(path, &e))?;
        tracing::info!(
            output = %path.display(),
            modules = self.modules.len(),
            bytes = self.text.len(),
            "wrote output"
        );
        Ok(WriteOutcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamingRules;

    fn module(path: &str) -> ModuleName {
        NamingRules::default().derive_names(path).module
    }

    #[test]
    fn test_initializer_statement() {
        let init = initializer(&module("lib/fs.js"));
        assert!(init.starts_with("CHECK(target->Set(env->context(),\n"));
        assert!(init.contains("                                          fs_key.data(),\n"));
        assert!(init.contains("arraysize(raw_fs_key)).ToLocalChecked(),\n"));
        assert!(init.ends_with("fs_value.ToStringChecked(env->isolate())).FromJust());\n"));
    }

    #[test]
    fn test_builder_orders_modules() {
        let mut builder = DocumentBuilder::new();
        builder.add_module(&module("lib/a.js"), "a");
        builder.add_module(&module("lib/b.js"), "b");
        assert_eq!(builder.modules(), ["a", "b"]);

        let doc = builder.finish(&OutputTemplate::from_text("{definitions}|{initializers}").unwrap());
        let a = doc.text.find("raw_a_key").unwrap();
        let b = doc.text.find("raw_b_key").unwrap();
        assert!(a < b);
        let (defs, inits) = doc.text.split_once('|').unwrap();
        assert_eq!(defs.matches("static struct").count(), 4);
        assert_eq!(inits.matches("CHECK(").count(), 2);
    }

    #[test]
    fn test_add_module_reports_encoding() {
        let mut builder = DocumentBuilder::new();
        assert_eq!(builder.add_module(&module("lib/a.js"), "a"), Encoding::OneByte);
        assert_eq!(builder.add_module(&module("lib/b.js"), "ß"), Encoding::TwoByte);
        let doc = builder.finish(&OutputTemplate::from_text("{definitions}").unwrap());
        assert!(doc.text.contains("static const uint16_t raw_b_value[] = { 223 };"));
        assert!(doc.text.contains("static const uint8_t raw_b_key[]"));
    }

    #[test]
    fn test_sha256_is_stable() {
        let doc = GeneratedDocument {
            modules: vec![],
            text: "abc".to_string(),
        };
        assert_eq!(
            doc.sha256_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_write_if_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.cc");
        let doc = GeneratedDocument {
            modules: vec![],
            text: "int x;\n".to_string(),
        };
        assert_eq!(doc.write_if_changed(&path).unwrap(), WriteOutcome::Written);
        assert_eq!(doc.write_if_changed(&path).unwrap(), WriteOutcome::Unchanged);

        let changed = GeneratedDocument {
            modules: vec![],
            text: "int y;\n".to_string(),
        };
        assert_eq!(changed.write_if_changed(&path).unwrap(), WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int y;\n");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let doc = GeneratedDocument {
            modules: vec![],
            text: String::new(),
        };
        let err = doc
            .write_if_changed(&dir.path().join("no/such/dir/out.cc"))
            .unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }));
    }
}
