//! Turning an ordered list of inputs into the generated document.
//!
//! Definition files are recognized by suffix and merged into one table
//! pair. Every other input is a resource: it is expanded, optionally
//! normalized, named, and registered in input order.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use natives_core::{
    build_tables, expand_resource, parse_definitions, ConstantTable, MacroTable, DEFAULT_MAX_DEPTH,
};
use regex::Regex;

use crate::document::{DocumentBuilder, GeneratedDocument};
use crate::error::CodegenError;
use crate::naming::{ModuleName, NamingRules};
use crate::source::SourceProvider;
use crate::template::OutputTemplate;

static DATA_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#[^\n]*\n?").unwrap_or_else(|e| panic!("invalid comment pattern: {}", e))
});

/// Everything that varies between runs besides the inputs.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub definition_suffix: String,
    pub data_suffix: String,
    pub naming: NamingRules,
    pub max_depth: usize,
    pub template: OutputTemplate,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            definition_suffix: "macros.py".to_string(),
            data_suffix: ".gypi".to_string(),
            naming: NamingRules::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            template: OutputTemplate::default(),
        }
    }
}

/// One resource after expansion and naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUnit {
    pub path: PathBuf,
    /// Text as read, before expansion.
    pub raw: String,
    pub module: ModuleName,
    /// Text as embedded.
    pub body: String,
    /// Set for vendored packages that keep a deprecated alias.
    pub shim: Option<ModuleName>,
}

impl ResourceUnit {
    pub fn is_deprecated_alias(&self) -> bool {
        self.shim.is_some()
    }
}

pub struct SourceAssembler {
    config: AssemblerConfig,
}

impl SourceAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        SourceAssembler { config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Whether `path` names a definition file rather than a resource.
    pub fn is_definition_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy().ends_with(&self.config.definition_suffix))
            .unwrap_or(false)
    }

    /// Parse every definition file into a single table pair. Later
    /// definitions of a name replace earlier ones.
    pub fn load_tables(
        &self,
        paths: &[&Path],
        provider: &dyn SourceProvider,
    ) -> Result<(ConstantTable, MacroTable), CodegenError> {
        let mut definitions = Vec::new();
        for path in paths {
            let text = provider
                .read_source(path)
                .map_err(|e| CodegenError::io(path, &e))?;
            let file = path.display().to_string();
            let parsed =
                parse_definitions(&text, &file).map_err(|e| CodegenError::expand(path, e))?;
            tracing::debug!(file = %file, definitions = parsed.len(), "read definition file");
            definitions.extend(parsed);
        }
        Ok(build_tables(definitions))
    }

    /// Expand, normalize and name one resource.
    pub fn prepare_resource(
        &self,
        path: &Path,
        text: &str,
        constants: &ConstantTable,
        macros: &MacroTable,
    ) -> Result<ResourceUnit, CodegenError> {
        let expanded = expand_resource(text, constants, macros, self.config.max_depth)
            .map_err(|e| CodegenError::expand(path, e))?;

        let display = path.to_string_lossy();
        let body = if display.ends_with(&self.config.data_suffix) {
            normalize_data_resource(&expanded)
        } else {
            expanded
        };

        let names = self.config.naming.derive_names(&display);
        Ok(ResourceUnit {
            path: path.to_path_buf(),
            raw: text.to_string(),
            module: names.module,
            body,
            shim: names.shim,
        })
    }

    /// Build the document for `inputs`. Nothing is written here; callers
    /// decide where the result goes.
    pub fn assemble(
        &self,
        inputs: &[PathBuf],
        provider: &dyn SourceProvider,
    ) -> Result<GeneratedDocument, CodegenError> {
        let (definition_files, resources): (Vec<&Path>, Vec<&Path>) = inputs
            .iter()
            .map(PathBuf::as_path)
            .partition(|p| self.is_definition_file(p));

        let (constants, macros) = self.load_tables(&definition_files, provider)?;
        tracing::debug!(
            constants = constants.len(),
            macros = macros.len(),
            resources = resources.len(),
            "tables ready"
        );

        let mut builder = DocumentBuilder::new();
        for path in resources {
            let text = provider
                .read_source(path)
                .map_err(|e| CodegenError::io(path, &e))?;
            let unit = self.prepare_resource(path, &text, &constants, &macros)?;

            builder.add_module(&unit.module, &unit.body);

            if let Some(shim) = &unit.shim {
                tracing::debug!(module = %shim.path, target = %unit.module.path, "adding deprecation shim");
                builder.add_module(shim, &shim_source(&shim.path));
            }
        }

        Ok(builder.finish(&self.config.template))
    }
}

/// Strip `#` comments through end of line and switch to double quotes, so
/// the body parses as JSON downstream.
pub fn normalize_data_resource(text: &str) -> String {
    DATA_COMMENT.replace_all(text, "").replace('\'', "\"")
}

/// Body of the module registered at a deprecated dependency path.
pub fn shim_source(module: &str) -> String {
    format!(
        "'use strict';
process.emitWarning(
  'Requiring Node.js-bundled \\'{module}\\' module is deprecated. Please ' +
  'install the necessary module locally.', 'DeprecationWarning', 'DEP0084');
module.exports = require('internal/deps/{module}');
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryProvider;

    fn assembler() -> SourceAssembler {
        SourceAssembler::new(AssemblerConfig {
            template: OutputTemplate::from_text("{definitions}\n--\n{initializers}").unwrap(),
            ..AssemblerConfig::default()
        })
    }

    #[test]
    fn test_definition_file_detection() {
        let a = assembler();
        assert!(a.is_definition_file(Path::new("lib/macros.py")));
        assert!(a.is_definition_file(Path::new("tools/extra_macros.py")));
        assert!(!a.is_definition_file(Path::new("macros.py/x.js")));
        assert!(!a.is_definition_file(Path::new("lib/fs.js")));
    }

    #[test]
    fn test_normalize_data_resource() {
        let text = "# generated\n{ 'a': 'b', # trailing\n  'c': 1 }\n# last";
        assert_eq!(
            normalize_data_resource(text),
            "{ \"a\": \"b\",   \"c\": 1 }\n"
        );
    }

    #[test]
    fn test_shim_source() {
        let src = shim_source("v8/tools/foo");
        assert!(src.starts_with("'use strict';\n"));
        assert!(src.contains("'Requiring Node.js-bundled \\'v8/tools/foo\\' module is deprecated."));
        assert!(src.ends_with("module.exports = require('internal/deps/v8/tools/foo');\n"));
    }

    #[test]
    fn test_prepare_resource_expands_and_names() {
        let a = assembler();
        let provider = InMemoryProvider::default().with_file("macros.py", "const N = 3;");
        let (c, m) = a.load_tables(&[Path::new("macros.py")], &provider).unwrap();
        let unit = a
            .prepare_resource(Path::new("lib/x.js"), "let n = N;", &c, &m)
            .unwrap();
        assert_eq!(unit.module.path, "x");
        assert_eq!(unit.raw, "let n = N;");
        assert_eq!(unit.body, "let n = 3;");
        assert!(!unit.is_deprecated_alias());
    }

    #[test]
    fn test_prepare_resource_flags_deprecated_alias() {
        let a = assembler();
        let (c, m) = (ConstantTable::new(), MacroTable::new());
        let unit = a
            .prepare_resource(Path::new("deps/node-inspect/lib/_inspect.js"), "x", &c, &m)
            .unwrap();
        assert!(unit.is_deprecated_alias());
        assert_eq!(unit.path, PathBuf::from("deps/node-inspect/lib/_inspect.js"));
        assert_eq!(unit.shim.unwrap().path, "node-inspect/lib/_inspect");
    }

    #[test]
    fn test_definitions_merge_across_files() {
        let a = assembler();
        let provider = InMemoryProvider::default()
            .with_file("a/macros.py", "const A = 1;\nconst B = 1;")
            .with_file("b/macros.py", "const B = 2;");
        let (c, _) = a
            .load_tables(&[Path::new("a/macros.py"), Path::new("b/macros.py")], &provider)
            .unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("B"), Some("2"));
    }

    #[test]
    fn test_assemble_emits_shim_after_module() {
        let provider = InMemoryProvider::default().with_file("deps/v8/tools/foo.js", "x");
        let doc = assembler()
            .assemble(&[PathBuf::from("deps/v8/tools/foo.js")], &provider)
            .unwrap();
        assert_eq!(doc.modules, ["internal/deps/v8/tools/foo", "v8/tools/foo"]);
        assert!(doc.text.contains("} internal_deps_v8_tools_foo_value;"));
        assert!(doc.text.contains("} v8_tools_foo_value;"));
    }

    #[test]
    fn test_missing_resource_is_io_error() {
        let provider = InMemoryProvider::default();
        let err = assembler()
            .assemble(&[PathBuf::from("lib/gone.js")], &provider)
            .unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }));
    }

    #[test]
    fn test_expansion_error_names_resource() {
        let provider = InMemoryProvider::default()
            .with_file("macros.py", "macro ADD(a, b) = a + b;")
            .with_file("lib/bad.js", "ADD(1)");
        let err = assembler()
            .assemble(
                &[PathBuf::from("macros.py"), PathBuf::from("lib/bad.js")],
                &provider,
            )
            .unwrap_err();
        match err {
            CodegenError::Expand { file, .. } => assert_eq!(file, "lib/bad.js"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
