//! Module paths and C++ symbol names derived from resource file paths.

/// Path rewriting rules for resource names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    /// Leading segment marking vendored dependencies.
    pub deps_segment: String,
    /// Prefix added in front of vendored dependency paths.
    pub internal_prefix: String,
    /// Vendored packages that also get a deprecation shim at their old path.
    pub deprecated_packages: Vec<String>,
}

impl Default for NamingRules {
    fn default() -> Self {
        NamingRules {
            deps_segment: "deps".to_string(),
            internal_prefix: "internal".to_string(),
            deprecated_packages: vec!["node-inspect".to_string(), "v8".to_string()],
        }
    }
}

/// A module path and the symbol stem used for its blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleName {
    pub path: String,
    pub stem: String,
}

impl ModuleName {
    fn from_segments(segments: &[&str]) -> Self {
        let mut segments: Vec<&str> = segments.to_vec();
        if let Some(last) = segments.last_mut() {
            *last = last.split('.').next().unwrap_or_default();
        }
        let path = segments.join("/");
        let stem = path.replace(['/', '-'], "_");
        ModuleName { path, stem }
    }

    pub fn key_var(&self) -> String {
        format!("{}_key", self.stem)
    }

    pub fn value_var(&self) -> String {
        format!("{}_value", self.stem)
    }
}

/// Names for one resource: the module itself and an optional shim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub module: ModuleName,
    pub shim: Option<ModuleName>,
}

impl NamingRules {
    /// Derive the module name for a resource path as given on the command
    /// line. Either separator style is accepted.
    pub fn derive_names(&self, path: &str) -> DerivedNames {
        let segments: Vec<&str> = path.split(['/', '\\']).collect();
        if segments.len() == 1 {
            return DerivedNames {
                module: ModuleName::from_segments(&segments),
                shim: None,
            };
        }

        if segments[0] == self.deps_segment {
            let shim = self
                .deprecated_packages
                .iter()
                .any(|p| p == segments[1])
                .then(|| ModuleName::from_segments(&segments[1..]));
            let mut prefixed = Vec::with_capacity(segments.len() + 1);
            prefixed.push(self.internal_prefix.as_str());
            prefixed.extend_from_slice(&segments);
            DerivedNames {
                module: ModuleName::from_segments(&prefixed),
                shim,
            }
        } else {
            DerivedNames {
                module: ModuleName::from_segments(&segments[1..]),
                shim: None,
            }
        }
    }
}
