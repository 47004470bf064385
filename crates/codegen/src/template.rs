//! Output file templates.
//!
//! A template is C++ text with two placeholders, `{definitions}` and
//! `{initializers}`. Literal braces are written `{{` and `}}`.

use crate::error::CodegenError;

/// Template used when none is supplied.
pub const DEFAULT_TEMPLATE: &str = r#"
#include "node.h"
#include "node_javascript.h"
#include "v8.h"
#include "env.h"
#include "env-inl.h"

namespace node {{

namespace {{

{definitions}

}}  // anonymous namespace

v8::Local<v8::String> NodePerContextSource(v8::Isolate* isolate) {{
  return internal_per_context_value.ToStringChecked(isolate);
}}

v8::Local<v8::String> LoadersBootstrapperSource(Environment* env) {{
  return internal_bootstrap_loaders_value.ToStringChecked(env->isolate());
}}

v8::Local<v8::String> NodeBootstrapperSource(Environment* env) {{
  return internal_bootstrap_node_value.ToStringChecked(env->isolate());
}}

void DefineJavaScript(Environment* env, v8::Local<v8::Object> target) {{
  {initializers}
}}

}}  // namespace node
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Definitions,
    Initializers,
}

/// A parsed output template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    segments: Vec<Segment>,
}

impl Default for OutputTemplate {
    fn default() -> Self {
        OutputTemplate::from_text(DEFAULT_TEMPLATE)
            .unwrap_or_else(|e| panic!("built-in template is invalid: {}", e))
    }
}

impl OutputTemplate {
    /// Parse template text, rejecting unknown placeholders and stray braces.
    pub fn from_text(text: &str) -> Result<Self, CodegenError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().is_some_and(|&(_, n)| n == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, n)| n == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &text[pos + 1..];
                    let close = rest.find('}').ok_or_else(|| {
                        CodegenError::Template(format!("unclosed '{{' at byte {}", pos))
                    })?;
                    let name = &rest[..close];
                    let segment = match name {
                        "definitions" => Segment::Definitions,
                        "initializers" => Segment::Initializers,
                        other => {
                            return Err(CodegenError::Template(format!(
                                "unknown placeholder '{{{}}}' at byte {}",
                                other, pos
                            )))
                        }
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    // Skip the name and its closing brace.
                    for _ in 0..name.chars().count() + 1 {
                        chars.next();
                    }
                }
                '}' => {
                    return Err(CodegenError::Template(format!(
                        "single '}}' at byte {} (write '}}}}' for a literal brace)",
                        pos
                    )))
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(OutputTemplate { segments })
    }

    /// Substitute the placeholders.
    pub fn render(&self, definitions: &str, initializers: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Definitions => out.push_str(definitions),
                Segment::Initializers => out.push_str(initializers),
            }
        }
        out
    }
}
