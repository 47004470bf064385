//! natives-codegen: embeds expanded resources into a generated C++ source.
//!
//! [`SourceAssembler::assemble()`] reads definition files and resources
//! through a [`SourceProvider`], expands each resource, renders it as a
//! byte array with [`render_blob()`], and fills an [`OutputTemplate`].
//! The resulting [`GeneratedDocument`] is written with
//! [`GeneratedDocument::write_if_changed()`].

pub mod assemble;
pub mod document;
pub mod error;
pub mod naming;
pub mod render;
pub mod source;
pub mod template;

pub use assemble::{
    normalize_data_resource, shim_source, AssemblerConfig, ResourceUnit, SourceAssembler,
};
pub use document::{initializer, DocumentBuilder, GeneratedDocument, WriteOutcome};
pub use error::CodegenError;
pub use naming::{DerivedNames, ModuleName, NamingRules};
pub use render::{encode, render_blob, render_encoded, to_c_array, Encoding, RenderedBlob};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use template::{OutputTemplate, DEFAULT_TEMPLATE};
