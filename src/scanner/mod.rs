//! Source-level collaborators shared by every rule: file discovery,
//! line pattern search, and manifest parsing.

pub mod files;
pub mod manifest;
pub mod matcher;

pub use files::FileScanner;
pub use manifest::{parse_manifest, PackageReference};
pub use matcher::{extract_snippet, read_source, LineMatch, PatternSet};
