//! User annotation sidecar.
//!
//! Annotations live in a JSON document colocated with the module file at
//! `<wasm-path>.wasmspy`: user-chosen function names and comments,
//! per-offset comments for the disassembly and decompile views, and
//! bookmarked offsets. The analysis core only reads display names from
//! this; persistence is the caller's business, triggered explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const ANNOTATIONS_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub version: u32,
    /// Keyed by decimal function index.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub functions: HashMap<String, FunctionAnnotation>,
    /// Disassembly-view comments, keyed by `0x<hex-offset>`.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub comments: HashMap<String, String>,
    /// Decompile-view comments, keyed by `0x<hex-offset>`.
    #[serde(default, rename = "decompileComments", skip_serializing_if = "HashMap::is_empty")]
    pub decompile_comments: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bookmarks: Vec<u32>,
}

impl Default for Annotations {
    fn default() -> Annotations {
        Annotations {
            version: ANNOTATIONS_VERSION,
            functions: HashMap::new(),
            comments: HashMap::new(),
            decompile_comments: HashMap::new(),
            bookmarks: Vec::new(),
        }
    }
}

/// Sidecar path for a module: the module path with `.wasmspy` appended.
pub fn sidecar_path(wasm_path: &Path) -> PathBuf {
    let mut os = wasm_path.as_os_str().to_os_string();
    os.push(".wasmspy");
    PathBuf::from(os)
}

/// Load the sidecar for a module. A missing or unreadable sidecar yields
/// fresh annotations; the user's module must open either way.
pub fn load(wasm_path: &Path) -> Annotations {
    let Ok(data) = std::fs::read(sidecar_path(wasm_path)) else {
        return Annotations::default();
    };
    serde_json::from_slice(&data).unwrap_or_default()
}

/// Persist the sidecar next to the module.
pub fn save(wasm_path: &Path, annotations: &Annotations) -> anyhow::Result<()> {
    let path = sidecar_path(wasm_path);
    let data = serde_json::to_string_pretty(annotations)?;
    std::fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

impl Annotations {
    pub fn function_name(&self, index: u32) -> Option<&str> {
        self.functions
            .get(&index.to_string())
            .and_then(|f| f.name.as_deref())
            .filter(|n| !n.is_empty())
    }

    pub fn function_comment(&self, index: u32) -> Option<&str> {
        self.functions
            .get(&index.to_string())
            .and_then(|f| f.comment.as_deref())
            .filter(|c| !c.is_empty())
    }

    pub fn set_function_name(&mut self, index: u32, name: impl Into<String>) {
        self.functions.entry(index.to_string()).or_default().name = Some(name.into());
    }

    pub fn set_function_comment(&mut self, index: u32, comment: impl Into<String>) {
        self.functions.entry(index.to_string()).or_default().comment = Some(comment.into());
    }

    pub fn offset_comment(&self, offset: u64) -> Option<&str> {
        self.comments.get(&offset_key(offset)).map(String::as_str)
    }

    pub fn decompile_comment(&self, offset: u64) -> Option<&str> {
        self.decompile_comments
            .get(&offset_key(offset))
            .map(String::as_str)
    }

    /// Set or clear (empty string) a per-offset comment.
    pub fn set_offset_comment(&mut self, offset: u64, comment: &str, decompile_view: bool) {
        let target = if decompile_view {
            &mut self.decompile_comments
        } else {
            &mut self.comments
        };
        if comment.is_empty() {
            target.remove(&offset_key(offset));
        } else {
            target.insert(offset_key(offset), comment.to_string());
        }
    }
}

fn offset_key(offset: u64) -> String {
    format!("0x{offset:x}")
}
