//! Colour tables merged across packs.
//!
//! A colour table is a flat JSON object mapping colour names to values:
//!
//! ```json
//! { "background": "#101018", "accent": "#ff4080" }
//! ```
//!
//! Every pack may ship the same table. All copies are read from the lowest
//! to the highest priority pack and later keys overwrite earlier ones, so an
//! override pack only needs to list the colours it changes. A table that no
//! pack provides loads as empty.

use crate::error::ResourceResult;
use crate::resources::descriptor::ResourceDescriptor;
use crate::resources::resource::{LoadContext, PackResource, ResourceKind, TypedResource};
use log::debug;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::fs;

/// Path id of the colour table file.
pub const TABLE_FILE: &str = "table";

pub struct ColorsResource {
    relative: String,
    colors: FxHashMap<String, String>,
}

impl ColorsResource {
    /// Colour table read from `relative` in every active pack.
    pub fn new(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
            colors: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    pub fn colors(&self) -> &FxHashMap<String, String> {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl TypedResource for ColorsResource {
    const KIND: ResourceKind = ResourceKind::new("colors");
}

impl PackResource for ColorsResource {
    fn kind(&self) -> ResourceKind {
        Self::KIND
    }

    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new().with_path(TABLE_FILE, self.relative.clone())
    }

    fn load(&mut self, ctx: &LoadContext<'_>) -> ResourceResult<()> {
        let mut merged = FxHashMap::default();
        for path in ctx.paths().merge_order(TABLE_FILE) {
            let body = fs::read_to_string(path)
                .map_err(|e| ctx.fail(format!("{}: {}", path.display(), e)))?;
            let table: Map<String, Value> = serde_json::from_str(&body)
                .map_err(|e| ctx.fail(format!("{}: {}", path.display(), e)))?;
            for (name, value) in table {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                merged.insert(name, value);
            }
        }
        if merged.is_empty() {
            debug!(target: "resources", "Colour table '{}' is empty", self.relative);
        }
        self.colors = merged;
        Ok(())
    }

    fn unload(&mut self, _id: &str) {
        self.colors.clear();
    }
}
