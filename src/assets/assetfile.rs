//! Single-file assets: fonts, audio clips, shaders, icons.
//!
//! The highest priority pack providing the file wins. This crate never
//! decodes the file; the owner of the resource opens [`AssetFileResource::path`]
//! (or [`AssetFileResource::open`]) with its own loader.

use crate::error::ResourceResult;
use crate::resources::descriptor::ResourceDescriptor;
use crate::resources::resource::{LoadContext, PackResource, ResourceKind, TypedResource};
use log::debug;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Path id of the asset file.
pub const ASSET_FILE: &str = "file";

pub struct AssetFileResource {
    relative: String,
    required: bool,
    path: Option<PathBuf>,
}

impl AssetFileResource {
    /// Asset that must exist in at least one pack.
    pub fn new(relative: impl Into<String>) -> Self {
        Self {
            relative: relative.into(),
            required: true,
            path: None,
        }
    }

    /// Asset that may be missing from every pack.
    pub fn optional(relative: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::new(relative)
        }
    }

    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Winning file, once loaded.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn open(&self) -> io::Result<File> {
        match &self.path {
            Some(path) => File::open(path),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset '{}' is not loaded", self.relative),
            )),
        }
    }
}

impl TypedResource for AssetFileResource {
    const KIND: ResourceKind = ResourceKind::new("file");
}

impl PackResource for AssetFileResource {
    fn kind(&self) -> ResourceKind {
        Self::KIND
    }

    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new().with_path(ASSET_FILE, self.relative.clone())
    }

    fn load(&mut self, ctx: &LoadContext<'_>) -> ResourceResult<()> {
        self.path = match ctx.paths().winner(ASSET_FILE) {
            Some(path) => Some(path.to_path_buf()),
            None if self.required => return Err(ctx.path_not_found(ASSET_FILE)),
            None => {
                debug!(target: "resources", "Optional asset '{}' not found", self.relative);
                None
            }
        };
        Ok(())
    }

    fn unload(&mut self, _id: &str) {
        self.path = None;
    }
}
