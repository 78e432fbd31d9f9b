//! Naming and preparing image uploads.

use pp_types::UserId;
use uuid::Uuid;

use crate::store::ObjectUpload;

pub const CACHE_CONTROL_SECONDS: u32 = 3600;
const DEFAULT_EXTENSION: &str = "jpg";

/// What an uploaded image is for; decides its storage folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Project,
    Avatar,
}

/// A file picked by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Text after the last dot of the file name, `jpg` when there is none.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => DEFAULT_EXTENSION,
        }
    }

    pub fn into_object(self, owner: &UserId, kind: ImageKind) -> ObjectUpload {
        ObjectUpload {
            path: object_path(owner, kind, Uuid::new_v4(), self.extension()),
            content_type: self.content_type,
            bytes: self.bytes,
            cache_control: CACHE_CONTROL_SECONDS,
            upsert: true,
        }
    }
}

pub fn object_path(owner: &UserId, kind: ImageKind, id: Uuid, extension: &str) -> String {
    match kind {
        ImageKind::Project => format!("{owner}/{id}.{extension}"),
        ImageKind::Avatar => format!("{owner}/avatar/{id}.{extension}"),
    }
}
