use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::foundation::error::StudioResult;
use crate::foundation::ids::ProjectId;
use crate::model::document::SerializedDocument;
use crate::scene::template::TemplatePreset;

/// Project persistence.
pub trait ProjectStore {
    /// Fetch a project's serialized canvas.
    fn load_project(&self, id: ProjectId) -> impl Future<Output = StudioResult<SerializedDocument>>;

    /// Persist a project's serialized canvas. Later saves overwrite earlier ones.
    fn save_project(
        &self,
        id: ProjectId,
        document: SerializedDocument,
    ) -> impl Future<Output = StudioResult<()>>;
}

/// Where an uploaded image ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Source string usable as an image element `src`.
    pub url: String,
}

/// Image upload storage.
pub trait ImageStorage {
    /// Store `bytes` and return the public location.
    fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        context_type: &str,
    ) -> impl Future<Output = StudioResult<UploadedImage>>;
}

/// Template presets source.
pub trait TemplateCatalog {
    /// Every available preset.
    fn templates(&self) -> impl Future<Output = StudioResult<Vec<TemplatePreset>>>;
}
