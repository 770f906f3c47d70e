//! Catalog photo generation. The seam between request handling and the image model.
//!
//! Flow: validated uploads → instruction (built by the caller) → ImageGenerator →
//!       save to output dir → return bytes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::gemini_client::{GeminiClient, GeminiError, GeneratedImage, InlineImage, MODEL};
use crate::generation::storage::save_output;
use crate::generation::upload::UploadedImage;
use crate::instruction::composer::Instruction;

/// Produces an image from an instruction and ordered reference photos.
///
/// The default implementation is `GeminiClient`. Tests swap in a stub.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Model identifier reported by `/health`.
    fn model(&self) -> &str;

    async fn generate(
        &self,
        instruction: &str,
        images: &[UploadedImage],
    ) -> Result<GeneratedImage, GeminiError>;

    async fn health_check(&self) -> Result<(), GeminiError>;
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    fn model(&self) -> &str {
        MODEL
    }

    async fn generate(
        &self,
        instruction: &str,
        images: &[UploadedImage],
    ) -> Result<GeneratedImage, GeminiError> {
        let inline: Vec<InlineImage<'_>> = images
            .iter()
            .map(|image| InlineImage {
                mime_type: image.format.mime_type(),
                data: &image.data,
            })
            .collect();
        self.generate_image(instruction, &inline).await
    }

    async fn health_check(&self) -> Result<(), GeminiError> {
        self.check_model().await
    }
}

/// A generated photo and where it was written.
#[derive(Debug, Clone)]
pub struct CatalogPhoto {
    pub image: GeneratedImage,
    pub path: PathBuf,
}

/// Sends the instruction and photos to the generator, then stores the result.
pub async fn generate_catalog_photo(
    generator: &dyn ImageGenerator,
    instruction: &Instruction,
    images: &[UploadedImage],
    garment_number: &str,
    output_dir: &Path,
) -> Result<CatalogPhoto, AppError> {
    info!(
        "Generating garment {} with template '{}' ({} image(s), {:?})",
        garment_number,
        instruction.template,
        images.len(),
        instruction.category
    );

    let image = generator.generate(&instruction.text, images).await?;

    let path = save_output(output_dir, garment_number, &image.mime_type, &image.data)
        .await
        .map_err(|e| AppError::Storage(format!("{e:#}")))?;

    Ok(CatalogPhoto { image, path })
}
