//! Axum route handlers for the Generation API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::generate_catalog_photo;
use crate::generation::upload::{extract_metadata_from_filename, UploadedImage};
use crate::instruction::composer::{
    build_instruction_for_mode, InstructionExtras, ModelProfile, Scene,
};
use crate::instruction::handlers::resolve_scene;
use crate::instruction::mode::Mode;
use crate::instruction::roles::ShotPosition;
use crate::state::AppState;

/// Text fields and files of a `/api/v1/generate` multipart body.
#[derive(Debug, Default)]
struct GenerateForm {
    files: Vec<UploadedImage>,
    mode: Option<String>,
    garment_number: Option<String>,
    garment_type: Option<String>,
    environment: Option<String>,
    activity: Option<String>,
    feedback: Option<String>,
    position: Option<String>,
    piece_types: [Option<String>; 3],
    model_profile: ModelProfile,
}

impl GenerateForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = GenerateForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "files" {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(malformed)?;
                let index = form.files.len();
                let image = tokio::task::spawn_blocking(move || {
                    UploadedImage::validate(index, filename, data)
                })
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("spawn_blocking failed decoding upload: {e}"))
                })??;
                form.files.push(image);
                continue;
            }

            let value = non_blank(field.text().await.map_err(malformed)?);
            match name.as_str() {
                "mode" => form.mode = value,
                "garment_number" => form.garment_number = value,
                "garment_type" => form.garment_type = value,
                "env" | "environment" => form.environment = value,
                "activity" => form.activity = value,
                "feedback" => form.feedback = value,
                "position" => form.position = value,
                "piece1_type" => form.piece_types[0] = value,
                "piece2_type" => form.piece_types[1] = value,
                "piece3_type" => form.piece_types[2] = value,
                "model_height" => form.model_profile.height = value,
                "model_body_type" => form.model_profile.body_type = value,
                "model_skin_tone" => form.model_profile.skin_tone = value,
                "model_hair_length" => form.model_profile.hair_length = value,
                "model_hair_texture" => form.model_profile.hair_texture = value,
                "model_hair_color" => form.model_profile.hair_color = value,
                "model_hair_style" => form.model_profile.hair_style = value,
                other => tracing::debug!("Ignoring unknown form field '{other}'"),
            }
        }

        Ok(form)
    }
}

fn malformed(e: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// POST /api/v1/generate
///
/// Multipart upload of 1–3 garment photos plus scene fields. Returns the generated
/// catalog photo as the response body.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = GenerateForm::from_multipart(multipart).await?;

    let first = form
        .files
        .first()
        .ok_or_else(|| AppError::Validation("At least one file is required".to_string()))?;

    let from_name = extract_metadata_from_filename(&first.filename);
    let garment_number = form.garment_number.or(from_name.garment_number);
    let garment_type = form.garment_type.or(from_name.garment_type);
    let (Some(garment_number), Some(garment_type)) = (garment_number, garment_type) else {
        return Err(AppError::Validation(
            "garment_number and garment_type are required. Either provide them explicitly or \
             use a filename with format: <number>_<type>_<rest>.ext (e.g., 42_pantalon_20251229.HEIC)"
                .to_string(),
        ));
    };

    let mode = match form.mode.as_deref() {
        Some(raw) => raw.parse::<Mode>()?,
        None => Mode::infer_from_garment(&garment_type),
    };

    let (environment, activity) = resolve_scene(
        mode,
        &garment_type,
        form.environment.as_deref(),
        form.activity.as_deref(),
    );

    info!(
        "Generate request: garment={garment_number} type={garment_type} mode={mode} env={environment} files={}",
        form.files.len()
    );

    let position = form
        .position
        .as_deref()
        .map(str::parse::<ShotPosition>)
        .transpose()?;

    let extras = InstructionExtras {
        piece_types: form.piece_types.to_vec(),
        position,
        feedback: form.feedback,
        model_profile: form.model_profile,
    };
    let scene = Scene {
        garment_type: &garment_type,
        environment: &environment,
        activity: &activity,
    };
    let instruction = build_instruction_for_mode(mode, &scene, &form.files, &extras)?;

    let photo = generate_catalog_photo(
        state.generator.as_ref(),
        &instruction,
        &form.files,
        &garment_number,
        &state.config.output_dir,
    )
    .await?;

    let filename = photo
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cabide.png")
        .to_string();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, photo.image.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        photo.image.data,
    )
        .into_response())
}
