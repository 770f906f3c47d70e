//! Axum route handlers for the Instruction API.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::instruction::composer::{build_instruction, InstructionExtras, Scene};
use crate::instruction::garment::GarmentCategory;
use crate::instruction::mode::{template_for, Mode};

pub const DEFAULT_ENVIRONMENT: &str = "street";
pub const DEFAULT_ACTIVITY: &str = "posing for a lifestyle catalog";
pub const PARTY_ENVIRONMENT: &str = "a gala ballroom";
pub const PARTY_ACTIVITY: &str = "holding a champagne glass";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InstructionPreviewRequest {
    pub mode: String,
    pub garment_type: String,
    pub environment: Option<String>,
    pub activity: Option<String>,
    /// Ordered image references (file names); only their order and count matter.
    pub images: Vec<String>,
    #[serde(flatten)]
    pub extras: InstructionExtras,
}

#[derive(Debug, Serialize)]
pub struct RoleAssignment {
    pub image: String,
    pub role: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InstructionPreviewResponse {
    pub instruction: String,
    pub template: &'static str,
    pub mode: Mode,
    pub category: GarmentCategory,
    pub roles: Vec<RoleAssignment>,
}

/// Fills in environment and activity when the caller left them out.
///
/// Party shots without an explicit environment get the gala scene; the activity
/// only follows it when the caller did not pick one either.
pub fn resolve_scene(
    mode: Mode,
    garment_type: &str,
    environment: Option<&str>,
    activity: Option<&str>,
) -> (String, String) {
    let environment = environment.map(str::trim).filter(|e| !e.is_empty());
    let activity = activity.map(str::trim).filter(|a| !a.is_empty());
    let is_party = template_for(mode, garment_type).mode == Mode::Party;

    match (environment, activity) {
        (Some(env), Some(act)) => (env.to_string(), act.to_string()),
        (Some(env), None) => (env.to_string(), DEFAULT_ACTIVITY.to_string()),
        (None, Some(act)) if is_party => (PARTY_ENVIRONMENT.to_string(), act.to_string()),
        (None, Some(act)) => (DEFAULT_ENVIRONMENT.to_string(), act.to_string()),
        (None, None) if is_party => (PARTY_ENVIRONMENT.to_string(), PARTY_ACTIVITY.to_string()),
        (None, None) => (DEFAULT_ENVIRONMENT.to_string(), DEFAULT_ACTIVITY.to_string()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/instructions
///
/// Builds the instruction that `/api/v1/generate` would send, without calling the model.
pub async fn handle_preview_instruction(
    Json(request): Json<InstructionPreviewRequest>,
) -> Result<Json<InstructionPreviewResponse>, AppError> {
    let mode: Mode = request.mode.parse()?;
    let (environment, activity) = resolve_scene(
        mode,
        &request.garment_type,
        request.environment.as_deref(),
        request.activity.as_deref(),
    );

    let scene = Scene {
        garment_type: &request.garment_type,
        environment: &environment,
        activity: &activity,
    };
    let instruction = build_instruction(&request.mode, &scene, &request.images, &request.extras)?;

    let roles = request
        .images
        .into_iter()
        .zip(&instruction.roles)
        .map(|(image, role)| RoleAssignment {
            image,
            role: role.label(),
        })
        .collect();

    Ok(Json(InstructionPreviewResponse {
        instruction: instruction.text,
        template: instruction.template,
        mode: instruction.mode,
        category: instruction.category,
        roles,
    }))
}
