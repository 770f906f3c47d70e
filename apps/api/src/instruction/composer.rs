//! Instruction Composer. Fills a template and appends the fixed constraint blocks.
//!
//! Block order in the output:
//! 1. filled template
//! 2. fidelity clause (always)
//! 3. positioning clause (clothing, or any conjunto)
//! 4. category framing line
//! 5. model characteristics (only when some are set)
//! 6. corrections from feedback (only when non-blank)

use serde::{Deserialize, Serialize};

use crate::instruction::garment::{classify, GarmentCategory};
use crate::instruction::mode::{select_template, template_for, Mode, Template};
use crate::instruction::prompts::{
    ACCESSORY_FRAMING, CLOTHING_FRAMING, FEEDBACK_HEADING, FIDELITY_CLAUSE,
    MODEL_PROFILE_HEADING, POSITIONING_CLAUSE, SHOE_FRAMING,
};
use crate::instruction::roles::{assign_roles, ImageRole, ShotPosition};
use crate::instruction::PromptError;

/// Scene values substituted into the template.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub garment_type: &'a str,
    pub environment: &'a str,
    pub activity: &'a str,
}

/// Optional virtual-model characteristics. Blank fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub height: Option<String>,
    pub body_type: Option<String>,
    pub skin_tone: Option<String>,
    pub hair_length: Option<String>,
    pub hair_texture: Option<String>,
    pub hair_color: Option<String>,
    pub hair_style: Option<String>,
}

impl ModelProfile {
    fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("height", &self.height),
            ("body type", &self.body_type),
            ("skin tone", &self.skin_tone),
            ("hair length", &self.hair_length),
            ("hair texture", &self.hair_texture),
            ("hair colour", &self.hair_color),
            ("hair style", &self.hair_style),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (name, v))
        })
        .collect()
    }
}

/// Optional inputs beyond the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionExtras {
    /// Piece labels by image position, e.g. `[Some("camisa"), Some("saia")]`.
    #[serde(default)]
    pub piece_types: Vec<Option<String>>,
    /// Side of the garment the photos show. Rendered under the role list.
    #[serde(default)]
    pub position: Option<ShotPosition>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub model_profile: ModelProfile,
}

/// A composed instruction and the decisions that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub text: String,
    pub template: &'static str,
    pub mode: Mode,
    pub category: GarmentCategory,
    pub roles: Vec<ImageRole>,
}

/// Selects the template, assigns roles and composes the instruction text.
pub fn build_instruction<I>(
    mode: &str,
    scene: &Scene<'_>,
    images: &[I],
    extras: &InstructionExtras,
) -> Result<Instruction, PromptError> {
    let template = select_template(mode, scene.garment_type)?;
    assemble(template, scene, images, extras)
}

/// Same as `build_instruction` for a mode that was already parsed or inferred.
pub fn build_instruction_for_mode<I>(
    mode: Mode,
    scene: &Scene<'_>,
    images: &[I],
    extras: &InstructionExtras,
) -> Result<Instruction, PromptError> {
    assemble(template_for(mode, scene.garment_type), scene, images, extras)
}

fn assemble<I>(
    template: &'static Template,
    scene: &Scene<'_>,
    images: &[I],
    extras: &InstructionExtras,
) -> Result<Instruction, PromptError> {
    let roles = assign_roles(images, template.mode)?;
    let text = compose(template, scene, &roles, extras);

    Ok(Instruction {
        text,
        template: template.name,
        mode: template.mode,
        category: classify(scene.garment_type),
        roles,
    })
}

/// Pure composition. Same inputs always give byte-identical output.
pub fn compose(
    template: &Template,
    scene: &Scene<'_>,
    roles: &[ImageRole],
    extras: &InstructionExtras,
) -> String {
    let category = classify(scene.garment_type);
    let garment_type = match scene.garment_type.trim() {
        "" => "garment",
        g => g,
    };
    let image_roles = render_roles(roles, &extras.piece_types, extras.position);

    let mut blocks = vec![fill_placeholders(
        template.body,
        &[
            ("environment", scene.environment),
            ("activity", scene.activity),
            ("garment_type", garment_type),
            ("image_roles", image_roles.as_str()),
        ],
    )];

    blocks.push(FIDELITY_CLAUSE.to_string());

    if needs_positioning(template.mode, category) {
        blocks.push(POSITIONING_CLAUSE.to_string());
    }

    blocks.push(
        match category {
            GarmentCategory::Shoe => SHOE_FRAMING,
            GarmentCategory::Accessory => ACCESSORY_FRAMING,
            GarmentCategory::Clothing => CLOTHING_FRAMING,
        }
        .to_string(),
    );

    let profile = extras.model_profile.entries();
    if !profile.is_empty() {
        let lines: Vec<String> = profile
            .iter()
            .map(|(name, value)| format!("- {name}: {value}"))
            .collect();
        blocks.push(format!("{MODEL_PROFILE_HEADING}\n{}", lines.join("\n")));
    }

    if let Some(feedback) = extras
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
    {
        blocks.push(format!("{FEEDBACK_HEADING}\n{feedback}"));
    }

    blocks.join("\n\n")
}

/// Shoes and accessories are shot however suits them; clothing and outfits must face forward.
pub fn needs_positioning(mode: Mode, category: GarmentCategory) -> bool {
    mode == Mode::Conjunto || category == GarmentCategory::Clothing
}

fn render_roles(
    roles: &[ImageRole],
    piece_types: &[Option<String>],
    position: Option<ShotPosition>,
) -> String {
    let mut lines: Vec<String> = roles
        .iter()
        .enumerate()
        .map(|(i, role)| {
            let piece = piece_types
                .get(i)
                .and_then(|p| p.as_deref())
                .map(str::trim)
                .filter(|p| !p.is_empty());
            match piece {
                Some(piece) => format!("{}. {} ({piece}): {}", i + 1, role.label(), role.guidance()),
                None => format!("{}. {}: {}", i + 1, role.label(), role.guidance()),
            }
        })
        .collect();
    if let Some(position) = position {
        lines.push(position.hint().to_string());
    }
    lines.join("\n")
}

/// Single-pass `{name}` substitution. Substituted values are never re-scanned, and
/// unknown placeholders are left as they are.
pub fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        if key.contains('{') {
            out.push('{');
            rest = after;
            continue;
        }

        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
