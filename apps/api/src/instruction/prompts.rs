// Prompt constants for the Instruction module.
// Templates carry `{environment}`, `{activity}`, `{garment_type}` and `{image_roles}`
// placeholders, filled by `composer::fill_placeholders`.

/// Everyday lifestyle catalog shot.
pub const QUOTIDIEN_TEMPLATE: &str = r#"Create a photorealistic lifestyle catalog photograph of a virtual model wearing the {garment_type} shown in the reference images.

SCENE: {environment}, natural daylight, candid everyday atmosphere.
ACTION: the model is {activity}, relaxed and natural body language.
CAMERA: full-body or three-quarter framing, 50mm lens look, shallow depth of field, sharp focus on the garment.

REFERENCE IMAGES (in the order provided):
{image_roles}

The result must look like an authentic street-style catalog photo, not a studio packshot. No text, logos or watermarks."#;

/// Formal editorial shot for party wear.
pub const PARTY_TEMPLATE: &str = r#"Create a photorealistic high-fashion editorial photograph of a virtual model wearing the {garment_type} shown in the reference images.

SCENE: {environment}, elegant evening lighting with warm highlights and soft shadows.
ACTION: the model is {activity}, poised and confident, graceful posture.
CAMERA: full-body framing so the whole silhouette of the garment is visible, 85mm lens look, editorial colour grading.

REFERENCE IMAGES (in the order provided):
{image_roles}

The result must read as a luxury magazine editorial. No text, logos or watermarks."#;

/// Coordinated multi-piece outfit assembled from separate pieces.
pub const CONJUNTO_TEMPLATE: &str = r#"Create a photorealistic lifestyle catalog photograph of a virtual model wearing a coordinated outfit ({garment_type}) assembled from the separate pieces shown in the reference images.

SCENE: {environment}, natural flattering light.
ACTION: the model is {activity}, relaxed and natural body language.
CAMERA: full-body framing so every piece of the outfit is visible at once, 50mm lens look, sharp focus on the clothing.

REFERENCE IMAGES (in the order provided, one piece per image):
{image_roles}

Every piece must be worn together in a single look, each in its natural place on the body. No text, logos or watermarks."#;

/// Appended to every instruction.
pub const FIDELITY_CLAUSE: &str = "GARMENT FIDELITY (MANDATORY): Reproduce the garment EXACTLY as it appears in the reference images. \
Keep the exact colour, shade, fabric texture, print, pattern, cut, length, buttons, seams and every design detail. \
Do NOT redesign, recolour, simplify or add elements that are not in the reference images.";

/// Appended for clothing and for conjunto outfits.
pub const POSITIONING_CLAUSE: &str = "MODEL POSITIONING (MANDATORY): The model must face the camera, either straight-on or in a three-quarter view, so the front of the garment is fully visible. \
Do NOT show the back view. Do NOT show a side profile. Do NOT show the model turned away from the camera.";

pub const SHOE_FRAMING: &str = "FRAMING: Keep the feet and the shoes fully inside the frame and in sharp focus; the shoes are the hero of the image.";

pub const ACCESSORY_FRAMING: &str = "FRAMING: Keep the accessory clearly visible, unobstructed and in sharp focus; it is the hero of the image.";

pub const CLOTHING_FRAMING: &str = "FRAMING: Show the complete garment from neckline to hem with nothing cropped or covered.";

/// Heading for the optional virtual-model characteristics block.
pub const MODEL_PROFILE_HEADING: &str = "MODEL CHARACTERISTICS:";

/// Heading for the optional corrections block. Feedback text follows verbatim.
pub const FEEDBACK_HEADING: &str = "CORRECTIONS REQUESTED AFTER THE PREVIOUS ATTEMPT (apply them while keeping every rule above):";
