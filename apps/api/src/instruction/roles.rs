//! Image role assignment. Roles depend only on position and mode.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::instruction::mode::Mode;
use crate::instruction::PromptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    FrontView,
    BackView,
    UpperGarment,
    LowerGarment,
    AdditionalPiece,
}

impl ImageRole {
    pub fn label(&self) -> &'static str {
        match self {
            ImageRole::FrontView => "front view",
            ImageRole::BackView => "back view",
            ImageRole::UpperGarment => "upper garment",
            ImageRole::LowerGarment => "lower garment",
            ImageRole::AdditionalPiece => "additional piece",
        }
    }

    /// Extra guidance rendered next to the label in the instruction.
    pub fn guidance(&self) -> &'static str {
        match self {
            ImageRole::FrontView => "the garment as it must appear on the model",
            ImageRole::BackView => {
                "reference only for details hidden from the front; do not depict this side"
            }
            ImageRole::UpperGarment => "worn on the upper body",
            ImageRole::LowerGarment => "worn on the lower body",
            ImageRole::AdditionalPiece => "worn or carried to complete the look",
        }
    }
}

/// Which side of the garment the uploaded photos show, as declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotPosition {
    #[serde(alias = "frente")]
    Front,
    #[serde(alias = "costas")]
    Back,
    #[serde(alias = "ambos")]
    Both,
}

impl ShotPosition {
    /// Line rendered under the role list.
    pub fn hint(&self) -> &'static str {
        match self {
            ShotPosition::Front => "The reference photos show the front of the garment.",
            ShotPosition::Back => {
                "The reference photos show the back of the garment; reconstruct the front from its cut and still show the model facing the camera."
            }
            ShotPosition::Both => {
                "The reference photos show both the front and the back of the garment."
            }
        }
    }
}

impl FromStr for ShotPosition {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" | "frente" => Ok(ShotPosition::Front),
            "back" | "costas" => Ok(ShotPosition::Back),
            "both" | "ambos" => Ok(ShotPosition::Both),
            _ => Err(PromptError::InvalidPosition(s.to_string())),
        }
    }
}

const SINGLE_PIECE_ROLES: &[ImageRole] = &[ImageRole::FrontView, ImageRole::BackView];

const CONJUNTO_ROLES: &[ImageRole] = &[
    ImageRole::UpperGarment,
    ImageRole::LowerGarment,
    ImageRole::AdditionalPiece,
];

/// Returns one role per image, in input order.
pub fn assign_roles<I>(images: &[I], mode: Mode) -> Result<Vec<ImageRole>, PromptError> {
    let count = images.len();
    let (min, max) = mode.image_range();
    if count < min || count > max {
        return Err(PromptError::InvalidImageCount {
            mode,
            count,
            min,
            max,
        });
    }

    let table = match mode {
        Mode::Quotidien | Mode::Party => SINGLE_PIECE_ROLES,
        Mode::Conjunto => CONJUNTO_ROLES,
    };
    Ok(table[..count].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_labels<I>(images: &[I], mode: Mode) -> Result<Vec<&'static str>, PromptError> {
        Ok(assign_roles(images, mode)?
            .iter()
            .map(ImageRole::label)
            .collect())
    }

    #[test]
    fn test_quotidien_single_front() {
        assert_eq!(
            role_labels(&["a.png"], Mode::Quotidien).unwrap(),
            vec!["front view"]
        );
    }

    #[test]
    fn test_party_front_and_back() {
        assert_eq!(
            role_labels(&["a.png", "b.png"], Mode::Party).unwrap(),
            vec!["front view", "back view"]
        );
    }

    #[test]
    fn test_conjunto_two_images() {
        assert_eq!(
            role_labels(&["top.png", "bottom.png"], Mode::Conjunto).unwrap(),
            vec!["upper garment", "lower garment"]
        );
    }

    #[test]
    fn test_conjunto_three_images() {
        assert_eq!(
            assign_roles(&[1, 2, 3], Mode::Conjunto).unwrap(),
            vec![
                ImageRole::UpperGarment,
                ImageRole::LowerGarment,
                ImageRole::AdditionalPiece
            ]
        );
    }

    #[test]
    fn test_conjunto_single_image_is_usage_error() {
        let err = assign_roles(&["top.png"], Mode::Conjunto).unwrap_err();
        assert_eq!(
            err,
            PromptError::InvalidImageCount {
                mode: Mode::Conjunto,
                count: 1,
                min: 2,
                max: 3
            }
        );
    }

    #[test]
    fn test_empty_image_set_rejected_for_every_mode() {
        let empty: [&str; 0] = [];
        for mode in [Mode::Quotidien, Mode::Party, Mode::Conjunto] {
            assert!(matches!(
                assign_roles(&empty, mode),
                Err(PromptError::InvalidImageCount { count: 0, .. })
            ));
        }
    }

    #[test]
    fn test_three_images_rejected_outside_conjunto() {
        assert!(assign_roles(&[1, 2, 3], Mode::Quotidien).is_err());
        assert!(assign_roles(&[1, 2, 3], Mode::Party).is_err());
    }

    #[test]
    fn test_shot_position_parsing() {
        assert_eq!("front".parse::<ShotPosition>().unwrap(), ShotPosition::Front);
        assert_eq!(" Costas ".parse::<ShotPosition>().unwrap(), ShotPosition::Back);
        assert_eq!("ambos".parse::<ShotPosition>().unwrap(), ShotPosition::Both);
        assert_eq!(
            "sideways".parse::<ShotPosition>().unwrap_err(),
            PromptError::InvalidPosition("sideways".to_string())
        );
    }

    #[test]
    fn test_shot_position_json_aliases() {
        let parsed: ShotPosition = serde_json::from_str("\"ambos\"").unwrap();
        assert_eq!(parsed, ShotPosition::Both);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let images = ["x", "y", "z"];
        assert_eq!(
            assign_roles(&images, Mode::Conjunto).unwrap(),
            assign_roles(&images, Mode::Conjunto).unwrap()
        );
    }
}
