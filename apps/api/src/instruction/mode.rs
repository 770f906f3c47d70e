//! Mode parsing and template selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::instruction::garment::is_party_dress;
use crate::instruction::prompts::{CONJUNTO_TEMPLATE, PARTY_TEMPLATE, QUOTIDIEN_TEMPLATE};
use crate::instruction::PromptError;

/// Photoshoot scenario requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Quotidien,
    Party,
    Conjunto,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Quotidien => "quotidien",
            Mode::Party => "party",
            Mode::Conjunto => "conjunto",
        }
    }

    /// Inclusive range of reference images the mode accepts.
    pub fn image_range(&self) -> (usize, usize) {
        match self {
            Mode::Quotidien | Mode::Party => (1, 2),
            Mode::Conjunto => (2, 3),
        }
    }

    /// Best guess when the caller sent no mode at all. An explicit but unknown
    /// mode goes through `FromStr` instead and is rejected.
    pub fn infer_from_garment(garment_type: &str) -> Self {
        if garment_type.trim().eq_ignore_ascii_case("conjunto") {
            Mode::Conjunto
        } else if is_party_dress(garment_type) {
            Mode::Party
        } else {
            Mode::Quotidien
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quotidien" => Ok(Mode::Quotidien),
            "party" => Ok(Mode::Party),
            "conjunto" => Ok(Mode::Conjunto),
            _ => Err(PromptError::InvalidMode(s.to_string())),
        }
    }
}

/// A prompt template bound to the mode it renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub mode: Mode,
    pub name: &'static str,
    pub body: &'static str,
}

pub const QUOTIDIEN: Template = Template {
    mode: Mode::Quotidien,
    name: "Virtual Model Quotidien",
    body: QUOTIDIEN_TEMPLATE,
};

pub const PARTY: Template = Template {
    mode: Mode::Party,
    name: "Virtual Model Party",
    body: PARTY_TEMPLATE,
};

pub const CONJUNTO: Template = Template {
    mode: Mode::Conjunto,
    name: "Virtual Model Conjunto",
    body: CONJUNTO_TEMPLATE,
};

/// Picks the template for a raw mode string. Never defaults on an unknown mode.
pub fn select_template(mode: &str, garment_type: &str) -> Result<&'static Template, PromptError> {
    let mode: Mode = mode.parse()?;
    Ok(template_for(mode, garment_type))
}

/// Template for an already-parsed mode. A party dress in quotidien mode still
/// gets the party template.
pub fn template_for(mode: Mode, garment_type: &str) -> &'static Template {
    match mode {
        Mode::Quotidien if is_party_dress(garment_type) => &PARTY,
        Mode::Quotidien => &QUOTIDIEN,
        Mode::Party => &PARTY,
        Mode::Conjunto => &CONJUNTO,
    }
}
