// Catalog photo generation: upload intake, model call, output storage.
// All Gemini calls go through gemini_client via the ImageGenerator trait.

pub mod generator;
pub mod handlers;
pub mod storage;
pub mod upload;
