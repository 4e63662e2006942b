use thiserror::Error;

use crate::game::entity::card::CardId;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unable to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// A single image fetch that did not produce an image.
#[derive(Debug, Error, PartialEq)]
pub enum ImageFetchError {
    #[error("Image request failed: {0}")]
    Transport(String),
    #[error("Image host answered with status {0}")]
    UnexpectedStatus(u16),
    #[error("Image host answered with an empty body")]
    EmptyBody,
}

#[derive(Debug, Error, PartialEq)]
pub enum HandError {
    #[error("Hand is already holding its maximum of {0} cards")]
    Full(usize),
    #[error("Card `{0}` is already in the hand")]
    Duplicate(CardId),
}

#[derive(Debug, Error, PartialEq)]
pub enum CardError {
    #[error("Card `{0}` is already changing a stat")]
    MutationInFlight(CardId),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
