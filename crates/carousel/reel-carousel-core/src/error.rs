//! Error types for the carousel core

use serde::{Deserialize, Serialize};

/// Failure reported by a media element collaborator.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaError {
    /// The element for this slide was never attached to the host
    #[error("No media element attached for slide {index}")]
    Detached { index: usize },

    /// The element rejected a play/pause command
    #[error("Media command '{command}' failed on slide {index}: {reason}")]
    CommandFailed {
        index: usize,
        command: String,
        reason: String,
    },
}

/// Error type for registry loading and playback transitions
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CarouselError {
    /// The deck has no slides
    #[error("Slide registry is empty")]
    EmptyRegistry,

    /// A slide declared a duration that cannot drive progress
    #[error("Slide {id} has invalid duration {duration}")]
    InvalidDuration { id: u32, duration: f32 },

    /// Two slides share an id
    #[error("Duplicate slide id: {id}")]
    DuplicateSlide { id: u32 },

    /// Index outside the registry
    #[error("Slide index {index} is out of range (len {len})")]
    SlideOutOfRange { index: usize, len: usize },

    /// Lifecycle event for a slide that is no longer current
    #[error("Stale event for slide {index} (current slide is {current})")]
    StaleEvent { index: usize, current: usize },

    /// Media element failure
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Deck or config JSON could not be parsed
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CarouselError {
    /// Errors the runtime swallows instead of surfacing.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StaleEvent { .. } | Self::Media(_) | Self::SlideOutOfRange { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyRegistry | Self::InvalidDuration { .. } | Self::DuplicateSlide { .. } => {
                "registry"
            }
            Self::SlideOutOfRange { .. } | Self::StaleEvent { .. } => "playback",
            Self::Media(_) => "media",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for CarouselError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
