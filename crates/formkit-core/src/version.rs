//! Format versions and the per-document version negotiator.
//!
//! A document tracks the version level its content requires (`current`)
//! and the newest version it claims compatibility with (`max`). The level
//! only rises, and `max >= current` holds after every operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Known format versions, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormVersion {
    /// Versions 1.0 through 1.2.
    Basic,
    Nb50,
    Nb60Pre,
    Nb60,
    Nb61,
    Nb65,
    Nb71,
    Nb74,
}

impl FormVersion {
    pub const LATEST: FormVersion = FormVersion::Nb74;

    pub fn from_token(token: &str) -> Option<FormVersion> {
        match token {
            "1.0" | "1.1" | "1.2" => Some(FormVersion::Basic),
            "1.3" => Some(FormVersion::Nb50),
            "1.4" => Some(FormVersion::Nb60Pre),
            "1.5" => Some(FormVersion::Nb60),
            "1.6" => Some(FormVersion::Nb61),
            "1.7" => Some(FormVersion::Nb65),
            "1.8" => Some(FormVersion::Nb71),
            "1.9" => Some(FormVersion::Nb74),
            _ => None,
        }
    }

    /// The token written for this version.
    pub fn token(self) -> &'static str {
        match self {
            FormVersion::Basic => "1.2",
            FormVersion::Nb50 => "1.3",
            FormVersion::Nb60Pre => "1.4",
            FormVersion::Nb60 => "1.5",
            FormVersion::Nb61 => "1.6",
            FormVersion::Nb65 => "1.7",
            FormVersion::Nb71 => "1.8",
            FormVersion::Nb74 => "1.9",
        }
    }
}

impl fmt::Display for FormVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Content that needs a minimum format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormFeature {
    /// A container using the free-design layout.
    NaturalLayout,
    /// A component assigned to a non-default layer of a layered pane.
    LayeredPaneLayer,
}

impl FormFeature {
    pub fn required_version(self) -> FormVersion {
        match self {
            FormFeature::NaturalLayout => FormVersion::Nb50,
            FormFeature::LayeredPaneLayer => FormVersion::Nb74,
        }
    }
}

/// The `(current, max)` version pair of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLevels {
    current: FormVersion,
    max: FormVersion,
}

impl Default for VersionLevels {
    fn default() -> Self {
        VersionLevels::new(FormVersion::Basic)
    }
}

impl VersionLevels {
    pub fn new(current: FormVersion) -> Self {
        VersionLevels { current, max: current }
    }

    /// Levels read from a document's `version` and `maxVersion` tokens.
    ///
    /// A missing or unknown `version` is an error. An unknown `maxVersion`
    /// claims the latest version; a missing or empty one claims nothing
    /// beyond `version`.
    pub fn negotiate(version: Option<&str>, max_version: Option<&str>) -> Result<Self, ModelError> {
        let token = version.unwrap_or("");
        let current = FormVersion::from_token(token).ok_or_else(|| ModelError::UnsupportedVersion {
            token: token.to_string(),
        })?;
        let max = match max_version {
            None | Some("") => current,
            Some(token) => FormVersion::from_token(token).unwrap_or(FormVersion::LATEST),
        };
        Ok(VersionLevels {
            current,
            max: max.max(current),
        })
    }

    pub fn current(&self) -> FormVersion {
        self.current
    }

    pub fn max(&self) -> FormVersion {
        self.max
    }

    /// Raise `current` to at least `required`; never lowers it.
    pub fn raise(&mut self, required: FormVersion) {
        if required > self.current {
            self.current = required;
        }
        self.clamp();
    }

    pub fn require(&mut self, feature: FormFeature) {
        self.raise(feature.required_version());
    }

    /// Set the compatibility claim; it never drops below `current`.
    pub fn set_max(&mut self, max: FormVersion) {
        self.max = max;
        self.clamp();
    }

    /// Restore `max >= current`.
    pub fn clamp(&mut self) {
        if self.max < self.current {
            self.max = self.current;
        }
    }
}
