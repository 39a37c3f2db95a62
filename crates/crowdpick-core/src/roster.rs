//! Participant entries supplied by the roster collaborator.

use serde::{Deserialize, Serialize};

/// Name shown for participants whose name is blank.
pub const ANONYMOUS: &str = "Anonymous";

/// Opaque handle to a participant photo (URL, asset key, ...).
///
/// The core never dereferences it; a missing or broken photo only changes
/// how the renderer dresses the agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(pub String);

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(default)]
    pub photo: Option<PhotoRef>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            photo: None,
            visible: true,
        }
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(PhotoRef(photo.into()));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Trimmed name, or [`ANONYMOUS`] when blank.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            ANONYMOUS
        } else {
            trimmed
        }
    }
}

/// Parse a comma separated list of names, e.g. from a command line.
pub fn parse_names(list: &str) -> Vec<Participant> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Participant::new)
        .collect()
}

/// Entries that take part in a race or a spin.
pub fn visible(participants: &[Participant]) -> impl Iterator<Item = &Participant> {
    participants.iter().filter(|p| p.visible)
}
