use serde::{Deserialize, Serialize};

use crate::model::achievement::AchievementRecord;
use crate::model::section::SectionId;

/// Animation the presentation layer should play for a section change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    #[default]
    Fade,
    Slide,
    Zoom,
    Back,
}

/// Outcome of a navigation, handed to the presentation layer to animate and to
/// announce any achievements the move produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SectionId,
    pub to: SectionId,
    pub kind: TransitionKind,
    pub first_visit: bool,
    pub unlocked: Vec<AchievementRecord>,
}

impl Transition {
    #[must_use]
    pub fn new(from: SectionId, to: SectionId, kind: TransitionKind, first_visit: bool) -> Self {
        Self {
            from,
            to,
            kind,
            first_visit,
            unlocked: Vec::new(),
        }
    }
}
