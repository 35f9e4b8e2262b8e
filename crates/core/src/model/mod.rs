mod achievement;
mod navigation;
mod progress;
mod section;

pub use achievement::{AchievementId, AchievementMeta, AchievementRecord, CustomId};
pub use navigation::{Transition, TransitionKind};
pub use progress::ProgressState;
pub use section::{ParseSectionError, SectionId};
