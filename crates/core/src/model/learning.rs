use serde::{Deserialize, Serialize};

use crate::model::ids::HelpKey;

/// One scrollable section of a skill's Learn stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSection {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_caption: Option<String>,
}

/// Reading material for the Learn stage of a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningContent {
    pub title: String,
    pub sections: Vec<LearningSection>,
}

impl LearningContent {
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// Theory and worked examples shown by the "I Need Help" dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    pub theory: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// A help entry together with the key it is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpTopic {
    pub key: HelpKey,
    #[serde(flatten)]
    pub entry: HelpEntry,
}
