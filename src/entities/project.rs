//! Project info - optional context attached to an inquiry

use serde::{Deserialize, Serialize};

/// Optional project context. No field is required.
///
/// The same shape doubles as a partial update: `None` fields in a patch leave
/// the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_volume: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_requirements: Option<String>,
}

pub type ProjectPatch = ProjectInfo;

impl ProjectInfo {
    /// True when nothing has been filled in
    pub fn is_empty(&self) -> bool {
        self == &ProjectInfo::default()
    }

    /// Merge a partial update into this project info
    pub fn apply(&mut self, patch: ProjectPatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(
                    if patch.$field.is_some() {
                        self.$field = patch.$field;
                    }
                )*
            };
        }
        merge!(
            project_name,
            description,
            expected_volume,
            target_price,
            timeline,
            budget,
            application,
            additional_requirements
        );
        if !patch.certifications.is_empty() {
            self.certifications = patch.certifications;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(ProjectInfo::default().is_empty());
    }

    #[test]
    fn test_apply_merges() {
        let mut info = ProjectInfo {
            project_name: Some("Drone v2".to_string()),
            ..Default::default()
        };
        info.apply(ProjectInfo {
            timeline: Some("Q3".to_string()),
            certifications: vec!["CE".to_string(), "FCC".to_string()],
            ..Default::default()
        });

        assert_eq!(info.project_name.as_deref(), Some("Drone v2"));
        assert_eq!(info.timeline.as_deref(), Some("Q3"));
        assert_eq!(info.certifications.len(), 2);
        assert!(!info.is_empty());
    }
}
