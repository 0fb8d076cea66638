//! Database models

use serde::{Deserialize, Serialize};

/// Study kind for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectKind {
    /// Single-round Delphi study, ordinal ratings 1..=9
    #[serde(rename = "delphi")]
    Delphi,
    /// Face-validity study, binary Yes/No ratings
    #[serde(rename = "face-validity")]
    FaceValidity,
}

impl ProjectKind {
    /// String form stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Delphi => "delphi",
            ProjectKind::FaceValidity => "face-validity",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "delphi" => Some(ProjectKind::Delphi),
            "face-validity" => Some(ProjectKind::FaceValidity),
            _ => None,
        }
    }
}

/// Which of the two parallel scale-item lists an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSide {
    Original,
    Translated,
}

impl ItemSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSide::Original => "original",
            ItemSide::Translated => "translated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "original" => Some(ItemSide::Original),
            "translated" => Some(ItemSide::Translated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub guid: String,
    pub name: String,
    pub description: String,
    pub kind: ProjectKind,
    pub owner: String,
    pub invite_token: String,
    pub created_at: String,
}

/// One statement being rated; items on the original and translated lists
/// correspond by position only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleItem {
    pub guid: String,
    pub position: i64,
    pub text: String,
}

/// Expert identification captured with a submission (presence-validated only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertMeta {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub years_experience: String,
}

/// One expert's stored submission header (ratings live in their own table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub guid: String,
    pub expert: ExpertMeta,
    pub remarks: Option<String>,
    pub submitted_at: String,
}
