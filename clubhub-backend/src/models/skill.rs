use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::nullable")]
    pub category: Option<Option<String>>,
}
