use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Neutral,
    Safe,
    Danger,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Neutral => "neutral",
            GoalStatus::Safe => "safe",
            GoalStatus::Danger => "danger",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalReport {
    pub attended: u32,
    pub total: u32,
    pub percentage: u32,
    pub goal: u8,
    pub status: GoalStatus,
    pub message: String,
    /// Only set when `status` is `Safe`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_miss: Option<u32>,
    /// Only set when `status` is `Danger` and the goal can still be reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_attend: Option<u32>,
}
