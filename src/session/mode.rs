use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::ParleyError;

/// The conversational personas a user can pick between
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// To-do and task management assistant
    #[serde(alias = "todo")]
    Task,
    /// Job hunting and career assistant
    #[serde(alias = "jobfind")]
    JobSearch,
    /// Open-ended general assistant
    #[default]
    General,
}

impl ChatMode {
    pub const ALL: [ChatMode; 3] = [Self::Task, Self::JobSearch, Self::General];

    /// Wire name, also the key into the prompt table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::JobSearch => "jobsearch",
            Self::General => "general",
        }
    }

    /// Get the display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Task => "Task Assistant",
            Self::JobSearch => "Job Search Assistant",
            Self::General => "General Assistant",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatMode {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" | "todo" => Ok(Self::Task),
            "jobsearch" | "jobfind" => Ok(Self::JobSearch),
            "general" => Ok(Self::General),
            other => Err(ParleyError::Validation(format!(
                "unknown mode '{}', expected one of: task, jobsearch, general",
                other
            ))),
        }
    }
}
