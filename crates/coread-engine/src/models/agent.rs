use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed reading agents that annotate and discuss a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    /// Practical understanding and application
    Instrumental,
    /// Questioning and analysis
    Critical,
    /// Connecting and expanding meaning
    Aesthetic,
}

impl AgentId {
    pub const ALL: [AgentId; 3] = [AgentId::Instrumental, AgentId::Critical, AgentId::Aesthetic];

    /// Wire identifier, e.g. `"critical"`
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Instrumental => "instrumental",
            AgentId::Critical => "critical",
            AgentId::Aesthetic => "aesthetic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentId::Instrumental => "Instrumental",
            AgentId::Critical => "Critical",
            AgentId::Aesthetic => "Aesthetic",
        }
    }

    /// Accent colour as RGB, used for comment markers and message headers
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            AgentId::Instrumental => (0xF5, 0x9E, 0x0B),
            AgentId::Critical => (0x3B, 0x82, 0xF6),
            AgentId::Aesthetic => (0xA8, 0x55, 0xF7),
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentId {
    type Err = UnknownAgent;

    /// Case-insensitive lookup of an agent identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::ALL
            .into_iter()
            .find(|agent| agent.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}

/// Who wrote a message: the reader or one of the agents.
///
/// Serialized as a bare string (`"user"` or an agent id) to match the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Author {
    User,
    Agent(AgentId),
}

impl Author {
    pub fn is_user(&self) -> bool {
        matches!(self, Author::User)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Author::User => "You",
            Author::Agent(agent) => agent.display_name(),
        }
    }
}

impl TryFrom<String> for Author {
    type Error = UnknownAgent;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "user" {
            Ok(Author::User)
        } else {
            value.parse().map(Author::Agent)
        }
    }
}

impl From<Author> for String {
    fn from(author: Author) -> Self {
        match author {
            Author::User => "user".to_string(),
            Author::Agent(agent) => agent.as_str().to_string(),
        }
    }
}

/// The shape a multi-agent discussion takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionType {
    /// Agents take opposing stances on a claim
    PositionTaking,
    /// Agents probe a critical question more deeply
    Deepening,
    /// Agents bring in concrete situations and generalize
    Connecting,
}

impl DiscussionType {
    pub fn label(&self) -> &'static str {
        match self {
            DiscussionType::PositionTaking => "Position Taking",
            DiscussionType::Deepening => "Deepening",
            DiscussionType::Connecting => "Connecting",
        }
    }
}
