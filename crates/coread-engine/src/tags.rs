//! Agent mentions in reply bodies.
//!
//! A reply that mentions an agent with `@name` is tagged for that agent. Only
//! the fixed agent set is recognized, case-insensitively, and only the first
//! mention counts. The name is matched as a prefix, so `@criticality` still
//! tags the critical agent.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::AgentId;

static MENTION_REGEX: OnceLock<Regex> = OnceLock::new();

/// The agent tagged by the first `@mention` in `body`, if any
pub fn parse_tagged_agent(body: &str) -> Option<AgentId> {
    let regex = MENTION_REGEX.get_or_init(|| {
        let names: Vec<&str> = AgentId::ALL.iter().map(AgentId::as_str).collect();
        Regex::new(&format!(r"(?i)@({})", names.join("|"))).expect("Invalid mention regex")
    });
    regex
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("@Critical what do you think?", Some(AgentId::Critical))]
    #[case("hey @aesthetic", Some(AgentId::Aesthetic))]
    #[case("@INSTRUMENTAL, then @critical", Some(AgentId::Instrumental))]
    #[case("@critical and @aesthetic", Some(AgentId::Critical))]
    #[case("no mention here", None)]
    #[case("critical without the at sign", None)]
    #[case("@poet is not an agent", None)]
    #[case("@criticality then @aesthetic", Some(AgentId::Critical))]
    #[case("", None)]
    fn extracts_first_known_mention(#[case] body: &str, #[case] expected: Option<AgentId>) {
        assert_eq!(parse_tagged_agent(body), expected);
    }
}
