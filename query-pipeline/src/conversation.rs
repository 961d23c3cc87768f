use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
///
/// Unknown roles (e.g. `system`) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(r: Role) -> Self {
        match r {
            Role::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message of the caller-supplied conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_pass_through_unchanged() {
        let turns: Vec<ConversationTurn> = serde_json::from_str(
            r#"[{"role":"user","content":"a"},{"role":"assistant","content":"b"},{"role":"system","content":"c","id":"x1"}]"#,
        )
        .unwrap();
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::Other("system".into()));

        let back = serde_json::to_value(&turns[2]).unwrap();
        assert_eq!(back["role"], "system");
    }

    #[test]
    fn missing_content_is_rejected() {
        let res = serde_json::from_str::<ConversationTurn>(r#"{"role":"user"}"#);
        assert!(res.is_err());
    }
}
