use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsvpState {
    Joined,
    NotJoined,
    Full,
}

impl RsvpState {
    pub fn resolve(joined: bool, full: bool) -> Self {
        match (joined, full) {
            (true, _) => RsvpState::Joined,
            (false, true) => RsvpState::Full,
            (false, false) => RsvpState::NotJoined,
        }
    }
}
