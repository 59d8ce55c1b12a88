use chrono::{NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A game meetup as cached on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub game_type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub max_participants: i32,
    pub creator_id: String,
    /// Whether the last write of this row reached the backend.
    pub is_synced: bool,
}

/// The user-editable part of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub game_type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub max_participants: i32,
}

impl Event {
    pub fn new(draft: EventDraft, creator_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            game_type: draft.game_type,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            max_participants: draft.max_participants,
            creator_id: creator_id.into(),
            is_synced: false,
        }
    }

    /// Applies edited fields, keeping id and creator.
    pub fn with_draft(&self, draft: EventDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            game_type: draft.game_type,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            max_participants: draft.max_participants,
            is_synced: false,
            ..self.clone()
        }
    }

    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            game_type: self.game_type.clone(),
            date: self.date,
            time: self.time,
            location: self.location.clone(),
            max_participants: self.max_participants,
        }
    }

    /// Zero capacity means the event takes anyone.
    pub fn is_full(&self, participants: i64) -> bool {
        self.max_participants > 0 && participants >= i64::from(self.max_participants)
    }

    pub fn share_text(&self) -> String {
        format!(
            "You're invited to a game meetup!\n\n\
             Title: {}\n\
             Game: {}\n\
             When: {} at {}\n\
             Where: {}\n\n\
             Description: {}\n\n\
             Get Ludico for more details!",
            self.title,
            self.game_type,
            self.date.format("%A, %-d %B %Y"),
            self.time.format("%H:%M"),
            self.location,
            self.description,
        )
    }
}

/// JSON shape the backend exchanges for events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub event_id: Uuid,
    pub title: String,
    pub description: String,
    pub game_type: String,
    #[serde(deserialize_with = "wire_date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "wire_time")]
    pub time: NaiveTime,
    pub location: String,
    pub max_participants: i32,
    pub creator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&Event> for EventDto {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            game_type: event.game_type.clone(),
            date: event.date,
            time: event.time,
            location: event.location.clone(),
            max_participants: event.max_participants,
            creator_id: event.creator_id.clone(),
            created_at: None,
        }
    }
}

impl EventDto {
    /// Rows coming from the backend are by definition in sync.
    pub fn into_synced(self) -> Event {
        Event {
            id: self.event_id,
            title: self.title,
            description: self.description,
            game_type: self.game_type,
            date: self.date,
            time: self.time,
            location: self.location,
            max_participants: self.max_participants,
            creator_id: self.creator_id,
            is_synced: true,
        }
    }
}

/// Dates are written as `YYYY-MM-DD`. Older app builds sent the form text
/// as `d/M/yyyy`, and such rows are still on the backend.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// `HH:MM`, with optional seconds.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    raw.parse::<NaiveTime>()
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn wire_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| de::Error::custom(format!("unrecognised date '{}'", raw)))
}

fn wire_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).ok_or_else(|| de::Error::custom(format!("unrecognised time '{}'", raw)))
}
