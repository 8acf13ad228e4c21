//! Note entity and request types.

use std::collections::HashSet;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A persisted note.
///
/// Serialized with camelCase keys and ISO-8601 millisecond timestamps, the
/// same shape on the wire and in the JSON file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a fresh note from a validated create request.
    ///
    /// Allocates a v4 id and sets both timestamps to the same instant.
    pub fn new(req: CreateNoteRequest) -> Result<Self> {
        req.validate()?;
        let now = now_millis();
        Ok(Self {
            id: Uuid::new_v4(),
            title: req.title,
            content: req.content,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge a partial update into this note.
    ///
    /// Only supplied fields are replaced. `updated_at` always moves forward,
    /// by at least one millisecond, so it stays strictly after the previous
    /// value even when two writes land in the same clock tick.
    pub fn apply_update(&mut self, req: &UpdateNoteRequest, now: DateTime<Utc>) -> Result<()> {
        req.validate()?;
        if let Some(title) = &req.title {
            self.title.clone_from(title);
        }
        if let Some(content) = &req.content {
            self.content.clone_from(content);
        }
        let floor = self.updated_at + Duration::milliseconds(1);
        self.updated_at = if now > floor { now } else { floor };
        Ok(())
    }
}

/// Request for creating a new note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

impl CreateNoteRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Both fields must be present and non-blank.
    pub fn validate(&self) -> Result<()> {
        if is_blank(&self.title) || is_blank(&self.content) {
            return Err(Error::Validation(
                "Title and content are required to create a note".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request for a partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    /// True when neither field is supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// A supplied field must not be blank.
    pub fn validate(&self) -> Result<()> {
        if self.title.as_deref().is_some_and(is_blank) {
            return Err(Error::Validation("Title must not be empty".to_string()));
        }
        if self.content.as_deref().is_some_and(is_blank) {
            return Err(Error::Validation("Content must not be empty".to_string()));
        }
        Ok(())
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Current UTC time truncated to millisecond precision.
///
/// Stores persist milliseconds at most (ISO text) or microseconds
/// (`TIMESTAMPTZ`), so truncating here keeps every backend round-trip exact.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Canonical listing order: most recently updated first.
///
/// Ties fall back to creation time, then id, so the order is total.
pub fn sort_by_recency(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Reject a note set in which two notes share an id.
pub fn ensure_unique_ids(notes: &[Note]) -> Result<()> {
    let mut seen = HashSet::with_capacity(notes.len());
    for note in notes {
        if !seen.insert(note.id) {
            return Err(duplicate_id(note.id));
        }
    }
    Ok(())
}

/// Error for an insert whose id is already taken.
pub fn duplicate_id(id: Uuid) -> Error {
    Error::Conflict(format!("Note {} already exists", id))
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix,
/// e.g. `2024-05-01T12:30:00.250Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Note {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        Note {
            id: Uuid::nil(),
            title: "Groceries".to_string(),
            content: "milk, eggs".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_new_note_has_equal_timestamps() {
        let note = Note::new(CreateNoteRequest::new("A", "B")).unwrap();
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
        assert_eq!(note.id.get_version_num(), 4);
    }

    #[test]
    fn test_new_note_rejects_empty_fields() {
        for (title, content) in [("", "B"), ("A", ""), ("   ", "B"), ("A", "\n\t")] {
            let err = Note::new(CreateNoteRequest::new(title, content)).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{title:?}/{content:?}");
        }
    }

    #[test]
    fn test_apply_update_title_only() {
        let mut note = sample_note();
        let later = note.created_at + Duration::seconds(5);
        note.apply_update(
            &UpdateNoteRequest {
                title: Some("Shopping".to_string()),
                content: None,
            },
            later,
        )
        .unwrap();

        assert_eq!(note.title, "Shopping");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(note.updated_at, later);
        assert_eq!(note.id, Uuid::nil());
    }

    #[test]
    fn test_apply_update_advances_even_with_stale_clock() {
        let mut note = sample_note();
        let created = note.created_at;
        note.apply_update(&UpdateNoteRequest::default(), created).unwrap();
        assert!(note.updated_at > created);
        assert_eq!(note.created_at, created);
    }

    #[test]
    fn test_apply_update_rejects_blank_field() {
        let mut note = sample_note();
        let err = note
            .apply_update(
                &UpdateNoteRequest {
                    title: None,
                    content: Some("  ".to_string()),
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(note.content, "milk, eggs");
    }

    #[test]
    fn test_ensure_unique_ids() {
        let a = sample_note();
        let mut b = sample_note();
        b.id = Uuid::new_v4();
        assert!(ensure_unique_ids(&[a.clone(), b]).is_ok());
        assert!(ensure_unique_ids(&[]).is_ok());

        let err = ensure_unique_ids(&[a.clone(), a]).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_update_request_is_empty() {
        assert!(UpdateNoteRequest::default().is_empty());
        let req: UpdateNoteRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(!req.is_empty());
        assert!(req.content.is_none());
    }

    #[test]
    fn test_note_serializes_camel_case_with_millis() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T12:30:00.000Z");
        assert_eq!(json["updatedAt"], "2024-05-01T12:30:00.000Z");
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_note_accepts_offset_timestamps() {
        let raw = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "title": "t",
            "content": "c",
            "createdAt": "2024-05-01T14:30:00.000+02:00",
            "updatedAt": "2024-05-01T12:30:00Z"
        }"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.created_at, sample_note().created_at);
        assert_eq!(note.updated_at, sample_note().updated_at);
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_sort_by_recency() {
        let base = sample_note();
        let mut older = base.clone();
        older.id = Uuid::new_v4();
        let mut newer = base.clone();
        newer.id = Uuid::new_v4();
        newer.updated_at = base.updated_at + Duration::minutes(1);

        let mut notes = vec![older.clone(), newer.clone()];
        sort_by_recency(&mut notes);
        assert_eq!(notes[0].id, newer.id);
        assert_eq!(notes[1].id, older.id);
    }
}
