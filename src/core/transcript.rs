//! # Transcript
//!
//! View-model for the selected chat: header, "first message" subheader and
//! one [`MessageView`] per message. Dates are formatted the Russian way
//! (`1 января 2024 г.`, `01.01.2024, 10:00:00`) in the caller's timezone.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone};

use crate::core::archive::Message;
use crate::core::state::App;
use crate::core::text::{Body, render_content};

/// Direct (one-to-one) chat ids start with this prefix; the rest is the user id.
pub const DIRECT_CHAT_PREFIX: &str = "8:";

const MONTHS_GENITIVE: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub direction: Direction,
    /// Only set for received messages.
    pub sender: Option<String>,
    pub timestamp: String,
    pub body: Option<Body>,
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptView {
    pub chat_id: String,
    pub title: String,
    /// User id of a direct chat, shown next to the title.
    pub user_id: Option<String>,
    /// `First message: …`, empty when the chat has no dated message.
    pub subheader: String,
    pub messages: Vec<MessageView>,
}

/// Long date, e.g. `1 января 2024 г.`
pub fn format_long_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!(
        "{} {} {} г.",
        dt.day(),
        MONTHS_GENITIVE[dt.month0() as usize],
        dt.year()
    )
}

/// Combined date and time, e.g. `01.01.2024, 10:00:00`
pub fn format_date_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    dt.format("%d.%m.%Y, %H:%M:%S").to_string()
}

fn message_view<Tz: TimeZone>(app: &App, message: &Message, tz: &Tz) -> MessageView
where
    Tz::Offset: fmt::Display,
{
    let direction = if app.is_owner(&message.from) {
        Direction::Sent
    } else {
        Direction::Received
    };
    let sender = match direction {
        Direction::Sent => None,
        Direction::Received => Some(app.sender_name(&message.from).to_string()),
    };
    let timestamp = match message.sent_at() {
        Some(dt) => format_date_time(&dt.with_timezone(tz)),
        None => message.timestamp.clone().unwrap_or_default(),
    };

    MessageView {
        direction,
        sender,
        timestamp,
        body: message
            .content
            .as_deref()
            .filter(|content| !content.is_empty())
            .map(render_content),
        attachment: message.media_path.clone(),
    }
}

/// Build the transcript of `chat_id`, or `None` if the chat does not exist.
pub fn transcript<Tz: TimeZone>(app: &App, chat_id: &str, tz: &Tz) -> Option<TranscriptView>
where
    Tz::Offset: fmt::Display,
{
    let messages = app.archive.messages(chat_id)?;

    let subheader = messages
        .first()
        .and_then(Message::sent_at)
        .map(|dt| format!("First message: {}", format_long_date(&dt.with_timezone(tz))))
        .unwrap_or_default();

    Some(TranscriptView {
        chat_id: chat_id.to_string(),
        title: app.effective_name(chat_id).to_string(),
        user_id: chat_id
            .strip_prefix(DIRECT_CHAT_PREFIX)
            .map(str::to_string),
        subheader,
        messages: messages
            .iter()
            .map(|message| message_view(app, message, tz))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archive::Archive;
    use crate::test_support::test_app;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_single_received_message_scenario() {
        let archive = Archive::from_json(
            r#"{"ownerId":"u1","contacts":{"u1":"Me","u2":"Bob"},
                "chats":{"u2":[{"from":"u2","timestamp":"2024-01-01T10:00:00Z","content":"hi"}]}}"#,
        )
        .unwrap();
        let app = App::new(archive);

        let view = transcript(&app, "u2", &Utc).unwrap();
        assert_eq!(view.title, "Bob");
        assert_eq!(view.user_id, None);
        assert_eq!(view.subheader, "First message: 1 января 2024 г.");
        assert_eq!(view.messages.len(), 1);

        let message = &view.messages[0];
        assert_eq!(message.direction, Direction::Received);
        assert_eq!(message.sender.as_deref(), Some("Bob"));
        assert_eq!(message.timestamp, "01.01.2024, 10:00:00");
        assert_eq!(message.body.as_ref().unwrap().plain_lines(), vec!["hi"]);
    }

    #[test]
    fn test_direct_chat_header_carries_user_id() {
        let app = test_app();
        let view = transcript(&app, "8:alice", &Utc).unwrap();
        assert_eq!(view.title, "alice smith");
        assert_eq!(view.user_id.as_deref(), Some("alice"));

        let group = transcript(&app, "19:team@thread.skype", &Utc).unwrap();
        assert_eq!(group.user_id, None);
    }

    #[test]
    fn test_sent_messages_have_no_sender_label() {
        let app = test_app();
        let view = transcript(&app, "8:alice", &Utc).unwrap();
        assert_eq!(view.messages[1].direction, Direction::Sent);
        assert_eq!(view.messages[1].sender, None);
        // Entities decoded through the content pipeline
        assert_eq!(
            view.messages[1].body.as_ref().unwrap().plain_lines(),
            vec!["hello & welcome"]
        );
    }

    #[test]
    fn test_unknown_sender_falls_back_to_id() {
        let app = test_app();
        let view = transcript(&app, "19:team@thread.skype", &Utc).unwrap();
        assert_eq!(view.messages[0].sender.as_deref(), Some("ivan"));
    }

    #[test]
    fn test_attachment_without_content() {
        let app = test_app();
        let view = transcript(&app, "19:team@thread.skype", &Utc).unwrap();
        let message = &view.messages[1];
        assert!(message.body.is_none());
        assert_eq!(message.attachment.as_deref(), Some("media/plan.png"));
    }

    #[test]
    fn test_header_follows_rename() {
        let mut app = test_app();
        app.rename_chat("u2", "Robert");
        let view = transcript(&app, "u2", &Utc).unwrap();
        assert_eq!(view.title, "Robert");
        assert_eq!(view.messages[0].sender.as_deref(), Some("Robert"));
    }

    #[test]
    fn test_timezone_is_applied() {
        let app = test_app();
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let view = transcript(&app, "8:ivan", &moscow).unwrap();
        // 2022-12-31T23:59Z is already New Year in UTC+3
        assert_eq!(view.subheader, "First message: 1 января 2023 г.");
        assert_eq!(view.messages[0].timestamp, "01.01.2023, 02:59:00");
    }

    #[test]
    fn test_empty_chat_has_blank_subheader() {
        let app = test_app();
        let view = transcript(&app, "8:empty", &Utc).unwrap();
        assert!(view.subheader.is_empty());
        assert!(view.messages.is_empty());
    }

    #[test]
    fn test_unparseable_timestamp_shown_raw() {
        let archive = Archive::from_json(
            r#"{"ownerId":"me","chats":{"c":[{"from":"x","timestamp":"sometime","content":"?"}]}}"#,
        )
        .unwrap();
        let app = App::new(archive);
        let view = transcript(&app, "c", &Utc).unwrap();
        assert_eq!(view.messages[0].timestamp, "sometime");
        assert!(view.subheader.is_empty());
    }

    #[test]
    fn test_unknown_chat() {
        let app = test_app();
        assert!(transcript(&app, "nope", &Utc).is_none());
    }

    #[test]
    fn test_format_long_date_months() {
        let dt = Utc.with_ymd_and_hms(2020, 5, 9, 0, 0, 0).unwrap();
        assert_eq!(format_long_date(&dt), "9 мая 2020 г.");
        let dt = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(format_long_date(&dt), "31 декабря 1999 г.");
    }
}
