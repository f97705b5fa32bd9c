#![forbid(unsafe_code)]

use chatreplay_core::{ChatEvent, RecordError, RecordParser};

use crate::schema::{ChatItem, Message, MessageRenderer, OffsetValue, ReplayLine, Run};

const ROOT_KEY: &str = "replayChatItemAction";

/// Parser for YouTube live chat replay lines.
///
/// Accepts plain text messages and Super Chats. Super Chat text is prefixed
/// with the purchase amount in brackets. Every other item kind is reported as
/// [`RecordError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveChatParser;

impl LiveChatParser {
    /// Cheap probe used for format auto-detection.
    #[must_use]
    pub fn looks_like(line: &str) -> bool {
        line.contains(ROOT_KEY)
    }
}

impl RecordParser for LiveChatParser {
    fn name(&self) -> &'static str {
        "live-chat"
    }

    fn parse_record(&self, line: &str) -> Result<ChatEvent, RecordError> {
        let parsed: ReplayLine = serde_json::from_str(line)?;
        let action = parsed
            .replay_chat_item_action
            .ok_or(RecordError::missing(ROOT_KEY))?;

        let offset_ms = parse_offset(
            action
                .video_offset_time_msec
                .as_ref()
                .ok_or(RecordError::missing("videoOffsetTimeMsec"))?,
        )?;

        let first = action
            .actions
            .into_iter()
            .next()
            .ok_or(RecordError::missing("actions"))?;
        let Some(add) = first.add_chat_item_action else {
            return Err(unsupported(first.other.keys().next()));
        };

        let (renderer, paid) = pick_renderer(add.item)?;
        build_event(offset_ms, renderer, paid)
    }
}

fn pick_renderer(item: ChatItem) -> Result<(MessageRenderer, bool), RecordError> {
    if let Some(text) = item.live_chat_text_message_renderer {
        return Ok((text, false));
    }
    if let Some(paid) = item.live_chat_paid_message_renderer {
        return Ok((paid, true));
    }
    Err(unsupported(item.other.keys().next()))
}

fn build_event(
    offset_ms: u64,
    renderer: MessageRenderer,
    paid: bool,
) -> Result<ChatEvent, RecordError> {
    let author = renderer
        .author_name
        .ok_or(RecordError::missing("authorName"))?
        .simple_text;

    let body = match renderer.message {
        Some(message) => join_runs(&message),
        None if paid => String::new(),
        None => return Err(RecordError::missing("message")),
    };

    let text = match renderer.purchase_amount_text {
        Some(amount) if paid && body.is_empty() => format!("[{}]", amount.simple_text),
        Some(amount) if paid => format!("[{}] {body}", amount.simple_text),
        _ => body,
    };

    let avatar_url = renderer
        .author_photo
        .and_then(|photo| photo.thumbnails.into_iter().next())
        .map(|thumb| thumb.url)
        .unwrap_or_default();

    Ok(ChatEvent {
        offset_ms,
        author,
        text,
        avatar_url,
    })
}

fn join_runs(message: &Message) -> String {
    message.runs.iter().map(run_text).collect()
}

fn run_text(run: &Run) -> &str {
    if let Some(text) = &run.text {
        return text;
    }
    match &run.emoji {
        Some(emoji) => emoji
            .shortcuts
            .first()
            .or(emoji.emoji_id.as_ref())
            .map_or("", String::as_str),
        None => "",
    }
}

/// Pre-stream chat carries negative offsets; those clamp to the start.
fn parse_offset(raw: &OffsetValue) -> Result<u64, RecordError> {
    let value = match raw {
        OffsetValue::Number(n) => *n,
        OffsetValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::InvalidOffset { raw: s.clone() })?,
    };
    Ok(u64::try_from(value).unwrap_or(0))
}

fn unsupported(kind: Option<&String>) -> RecordError {
    RecordError::Unsupported {
        kind: kind.cloned().unwrap_or_else(|| "empty".to_string()),
    }
}
