#![forbid(unsafe_code)]

//! Serde mirror of the parts of a live chat replay line we read.
//!
//! Only the fields needed to build a chat event are modelled; everything
//! else is ignored. Unmodelled action and item kinds are kept as raw maps so
//! the parser can name them in diagnostics.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One line of a `live_chat.json` export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplayLine {
    pub replay_chat_item_action: Option<ReplayChatItemAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplayChatItemAction {
    #[serde(default)]
    pub actions: Vec<ChatAction>,
    pub video_offset_time_msec: Option<OffsetValue>,
}

/// The offset is a decimal string in real exports; numbers are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OffsetValue {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatAction {
    pub add_chat_item_action: Option<AddChatItemAction>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddChatItemAction {
    pub item: ChatItem,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatItem {
    pub live_chat_text_message_renderer: Option<MessageRenderer>,
    pub live_chat_paid_message_renderer: Option<MessageRenderer>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageRenderer {
    pub message: Option<Message>,
    pub author_name: Option<SimpleText>,
    pub author_photo: Option<Thumbnails>,
    pub purchase_amount_text: Option<SimpleText>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    #[serde(default)]
    pub runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Run {
    pub text: Option<String>,
    pub emoji: Option<Emoji>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Emoji {
    #[serde(default)]
    pub shortcuts: Vec<String>,
    pub emoji_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SimpleText {
    pub simple_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}
