#![forbid(unsafe_code)]

//! YouTube live chat replay parsing.
//!
//! Live chat exports (`*.live_chat.json`, as written by common downloaders)
//! are newline-delimited JSON where each line wraps one chat action:
//!
//! ```json
//! {"replayChatItemAction": {"actions": [{"addChatItemAction": {"item": {
//!     "liveChatTextMessageRenderer": {
//!         "message": {"runs": [{"text": "hello"}]},
//!         "authorName": {"simpleText": "ann"},
//!         "authorPhoto": {"thumbnails": [{"url": "https://..."}]}
//!     }}}}], "videoOffsetTimeMsec": "12345"}}
//! ```
//!
//! [`LiveChatParser`] turns text messages and Super Chats into
//! [`ChatEvent`](chatreplay_core::ChatEvent)s and reports everything else
//! (memberships, tickers, banners) as unsupported so the loader can skip it.
//!
//! # Example
//!
//! ```
//! use chatreplay_core::{EventStore, OrderPolicy};
//! use chatreplay_livechat::LiveChatParser;
//!
//! let raw = r#"{"replayChatItemAction":{"actions":[{"addChatItemAction":{"item":{"liveChatTextMessageRenderer":{"message":{"runs":[{"text":"hi"}]},"authorName":{"simpleText":"ann"}}}}}],"videoOffsetTimeMsec":"1500"}}"#;
//! let (store, report) = EventStore::load(raw, &LiveChatParser, OrderPolicy::Sort).unwrap();
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.max_offset_ms(), 1_500);
//! assert_eq!(report.parser, "live-chat");
//! ```

mod parser;
mod schema;

pub use parser::LiveChatParser;
