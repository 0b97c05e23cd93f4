//! Transport collaborator interface — inbound messages and outbound replies.
//!
//! The core never talks to a messaging API directly. Webhook handling,
//! delivery receipts, and interactive-message rendering all live with the
//! transport collaborator; the core consumes [`InboundMessage`] values and
//! produces [`Reply`] values.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Kind of inbound message as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Interactive,
    Media,
}

/// One message delivered by the transport collaborator.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_id: String,
    pub text: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    /// Transport-level language hint (e.g. from the device locale), used only
    /// when the user has no stored profile yet.
    pub language_hint: Option<String>,
}

impl InboundMessage {
    pub fn text_now(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            text: text.into(),
            kind: MessageKind::Text,
            timestamp: Utc::now(),
            language_hint: None,
        }
    }
}

/// How the transport should render the structured options of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionStyle {
    /// Plain text, no options.
    None,
    /// Up to three tappable buttons.
    ShortButtons,
    /// A numbered list the user answers by number or text.
    NumberedList,
}

/// A reply produced by the core for the transport to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub options: Vec<String>,
    pub style: OptionStyle,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
            style: OptionStyle::None,
        }
    }

    /// A reply with short button options. More than three options are
    /// rendered as a numbered list instead, matching transport limits.
    pub fn buttons(text: impl Into<String>, options: Vec<String>) -> Self {
        let style = if options.len() <= 3 {
            OptionStyle::ShortButtons
        } else {
            OptionStyle::NumberedList
        };
        Self {
            text: text.into(),
            options,
            style,
        }
    }

    pub fn numbered(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: text.into(),
            options,
            style: OptionStyle::NumberedList,
        }
    }

    /// Flatten the reply to plain text, for transports without interactive
    /// messages and for the message log.
    pub fn render(&self) -> String {
        match self.style {
            OptionStyle::None => self.text.clone(),
            OptionStyle::ShortButtons => {
                let opts: Vec<String> =
                    self.options.iter().map(|o| format!("• {o}")).collect();
                format!("{}\n\n{}", self.text, opts.join("\n"))
            }
            OptionStyle::NumberedList => {
                let opts: Vec<String> = self
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, o)| format!("{}. {o}", i + 1))
                    .collect();
                format!("{}\n\n{}", self.text, opts.join("\n"))
            }
        }
    }
}

/// Outbound side of the transport collaborator.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    async fn send(&self, user_id: &str, reply: Reply) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply_renders_text_only() {
        let reply = Reply::text("Hello!");
        assert_eq!(reply.render(), "Hello!");
    }

    #[test]
    fn buttons_render_with_bullets() {
        let reply = Reply::buttons("Pick one:", vec!["A".into(), "B".into()]);
        assert_eq!(reply.style, OptionStyle::ShortButtons);
        assert_eq!(reply.render(), "Pick one:\n\n• A\n• B");
    }

    #[test]
    fn more_than_three_buttons_degrade_to_numbered_list() {
        let reply = Reply::buttons(
            "Pick one:",
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
        );
        assert_eq!(reply.style, OptionStyle::NumberedList);
        assert!(reply.render().contains("4. D"));
    }

    #[test]
    fn numbered_list_renders_indices() {
        let reply = Reply::numbered("Choose:", vec!["x".into(), "y".into()]);
        assert_eq!(reply.render(), "Choose:\n\n1. x\n2. y");
    }
}
