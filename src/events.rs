/*
 * @file events.rs
 * @brief Assistant event records and rendering
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Assistant event records.
//!
//! Events arrive as JSON objects of the form
//! `{"type": "ON_RECOGNIZING_SPEECH_FINISHED", "args": {"text": "reboot"}}`.
//! Event types the daemon does not react to are still decoded so they can
//! be printed to the event log.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of an assistant event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Assistant finished starting and is ready for the hotword.
    StartFinished,
    /// Hotword heard, a conversation turn began.
    ConversationTurnStarted,
    /// Turn ended before any speech was recognized.
    ConversationTurnTimeout,
    /// User stopped speaking.
    EndOfUtterance,
    /// Final transcript; `args.text` holds the speech.
    RecognizingSpeechFinished,
    /// Assistant started speaking its reply.
    RespondingStarted,
    /// Assistant finished speaking its reply.
    RespondingFinished,
    /// Turn produced no reply.
    NoResponse,
    /// Turn is over; `args.with_follow_on_turn` says whether another follows.
    ConversationTurnFinished,
    /// Alarm or timer started sounding.
    AlertStarted,
    /// Alarm or timer stopped sounding.
    AlertFinished,
    /// Assistant reported an internal error.
    AssistantError,
    /// Microphone mute state changed.
    MutedChanged,
    /// Device action requested for this model.
    DeviceAction,
    /// Text or other rendered response.
    RenderResponse,
    /// Media track loaded.
    MediaTrackLoad,
    /// Media track playing.
    MediaTrackPlay,
    /// Media track stopped.
    MediaTrackStop,
    /// Media player became idle.
    MediaStateIdle,
    /// Media player failed.
    MediaStateError,
    /// Any type name this build does not know about.
    Other(String),
}

/// Wire names of every known event type.
const EVENT_NAMES: &[(&str, EventType)] = &[
    ("ON_START_FINISHED", EventType::StartFinished),
    ("ON_CONVERSATION_TURN_STARTED", EventType::ConversationTurnStarted),
    ("ON_CONVERSATION_TURN_TIMEOUT", EventType::ConversationTurnTimeout),
    ("ON_END_OF_UTTERANCE", EventType::EndOfUtterance),
    ("ON_RECOGNIZING_SPEECH_FINISHED", EventType::RecognizingSpeechFinished),
    ("ON_RESPONDING_STARTED", EventType::RespondingStarted),
    ("ON_RESPONDING_FINISHED", EventType::RespondingFinished),
    ("ON_NO_RESPONSE", EventType::NoResponse),
    ("ON_CONVERSATION_TURN_FINISHED", EventType::ConversationTurnFinished),
    ("ON_ALERT_STARTED", EventType::AlertStarted),
    ("ON_ALERT_FINISHED", EventType::AlertFinished),
    ("ON_ASSISTANT_ERROR", EventType::AssistantError),
    ("ON_MUTED_CHANGED", EventType::MutedChanged),
    ("ON_DEVICE_ACTION", EventType::DeviceAction),
    ("ON_RENDER_RESPONSE", EventType::RenderResponse),
    ("ON_MEDIA_TRACK_LOAD", EventType::MediaTrackLoad),
    ("ON_MEDIA_TRACK_PLAY", EventType::MediaTrackPlay),
    ("ON_MEDIA_TRACK_STOP", EventType::MediaTrackStop),
    ("ON_MEDIA_STATE_IDLE", EventType::MediaStateIdle),
    ("ON_MEDIA_STATE_ERROR", EventType::MediaStateError),
];

impl EventType {
    /// Wire name, e.g. `ON_START_FINISHED`.
    pub fn name(&self) -> &str {
        if let Self::Other(name) = self {
            return name;
        }
        EVENT_NAMES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        EVENT_NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, kind)| kind.clone())
            .unwrap_or(Self::Other(name))
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One event emitted by the assistant session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event kind, the `type` field on the wire.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Event arguments, absent for most lifecycle events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
}

impl Event {
    /// Creates an event without arguments.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            args: None,
        }
    }

    /// Creates an event carrying `args`.
    pub fn with_args(event_type: EventType, args: Map<String, Value>) -> Self {
        Self {
            event_type,
            args: Some(args),
        }
    }

    /// Whether the event carries at least one argument.
    pub fn has_args(&self) -> bool {
        self.args.as_ref().is_some_and(|args| !args.is_empty())
    }

    /// Looks up a single argument.
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.as_ref()?.get(key)
    }

    /// Recognized speech text, present on `ON_RECOGNIZING_SPEECH_FINISHED`.
    pub fn text(&self) -> Option<&str> {
        self.arg("text")?.as_str()
    }

    /// Whether the assistant expects another utterance in this conversation.
    ///
    /// A missing flag reads as `false`.
    pub fn with_follow_on_turn(&self) -> bool {
        self.arg("with_follow_on_turn")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Human-readable rendering used by the event log.
///
/// Prints the type name, then the arguments as indented JSON when present.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event_type)?;
        if let Some(args) = self.args.as_ref().filter(|args| !args.is_empty()) {
            let pretty = serde_json::to_string_pretty(args).map_err(|_| fmt::Error)?;
            write!(f, ":\n{pretty}")?;
        }
        Ok(())
    }
}
