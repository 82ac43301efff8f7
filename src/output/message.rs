//! Sync messages and the sinks that receive them

use crate::error::Result;
use crate::schema::JsonSchema;
use crate::state::State;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One unit of sync output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// Declares the shape of a stream before its first record
    Schema {
        stream: String,
        schema: JsonSchema,
        key_properties: Vec<String>,
        #[serde(default)]
        bookmark_properties: Vec<String>,
    },

    /// One record of a stream
    Record {
        stream: String,
        record: JsonObject,
        time_extracted: DateTime<Utc>,
    },

    /// Full sync state after a commit
    State { value: State },
}

impl Message {
    /// Stream the message belongs to (`None` for STATE)
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }
}

/// Destination of sync messages
pub trait RecordSink: Send {
    /// Handle one message
    fn write(&mut self, message: &Message) -> Result<()>;

    /// Make everything written so far durable.
    ///
    /// Called after each STATE message and before that state is saved, so a
    /// saved bookmark never points past records the sink could still lose.
    fn checkpoint(&mut self) -> Result<()> {
        Ok(())
    }

    /// Flush buffered output; called once at the end of a successful run
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    fn write(&mut self, message: &Message) -> Result<()> {
        (**self).write(message)
    }

    fn checkpoint(&mut self) -> Result<()> {
        (**self).checkpoint()
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

// ============================================================================
// JSON Lines
// ============================================================================

/// Writes each message as one JSON line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
    lines: u64,
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.lines += 1;

        // downstream consumers act on STATE, so it must not sit in a buffer
        if matches!(message, Message::State { .. }) {
            self.out.flush()?;
        }
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

// ============================================================================
// Memory
// ============================================================================

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Vec<Message>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in emission order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records emitted for one stream
    pub fn records(&self, stream: &str) -> Vec<&JsonObject> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record { stream: s, record, .. } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Streams a SCHEMA message was emitted for, in order
    pub fn schema_streams(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Schema { stream, .. } => Some(stream.as_str()),
                _ => None,
            })
            .collect()
    }

    /// State values emitted, in order
    pub fn states(&self) -> Vec<&State> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, message: &Message) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
