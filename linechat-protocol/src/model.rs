/// Model definition for messages exchanged between server and clients
use serde::{Deserialize, Serialize};

/// The one wire-level entity, tagged by its `type` field.
///
/// Clients only ever send `Msg`; the server sends all three variants.
/// That constraint is a broadcast policy enforced by the server's read
/// loop, not by the type itself.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Sent once to a freshly accepted connection, carrying its id
    Joined { id: u64 },
    /// Membership change notice, displayed verbatim
    Info { msg: String },
    /// Chat payload; the server prefixes the sender id before relaying
    Msg { msg: String },
}

impl Message {
    pub fn joined(id: u64) -> Self {
        Self::Joined { id }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info { msg: msg.into() }
    }

    pub fn msg(msg: impl Into<String>) -> Self {
        Self::Msg { msg: msg.into() }
    }
}
