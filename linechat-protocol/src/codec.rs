/// Codec for the newline-delimited JSON chat protocol
use crate::{model::Message, Error};
use tokio_util::{
    bytes::{Bytes, BytesMut},
    codec::{Decoder, Encoder, LinesCodec},
};
use tracing::{debug, warn};

// 640k ought to be enough for anyone
const MAX_LENGTH: usize = 1024 * 640;

/// Codec turning a raw byte stream into [`Message`] frames and back.
///
/// The codec owns no buffer of its own: the `BytesMut` handed to
/// `decode` carries the undecoded remainder between calls, so each
/// connection keeps its trailing partial frame across arbitrarily
/// chunked TCP reads. A complete frame whose payload fails to parse is
/// logged and skipped; frames after it in the same buffer still come
/// through.
#[derive(Debug)]
pub struct MessageCodec {
    inner: LinesCodec,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(MAX_LENGTH),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(line) = self.inner.decode(src)? {
            match parse(&line) {
                Ok(message) => return Ok(Some(message)),
                Err(err) => warn!(frame = %line, %err, "discarding malformed frame"),
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }
        // The inner codec hands back any unterminated tail as a final
        // line; the peer is gone, so drop it rather than parse it
        while let Some(tail) = self.inner.decode_eof(src)? {
            debug!(len = tail.len(), "discarding partial frame at end of stream");
        }
        Ok(None)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // serde_json escapes control characters, so the payload cannot
        // contain a raw newline; the inner codec appends the delimiter
        let payload = serde_json::to_string(&message)?;
        self.inner.encode(payload, dst)?;
        Ok(())
    }
}

/// Parses one frame's payload into a [`Message`].
///
/// Any syntactic or schema violation, unknown `type` included, is an
/// [`Error::InvalidFrame`]. Callers log and discard; a bad frame never
/// tears down the connection it was read from.
pub fn parse(frame: &str) -> Result<Message, Error> {
    Ok(serde_json::from_str(frame)?)
}

/// Encodes one message into a single frozen wire frame.
///
/// The server encodes each broadcast exactly once with this and hands
/// the same bytes to every registered connection.
pub fn encode_frame(message: Message) -> Result<Bytes, Error> {
    let mut buf = BytesMut::new();
    MessageCodec::default().encode(message, &mut buf)?;
    Ok(buf.freeze())
}
