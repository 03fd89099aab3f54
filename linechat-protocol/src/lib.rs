/// Protocol definitions for the linechat server and client
///
/// Defines the wire protocol shared by the chat server and client: UTF-8
/// JSON objects delimited by a single newline, e.g.
///
/// ```ignore
/// {"type":"msg","msg":"hello"}\n
/// ```
///
/// Where `type` is one of `joined`, `info`, or `msg`.
use thiserror::Error;

mod codec;
mod model;

pub use codec::{encode_frame, parse, MessageCodec};
pub use model::Message;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("lines parse error: {0}")]
    LinesParseError(#[from] tokio_util::codec::LinesCodecError),

    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),
}
