use crate::assistant::Reply;
use crate::chat::TurnId;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub enum AppEvent {
    ResponseReady { turn: TurnId, reply: Reply },
    ResponseFailed { turn: TurnId, message: String },
    StreamDelta { turn: TurnId, text: String },
    StreamEnd { turn: TurnId },
    PreviewServerStarted(SocketAddr),
    PreviewServerFailed(String),
    PreviewLoaded { revision: u64 },
}
