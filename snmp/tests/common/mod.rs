/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use snmp_client::{
    Error, Message, Oid, Pdu, PduBody, Result, Transport, VarBind,
};

pub fn oid(s: &str) -> Oid {
    s.parse().unwrap()
}

pub fn response_frame(
    community: &[u8],
    request_id: i32,
    varbinds: Vec<VarBind>,
) -> Vec<u8> {
    error_frame(community, request_id, 0, 0, varbinds)
}

pub fn error_frame(
    community: &[u8],
    request_id: i32,
    error_status: u32,
    error_index: u32,
    varbinds: Vec<VarBind>,
) -> Vec<u8> {
    Message::v2c(
        community,
        Pdu::Response(PduBody {
            request_id,
            error_status,
            error_index,
            varbinds,
        }),
    )
    .to_bytes()
}

pub enum Reply {
    Frame(Vec<u8>),
    Timeout,
}

struct ReplayInner {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Vec<u8>>>,
}

/// A transport replaying canned reply frames, one per request, and
/// recording the requests it has seen. Clones share state so a test
/// can keep a handle after giving one to the client.
#[derive(Clone)]
pub struct Replay(Arc<ReplayInner>);

impl Replay {
    pub fn new(replies: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self::from_replies(replies.into_iter().map(Reply::Frame).collect())
    }

    pub fn from_replies(replies: Vec<Reply>) -> Self {
        Self(Arc::new(ReplayInner {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }))
    }

    pub fn request_count(&self) -> usize {
        self.0.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.0.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for Replay {
    async fn send(
        &self,
        _host: &str,
        _port: u16,
        msg: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        self.0.requests.lock().push(msg.to_vec());
        match self.0.replies.lock().pop_front() {
            Some(Reply::Frame(frame)) => Ok(frame),
            Some(Reply::Timeout) | None => Err(Error::Timeout(timeout)),
        }
    }
}

/// Captures emitted log records so tests can assert on warnings.
pub struct Capture {
    records: Mutex<Vec<(log::Level, String)>>,
}

impl Capture {
    pub fn install() -> &'static Capture {
        static CAPTURE: OnceLock<Capture> = OnceLock::new();
        let capture = CAPTURE.get_or_init(|| Capture {
            records: Mutex::new(Vec::new()),
        });
        let _ = log::set_logger(capture);
        log::set_max_level(log::LevelFilter::Debug);
        capture
    }

    pub fn records(&self) -> Vec<(log::Level, String)> {
        self.records.lock().clone()
    }
}

impl log::Log for Capture {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.records
            .lock()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
