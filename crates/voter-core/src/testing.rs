//! Scripted transport and recording sleeper for unit tests.

use crate::cancel::{Cancelled, Sleeper};
use crate::transport::{HttpRequest, Transport, TransportError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

type Reply = Result<Vec<u8>, u32>;

/// Replies per URL in order; the last reply for a URL repeats forever.
/// `Err(code)` replies become `TransportError::Http(code)`.
#[derive(Default)]
pub(crate) struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(body.as_bytes().to_vec()))
    }

    pub(crate) fn fail(self, url: &str, code: u32) -> Self {
        self.push(url, Err(code))
    }

    fn push(self, url: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_to(&self, url: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|r| r.url == url).count()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<Vec<u8>, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        let queue = replies
            .get_mut(&request.url)
            .unwrap_or_else(|| panic!("no scripted reply for {}", request.url));
        let reply = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };
        reply.map_err(TransportError::Http)
    }
}

/// Records requested sleeps without waiting; cancels once `budget` sleeps are used.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
    budget: Option<usize>,
}

impl RecordingSleeper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel_after(budget: usize) -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
            budget: Some(budget),
        }
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let mut sleeps = self.sleeps.lock().unwrap();
        if self.budget.is_some_and(|b| sleeps.len() >= b) {
            return Err(Cancelled);
        }
        sleeps.push(duration);
        Ok(())
    }
}
