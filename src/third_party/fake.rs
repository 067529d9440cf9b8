//! 测试用的脚本化传输层：按 url 排队预设响应，并记录每一次请求。

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::http::AudioTransport;
use crate::error::TransportError;

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Body(u16, Vec<u8>),
    Fail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Head,
    GetStatus,
    Get,
}

#[derive(Default)]
pub struct FakeTransport {
    head: Mutex<HashMap<String, VecDeque<Reply>>>,
    get: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<(Method, String)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 队列只剩最后一个响应时会一直重复它。
    pub fn on_head(&self, url: &str, reply: Reply) -> &Self {
        push(&self.head, url, reply);
        self
    }

    pub fn on_get(&self, url: &str, reply: Reply) -> &Self {
        push(&self.get, url, reply);
        self
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|(m, u)| *m == method && u == url)
            .count()
    }

    fn next(&self, table: &Mutex<HashMap<String, VecDeque<Reply>>>, url: &str) -> Reply {
        let mut table = table.lock().unwrap();
        match table.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
            None => Reply::Status(404),
        }
    }

    fn record(&self, method: Method, url: &str) {
        self.log.lock().unwrap().push((method, url.to_string()));
    }
}

fn push(table: &Mutex<HashMap<String, VecDeque<Reply>>>, url: &str, reply: Reply) {
    table
        .lock()
        .unwrap()
        .entry(url.to_string())
        .or_default()
        .push_back(reply);
}

impl AudioTransport for FakeTransport {
    fn head_status(&self, url: &str) -> Result<u16, TransportError> {
        self.record(Method::Head, url);
        match self.next(&self.head, url) {
            Reply::Status(s) | Reply::Body(s, _) => Ok(s),
            Reply::Fail(msg) => Err(TransportError::Request(msg)),
        }
    }

    fn get_status(&self, url: &str) -> Result<u16, TransportError> {
        self.record(Method::GetStatus, url);
        match self.next(&self.get, url) {
            Reply::Status(s) | Reply::Body(s, _) => Ok(s),
            Reply::Fail(msg) => Err(TransportError::Request(msg)),
        }
    }

    fn get_body(&self, url: &str) -> Result<(u16, Vec<u8>), TransportError> {
        self.record(Method::Get, url);
        match self.next(&self.get, url) {
            Reply::Status(s) => Ok((s, Vec::new())),
            Reply::Body(s, body) => Ok((s, body)),
            Reply::Fail(msg) => Err(TransportError::Request(msg)),
        }
    }
}
