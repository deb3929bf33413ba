//! Recording fake transport for fetcher tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::SourceError;
use crate::transport::{JsonTransport, Query};

type Responder = dyn Fn(&Query) -> Result<Value, SourceError> + Send + Sync;

/// Answers every request with `respond` and remembers each query.
pub struct RecordingTransport {
    respond: Box<Responder>,
    requests: Mutex<Vec<Query>>,
}

impl RecordingTransport {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&Query) -> Result<Value, SourceError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Query> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonTransport for RecordingTransport {
    async fn get_json(&self, _url: &str, query: &Query) -> Result<Value, SourceError> {
        self.requests.lock().unwrap().push(query.clone());
        (self.respond)(query)
    }
}

/// Value of the first query parameter called `name`.
pub fn param(query: &Query, name: &str) -> Option<String> {
    query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}
