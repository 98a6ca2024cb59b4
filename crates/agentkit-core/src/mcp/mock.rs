//! Scriptable discovery for tests

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::{McpError, McpResult};
use super::descriptor::ServerDescriptor;
use super::discovery::ToolDiscovery;
use crate::tools::SharedTool;

/// What a single `discover` call does
#[derive(Clone)]
pub enum MockBehaviour {
    Tools(Vec<SharedTool>),
    /// Return the tools after a delay
    Delayed(Duration, Vec<SharedTool>),
    Fail(String),
    /// Never complete
    Hang,
    /// Wait on a task parked in the blocking pool (slow DNS, file I/O)
    Blocking(Duration),
    Panic(String),
}

/// A [`ToolDiscovery`] that replays scripted behaviours
///
/// Each call consumes the next queued behaviour; the last one repeats.
pub struct MockDiscovery {
    script: Mutex<VecDeque<MockBehaviour>>,
    calls: AtomicUsize,
    last_servers: Mutex<Vec<String>>,
}

impl MockDiscovery {
    pub fn new(behaviour: MockBehaviour) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([behaviour])),
            calls: AtomicUsize::new(0),
            last_servers: Mutex::new(Vec::new()),
        }
    }

    pub fn tools(tools: Vec<SharedTool>) -> Self {
        Self::new(MockBehaviour::Tools(tools))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehaviour::Fail(message.into()))
    }

    pub fn hanging() -> Self {
        Self::new(MockBehaviour::Hang)
    }

    pub fn blocking(duration: Duration) -> Self {
        Self::new(MockBehaviour::Blocking(duration))
    }

    pub fn panicking(message: impl Into<String>) -> Self {
        Self::new(MockBehaviour::Panic(message.into()))
    }

    /// Queue the behaviour for the following call
    pub fn then(self, behaviour: MockBehaviour) -> Self {
        self.script.lock().push_back(behaviour);
        self
    }

    /// Number of `discover` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Server names passed to the most recent call
    pub fn last_servers(&self) -> Vec<String> {
        self.last_servers.lock().clone()
    }

    fn next_behaviour(&self) -> Option<MockBehaviour> {
        let mut script = self.script.lock();
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl ToolDiscovery for MockDiscovery {
    async fn discover(&self, servers: &BTreeMap<String, ServerDescriptor>) -> McpResult<Vec<SharedTool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_servers.lock() = servers.keys().cloned().collect();

        match self.next_behaviour() {
            Some(MockBehaviour::Tools(tools)) => Ok(tools),
            Some(MockBehaviour::Delayed(delay, tools)) => {
                tokio::time::sleep(delay).await;
                Ok(tools)
            }
            Some(MockBehaviour::Fail(message)) => Err(McpError::Protocol(message)),
            Some(MockBehaviour::Hang) => futures::future::pending().await,
            Some(MockBehaviour::Blocking(duration)) => {
                tokio::task::spawn_blocking(move || std::thread::sleep(duration))
                    .await
                    .map_err(|e| McpError::Protocol(e.to_string()))?;
                Ok(Vec::new())
            }
            Some(MockBehaviour::Panic(message)) => panic!("{}", message),
            None => Ok(Vec::new()),
        }
    }
}
