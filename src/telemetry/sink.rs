//! Transports for framed telemetry messages
//! Location: src/telemetry/sink.rs

use std::io::Write;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "desktop")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[cfg(feature = "zmq")]
    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for framed messages (`"<topic> <payload>"`)
pub trait TelemetrySink {
    fn send(&mut self, topic: &str, message: &str) -> Result<(), SinkError>;

    fn describe(&self) -> String;
}

/// One message per line on any writer (stdout, a file)
pub struct WriterSink<W: Write> {
    writer: W,
    label: String,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), "stdout")
    }
}

impl<W: Write> TelemetrySink for WriterSink<W> {
    fn send(&mut self, _topic: &str, message: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", message)?;
        self.writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("writer ({})", self.label)
    }
}

/// Collects messages in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<(String, String)>>>,
    fail_next: Arc<Mutex<u32>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(topic, message)` pairs received so far
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut m) = self.messages.lock() {
            m.clear();
        }
    }

    /// Make the next `count` sends fail
    pub fn fail_next(&self, count: u32) {
        if let Ok(mut n) = self.fail_next.lock() {
            *n = count;
        }
    }
}

impl TelemetrySink for MemorySink {
    fn send(&mut self, topic: &str, message: &str) -> Result<(), SinkError> {
        if let Ok(mut n) = self.fail_next.lock() {
            if *n > 0 {
                *n -= 1;
                return Err(SinkError::Unavailable("injected failure".to_string()));
            }
        }
        self.messages
            .lock()
            .map_err(|_| SinkError::Unavailable("buffer poisoned".to_string()))?
            .push((topic.to_string(), message.to_string()));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Redis pub/sub publisher; the topic is used as the channel name
#[cfg(feature = "desktop")]
pub struct RedisSink {
    client: redis::Client,
    connection: Option<redis::Connection>,
    url: String,
}

#[cfg(feature = "desktop")]
impl RedisSink {
    /// Validates the URL; the connection is made lazily on first send
    pub fn open(url: &str) -> Result<Self, SinkError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: None,
            url: url.to_string(),
        })
    }
}

#[cfg(feature = "desktop")]
impl TelemetrySink for RedisSink {
    fn send(&mut self, topic: &str, message: &str) -> Result<(), SinkError> {
        use redis::Commands;

        if self.connection.is_none() {
            self.connection = Some(self.client.get_connection()?);
        }
        let Some(connection) = self.connection.as_mut() else {
            return Err(SinkError::Unavailable(self.url.clone()));
        };

        let result: redis::RedisResult<i64> = connection.publish(topic, message);
        if let Err(e) = result {
            // Force a reconnect on the next send
            self.connection = None;
            return Err(e.into());
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("redis ({})", self.url)
    }
}

/// ZeroMQ PUB socket; each framed message goes out as one frame so
/// subscribers can filter on the topic prefix
#[cfg(feature = "zmq")]
pub struct ZmqSink {
    // Keeps the context alive for the socket
    _context: zmq::Context,
    socket: zmq::Socket,
    endpoint: String,
}

#[cfg(feature = "zmq")]
impl ZmqSink {
    /// Bind a PUB socket at `endpoint`, e.g. `tcp://*:5555`
    pub fn bind(endpoint: &str) -> Result<Self, SinkError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        socket.set_linger(0)?;
        socket.bind(endpoint)?;
        tracing::info!(endpoint, "zmq publisher bound");
        Ok(Self {
            _context: context,
            socket,
            endpoint: endpoint.to_string(),
        })
    }
}

#[cfg(feature = "zmq")]
impl TelemetrySink for ZmqSink {
    fn send(&mut self, _topic: &str, message: &str) -> Result<(), SinkError> {
        self.socket.send(message, 0)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("zmq ({})", self.endpoint)
    }
}
