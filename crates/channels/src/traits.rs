use adjutant_core::CoreError;
use async_trait::async_trait;

/// One connected input/output session.
///
/// `next_line` suspends only the owning session's task. A send failure
/// means the peer is gone; the router logs and drops the result, never
/// retries.
#[async_trait]
pub trait Channel: Send {
    /// Stable identifier used in logs and request records.
    fn name(&self) -> &str;

    /// Next input line, `None` on end of stream.
    async fn next_line(&mut self) -> Option<String>;

    async fn send(&mut self, text: &str) -> Result<(), CoreError>;
}
