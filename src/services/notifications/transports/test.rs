use async_trait::async_trait;

use crate::error::NotifyResult;
use crate::models::{Message, RenderedOutput};
use crate::services::notifications::transport::{Transport, TransportDefinition, TransportKind};

/// Records the rendered output on the message instead of sending anything.
/// Succeeds unless the message is flagged to fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestTransport;

#[async_trait]
impl Transport for TestTransport {
    fn definition(&self) -> &'static TransportDefinition {
        TransportKind::Test.definition()
    }

    async fn deliver(&self, rendered: &RenderedOutput, message: &Message) -> NotifyResult<bool> {
        message.record_output(rendered.clone());
        Ok(!message.fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderedContent;

    #[tokio::test]
    async fn test_records_output_and_honours_fail_flag() {
        let mut rendered = RenderedOutput::new();
        rendered.insert("foo", RenderedContent::plain("first"));
        rendered.insert("bar", RenderedContent::plain("second"));

        let message = Message::new("test");
        assert!(TestTransport.deliver(&rendered, &message).await.unwrap());
        assert_eq!(message.output(), Some(rendered.clone()));

        let failing = Message::new("test").failing();
        assert!(!TestTransport.deliver(&rendered, &failing).await.unwrap());
        assert_eq!(failing.output().unwrap().text("bar"), Some("second"));
    }
}
