//! SNS publishing and SQS delivery.
//!
//! Both are fire-and-forget from the caller's perspective: errors are
//! returned, never retried.

use std::env;

use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sqs::Client as SqsClient;
use tracing::info;

use crate::{Error, Result};

/// Environment variable holding the notification topic ARN.
pub const TOPIC_ARN_VAR: &str = "EMAIL_SNS_TOPIC_ARN";

/// Seconds a queued message is held before delivery.
const DELIVERY_DELAY_SECONDS: i32 = 10;

/// SNS publisher bound to one topic.
#[derive(Debug, Clone)]
pub struct Publisher {
    sns: SnsClient,
    topic_arn: String,
}

impl Publisher {
    /// Create a publisher for an explicit topic ARN.
    pub fn new(config: &aws_config::SdkConfig, topic_arn: impl Into<String>) -> Self {
        Self {
            sns: SnsClient::new(config),
            topic_arn: topic_arn.into(),
        }
    }

    /// Create a publisher for the topic named by `EMAIL_SNS_TOPIC_ARN`.
    pub fn from_env(config: &aws_config::SdkConfig) -> Result<Self> {
        let topic_arn = env::var(TOPIC_ARN_VAR)
            .map_err(|_| Error::Config(format!("{} not set", TOPIC_ARN_VAR)))?;
        Ok(Self::new(config, topic_arn))
    }

    /// Publish a message with a subject to the topic.
    pub async fn publish(&self, message: &str, subject: &str) -> Result<()> {
        let output = self
            .sns
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .subject(subject)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Publish failed: {}", e)))?;

        info!(message_id = ?output.message_id(), subject, "Message published");
        Ok(())
    }
}

/// SQS sender with delayed delivery.
#[derive(Debug, Clone)]
pub struct QueueSender {
    sqs: SqsClient,
}

impl QueueSender {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            sqs: SqsClient::new(config),
        }
    }

    /// Send a message to a named queue with the fixed delivery delay.
    pub async fn send_delayed(&self, message: &str, queue_name: &str) -> Result<()> {
        let queue_url = self.queue_url(queue_name).await?;

        let output = self
            .sqs
            .send_message()
            .queue_url(&queue_url)
            .message_body(message)
            .delay_seconds(DELIVERY_DELAY_SECONDS)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("SendMessage failed on {}: {}", queue_name, e)))?;

        info!(message_id = ?output.message_id(), queue_name, "Message queued");
        Ok(())
    }

    async fn queue_url(&self, queue_name: &str) -> Result<String> {
        let output = self
            .sqs
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("GetQueueUrl failed for {}: {}", queue_name, e)))?;

        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound(format!("queue {}", queue_name)))
    }
}
