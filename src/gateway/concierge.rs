// Conversational AI concierge: request/reply protocol and the invoker that serves it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use super::invoker::{Invocation, InvocationResponse, InvokeError, Invoker};
use crate::compute::ComputeBinding;

const GENERIC_FAILURE: &str = "Failed to get AI response";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConciergeRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConciergeReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// `{statusCode, body}` wrapper; `body` carries the JSON payload as a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub body: String,
}

impl Envelope {
    pub fn new(status_code: u16, payload: &impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status_code,
            body: serde_json::to_string(payload)?,
        })
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: json!({ "error": message }).to_string(),
        }
    }

    pub fn reply(&self) -> Result<ConciergeReply, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    fn into_invocation(self) -> Result<InvocationResponse, InvokeError> {
        let status_code = self.status_code;
        let body = serde_json::to_value(self).map_err(|e| InvokeError::Backend(e.to_string()))?;
        Ok(InvocationResponse { status_code, body })
    }
}

#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct BackendError(pub String);

/// Conversation provider behind the concierge
#[async_trait]
pub trait ConciergeBackend: Send + Sync {
    async fn start_thread(&self) -> Result<String, BackendError>;

    async fn reply(&self, thread_id: &str, message: &str) -> Result<String, BackendError>;
}

/// Local backend that repeats the message back
#[derive(Debug, Clone, Default)]
pub struct EchoBackend;

#[async_trait]
impl ConciergeBackend for EchoBackend {
    async fn start_thread(&self) -> Result<String, BackendError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn reply(&self, _thread_id: &str, message: &str) -> Result<String, BackendError> {
        Ok(format!("You said: {}", message))
    }
}

pub struct ConciergeInvoker<B> {
    backend: B,
}

impl<B: ConciergeBackend> ConciergeInvoker<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    async fn converse(&self, request: ConciergeRequest) -> Result<ConciergeReply, BackendError> {
        let thread_id = match request.thread_id.filter(|t| !t.trim().is_empty()) {
            Some(thread_id) => thread_id,
            None => self.backend.start_thread().await?,
        };

        let message = self.backend.reply(&thread_id, &request.message).await?;
        Ok(ConciergeReply {
            message,
            thread_id: Some(thread_id),
        })
    }
}

fn parse_request(body: Option<Value>) -> Result<ConciergeRequest, String> {
    let body = body.ok_or_else(|| "Request body is required".to_string())?;
    let request: ConciergeRequest = serde_json::from_value(body).map_err(|e| e.to_string())?;
    if request.message.trim().is_empty() {
        return Err("message is required".to_string());
    }
    Ok(request)
}

#[async_trait]
impl<B: ConciergeBackend> Invoker for ConciergeInvoker<B> {
    async fn invoke(&self, binding: &ComputeBinding, invocation: Invocation) -> Result<InvocationResponse, InvokeError> {
        let request = match parse_request(invocation.body) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(binding = %binding.id, "Rejected concierge request: {}", e);
                return Envelope::error(400, &e).into_invocation();
            }
        };

        match self.converse(request).await {
            Ok(reply) => Envelope::new(200, &reply)
                .map_err(|e| InvokeError::Backend(e.to_string()))?
                .into_invocation(),
            Err(e) => {
                tracing::error!(binding = %binding.id, error = %e, "Concierge backend failed");
                Envelope::error(500, GENERIC_FAILURE).into_invocation()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    struct FailingBackend;

    #[async_trait]
    impl ConciergeBackend for FailingBackend {
        async fn start_thread(&self) -> Result<String, BackendError> {
            Ok("thread-1".into())
        }

        async fn reply(&self, _thread_id: &str, _message: &str) -> Result<String, BackendError> {
            Err(BackendError("upstream key OpenAI_API_Key-acme rejected".into()))
        }
    }

    fn binding() -> ComputeBinding {
        ComputeBinding::builder("AIConciergeService").build()
    }

    fn invocation(body: Value) -> Invocation {
        Invocation {
            method: HttpMethod::Post,
            resource: "/ai-concierge".into(),
            path: "/ai-concierge".into(),
            path_parameters: Default::default(),
            body: Some(body),
            principal: Some("alice".into()),
        }
    }

    fn envelope(response: &InvocationResponse) -> Envelope {
        serde_json::from_value(response.body.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_new_conversation_gets_thread_id() {
        let invoker = ConciergeInvoker::new(EchoBackend);
        let response = invoker.invoke(&binding(), invocation(json!({"message": "hi"}))).await.unwrap();

        assert_eq!(response.status_code, 200);
        let reply = envelope(&response).reply().unwrap();
        assert_eq!(reply.message, "You said: hi");
        assert!(Uuid::parse_str(reply.thread_id.as_deref().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_existing_thread_is_kept() {
        let invoker = ConciergeInvoker::new(EchoBackend);
        let response = invoker
            .invoke(&binding(), invocation(json!({"message": "again", "threadId": "t-42"})))
            .await
            .unwrap();

        assert_eq!(envelope(&response).reply().unwrap().thread_id.as_deref(), Some("t-42"));
    }

    #[tokio::test]
    async fn test_backend_failure_is_generic() {
        let invoker = ConciergeInvoker::new(FailingBackend);
        let response = invoker.invoke(&binding(), invocation(json!({"message": "hi"}))).await.unwrap();

        let envelope = envelope(&response);
        assert_eq!(envelope.status_code, 500);
        assert!(!envelope.body.contains("OpenAI"));
        assert_eq!(envelope.body, r#"{"error":"Failed to get AI response"}"#);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let invoker = ConciergeInvoker::new(EchoBackend);
        let response = invoker.invoke(&binding(), invocation(json!({"message": "  "}))).await.unwrap();
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_answered_in_the_envelope() {
        let invoker = ConciergeInvoker::new(EchoBackend);
        let response = invoker.invoke(&binding(), invocation(json!({"text": "hi"}))).await.unwrap();

        let envelope = envelope(&response);
        assert_eq!(envelope.status_code, 400);
        assert!(envelope.body.contains("message"));
    }
}
