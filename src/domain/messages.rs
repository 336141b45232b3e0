//! Message intake: persist the report, ask the classifier, persist the
//! verdict.

use std::sync::Arc;

use chrono::Local;

use crate::domain::error::{Result, ServiceError};
use crate::domain::models::{Message, Prediction};
use crate::domain::ports::{MessageRepo, PredictionRepo, Predictor, UserRepo};

#[derive(Debug, Clone)]
pub struct ReportedMessage {
    pub user_id: i64,
    pub message_type: String,
    pub content: String,
    pub source: String,
    pub sender: String,
}

pub struct MessageService {
    users: Arc<dyn UserRepo>,
    messages: Arc<dyn MessageRepo>,
    predictions: Arc<dyn PredictionRepo>,
    predictor: Arc<dyn Predictor>,
}

impl MessageService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        messages: Arc<dyn MessageRepo>,
        predictions: Arc<dyn PredictionRepo>,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            users,
            messages,
            predictions,
            predictor,
        }
    }

    /// Persists the reported message, forwards its content to the external
    /// classifier and persists the returned verdict.
    ///
    /// A classifier failure surfaces synchronously as `BadRequest` without a
    /// retry, and the already persisted message is NOT rolled back: a
    /// message may exist with no prediction.
    pub async fn submit_and_predict(&self, report: ReportedMessage) -> Result<Prediction> {
        self.users
            .get(report.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Usuario no encontrado".into()))?;

        let message = self
            .messages
            .save(Message {
                id: 0,
                user_id: Some(report.user_id),
                content: report.content,
                message_type: report.message_type,
                source: report.source,
                sender: report.sender,
                status: "pendiente".into(),
                received_at: Local::now().naive_local(),
            })
            .await?;

        let outcome = self
            .predictor
            .predict(&message.content)
            .await
            .map_err(|e| ServiceError::BadRequest(format!("Error al conectar con FastAPI: {e}")))?;

        let prediction = self
            .predictions
            .save(Prediction {
                id: 0,
                message_id: message.id,
                model: outcome.model,
                label: outcome.label,
                confidence: outcome.confidence,
                analyzed_at: Local::now().naive_local(),
            })
            .await?;

        Ok(prediction)
    }
}
