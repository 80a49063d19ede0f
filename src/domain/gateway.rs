use crate::domain::team::ExternalStatus;
use crate::error::GatewayError;
use serde::Serialize;
use serde_json::Value;

/// A payment link created by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTransaction {
    pub trx_id: String,
    pub payment_url: String,
}

/// Every response shape the gateway is known to produce.
///
/// Payloads come from a third party, so nothing is trusted by field presence
/// alone: each body is classified once and anything that does not match a
/// known shape ends up in `Unrecognized`.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    Created(CreatedTransaction),
    Status(ExternalStatus),
    Rejected { message: String },
    Unrecognized(Value),
}

/// Which call a body is answering; decides how `data` is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayAction {
    CreatePayment,
    CheckStatus,
}

impl GatewayAction {
    pub fn as_query(&self) -> &'static str {
        match self {
            GatewayAction::CreatePayment => "createpayment",
            GatewayAction::CheckStatus => "checkstatus",
        }
    }
}

impl GatewayReply {
    /// Classifies a raw `{status, data}` envelope.
    pub fn decode(action: GatewayAction, body: Value) -> Self {
        let Some(ok) = body.get("status").and_then(Value::as_bool) else {
            return GatewayReply::Unrecognized(body);
        };

        if !ok {
            let message = body
                .get("message")
                .or_else(|| body.get("msg"))
                .and_then(Value::as_str)
                .unwrap_or("no reason given")
                .to_string();
            return GatewayReply::Rejected { message };
        }

        let data = body.get("data");
        let text = |key: &str| {
            data.and_then(|d| d.get(key))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match action {
            GatewayAction::CreatePayment => match (text("trxId"), text("paymentUrl")) {
                (Some(trx_id), Some(payment_url)) => GatewayReply::Created(CreatedTransaction {
                    trx_id,
                    payment_url,
                }),
                _ => GatewayReply::Unrecognized(body),
            },
            GatewayAction::CheckStatus => match text("status") {
                Some(status) => GatewayReply::Status(ExternalStatus::from(status.as_str())),
                None => GatewayReply::Unrecognized(body),
            },
        }
    }

    pub fn into_created(self) -> Result<CreatedTransaction, GatewayError> {
        match self {
            GatewayReply::Created(created) => Ok(created),
            other => Err(other.into_error("createpayment")),
        }
    }

    pub fn into_status(self) -> Result<ExternalStatus, GatewayError> {
        match self {
            GatewayReply::Status(status) => Ok(status),
            other => Err(other.into_error("checkstatus")),
        }
    }

    fn into_error(self, action: &str) -> GatewayError {
        match self {
            GatewayReply::Rejected { message } => GatewayError::Rejected(message),
            GatewayReply::Unrecognized(body) => {
                GatewayError::Malformed(format!("unexpected {action} payload: {body}"))
            }
            GatewayReply::Created(_) | GatewayReply::Status(_) => {
                GatewayError::Malformed(format!("{action} answered with the wrong shape"))
            }
        }
    }
}
