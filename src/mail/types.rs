//! Domain types for stored email and its retrieval-facing rows.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::{Validate, ValidateEmail, ValidationError};

/// Inbound email as submitted for ingestion.
///
/// Validation mirrors what the ingest endpoint promises: `sender` must be a
/// well-formed address, `recipient` a non-empty list of well-formed
/// addresses, `cc`/`bcc` optional lists checked the same way. Subject and
/// body only have to be present; empty strings are accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailPayload {
    pub subject: String,
    #[validate(email)]
    pub sender: String,
    #[validate(length(min = 1), custom(function = "validate_address_list"))]
    pub recipient: Vec<String>,
    #[validate(custom(function = "validate_address_list"))]
    pub cc: Option<Vec<String>>,
    #[validate(custom(function = "validate_address_list"))]
    pub bcc: Option<Vec<String>>,
    pub body: String,
}

fn validate_address_list(addresses: &[String]) -> Result<(), ValidationError> {
    for address in addresses {
        if !address.validate_email() {
            let mut err = ValidationError::new("email");
            err.message = Some("list contains a malformed email address".into());
            err.add_param("address".into(), address);
            return Err(err);
        }
    }
    Ok(())
}

/// Email row as persisted. Address lists are kept as JSON text columns.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEmail {
    pub id: i64,
    pub subject: String,
    pub sender: String,
    pub recipient: Json<Vec<String>>,
    pub cc: Option<Json<Vec<String>>>,
    pub bcc: Option<Json<Vec<String>>>,
    pub body: String,
    pub created_at: String,
}

/// One body chunk of a stored email, without its embedding.
#[derive(Debug, Clone, Serialize)]
pub struct EmailSection {
    pub id: i64,
    pub email_id: i64,
    pub section_order: i64,
    pub content: String,
}

/// A stored email together with its ordered sections.
#[derive(Debug, Serialize)]
pub struct EmailDetail {
    #[serde(flatten)]
    pub email: StoredEmail,
    pub sections: Vec<EmailSection>,
}

/// One ranked hit from similarity retrieval.
#[derive(Debug, Clone)]
pub struct SectionMatch {
    pub email_id: i64,
    pub section_order: i64,
    pub content: String,
    pub similarity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> EmailPayload {
        EmailPayload {
            subject: "Quarterly numbers".to_string(),
            sender: "alice@example.com".to_string(),
            recipient: vec!["bob@example.com".to_string()],
            cc: None,
            bcc: None,
            body: "The numbers are up.".to_string(),
        }
    }

    #[test]
    fn well_formed_payload_passes() {
        assert!(valid_payload().validate().is_ok());
    }

    #[test]
    fn malformed_sender_names_the_field() {
        let mut payload = valid_payload();
        payload.sender = "not-an-address".to_string();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sender"));
        assert_eq!(fields["sender"][0].code, "email");
    }

    #[test]
    fn empty_recipient_list_is_rejected() {
        let mut payload = valid_payload();
        payload.recipient = vec![];

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("recipient"));
    }

    #[test]
    fn malformed_cc_entry_names_the_field() {
        let mut payload = valid_payload();
        payload.cc = Some(vec!["carol@example.com".to_string(), "broken".to_string()]);

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("cc"));
        assert_eq!(fields["cc"][0].code, "email");
    }

    #[test]
    fn missing_optional_lists_deserialize_to_none() {
        let payload: EmailPayload = serde_json::from_str(
            r#"{
                "subject": "hi",
                "sender": "a@b.com",
                "recipient": ["c@d.com"],
                "body": "text"
            }"#,
        )
        .unwrap();

        assert!(payload.cc.is_none());
        assert!(payload.bcc.is_none());
        assert!(payload.validate().is_ok());
    }
}
