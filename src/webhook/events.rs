use serde::Deserialize;

/// Identity-provider lifecycle event. `kind` stays an open string so event
/// types this service does not handle are acknowledged, not rejected.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: UserEventData,
}

#[derive(Debug, Deserialize)]
pub struct UserEventData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub public_metadata: Option<PublicMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublicMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_created_payload() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "type": "user.created",
                "data": {
                    "id": "user_2abc",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "image_url": "https://img.example.com/ada.png",
                    "public_metadata": { "role": "admin" }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(event.kind, "user.created");
        assert_eq!(event.data.id.as_deref(), Some("user_2abc"));
        assert_eq!(event.data.first_name.as_deref(), Some("Ada"));
        assert_eq!(
            event.data.public_metadata.unwrap().role.as_deref(),
            Some("admin")
        );
    }

    #[test]
    fn parses_user_deleted_payload_with_sparse_data() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{ "type": "user.deleted", "data": { "id": "user_2abc", "deleted": true } }"#,
        )
        .unwrap();
        assert_eq!(event.kind, "user.deleted");
        assert_eq!(event.data.id.as_deref(), Some("user_2abc"));
        assert!(event.data.first_name.is_none());
    }

    #[test]
    fn parses_unknown_event_kind() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{ "type": "session.created", "data": { "id": "sess_1" } }"#,
        )
        .unwrap();
        assert_eq!(event.kind, "session.created");
    }
}
