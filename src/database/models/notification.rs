use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::impl_entity;
use crate::types::{NotificationType, Role};
use crate::validation::{double_option, Field, Kind, Mode, Schema, ValidationErrors};

/// Addressed to one user, or broadcast to a role when `recipient_id` is empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub recipient_id: Option<String>,
    pub recipient_role: Option<Role>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Notification, "notifications", "Notification");

impl Notification {
    /// Whether `user_id` with `role` is an audience of this notification
    pub fn is_visible_to(&self, user_id: &str, role: Role) -> bool {
        match (&self.recipient_id, self.recipient_role) {
            (Some(recipient), _) => recipient == user_id,
            (None, Some(target)) => target == role,
            (None, None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub recipient_id: Option<String>,
    pub recipient_role: Option<Role>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub is_read: bool,
}

const NOTIFICATION_FIELDS: &[Field] = &[
    Field::required("title", Kind::Text),
    Field::required("message", Kind::Text),
    Field::nullable("recipientId", Kind::Text),
    Field::nullable("recipientRole", Kind::OneOf(Role::VALUES)),
    Field::required("type", Kind::OneOf(NotificationType::VALUES)),
    Field::defaulted("isRead", Kind::Boolean),
];

impl Schema for NewNotification {
    const FIELDS: &'static [Field] = NOTIFICATION_FIELDS;
    const MODE: Mode = Mode::Insert;

    fn check_rules(&self, errors: &mut ValidationErrors) {
        if self.recipient_id.is_none() && self.recipient_role.is_none() {
            errors.add("recipientId", "either recipientId or recipientRole is required");
        }
    }
}

impl NewNotification {
    pub fn into_row(self, id: String, now: DateTime<Utc>) -> Notification {
        Notification {
            id,
            title: self.title,
            message: self.message,
            recipient_id: self.recipient_id,
            recipient_role: self.recipient_role,
            kind: self.kind,
            is_read: self.is_read,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub recipient_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub recipient_role: Option<Option<Role>>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub is_read: Option<bool>,
}

impl Schema for NotificationPatch {
    const FIELDS: &'static [Field] = NOTIFICATION_FIELDS;
    const MODE: Mode = Mode::Patch;
}

impl NotificationPatch {
    pub fn apply(self, row: &mut Notification, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            row.title = v;
        }
        if let Some(v) = self.message {
            row.message = v;
        }
        if let Some(v) = self.recipient_id {
            row.recipient_id = v;
        }
        if let Some(v) = self.recipient_role {
            row.recipient_role = v;
        }
        if let Some(v) = self.kind {
            row.kind = v;
        }
        if let Some(v) = self.is_read {
            row.is_read = v;
        }
        row.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse;
    use serde_json::json;

    #[test]
    fn needs_an_audience() {
        let err = parse::<NewNotification>(json!({
            "title": "Fees due",
            "message": "Term fees are due Friday",
            "type": "fee"
        }))
        .unwrap_err();
        assert!(err.get("recipientId").is_some());
    }

    #[test]
    fn type_field_uses_wire_name() {
        let n: NewNotification = parse(json!({
            "title": "Sports day",
            "message": "Bring trainers",
            "recipientRole": "parent",
            "type": "general"
        }))
        .unwrap();
        assert_eq!(n.kind, NotificationType::General);
        assert!(!n.is_read);
    }
}
