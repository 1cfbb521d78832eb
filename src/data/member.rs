use crate::crud::{MEMBERS, Record, new_record_id};
use axum_login::AuthUser;
use jiff::Timestamp;
use maud::Render;
use serde::{Deserialize, Serialize};

pub const GUEST_NAME: &str = "Guest";

///Whoever the identity provider says is signed in. We never hold their credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: String,
    pub provider: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<Timestamp>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,
}

impl Record for Member {
    const COLLECTION: &'static str = MEMBERS;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Member {
    pub fn new(email: Option<String>, display_name: Option<String>, provider: String) -> Self {
        let display_name = display_name
            .or_else(|| {
                email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .map(ToString::to_string)
            })
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| GUEST_NAME.to_string());

        Self {
            id: new_record_id(),
            email,
            display_name,
            provider,
            ..Default::default()
        }
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(email.trim()))
    }
}

impl Render for Member {
    fn render_to(&self, buffer: &mut String) {
        self.display_name.render_to(buffer);
    }
}

impl AuthUser for Member {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }

    fn session_auth_hash(&self) -> &[u8] {
        //no password ever reaches us, so the session is only bound to the member id
        self.id.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_email_then_guest() {
        let named = Member::new(
            Some("asha@x.com".into()),
            Some("Asha Rao".into()),
            "email".into(),
        );
        assert_eq!(named.display_name, "Asha Rao");

        let from_email = Member::new(Some("asha@x.com".into()), None, "email".into());
        assert_eq!(from_email.display_name, "asha");

        let guest = Member::new(None, None, "google".into());
        assert_eq!(guest.display_name, GUEST_NAME);
        assert_eq!(guest.provider, "google");
    }

    #[test]
    fn email_comparison_ignores_case() {
        let member = Member::new(Some("Asha@X.com".into()), None, "email".into());
        assert!(member.has_email(" asha@x.com"));
        assert!(!member.has_email("other@x.com"));
        assert!(!Member::new(None, None, "github".into()).has_email("asha@x.com"));
    }

    #[test]
    fn renders_as_display_name() {
        let member = Member::new(None, Some("Asha <b>".into()), "email".into());
        assert_eq!(member.render().into_string(), "Asha &lt;b&gt;");
    }
}
