use crate::{
    crud::{CrudStore, create_record, get_all_records, get_record},
    data::member::Member,
    error::PortalError,
};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use std::sync::Arc;

///What the hand-off knows about the person signing in. There is deliberately no password here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberClaim {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider: String,
}

impl MemberClaim {
    pub const EMAIL_PROVIDER: &'static str = "email";

    pub fn email(email: &str, display_name: Option<&str>) -> Self {
        Self {
            email: Some(email.trim().to_string()).filter(|email| !email.is_empty()),
            display_name: display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToString::to_string),
            provider: Self::EMAIL_PROVIDER.to_string(),
        }
    }

    pub fn oauth(provider: &str) -> Self {
        Self {
            email: None,
            display_name: None,
            provider: provider.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MemberBackend {
    store: Arc<dyn CrudStore>,
}

impl MemberBackend {
    pub const fn new(store: Arc<dyn CrudStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthnBackend for MemberBackend {
    type User = Member;
    type Credentials = MemberClaim;
    type Error = PortalError;

    async fn authenticate(
        &self,
        MemberClaim {
            email,
            display_name,
            provider,
        }: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        if let Some(email) = email.as_deref() {
            let members: Vec<Member> = get_all_records(&*self.store).await?;
            if let Some(existing) = members.into_iter().find(|member| member.has_email(email)) {
                debug!(member_id = %existing.id, "Found existing member for email");
                return Ok(Some(existing));
            }
        }

        let member = Member::new(email, display_name, provider);
        let member = create_record(&*self.store, &member).await?;
        info!(member_id = %member.id, provider = %member.provider, "Registered new member");

        Ok(Some(member))
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        match get_record(&*self.store, user_id).await {
            Ok(member) => Ok(Some(member)),
            Err(e) if e.is_missing_record() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::memory::InMemoryCrudStore;

    fn backend() -> MemberBackend {
        MemberBackend::new(Arc::new(InMemoryCrudStore::new()))
    }

    #[tokio::test]
    async fn same_email_maps_to_same_member() {
        let backend = backend();

        let first = backend
            .authenticate(MemberClaim::email("asha@x.com", Some("Asha Rao")))
            .await
            .unwrap()
            .unwrap();
        let second = backend
            .authenticate(MemberClaim::email("ASHA@x.com", None))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "Asha Rao");
    }

    #[tokio::test]
    async fn oauth_hand_offs_get_fresh_guest_members() {
        let backend = backend();

        let first = backend
            .authenticate(MemberClaim::oauth("google"))
            .await
            .unwrap()
            .unwrap();
        let second = backend
            .authenticate(MemberClaim::oauth("github"))
            .await
            .unwrap()
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.provider, "google");
        assert!(first.email.is_none());
    }

    #[tokio::test]
    async fn get_user_is_none_for_unknown_ids() {
        let backend = backend();
        let member = backend
            .authenticate(MemberClaim::email("asha@x.com", None))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            backend.get_user(&member.id).await.unwrap().map(|m| m.id),
            Some(member.id)
        );
        assert!(backend.get_user(&"nobody".to_string()).await.unwrap().is_none());
    }

    #[test]
    fn blank_claim_fields_are_dropped() {
        let claim = MemberClaim::email("  ", Some("  "));
        assert_eq!(claim.email, None);
        assert_eq!(claim.display_name, None);
        assert_eq!(claim.provider, MemberClaim::EMAIL_PROVIDER);
    }
}
