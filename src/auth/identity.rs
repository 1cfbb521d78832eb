use crate::{
    auth::{IdentityActor, PortalSession, backend::MemberClaim},
    data::member::Member,
    error::{PortalResult, UnableToEstablishMemberSnafu},
};
use async_trait::async_trait;
use snafu::OptionExt;

///The identity actor for a single request, backed by the `axum-login` session.
///
///Without a claim it can still log out, but `login` has nobody to establish.
pub struct SessionIdentity {
    session: PortalSession,
    claim: Option<MemberClaim>,
}

impl SessionIdentity {
    pub const fn new(session: PortalSession, claim: MemberClaim) -> Self {
        Self {
            session,
            claim: Some(claim),
        }
    }

    pub const fn without_claim(session: PortalSession) -> Self {
        Self {
            session,
            claim: None,
        }
    }
}

#[async_trait]
impl IdentityActor for SessionIdentity {
    fn member(&self) -> Option<&Member> {
        self.session.user.as_ref()
    }

    async fn login(&mut self) -> PortalResult<()> {
        let claim = self.claim.clone().context(UnableToEstablishMemberSnafu)?;
        let member = self
            .session
            .authenticate(claim)
            .await?
            .context(UnableToEstablishMemberSnafu)?;

        self.session.login(&member).await?;
        info!(member_id = %member.id, provider = %member.provider, "Member signed in");

        Ok(())
    }

    async fn logout(&mut self) -> PortalResult<()> {
        if let Some(member) = self.session.logout().await? {
            info!(member_id = %member.id, "Member signed out");
        }
        Ok(())
    }
}
