use crate::{auth::backend::MemberBackend, data::member::Member, error::PortalResult};
use async_trait::async_trait;
use axum_login::AuthSession;

pub mod backend;
pub mod crud_session_store;
pub mod identity;
pub mod modal;

pub type PortalSession = AuthSession<MemberBackend>;

///The external authority on who is signed in.
///
///`login` takes nothing: whatever the actor needs to establish a member, it was given
///when it was constructed. Nothing in this crate checks a password.
#[async_trait]
pub trait IdentityActor: Send {
    fn member(&self) -> Option<&Member>;

    fn is_authenticated(&self) -> bool {
        self.member().is_some()
    }

    async fn login(&mut self) -> PortalResult<()>;
    async fn logout(&mut self) -> PortalResult<()>;
}
