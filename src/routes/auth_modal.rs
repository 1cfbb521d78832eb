#![allow(clippy::unused_async)]

use crate::{
    auth::{
        IdentityActor, PortalSession,
        backend::MemberClaim,
        identity::SessionIdentity,
        modal::{AuthModal, ModalCopy, ModalField, ModalMode, SubmitOutcome},
    },
    error::PortalResult,
    maud_conveniences::{INPUT_CLASSES, alert, field_error, form_submit_button},
    state::PortalState,
};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

pub const SIGN_IN_FAILED: &str = "We couldn't sign you in. Please try again.";

///where the modal came from and where to send the member afterwards
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModalTarget {
    pub context: Option<String>,
    pub next: Option<String>,
}

impl ModalTarget {
    ///only same-site paths, never `//elsewhere`
    fn next_path(&self) -> Option<&str> {
        self.next
            .as_deref()
            .filter(|next| next.starts_with('/') && !next.starts_with("//"))
    }

    fn copy(&self) -> ModalCopy {
        ModalCopy::for_context(self.context.as_deref())
    }
}

#[derive(Deserialize)]
pub struct OpenModalQuery {
    #[serde(default)]
    mode: ModalMode,
    #[serde(flatten)]
    target: ModalTarget,
}

#[derive(Deserialize)]
pub struct AuthModalForm {
    #[serde(default)]
    mode: ModalMode,
    switch_to: Option<ModalMode>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
    #[serde(default)]
    full_name: String,
    #[serde(flatten)]
    target: ModalTarget,
}

impl AuthModalForm {
    fn into_modal(self) -> (AuthModal, ModalTarget) {
        let mut modal = AuthModal::opened(self.mode);
        modal.change_field(ModalField::Email, self.email);
        modal.change_field(ModalField::Password, self.password);
        modal.change_field(ModalField::ConfirmPassword, self.confirm_password);
        modal.change_field(ModalField::FullName, self.full_name);
        if let Some(switch_to) = self.switch_to {
            modal.switch_mode(switch_to);
        }

        (modal, self.target)
    }
}

///Tells htmx to leave the page once a member is established.
fn handed_off(target: &ModalTarget) -> Response {
    match target.next_path() {
        Some(next) => [("HX-Redirect", next.to_string())].into_response(),
        None => [("HX-Refresh", "true".to_string())].into_response(),
    }
}

fn modal_input(
    field: &'static str,
    label: &'static str,
    ty: &'static str,
    value: Option<&str>,
    error: Option<&str>,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(field) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            input type=(ty) id=(field) name=(field) value=[value] class=(INPUT_CLASSES);
            (field_error(error))
        }
    }
}

pub fn render_modal(modal: &AuthModal, target: &ModalTarget) -> Markup {
    if !modal.open {
        return html! {};
    }

    let copy = target.copy();
    let (other_mode, other_mode_prompt) = match modal.mode {
        ModalMode::Login => (ModalMode::Signup, "Don't have an account? Sign up"),
        ModalMode::Signup => (ModalMode::Login, "Already have an account? Sign in"),
    };

    html! {
        div class="fixed inset-0 bg-black/60 flex items-center justify-center z-50" {
            div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 w-full max-w-sm relative" {
                button hx-get="/internal/auth_modal/close" hx-target="#auth_modal" class="absolute top-2 right-3 text-gray-400 hover:text-white" {"✕"}
                h1 class="text-2xl font-semibold mb-2" {(copy.title)}
                p class="text-gray-300 mb-4" {(copy.description)}

                @if let Some(general) = modal.errors.general {
                    (alert(general))
                }

                form hx-post="/internal/auth_modal" hx-target="#auth_modal" {
                    input type="hidden" name="mode" value=(modal.mode.as_str());
                    @if let Some(context) = &target.context {
                        input type="hidden" name="context" value=(context);
                    }
                    @if let Some(next) = target.next_path() {
                        input type="hidden" name="next" value=(next);
                    }

                    @if modal.mode == ModalMode::Signup {
                        (modal_input("full_name", "Full Name", "text", Some(&modal.fields.full_name), modal.errors.get(ModalField::FullName)))
                    }
                    (modal_input("email", "Email", "email", Some(&modal.fields.email), modal.errors.get(ModalField::Email)))
                    (modal_input("password", "Password", "password", None, modal.errors.get(ModalField::Password)))
                    @if modal.mode == ModalMode::Signup {
                        (modal_input("confirm_password", "Confirm Password", "password", None, modal.errors.get(ModalField::ConfirmPassword)))
                    }

                    (form_submit_button(Some(match modal.mode {
                        ModalMode::Login => "Sign in",
                        ModalMode::Signup => "Create account",
                    })))

                    button type="button" hx-post="/internal/auth_modal/mode" hx-include="closest form" hx-target="#auth_modal" hx-vals={"{\"switch_to\": \"" (other_mode.as_str()) "\"}"} class="mt-4 text-sm text-blue-300 hover:underline" {
                        (other_mode_prompt)
                    }
                }

                div class="mt-6 flex flex-col space-y-2" {
                    @for (provider, label) in [("google", "Continue with Google"), ("github", "Continue with GitHub")] {
                        button hx-post={"/internal/auth_modal/oauth/" (provider)} hx-include="closest div" hx-target="#auth_modal" class="bg-gray-700 hover:bg-gray-600 text-gray-200 font-bold py-2 px-4 rounded" {
                            (label)
                        }
                    }
                    @if let Some(next) = target.next_path() {
                        input type="hidden" name="next" value=(next);
                    }
                }
            }
        }
    }
}

pub async fn internal_get_auth_modal(
    Query(OpenModalQuery { mode, target }): Query<OpenModalQuery>,
) -> Markup {
    render_modal(&AuthModal::opened(mode), &target)
}

pub async fn internal_post_switch_mode(Form(form): Form<AuthModalForm>) -> Markup {
    let (modal, target) = form.into_modal();
    render_modal(&modal, &target)
}

pub async fn internal_get_close_modal() -> Markup {
    let mut modal = AuthModal::default();
    modal.set_open(false);
    render_modal(&modal, &ModalTarget::default())
}

pub async fn internal_post_auth_modal(
    State(state): State<PortalState>,
    session: PortalSession,
    Form(form): Form<AuthModalForm>,
) -> Response {
    let (mut modal, target) = form.into_modal();
    let display_name = (modal.mode == ModalMode::Signup).then_some(modal.fields.full_name.as_str());
    let claim = MemberClaim::email(&modal.fields.email, display_name);
    let mut identity = SessionIdentity::new(session, claim);

    match modal
        .submit(state.store(), &mut identity, None::<fn()>)
        .await
    {
        Ok(SubmitOutcome::HandedOff) => handed_off(&target),
        Ok(SubmitOutcome::Invalid | SubmitOutcome::ProfileCreationFailed) => {
            render_modal(&modal, &target).into_response()
        }
        Err(e) => {
            error!(?e, "Error handing off to identity provider");
            let mut modal = AuthModal::opened(modal.mode);
            modal.errors.general = Some(SIGN_IN_FAILED);
            render_modal(&modal, &target).into_response()
        }
    }
}

pub async fn internal_post_oauth(
    session: PortalSession,
    Path(provider): Path<String>,
    Form(target): Form<ModalTarget>,
) -> Response {
    let mut identity = SessionIdentity::new(session, MemberClaim::oauth(&provider));
    let mut modal = AuthModal::opened(ModalMode::Login);

    match modal.oauth_login(&provider, &mut identity).await {
        Ok(()) => handed_off(&target),
        Err(e) => {
            error!(?e, %provider, "Error handing off to OAuth provider");
            modal.set_open(true);
            modal.errors.general = Some(SIGN_IN_FAILED);
            render_modal(&modal, &target).into_response()
        }
    }
}

pub async fn post_logout(session: PortalSession) -> PortalResult<impl IntoResponse> {
    let mut identity = SessionIdentity::without_claim(session);
    if identity.is_authenticated() {
        identity.logout().await?;
    }

    Ok([("HX-Redirect", "/")])
}

#[cfg(test)]
mod tests {
    use crate::{
        crud::{CrudStore, MEMBERS, STUDENT_PROFILES},
        routes::test_helpers::*,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };

    const SIGNUP: &str = "mode=signup&full_name=Asha+Rao&email=asha%40x.com&password=secret1&confirm_password=secret1&next=%2Fprofile";

    #[tokio::test]
    async fn opening_the_modal_uses_the_page_copy() {
        let (app, _) = app();

        let body = body_text(send(&app, get("/internal/auth_modal?mode=login")).await).await;
        assert!(body.contains("Welcome to PlaceRight"));
        assert!(!body.contains("Confirm Password"));

        let body = body_text(
            send(&app, get("/internal/auth_modal?mode=signup&context=careers")).await,
        )
        .await;
        assert!(body.contains("Sign in to apply"));
        assert!(body.contains("Confirm Password"));
        assert!(body.contains("name=\"context\" value=\"careers\""));
    }

    #[tokio::test]
    async fn closing_the_modal_empties_it() {
        let (app, _) = app();
        let body = body_text(send(&app, get("/internal/auth_modal/close")).await).await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn switching_mode_keeps_what_was_typed() {
        let (app, _) = app();
        let response = send(
            &app,
            post_form(
                "/internal/auth_modal/mode",
                "mode=login&switch_to=signup&email=asha%40x.com",
            ),
        )
        .await;

        let body = body_text(response).await;
        assert!(body.contains("Confirm Password"));
        assert!(body.contains("value=\"asha@x.com\""));
        assert!(body.contains("name=\"mode\" value=\"signup\""));
    }

    #[tokio::test]
    async fn invalid_signup_rerenders_with_errors_and_writes_nothing() {
        let (app, store) = app();
        let response = send(
            &app,
            post_form(
                "/internal/auth_modal",
                "mode=signup&full_name=&email=asha%40x&password=abc&confirm_password=abd",
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("HX-Redirect").is_none());
        assert!(response.headers().get(header::SET_COOKIE).is_none());

        let body = body_text(response).await;
        assert!(body.contains("Full name is required"));
        assert!(body.contains("Please enter a valid email address"));
        assert!(body.contains("Password must be at least 6 characters"));
        assert!(body.contains("Passwords do not match"));

        assert!(store.get_all(STUDENT_PROFILES).await.unwrap().items.is_empty());
        assert!(store.get_all(MEMBERS).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn signup_provisions_a_profile_and_signs_in() {
        let (app, store) = app();
        let response = send(&app, post_form("/internal/auth_modal", SIGNUP)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/profile");
        let cookie = session_cookie(&response).expect("signing in sets a session cookie");

        let profiles = store.get_all(STUDENT_PROFILES).await.unwrap().items;
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["fullName"], "Asha Rao");
        let members = store.get_all(MEMBERS).await.unwrap().items;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["email"], "asha@x.com");

        let profile = send(
            &app,
            Request::get("/profile")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(profile.status(), StatusCode::OK);
        let body = body_text(profile).await;
        assert!(body.contains("Asha Rao"));
        assert!(body.contains("STU-"));

        let logout = send(
            &app,
            Request::post("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(logout.headers()["HX-Redirect"], "/");

        let after = send(
            &app,
            Request::get("/profile")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert!(after.status().is_redirection());
    }

    #[tokio::test]
    async fn login_reuses_the_member_for_an_email() {
        let (app, store) = app();
        send(&app, post_form("/internal/auth_modal", SIGNUP)).await;

        let response = send(
            &app,
            post_form(
                "/internal/auth_modal",
                "mode=login&email=ASHA%40x.com&password=anything",
            ),
        )
        .await;

        assert_eq!(response.headers()["HX-Refresh"], "true");
        assert_eq!(store.get_all(MEMBERS).await.unwrap().items.len(), 1);
        assert_eq!(store.get_all(STUDENT_PROFILES).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn oauth_signs_in_a_guest() {
        let (app, store) = app();
        let response = send(
            &app,
            post_form("/internal/auth_modal/oauth/google", "next=%2F%2Fevil.example"),
        )
        .await;

        assert_eq!(response.headers()["HX-Refresh"], "true");
        assert!(session_cookie(&response).is_some());

        let members = store.get_all(MEMBERS).await.unwrap().items;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["provider"], "google");
        assert_eq!(members[0]["displayName"], "Guest");
    }
}
