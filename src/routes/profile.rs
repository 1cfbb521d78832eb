use crate::{
    auth::PortalSession,
    crud::get_all_records,
    data::{format_optional_date, member::Member, student::StudentProfile},
    error::PortalResult,
    maud_conveniences::{GENERIC_FAILURE, alert, link_button, subtitle, title},
    state::PortalState,
};
use axum::{
    body::Body,
    extract::State,
    http::Response,
    response::{IntoResponse, Redirect},
};
use maud::{Markup, html};

fn profile_row(label: &'static str, value: &str) -> Markup {
    html! {
        div class="mb-4 flex items-center justify-between space-x-4 container mx-auto bg-gray-800 rounded-md p-4" {
            label class="block text-sm font-bold text-gray-300" {(label)}
            p class="text-gray-200" {(value)}
        }
    }
}

///the student profile provisioned for this member's email at signup, if there was one
async fn find_own_profile(
    state: &PortalState,
    member: &Member,
) -> PortalResult<Option<StudentProfile>> {
    let Some(email) = member.email.as_deref() else {
        return Ok(None);
    };

    let profiles: Vec<StudentProfile> = get_all_records(state.store()).await?;
    Ok(profiles
        .into_iter()
        .find(|profile| profile.email.eq_ignore_ascii_case(email)))
}

pub async fn get_profile(
    State(state): State<PortalState>,
    session: PortalSession,
) -> Response<Body> {
    let Some(member) = session.user.clone() else {
        return Redirect::to("/").into_response();
    };

    let student_section = match find_own_profile(&state, &member).await {
        Ok(Some(profile)) => html! {
            (subtitle("Student Profile"))
            (profile_row("Full Name", &profile.full_name))
            (profile_row("Student ID", &profile.student_id))
            (profile_row("Major", &profile.major))
            (profile_row("GPA", &format!("{:.2}", profile.gpa)))
            (profile_row("Graduation Date", &format_optional_date(profile.graduation_date)))
            div class="flex flex-row space-x-4 mt-4" {
                (link_button(&format!("/students/{}/edit", profile.id), "Edit profile"))
                (link_button("/placements", "View placements"))
            }
        },
        Ok(None) => html! {
            p class="text-gray-300 mb-4" {"There's no student profile linked to this account yet."}
            (link_button("/students/new", "Create one"))
        },
        Err(e) => {
            error!(?e, member_id = %member.id, "Error finding student profile for member");
            alert(GENERIC_FAILURE)
        }
    };

    state
        .render(
            &session,
            html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-2xl w-full" {
                    (title(&member))
                    div class="space-y-4 flex flex-col mb-6" {
                        (profile_row("Email", member.email.as_deref().unwrap_or("-")))
                        (profile_row("Signed in with", &member.provider))
                    }
                    (student_section)
                }
            },
        )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::routes::test_helpers::*;
    use axum::http::header;

    #[tokio::test]
    async fn anonymous_visitors_are_sent_home() {
        let (app, _) = app();
        let response = send(&app, get("/profile")).await;

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
