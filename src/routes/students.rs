use crate::{
    auth::PortalSession,
    crud::{create_record, get_all_records, get_record, update_record},
    data::{
        SearchQuery, format_optional_date, is_safe_url,
        student::{StudentFormProblems, StudentProfile, StudentProfileForm},
    },
    error::PortalError,
    maud_conveniences::{
        GENERIC_FAILURE, INPUT_CLASSES, alert, errors_list, form_submit_button, link_button,
        not_found_fallback, render_table, simple_form_element, title,
    },
    state::PortalState,
};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};

///a failed `get_by_id` always ends up here, whatever went wrong
fn student_not_found(state: &PortalState, session: &PortalSession, e: &PortalError) -> Response {
    if !e.is_missing_record() {
        error!(?e, "Error fetching student profile");
    }

    (
        StatusCode::NOT_FOUND,
        state.render(session, not_found_fallback("Student", "/students")),
    )
        .into_response()
}

fn student_form(
    action: &str,
    form: &StudentProfileForm,
    problems: Option<StudentFormProblems>,
    failure: Option<&str>,
) -> Markup {
    html! {
        @if let Some(problems) = problems {
            (errors_list(problems.as_nice_list()))
        }
        @if let Some(failure) = failure {
            (alert(failure))
        }
        form method="post" action=(action) {
            (simple_form_element("full_name", "Full Name", true, None, Some(&form.full_name)))
            (simple_form_element("email", "Email", true, Some("email"), Some(&form.email)))
            (simple_form_element("major", "Major", false, None, Some(&form.major)))
            div class="mb-4" {
                label for="gpa" class="block text-sm font-bold mb-2 text-gray-300" {"GPA"}
                input type="number" step="0.01" min="0" max="4" id="gpa" name="gpa" value=(form.gpa) class=(INPUT_CLASSES);
            }
            (simple_form_element("graduation_date", "Graduation Date", false, Some("date"), Some(&form.graduation_date)))
            (simple_form_element("resume_url", "Resume URL", false, Some("url"), Some(&form.resume_url)))
            (simple_form_element("profile_picture", "Profile Picture URL", false, Some("url"), Some(&form.profile_picture)))
            (form_submit_button(Some("Save")))
        }
    }
}

fn form_page(heading: &str, body: Markup) -> Markup {
    html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-lg" {
            (title(heading))
            (body)
        }
    }
}

pub async fn get_students(
    State(state): State<PortalState>,
    session: PortalSession,
    Query(SearchQuery { search, .. }): Query<SearchQuery>,
) -> Markup {
    let listing = match get_all_records::<StudentProfile>(state.store()).await {
        Ok(students) => {
            let rows = students
                .into_iter()
                .filter(|student| student.matches_search(&search))
                .map(|student| {
                    [
                        html! {
                            span class="inline-flex items-center justify-center w-8 h-8 rounded-full bg-blue-700 text-sm font-bold" {(student.initials())}
                        },
                        html! { a href={"/students/" (student.id)} class="underline" {(student.full_name)} },
                        html! {(student.student_id)},
                        html! {(student.email)},
                        html! {(student.major)},
                    ]
                })
                .collect();

            render_table("Students", ["", "Name", "Student ID", "Email", "Major"], rows)
        }
        Err(e) => {
            error!(?e, "Error fetching student profiles");
            alert(GENERIC_FAILURE)
        }
    };

    state.render(
        &session,
        html! {
            div class="w-full max-w-5xl flex flex-col space-y-4" {
                div class="flex flex-row justify-between items-center" {
                    form method="get" action="/students" class="flex flex-row space-x-2" {
                        input type="search" name="search" value=(search) placeholder="Search students" class=(INPUT_CLASSES);
                        (form_submit_button(Some("Search")))
                    }
                    (link_button("/students/new", "Add student"))
                }
                (listing)
            }
        },
    )
}

pub async fn get_new_student(State(state): State<PortalState>, session: PortalSession) -> Markup {
    state.render(
        &session,
        form_page(
            "New Student Profile",
            student_form("/students/new", &StudentProfileForm::default(), None, None),
        ),
    )
}

pub async fn post_new_student(
    State(state): State<PortalState>,
    session: PortalSession,
    Form(form): Form<StudentProfileForm>,
) -> Response {
    let profile = match form.clone().into_new_profile() {
        Ok(profile) => profile,
        Err(problems) => {
            return state
                .render(
                    &session,
                    form_page(
                        "New Student Profile",
                        student_form("/students/new", &form, Some(problems), None),
                    ),
                )
                .into_response();
        }
    };

    match create_record(state.store(), &profile).await {
        Ok(created) => {
            info!(id = %created.id, student_id = %created.student_id, "Created student profile");
            Redirect::to(&format!("/students/{}", created.id)).into_response()
        }
        Err(e) => {
            error!(?e, "Error creating student profile");
            state
                .render(
                    &session,
                    form_page(
                        "New Student Profile",
                        student_form("/students/new", &form, None, Some(GENERIC_FAILURE)),
                    ),
                )
                .into_response()
        }
    }
}

pub async fn get_student(
    State(state): State<PortalState>,
    session: PortalSession,
    Path(id): Path<String>,
) -> Response {
    let student: StudentProfile = match get_record(state.store(), &id).await {
        Ok(student) => student,
        Err(e) => return student_not_found(&state, &session, &e),
    };

    state
        .render(
            &session,
            html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-lg w-full" {
                    div class="flex flex-row items-center space-x-4 mb-4" {
                        @if student.profile_picture.is_empty() || !is_safe_url(&student.profile_picture) {
                            span class="inline-flex items-center justify-center w-16 h-16 rounded-full bg-blue-700 text-xl font-bold" {(student.initials())}
                        } @else {
                            img src=(student.profile_picture) alt=(student.full_name) class="w-16 h-16 rounded-full object-cover";
                        }
                        (title(&student.full_name))
                    }
                    ul class="space-y-2 text-gray-200 mb-6" {
                        li { strong {"Student ID: "} (student.student_id) }
                        li { strong {"Email: "} (student.email) }
                        li { strong {"Major: "} (student.major) }
                        li { strong {"GPA: "} (format!("{:.2}", student.gpa)) }
                        li { strong {"Graduation Date: "} (format_optional_date(student.graduation_date)) }
                        @if !student.resume_url.is_empty() && is_safe_url(&student.resume_url) {
                            li { a href=(student.resume_url) class="underline text-blue-300" {"Resume"} }
                        }
                    }
                    div class="flex flex-row space-x-4" {
                        (link_button(&format!("/students/{}/edit", student.id), "Edit"))
                        (link_button("/students", "Back to students"))
                    }
                }
            },
        )
        .into_response()
}

pub async fn get_edit_student(
    State(state): State<PortalState>,
    session: PortalSession,
    Path(id): Path<String>,
) -> Response {
    let student: StudentProfile = match get_record(state.store(), &id).await {
        Ok(student) => student,
        Err(e) => return student_not_found(&state, &session, &e),
    };

    let action = format!("/students/{}/edit", student.id);
    state
        .render(
            &session,
            form_page(
                &format!("Edit {}", student.full_name),
                student_form(&action, &StudentProfileForm::from(&student), None, None),
            ),
        )
        .into_response()
}

pub async fn post_edit_student(
    State(state): State<PortalState>,
    session: PortalSession,
    Path(id): Path<String>,
    Form(form): Form<StudentProfileForm>,
) -> Response {
    let mut student: StudentProfile = match get_record(state.store(), &id).await {
        Ok(student) => student,
        Err(e) => return student_not_found(&state, &session, &e),
    };
    let action = format!("/students/{}/edit", student.id);
    let heading = format!("Edit {}", student.full_name);

    if let Err(problems) = form.apply_to(&mut student) {
        return state
            .render(
                &session,
                form_page(&heading, student_form(&action, &form, Some(problems), None)),
            )
            .into_response();
    }

    match update_record(state.store(), &student).await {
        Ok(updated) => {
            info!(id = %updated.id, "Updated student profile");
            Redirect::to(&format!("/students/{}", updated.id)).into_response()
        }
        Err(e) => {
            error!(?e, %id, "Error updating student profile");
            state
                .render(
                    &session,
                    form_page(
                        &heading,
                        student_form(&action, &form, None, Some(GENERIC_FAILURE)),
                    ),
                )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        crud::{CrudStore, STUDENT_PROFILES, create_record},
        data::student::StudentProfile,
        routes::test_helpers::*,
    };
    use axum::http::{StatusCode, header};

    fn profile(id: &str, full_name: &str, major: &str) -> StudentProfile {
        StudentProfile {
            id: id.into(),
            full_name: full_name.into(),
            student_id: format!("STU-{id}"),
            email: format!("{id}@uni.ac.uk"),
            major: major.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn listing_filters_by_search_term() {
        let (app, store) = app();
        create_record(&store, &profile("s1", "Asha Rao", "Physics")).await.unwrap();
        create_record(&store, &profile("s2", "Ben Okafor", "History")).await.unwrap();

        let body = body_text(send(&app, get("/students?search=PHYS")).await).await;
        assert!(body.contains("Asha Rao"));
        assert!(!body.contains("Ben Okafor"));

        let body = body_text(send(&app, get("/students")).await).await;
        assert!(body.contains("Asha Rao"));
        assert!(body.contains("Ben Okafor"));
    }

    #[tokio::test]
    async fn creating_a_student_redirects_to_it() {
        let (app, store) = app();
        let response = send(
            &app,
            post_form(
                "/students/new",
                "full_name=Asha+Rao&email=asha%40x.com&major=Physics&gpa=3.7&graduation_date=2026-06-30",
            ),
        )
        .await;

        assert!(response.status().is_redirection());
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();

        let stored = store.get_all(STUDENT_PROFILES).await.unwrap().items;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["gpa"], 3.7);
        assert_eq!(stored[0]["graduationDate"], "2026-06-30");
        assert_eq!(location, format!("/students/{}", stored[0]["_id"].as_str().unwrap()));

        let body = body_text(send(&app, get(&location)).await).await;
        assert!(body.contains("Asha Rao"));
        assert!(body.contains("3.70"));
    }

    #[tokio::test]
    async fn invalid_students_are_not_stored() {
        let (app, store) = app();
        let response = send(
            &app,
            post_form("/students/new", "full_name=&email=nope&gpa=abc&graduation_date=soon"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Full name is required"));
        assert!(body.contains("Please enter a valid email address"));
        assert!(body.contains("GPA must be a number"));
        assert!(body.contains("Graduation date must be a valid date"));
        assert!(store.get_all(STUDENT_PROFILES).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn stored_script_links_are_not_rendered() {
        let (app, store) = app();
        let mut student = profile("s1", "Asha Rao", "Physics");
        student.resume_url = "javascript:alert(document.cookie)".into();
        student.profile_picture = "javascript:alert(1)".into();
        create_record(&store, &student).await.unwrap();

        let body = body_text(send(&app, get("/students/s1")).await).await;
        assert!(!body.contains("javascript:"));
        assert!(body.contains(">AR</span>"));

        let response = send(
            &app,
            post_form("/students/new", "full_name=Bo&email=bo%40uni.ac.uk&resume_url=javascript%3Aalert%281%29"),
        )
        .await;
        assert!(body_text(response).await.contains("Resume URL must start with http:// or https://"));
        assert_eq!(store.get_all(STUDENT_PROFILES).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn editing_keeps_identity_fields() {
        let (app, store) = app();
        create_record(&store, &profile("s1", "Asha Rao", "Physics")).await.unwrap();

        let edit_page = body_text(send(&app, get("/students/s1/edit")).await).await;
        assert!(edit_page.contains("value=\"Physics\""));

        let response = send(
            &app,
            post_form(
                "/students/s1/edit",
                "full_name=Asha+Rao&email=asha%40x.com&major=Maths&gpa=",
            ),
        )
        .await;
        assert_eq!(response.headers()[header::LOCATION], "/students/s1");

        let stored = store.get_by_id(STUDENT_PROFILES, "s1").await.unwrap();
        assert_eq!(stored["major"], "Maths");
        assert_eq!(stored["studentId"], "STU-s1");
        assert_eq!(stored["gpa"], 0.0);
    }

    #[tokio::test]
    async fn missing_students_get_the_fallback_page() {
        let (app, _) = app();

        for uri in ["/students/nobody", "/students/nobody/edit"] {
            let response = send(&app, get(uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert!(body_text(response).await.contains("Student not found"));
        }
    }
}
