use crate::{
    auth::PortalSession,
    crud::{create_record, get_all_records, get_record, update_record},
    data::{
        SearchQuery, format_optional_date, is_safe_url,
        placement::{
            CONVENTIONAL_STATUSES, PlacementFormProblems, StudentPlacement, StudentPlacementForm,
        },
    },
    error::PortalError,
    maud_conveniences::{
        GENERIC_FAILURE, INPUT_CLASSES, alert, errors_list, form_element, form_submit_button,
        link_button, not_found_fallback, render_table, simple_form_element, title,
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

fn placement_not_found(state: &PortalState, session: &PortalSession, e: &PortalError) -> Response {
    if !e.is_missing_record() {
        error!(?e, "Error fetching placement");
    }

    (
        StatusCode::NOT_FOUND,
        state.render(session, not_found_fallback("Placement", "/placements")),
    )
        .into_response()
}

fn status_badge(placement: &StudentPlacement) -> Markup {
    html! {
        span class={"px-2 py-1 rounded text-xs font-semibold " (placement.status_badge_classes())} {
            (placement.placement_status)
        }
    }
}

fn status_select(id: &'static str, selected: &str, include_all: bool) -> Markup {
    html! {
        select id=(id) name=(id) class=(INPUT_CLASSES) {
            @if include_all {
                option value="all" selected[selected.is_empty() || selected == "all"] {"All statuses"}
            }
            @for status in CONVENTIONAL_STATUSES {
                option value=(status) selected[selected.eq_ignore_ascii_case(status)] {(status)}
            }
            //stored statuses are free text, so keep one we don't offer
            @if !selected.is_empty() && selected != "all" && !CONVENTIONAL_STATUSES.iter().any(|s| s.eq_ignore_ascii_case(selected)) {
                option value=(selected) selected {(selected)}
            }
        }
    }
}

fn placement_form(
    action: &str,
    form: &StudentPlacementForm,
    problems: Option<PlacementFormProblems>,
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
            (simple_form_element("company_name", "Company Name", true, None, Some(&form.company_name)))
            (simple_form_element("job_title", "Job Title", true, None, Some(&form.job_title)))
            (form_element("placement_status", "Status", status_select("placement_status", &form.placement_status, false)))
            (simple_form_element("start_date", "Start Date", false, Some("date"), Some(&form.start_date)))
            (simple_form_element("end_date", "End Date", false, Some("date"), Some(&form.end_date)))
            (simple_form_element("company_website", "Company Website", false, Some("url"), Some(&form.company_website)))
            (simple_form_element("offer_letter_url", "Offer Letter URL", false, Some("url"), Some(&form.offer_letter_url)))
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

pub async fn get_placements(
    State(state): State<PortalState>,
    session: PortalSession,
    Query(SearchQuery { search, status }): Query<SearchQuery>,
) -> Markup {
    let listing = match get_all_records::<StudentPlacement>(state.store()).await {
        Ok(placements) => {
            let rows = placements
                .into_iter()
                .filter(|placement| {
                    placement.matches_search(&search) && placement.matches_status(status.as_deref())
                })
                .map(|placement| {
                    [
                        html! { a href={"/placements/" (placement.id)} class="underline" {(placement.company_name)} },
                        html! {(placement.job_title)},
                        status_badge(&placement),
                        html! {(format_optional_date(placement.start_date))},
                        html! {(format_optional_date(placement.end_date))},
                    ]
                })
                .collect();

            render_table(
                "Placements",
                ["Company", "Job Title", "Status", "Start", "End"],
                rows,
            )
        }
        Err(e) => {
            error!(?e, "Error fetching placements");
            alert(GENERIC_FAILURE)
        }
    };

    state.render(
        &session,
        html! {
            div class="w-full max-w-5xl flex flex-col space-y-4" {
                div class="flex flex-row justify-between items-center" {
                    form method="get" action="/placements" class="flex flex-row space-x-2" {
                        input type="search" name="search" value=(search) placeholder="Search placements" class=(INPUT_CLASSES);
                        (status_select("status", status.as_deref().unwrap_or_default(), true))
                        (form_submit_button(Some("Filter")))
                    }
                    (link_button("/placements/new", "Add placement"))
                }
                (listing)
            }
        },
    )
}

pub async fn get_new_placement(State(state): State<PortalState>, session: PortalSession) -> Markup {
    let form = StudentPlacementForm {
        placement_status: CONVENTIONAL_STATUSES[0].to_string(),
        ..Default::default()
    };

    state.render(
        &session,
        form_page(
            "New Placement",
            placement_form("/placements/new", &form, None, None),
        ),
    )
}

pub async fn post_new_placement(
    State(state): State<PortalState>,
    session: PortalSession,
    Form(form): Form<StudentPlacementForm>,
) -> Response {
    let placement = match form.clone().into_new_placement() {
        Ok(placement) => placement,
        Err(problems) => {
            return state
                .render(
                    &session,
                    form_page(
                        "New Placement",
                        placement_form("/placements/new", &form, Some(problems), None),
                    ),
                )
                .into_response();
        }
    };

    match create_record(state.store(), &placement).await {
        Ok(created) => {
            info!(id = %created.id, company = %created.company_name, "Created placement");
            Redirect::to(&format!("/placements/{}", created.id)).into_response()
        }
        Err(e) => {
            error!(?e, "Error creating placement");
            state
                .render(
                    &session,
                    form_page(
                        "New Placement",
                        placement_form("/placements/new", &form, None, Some(GENERIC_FAILURE)),
                    ),
                )
                .into_response()
        }
    }
}

pub async fn get_placement(
    State(state): State<PortalState>,
    session: PortalSession,
    Path(id): Path<String>,
) -> Response {
    let placement: StudentPlacement = match get_record(state.store(), &id).await {
        Ok(placement) => placement,
        Err(e) => return placement_not_found(&state, &session, &e),
    };

    state
        .render(
            &session,
            html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-lg w-full" {
                    (title(format!("{} at {}", placement.job_title, placement.company_name)))
                    div class="mb-4" {(status_badge(&placement))}
                    ul class="space-y-2 text-gray-200 mb-6" {
                        li { strong {"Start Date: "} (format_optional_date(placement.start_date)) }
                        li { strong {"End Date: "} (format_optional_date(placement.end_date)) }
                        @if !placement.company_website.is_empty() && is_safe_url(&placement.company_website) {
                            li { a href=(placement.company_website) class="underline text-blue-300" {"Company website"} }
                        }
                        @if !placement.offer_letter_url.is_empty() && is_safe_url(&placement.offer_letter_url) {
                            li { a href=(placement.offer_letter_url) class="underline text-blue-300" {"Offer letter"} }
                        }
                    }
                    div class="flex flex-row space-x-4" {
                        (link_button(&format!("/placements/{}/edit", placement.id), "Edit"))
                        (link_button("/placements", "Back to placements"))
                    }
                }
            },
        )
        .into_response()
}

pub async fn get_edit_placement(
    State(state): State<PortalState>,
    session: PortalSession,
    Path(id): Path<String>,
) -> Response {
    let placement: StudentPlacement = match get_record(state.store(), &id).await {
        Ok(placement) => placement,
        Err(e) => return placement_not_found(&state, &session, &e),
    };

    let action = format!("/placements/{}/edit", placement.id);
    state
        .render(
            &session,
            form_page(
                "Edit Placement",
                placement_form(&action, &StudentPlacementForm::from(&placement), None, None),
            ),
        )
        .into_response()
}

pub async fn post_edit_placement(
    State(state): State<PortalState>,
    session: PortalSession,
    Path(id): Path<String>,
    Form(form): Form<StudentPlacementForm>,
) -> Response {
    let mut placement: StudentPlacement = match get_record(state.store(), &id).await {
        Ok(placement) => placement,
        Err(e) => return placement_not_found(&state, &session, &e),
    };
    let action = format!("/placements/{}/edit", placement.id);

    if let Err(problems) = form.apply_to(&mut placement) {
        return state
            .render(
                &session,
                form_page(
                    "Edit Placement",
                    placement_form(&action, &form, Some(problems), None),
                ),
            )
            .into_response();
    }

    match update_record(state.store(), &placement).await {
        Ok(updated) => {
            info!(id = %updated.id, "Updated placement");
            Redirect::to(&format!("/placements/{}", updated.id)).into_response()
        }
        Err(e) => {
            error!(?e, %id, "Error updating placement");
            state
                .render(
                    &session,
                    form_page(
                        "Edit Placement",
                        placement_form(&action, &form, None, Some(GENERIC_FAILURE)),
                    ),
                )
                .into_response()
        }
    }
}
