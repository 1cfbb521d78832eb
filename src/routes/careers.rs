use crate::{
    auth::PortalSession,
    crud::get_all_records,
    data::{
        SearchQuery, format_optional_date, is_safe_url,
        job_posting::{JobPosting, sort_newest_first},
    },
    maud_conveniences::{GENERIC_FAILURE, INPUT_CLASSES, alert, form_submit_button, sign_in_button, title},
    state::PortalState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};

fn posting_card(posting: &JobPosting, signed_in: bool) -> Markup {
    html! {
        div class="bg-gray-800 rounded-lg shadow-md p-6 flex flex-col space-y-2" {
            h2 class="text-xl font-semibold" {(posting.job_title)}
            p class="text-gray-400 text-sm" {
                (posting.department) " · " (posting.location) " · " (posting.employment_type)
            }
            @if let Some(posted) = posting.posted_date {
                p class="text-gray-500 text-xs" {"Posted " (posted)}
            }
            p class="text-gray-200" {(posting.description)}
            div class="pt-2" {
                @if !signed_in {
                    (sign_in_button(Some("careers"), "Sign in to apply"))
                } @else if !posting.application_url.is_empty() && is_safe_url(&posting.application_url) {
                    a href=(posting.application_url) class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {"Apply"}
                }
            }
        }
    }
}

pub async fn get_careers(
    State(state): State<PortalState>,
    session: PortalSession,
    Query(SearchQuery { search, .. }): Query<SearchQuery>,
) -> Markup {
    let signed_in = session.user.is_some();

    let listing = match get_all_records::<JobPosting>(state.store()).await {
        Ok(mut postings) => {
            postings.retain(|posting| posting.matches_search(&search));
            sort_newest_first(&mut postings);

            html! {
                @if postings.is_empty() {
                    p class="text-gray-400" {"No open roles right now. Check back soon!"}
                }
                div class="grid grid-cols-1 md:grid-cols-2 gap-4" {
                    @for posting in &postings {
                        (posting_card(posting, signed_in))
                    }
                }
            }
        }
        Err(e) => {
            error!(?e, "Error fetching job postings");
            alert(GENERIC_FAILURE)
        }
    };

    state.render(
        &session,
        html! {
            div class="w-full max-w-5xl flex flex-col space-y-4" {
                (title("Careers"))
                form method="get" action="/careers" class="flex flex-row space-x-2" {
                    input type="search" name="search" value=(search) placeholder="Search roles" class=(INPUT_CLASSES);
                    (form_submit_button(Some("Search")))
                }
                (listing)
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::posting_card;
    use crate::{
        crud::create_record, data::job_posting::JobPosting, routes::test_helpers::*,
    };
    use jiff::civil::date;

    #[test]
    fn apply_link_needs_an_http_url() {
        let mut posting = JobPosting {
            id: "j1".into(),
            job_title: "Data Analyst".into(),
            application_url: "javascript:alert(document.cookie)".into(),
            ..Default::default()
        };
        let card = posting_card(&posting, true).into_string();
        assert!(!card.contains("javascript:"));
        assert!(!card.contains("Apply"));

        posting.application_url = "https://jobs.example/j1".into();
        let card = posting_card(&posting, true).into_string();
        assert!(card.contains("href=\"https://jobs.example/j1\""));
    }

    #[tokio::test]
    async fn postings_are_searched_and_sorted_newest_first() {
        let (app, store) = app();
        for (id, job_title, department, posted) in [
            ("j1", "Data Analyst", "Insights", date(2025, 1, 10)),
            ("j2", "Backend Engineer", "Engineering", date(2025, 3, 2)),
            ("j3", "Frontend Engineer", "Engineering", date(2024, 11, 20)),
        ] {
            let posting = JobPosting {
                id: id.into(),
                job_title: job_title.into(),
                department: department.into(),
                posted_date: Some(posted),
                ..Default::default()
            };
            create_record(&store, &posting).await.unwrap();
        }

        let body = body_text(send(&app, get("/careers?search=engineer")).await).await;
        assert!(!body.contains("Data Analyst"));
        let backend = body.find("Backend Engineer").unwrap();
        let frontend = body.find("Frontend Engineer").unwrap();
        assert!(backend < frontend);
        assert!(body.contains("Sign in to apply"));
    }

    #[tokio::test]
    async fn empty_board_says_so() {
        let (app, _) = app();
        let body = body_text(send(&app, get("/careers")).await).await;
        assert!(body.contains("No open roles right now"));
    }
}
