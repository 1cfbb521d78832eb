#![allow(clippy::unused_async)]

use crate::{
    auth::PortalSession,
    maud_conveniences::{sign_in_button, subtitle, title},
    state::PortalState,
};
use axum::extract::State;
use maud::{Markup, html};

const GALLERY: [(&str, &str); 4] = [
    ("Careers fair 2025", "Over sixty employers met students on campus."),
    ("Engineering cohort", "Our first cohort of engineering interns, before their first day."),
    ("Mock interviews", "Practice rounds with alumni volunteers."),
    ("Graduation", "Placed students celebrating with their families."),
];

const RATINGS: [(&str, u8, &str); 3] = [
    ("Computer Science, 2025", 5, "Found my placement within a month of signing up."),
    ("Business, 2024", 4, "Keeping every offer letter in one spot made choosing much easier."),
    ("Physics, 2025", 4, "Nice to see where people from my course actually ended up."),
];

fn page_card(markup: Markup) -> Markup {
    html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-3xl w-full" {
            (markup)
        }
    }
}

pub async fn get_about(State(state): State<PortalState>, session: PortalSession) -> Markup {
    state.render(&session, page_card(html! {
        (title("About PlaceRight"))
        p class="text-gray-300 mb-4" {
            "PlaceRight helps universities keep track of where their students go after graduation. Students keep their profile and documents up to date, and placement staff record each offer as it comes in."
        }
        (subtitle("AI-powered insights"))
        p class="text-gray-300" {
            "Our placement insights look at profiles and placement history to suggest where students are most likely to thrive."
        }
    }))
}

pub async fn get_gallery(State(state): State<PortalState>, session: PortalSession) -> Markup {
    state.render(&session, page_card(html! {
        (title("Gallery"))
        div class="grid grid-cols-1 sm:grid-cols-2 gap-4" {
            @for (caption, description) in GALLERY {
                div class="rounded-lg shadow-md p-4 bg-gray-700" {
                    div class="h-32 rounded bg-gray-600 mb-2" {}
                    p class="font-semibold" {(caption)}
                    p class="text-gray-300 text-sm" {(description)}
                }
            }
        }
    }))
}

pub async fn get_ratings(State(state): State<PortalState>, session: PortalSession) -> Markup {
    let signed_in = session.user.is_some();

    state.render(&session, page_card(html! {
        (title("Ratings"))
        div class="space-y-4 mb-6" {
            @for (who, stars, quote) in RATINGS {
                div class="rounded-lg p-4 bg-gray-700" {
                    p class="text-yellow-300" {
                        @for _ in 0..stars { "★" }
                        @for _ in stars..5 { "☆" }
                    }
                    p class="text-gray-200 italic" {"\"" (quote) "\""}
                    p class="text-gray-400 text-sm" {(who)}
                }
            }
        }
        @if !signed_in {
            (sign_in_button(Some("ratings"), "Sign in to leave a rating"))
        }
    }))
}
