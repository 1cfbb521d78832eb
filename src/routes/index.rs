use crate::{
    auth::PortalSession,
    maud_conveniences::{link_button, sign_in_button},
    state::PortalState,
};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index(State(state): State<PortalState>, session: PortalSession) -> Markup {
    let signed_in = session.user.is_some();

    state.render(&session, html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-2xl w-full text-center" {
            h1 class="text-3xl font-semibold mb-4" {
                "PlaceRight"
            }
            p class="text-gray-300 mb-6" {
                "Track student profiles and placements in one place, with AI-powered placement insights."
            }

            div class="flex flex-row space-x-4 justify-center" {
                a href="/students" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                    "View Students"
                }
                a href="/placements" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                    "View Placements"
                }
                @if signed_in {
                    (link_button("/profile", "My Profile"))
                } @else {
                    button hx-get="/internal/auth_modal?mode=login&context=profile&next=/profile" hx-target="#auth_modal" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {
                        "My Profile"
                    }
                }
            }
        }
        @if !signed_in {
            div class="mt-8 text-center" {
                p class="text-gray-400 mb-2" {"New here?"}
                (sign_in_button(None, "Sign in to get started"))
            }
        }
    })
}
