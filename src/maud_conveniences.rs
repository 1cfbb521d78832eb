use crate::data::member::Member;
use maud::{Markup, Render, html};

pub const INPUT_CLASSES: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
pub const GENERIC_FAILURE: &str = "Something went wrong talking to the server. Please try again.";

pub fn render_table<const N: usize>(
    overall_title: impl Render,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (title(overall_title))
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subtitle(s: impl Render) -> Markup {
    html! {
        h2 class="text-xl font-semibold mb-2" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, input: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (input)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    ty: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(ty.unwrap_or("text")) id=(id) name=(id) value=[value] class=(INPUT_CLASSES);
        },
    )
}

pub fn form_submit_button(text: Option<&'static str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn field_error(error: Option<&str>) -> Markup {
    html! {
        @if let Some(error) = error {
            p class="text-red-400 text-xs italic mt-1" {(error)}
        }
    }
}

pub fn errors_list(errors: impl Iterator<Item = &'static str>) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            strong class="font-bold" {"Please fix the following:"}
            ul class="list-disc list-inside" {
                @for error in errors {
                    li {(error)}
                }
            }
        }
    }
}

pub fn alert(message: &str) -> Markup {
    html! {
        div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" {
            span class="block sm:inline" {(message)}
        }
    }
}

///what every detail page shows when `get_by_id` comes back with nothing
pub fn not_found_fallback(what: &str, back_to: &str) -> Markup {
    html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full text-center" {
            (title(format!("{what} not found")))
            p class="text-gray-300 mb-6" {"It may have been moved, or the link might be wrong."}
            a href=(back_to) class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Go back"}
        }
    }
}

pub fn link_button(href: &str, text: &str) -> Markup {
    html! {
        a href=(href) class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {(text)}
    }
}

pub fn sign_in_button(context: Option<&str>, text: &str) -> Markup {
    let url = context.map_or_else(
        || "/internal/auth_modal?mode=login".to_string(),
        |context| format!("/internal/auth_modal?mode=login&context={context}"),
    );

    html! {
        button hx-get=(url) hx-target="#auth_modal" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {(text)}
    }
}

pub fn render_nav(member: Option<&Member>) -> Markup {
    const LINKS: [(&str, &str); 7] = [
        ("/", "Home"),
        ("/about", "About"),
        ("/gallery", "Gallery"),
        ("/careers", "Careers"),
        ("/ratings", "Ratings"),
        ("/students", "Students"),
        ("/placements", "Placements"),
    ];

    html! {
        nav class="w-full bg-gray-800 shadow-md px-6 py-3 mb-8 flex flex-row items-center justify-between" {
            a href="/" class="text-xl font-bold text-blue-300" {"PlaceRight"}
            div class="flex flex-row space-x-4" {
                @for (href, text) in LINKS {
                    a href=(href) class="text-gray-300 hover:text-white" {(text)}
                }
            }
            div class="flex flex-row items-center space-x-4" {
                @if let Some(member) = member {
                    a href="/profile" class="text-gray-200 hover:text-white underline" {(member)}
                    button hx-post="/logout" class="bg-gray-700 hover:bg-gray-600 text-gray-300 font-bold py-2 px-4 rounded" {"Sign out"}
                } @else {
                    (sign_in_button(None, "Sign in"))
                    button hx-get="/internal/auth_modal?mode=signup" hx-target="#auth_modal" class="bg-gray-700 hover:bg-gray-600 text-gray-300 font-bold py-2 px-4 rounded" {"Sign up"}
                }
            }
        }
    }
}
