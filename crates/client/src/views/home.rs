//! Landing page: bounces to the catalog or the login form.

use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::Route;

#[component]
pub fn Home() -> Element {
    let auth = use_context::<AuthContext>();
    let nav = use_navigator();

    use_effect(move || {
        if auth.is_authenticated() {
            nav.push(Route::Products {});
        } else {
            nav.push(Route::Login {});
        }
    });

    rsx! {
        div { class: "flex items-center justify-center min-h-screen bg-[#313338] text-white",
            "Redirecting..."
        }
    }
}
