//! Login form against the demo API.

use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::components::ui::{Button, Card, CardBody, CardHeader, TextInput};
use crate::Route;

/// Demo credentials the API accepts out of the box; prefilled so the
/// dashboard is one click away.
const DEFAULT_USERNAME: &str = "emilys";
const DEFAULT_PASSWORD: &str = "emilyspass";

#[component]
pub fn Login() -> Element {
    let auth = use_context::<AuthContext>();
    let nav = use_navigator();

    let mut username = use_signal(|| DEFAULT_USERNAME.to_string());
    let mut password = use_signal(|| DEFAULT_PASSWORD.to_string());
    let mut error = use_signal(|| None::<String>);
    let mut is_submitting = use_signal(|| false);

    // Already signed in: straight to the catalog.
    use_effect(move || {
        if auth.is_authenticated() {
            nav.push(Route::Products {});
        }
    });

    let handle_submit = move |e: FormEvent| {
        e.prevent_default();
        let user = username.read().trim().to_string();
        let pass = password.read().to_string();
        if user.is_empty() || pass.is_empty() {
            error.set(Some("Username and password are required".to_string()));
            return;
        }

        is_submitting.set(true);
        error.set(None);
        let mut auth = auth;
        spawn(async move {
            match auth.login(user, pass).await {
                Ok(()) => {
                    nav.push(Route::Products {});
                }
                Err(msg) => {
                    error.set(Some(msg));
                    is_submitting.set(false);
                }
            }
        });
    };

    rsx! {
        div { class: "min-h-screen bg-[#1e1f22] flex items-center justify-center p-4",
            Card { class: "w-full max-w-md".to_string(),
                CardHeader {
                    title: "Sign in to ShopDash".to_string(),
                    subtitle: "Demo credentials are prefilled".to_string(),
                }
                form { onsubmit: handle_submit,
                    CardBody {
                        TextInput {
                            label: "Username".to_string(),
                            value: username.read().clone(),
                            placeholder: "emilys".to_string(),
                            oninput: move |e: FormEvent| {
                                username.set(e.value());
                                error.set(None);
                            },
                        }
                        TextInput {
                            label: "Password".to_string(),
                            value: password.read().clone(),
                            r#type: "password".to_string(),
                            oninput: move |e: FormEvent| {
                                password.set(e.value());
                                error.set(None);
                            },
                        }
                        if let Some(err) = error.read().as_ref() {
                            div { class: "p-3 bg-red-500/10 border border-red-500/30 rounded-lg text-red-400 text-sm",
                                "{err}"
                            }
                        }
                        Button {
                            r#type: "submit".to_string(),
                            class: "w-full".to_string(),
                            disabled: *is_submitting.read(),
                            if *is_submitting.read() {
                                "Signing in..."
                            } else {
                                "Sign in"
                            }
                        }
                    }
                }
            }
        }
    }
}
