//! Product catalog: the protected dashboard view.
//!
//! Everything renders from the global catalog store. The fetch, the
//! realtime socket and sibling tabs all write into that store, so the
//! components here never touch events directly.

use dioxus::prelude::*;
use rand::Rng;
use shopdash_shared::{
    local_product_id, validate_new_product, NewProduct, Product, CATEGORIES,
};

use crate::auth_session::AuthContext;
use crate::components::ui::{Button, ButtonVariant, Card, CardBody, CardHeader, SelectInput, TextInput};
use crate::stores::{self, CATALOG};
use crate::ws::{self, use_connection_state, ConnectionState};
use crate::Route;

#[component]
pub fn Products() -> Element {
    let auth = use_context::<AuthContext>();
    let nav = use_navigator();

    // Route guard: this view never renders without a session.
    use_effect(move || {
        if !auth.is_authenticated() {
            nav.push(Route::Login {});
        }
    });

    let Some(user) = auth.user() else {
        return rsx! {
            div { class: "flex items-center justify-center min-h-screen bg-[#313338] text-white",
                "Redirecting..."
            }
        };
    };

    let handle_logout = move |_| {
        let mut auth = auth;
        auth.logout();
        stores::reset_catalog();
        nav.push(Route::Login {});
    };

    rsx! {
        div { class: "min-h-screen bg-[#1e1f22]",
            header { class: "bg-[#313338] border-b border-[#3f4147] px-6 py-4 flex items-center justify-between",
                h1 { class: "text-xl font-bold text-white", "ShopDash" }
                div { class: "flex items-center gap-4",
                    span { class: "text-sm text-gray-300",
                        "{user.first_name} {user.last_name}"
                    }
                    Button {
                        variant: ButtonVariant::Danger,
                        onclick: handle_logout,
                        "Log out"
                    }
                }
            }
            ConnectionBanner {}
            main { class: "max-w-6xl mx-auto p-6 grid grid-cols-1 lg:grid-cols-3 gap-6",
                div { class: "lg:col-span-2",
                    ProductList {}
                }
                div {
                    NewProductForm {}
                }
            }
        }
    }
}

/// Live connection status strip under the header.
#[component]
fn ConnectionBanner() -> Element {
    let state = use_connection_state();
    let event_count = *ws::EVENT_COUNT.read();

    let (dot, label) = match &state {
        ConnectionState::Connected => ("bg-green-500", "Live sync connected".to_string()),
        ConnectionState::Connecting => ("bg-yellow-500", "Connecting...".to_string()),
        ConnectionState::Reconnecting { attempt } => {
            ("bg-yellow-500", format!("Reconnecting (attempt {attempt})..."))
        }
        ConnectionState::Failed { reason } => ("bg-red-500", format!("Sync offline: {reason}")),
        ConnectionState::Disconnected => ("bg-gray-500", "Sync off".to_string()),
    };

    rsx! {
        div { class: "bg-[#2b2d31] border-b border-[#3f4147] px-6 py-2 flex items-center gap-3 text-sm text-gray-300",
            span { class: "w-2 h-2 rounded-full {dot}" }
            span { "{label}" }
            if event_count > 0 {
                span { class: "text-gray-500", "{event_count} events" }
            }
            if matches!(state, ConnectionState::Failed { .. }) {
                Button {
                    variant: ButtonVariant::Ghost,
                    class: "ml-auto".to_string(),
                    onclick: move |_| ws::connect(),
                    "Retry"
                }
            }
        }
    }
}

#[component]
fn ProductList() -> Element {
    let auth = use_context::<AuthContext>();

    // One fetch per mount; later inserts arrive through the store.
    let _fetch = use_resource(move || async move {
        stores::load_products(&auth.client()).await;
    });

    let store = CATALOG.read();

    rsx! {
        div { class: "space-y-4",
            div { class: "flex items-baseline justify-between",
                h2 { class: "text-lg font-bold text-white", "Products" }
                span { class: "text-sm text-gray-400",
                    "{store.catalog.products.len()} of {store.catalog.total}"
                }
            }
            if let Some(err) = store.error.as_ref() {
                div { class: "p-3 bg-red-500/10 border border-red-500/30 rounded-lg text-red-400 text-sm",
                    "{err}"
                }
            }
            if store.is_loading && store.catalog.products.is_empty() {
                div { class: "text-gray-400 py-8 text-center", "Loading products..." }
            } else if store.catalog.products.is_empty() {
                div { class: "text-gray-400 py-8 text-center", "No products yet" }
            } else {
                div { class: "grid grid-cols-1 md:grid-cols-2 gap-4",
                    for product in store.catalog.products.iter() {
                        ProductCard { key: "{product.id}", product: product.clone() }
                    }
                }
            }
        }
    }
}

#[component]
fn ProductCard(product: Product) -> Element {
    rsx! {
        Card {
            if let Some(thumbnail) = product.thumbnail.as_ref() {
                img {
                    class: "w-full h-36 object-cover rounded-t-lg",
                    src: "{thumbnail}",
                    alt: "{product.title}",
                }
            }
            div { class: "p-4 space-y-2",
                div { class: "flex items-start justify-between gap-2",
                    h3 { class: "font-semibold text-white", "{product.title}" }
                    span { class: "text-indigo-400 font-bold whitespace-nowrap",
                        {format!("${:.2}", product.price)}
                    }
                }
                span { class: "inline-block text-xs bg-[#3f4147] text-gray-300 rounded px-2 py-0.5",
                    "{product.category}"
                }
                p { class: "text-sm text-gray-400 line-clamp-2", "{product.description}" }
                div { class: "flex gap-4 text-xs text-gray-500",
                    if let Some(rating) = product.rating {
                        span { {format!("★ {:.1}", rating)} }
                    }
                    if let Some(stock) = product.stock {
                        span { "{stock} in stock" }
                    }
                }
            }
        }
    }
}

#[component]
fn NewProductForm() -> Element {
    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut price = use_signal(String::new);
    let mut category = use_signal(|| "beauty".to_string());
    let mut error = use_signal(|| None::<String>);
    let mut created = use_signal(|| None::<String>);

    let handle_submit = move |e: FormEvent| {
        e.prevent_default();
        created.set(None);

        let price_value: f64 = match price.read().trim().parse() {
            Ok(v) => v,
            Err(_) => {
                error.set(Some("Price must be a number".to_string()));
                return;
            }
        };
        let input = NewProduct {
            title: title.read().trim().to_string(),
            description: description.read().trim().to_string(),
            price: price_value,
            category: category.read().clone(),
        };
        if let Err(msg) = validate_new_product(&input) {
            error.set(Some(msg));
            return;
        }

        let mut rng = rand::thread_rng();
        let product = Product {
            id: local_product_id(),
            title: input.title,
            description: input.description,
            price: input.price,
            category: input.category,
            rating: Some(rng.gen_range(1.0..5.0)),
            stock: Some(rng.gen_range(1..=100)),
            discount_percentage: Some(rng.gen_range(0.0..20.0)),
            brand: None,
            thumbnail: Some("https://placehold.co/300x200.png".to_string()),
            images: None,
        };

        // Show it immediately; the echo and fan-out copies dedupe away.
        stores::add_product(product.clone());
        ws::send_new_product(product.clone());

        created.set(Some(product.title));
        error.set(None);
        title.set(String::new());
        description.set(String::new());
        price.set(String::new());
    };

    let category_options: Vec<(String, String)> = CATEGORIES
        .iter()
        .map(|c| (c.name.to_string(), c.label.to_string()))
        .collect();

    rsx! {
        Card {
            CardHeader {
                title: "Add product".to_string(),
                subtitle: "Broadcast to every open tab".to_string(),
            }
            form { onsubmit: handle_submit,
                CardBody {
                    TextInput {
                        label: "Title".to_string(),
                        value: title.read().clone(),
                        placeholder: "Essence Mascara".to_string(),
                        oninput: move |e: FormEvent| {
                            title.set(e.value());
                            error.set(None);
                        },
                    }
                    TextInput {
                        label: "Description".to_string(),
                        value: description.read().clone(),
                        multiline: true,
                        placeholder: "At least 10 characters".to_string(),
                        oninput: move |e: FormEvent| {
                            description.set(e.value());
                            error.set(None);
                        },
                    }
                    TextInput {
                        label: "Price".to_string(),
                        value: price.read().clone(),
                        placeholder: "9.99".to_string(),
                        oninput: move |e: FormEvent| {
                            price.set(e.value());
                            error.set(None);
                        },
                    }
                    SelectInput {
                        label: "Category".to_string(),
                        value: category.read().clone(),
                        options: category_options.clone(),
                        onchange: move |e: FormEvent| category.set(e.value()),
                    }
                    if let Some(err) = error.read().as_ref() {
                        div { class: "p-3 bg-red-500/10 border border-red-500/30 rounded-lg text-red-400 text-sm",
                            "{err}"
                        }
                    }
                    if let Some(name) = created.read().as_ref() {
                        div { class: "p-3 bg-green-500/10 border border-green-500/30 rounded-lg text-green-400 text-sm",
                            "Added \"{name}\""
                        }
                    }
                    Button {
                        r#type: "submit".to_string(),
                        class: "w-full".to_string(),
                        "Add product"
                    }
                }
            }
        }
    }
}
