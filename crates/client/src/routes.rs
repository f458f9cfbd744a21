//! Application routing configuration.

use dioxus::prelude::*;

use crate::views::{Home, Login, Products};

// Router configuration
#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    // Landing page redirects to login or the catalog
    #[route("/")]
    Home {},

    #[route("/login")]
    Login {},

    #[route("/products")]
    Products {},
}
