use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct CardProps {
    #[props(optional)]
    pub class: Option<String>,
    pub children: Element,
}

#[component]
pub fn Card(props: CardProps) -> Element {
    let base = "bg-[#313338] rounded-lg shadow-2xl border border-[#3f4147]";
    let class = match props.class {
        Some(extra) if !extra.is_empty() => format!("{} {}", base, extra),
        _ => base.to_string(),
    };

    rsx! {
        div { class, {props.children} }
    }
}

#[component]
pub fn CardHeader(title: String, #[props(optional)] subtitle: Option<String>) -> Element {
    rsx! {
        div { class: "px-6 py-4 border-b border-[#3f4147]",
            h3 { class: "text-xl font-bold text-white", "{title}" }
            if let Some(subtitle) = subtitle {
                p { class: "text-sm text-gray-400 mt-1", "{subtitle}" }
            }
        }
    }
}

#[component]
pub fn CardBody(children: Element) -> Element {
    rsx! {
        div { class: "p-6 space-y-4", {children} }
    }
}
