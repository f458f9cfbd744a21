use dioxus::prelude::*;

const FIELD_CLASS: &str = "w-full bg-[#2b2d31] border border-[#3f4147] rounded-lg px-4 py-3 text-white placeholder-[#6d6f78] focus:outline-none focus:border-indigo-500 transition-colors";

#[derive(Props, Clone, PartialEq)]
pub struct TextInputProps {
    pub label: String,
    pub value: String,
    pub oninput: EventHandler<FormEvent>,
    #[props(optional)]
    pub r#type: Option<String>,
    #[props(optional)]
    pub placeholder: Option<String>,
    #[props(optional)]
    pub multiline: Option<bool>,
}

#[component]
pub fn TextInput(props: TextInputProps) -> Element {
    rsx! {
        div {
            label { class: "block text-sm font-medium text-gray-300 mb-2", "{props.label}" }
            if props.multiline.unwrap_or(false) {
                textarea {
                    class: "{FIELD_CLASS} min-h-[96px]",
                    placeholder: props.placeholder.clone().unwrap_or_default(),
                    value: "{props.value}",
                    oninput: move |e| props.oninput.call(e),
                }
            } else {
                input {
                    class: FIELD_CLASS,
                    r#type: props.r#type.clone().unwrap_or_else(|| "text".to_string()),
                    placeholder: props.placeholder.clone().unwrap_or_default(),
                    value: "{props.value}",
                    oninput: move |e| props.oninput.call(e),
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct SelectInputProps {
    pub label: String,
    pub value: String,
    pub options: Vec<(String, String)>,
    pub onchange: EventHandler<FormEvent>,
}

#[component]
pub fn SelectInput(props: SelectInputProps) -> Element {
    rsx! {
        div {
            label { class: "block text-sm font-medium text-gray-300 mb-2", "{props.label}" }
            select {
                class: FIELD_CLASS,
                value: "{props.value}",
                onchange: move |e| props.onchange.call(e),
                for (value, label) in props.options.iter() {
                    option { value: "{value}", selected: *value == props.value, "{label}" }
                }
            }
        }
    }
}
