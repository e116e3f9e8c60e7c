use dioxus::prelude::*;
use traceboard_ui::Dashboard;

fn main() {
    // Initialize logging for WASM
    wasm_logger::init(wasm_logger::Config::default());
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).ok();

    launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        Dashboard {}
    }
}
