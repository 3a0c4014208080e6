#![cfg(all(target_arch = "wasm32", feature = "wasm-web"))]

use std::time::Duration;

use entrolytics_web::platform::browser::ElementTarget;
use entrolytics_web::tracker::constants::SCRIPT_ELEMENT_ID;
use entrolytics_web::tracker::{
    EntrolyticsBridge, EntrolyticsConfig, Properties, TrackClick, TrackClickParams,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window()
        .and_then(|window| window.document())
        .expect("document")
}

fn remove_script() {
    if let Some(existing) = document().get_element_by_id(SCRIPT_ELEMENT_ID) {
        existing.remove();
    }
}

/// Installs a fake `window.entrolytics` that appends `[name, data]` to `window.__calls`.
fn install_fake_tracker() {
    let global = js_sys::global();
    js_sys::Reflect::set(&global, &JsValue::from_str("__calls"), &js_sys::Array::new())
        .expect("reset calls");
    let track = js_sys::Function::new_with_args(
        "name, data",
        "window.__calls.push([name === undefined ? null : name, data === undefined ? null : data]);",
    );
    let tracker = js_sys::Object::new();
    js_sys::Reflect::set(&tracker, &JsValue::from_str("track"), &track).expect("set track");
    js_sys::Reflect::set(&tracker, &JsValue::from_str("identify"), &track).expect("set identify");
    js_sys::Reflect::set(&global, &JsValue::from_str("entrolytics"), &tracker)
        .expect("install tracker");
}

fn uninstall_tracker() {
    let _ = js_sys::Reflect::delete_property(&js_sys::global(), &JsValue::from_str("entrolytics"));
}

fn recorded_calls() -> js_sys::Array {
    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("__calls"))
        .map(|value| value.unchecked_into::<js_sys::Array>())
        .unwrap_or_else(|_| js_sys::Array::new())
}

#[wasm_bindgen_test]
fn initialize_appends_tagged_script() {
    remove_script();
    let bridge = EntrolyticsBridge::new();
    bridge
        .initialize(
            EntrolyticsConfig::new("wasm-site")
                .with_host("https://stats.example.com/")
                .with_domains(["example.com", "example.org"]),
        )
        .expect("initialize");

    let script = document()
        .get_element_by_id(SCRIPT_ELEMENT_ID)
        .expect("script element")
        .dyn_into::<web_sys::HtmlScriptElement>()
        .expect("script type");
    assert_eq!(script.src(), "https://stats.example.com/script.js");
    assert!(script.defer());
    assert_eq!(
        script.get_attribute("data-website-id").as_deref(),
        Some("wasm-site")
    );
    assert_eq!(
        script.get_attribute("data-domains").as_deref(),
        Some("example.com,example.org")
    );
    assert!(script.get_attribute("data-auto-track").is_none());
}

#[wasm_bindgen_test]
fn existing_script_is_reused() {
    remove_script();
    let element = document().create_element("script").expect("create");
    element.set_id(SCRIPT_ELEMENT_ID);
    document().head().expect("head").append_child(&element).expect("append");

    let bridge = EntrolyticsBridge::new();
    bridge
        .initialize(EntrolyticsConfig::new("wasm-site"))
        .expect("initialize");

    assert!(bridge.is_loaded());
    assert!(bridge.is_ready());
    assert_eq!(
        document()
            .query_selector_all(&format!("#{SCRIPT_ELEMENT_ID}"))
            .expect("query")
            .length(),
        1
    );
}

#[wasm_bindgen_test]
fn track_event_reaches_global_tracker() {
    install_fake_tracker();
    let bridge = EntrolyticsBridge::new();
    let mut data = Properties::new();
    data.insert("plan".into(), "pro".into());

    bridge.track_event("signup", data);

    let calls = recorded_calls();
    assert_eq!(calls.length(), 1);
    let call: js_sys::Array = calls.get(0).unchecked_into();
    assert_eq!(call.get(0).as_string().as_deref(), Some("signup"));
}

#[wasm_bindgen_test(async)]
async fn deferred_call_waits_for_tracker() {
    uninstall_tracker();
    let bridge = EntrolyticsBridge::new();
    bridge.track_event("late", Properties::new());

    gloo_timers::future::sleep(Duration::from_millis(250)).await;
    install_fake_tracker();
    gloo_timers::future::sleep(Duration::from_millis(250)).await;

    assert_eq!(recorded_calls().length(), 1);
}

#[wasm_bindgen_test]
fn click_binding_tracks_until_destroyed() {
    install_fake_tracker();
    let bridge = EntrolyticsBridge::new();
    let button = document().create_element("button").expect("button");
    document().body().expect("body").append_child(&button).expect("append");

    let target = ElementTarget::new(button.clone());
    let binding = TrackClick::attach(
        &target,
        &bridge,
        TrackClickParams::new("cta-click", Properties::new()),
    )
    .expect("attach");

    let html: web_sys::HtmlElement = button.clone().unchecked_into();
    html.click();
    binding.destroy();
    html.click();

    assert_eq!(recorded_calls().length(), 1);
}
