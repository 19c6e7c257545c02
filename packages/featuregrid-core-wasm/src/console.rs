use wasm_bindgen::prelude::*;

// Binding for console.log so the core can log through the browser console
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

// Note: the console_log macro is defined in lib.rs to avoid duplication
