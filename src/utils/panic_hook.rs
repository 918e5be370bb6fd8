use std::panic;
use std::sync::Once;
use leptos::logging::log;

static INSTALL: Once = Once::new();

/// Forwards panics to the browser console and adds context for panics raised
/// by a review section that outlived its reactive owner.
pub fn set_custom_panic_hook() {
    console_error_panic_hook::set_once();
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        original_hook(panic_info);

        let message = if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };

        if is_owner_disposal(&message) {
            log!("[PANIC] A review section was used after its owner was disposed. This usually happens when:");
            log!("[PANIC] 1. A realtime insert arrived for a section that has been unmounted");
            log!("[PANIC] 2. A load or submit request resolved after the section was removed");
            log!("[PANIC] Check that the section's subscription is unsubscribed on cleanup");
        }
    }));
}

fn is_owner_disposal(message: &str) -> bool {
    message.contains("OwnerDisposed") || message.contains("disposed")
}

/// Call once from every wasm entry point; repeated calls are ignored.
pub fn init() {
    INSTALL.call_once(|| {
        log!("[PANIC_HOOK] Setting up custom panic hook");
        set_custom_panic_hook();
    });
}
