//! Shared fixtures for the consent engine integration and property tests.

use consent_engine::testing::RecordingHost;
use consent_engine::{ConsentManager, LoadOutcome, ServiceHooks};
use consent_types::{CategoryConfig, ConsentConfig, ConsentMode, ScriptElement, ServiceConfig};
use std::cell::RefCell;
use std::rc::Rc;

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consent_engine=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Site configuration used across scenarios.
pub fn site_config(mode: ConsentMode) -> ConsentConfig {
    ConsentConfig {
        mode,
        manage_script_tags: true,
        categories: vec![
            CategoryConfig::new("necessary").read_only(),
            CategoryConfig::new("analytics")
                .enabled()
                .with_service(ServiceConfig::new("ga").with_label("Google Analytics"))
                .with_service(ServiceConfig::new("hotjar")),
            CategoryConfig::new("marketing")
                .with_service(ServiceConfig::new("ads-pixel"))
                .with_service(ServiceConfig::new("newsletter")),
        ],
    }
}

/// Placeholder for a deferred external script.
pub fn external_script(id: &str, category: &str) -> ScriptElement {
    ScriptElement::new(id)
        .attr("type", "text/plain")
        .attr("data-category", category)
        .attr("data-src", format!("https://cdn.example/{id}.js"))
}

/// Placeholder for a deferred inline script.
pub fn inline_script(id: &str, category: &str) -> ScriptElement {
    ScriptElement::new(id)
        .attr("type", "text/plain")
        .attr("data-category", category)
        .inline(format!("window.{id} = true;"))
}

/// Shared record of hook invocations, e.g. `accept:ga`.
pub type HookLog = Rc<RefCell<Vec<String>>>;

/// Hooks that append `accept:<service>` / `reject:<service>` to `log`.
pub fn logging_hooks(log: &HookLog, service: &str) -> ServiceHooks {
    let on_accept = (Rc::clone(log), format!("accept:{service}"));
    let on_reject = (Rc::clone(log), format!("reject:{service}"));
    ServiceHooks::new()
        .on_accept(move || {
            on_accept.0.borrow_mut().push(on_accept.1.clone());
            Ok(())
        })
        .on_reject(move || {
            on_reject.0.borrow_mut().push(on_reject.1.clone());
            Ok(())
        })
}

/// Manager over [`site_config`] with a recording host.
pub fn manager(mode: ConsentMode) -> ConsentManager<RecordingHost> {
    init_tracing();
    match ConsentManager::new(site_config(mode), RecordingHost::new()) {
        Ok(manager) => manager,
        Err(err) => panic!("site config must be valid: {err}"),
    }
}

/// Settle outstanding loads one at a time until none remain. Returns the
/// number of loads settled.
pub fn settle_all(manager: &mut ConsentManager<RecordingHost>) -> usize {
    let mut settled = 0;
    while let Some(ticket) = manager.host_mut().take_ticket() {
        if let Err(err) = manager.load_settled(ticket, LoadOutcome::Loaded) {
            panic!("settling load failed: {err}");
        }
        settled += 1;
    }
    settled
}
