//! Page-side JavaScript snippets.
//!
//! Selectors and ids are embedded as JSON string literals so that quotes in a
//! configured selector cannot break out of the expression.

use movesync_config::SelectorsConfig;

/// Binding the injected observers report through.
pub const NOTIFY_BINDING: &str = "__movesyncNotify";

/// Page global holding the injected observers by subscription id.
const OBSERVER_REGISTRY: &str = "__movesyncObservers";

/// `this.value = value` on the move input.
pub(crate) const SET_VALUE: &str = "function(value) { this.value = value; }";

/// Enter keydown on the move input.
pub(crate) const DISPATCH_CONFIRM: &str = "function() { \
    this.dispatchEvent(new KeyboardEvent('keydown', \
    { key: 'Enter', code: 'Enter', keyCode: 13, which: 13, bubbles: true })); }";

fn literal(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Every ply element as `{text, figurine}`. A ply that cannot be read yields
/// `{text: null, figurine: null}`.
pub(crate) fn ply_nodes(selectors: &SelectorsConfig) -> String {
    format!(
        r#"(() => Array.from(document.querySelectorAll({ply})).map((el) => {{
    try {{
        const icon = el.querySelector({figurine});
        const figurine = icon ? icon.getAttribute({attribute}) : null;
        const text = el.innerText;
        return {{ text: typeof text === "string" ? text : null, figurine }};
    }} catch (e) {{
        return {{ text: null, figurine: null }};
    }}
}}))()"#,
        ply = literal(&selectors.ply),
        figurine = literal(&selectors.figurine),
        attribute = literal(&selectors.figurine_attribute),
    )
}

/// The first element matching `selector`, or `null`.
pub(crate) fn query(selector: &str) -> String {
    format!("document.querySelector({})", literal(selector))
}

/// Whether anything matches `selector`.
pub(crate) fn exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", literal(selector))
}

/// Install a subtree observer on the move list. Evaluates to `false` when
/// the container is absent.
///
/// The observed node is the container's first element child, falling back to
/// the container itself.
pub(crate) fn observe(move_list: &str, subscription: &str) -> String {
    format!(
        r#"(() => {{
    const container = document.querySelector({selector});
    if (!container) return false;
    const target = container.firstElementChild || container;
    const registry = (window[{registry}] = window[{registry}] || {{}});
    if (registry[{id}]) registry[{id}].disconnect();
    const observer = new MutationObserver((records) => {{
        window[{binding}](JSON.stringify({{ subscription: {id}, records: records.length }}));
    }});
    observer.observe(target, {{ childList: true, subtree: true }});
    registry[{id}] = observer;
    return true;
}})()"#,
        selector = literal(move_list),
        registry = literal(OBSERVER_REGISTRY),
        id = literal(subscription),
        binding = literal(NOTIFY_BINDING),
    )
}

/// Disconnect and forget an observer. Evaluates to `false` when unknown.
pub(crate) fn unobserve(subscription: &str) -> String {
    format!(
        r#"(() => {{
    const registry = window[{registry}] || {{}};
    const observer = registry[{id}];
    if (!observer) return false;
    observer.disconnect();
    delete registry[{id}];
    return true;
}})()"#,
        registry = literal(OBSERVER_REGISTRY),
        id = literal(subscription),
    )
}
