//! Template context — the inventory as Tera sees it.

use invgen_core::Inventory;

/// Copy every top-level inventory entry into a [`tera::Context`].
///
/// Keys that are not valid identifiers are still inserted; templates reach
/// them through `var(key="…")`.
pub fn to_tera_context(inventory: &Inventory) -> tera::Context {
    let mut ctx = tera::Context::new();
    for (key, value) in inventory {
        ctx.insert(key.as_str(), value);
    }
    ctx
}
