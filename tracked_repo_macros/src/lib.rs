mod entity;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Entity)]
// ============================================================================

/// Derive macro for the `Entity` trait.
///
/// Declares the collection an entity is stored in and the field(s) that form
/// its identity.
///
/// # Usage
///
/// Single key, explicit collection:
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Entity)]
/// #[entity(collection = "notes")]
/// struct Note {
///     #[entity(key)]
///     id: u64,
///     body: String,
/// }
/// ```
///
/// Composite key (declaration order is key order):
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Entity)]
/// struct OrderLine {
///     #[entity(key)]
///     order_id: String,
///     #[entity(key)]
///     line: u32,
///     quantity: u32,
/// }
/// ```
///
/// Without `collection`, the snake_case struct name plus `s` is used
/// (`OrderLine` → `order_lines`). Without any `#[entity(key)]` field, a field
/// named `id` is the key.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input)
}
