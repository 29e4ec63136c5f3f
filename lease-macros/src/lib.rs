mod ensure_cursor;

use ensure_cursor::{EnsureCursorArgs, expand_ensure_cursor};
use proc_macro::TokenStream;
use syn::{ItemFn, parse_macro_input};

/// Decorator form of `lease::ensure_cursor`.
///
/// The function's cursor parameter (named `cursor` unless overridden) is
/// declared as `&mut Cursor<C>`; callers pass `Option<&mut Cursor<C>>`
/// instead. `None` opens a connection from the connector expression for the
/// duration of the call.
///
/// ```rust,ignore
/// #[ensure_cursor(&self.connector)]
/// async fn load_user(&self, id: u64, cursor: &mut Cursor<MySqlConnection>) -> Result<Option<Row>> {
///     cursor.fetch_one(Query::new("SELECT * FROM users WHERE id = ?").bind(id)).await
/// }
///
/// #[ensure_cursor(connector, cursor = session)]
/// fn count(connector: &Factory, session: &mut Cursor<Session>) -> Result<u64> { ... }
/// ```
#[proc_macro_attribute]
pub fn ensure_cursor(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as EnsureCursorArgs);
    let function = parse_macro_input!(item as ItemFn);
    expand_ensure_cursor(args, function)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
