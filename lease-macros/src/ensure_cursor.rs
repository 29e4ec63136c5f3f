use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    Expr, FnArg, Ident, ItemFn, Pat, ReturnType, Token, Type,
    parse::{Parse, ParseStream},
    parse_quote,
};

pub(crate) struct EnsureCursorArgs {
    pub(crate) connector: Expr,
    pub(crate) cursor: Ident,
}

impl Parse for EnsureCursorArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Err(syn::Error::new(
                Span::call_site(),
                "Expected the connector expression, for example `#[ensure_cursor(&self.connector)]`",
            ));
        }
        let connector: Expr = input.parse()?;
        let mut cursor = Ident::new("cursor", Span::call_site());
        if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
            let key: Ident = input.parse()?;
            if key != "cursor" {
                return Err(syn::Error::new(
                    key.span(),
                    format!("Unknown argument `{key}`, expected `cursor = <name>`"),
                ));
            }
            input.parse::<Token![=]>()?;
            cursor = input.parse()?;
            input.parse::<Option<Token![,]>>()?;
        }
        Ok(Self { connector, cursor })
    }
}

pub(crate) fn expand_ensure_cursor(
    args: EnsureCursorArgs,
    mut function: ItemFn,
) -> syn::Result<TokenStream> {
    let EnsureCursorArgs { connector, cursor } = args;
    let mut cursor_type: Option<Type> = None;
    for input in function.sig.inputs.iter_mut() {
        let FnArg::Typed(arg) = input else {
            continue;
        };
        let Pat::Ident(pat) = &*arg.pat else {
            continue;
        };
        if pat.ident != cursor {
            continue;
        }
        let Type::Reference(reference) = &*arg.ty else {
            return Err(syn::Error::new_spanned(
                &arg.ty,
                "The cursor parameter must have type `&mut Cursor<_>`",
            ));
        };
        if reference.mutability.is_none() {
            return Err(syn::Error::new_spanned(
                &arg.ty,
                "The cursor parameter must be a mutable reference",
            ));
        }
        let inner = (*reference.elem).clone();
        arg.ty = Box::new(parse_quote!(::std::option::Option<&mut #inner>));
        cursor_type = Some(inner);
    }
    let Some(cursor_type) = cursor_type else {
        return Err(syn::Error::new_spanned(
            &function.sig,
            format!("Missing the cursor parameter `{cursor}: &mut Cursor<_>`"),
        ));
    };
    let output = match &function.sig.output {
        ReturnType::Type(_, ty) => ty.clone(),
        ReturnType::Default => {
            return Err(syn::Error::new_spanned(
                &function.sig,
                "A function using #[ensure_cursor] must return a `Result`",
            ));
        }
    };
    let block = &function.block;
    let body = if function.sig.asyncness.is_some() {
        quote! {
            ::lease::ensure_cursor_async(
                #connector,
                #cursor,
                async move |#cursor: &mut #cursor_type| -> #output #block,
            )
            .await
        }
    } else {
        quote! {
            ::lease::ensure_cursor(
                #connector,
                #cursor,
                move |#cursor: &mut #cursor_type| -> #output #block,
            )
        }
    };
    function.block = Box::new(parse_quote!({ #body }));
    Ok(quote!(#function))
}
