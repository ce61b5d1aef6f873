//! Function tracing attribute macro (proc macro crate)
//!
//! `#[log_function]` wraps a function body in `logger_bridge::trace`, so every
//! call logs its start, its completion, and any error it returns. Use it
//! through the `logger_bridge` re-export.

use proc_macro::TokenStream;
use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use quote::{quote, ToTokens};
use syn::{parse_macro_input, ItemFn, LitStr, ReturnType, Type};

/// Log entry, exit and errors of the annotated function.
///
/// Usage:
/// ```rust,ignore
/// use logger_bridge::log_function;
///
/// #[log_function]
/// fn settle(invoice: u64) -> Result<u64, BillingError> {
///     // ...
/// }
///
/// #[log_function(name = "inventory.restock")]
/// async fn restock(sku: &str) -> usize {
///     // ...
/// }
/// ```
///
/// Functions returning a type named `Result` have their `Err` values logged
/// at ERROR severity; the error type must implement `Display`. A panic is
/// logged and then resumed. The signature, attributes and visibility of the
/// function are left as written.
#[proc_macro_attribute]
pub fn log_function(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut name: Option<LitStr> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported log_function argument, expected `name = \"...\"`"))
        }
    });
    parse_macro_input!(args with parser);

    let input_fn = parse_macro_input!(input as ItemFn);
    match expand(&input_fn, name) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input_fn: &ItemFn, name: Option<LitStr>) -> syn::Result<TokenStream2> {
    let sig = &input_fn.sig;
    if let Some(constness) = &sig.constness {
        return Err(syn::Error::new_spanned(
            constness,
            "#[log_function] cannot be applied to a const fn",
        ));
    }

    let fn_attrs = &input_fn.attrs;
    let fn_vis = &input_fn.vis;
    let fn_block = &input_fn.block;
    let name = name.unwrap_or_else(|| LitStr::new(&sig.ident.to_string(), sig.ident.span()));

    let fallible = returns_result(&sig.output);
    let annotation = match &sig.output {
        ReturnType::Type(_, ty) if can_annotate(ty) => Some(ty),
        _ => None,
    };

    let body = if sig.asyncness.is_some() {
        let future = match annotation {
            Some(ty) => quote! { async move { let __traced_output: #ty = #fn_block; __traced_output } },
            None => quote! { async move #fn_block },
        };
        if fallible {
            quote! { ::logger_bridge::trace::try_run_async(#name, #future).await }
        } else {
            quote! { ::logger_bridge::trace::run_async(#name, #future).await }
        }
    } else {
        let closure = match annotation {
            Some(ty) => quote! { move || -> #ty #fn_block },
            None => quote! { move || #fn_block },
        };
        if fallible {
            quote! { ::logger_bridge::trace::try_run(#name, #closure) }
        } else {
            quote! { ::logger_bridge::trace::run(#name, #closure) }
        }
    };

    Ok(quote! {
        #(#fn_attrs)*
        #fn_vis #sig {
            #body
        }
    })
}

/// `true` when the declared return type's last path segment is `Result`.
fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let mut ty = ty.as_ref();
    while let Type::Paren(inner) = ty {
        ty = &inner.elem;
    }
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        _ => false,
    }
}

/// Closure return annotations cannot name `impl Trait` and do not get the
/// function's lifetime elision, so those types are left to inference.
fn can_annotate(ty: &Type) -> bool {
    fn plain(tokens: TokenStream2) -> bool {
        tokens.into_iter().all(|token| match token {
            TokenTree::Ident(ident) => ident != "impl",
            TokenTree::Punct(punct) => punct.as_char() != '&' && punct.as_char() != '\'',
            TokenTree::Group(group) => plain(group.stream()),
            TokenTree::Literal(_) => true,
        })
    }
    plain(ty.to_token_stream())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn output(item: &ItemFn) -> &ReturnType {
        &item.sig.output
    }

    #[test]
    fn test_result_detection_uses_last_segment() {
        let plain: ItemFn = parse_quote! { fn a() -> u32 { 1 } };
        let std_result: ItemFn = parse_quote! { fn b() -> Result<u32, String> { Ok(1) } };
        let io_result: ItemFn = parse_quote! { fn c() -> std::io::Result<()> { Ok(()) } };
        let unit: ItemFn = parse_quote! { fn d() {} };

        assert!(!returns_result(output(&plain)));
        assert!(returns_result(output(&std_result)));
        assert!(returns_result(output(&io_result)));
        assert!(!returns_result(output(&unit)));
    }

    #[test]
    fn test_borrowed_and_opaque_types_are_not_annotated() {
        let owned: Type = parse_quote! { Result<Vec<String>, Error> };
        let borrowed: Type = parse_quote! { Option<&str> };
        let named: Type = parse_quote! { Cow<'a, str> };
        let opaque: Type = parse_quote! { impl Iterator<Item = u8> };

        assert!(can_annotate(&owned));
        assert!(!can_annotate(&borrowed));
        assert!(!can_annotate(&named));
        assert!(!can_annotate(&opaque));
    }

    #[test]
    fn test_expansion_wraps_body_and_keeps_signature() {
        let item: ItemFn = parse_quote! {
            #[inline]
            pub fn settle(invoice: u64) -> Result<u64, String> {
                Ok(invoice)
            }
        };

        let expanded = expand(&item, None).unwrap().to_string();

        assert!(expanded.starts_with("# [inline] pub fn settle (invoice : u64)"));
        assert!(expanded.contains(":: logger_bridge :: trace :: try_run (\"settle\""));
        assert!(expanded.contains("move || -> Result < u64 , String >"));
    }

    #[test]
    fn test_async_functions_await_the_traced_future() {
        let item: ItemFn = parse_quote! {
            async fn restock(sku: String) -> usize { sku.len() }
        };

        let expanded = expand(&item, Some(parse_quote!("inventory.restock")))
            .unwrap()
            .to_string();

        assert!(expanded.contains(
            ":: logger_bridge :: trace :: run_async (\"inventory.restock\" , async move"
        ));
        assert!(expanded.ends_with(". await }"));
    }

    #[test]
    fn test_const_fn_is_rejected() {
        let item: ItemFn = parse_quote! { const fn zero() -> u8 { 0 } };
        assert!(expand(&item, None).is_err());
    }
}
