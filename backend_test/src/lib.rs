use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, running it against
/// a freshly built server on an empty in-memory store.
///
/// The only injectable dependency is [`rocket::local::asynchronous::Client`].
/// With `#[backend_test(owner)]` the client is first registered and signed in
/// as the example owner account.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Sign in the client as the example owner if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        None => TokenStream2::new(),
        Some(arg) if arg == "owner" => quote! {
            let response = rocket_client
                .post("/auth/register")
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::auth::AccountCredentials::example1()).to_string())
                .dispatch()
                .await;
            assert_eq!(rocket::http::Status::Created, response.status(), "Failed to sign in the example owner");
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no arguments or `owner`")
                .into_compile_error()
                .into();
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(["survey_backend"], None, None);

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let rocket_client = rocket::local::asynchronous::Client::tracked(crate::build_for_tests())
                    .await
                    .unwrap();
                #maybe_login
                #new_name(#(#test_args),*).await
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async and reject parameters that can't be injected.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut args = vec![];
    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                let is_client = type_path
                    .path
                    .segments
                    .last()
                    .map(|segment| segment.ident == "Client")
                    .unwrap_or(false);
                if is_client {
                    if !args.is_empty() {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    args.push(quote! { rocket_client });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected `client_ident: Client`",
        ));
    }

    Ok(args)
}
