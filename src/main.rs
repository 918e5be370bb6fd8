#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use actix_files::Files;
    use actix_web::{web, App, HttpServer};
    use leptos::logging::{error, log};
    use leptos::*;
    use leptos_actix::{generate_route_list, LeptosRoutes};
    use review_widget::app::App as ReviewApp;
    use review_widget::config::WidgetConfig;
    use std::io::{Error, ErrorKind};

    // Supabase project settings come from REVIEWS_* variables
    let widget_config = WidgetConfig::from_env().map_err(|err| {
        error!("[SERVER] Invalid review configuration: {}", err);
        Error::new(ErrorKind::InvalidInput, err.to_string())
    })?;
    log!(
        "[SERVER] Serving reviews from {} (realtime: {})",
        widget_config.supabase_url,
        widget_config.enable_realtime
    );

    // Load configuration
    let conf = get_configuration(None)
        .await
        .map_err(|err| Error::new(ErrorKind::Other, err.to_string()))?;
    let addr = conf.leptos_options.site_addr;

    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(ReviewApp);
    log!("listening on http://{}", &addr);

    HttpServer::new(move || {
        let leptos_options = &conf.leptos_options;
        let site_root = &leptos_options.site_root;
        let widget_config = widget_config.clone();

        App::new()
            // Serve JS/WASM/CSS from `pkg`
            .service(Files::new("/pkg", format!("{site_root}/pkg")))
            // Serve other assets from the `assets` directory
            .service(Files::new("/assets", site_root))
            // Serve the favicon from /favicon.ico
            .service(favicon)
            .leptos_routes_with_context(
                leptos_options.to_owned(),
                routes.to_owned(),
                move || provide_context(widget_config.clone()),
                ReviewApp,
            )
            .app_data(web::Data::new(leptos_options.to_owned()))
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(feature = "ssr")]
#[actix_web::get("favicon.ico")]
async fn favicon(
    leptos_options: actix_web::web::Data<leptos::LeptosOptions>,
) -> actix_web::Result<actix_files::NamedFile> {
    let leptos_options = leptos_options.into_inner();
    let site_root = &leptos_options.site_root;
    Ok(actix_files::NamedFile::open(format!(
        "{site_root}/favicon.ico"
    ))?)
}

#[cfg(not(any(feature = "ssr", feature = "csr")))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
    // see optional feature `csr` instead
}

#[cfg(all(not(feature = "ssr"), feature = "csr"))]
pub fn main() {
    // a client-side main function is required for using `trunk serve`
    // to run: `trunk serve --open --features csr`
    use review_widget::app::*;

    review_widget::utils::panic_hook::init();
    leptos::mount_to_body(App);
}
