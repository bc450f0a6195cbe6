use crate::demo::pages;
use crate::demo::policies::{count_script_integrity, DemoPolicies};
use crate::middleware::{csp_middleware, CspExtensions};
use crate::security::nonce::RequestNonce;
use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(pages::WELCOME)
}

async fn basics() -> HttpResponse {
    html(pages::list_names())
}

async fn hashes() -> HttpResponse {
    html(pages::list_names_with_count())
}

async fn remote_hashes() -> HttpResponse {
    html(pages::list_names_with_sri(&count_script_integrity()))
}

async fn inline_hashes() -> HttpResponse {
    html(pages::list_names_with_count_inline())
}

async fn nonces(nonce: RequestNonce) -> HttpResponse {
    html(pages::list_names_with_count_nonces(nonce.as_str()))
}

async fn twitter() -> HttpResponse {
    html(pages::twitter(None))
}

async fn twitter_with_nonce(nonce: RequestNonce) -> HttpResponse {
    html(pages::twitter(Some(nonce.as_str())))
}

async fn custom(req: HttpRequest) -> HttpResponse {
    html(pages::twitter(req.get_nonce().as_deref()))
}

async fn script(path: web::Path<String>) -> HttpResponse {
    match path.as_str() {
        "count.js" => HttpResponse::Ok()
            .content_type("application/javascript")
            .body(pages::COUNT_JS),
        _ => HttpResponse::NotFound().finish(),
    }
}

macro_rules! protected {
    ($path:expr, $policy:expr, $handler:expr) => {
        web::resource($path)
            .route(web::get().to($handler))
            .wrap(csp_middleware($policy))
    };
}

/// Registers every demo route, each behind its own policy.
pub fn configure(policies: DemoPolicies) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.route("/", web::get().to(index))
            .route("/js/{file}", web::get().to(script))
            .route("/twitter-step0", web::get().to(twitter))
            .service(protected!("/basics", policies.basics, basics))
            .service(protected!("/hashes", policies.hashes, hashes))
            .service(protected!("/remotehashes", policies.remote_hashes, remote_hashes))
            .service(protected!("/inlinehashes", policies.inline_hashes, inline_hashes))
            .service(protected!("/nonces", policies.nonces, nonces))
            .service(protected!("/strict-dynamic", policies.strict_dynamic, twitter_with_nonce))
            .service(protected!("/universal-csp", policies.universal, twitter_with_nonce));

        for (step, policy) in policies.twitter.into_iter().enumerate() {
            let path = format!("/twitter-step{}", step + 1);
            cfg.service(protected!(path, policy, twitter));
        }

        if let Some(policy) = policies.custom {
            cfg.service(protected!("/custom", policy, custom));
        }
    }
}
