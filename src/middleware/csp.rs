use crate::core::config::CspConfig;
use crate::core::policy::CspPolicy;
use crate::security::nonce::RequestNonce;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::{rc::Rc, sync::Arc, time::Instant};

/// Attaches the configured policy to every response passing through.
///
/// For policies with a nonce placeholder a fresh nonce is drawn per request,
/// written into the header and stored as a [`RequestNonce`] in the request
/// extensions before the wrapped service runs. If no header can be produced
/// the request fails with a 500 and the wrapped service is never called.
#[derive(Clone)]
pub struct CspMiddleware {
    config: Arc<CspConfig>,
}

impl CspMiddleware {
    #[inline]
    pub fn new(config: CspConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn config(&self) -> Arc<CspConfig> {
        self.config.clone()
    }
}

impl<S, B> Transform<S, ServiceRequest> for CspMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CspMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CspMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct CspMiddlewareService<S> {
    service: Rc<S>,
    config: Arc<CspConfig>,
}

impl<S, B> Service<ServiceRequest> for CspMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let timer = Instant::now();
            config.stats().increment_request_count();

            let nonce = config.generate_nonce();
            let header = nonce.and_then(|nonce| {
                let value = config.header_value(nonce.as_deref())?;
                Ok((value, nonce))
            });

            let (header_value, nonce) = match header {
                Ok(header) => header,
                Err(e) => {
                    config.stats().increment_header_failure_count();
                    log::error!("refusing {} {}: {}", req.method(), req.path(), e);
                    return Err(e.into());
                }
            };

            if let Some(nonce) = nonce {
                req.extensions_mut().insert(RequestNonce::new(nonce));
            }

            config.stats().add_header_generation_time(timer.elapsed());

            let mut res = service.call(req).await?;

            log::trace!("{} -> {:?}", config.header_name(), header_value);
            res.headers_mut().insert(config.header_name(), header_value);

            Ok(res)
        })
    }
}

/// Builds the middleware for `policy` with the default nonce generator.
#[inline]
pub fn csp_middleware(policy: CspPolicy) -> CspMiddleware {
    CspMiddleware::new(CspConfig::new(policy))
}

/// Builds the middleware from a prepared config, e.g. one with a custom
/// nonce length or [`NonceSource`](crate::security::NonceSource).
#[inline]
pub fn csp_middleware_with_config(config: CspConfig) -> CspMiddleware {
    CspMiddleware::new(config)
}
