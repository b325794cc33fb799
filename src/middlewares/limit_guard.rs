use crate::models::LimitKind;
use crate::services::BillingService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

/// Pre-action quota check for a scope of routes.
///
/// Reads the numeric user id the auth layer stores in the request extensions.
/// Requests without one pass through untouched.
///
/// ```ignore
/// web::scope("/posts")
///     .wrap(LimitGuard::new(LimitKind::Post, billing.clone()))
///     .route("", web::post().to(create_post))
/// ```
pub struct LimitGuard {
    kind: LimitKind,
    billing: BillingService,
}

impl LimitGuard {
    pub fn new(kind: LimitKind, billing: BillingService) -> Self {
        Self { kind, billing }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LimitGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LimitGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LimitGuardService {
            service: Rc::new(service),
            kind: self.kind,
            billing: self.billing.clone(),
        }))
    }
}

pub struct LimitGuardService<S> {
    service: Rc<S>,
    kind: LimitKind,
    billing: BillingService,
}

impl<S, B> Service<ServiceRequest> for LimitGuardService<S>
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
        // 放行所有 CORS 预检请求
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        // 没有用户身份时不做检查
        let Some(user_id) = current_user_id(&req) else {
            return Box::pin(self.service.call(req));
        };

        let service = Rc::clone(&self.service);
        let billing = self.billing.clone();
        let kind = self.kind;
        Box::pin(async move {
            billing.check_limit(user_id, kind).await?;
            service.call(req).await
        })
    }
}

/// User id placed in the request extensions by the auth middleware.
pub fn current_user_id(req: &ServiceRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}
