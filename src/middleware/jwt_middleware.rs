/// Access Token Middleware
///
/// Verifies the bearer access token and injects `AuthenticatedUser` into
/// request extensions for handlers on protected resources.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{bearer_token, verify_access_token};
use crate::configuration::AuthSettings;
use crate::error::AppError;

/// Identity proven by a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

pub struct JwtMiddleware {
    settings: AuthSettings,
}

impl JwtMiddleware {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    settings: AuthSettings,
}

impl<S> JwtMiddlewareService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
        let token = bearer_token(req.headers())?;
        let user_id = verify_access_token(&token, &self.settings.signing_key)?;
        Ok(AuthenticatedUser { user_id })
    }
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
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
        match self.authenticate(&req) {
            Ok(user) => {
                tracing::debug!(user_id = %user.user_id, "Access token validated");
                req.extensions_mut().insert(user);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}
