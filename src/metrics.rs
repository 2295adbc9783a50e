/// Visit counter
///
/// The one piece of shared mutable process state outside the stores. It is
/// created in `startup`, shared through `web::Data` and incremented by the
/// `CountVisits` middleware wrapped around the static file scope.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct VisitCounter {
    hits: AtomicU64,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Counts every request that reaches the wrapped service
pub struct CountVisits {
    counter: web::Data<VisitCounter>,
}

impl CountVisits {
    pub fn new(counter: web::Data<VisitCounter>) -> Self {
        Self { counter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CountVisits
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CountVisitsService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(CountVisitsService {
            service: Rc::new(service),
            counter: self.counter.clone(),
        }))
    }
}

pub struct CountVisitsService<S> {
    service: Rc<S>,
    counter: web::Data<VisitCounter>,
}

impl<S, B> Service<ServiceRequest> for CountVisitsService<S>
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
        let hits = self.counter.record();
        tracing::debug!(hits, path = %req.path(), "Visit recorded");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
