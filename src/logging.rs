use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{Status, StatusClass},
    Data, Orbit, Request, Response, Rocket,
};

/// A per-process sequence number identifying one request in the log.
///
/// Cached on the request, so every lookup after the first returns the same ID.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(usize);

impl RequestId {
    /// Take the next sequence number. Wraps around to zero on overflow.
    pub fn next() -> Self {
        static NEXT_REQUEST: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT_REQUEST.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When the request arrived.
struct Arrival(Instant);

/// Describe the route that handled a request.
fn route_of(req: &Request<'_>) -> String {
    match req.route() {
        Some(route) => match route.name {
            Some(ref name) => format!("{name} ({})", route.uri),
            None => route.uri.to_string(),
        },
        None => "no route".to_string(),
    }
}

/// Log at a level matching the severity of the status.
fn log_for_status(status: Status, message: &str) {
    match status.class() {
        StatusClass::ServerError => error!("{message}"),
        StatusClass::ClientError => warn!("{message}"),
        _ => info!("{message}"),
    }
}

/// Logs launch, shutdown, and one line per request and per response.
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let config = rocket.config();
        let scheme = if config.tls_enabled() { "https" } else { "http" };
        info!(
            "Survey server listening on {scheme}://{}:{}",
            config.address, config.port
        );
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        req.local_cache(|| Arrival(Instant::now()));
        let id = req.local_cache(RequestId::next);
        info!("->req{id} {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let took = req.local_cache(|| Arrival(Instant::now())).0.elapsed();
        let status = res.status();
        let message = format!(
            "<-rsp{id} {status} {} in {}ms",
            route_of(req),
            took.as_millis()
        );
        log_for_status(status, &message);
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, stopping gracefully...");
    }
}
