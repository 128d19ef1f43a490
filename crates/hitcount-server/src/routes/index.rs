/// `GET /` — plain-text identity line, usable as a trivial liveness check.
pub async fn index() -> &'static str {
    concat!("hitcount ", env!("CARGO_PKG_VERSION"), " is running\n")
}
