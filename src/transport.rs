//! The injected RPC transport seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::value::Value;

/// A connection to rTorrent's XML-RPC endpoint.
///
/// The client is transport-agnostic: anything that can execute a single
/// `method(args…)` call and hand back a decoded [`Value`] works, whether it
/// speaks XML-RPC over HTTP, SCGI, or a unix socket. Failures are reported
/// as [`Error::Transport`](crate::Error::Transport) and propagated to the
/// caller verbatim. Implementations must be safe for concurrent independent
/// calls, or serialize them internally.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one remote call and return its decoded result.
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value>;
}
