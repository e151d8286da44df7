//! Typed client for rTorrent's XML-RPC interface.
//!
//! rTorrent exposes its state over XML-RPC, but the interesting endpoints
//! (`t.multicall`, `d.multicall2`) answer with matrices of loosely typed
//! values whose encodings vary between server versions. This crate turns
//! those payloads into typed records: batched tracker queries come back as
//! [`Tracker`] values with per-field typed accessors, and the scalar
//! endpoints are wrapped in typed helpers.
//!
//! The wire protocol itself is injected: implement [`Transport`] for
//! whatever speaks XML-RPC to your rTorrent instance and hand it to
//! [`Client::new`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rtorrent_client::{Client, TrackerField, TrackerIndex};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = Client::new(my_transport);
//!
//! let trackers = client
//!     .trackers()
//!     .tracker_with_details(
//!         Some(&TrackerIndex::whole(info_hash)),
//!         &[TrackerField::URL, TrackerField::IS_USABLE],
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//!
//! for tracker in &trackers {
//!     println!("{}: usable = {}", tracker.url()?, tracker.is_usable()?);
//! }
//! ```

pub mod downloads;
pub mod error;
pub mod tracker;
pub mod trackers;
pub mod transport;
pub mod value;

pub use downloads::DownloadService;
pub use error::{Error, Result};
pub use tracker::{Tracker, TrackerEvent, TrackerField, TrackerIndex, TrackerType};
pub use trackers::{DetailsError, TrackerService};
pub use transport::Transport;
pub use value::Value;

use std::sync::Arc;

use tracing::debug;

/// An rTorrent client. Cheap to clone; all clones share one transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a new client on top of an XML-RPC transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Tracker queries.
    pub fn trackers(&self) -> TrackerService {
        TrackerService::new(self.clone())
    }

    /// Download list queries.
    pub fn downloads(&self) -> DownloadService {
        DownloadService::new(self.clone())
    }

    /// Total bytes downloaded since rTorrent startup.
    pub async fn download_total(&self) -> Result<i64> {
        self.get_int("down.total", "").await
    }

    /// Total bytes uploaded since rTorrent startup.
    pub async fn upload_total(&self) -> Result<i64> {
        self.get_int("up.total", "").await
    }

    /// Current global download rate in bytes per second.
    pub async fn download_rate(&self) -> Result<i64> {
        self.get_int("down.rate", "").await
    }

    /// Current global upload rate in bytes per second.
    pub async fn upload_rate(&self) -> Result<i64> {
        self.get_int("up.rate", "").await
    }

    /// Call a method returning a single integer.
    pub(crate) async fn get_int(&self, method: &str, arg: &str) -> Result<i64> {
        self.transport.call(method, single_arg(arg)).await?.to_int()
    }

    /// Call a method returning a single string.
    pub(crate) async fn get_string(&self, method: &str, arg: &str) -> Result<String> {
        self.transport.call(method, single_arg(arg)).await?.to_text()
    }

    /// Call a list-returning method. rTorrent expects an empty view target
    /// as the first argument.
    pub(crate) async fn get_string_list(&self, method: &str, args: &[&str]) -> Result<Vec<String>> {
        let mut send = vec![Value::Text(String::new())];
        send.extend(args.iter().map(|a| Value::Text((*a).to_string())));
        match self.transport.call(method, send).await? {
            Value::List(items) => items.iter().map(|item| item.to_text()).collect(),
            _ => Err(Error::BadData),
        }
    }

    /// Call a matrix-returning multicall with an empty target.
    pub(crate) async fn get_matrix(&self, method: &str, args: &[&str]) -> Result<Vec<Vec<Value>>> {
        let mut send = vec![Value::Text(String::new())];
        send.extend(args.iter().map(|a| Value::Text((*a).to_string())));
        into_matrix(self.transport.call(method, send).await?)
    }

    /// Call a matrix-returning multicall addressed at one download. The
    /// target comes first, followed by the empty pattern argument the
    /// protocol requires.
    pub(crate) async fn get_matrix_by_hash(
        &self,
        method: &str,
        args: Vec<String>,
    ) -> Result<Vec<Vec<Value>>> {
        let mut iter = args.into_iter();
        let target = iter.next().unwrap_or_default();
        let mut send = vec![Value::Text(target), Value::Text(String::new())];
        send.extend(iter.map(Value::Text));
        debug!(method, "issuing multicall");
        into_matrix(self.transport.call(method, send).await?)
    }
}

fn single_arg(arg: &str) -> Vec<Value> {
    if arg.is_empty() {
        Vec::new()
    } else {
        vec![Value::Text(arg.to_string())]
    }
}

fn into_matrix(value: Value) -> Result<Vec<Vec<Value>>> {
    let Value::List(rows) = value else {
        return Err(Error::BadData);
    };
    rows.into_iter()
        .map(|row| match row {
            Value::List(cells) => Ok(cells),
            _ => Err(Error::BadData),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[tokio::test]
    async fn global_stats_decode_integers() {
        let mock = MockTransport::with_response(Ok(Value::Long(1024)));
        let calls = mock.calls();
        let client = Client::new(mock);

        assert_eq!(client.download_rate().await.unwrap(), 1024);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("down.rate".to_string(), Vec::new())]);
    }

    #[tokio::test]
    async fn get_int_tolerates_textual_encoding() {
        let mock = MockTransport::with_response(Ok(Value::Text("2048".into())));
        let client = Client::new(mock);

        assert_eq!(client.upload_total().await.unwrap(), 2048);
    }

    #[tokio::test]
    async fn non_list_answer_to_a_list_method_is_bad_data() {
        let mock = MockTransport::with_response(Ok(Value::Long(1)));
        let client = Client::new(mock);

        assert!(matches!(
            client.get_string_list("download_list", &[]).await,
            Err(Error::BadData)
        ));
    }

    #[tokio::test]
    async fn transport_errors_propagate_verbatim() {
        let mock = MockTransport::with_response(Err(Error::Transport("boom".into())));
        let client = Client::new(mock);

        match client.download_total().await {
            Err(Error::Transport(message)) => assert_eq!(message, "boom"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
