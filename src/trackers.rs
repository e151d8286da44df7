//! Batched tracker queries over `t.multicall`.

use std::collections::HashMap;

use thiserror::Error as ThisError;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tracker::{Tracker, TrackerField, TrackerIndex};
use crate::value::Value;
use crate::Client;

/// Method which retrieves a row of tracker attributes per matched tracker.
/// See <https://rtorrent-docs.readthedocs.io/en/latest/cmd-ref.html#download-items-and-attributes>
const TRACKER_LIST_MULTICALL: &str = "t.multicall";

/// A failed tracker query, carrying whatever records were assembled before
/// the failure.
#[derive(Debug, ThisError)]
#[error("{error}")]
pub struct DetailsError {
    /// Records built before the failure: an empty placeholder for pre-flight
    /// validation failures, possibly several populated records for
    /// mid-assembly failures.
    pub trackers: Vec<Tracker>,
    /// What went wrong.
    #[source]
    pub error: Error,
}

/// Tracker queries against a [`Client`].
pub struct TrackerService {
    client: Client,
}

impl TrackerService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `fields` for the tracker(s) addressed by `index` in a single
    /// multicall round trip.
    ///
    /// A `None` index and any field outside [`TrackerField::ALL`] are
    /// rejected before any network I/O. When the server answers with exactly
    /// one row the caller's index is kept verbatim; a multi-row answer
    /// always means the whole tracker list, so each record gets its row
    /// position as index regardless of what the caller supplied. The
    /// in-flight call is abandoned, not retracted, as soon as `cancel`
    /// fires.
    ///
    /// On error, any records assembled before the failure ride along inside
    /// [`DetailsError`].
    pub async fn tracker_with_details(
        &self,
        index: Option<&TrackerIndex>,
        fields: &[TrackerField],
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<Tracker>, DetailsError> {
        let Some(index) = index else {
            return Err(DetailsError {
                trackers: Vec::new(),
                error: Error::NilTrackerIndex,
            });
        };

        let placeholder = Tracker::empty(index.clone());
        let mut args = Vec::with_capacity(fields.len() + 1);
        args.push(index.to_string());
        for field in fields {
            if !field.is_known() {
                return Err(DetailsError {
                    trackers: vec![placeholder],
                    error: Error::UnknownField(field.as_str()),
                });
            }
            args.push(field.as_xmlrpc_argument());
        }

        let rows = match self
            .call_with_cancel(TRACKER_LIST_MULTICALL, args, cancel)
            .await
        {
            Ok(rows) => rows,
            Err(error) => {
                return Err(DetailsError {
                    trackers: vec![placeholder],
                    error,
                })
            }
        };
        debug!(index = %index, rows = rows.len(), "tracker multicall answered");

        // More than one row always means the whole tracker list was
        // addressed, so per-row indices are synthesized positionally.
        let whole_list = rows.len() > 1;
        let mut trackers = Vec::with_capacity(rows.len());
        for (position, row) in rows.into_iter().enumerate() {
            let row_index = if whole_list {
                TrackerIndex::member(index.info_hash(), position)
            } else {
                index.clone()
            };
            match tracker_data_from_row(fields, row) {
                Ok(data) => trackers.push(Tracker::new(row_index, data)),
                Err(error) => return Err(DetailsError { trackers, error }),
            }
        }
        Ok(trackers)
    }

    /// Run the multicall on its own task and race it against `cancel`. The
    /// worker writes its outcome at most once; if the signal wins, the
    /// eventual result is dropped along with the channel.
    async fn call_with_cancel(
        &self,
        method: &str,
        args: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<Value>>> {
        let client = self.client.clone();
        let method = method.to_string();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = client.get_matrix_by_hash(&method, args).await;
            let _ = tx.send(result);
        });

        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            outcome = rx => {
                outcome.map_err(|_| Error::Transport("multicall task dropped its result".into()))?
            }
        }
    }
}

/// Zip one response row with the requested fields.
fn tracker_data_from_row(
    fields: &[TrackerField],
    row: Vec<Value>,
) -> Result<HashMap<TrackerField, Value>> {
    if row.is_empty() {
        return Err(Error::NoDataFromTracker);
    }
    if row.len() != fields.len() {
        return Err(Error::FieldCountMismatch {
            expected: fields.len(),
            got: row.len(),
        });
    }
    Ok(fields.iter().copied().zip(row).collect())
}
