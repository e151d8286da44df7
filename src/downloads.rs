//! Download list queries.

use crate::error::Result;
use crate::value::Value;
use crate::Client;

/// Method which retrieves a list of download info-hashes.
const DOWNLOAD_LIST: &str = "download_list";

/// Multicall variant returning per-download attribute rows.
/// See <https://rtorrent-docs.readthedocs.io/en/latest/cmd-ref.html#download-items-and-attributes>
const DOWNLOAD_LIST_MULTICALL: &str = "d.multicall2";

/// Download queries against a [`Client`].
pub struct DownloadService {
    client: Client,
}

impl DownloadService {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// All downloads.
    pub async fn all(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &[]).await
    }

    /// Started downloads.
    pub async fn started(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["started"]).await
    }

    /// Stopped downloads.
    pub async fn stopped(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["stopped"]).await
    }

    /// Complete downloads.
    pub async fn complete(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["complete"]).await
    }

    /// Incomplete downloads.
    pub async fn incomplete(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["incomplete"]).await
    }

    /// Downloads currently hashing.
    pub async fn hashing(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["hashing"]).await
    }

    /// Seeding downloads.
    pub async fn seeding(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["seeding"]).await
    }

    /// Leeching downloads.
    pub async fn leeching(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["leeching"]).await
    }

    /// Active downloads.
    pub async fn active(&self) -> Result<Vec<String>> {
        self.client.get_string_list(DOWNLOAD_LIST, &["active"]).await
    }

    /// One attribute row per active download, with one value per entry in
    /// `commands` (e.g. `d.name=`). The rows are returned untyped; callers
    /// decode them with the [`Value`] coercions.
    pub async fn download_with_details(&self, commands: &[&str]) -> Result<Vec<Vec<Value>>> {
        let mut args = Vec::with_capacity(commands.len() + 1);
        args.push("active");
        args.extend_from_slice(commands);
        self.client.get_matrix(DOWNLOAD_LIST_MULTICALL, &args).await
    }

    /// Base filename shown in the rTorrent UI for one download.
    pub async fn base_filename(&self, info_hash: &str) -> Result<String> {
        self.client.get_string("d.base_filename", info_hash).await
    }

    /// Current download rate in bytes per second for one download.
    pub async fn download_rate(&self, info_hash: &str) -> Result<i64> {
        self.client.get_int("d.down.rate", info_hash).await
    }

    /// Total bytes downloaded for one download.
    pub async fn download_total(&self, info_hash: &str) -> Result<i64> {
        self.client.get_int("d.down.total", info_hash).await
    }

    /// Current upload rate in bytes per second for one download.
    pub async fn upload_rate(&self, info_hash: &str) -> Result<i64> {
        self.client.get_int("d.up.rate", info_hash).await
    }

    /// Total bytes uploaded for one download.
    pub async fn upload_total(&self, info_hash: &str) -> Result<i64> {
        self.client.get_int("d.up.total", info_hash).await
    }
}
