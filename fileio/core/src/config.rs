use std::path::PathBuf;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FileIoConfig {
    /// Plain paths under this prefix classify as sandbox paths.
    pub sandbox_root: PathBuf,
    /// Root for resolving `file://` URIs owned by another bundle.
    pub share_root: PathBuf,
    /// Own bundle name. When unset, every `file://<bundle>/` URI is treated as own.
    pub bundle_name: Option<String>,
    /// Max bytes moved by a single `sendfile` call during `copy_file`.
    pub copy_chunk_size: usize,
    /// Capacity of the read and write buffers of a stream session.
    pub stream_buffer_size: usize,
    /// Bound of the completion channel used by callback-style async work.
    pub completion_queue_depth: usize,
}

impl Default for FileIoConfig {
    fn default() -> Self {
        Self {
            sandbox_root: PathBuf::from("/data/storage"),
            share_root: PathBuf::from("/data/storage/el2/share"),
            bundle_name: None,
            copy_chunk_size: 0x7fff_f000,
            stream_buffer_size: 8192,
            completion_queue_depth: 64,
        }
    }
}
