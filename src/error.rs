/// Crate-level error types for jumptocode.
use std::path::PathBuf;

/// Every error carries enough context to produce a useful diagnostic
/// without a debugger. Resolution absences are not errors: they are
/// ordinary `ResolutionOutcome` values.
#[allow(clippy::error_impl_error, reason = "crate-wide error type shared by library and binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `.jumptocode.toml` parsed but holds a value the helper cannot use.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// Description of the offending setting.
        reason: String,
    },

    /// The editor command could not be spawned or exited with a failure.
    #[error("editor `{command}` failed: {reason}")]
    EditorLaunch {
        /// Editor executable that was invoked.
        command: String,
        /// Spawn error or the captured stderr of the failed run.
        reason: String,
    },

    /// HTTP transport failure while talking to the helper server.
    #[error("http: {0}")]
    Http(
        /// The wrapped reqwest error.
        #[from]
        reqwest::Error,
    ),

    /// Underlying I/O error from the filesystem or a socket.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// A page snapshot parsed but references ids it does not contain.
    #[error("snapshot corrupt: {}: {reason}", path.display())]
    SnapshotCorrupt {
        /// Snapshot file, or `<memory>` for snapshots built in process.
        path: PathBuf,
        /// First dangling reference found.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The requested target element does not exist in the snapshot.
    #[error("unknown element: #{id} (snapshot has {count} elements)")]
    UnknownElement {
        /// Number of elements in the snapshot.
        count: usize,
        /// Element index that was requested.
        id: usize,
    },
}
