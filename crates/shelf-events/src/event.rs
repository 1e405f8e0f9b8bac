/// Progress reported by catalog operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfEvent {
    /// A metrics sync is about to process `total` entries.
    SyncStarted { total: usize },

    /// Metrics for an entry are being fetched.
    EntrySyncing { entry_id: i32, name: String },

    /// Metrics for an entry were fetched, scored and stored.
    EntrySynced {
        entry_id: i32,
        name: String,
        popularity_score: u8,
        maintenance_score: u8,
    },

    /// An entry could not be synced. The batch continues.
    EntrySyncFailed {
        entry_id: i32,
        name: String,
        error: String,
    },

    /// The sync batch finished.
    SyncComplete {
        success_count: usize,
        fail_count: usize,
    },

    /// Free-form message.
    Log { level: LogLevel, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}
