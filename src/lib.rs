pub mod decode;
pub mod discovery;
pub mod incremental;
pub mod line_joiner;
pub mod parallel_processing;
pub mod reader;
pub mod restart_log;

// Re-export main types for convenient access
pub use line_joiner::{
    CleanOptions, CleanReport, DetectionStats, DetectionThresholds, JoinStrategy, JoinerOptions, LineReflower,
    SourceKind,
};

pub use decode::{smart_decode, DecodedText, TextEncoding};

pub use incremental::{aux_file_exists, create_complete_aux_file, generate_aux_file_path, is_aux_file, read_aux_file};

pub use parallel_processing::{process_files_parallel, write_stats, FileStats, ProcessingConfig, RunStats};
pub use restart_log::{options_digest, should_process_file, FileFingerprint, RestartLog};
