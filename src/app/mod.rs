pub mod service;

pub use service::{
    CleanResponse, CleaningService, DownloadPayload, DownloadSource, FileDataResponse,
    IngestResponse,
};
