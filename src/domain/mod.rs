pub mod config;
pub mod error;
pub mod model;

pub use config::AppConfig;
pub use error::AppError;
pub use model::{
    DownloadState, FetchOutcome, PresenterState, RenderCapability, TransferProgress, ViewerTarget,
};
