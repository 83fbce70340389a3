use std::path::PathBuf;

const DEFAULT_SOURCE_URL: &str = "https://storage.googleapis.com/10th_science/Aram.pdf";
const DEFAULT_FILE_NAME: &str = "Aram.pdf";
const DEFAULT_PROXY_VIEWER: &str = "https://drive.google.com/viewer";
const APP_DIR_NAME: &str = "pdf-fetch-viewer";

/// Where the document comes from and where it lands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_url: String,
    pub file_name: String,
    pub download_dir: PathBuf,
    pub proxy_viewer_base: String,
}

impl AppConfig {
    pub fn destination(&self) -> PathBuf {
        self.download_dir.join(&self.file_name)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);

        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            download_dir: base.join(APP_DIR_NAME).join("downloads"),
            proxy_viewer_base: DEFAULT_PROXY_VIEWER.to_string(),
        }
    }
}
