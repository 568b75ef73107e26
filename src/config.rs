use camino::Utf8PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://rest.ensembl.org";
pub const OUTPUT_FILE_NAME: &str = "ensembl_ids.csv";

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub base_url: String,
    pub output_path: Utf8PathBuf,
    pub max_retries: usize,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_path: Utf8PathBuf::from(OUTPUT_FILE_NAME),
            max_retries: 3,
            user_agent: format!("ensembl-lookup/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ResolverConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}
