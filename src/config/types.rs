use crate::sink::SinkFormat;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
    pub mysql: MySqlConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Timeout for each listing page request (seconds)
    #[serde(rename = "listing-timeout-secs")]
    pub listing_timeout_secs: u64,

    /// Timeout for each detail page request (seconds)
    #[serde(rename = "detail-timeout-secs")]
    pub detail_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_timeout_secs: 10,
            detail_timeout_secs: 8,
            user_agent: format!("catalog-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Catalog layout: pagination file names and the selectors used to read items
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// File name of the first page of a category (e.g. "index.html")
    #[serde(rename = "index-filename")]
    pub index_filename: String,

    /// File name of later pages; `{}` is replaced by the page number
    #[serde(rename = "page-template")]
    pub page_template: String,

    /// Container of one item on a listing page
    #[serde(rename = "item-selector")]
    pub item_selector: String,

    /// Link inside the item container; carries the title and detail href
    #[serde(rename = "title-link-selector")]
    pub title_link_selector: String,

    /// Price element, on listing items and inside the detail product block
    #[serde(rename = "price-selector")]
    pub price_selector: String,

    /// Rating element whose class list holds the rating word
    #[serde(rename = "rating-selector")]
    pub rating_selector: String,

    /// Availability element on a detail page
    #[serde(rename = "availability-selector")]
    pub availability_selector: String,

    /// Product block on a detail page
    #[serde(rename = "product-selector")]
    pub product_selector: String,

    /// Title heading inside the detail product block
    #[serde(rename = "product-title-selector")]
    pub product_title_selector: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_filename: "index.html".to_string(),
            page_template: "page-{}.html".to_string(),
            item_selector: "article.product_pod".to_string(),
            title_link_selector: "h3 a".to_string(),
            price_selector: "p.price_color".to_string(),
            rating_selector: "p.star-rating".to_string(),
            availability_selector: "p.availability".to_string(),
            product_selector: ".product_main".to_string(),
            product_title_selector: "h1".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination format
    pub format: SinkFormat,

    /// Destination file for the file-based formats
    pub path: Option<PathBuf>,

    /// Table (or worksheet) name
    pub table: String,
}

impl OutputConfig {
    /// Returns the configured path, or a format-specific default file name
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("products.{}", self.format.extension())))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: SinkFormat::Csv,
            path: None,
            table: "products".to_string(),
        }
    }
}

/// Connection settings for the MySQL sink
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "scraper_db".to_string(),
        }
    }
}
