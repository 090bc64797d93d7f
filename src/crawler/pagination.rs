//! Listing page URL derivation
//!
//! Page 1 is the start URL itself. Later pages are derived from the start
//! URL alone, so page N's URL never depends on what earlier pages returned:
//!
//! | Start URL path | Page 3 path |
//! |----------------|-------------|
//! | `/catalogue/category/books/science_22/index.html` | `/catalogue/category/books/science_22/page-3.html` |
//! | `/catalogue/category/books/science_22/` | `/catalogue/category/books/science_22/page-3.html` |
//! | `/catalogue` | `/catalogue/page-3.html` |

use crate::config::CatalogConfig;
use url::Url;

/// Returns the URL of listing page `page` (1-based)
///
/// If the start URL's last path segment ends with the index file name it
/// is replaced by the page template; otherwise the page file name is appended
/// under the start path. Query string and fragment are dropped for pages
/// after the first.
///
/// # Example
///
/// ```
/// use catalog_harvest::config::CatalogConfig;
/// use catalog_harvest::crawler::page_url;
/// use url::Url;
///
/// let start = Url::parse("https://books.example/catalogue/category/books_1/index.html").unwrap();
/// let third = page_url(&start, 3, &CatalogConfig::default());
/// assert_eq!(third.as_str(), "https://books.example/catalogue/category/books_1/page-3.html");
/// ```
pub fn page_url(start: &Url, page: u32, catalog: &CatalogConfig) -> Url {
    if page <= 1 {
        return start.clone();
    }

    let file_name = catalog.page_template.replace("{}", &page.to_string());
    let path = start.path().trim_end_matches('/');

    let new_path = match path.rsplit_once('/') {
        Some((base, last)) if last.ends_with(catalog.index_filename.as_str()) => {
            format!("{}/{}", base, file_name)
        }
        _ => format!("{}/{}", path, file_name),
    };

    let mut url = start.clone();
    url.set_path(&new_path);
    url.set_query(None);
    url.set_fragment(None);
    url
}
