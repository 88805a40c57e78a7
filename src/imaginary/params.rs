//! Validated parameter set for a single backend call.

use url::Url;

use crate::imaginary::path::clean_path;

/// Quality used when the client sends none, zero, or garbage.
pub const DEFAULT_QUALITY: i64 = 95;

/// Everything needed to build one imaginary URL.
///
/// Only [`Translator`](crate::imaginary::Translator) constructs this type, so
/// a value in hand is always fully valid. It has no mutating methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub(crate) host: Url,
    pub(crate) file: String,
    pub(crate) method: String,
    pub(crate) width: i64,
    pub(crate) height: i64,
    pub(crate) quality: i64,
    pub(crate) output_type: String,
    pub(crate) forward_quality: bool,
}

impl RequestParameters {
    /// Backend base URL taken from configuration.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Source image path with the configured prefix removed.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Transform operation name.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn quality(&self) -> i64 {
        self.quality
    }

    /// Output format hint; empty when imaginary should choose.
    pub fn output_type(&self) -> &str {
        &self.output_type
    }

    /// Build the absolute backend URL.
    ///
    /// The path is `/` joined with the method and lexically cleaned. Query keys
    /// are written in sorted order and form-urlencoded.
    pub fn build_url(&self) -> Url {
        let mut url = self.host.clone();
        url.set_path(&clean_path(&format!("/{}", self.method)));
        url.set_fragment(None);
        url.set_query(None);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("file", &self.file);
            query.append_pair("height", &self.height.to_string());
            if self.forward_quality {
                query.append_pair("quality", &self.quality.to_string());
            }
            if !self.output_type.is_empty() {
                query.append_pair("type", &self.output_type);
            }
            query.append_pair("width", &self.width.to_string());
        }

        tracing::debug!(
            hostname = url.host_str().unwrap_or_default(),
            path = url.path(),
            query = url.query().unwrap_or_default(),
            url = %url,
            "Built imaginary URL"
        );

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(method: &str, file: &str, output_type: &str) -> RequestParameters {
        RequestParameters {
            host: Url::parse("http://imaginary:9000").unwrap(),
            file: file.into(),
            method: method.into(),
            width: 300,
            height: 200,
            quality: 70,
            output_type: output_type.into(),
            forward_quality: false,
        }
    }

    #[test]
    fn test_build_url_basic() {
        let url = params("fit", "/image.png", "").build_url();
        assert_eq!(
            url.as_str(),
            "http://imaginary:9000/fit?file=%2Fimage.png&height=200&width=300"
        );
    }

    #[test]
    fn test_build_url_with_type() {
        let url = params("resize", "/image.png", "webp").build_url();
        assert_eq!(
            url.as_str(),
            "http://imaginary:9000/resize?file=%2Fimage.png&height=200&type=webp&width=300"
        );
    }

    #[test]
    fn test_build_url_escapes_file() {
        let url = params("fit", "/my photos/a&b=c?.png", "").build_url();
        assert_eq!(url.query(), Some("file=%2Fmy+photos%2Fa%26b%3Dc%3F.png&height=200&width=300"));

        let file: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k == "file")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(file, vec![("file".to_string(), "/my photos/a&b=c?.png".to_string())]);
    }

    #[test]
    fn test_build_url_query_key_set() {
        let url = params("fit", "/image.png", "jpeg").build_url();
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, vec!["file", "height", "type", "width"]);
    }

    #[test]
    fn test_build_url_quality_forwarding() {
        let mut p = params("fit", "/image.png", "");
        p.forward_quality = true;
        assert_eq!(
            p.build_url().query(),
            Some("file=%2Fimage.png&height=200&quality=70&width=300")
        );
    }

    #[test]
    fn test_build_url_cleans_method_path() {
        assert_eq!(params("../x", "/a.png", "").build_url().path(), "/x");
        assert_eq!(params("fit/", "/a.png", "").build_url().path(), "/fit");
        assert_eq!(params("a//b", "/a.png", "").build_url().path(), "/a/b");
    }

    #[test]
    fn test_build_url_replaces_host_path_and_query() {
        let mut p = params("fit", "/a.png", "");
        p.host = Url::parse("https://img.example.com:8443/base?x=1#frag").unwrap();
        assert_eq!(
            p.build_url().as_str(),
            "https://img.example.com:8443/fit?file=%2Fa.png&height=200&width=300"
        );
    }
}
