use url::Url;

pub trait UrlExt {
    /// Append percent-encoded path segments.
    fn with_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url;
    /// Append query pairs, keeping any existing ones.
    fn with_query<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Url;
}

impl UrlExt for Url {
    fn with_segments<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut out = self.clone();
        if let Ok(mut path) = out.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        out
    }

    fn with_query<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Url {
        let mut out = self.clone();
        out.query_pairs_mut().extend_pairs(pairs);
        out
    }
}
