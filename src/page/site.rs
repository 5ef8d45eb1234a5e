/// Host allow-list: a page is supported when its host contains one of the
/// configured substrings, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMatcher {
    sites: Vec<String>,
}

impl SiteMatcher {
    pub fn new<I, T>(sites: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            sites: sites
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        self.sites.iter().any(|site| host.contains(site.as_str()))
    }
}
