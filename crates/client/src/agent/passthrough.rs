//! Requests the agent leaves to the network untouched.

use url::Url;

/// URL substrings identifying backends that must always hit the live network.
#[derive(Debug, Clone, Default)]
pub struct PassthroughRules {
    domains: Vec<String>,
}

impl PassthroughRules {
    pub fn new(domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { domains: domains.into_iter().map(Into::into).collect() }
    }

    /// The first configured substring found anywhere in the URL.
    ///
    /// Matching is a plain substring test on the serialized URL, so a domain
    /// appearing in a path or query also matches.
    pub fn matching(&self, url: &Url) -> Option<&str> {
        let url = url.as_str();
        self.domains.iter().map(String::as_str).find(|d| url.contains(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PassthroughRules {
        PassthroughRules::new(["firebaseio.com", "googleapis.com", "emailjs.com"])
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_matches_backend_domains() {
        let rules = rules();
        assert_eq!(rules.matching(&url("https://zele-db.firebaseio.com/escalas.json")), Some("firebaseio.com"));
        assert_eq!(
            rules.matching(&url("https://firestore.googleapis.com/v1/projects/x")),
            Some("googleapis.com")
        );
        assert_eq!(rules.matching(&url("https://api.emailjs.com/api/v1.0/email/send")), Some("emailjs.com"));
    }

    #[test]
    fn test_substring_anywhere_in_url() {
        let rules = rules();
        assert_eq!(rules.matching(&url("http://localhost:8080/proxy?to=emailjs.com")), Some("emailjs.com"));
    }

    #[test]
    fn test_static_assets_not_matched() {
        let rules = rules();
        assert_eq!(rules.matching(&url("http://localhost:8080/index.html")), None);
        assert_eq!(rules.matching(&url("https://www.gstatic.com/firebasejs/10.7.1/firebase-app.js")), None);
        assert_eq!(rules.matching(&url("https://cdn.jsdelivr.net/npm/@emailjs/browser@4/dist/email.min.js")), None);
    }

    #[test]
    fn test_empty_rules_match_nothing() {
        let rules = PassthroughRules::default();
        assert_eq!(rules.matching(&url("https://zele-db.firebaseio.com/")), None);
    }
}
