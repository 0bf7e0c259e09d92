//! Click interception: deciding what a clicked `href` does.

use config::SiteConfig;
use core_types::DocKey;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Nothing to do.
    Ignore,
    /// Scroll to the element with this id inside the current document.
    Anchor(String),
    /// Off-site; hand to the system browser.
    External(String),
    /// On-site but on the ignore list; hand to the system browser.
    Blocked(String),
    /// Fetch `url` and open it as the document `key`.
    Internal { url: String, key: DocKey },
}

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("site origin `{origin}` is not a valid URL: {source}")]
    Origin {
        origin: String,
        #[source]
        source: url::ParseError,
    },
}

/// Resolves hrefs against the site origin.
#[derive(Clone, Debug)]
pub struct LinkResolver {
    origin: Url,
    forced_query: Option<(String, String)>,
    site: SiteConfig,
    /// Prefix that bare titles typed into the address bar are placed under.
    article_prefix: String,
}

impl LinkResolver {
    pub fn new(site: &SiteConfig) -> Result<Self, ResolverError> {
        let origin = Url::parse(&site.origin).map_err(|source| ResolverError::Origin {
            origin: site.origin.clone(),
            source,
        })?;
        let forced_query = match site.forced_query.trim() {
            "" => None,
            pair => {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                Some((k.to_string(), v.to_string()))
            }
        };
        let article_prefix = match site.start_path.rfind('/') {
            Some(slash) => site.start_path[..=slash].to_string(),
            None => "/".to_string(),
        };
        Ok(Self {
            origin,
            forced_query,
            site: site.clone(),
            article_prefix,
        })
    }

    /// Scheme and host, no trailing slash.
    pub fn origin(&self) -> &str {
        self.origin.as_str().trim_end_matches('/')
    }

    /// Absolute URL a user would share for `key`.
    pub fn share_url(&self, key: &DocKey) -> String {
        format!("{}{}", self.origin(), key)
    }

    /// Classify an `href` found in a rendered document.
    pub fn classify(&self, href: &str) -> LinkTarget {
        let href = href.trim();
        if href.is_empty() {
            return LinkTarget::Ignore;
        }
        if let Some(fragment) = href.strip_prefix('#') {
            return LinkTarget::Anchor(anchor_id(fragment));
        }
        if let Ok(absolute) = Url::parse(href) {
            return LinkTarget::External(absolute.into());
        }
        match self.origin.join(href) {
            Ok(resolved) => self.classify_resolved(resolved),
            Err(err) => {
                log::warn!(target: "browser.links", "cannot resolve `{href}`: {err}");
                LinkTarget::Ignore
            }
        }
    }

    /// Classify what was typed into the address bar or given on the command line.
    ///
    /// Unlike [`classify`](Self::classify), absolute URLs on the site origin
    /// open inline, and a bare title opens the article of that name.
    pub fn classify_address(&self, input: &str) -> LinkTarget {
        let input = input.trim();
        if input.is_empty() {
            return LinkTarget::Ignore;
        }
        // `Category:Dogs` parses as a URL with scheme `category`
        if let Some(absolute) = Url::parse(input).ok().filter(is_web_url) {
            return if self.same_origin(&absolute) {
                self.classify_resolved(absolute)
            } else {
                LinkTarget::External(absolute.into())
            };
        }
        let path = if input.starts_with('/') {
            input.to_string()
        } else {
            format!("{}{}", self.article_prefix, input.replace(' ', "_"))
        };
        self.classify(&path)
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.scheme() == self.origin.scheme()
            && url.host_str() == self.origin.host_str()
            && url.port_or_known_default() == self.origin.port_or_known_default()
    }

    fn classify_resolved(&self, mut url: Url) -> LinkTarget {
        // protocol-relative links can leave the site
        if !self.same_origin(&url) {
            return LinkTarget::External(url.into());
        }
        url.set_fragment(None);
        let key = doc_key(&url, self.forced_query.as_ref().map(|(k, _)| k.as_str()));

        if let Some((k, v)) = &self.forced_query {
            if !url.query_pairs().any(|(qk, _)| qk == k.as_str()) {
                url.query_pairs_mut().append_pair(k, v);
            }
        }
        let url: String = url.into();

        if self.site.is_ignored(&url) {
            log::info!(target: "browser.links", "`{url}` is on the ignore list");
            return LinkTarget::Blocked(url);
        }
        LinkTarget::Internal { url, key }
    }
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Path plus query, minus the forced parameter.
fn doc_key(url: &Url, forced: Option<&str>) -> DocKey {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| Some(&**k) != forced)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        return DocKey::new(url.path());
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    DocKey::new(format!("{}?{query}", url.path()))
}

/// Element ids on the site encode `<` and `>` the way MediaWiki does.
pub fn anchor_id(fragment: &str) -> String {
    fragment.replace('<', ".3C").replace('>', ".3E")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LinkResolver {
        LinkResolver::new(&SiteConfig::default()).unwrap()
    }

    fn internal(url: &str, key: &str) -> LinkTarget {
        LinkTarget::Internal {
            url: url.to_string(),
            key: DocKey::from(key),
        }
    }

    #[test]
    fn classification_table() {
        let r = resolver();
        let cases = [
            ("", LinkTarget::Ignore),
            ("   ", LinkTarget::Ignore),
            ("#History", LinkTarget::Anchor("History".into())),
            ("#a<b>", LinkTarget::Anchor("a.3Cb.3E".into())),
            (
                "https://example.org/page",
                LinkTarget::External("https://example.org/page".into()),
            ),
            (
                "https://en.wikipedia.org/wiki/Cat",
                LinkTarget::External("https://en.wikipedia.org/wiki/Cat".into()),
            ),
            (
                "/wiki/Cat",
                internal("https://en.wikipedia.org/wiki/Cat?useskin=vector", "/wiki/Cat"),
            ),
            (
                "/w/index.php?title=Cat&action=edit",
                LinkTarget::Blocked(
                    "https://en.wikipedia.org/w/index.php?title=Cat&action=edit&useskin=vector"
                        .into(),
                ),
            ),
            (
                "/wiki/Encyclopedia",
                LinkTarget::Blocked("https://en.wikipedia.org/wiki/Encyclopedia?useskin=vector".into()),
            ),
        ];
        for (href, expected) in cases {
            assert_eq!(r.classify(href), expected, "href {href:?}");
        }
    }

    #[test]
    fn fragments_do_not_split_documents() {
        let r = resolver();
        assert_eq!(
            r.classify("/wiki/Cat#Behavior"),
            internal("https://en.wikipedia.org/wiki/Cat?useskin=vector", "/wiki/Cat")
        );
    }

    #[test]
    fn query_is_kept_in_the_key_without_the_forced_pair() {
        let r = resolver();
        assert_eq!(
            r.classify("/w/index.php?title=Cat&oldid=1"),
            internal(
                "https://en.wikipedia.org/w/index.php?title=Cat&oldid=1&useskin=vector",
                "/w/index.php?title=Cat&oldid=1"
            )
        );
        assert_eq!(
            r.classify("/wiki/Cat?useskin=vector"),
            internal("https://en.wikipedia.org/wiki/Cat?useskin=vector", "/wiki/Cat")
        );
    }

    #[test]
    fn protocol_relative_links_to_other_hosts_are_external() {
        assert_eq!(
            resolver().classify("//upload.wikimedia.org/a.png"),
            LinkTarget::External("https://upload.wikimedia.org/a.png".into())
        );
    }

    #[test]
    fn ignore_list_is_case_insensitive() {
        assert!(matches!(
            resolver().classify("/wiki/ENCYCLOPEDIA"),
            LinkTarget::Blocked(_)
        ));
    }

    #[test]
    fn address_bar_accepts_urls_paths_and_titles() {
        let r = resolver();
        let dog = internal("https://en.wikipedia.org/wiki/Dog?useskin=vector", "/wiki/Dog");
        assert_eq!(r.classify_address("https://en.wikipedia.org/wiki/Dog"), dog);
        assert_eq!(r.classify_address("/wiki/Dog"), dog);
        assert_eq!(r.classify_address("Dog"), dog);
        assert_eq!(
            r.classify_address("Golden Retriever"),
            internal(
                "https://en.wikipedia.org/wiki/Golden_Retriever?useskin=vector",
                "/wiki/Golden_Retriever"
            )
        );
        assert_eq!(
            r.classify_address("https://example.org/"),
            LinkTarget::External("https://example.org/".into())
        );
        assert_eq!(r.classify_address("  "), LinkTarget::Ignore);
    }

    #[test]
    fn namespaced_titles_open_as_articles() {
        let r = resolver();
        for (title, key) in [
            ("Help:Contents", "/wiki/Help:Contents"),
            ("Category:Dogs", "/wiki/Category:Dogs"),
            ("Wikipedia:About", "/wiki/Wikipedia:About"),
            ("Category:Dog breeds", "/wiki/Category:Dog_breeds"),
        ] {
            match r.classify_address(title) {
                LinkTarget::Internal { key: got, .. } => assert_eq!(got, DocKey::from(key)),
                other => panic!("{title:?} classified as {other:?}"),
            }
        }
        assert_eq!(
            r.classify_address("Help:Contents"),
            internal(
                "https://en.wikipedia.org/wiki/Help:Contents?useskin=vector",
                "/wiki/Help:Contents"
            )
        );
    }

    #[test]
    fn empty_forced_query_is_not_appended() {
        let site = SiteConfig {
            forced_query: String::new(),
            ..SiteConfig::default()
        };
        let r = LinkResolver::new(&site).unwrap();
        assert_eq!(
            r.classify("/wiki/Cat"),
            internal("https://en.wikipedia.org/wiki/Cat", "/wiki/Cat")
        );
    }

    #[test]
    fn share_url_joins_origin_and_key() {
        assert_eq!(
            resolver().share_url(&DocKey::from("/wiki/Cat")),
            "https://en.wikipedia.org/wiki/Cat"
        );
    }

    #[test]
    fn bad_origin_is_rejected() {
        let site = SiteConfig {
            origin: "https://".into(),
            ..SiteConfig::default()
        };
        assert!(LinkResolver::new(&site).is_err());
    }
}
