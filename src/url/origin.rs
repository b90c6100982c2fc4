use std::fmt;
use url::Url;

/// The scheme + host + port triple that identifies a site
///
/// Two URLs with the same `Origin` belong to the same site; anything else is external
/// relative to the crawl seed. The host is taken from the parsed URL, so it is already
/// lowercased, and the port is always explicit (`http://h/` and `http://h:80/` share an
/// origin).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Extracts the origin of a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sitecrawl::url::Origin;
    /// use url::Url;
    ///
    /// let a = Origin::of(&Url::parse("http://localhost:8000/pages/").unwrap());
    /// let b = Origin::of(&Url::parse("http://LOCALHOST:8000/assets/x.css").unwrap());
    /// let c = Origin::of(&Url::parse("http://localhost:8001/pages/").unwrap());
    /// assert_eq!(a, b);
    /// assert_ne!(a, c);
    /// ```
    pub fn of(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port_or_known_default(),
        }
    }

    /// Returns true if `url` belongs to this origin
    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url.host_str().unwrap_or_default() == self.host
            && url.port_or_known_default() == self.port
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}
