use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use reqwest::Url;

/// Hosts that served images generated for this process.
///
/// `/proxy` only fetches from these, so it cannot be pointed at arbitrary
/// addresses.
#[derive(Clone, Default)]
pub struct ImageHosts {
    hosts: Arc<Mutex<HashSet<String>>>,
}

impl ImageHosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the hosts of freshly generated image URLs. Unparseable URLs are skipped.
    pub fn record<'a>(&self, urls: impl IntoIterator<Item = &'a String>) {
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        for url in urls {
            match Url::parse(url).ok().as_ref().and_then(host_key) {
                Some(host) => {
                    hosts.insert(host);
                }
                None => tracing::debug!("Not recording image host for {}", url),
            }
        }
    }

    pub fn allows(&self, url: &Url) -> bool {
        let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        host_key(url).is_some_and(|host| hosts.contains(&host))
    }
}

fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_recorded_hosts_are_allowed() {
        let hosts = ImageHosts::new();
        hosts.record(&["https://images.test/a.png".to_string(), "nonsense".to_string()]);

        assert!(hosts.allows(&Url::parse("https://images.test/b.png").unwrap()));
        assert!(!hosts.allows(&Url::parse("https://elsewhere.test/a.png").unwrap()));
        assert!(!hosts.allows(&Url::parse("http://127.0.0.1/a.png").unwrap()));
    }

    #[test]
    fn port_is_part_of_the_host() {
        let hosts = ImageHosts::new();
        hosts.record(&["http://127.0.0.1:9000/a.png".to_string()]);

        assert!(hosts.allows(&Url::parse("http://127.0.0.1:9000/b.png").unwrap()));
        assert!(!hosts.allows(&Url::parse("http://127.0.0.1:22/").unwrap()));
    }
}
