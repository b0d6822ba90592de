use crate::engine::{Plugin, WorkItemHook};
use crate::item::WorkItem;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Assigns proxies to items round-robin before they are fetched
///
/// Items that already carry a proxy keep it.
#[derive(Debug)]
pub struct ProxyRotator {
    proxies: Vec<String>,
    next: AtomicUsize,
}

impl ProxyRotator {
    pub fn new(proxies: Vec<String>) -> Self {
        Self {
            proxies,
            next: AtomicUsize::new(0),
        }
    }

    /// Binds the rotator to the pre-fetch stage
    pub fn into_plugin(self) -> Plugin {
        Plugin::pre_fetch(self)
    }
}

impl WorkItemHook for ProxyRotator {
    fn execute(&self, item: &mut WorkItem) {
        if self.proxies.is_empty() || item.proxy_url.is_some() {
            return;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.proxies.len();
        item.proxy_url = Some(self.proxies[index].clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let rotator = ProxyRotator::new(vec!["http://p1:80".to_string(), "http://p2:80".to_string()]);

        let assigned: Vec<String> = (0..3)
            .map(|n| {
                let mut item = WorkItem::new(format!("https://example.com/{}", n));
                rotator.execute(&mut item);
                item.proxy_url.unwrap()
            })
            .collect();

        assert_eq!(assigned, vec!["http://p1:80", "http://p2:80", "http://p1:80"]);
    }

    #[test]
    fn test_keeps_existing_proxy_and_handles_empty_list() {
        let rotator = ProxyRotator::new(vec!["http://p1:80".to_string()]);
        let mut item = WorkItem::new("https://example.com/");
        item.proxy_url = Some("http://mine:80".to_string());
        rotator.execute(&mut item);
        assert_eq!(item.proxy_url.as_deref(), Some("http://mine:80"));

        let empty = ProxyRotator::new(vec![]);
        let mut item = WorkItem::new("https://example.com/");
        empty.execute(&mut item);
        assert!(item.proxy_url.is_none());
    }
}
