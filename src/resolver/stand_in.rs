//! Development resolver that ignores the discovery backend.

use url::Url;

use crate::resolver::BackendTarget;
use crate::routing::Route;

/// Sends every route to the same local target.
#[derive(Debug, Clone)]
pub struct StandInResolver {
    target: Url,
}

impl StandInResolver {
    pub fn new(target: Url) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Always succeeds; the route only contributes its names for tagging.
    pub fn resolve(&self, route: &Route) -> BackendTarget {
        BackendTarget::new(
            route.service.clone(),
            route.namespace.clone(),
            self.target.clone(),
        )
    }

    pub fn health_check(&self, target: &mut BackendTarget) -> bool {
        target.mark_checked(true);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_route_names() {
        let resolver = StandInResolver::new(Url::parse("http://localhost:3000").unwrap());
        for (service, namespace) in [("checkout", "orders"), ("does-not", "exist")] {
            let route = Route {
                service: service.into(),
                namespace: namespace.into(),
                ..Route::default()
            };
            let target = resolver.resolve(&route);
            assert_eq!(target.origin(), "http://localhost:3000");
            assert_eq!(target.service, service);
            assert!(target.healthy);
            assert!(target.is_fresh());
        }
    }

    #[test]
    fn test_health_check_always_healthy() {
        let resolver = StandInResolver::new(Url::parse("http://localhost:3000").unwrap());
        let mut target = resolver.resolve(&Route::default());
        target.healthy = false;
        assert!(resolver.health_check(&mut target));
        assert!(target.healthy);
    }
}
