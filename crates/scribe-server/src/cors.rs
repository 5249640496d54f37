use http::Method;
use http::header::HeaderName;
use scribe_config::{AnyOrArray, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    layer = match &config.origins {
        AnyOrArray::Any => layer.allow_origin(AllowOrigin::any()),
        AnyOrArray::List(origins) => {
            let origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin
                        .parse()
                        .inspect_err(|_| tracing::warn!(%origin, "ignoring unparsable CORS origin"))
                        .ok()
                })
                .collect();
            layer.allow_origin(origins)
        }
    };

    layer = match &config.methods {
        AnyOrArray::Any => layer.allow_methods(AllowMethods::any()),
        AnyOrArray::List(methods) => {
            let methods: Vec<Method> = methods.iter().filter_map(|m| m.parse().ok()).collect();
            layer.allow_methods(methods)
        }
    };

    layer = match &config.headers {
        AnyOrArray::Any => layer.allow_headers(AllowHeaders::any()),
        AnyOrArray::List(headers) => {
            let headers: Vec<HeaderName> = headers.iter().filter_map(|h| h.parse().ok()).collect();
            layer.allow_headers(headers)
        }
    };

    // Credentials cannot be combined with any wildcard rule
    if config.credentials {
        if [&config.origins, &config.methods, &config.headers].contains(&&AnyOrArray::Any) {
            tracing::warn!("CORS credentials ignored because a wildcard origin, method or header is configured");
        } else {
            layer = layer.allow_credentials(true);
        }
    }

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}
