//! Gateway GraphQL schema.
//!
//! The schema is deliberately thin: `health` for liveness probing through
//! the engine, and `upstreamGet` proxying a single bounded read. Everything
//! interesting happens in the validation rules and the upstream client.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Json, Object, Schema,
    SimpleObject,
};
use serde_json::Value;

use crate::auth::ForwardedHeaders;
use crate::config::GatewayConfig;
use crate::graphql::rules::{DepthLimit, FieldLimit, OperationLimit};
use crate::observability::metrics;
use crate::sanitize;
use crate::upstream::UpstreamClient;

pub type GatewaySchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Maximum number of names accepted in includeKeys/excludeKeys.
const MAX_FILTER_KEYS: usize = 32;

/// Maximum length of a single filter key name.
const MAX_FILTER_KEY_LEN: usize = 128;

pub const SERVICE_NAME: &str = "graphql-gateway";

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(SimpleObject)]
pub struct Health {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub time: u64,
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn health(&self) -> Health {
        Health {
            ok: true,
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            time: now_millis(),
        }
    }

    /// Proxy a single GET to the configured upstream, with redaction on by
    /// default and optional top-level key narrowing.
    async fn upstream_get(
        &self,
        ctx: &Context<'_>,
        path: String,
        #[graphql(default = true)] redact: bool,
        include_keys: Option<Vec<String>>,
        exclude_keys: Option<Vec<String>>,
    ) -> async_graphql::Result<Json<Value>> {
        check_key_set("includeKeys", include_keys.as_deref())?;
        check_key_set("excludeKeys", exclude_keys.as_deref())?;

        let client = ctx.data::<Arc<UpstreamClient>>()?;
        let headers = ctx
            .data_opt::<ForwardedHeaders>()
            .cloned()
            .unwrap_or_default();

        let value = client
            .get(&path, headers.as_header_map())
            .await
            .map_err(|e| {
                metrics::record_upstream(e.code());
                e.extend()
            })?
            .into_value();
        metrics::record_upstream("ok");

        let value = if redact {
            sanitize::redact(&value)
        } else {
            value
        };
        let value = sanitize::filter_keys(value, include_keys.as_deref(), exclude_keys.as_deref());

        Ok(Json(value))
    }
}

fn check_key_set(name: &str, keys: Option<&[String]>) -> async_graphql::Result<()> {
    let Some(keys) = keys else { return Ok(()) };
    if keys.len() > MAX_FILTER_KEYS || keys.iter().any(|k| k.len() > MAX_FILTER_KEY_LEN) {
        let err = async_graphql::Error::new(format!(
            "{name} accepts at most {MAX_FILTER_KEYS} keys of at most {MAX_FILTER_KEY_LEN} characters"
        ));
        return Err(err.extend_with(|_, e| e.set("code", "INVALID_KEY_FILTER")));
    }
    Ok(())
}

/// Build the schema with the complexity rules and shared services wired in.
pub fn build_schema(config: &GatewayConfig, client: Arc<UpstreamClient>) -> GatewaySchema {
    let mut builder = Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .extension(OperationLimit {
            max_operations: config.limits.max_operations,
        })
        .extension(FieldLimit {
            max_fields: config.limits.max_query_fields,
        })
        .extension(DepthLimit {
            max_depth: config.limits.max_query_depth,
        })
        .data(client);
    if !config.limits.enable_introspection {
        builder = builder.disable_introspection();
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;
    use serde_json::json;

    fn test_schema(config: &GatewayConfig) -> GatewaySchema {
        let client = Arc::new(UpstreamClient::new(UpstreamConfig::default()));
        build_schema(config, client)
    }

    fn error_code(response: &async_graphql::Response) -> Option<String> {
        response.errors.first().and_then(|e| {
            e.extensions
                .as_ref()
                .and_then(|ext| ext.get("code"))
                .and_then(|v| match v {
                    async_graphql::Value::String(s) => Some(s.clone()),
                    _ => None,
                })
        })
    }

    #[tokio::test]
    async fn health_resolves() {
        let schema = test_schema(&GatewayConfig::default());
        let response = schema.execute("{ health { ok service } }").await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = serde_json::to_value(&response.data).unwrap();
        assert_eq!(data["health"]["ok"], json!(true));
    }

    #[tokio::test]
    async fn depth_rule_rejects_before_execution() {
        let mut config = GatewayConfig::default();
        config.limits.max_query_depth = 1;
        let schema = test_schema(&config);
        let response = schema.execute("{ health { ok } }").await;
        assert_eq!(error_code(&response).as_deref(), Some("QUERY_TOO_DEEP"));
    }

    #[tokio::test]
    async fn field_rule_rejects_health_query_with_limit_one() {
        let mut config = GatewayConfig::default();
        config.limits.max_query_fields = 1;
        let schema = test_schema(&config);
        let response = schema.execute("{ health { ok } }").await;
        assert_eq!(error_code(&response).as_deref(), Some("QUERY_TOO_COMPLEX"));
    }

    #[tokio::test]
    async fn operation_rule_counts_unselected_operations() {
        let mut config = GatewayConfig::default();
        config.limits.max_operations = 1;
        let schema = test_schema(&config);
        let request = async_graphql::Request::new(
            "query A { health { ok } } query B { health { ok } }",
        )
        .operation_name("A");
        let response = schema.execute(request).await;
        assert_eq!(error_code(&response).as_deref(), Some("TOO_MANY_OPERATIONS"));
    }

    #[tokio::test]
    async fn introspection_disabled_by_default() {
        let schema = test_schema(&GatewayConfig::default());
        let response = schema.execute("{ __schema { queryType { name } } }").await;
        assert!(!response.errors.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_upstream_surfaces_code() {
        let schema = test_schema(&GatewayConfig::default());
        let response = schema
            .execute(r#"{ upstreamGet(path: "/api/items") }"#)
            .await;
        assert_eq!(
            error_code(&response).as_deref(),
            Some("UPSTREAM_NOT_CONFIGURED")
        );
    }

    #[tokio::test]
    async fn oversized_key_filter_rejected() {
        let schema = test_schema(&GatewayConfig::default());
        let keys: Vec<String> = (0..40).map(|i| format!("k{i}")).collect();
        let request = async_graphql::Request::new(
            "query($keys: [String!]) { upstreamGet(path: \"/api/items\", includeKeys: $keys) }",
        )
        .variables(async_graphql::Variables::from_json(json!({ "keys": keys })));
        let response = schema.execute(request).await;
        assert_eq!(error_code(&response).as_deref(), Some("INVALID_KEY_FILTER"));
    }
}
