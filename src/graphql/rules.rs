//! Pluggable complexity-limit validation rules.
//!
//! Three independent extensions, each re-deriving [`DocumentStats`] after
//! parsing and failing the request before execution when its limit is
//! exceeded. An over-limit query never reaches a resolver.

use std::sync::Arc;

use async_graphql::extensions::{Extension, ExtensionContext, ExtensionFactory, NextParseQuery};
use async_graphql::parser::types::ExecutableDocument;
use async_graphql::{ErrorExtensionValues, ServerError, ServerResult, Variables};

use crate::graphql::complexity::document_stats;

fn limit_error(
    message: String,
    code: &'static str,
    fields: &[(&'static str, usize)],
) -> ServerError {
    let mut ext = ErrorExtensionValues::default();
    ext.set("code", code);
    for (name, value) in fields {
        ext.set(*name, *value as u64);
    }
    let mut error = ServerError::new(message, None);
    error.extensions = Some(ext);
    error
}

/// Rejects documents whose selection depth exceeds the configured maximum.
pub struct DepthLimit {
    pub max_depth: usize,
}

impl ExtensionFactory for DepthLimit {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(DepthLimitExtension {
            max_depth: self.max_depth,
        })
    }
}

struct DepthLimitExtension {
    max_depth: usize,
}

#[async_trait::async_trait]
impl Extension for DepthLimitExtension {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let doc = next.run(ctx, query, variables).await?;
        let stats = document_stats(&doc);
        if stats.depth > self.max_depth {
            tracing::warn!(depth = stats.depth, max_depth = self.max_depth, "Query too deep");
            return Err(limit_error(
                format!(
                    "query depth {} exceeds maximum allowed depth {}",
                    stats.depth, self.max_depth
                ),
                "QUERY_TOO_DEEP",
                &[("depth", stats.depth), ("maxDepth", self.max_depth)],
            ));
        }
        Ok(doc)
    }
}

/// Rejects documents whose total field count exceeds the configured maximum.
pub struct FieldLimit {
    pub max_fields: usize,
}

impl ExtensionFactory for FieldLimit {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(FieldLimitExtension {
            max_fields: self.max_fields,
        })
    }
}

struct FieldLimitExtension {
    max_fields: usize,
}

#[async_trait::async_trait]
impl Extension for FieldLimitExtension {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let doc = next.run(ctx, query, variables).await?;
        let stats = document_stats(&doc);
        if stats.field_count > self.max_fields {
            tracing::warn!(
                field_count = stats.field_count,
                max_fields = self.max_fields,
                "Query too complex"
            );
            return Err(limit_error(
                format!(
                    "query requests {} fields, exceeding the maximum of {}",
                    stats.field_count, self.max_fields
                ),
                "QUERY_TOO_COMPLEX",
                &[("fieldCount", stats.field_count), ("maxFields", self.max_fields)],
            ));
        }
        Ok(doc)
    }
}

/// Rejects documents containing more operations than allowed.
///
/// The count covers every operation in the document as parsed, including
/// ones an `operationName` does not select.
pub struct OperationLimit {
    pub max_operations: usize,
}

impl ExtensionFactory for OperationLimit {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(OperationLimitExtension {
            max_operations: self.max_operations,
        })
    }
}

struct OperationLimitExtension {
    max_operations: usize,
}

#[async_trait::async_trait]
impl Extension for OperationLimitExtension {
    async fn parse_query(
        &self,
        ctx: &ExtensionContext<'_>,
        query: &str,
        variables: &Variables,
        next: NextParseQuery<'_>,
    ) -> ServerResult<ExecutableDocument> {
        let doc = next.run(ctx, query, variables).await?;
        let stats = document_stats(&doc);
        if stats.operation_count > self.max_operations {
            tracing::warn!(
                operation_count = stats.operation_count,
                max_operations = self.max_operations,
                "Too many operations"
            );
            return Err(limit_error(
                format!(
                    "document contains {} operations, exceeding the maximum of {}",
                    stats.operation_count, self.max_operations
                ),
                "TOO_MANY_OPERATIONS",
                &[
                    ("operationCount", stats.operation_count),
                    ("maxOperations", self.max_operations),
                ],
            ));
        }
        Ok(doc)
    }
}
