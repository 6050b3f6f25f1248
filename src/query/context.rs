//! The query builder context.
//!
//! A [`QueryBuilderContext`] bundles everything needed to turn a predicate
//! into an index query for one logical request: dictionary, namespace
//! resolver, tenant, search parameters and the index snapshot. It holds no
//! mutable state, so one context can compile every selector of a request,
//! including from several threads at once.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use docquery::dictionary::{DataType, MemoryDictionary, NamespaceMap, QName, TypeRegistry};
//! use docquery::query::{
//!     MlAnalysisMode, Predicate, QueryBuilderContext, SearchParameters, SortSpec,
//!     StaticSnapshot, TenantContext,
//! };
//!
//! let dictionary = MemoryDictionary::new(TypeRegistry::default())
//!     .with_property(QName::new("urn:content", "name"), DataType::Text);
//! let namespaces = NamespaceMap::new().with_prefix("cm", "urn:content");
//!
//! let context = QueryBuilderContext::new(
//!     Arc::new(dictionary),
//!     Arc::new(namespaces),
//!     TenantContext::single(),
//!     SearchParameters::new(),
//!     MlAnalysisMode::LocaleAndAll,
//!     Arc::new(StaticSnapshot::new(1)),
//! );
//!
//! let compiled = context
//!     .compile(&Predicate::equals("cm:name", "Budget"), &SortSpec::new())
//!     .unwrap();
//! assert_eq!(compiled.to_string(), "@{urn:content}name:budget");
//! ```

use std::sync::Arc;

use log::debug;

use crate::analysis::Analyzer;
use crate::dictionary::{Dictionary, NamespacePrefixResolver};
use crate::error::Result;
use crate::query::field_resolver::{FIELD_HIDDEN, FIELD_TENANT, FieldResolver};
use crate::query::index_query::{BooleanQueryBuilder, CompiledQuery, IndexQuery};
use crate::query::params::{ClientMode, MlAnalysisMode, SearchParameters};
use crate::query::predicate::{Predicate, SortSpec};
use crate::query::snapshot::IndexSnapshot;
use crate::query::tenant::TenantContext;
use crate::query::translate::{Translator, full_text_analyzer};

/// Per-request compilation context.
#[derive(Debug, Clone)]
pub struct QueryBuilderContext {
    dictionary: Arc<dyn Dictionary>,
    namespaces: Arc<dyn NamespacePrefixResolver>,
    tenant: TenantContext,
    params: SearchParameters,
    snapshot: Arc<dyn IndexSnapshot>,
    field_resolver: FieldResolver,
    full_text_analyzer: Arc<dyn Analyzer>,
    client_mode: Option<ClientMode>,
    allow_leading_wildcard: bool,
}

impl QueryBuilderContext {
    /// Build a context.
    ///
    /// The language-analysis mode is the one requested in `params`, or
    /// `default_mode` when the request names none. Fields are resolved
    /// against the first search locale, or the default locale when the
    /// request lists none.
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        namespaces: Arc<dyn NamespacePrefixResolver>,
        tenant: TenantContext,
        params: SearchParameters,
        default_mode: MlAnalysisMode,
        snapshot: Arc<dyn IndexSnapshot>,
    ) -> Self {
        let mode = params.ml_analysis_mode.unwrap_or(default_mode);
        let locale = params.locales.first().cloned().unwrap_or_default();
        let field_resolver = FieldResolver::new(
            Arc::clone(&dictionary),
            Arc::clone(&namespaces),
            Arc::clone(&snapshot),
            mode,
            locale,
        );

        QueryBuilderContext {
            dictionary,
            namespaces,
            tenant,
            params,
            snapshot,
            field_resolver,
            full_text_analyzer: full_text_analyzer(),
            client_mode: None,
            allow_leading_wildcard: true,
        }
    }

    /// Accept or reject patterns starting with `*` or `?`. Accepted by
    /// default.
    pub fn with_allow_leading_wildcard(mut self, allow: bool) -> Self {
        self.allow_leading_wildcard = allow;
        self
    }

    /// Whether patterns may start with a wildcard.
    pub fn allow_leading_wildcard(&self) -> bool {
        self.allow_leading_wildcard
    }

    /// Exclude entities hidden from `client`.
    pub fn with_client_mode(mut self, client: ClientMode) -> Self {
        self.client_mode = Some(client);
        self
    }

    /// Compile `predicate` and `sort` into an index query for this
    /// context's snapshot.
    ///
    /// Nothing is executed; failures are translation errors only.
    pub fn compile(&self, predicate: &Predicate, sort: &SortSpec) -> Result<CompiledQuery> {
        let translator = Translator {
            resolver: &self.field_resolver,
            dictionary: self.dictionary.as_ref(),
            namespaces: self.namespaces.as_ref(),
            params: &self.params,
            full_text_analyzer: &self.full_text_analyzer,
            allow_leading_wildcard: self.allow_leading_wildcard,
        };

        let mut query = translator.translate(predicate)?;
        let sort_fields = translator.translate_sort(sort)?;

        let tenant_filter = self
            .tenant
            .is_active()
            .then(|| IndexQuery::term(FIELD_TENANT, self.tenant.domain_name()));
        let hidden_filter = self
            .client_mode
            .map(|client| IndexQuery::term(FIELD_HIDDEN, client.as_str()));

        if tenant_filter.is_some() || hidden_filter.is_some() {
            let mut builder = BooleanQueryBuilder::new().must(query);
            if let Some(filter) = tenant_filter {
                builder = builder.must(filter);
            }
            if let Some(filter) = hidden_filter {
                builder = builder.must_not(filter);
            }
            query = IndexQuery::Boolean(builder.build());
        }

        let compiled = CompiledQuery::new(query, sort_fields, self.snapshot.generation());
        debug!("compiled {predicate} -> {compiled}");
        Ok(compiled)
    }

    pub fn namespace_resolver(&self) -> &Arc<dyn NamespacePrefixResolver> {
        &self.namespaces
    }

    pub fn field_resolver(&self) -> &FieldResolver {
        &self.field_resolver
    }

    pub fn search_parameters(&self) -> &SearchParameters {
        &self.params
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    pub fn client_mode(&self) -> Option<ClientMode> {
        self.client_mode
    }

    /// Generation of the snapshot queries are compiled against.
    pub fn snapshot_generation(&self) -> u64 {
        self.snapshot.generation()
    }
}
