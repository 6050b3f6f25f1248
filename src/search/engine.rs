//! Orchestration of federated queries.

use std::sync::Arc;
use std::time::Instant;

use ahash::{AHashMap, AHashSet};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::QueryEngineConfig;
use crate::dictionary::{Dictionary, NamespacePrefixResolver};
use crate::error::{DocQueryError, Result};
use crate::federation::{FederatedResultSet, QueryOptions};
use crate::query::{
    CompiledQuery, IndexSnapshot, Predicate, QueryBuilderContext, SearchParameters, SortSpec,
    TenantContext,
};
use crate::repository::EntityLookup;
use crate::search::{ResultSet, SearchExecutor};

/// One selector of a federated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorQuery {
    pub name: String,
    /// Type the selector ranges over; its subtypes are included.
    pub type_name: Option<String>,
    pub predicate: Predicate,
    pub sort: SortSpec,
}

impl SelectorQuery {
    pub fn new<S: Into<String>>(name: S, predicate: Predicate) -> Self {
        SelectorQuery {
            name: name.into(),
            type_name: None,
            predicate,
            sort: SortSpec::new(),
        }
    }

    pub fn with_type<S: Into<String>>(mut self, type_name: S) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    /// The predicate restricted to the selector's type.
    fn scoped_predicate(&self) -> Predicate {
        match &self.type_name {
            Some(type_name) => Predicate::and(vec![
                Predicate::is_type(type_name.clone()),
                self.predicate.clone(),
            ]),
            None => self.predicate.clone(),
        }
    }
}

/// A query over one or more selectors whose results are joined by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedQuery {
    pub statement: String,
    pub selectors: Vec<SelectorQuery>,
    pub skip_count: usize,
    /// Page size; the engine default applies when `None`.
    pub max_items: Option<usize>,
}

impl FederatedQuery {
    pub fn new<S: Into<String>>(statement: S) -> Self {
        FederatedQuery {
            statement: statement.into(),
            selectors: Vec::new(),
            skip_count: 0,
            max_items: None,
        }
    }

    pub fn with_selector(mut self, selector: SelectorQuery) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn with_skip_count(mut self, skip_count: usize) -> Self {
        self.skip_count = skip_count;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }
}

/// Compiles, executes and federates multi-selector queries.
pub struct QueryEngine {
    /// Configuration for the engine.
    config: QueryEngineConfig,

    executor: Arc<dyn SearchExecutor>,

    lookup: Arc<dyn EntityLookup>,

    /// Thread pool for parallel execution.
    thread_pool: Arc<ThreadPool>,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .field("threads", &self.thread_pool.current_num_threads())
            .finish()
    }
}

impl QueryEngine {
    /// Create a new query engine.
    pub fn new(
        config: QueryEngineConfig,
        executor: Arc<dyn SearchExecutor>,
        lookup: Arc<dyn EntityLookup>,
    ) -> Result<Self> {
        config.validate()?;

        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(config.threads())
            .thread_name(|i| format!("query-engine-{i}"))
            .build()
            .map_err(|e| {
                DocQueryError::invalid_config(format!("Failed to create thread pool: {e}"))
            })?;

        Ok(Self {
            config,
            executor,
            lookup,
            thread_pool: Arc::new(thread_pool),
        })
    }

    pub fn config(&self) -> &QueryEngineConfig {
        &self.config
    }

    /// Search parameters carrying the configured defaults.
    pub fn default_parameters(&self) -> SearchParameters {
        SearchParameters::new()
            .with_default_operator(self.config.default_operator)
            .with_locale(self.config.default_locale.clone())
    }

    /// Build the context for one request. Requests that list no locale
    /// search in the configured default locale.
    pub fn context(
        &self,
        dictionary: Arc<dyn Dictionary>,
        namespaces: Arc<dyn NamespacePrefixResolver>,
        tenant: TenantContext,
        mut params: SearchParameters,
        snapshot: Arc<dyn IndexSnapshot>,
    ) -> QueryBuilderContext {
        if params.locales.is_empty() {
            params.locales.push(self.config.default_locale.clone());
        }
        QueryBuilderContext::new(
            dictionary,
            namespaces,
            tenant,
            params,
            self.config.default_ml_analysis_mode,
            snapshot,
        )
    }

    /// Run `query`: compile every selector, execute them, federate.
    ///
    /// A selector that fails to compile fails the query before anything
    /// is executed. Selectors that compile to the same query share one
    /// execution and one result. When any execution fails the results
    /// already produced are released and the executor's error is
    /// returned.
    pub fn execute(
        &self,
        context: &QueryBuilderContext,
        query: &FederatedQuery,
    ) -> Result<FederatedResultSet> {
        let query_id = Uuid::new_v4();
        let start = Instant::now();

        if query.selectors.is_empty() {
            return Err(DocQueryError::invalid_argument("query has no selectors"));
        }
        let mut names = AHashSet::new();
        for selector in &query.selectors {
            if !names.insert(selector.name.as_str()) {
                return Err(DocQueryError::DuplicateSelector(selector.name.clone()));
            }
        }

        let compiled = query
            .selectors
            .iter()
            .map(|selector| {
                let compiled = context.compile(&selector.scoped_predicate(), &selector.sort)?;
                debug!("[{query_id}] selector `{}`: {compiled}", selector.name);
                Ok(compiled)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut distinct: Vec<&CompiledQuery> = Vec::new();
        let mut slots: AHashMap<&CompiledQuery, usize> = AHashMap::new();
        let selector_slots: Vec<usize> = compiled
            .iter()
            .map(|query| {
                *slots.entry(query).or_insert_with(|| {
                    distinct.push(query);
                    distinct.len() - 1
                })
            })
            .collect();

        let options = QueryOptions::new(query.statement.clone())
            .with_skip_count(query.skip_count)
            .with_max_items(query.max_items.unwrap_or(self.config.default_max_items));
        let outcomes = self.execute_distinct(&distinct, &options);

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            warn!("[{query_id}] execution failed: {e}");
            release_all(&results);
            return Err(e);
        }

        let federated = FederatedResultSet::new(
            query
                .selectors
                .iter()
                .zip(&selector_slots)
                .map(|(selector, &slot)| (selector.name.clone(), Arc::clone(&results[slot]))),
            options,
            Arc::clone(&self.lookup),
        );
        match federated {
            Ok(set) => {
                info!(
                    "[{query_id}] {} selector(s), {} execution(s), {} row(s) in {:?}",
                    query.selectors.len(),
                    distinct.len(),
                    set.row_count().unwrap_or_default(),
                    start.elapsed()
                );
                Ok(set)
            }
            Err(e) => {
                warn!("[{query_id}] federation failed: {e}");
                release_all(&results);
                Err(e)
            }
        }
    }

    fn execute_distinct(
        &self,
        queries: &[&CompiledQuery],
        options: &QueryOptions,
    ) -> Vec<Result<Arc<dyn ResultSet>>> {
        let run = |query: &&CompiledQuery| {
            self.executor
                .execute(query, options.skip_count, options.max_items)
        };
        if self.config.parallel_execution && queries.len() > 1 {
            self.thread_pool
                .install(|| queries.par_iter().map(run).collect())
        } else {
            queries.iter().map(run).collect()
        }
    }
}

fn release_all(results: &[Arc<dyn ResultSet>]) {
    for result in results {
        if let Err(e) = result.close() {
            warn!("failed to release result: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DataType, MemoryDictionary, NamespaceMap, QName, TypeRegistry};
    use crate::query::{IndexQuery, StaticSnapshot};
    use crate::repository::MemoryEntityLookup;
    use crate::search::{MemorySearchExecutor, RowEntry};

    const CM: &str = "urn:content";

    fn context(engine: &QueryEngine) -> QueryBuilderContext {
        let types = TypeRegistry::builder()
            .add_type(QName::new(CM, "document"), None)
            .build()
            .unwrap();
        let dictionary = MemoryDictionary::new(types)
            .with_property(QName::new(CM, "owner"), DataType::Id);
        engine.context(
            Arc::new(dictionary),
            Arc::new(NamespaceMap::new().with_prefix("cm", CM)),
            TenantContext::single(),
            SearchParameters::new(),
            Arc::new(StaticSnapshot::new(1)),
        )
    }

    fn owner_query(owner: &str) -> IndexQuery {
        IndexQuery::term(format!("@{{{CM}}}owner"), owner)
    }

    fn engine(executor: MemorySearchExecutor) -> (QueryEngine, Arc<MemorySearchExecutor>) {
        let executor = Arc::new(executor);
        let engine = QueryEngine::new(
            QueryEngineConfig::new().with_thread_pool_size(2),
            executor.clone(),
            Arc::new(MemoryEntityLookup::new()),
        )
        .unwrap();
        (engine, executor)
    }

    #[test]
    fn test_identical_selectors_share_one_execution() {
        let (engine, executor) = engine(
            MemorySearchExecutor::new()
                .with_hits(owner_query("a"), vec![RowEntry::new("7", 0.9)]),
        );
        let query = FederatedQuery::new("self join")
            .with_selector(SelectorQuery::new("A", Predicate::equals("cm:owner", "a")))
            .with_selector(SelectorQuery::new("B", Predicate::equals("cm:owner", "a")));

        let set = engine.execute(&context(&engine), &query).unwrap();
        assert_eq!(executor.executions(), 1);
        assert_eq!(set.selector_shape(), Some(crate::federation::SelectorShape::SharedResult));
        assert_eq!(set.entity_id(0).unwrap().as_str(), "7");
    }

    #[test]
    fn test_compile_failure_prevents_execution() {
        let (engine, executor) = engine(MemorySearchExecutor::new());
        let query = FederatedQuery::new("bad")
            .with_selector(SelectorQuery::new("A", Predicate::equals("cm:owner", "a")))
            .with_selector(SelectorQuery::new("B", Predicate::equals("cm:nosuchprop", "a")));

        let err = engine.execute(&context(&engine), &query).unwrap_err();
        assert!(matches!(err, DocQueryError::UnknownField { .. }));
        assert_eq!(executor.executions(), 0);
    }

    #[test]
    fn test_duplicate_and_missing_selectors() {
        let (engine, _) = engine(MemorySearchExecutor::new());
        let context = context(&engine);

        let err = engine.execute(&context, &FederatedQuery::new("empty")).unwrap_err();
        assert!(matches!(err, DocQueryError::InvalidArgument(_)));

        let query = FederatedQuery::new("dup")
            .with_selector(SelectorQuery::new("A", Predicate::exists("cm:owner")))
            .with_selector(SelectorQuery::new("A", Predicate::exists("cm:owner")));
        let err = engine.execute(&context, &query).unwrap_err();
        assert!(matches!(err, DocQueryError::DuplicateSelector(_)));
    }

    #[test]
    fn test_type_scope_and_paging_options() {
        let scoped = IndexQuery::Boolean(
            crate::query::BooleanQueryBuilder::new()
                .must(IndexQuery::term("TYPE", QName::new(CM, "document").to_string()))
                .must(owner_query("a"))
                .build(),
        );
        let hits = (0..4).map(|i| RowEntry::new(i.to_string(), 1.0)).collect();
        let (engine, _) = engine(MemorySearchExecutor::new().with_hits(scoped, hits));
        let query = FederatedQuery::new("SELECT * FROM cm:document WHERE cm:owner = 'a'")
            .with_selector(
                SelectorQuery::new("d", Predicate::equals("cm:owner", "a")).with_type("cm:document"),
            )
            .with_skip_count(1)
            .with_max_items(2);

        let set = engine.execute(&context(&engine), &query).unwrap();
        assert_eq!(set.row_count().unwrap(), 2);
        assert_eq!(set.start(), 1);
        assert_eq!(set.max_items(), 2);
        assert!(set.has_more().unwrap());
        assert_eq!(set.entity_id(0).unwrap().as_str(), "1");
    }
}
