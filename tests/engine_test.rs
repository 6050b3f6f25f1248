//! End-to-end tests: compile, execute and federate through the engine.

use std::io::Write;
use std::sync::Arc;

use docquery::config::QueryEngineConfig;
use docquery::dictionary::{DataType, MemoryDictionary, NamespaceMap, QName, TypeRegistry};
use docquery::error::{DocQueryError, Result};
use docquery::query::*;
use docquery::repository::{EntityId, MemoryEntityLookup, ParentLink};
use docquery::search::{
    FederatedQuery, MemorySearchExecutor, QueryEngine, RowEntry, SelectorQuery,
};
use tempfile::NamedTempFile;

const CM: &str = "urn:content";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dictionary() -> Result<MemoryDictionary> {
    let types = TypeRegistry::builder()
        .add_type(QName::new(CM, "document"), None)
        .add_type(QName::new(CM, "folder"), None)
        .build()?;
    Ok(MemoryDictionary::new(types)
        .with_property(QName::new(CM, "name"), DataType::Text)
        .with_property(QName::new(CM, "owner"), DataType::Id))
}

fn type_term(local: &str) -> IndexQuery {
    IndexQuery::term("TYPE", QName::new(CM, local).to_string())
}

fn scoped(local: &str, query: IndexQuery) -> IndexQuery {
    IndexQuery::Boolean(BooleanQueryBuilder::new().must(type_term(local)).must(query).build())
}

fn owner(name: &str) -> IndexQuery {
    IndexQuery::term(format!("@{{{CM}}}owner"), name)
}

fn lookup() -> MemoryEntityLookup {
    MemoryEntityLookup::new()
        .with_root(EntityId::from("root"))
        .with_child(ParentLink {
            parent: EntityId::from("root"),
            child: EntityId::from("7"),
            assoc_type: QName::new(CM, "contains"),
            name: QName::new(CM, "report"),
            primary: true,
        })
}

fn engine(config: QueryEngineConfig, executor: MemorySearchExecutor) -> Result<(QueryEngine, Arc<MemorySearchExecutor>)> {
    let executor = Arc::new(executor);
    let engine = QueryEngine::new(config, executor.clone(), Arc::new(lookup()))?;
    Ok((engine, executor))
}

fn context(engine: &QueryEngine) -> Result<QueryBuilderContext> {
    Ok(engine.context(
        Arc::new(dictionary()?),
        Arc::new(NamespaceMap::new().with_prefix("cm", CM)),
        TenantContext::single(),
        engine.default_parameters(),
        Arc::new(StaticSnapshot::new(1)),
    ))
}

#[test]
fn test_join_of_two_selectors() -> Result<()> {
    init_logger();

    let executor = MemorySearchExecutor::new()
        .with_hits(
            scoped("document", owner("alice")),
            vec![RowEntry::new("7", 0.9), RowEntry::new("8", 0.5)],
        )
        .with_hits(
            scoped("folder", owner("alice")),
            vec![RowEntry::new("7", 0.9), RowEntry::new("3", 0.5)],
        );
    let (engine, executor) = engine(QueryEngineConfig::new().with_thread_pool_size(2), executor)?;
    let context = context(&engine)?;

    let query = FederatedQuery::new("SELECT * FROM cm:document d JOIN cm:folder f")
        .with_selector(
            SelectorQuery::new("d", Predicate::equals("cm:owner", "alice")).with_type("cm:document"),
        )
        .with_selector(
            SelectorQuery::new("f", Predicate::equals("cm:owner", "alice")).with_type("cm:folder"),
        );

    let set = engine.execute(&context, &query)?;
    assert_eq!(executor.executions(), 2);
    assert_eq!(set.selectors(), vec!["d", "f"]);
    assert_eq!(set.row_count()?, 2);

    assert_eq!(set.entity_id(0)?, EntityId::from("7"));
    assert_eq!(set.primary_parent_link(0)?.map(|link| link.parent), Some(EntityId::from("root")));
    assert!(matches!(
        set.entity_id(1),
        Err(DocQueryError::AmbiguousSelector { row: 1, .. })
    ));
    assert_eq!(set.score(1)?, 0.5);

    let page = set.page()?;
    assert_eq!(page.num_items, 2);
    assert_eq!(page.rows[1].selectors[0].entity_id, EntityId::from("8"));

    set.close()?;
    assert!(matches!(set.row_count(), Err(DocQueryError::ResultSetClosed)));

    Ok(())
}

#[test]
fn test_execution_failure_releases_finished_results() -> Result<()> {
    init_logger();

    let executor = MemorySearchExecutor::new()
        .with_hits(scoped("document", owner("bob")), vec![RowEntry::new("1", 1.0)])
        .with_failure(scoped("folder", owner("bob")), "index unavailable");
    let (engine, _) = engine(
        QueryEngineConfig::new().with_parallel_execution(false),
        executor,
    )?;
    let context = context(&engine)?;

    let query = FederatedQuery::new("join")
        .with_selector(
            SelectorQuery::new("d", Predicate::equals("cm:owner", "bob")).with_type("cm:document"),
        )
        .with_selector(
            SelectorQuery::new("f", Predicate::equals("cm:owner", "bob")).with_type("cm:folder"),
        );

    match engine.execute(&context, &query) {
        Err(DocQueryError::SearchExecution { message, .. }) => {
            assert_eq!(message, "index unavailable")
        }
        other => panic!("expected execution error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_engine_from_config_file() -> Result<()> {
    init_logger();

    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{"default_ml_analysis_mode": "all_only", "default_max_items": 1, "thread_pool_size": 1}}"#
    )?;
    let config = QueryEngineConfig::from_json_file(file.path())?;
    assert_eq!(config.default_ml_analysis_mode, MlAnalysisMode::AllOnly);

    let executor = MemorySearchExecutor::new().with_hits(
        IndexQuery::term(format!("@{{{CM}}}name"), "budget"),
        vec![RowEntry::new("1", 0.3), RowEntry::new("2", 0.2)],
    );
    let (engine, _) = engine(config, executor)?;
    let context = context(&engine)?;
    assert_eq!(context.field_resolver().default_mode(), MlAnalysisMode::AllOnly);

    let query = FederatedQuery::new("SELECT * FROM cm:document")
        .with_selector(SelectorQuery::new("d", Predicate::full_text_in("cm:name", "Budget")));
    let set = engine.execute(&context, &query)?;
    assert_eq!(set.row_count()?, 1);
    assert_eq!(set.max_items(), 1);
    assert!(set.has_more()?);

    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let err = QueryEngine::new(
        QueryEngineConfig::new().with_default_max_items(0),
        Arc::new(MemorySearchExecutor::new()),
        Arc::new(MemoryEntityLookup::new()),
    )
    .unwrap_err();
    assert!(matches!(err, DocQueryError::Config(_)));
}
