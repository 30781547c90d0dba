//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Each command opens the configured store, runs one registry operation and
//! prints either a human-readable summary or, in `--json-mode`, the same
//! JSON body the HTTP API would return.

use crate::api::{
    self, PrototypeJson, PrototypeWithTestsJson, StatusResponse, TestCaseJson,
};
use crate::config::{Backend, SecurityConfig, StorageConfig};
use protolab_core::{
    PrototypeId, PrototypeView, ProtolabError, Registry, Status, StorageBackend, TestCaseId,
    Validator,
};
use serde::Serialize;

// =============================================================================
// CONTEXT
// =============================================================================

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub storage: StorageConfig,
    pub json_mode: bool,
}

/// Open the registry for the configured backend.
pub fn open_registry(storage: &StorageConfig) -> Result<Registry, ProtolabError> {
    match storage.backend {
        Backend::Redb => Registry::with_redb(&storage.database),
        Backend::Memory => Ok(Registry::new()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ProtolabError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ProtolabError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    ctx: &Context,
    bind: &str,
    security: &SecurityConfig,
    seed: bool,
) -> Result<(), ProtolabError> {
    let mut registry = open_registry(&ctx.storage)?;

    if seed {
        let inserted = registry.seed_demo()?;
        if inserted > 0 {
            tracing::info!(event = "demo_seeded", prototypes = inserted, "Demo data inserted");
        }
    }

    println!("Protolab Readiness Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", bind);
    println!("  Backend:  {}", ctx.storage.backend.as_str());
    println!("  Database: {:?}", ctx.storage.database);
    println!();
    println!("Endpoints:");
    println!("  GET    /api/prototypes              - List prototypes");
    println!("  POST   /api/prototypes              - Create a prototype");
    println!("  GET    /api/prototypes/{{id}}         - Get a prototype");
    println!("  PATCH  /api/prototypes/{{id}}         - Edit a prototype");
    println!("  DELETE /api/prototypes/{{id}}         - Delete a prototype");
    println!("  POST   /api/prototypes/{{id}}/advance - Advance status");
    println!("  POST   /api/test-cases              - Create a test case");
    println!("  PATCH  /api/test-cases/{{id}}         - Record a result");
    println!("  DELETE /api/test-cases/{{id}}         - Delete a test case");
    println!("  GET    /status                      - Portfolio counts");
    println!("  GET    /health                      - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(bind, registry, security).await
}

// =============================================================================
// READ COMMANDS
// =============================================================================

/// Show portfolio counts.
pub fn cmd_status(ctx: &Context) -> Result<(), ProtolabError> {
    let registry = open_registry(&ctx.storage)?;
    let metrics = registry.metrics()?;

    if ctx.json_mode {
        return print_json(&StatusResponse::from(&metrics));
    }

    println!("Protolab Portfolio Status");
    println!("=========================");
    match registry.backend() {
        StorageBackend::Persistent(redb) => println!("Database: {:?}", redb.path()),
        StorageBackend::InMemory(_) => println!("Database: (in memory)"),
    }
    println!();
    println!("Prototypes: {}", metrics.prototype_count);
    println!("Test cases: {}", metrics.test_case_count);
    println!();
    for status in Status::ALL {
        println!("  {:<7} {}", status.as_str(), metrics.by_status.get(status));
    }
    println!();
    println!("Releasable (TEST, gate open): {}", metrics.releasable);

    Ok(())
}

/// List every prototype.
pub fn cmd_list(ctx: &Context) -> Result<(), ProtolabError> {
    let registry = open_registry(&ctx.storage)?;
    let views = registry.list()?;

    if ctx.json_mode {
        let body: Vec<PrototypeWithTestsJson> =
            views.iter().map(PrototypeWithTestsJson::from).collect();
        return print_json(&body);
    }

    if views.is_empty() {
        println!("No prototypes. Create one with `protolab create` or run `protolab seed`.");
        return Ok(());
    }

    println!(
        "{:<26}  {:<7}  {:>9}  {:>5}  NAME",
        "ID", "STATUS", "READINESS", "TESTS"
    );
    for view in &views {
        println!(
            "{:<26}  {:<7}  {:>8}%  {:>5}  {}",
            view.prototype.id,
            view.prototype.status.as_str(),
            view.readiness,
            view.tests.len(),
            view.prototype.name
        );
    }

    Ok(())
}

/// Show one prototype with its test cases.
pub fn cmd_show(ctx: &Context, id: &str) -> Result<(), ProtolabError> {
    let registry = open_registry(&ctx.storage)?;
    let id = PrototypeId::new(id);
    let view = registry.get(&id)?;

    if ctx.json_mode {
        return print_json(&PrototypeWithTestsJson::from(&view));
    }

    print_view(&view);

    if view.prototype.status == Status::Test {
        let decision = registry.release_check(&id)?;
        println!();
        if decision.allowed {
            println!("Release gate: open");
        } else {
            println!("Release gate: blocked");
            for reason in &decision.reasons {
                println!("  - {} ({})", reason.sentence(), reason);
            }
        }
    }

    Ok(())
}

fn print_view(view: &PrototypeView) {
    let p = &view.prototype;
    println!("{} [{}]", p.name, p.id);
    println!("  Area:        {}", p.area);
    println!("  Owner:       {}", p.owner);
    println!("  Target date: {}", p.target_date);
    println!("  Status:      {}", p.status);
    println!("  Readiness:   {}%", view.readiness);
    println!();

    if view.tests.is_empty() {
        println!("  No test cases");
        return;
    }
    println!("  Test cases:");
    for test in &view.tests {
        println!(
            "    {:<26}  {:<13}  {:<7}  {}",
            test.id,
            test.test_type.as_str(),
            test.result.as_str(),
            test.title
        );
    }
}

// =============================================================================
// PROTOTYPE COMMANDS
// =============================================================================

/// Create a prototype.
pub fn cmd_create(
    ctx: &Context,
    name: Option<&str>,
    area: Option<&str>,
    owner: Option<&str>,
    target_date: Option<&str>,
) -> Result<(), ProtolabError> {
    let input = Validator::new_prototype(name, area, owner, target_date)?;
    let mut registry = open_registry(&ctx.storage)?;
    let prototype = registry.create(input)?;

    if ctx.json_mode {
        return print_json(&PrototypeJson::from(&prototype));
    }
    println!("Created prototype {} ({})", prototype.name, prototype.id);
    Ok(())
}

/// Edit a prototype.
pub fn cmd_edit(
    ctx: &Context,
    id: &str,
    name: Option<&str>,
    area: Option<&str>,
    owner: Option<&str>,
    target_date: Option<&str>,
) -> Result<(), ProtolabError> {
    let patch = Validator::prototype_patch(name, area, owner, target_date)?;
    let mut registry = open_registry(&ctx.storage)?;
    let prototype = registry.edit(&PrototypeId::new(id), &patch)?;

    if ctx.json_mode {
        return print_json(&PrototypeJson::from(&prototype));
    }
    println!("Updated prototype {} ({})", prototype.name, prototype.id);
    Ok(())
}

/// Advance a prototype one lifecycle step.
pub fn cmd_advance(ctx: &Context, id: &str) -> Result<(), ProtolabError> {
    let mut registry = open_registry(&ctx.storage)?;
    let prototype = registry.advance(&PrototypeId::new(id))?;
    tracing::info!(
        event = "status_advanced",
        prototype_id = %prototype.id,
        status = %prototype.status,
        "Prototype advanced"
    );

    if ctx.json_mode {
        return print_json(&PrototypeJson::from(&prototype));
    }
    println!("{} is now {}", prototype.name, prototype.status);
    Ok(())
}

/// Delete a prototype and its test cases.
pub fn cmd_delete(ctx: &Context, id: &str) -> Result<(), ProtolabError> {
    let mut registry = open_registry(&ctx.storage)?;
    let existed = registry.delete(&PrototypeId::new(id))?;

    if ctx.json_mode {
        return print_json(&serde_json::json!({ "deleted": existed }));
    }
    if existed {
        println!("Deleted prototype {}", id);
    } else {
        println!("No prototype {} (nothing to delete)", id);
    }
    Ok(())
}

// =============================================================================
// TEST CASE COMMANDS
// =============================================================================

/// Add a test case to a prototype.
pub fn cmd_add_test(
    ctx: &Context,
    prototype_id: &str,
    title: Option<&str>,
    test_type: Option<&str>,
) -> Result<(), ProtolabError> {
    let input = Validator::new_test_case(Some(prototype_id), title, test_type)?;
    let mut registry = open_registry(&ctx.storage)?;
    let test = registry.create_test_case(input)?;

    if ctx.json_mode {
        return print_json(&TestCaseJson::from(&test));
    }
    println!("Added test case {} ({})", test.title, test.id);
    Ok(())
}

/// Record a test result.
pub fn cmd_set_result(ctx: &Context, id: &str, result: &str) -> Result<(), ProtolabError> {
    let result = Validator::test_result(Some(result))?;
    let mut registry = open_registry(&ctx.storage)?;
    let test = registry.update_test_result(&TestCaseId::new(id), result)?;

    if ctx.json_mode {
        return print_json(&TestCaseJson::from(&test));
    }
    println!("{} is now {}", test.title, test.result);
    Ok(())
}

/// Delete a test case.
pub fn cmd_remove_test(ctx: &Context, id: &str) -> Result<(), ProtolabError> {
    let mut registry = open_registry(&ctx.storage)?;
    let existed = registry.delete_test_case(&TestCaseId::new(id))?;

    if ctx.json_mode {
        return print_json(&serde_json::json!({ "deleted": existed }));
    }
    if existed {
        println!("Deleted test case {}", id);
    } else {
        println!("No test case {} (nothing to delete)", id);
    }
    Ok(())
}

// =============================================================================
// SEED & INIT COMMANDS
// =============================================================================

/// Insert the demo portfolio into an empty store.
pub fn cmd_seed(ctx: &Context) -> Result<(), ProtolabError> {
    let mut registry = open_registry(&ctx.storage)?;
    let inserted = registry.seed_demo()?;

    if ctx.json_mode {
        return print_json(&serde_json::json!({ "inserted": inserted }));
    }
    if inserted > 0 {
        println!("Inserted {} demo prototypes", inserted);
    } else {
        println!("Store is not empty, demo data skipped");
    }
    Ok(())
}

/// Initialize a new database.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), ProtolabError> {
    let db_path = &ctx.storage.database;

    if ctx.storage.backend == Backend::Memory {
        println!("The memory backend has no database to initialize");
        return Ok(());
    }

    if db_path.exists() {
        if !force {
            return Err(ProtolabError::IoError(format!(
                "Database {:?} already exists. Use --force to overwrite.",
                db_path
            )));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| ProtolabError::IoError(format!("Remove {:?}: {}", db_path, e)))?;
    }

    let _registry = Registry::with_redb(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn redb_ctx(database: PathBuf) -> Context {
        Context {
            storage: StorageConfig {
                database,
                backend: Backend::Redb,
            },
            json_mode: true,
        }
    }

    #[test]
    fn commands_share_the_database() {
        let dir = tempdir().expect("temp dir");
        let ctx = redb_ctx(dir.path().join("cli.redb"));

        cmd_seed(&ctx).expect("seed");
        cmd_create(
            &ctx,
            Some("Sample Rig"),
            Some("Other"),
            Some("QA"),
            Some("2026-12-01"),
        )
        .expect("create");

        let registry = open_registry(&ctx.storage).expect("open");
        assert_eq!(registry.list().expect("list").len(), 5);
    }

    #[test]
    fn create_reports_validation() {
        let dir = tempdir().expect("temp dir");
        let ctx = redb_ctx(dir.path().join("cli.redb"));

        let err = cmd_create(&ctx, Some("X"), Some("Mars"), None, Some("2026-13-01"))
            .expect_err("invalid");
        assert!(matches!(err, ProtolabError::Validation(ref e) if e.fields().len() == 4));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempdir().expect("temp dir");
        let ctx = redb_ctx(dir.path().join("cli.redb"));

        cmd_init(&ctx, false).expect("init");
        cmd_seed(&ctx).expect("seed");
        assert!(cmd_init(&ctx, false).is_err());

        cmd_init(&ctx, true).expect("force init");
        let registry = open_registry(&ctx.storage).expect("open");
        assert!(registry.list().expect("list").is_empty());
    }

    #[test]
    fn status_reads_both_backends() {
        let dir = tempdir().expect("temp dir");
        let mut ctx = redb_ctx(dir.path().join("cli.redb"));
        ctx.json_mode = false;
        cmd_seed(&ctx).expect("seed");
        cmd_status(&ctx).expect("redb status");

        ctx.storage.backend = Backend::Memory;
        cmd_status(&ctx).expect("memory status");
    }

    #[test]
    fn memory_backend_opens_empty() {
        let storage = StorageConfig {
            database: PathBuf::from("unused.redb"),
            backend: Backend::Memory,
        };
        let registry = open_registry(&storage).expect("open");
        assert!(!registry.is_persistent());
    }
}
