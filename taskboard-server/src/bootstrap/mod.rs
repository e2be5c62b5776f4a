//! Database provisioning
//!
//! Creates, in order:
//!
//! 1. an application user with `readWrite` on the application database only
//! 2. the `tasks` and `users` collections
//! 3. indexes on `tasks.createdAt`, `tasks.completed` and a unique index on
//!    `users.email`
//!
//! `BootstrapMode::Strict` issues every command and surfaces the first
//! driver error. `BootstrapMode::IfAbsent` checks each object first and
//! skips what already exists, so it can be re-run safely.

use std::fmt;

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

use crate::db::{DEFAULT_DATABASE, TASKS_COLLECTION, USERS_COLLECTION};
use crate::models::task::fields;

/// Default application user
pub const DEFAULT_APP_USER: &str = "todo_user";

/// The only role granted to the application user
pub const READ_WRITE_ROLE: &str = "readWrite";

/// Single-field ascending index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub field: &'static str,
    pub unique: bool,
}

impl IndexSpec {
    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        keys.insert(self.field, 1);
        keys
    }

    pub fn model(&self) -> IndexModel {
        let options = IndexOptions::builder().unique(self.unique).build();
        IndexModel::builder()
            .keys(self.keys())
            .options(options)
            .build()
    }

    /// True when an existing index satisfies this spec
    fn matches(&self, existing: &IndexModel) -> bool {
        let unique = existing
            .options
            .as_ref()
            .and_then(|o| o.unique)
            .unwrap_or(false);
        let ascending = existing.keys.len() == 1
            && existing.keys.get(self.field).and_then(key_direction) == Some(1.0);
        ascending && (!self.unique || unique)
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.field)?;
        if self.unique {
            write!(f, " (unique)")?;
        }
        Ok(())
    }
}

/// Shell-created indexes store directions as doubles
fn key_direction(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Indexes every provisioned database gets
pub const INDEXES: [IndexSpec; 3] = [
    IndexSpec {
        collection: TASKS_COLLECTION,
        field: fields::CREATED_AT,
        unique: false,
    },
    IndexSpec {
        collection: TASKS_COLLECTION,
        field: fields::COMPLETED,
        unique: false,
    },
    IndexSpec {
        collection: USERS_COLLECTION,
        field: "email",
        unique: true,
    },
];

/// Collections every provisioned database gets
pub const COLLECTIONS: [&str; 2] = [TASKS_COLLECTION, USERS_COLLECTION];

/// What to provision
#[derive(Clone)]
pub struct BootstrapPlan {
    pub database: String,
    pub app_user: String,
    app_password: Option<String>,
    pub collections: Vec<&'static str>,
    pub indexes: Vec<IndexSpec>,
}

impl BootstrapPlan {
    /// The standard plan: both collections and all three indexes.
    pub fn new(
        database: impl Into<String>,
        app_user: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Result<Self, BootstrapError> {
        let app_password = app_password.into();
        if app_password.is_empty() {
            return Err(BootstrapError::Invalid("application password is empty".into()));
        }

        let mut plan = Self::for_verify(database, app_user)?;
        plan.app_password = Some(app_password);
        Ok(plan)
    }

    /// Plan without a password. Enough for `verify`; `run` rejects it.
    pub fn for_verify(
        database: impl Into<String>,
        app_user: impl Into<String>,
    ) -> Result<Self, BootstrapError> {
        let plan = Self {
            database: database.into(),
            app_user: app_user.into(),
            app_password: None,
            collections: COLLECTIONS.to_vec(),
            indexes: INDEXES.to_vec(),
        };

        if plan.database.trim().is_empty() {
            return Err(BootstrapError::Invalid("database name is empty".into()));
        }
        if plan.app_user.trim().is_empty() {
            return Err(BootstrapError::Invalid("application user is empty".into()));
        }

        Ok(plan)
    }

    /// Plan for the default database and user.
    pub fn with_defaults(app_password: impl Into<String>) -> Result<Self, BootstrapError> {
        Self::new(DEFAULT_DATABASE, DEFAULT_APP_USER, app_password)
    }

    /// `role@db` strings the application user must hold, and nothing else
    pub fn expected_roles(&self) -> Vec<String> {
        vec![format!("{}@{}", READ_WRITE_ROLE, self.database)]
    }
}

impl fmt::Debug for BootstrapPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapPlan")
            .field("database", &self.database)
            .field("app_user", &self.app_user)
            .field(
                "app_password",
                &self.app_password.as_ref().map(|_| "<redacted>"),
            )
            .field("collections", &self.collections)
            .field("indexes", &self.indexes)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapMode {
    /// Create everything; fail on the first error
    #[default]
    Strict,
    /// Skip objects that already exist
    IfAbsent,
}

/// One provisioning step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Inspect,
    Credential(String),
    Collection(&'static str),
    Index(IndexSpec),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inspect => write!(f, "list collections"),
            Self::Credential(user) => write!(f, "create user '{}'", user),
            Self::Collection(name) => write!(f, "create collection '{}'", name),
            Self::Index(spec) => write!(f, "create index on {}", spec),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Created,
    Skipped,
}

/// Steps taken by a bootstrap run, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub steps: Vec<(Step, StepOutcome)>,
}

impl BootstrapReport {
    fn record(&mut self, step: Step, outcome: StepOutcome) {
        tracing::info!(step = %step, ?outcome, "Bootstrap step");
        self.steps.push((step, outcome));
    }

    pub fn created(&self) -> usize {
        self.count(StepOutcome::Created)
    }

    pub fn skipped(&self) -> usize {
        self.count(StepOutcome::Skipped)
    }

    fn count(&self, outcome: StepOutcome) -> usize {
        self.steps.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Bootstrap error type
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("invalid bootstrap plan: {0}")]
    Invalid(String),

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: mongodb::error::Error,
    },
}

impl Step {
    fn failed(self, source: mongodb::error::Error) -> BootstrapError {
        BootstrapError::Step { step: self, source }
    }
}

/// What `verify` found on the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningStatus {
    pub database: String,
    pub app_user: String,
    /// `role@db` entries held by the application user; `None` if the user is missing
    pub credential_roles: Option<Vec<String>>,
    pub expected_roles: Vec<String>,
    pub collections: Vec<(&'static str, bool)>,
    pub indexes: Vec<(IndexSpec, bool)>,
}

impl ProvisioningStatus {
    /// User exists and holds exactly the expected roles
    pub fn credential_ok(&self) -> bool {
        self.credential_roles.as_ref() == Some(&self.expected_roles)
    }

    pub fn is_complete(&self) -> bool {
        self.credential_ok()
            && self.collections.iter().all(|(_, present)| *present)
            && self.indexes.iter().all(|(_, present)| *present)
    }
}

impl fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mark(ok: bool) -> &'static str {
            if ok {
                "ok"
            } else {
                "MISSING"
            }
        }

        writeln!(f, "database {}", self.database)?;
        match &self.credential_roles {
            Some(roles) if self.credential_ok() => {
                writeln!(f, "  [ok] user {} ({})", self.app_user, roles.join(", "))?
            }
            Some(roles) => writeln!(
                f,
                "  [WRONG ROLES] user {} has [{}], expected [{}]",
                self.app_user,
                roles.join(", "),
                self.expected_roles.join(", ")
            )?,
            None => writeln!(f, "  [MISSING] user {}", self.app_user)?,
        }
        for (name, present) in &self.collections {
            writeln!(f, "  [{}] collection {}", mark(*present), name)?;
        }
        for (spec, present) in &self.indexes {
            writeln!(f, "  [{}] index {}", mark(*present), spec)?;
        }
        Ok(())
    }
}

/// Runs a [`BootstrapPlan`] against one database
pub struct Bootstrapper {
    db: Database,
    plan: BootstrapPlan,
}

impl Bootstrapper {
    pub fn new(client: &Client, plan: BootstrapPlan) -> Self {
        Self {
            db: client.database(&plan.database),
            plan,
        }
    }

    pub fn plan(&self) -> &BootstrapPlan {
        &self.plan
    }

    /// Provision the database. No rollback: on error, earlier steps stay applied.
    pub async fn run(&self, mode: BootstrapMode) -> Result<BootstrapReport, BootstrapError> {
        let password = self.plan.app_password.as_deref().ok_or_else(|| {
            BootstrapError::Invalid("application password is required to bootstrap".into())
        })?;

        tracing::info!(database = %self.plan.database, ?mode, "Bootstrapping database...");
        let mut report = BootstrapReport::default();
        let if_absent = mode == BootstrapMode::IfAbsent;

        // Credential
        let step = Step::Credential(self.plan.app_user.clone());
        let exists = if if_absent {
            self.credential_roles()
                .await
                .map_err(|e| step.clone().failed(e))?
                .is_some()
        } else {
            false
        };
        if exists {
            report.record(step, StepOutcome::Skipped);
        } else {
            self.create_credential(password)
                .await
                .map_err(|e| step.clone().failed(e))?;
            report.record(step, StepOutcome::Created);
        }

        // Collections
        let existing = if if_absent {
            self.db
                .list_collection_names()
                .await
                .map_err(|e| Step::Inspect.failed(e))?
        } else {
            Vec::new()
        };
        for &name in &self.plan.collections {
            let step = Step::Collection(name);
            if existing.iter().any(|c| c == name) {
                report.record(step, StepOutcome::Skipped);
                continue;
            }
            self.db
                .create_collection(name)
                .await
                .map_err(|e| step.clone().failed(e))?;
            report.record(step, StepOutcome::Created);
        }

        // Indexes
        for spec in &self.plan.indexes {
            let step = Step::Index(*spec);
            let exists = if if_absent {
                self.index_exists(spec)
                    .await
                    .map_err(|e| step.clone().failed(e))?
            } else {
                false
            };
            if exists {
                report.record(step, StepOutcome::Skipped);
                continue;
            }
            self.db
                .collection::<Document>(spec.collection)
                .create_index(spec.model())
                .await
                .map_err(|e| step.clone().failed(e))?;
            report.record(step, StepOutcome::Created);
        }

        tracing::info!(
            database = %self.plan.database,
            created = report.created(),
            skipped = report.skipped(),
            "Database initialization completed successfully"
        );
        Ok(report)
    }

    /// Inspect the instance without changing it.
    pub async fn verify(&self) -> Result<ProvisioningStatus, BootstrapError> {
        let credential_roles = self
            .credential_roles()
            .await
            .map_err(|e| Step::Credential(self.plan.app_user.clone()).failed(e))?;

        let names = self
            .db
            .list_collection_names()
            .await
            .map_err(|e| Step::Inspect.failed(e))?;
        let collections = self
            .plan
            .collections
            .iter()
            .map(|&name| (name, names.iter().any(|n| n == name)))
            .collect();

        let mut indexes = Vec::with_capacity(self.plan.indexes.len());
        for spec in &self.plan.indexes {
            // listIndexes fails on a missing collection
            let present = if names.iter().any(|n| n == spec.collection) {
                self.index_exists(spec)
                    .await
                    .map_err(|e| Step::Index(*spec).failed(e))?
            } else {
                false
            };
            indexes.push((*spec, present));
        }

        Ok(ProvisioningStatus {
            database: self.plan.database.clone(),
            app_user: self.plan.app_user.clone(),
            credential_roles,
            expected_roles: self.plan.expected_roles(),
            collections,
            indexes,
        })
    }

    async fn create_credential(&self, password: &str) -> mongodb::error::Result<()> {
        self.db
            .run_command(doc! {
                "createUser": self.plan.app_user.as_str(),
                "pwd": password,
                "roles": [
                    { "role": READ_WRITE_ROLE, "db": self.plan.database.as_str() }
                ],
            })
            .await?;
        Ok(())
    }

    /// Roles of the application user as `role@db`, or `None` if it doesn't exist
    async fn credential_roles(&self) -> mongodb::error::Result<Option<Vec<String>>> {
        let reply = self
            .db
            .run_command(doc! { "usersInfo": self.plan.app_user.as_str() })
            .await?;
        Ok(parse_users_info(&reply))
    }

    async fn index_exists(&self, spec: &IndexSpec) -> mongodb::error::Result<bool> {
        let existing: Vec<IndexModel> = self
            .db
            .collection::<Document>(spec.collection)
            .list_indexes()
            .await?
            .try_collect()
            .await?;
        Ok(existing.iter().any(|index| spec.matches(index)))
    }
}

/// Extract `role@db` pairs of the first user in a `usersInfo` reply
fn parse_users_info(reply: &Document) -> Option<Vec<String>> {
    let user = reply
        .get_array("users")
        .ok()?
        .first()
        .and_then(Bson::as_document)?;

    let roles = user
        .get_array("roles")
        .map(|roles| {
            roles
                .iter()
                .filter_map(Bson::as_document)
                .filter_map(|r| Some(format!("{}@{}", r.get_str("role").ok()?, r.get_str("db").ok()?)))
                .collect()
        })
        .unwrap_or_default();

    Some(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> BootstrapPlan {
        BootstrapPlan::with_defaults("todo_password").unwrap()
    }

    #[test]
    fn default_plan() {
        let plan = plan();
        assert_eq!(plan.database, "todo_db");
        assert_eq!(plan.app_user, "todo_user");
        assert_eq!(plan.collections, vec!["tasks", "users"]);
        assert_eq!(plan.expected_roles(), vec!["readWrite@todo_db".to_string()]);

        let labels: Vec<String> = plan.indexes.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec!["tasks.createdAt", "tasks.completed", "users.email (unique)"]
        );
    }

    #[test]
    fn plan_rejects_blank_values() {
        assert!(matches!(
            BootstrapPlan::new(" ", "todo_user", "pw"),
            Err(BootstrapError::Invalid(_))
        ));
        assert!(matches!(
            BootstrapPlan::new("todo_db", "", "pw"),
            Err(BootstrapError::Invalid(_))
        ));
        assert!(matches!(
            BootstrapPlan::new("todo_db", "todo_user", ""),
            Err(BootstrapError::Invalid(_))
        ));
    }

    #[test]
    fn verify_plan_has_no_password() {
        let plan = BootstrapPlan::for_verify("todo_db", "todo_user").unwrap();
        assert!(plan.app_password.is_none());
        assert!(format!("{:?}", plan).contains("app_password: None"));
    }

    #[tokio::test]
    async fn run_requires_password() {
        // Fails before any command is sent, so no server is needed
        let client = crate::db::create_client("mongodb://127.0.0.1:1").await.unwrap();
        let plan = BootstrapPlan::for_verify("todo_db", "todo_user").unwrap();

        let result = Bootstrapper::new(&client, plan).run(BootstrapMode::IfAbsent).await;
        assert!(matches!(result, Err(BootstrapError::Invalid(_))));
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", plan());
        assert!(!rendered.contains("todo_password"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn index_model_keys_and_uniqueness() {
        let email = INDEXES[2].model();
        assert_eq!(email.keys, doc! { "email": 1 });
        assert_eq!(email.options.and_then(|o| o.unique), Some(true));

        let created = INDEXES[0].model();
        assert_eq!(created.keys, doc! { "createdAt": 1 });
        assert_eq!(created.options.and_then(|o| o.unique), Some(false));
    }

    #[test]
    fn index_matching() {
        let plain = IndexModel::builder().keys(doc! { "email": 1 }).build();
        assert!(!INDEXES[2].matches(&plain), "unique spec needs a unique index");
        assert!(INDEXES[2].matches(&INDEXES[2].model()));

        let descending = IndexModel::builder().keys(doc! { "createdAt": -1 }).build();
        assert!(!INDEXES[0].matches(&descending));
        assert!(INDEXES[0].matches(&INDEXES[0].model()));

        let from_shell = IndexModel::builder().keys(doc! { "createdAt": 1.0 }).build();
        assert!(INDEXES[0].matches(&from_shell));

        let compound = IndexModel::builder()
            .keys(doc! { "createdAt": 1, "completed": 1 })
            .build();
        assert!(!INDEXES[0].matches(&compound));
    }

    #[test]
    fn users_info_parsing() {
        let reply = doc! {
            "users": [{
                "user": "todo_user",
                "db": "todo_db",
                "roles": [{ "role": "readWrite", "db": "todo_db" }],
            }],
            "ok": 1.0,
        };
        assert_eq!(
            parse_users_info(&reply),
            Some(vec!["readWrite@todo_db".to_string()])
        );

        let missing = doc! { "users": [], "ok": 1.0 };
        assert_eq!(parse_users_info(&missing), None);
    }

    #[test]
    fn report_counts() {
        let mut report = BootstrapReport::default();
        report.record(Step::Credential("todo_user".into()), StepOutcome::Skipped);
        report.record(Step::Collection("tasks"), StepOutcome::Created);
        report.record(Step::Index(INDEXES[0]), StepOutcome::Created);

        assert_eq!(report.created(), 2);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn step_error_names_step() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = Step::Collection("tasks").failed(mongodb::error::Error::from(io));
        assert!(err.to_string().starts_with("create collection 'tasks' failed"));
    }

    fn status(roles: Option<Vec<&str>>) -> ProvisioningStatus {
        ProvisioningStatus {
            database: "todo_db".into(),
            app_user: "todo_user".into(),
            credential_roles: roles.map(|r| r.into_iter().map(String::from).collect()),
            expected_roles: vec!["readWrite@todo_db".into()],
            collections: vec![("tasks", true), ("users", true)],
            indexes: INDEXES.iter().map(|s| (*s, true)).collect(),
        }
    }

    #[test]
    fn provisioning_status_completeness() {
        assert!(status(Some(vec!["readWrite@todo_db"])).is_complete());
        assert!(!status(None).is_complete());
        assert!(!status(Some(vec!["readWrite@todo_db", "dbAdmin@admin"])).is_complete());
        assert!(!status(Some(vec!["read@todo_db"])).is_complete());

        let mut missing_index = status(Some(vec!["readWrite@todo_db"]));
        missing_index.indexes[2].1 = false;
        assert!(!missing_index.is_complete());

        let text = missing_index.to_string();
        assert!(text.contains("[ok] user todo_user (readWrite@todo_db)"));
        assert!(text.contains("[MISSING] index users.email (unique)"));
    }

    // Integration tests - need an instance where the connecting user may
    // create users (e.g. a local mongod without auth)
    // Run with: MONGODB_URI=mongodb://... cargo test -p taskboard-server -- --ignored

    async fn fresh(database: &str, user: &str) -> (Client, Bootstrapper) {
        let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI required");
        let client = crate::db::create_client(&uri).await.unwrap();
        let db = client.database(database);
        db.drop().await.unwrap();
        let _ = db.run_command(doc! { "dropUser": user }).await;

        let plan = BootstrapPlan::new(database, user, "test_password").unwrap();
        let bootstrapper = Bootstrapper::new(&client, plan);
        (client, bootstrapper)
    }

    async fn cleanup(client: &Client, database: &str, user: &str) {
        let db = client.database(database);
        let _ = db.run_command(doc! { "dropUser": user }).await;
        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn strict_bootstrap_provisions_everything() {
        let (client, bootstrapper) = fresh("taskboard_test_strict", "taskboard_test_strict_user").await;

        let report = bootstrapper.run(BootstrapMode::Strict).await.unwrap();
        assert_eq!(report.created(), 6);

        let status = bootstrapper.verify().await.unwrap();
        assert!(status.is_complete(), "{status}");

        // Strict mode is one-shot: the user now exists
        let rerun = bootstrapper.run(BootstrapMode::Strict).await;
        assert!(matches!(
            rerun,
            Err(BootstrapError::Step { step: Step::Credential(_), .. })
        ));

        cleanup(&client, "taskboard_test_strict", "taskboard_test_strict_user").await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn if_absent_bootstrap_is_rerunnable() {
        let (client, bootstrapper) = fresh("taskboard_test_if_absent", "taskboard_test_if_absent_user").await;

        let first = bootstrapper.run(BootstrapMode::IfAbsent).await.unwrap();
        assert_eq!(first.created(), 6);

        let second = bootstrapper.run(BootstrapMode::IfAbsent).await.unwrap();
        assert_eq!(second.created(), 0);
        assert_eq!(second.skipped(), 6);

        cleanup(&client, "taskboard_test_if_absent", "taskboard_test_if_absent_user").await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_email_rejected_after_bootstrap() {
        use crate::db::{DbError, UserRepo};
        use crate::models::{User, UserEmail};

        let (client, bootstrapper) = fresh("taskboard_test_unique", "taskboard_test_unique_user").await;
        bootstrapper.run(BootstrapMode::Strict).await.unwrap();

        let repo = UserRepo::new(&client.database("taskboard_test_unique"));
        let email = UserEmail::new("ankit@example.com").unwrap();
        repo.insert(&User::new("Ankit", &email)).await.unwrap();

        let second = repo.insert(&User::new("Other Ankit", &email)).await;
        assert!(matches!(second, Err(DbError::Duplicate { .. })));

        cleanup(&client, "taskboard_test_unique", "taskboard_test_unique_user").await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn verify_reports_fresh_database_incomplete() {
        let (client, bootstrapper) = fresh("taskboard_test_verify", "taskboard_test_verify_user").await;

        let status = bootstrapper.verify().await.unwrap();
        assert!(status.credential_roles.is_none());
        assert!(status.collections.iter().all(|(_, present)| !present));
        assert!(!status.is_complete());

        cleanup(&client, "taskboard_test_verify", "taskboard_test_verify_user").await;
    }
}
