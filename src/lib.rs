// Kubernetes deprecated-API manifest migration engine
pub mod advisory;
pub mod driver;
pub mod migration_rule;
pub mod reporter;
pub mod rule_table;
pub mod stream;
pub mod transformer;

// Re-export core types for convenience
pub use advisory::{AdvisoryProvider, DeprecationFinding};
pub use driver::{FileOutcome, FileReport, MigrateError, Migrator};
pub use migration_rule::{MigrationRule, StructuralTransform};
pub use reporter::{MigrationReport, MigrationReporter, ReportFormat};
pub use rule_table::{RuleTable, RuleTableError};
pub use stream::{migrate_stream, DocumentResult, StreamError, StreamOutcome};
pub use transformer::{DocumentTransformer, MigrationOutcome};
