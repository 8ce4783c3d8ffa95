pub(crate) const DEFAULT_PREFIXES: [&str; 2] = ["-", "--"];
pub(crate) const DOUBLE_DASH: &str = "--";
pub(crate) const IMPLICIT_TRUE: &str = "true";
pub(crate) const ROOT_SCOPE: &str = "root";
pub(crate) const VALIDATION_GROUP: &str = "Validation";
pub(crate) const SYNTAX_GROUP: &str = "Syntax";
pub(crate) const ANALYSIS_GROUP: &str = "Analysis";
pub(crate) const CONSTRAINT_GROUP: &str = "Constraint";
