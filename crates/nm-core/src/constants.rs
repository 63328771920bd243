/// Agent role.
pub const ARG0: &str = "ARG0";

/// Patient role.
pub const ARG1: &str = "ARG1";

/// Secondary argument role.
pub const ARG2: &str = "ARG2";

/// Verb role. Carries the space-joined verb tokens.
pub const VERB: &str = "B-V";

/// Negation modifier role. Carries a boolean presence flag.
pub const NEGATION: &str = "B-ARGM-NEG";

/// Modal modifier role. Carries a list of candidate labels.
pub const MODAL: &str = "B-ARGM-MOD";

/// Declared role universe when no configuration is supplied, in declaration order.
pub const DEFAULT_USED_ROLES: [&str; 6] = [ARG0, VERB, NEGATION, MODAL, ARG1, ARG2];

/// Roles that are clustered upstream when no configuration is supplied.
pub const DEFAULT_EMBEDDABLE_ROLES: [&str; 4] = [ARG0, VERB, ARG1, ARG2];

/// Display priority for narrative tuples.
pub const DEFAULT_DISPLAY_ORDER: [&str; 6] = [ARG0, MODAL, VERB, NEGATION, ARG1, ARG2];

/// Roles searched for named entities by default.
pub const DEFAULT_ENTITY_ROLES: [&str; 2] = [ARG0, ARG1];
