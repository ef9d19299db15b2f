//! # System Constants
//!
//! Reserved wire keys, alias conventions, and the default limits shared by the
//! compilers, the assembler, and validation.

/// Reserved filter keys that open a nested boolean group
pub mod filter_keys {
    pub const AND: &str = "_and";
    pub const OR: &str = "_or";
    /// Prefix shared by every comparison operator on the wire (`_eq`, `_contains`, ...)
    pub const OPERATOR_PREFIX: char = '_';
}

/// Join alias conventions
pub mod aliases {
    /// Alias of the root entity in assembled SQL; the compilers leave root columns unqualified
    pub const ROOT: &str = "e0";
    /// Prefix for aliases allocated by the join planner (`e1`, `e2`, ...)
    pub const JOIN_PREFIX: &str = "e";
}

/// Default limits used when no configuration overrides them
pub mod limits {
    pub const MAX_FILTER_DEPTH: usize = 16;
    pub const MAX_OWNER_LENGTH: usize = 100;
    pub const MAX_TODO_NAME_LENGTH: usize = 50;
    pub const MAX_TODO_DESCRIPTION_LENGTH: usize = 100;
    pub const MAX_USER_NAME_LENGTH: usize = 50;
    pub const DEFAULT_PAGE_SIZE: u32 = 25;
    pub const MAX_PAGE_SIZE: u32 = 100;
}

/// Entity names declared in the schema
pub mod entities {
    pub const TODO: &str = "Todo";
    pub const USER: &str = "User";
}
