//! The `@...@` directive template language.
//!
//! Evaluation happens in three steps:
//!
//! 1. [`scanner::split_template`] cuts the `@{group@` and `@{entry@` regions
//!    out of the template, leaving `@#group@` / `@#entry@` loop tokens.
//! 2. [`evaluator::Evaluator`] walks the directive tokens of the top level,
//!    maintaining a tri-state [`condition::ConditionStack`].
//! 3. Loop tokens re-enter the evaluator on the extracted bodies, once per
//!    group or entry, each time in a child [`context::RenderContext`].
//!
//! Variable references and conditional expressions are resolved by
//! [`resolver::VariableResolver`].

pub mod condition;
pub mod context;
pub mod evaluator;
pub mod resolver;
pub mod scanner;

pub use context::{Globals, RenderContext};
pub use evaluator::Evaluator;
pub use scanner::{split_template, SubTemplates};
