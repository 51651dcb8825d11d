/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The compilation unit, functions and the statement/expression sums
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
/// - types: Definitions for the type model shared by every later stage
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
