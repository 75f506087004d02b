use tracing::debug;
use tree_sitter::{Parser, Tree};

use crate::error::BumpError;

/// Parses Rust source text into a Tree-Sitter tree.
///
/// A tree containing error nodes is treated the same as a failed parse:
/// the locator refuses to search a malformed unit rather than attempt
/// partial recovery.
pub fn parse_source(source: &str) -> Result<Tree, BumpError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_rust::LANGUAGE.into())
        .expect("failed to set Tree-Sitter language");
    let tree = parser.parse(source, None).ok_or(BumpError::Syntax)?;
    if tree.root_node().has_error() {
        debug!("parse tree contains errors, refusing to search it");
        return Err(BumpError::Syntax);
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_source() {
        let tree = parse_source("fn main() {}").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn test_parse_malformed_source() {
        assert_eq!(parse_source("fn main( {").unwrap_err(), BumpError::Syntax);
    }
}
