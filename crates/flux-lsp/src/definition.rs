//! Go-to-definition from an action type string to its handler.
//!
//! Resolves the enclosing dispatch call's `type` string against the
//! catalog and links to the reducer/effect declaration inside the model
//! file.

use tower_lsp::lsp_types::{LocationLink, Position, Url};

use flux_analysis::dispatch::action_literals;
use flux_analysis::models::ModelService;
use flux_analysis::node_path::node_path;
use flux_analysis::Program;
use flux_parser::ast::expr::{Expr, ObjectProp};
use flux_parser::ast::strip_quotes;
use flux_parser::ast::AstNode;
use flux_common::span::Span;

use crate::analysis::{analyze_document, position_to_offset, span_to_range};

/// Find the handler declaration for the dispatch call at `position`.
pub fn find_definition(
    source: &str,
    position: &Position,
    service: &ModelService,
    program: &Program,
) -> Option<Vec<LocationLink>> {
    let offset = position_to_offset(source, position)?;
    let analysis = analyze_document(source);
    let path = node_path(&analysis.parse.syntax(), offset as u32);

    let literals = action_literals(&path)?;
    let action = literals.first()?;

    let type_prop = action.prop("type")?;
    let ObjectProp::Assign(assign) = type_prop else {
        return None;
    };
    let Some(Expr::Literal(literal)) = assign.initializer() else {
        return None;
    };
    if !literal.is_string() {
        return None;
    }

    let text = literal.text();
    let wanted = strip_quotes(&text);
    let catalog = service.catalog();
    let schema = catalog
        .actions
        .iter()
        .find(|schema| strip_quotes(&schema.name) == wanted)?;

    // Resolve the declaring unit the same way extraction chose it:
    // overlay-preferred by logical identity.
    let unit = program.file_by_logical(&schema.file)?;
    let target_range = span_to_range(&unit.text, schema.decl_span);

    let origin_range = literal.syntax().text_range();
    let origin = span_to_range(
        source,
        Span::new(origin_range.start().into(), origin_range.end().into()),
    );

    Some(vec![LocationLink {
        origin_selection_range: Some(origin),
        target_uri: Url::from_file_path(&schema.file).ok()?,
        target_range,
        target_selection_range: target_range,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_analysis::vfs::MemoryVfs;
    use flux_analysis::{ProgramHost, WorkspaceConfig};
    use std::path::PathBuf;
    use std::sync::Arc;

    const MODEL: &str = r#"export default {
  namespace: 'app',
  reducers: {
    add(state, { payload }: { payload: { id: number } }) {
      return state;
    },
  },
};
"#;

    fn workspace() -> (ProgramHost, Arc<ModelService>) {
        let vfs = MemoryVfs::new();
        vfs.insert("/ws/src/models/app.ts", MODEL);
        let config = WorkspaceConfig {
            src_root: PathBuf::from("/ws/src"),
            ..WorkspaceConfig::default()
        };
        let mut host = ProgramHost::new(config, Box::new(vfs.clone()));
        host.add_files(&[PathBuf::from("/ws/src/models/app.ts")]);
        let service = ModelService::new(&mut host);
        (host, service)
    }

    #[test]
    fn resolves_action_type_to_handler_declaration() {
        let (host, service) = workspace();
        let source = "dispatch({ type: 'app/add' });";
        let cursor = source.find("app/add").unwrap() as u32;

        let links = find_definition(
            source,
            &Position::new(0, cursor),
            &service,
            &host.program(),
        )
        .expect("definition");
        assert_eq!(links.len(), 1);

        let link = &links[0];
        assert_eq!(
            link.target_uri,
            Url::from_file_path("/ws/src/models/app.ts").unwrap()
        );
        // The target range covers the `add` handler inside the model.
        let target_line = link.target_range.start.line as usize;
        let line = MODEL.lines().nth(target_line).unwrap();
        assert!(line.contains("add"), "line: {line}");
    }

    #[test]
    fn unknown_action_type_has_no_definition() {
        let (host, service) = workspace();
        let source = "dispatch({ type: 'app/nope' });";
        let cursor = source.find("app/nope").unwrap() as u32;
        assert!(find_definition(
            source,
            &Position::new(0, cursor),
            &service,
            &host.program()
        )
        .is_none());
    }

    #[test]
    fn outside_dispatch_has_no_definition() {
        let (host, service) = workspace();
        let source = "const x = 'app/add';";
        assert!(find_definition(
            source,
            &Position::new(0, 12),
            &service,
            &host.program()
        )
        .is_none());
    }
}
