//! Completion inside dispatch calls.
//!
//! Two cases only:
//!
//! 1. The cursor is inside the action object itself (one object literal
//!    between the call and the cursor): offer `type` -- with a snippet
//!    choice list drawn from the catalog -- and `payload`.
//! 2. The cursor is inside a nested payload object with a resolvable action
//!    type: offer every property of the expected payload type at that
//!    nesting depth, annotated with its rendered type.
//!
//! Anywhere else, no items: completion outside a dispatch call is someone
//! else's business.

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, InsertTextFormat, Position,
};

use flux_analysis::dispatch::action_literals;
use flux_analysis::models::{CatalogSnapshot, ModelService};
use flux_analysis::node_path::node_path;
use flux_parser::ast::expr::{Expr, ObjectLiteral, ObjectProp};
use flux_parser::ast::strip_quotes;
use flux_parser::ast::AstNode;
use flux_types::Ty;

use crate::analysis::{analyze_document, position_to_offset};

/// Compute completion items at the given position.
pub fn compute_completions(
    source: &str,
    position: &Position,
    service: &ModelService,
) -> Vec<CompletionItem> {
    let Some(offset) = position_to_offset(source, position) else {
        return Vec::new();
    };
    // Probe one character left of the cursor so the character just typed
    // resolves into its own node.
    let probe = offset.saturating_sub(1) as u32;

    let analysis = analyze_document(source);
    let path = node_path(&analysis.parse.syntax(), probe);
    let Some(literals) = action_literals(&path) else {
        return Vec::new();
    };
    // Inside the call but before `{` is typed: nothing to offer yet.
    if literals.is_empty() {
        return Vec::new();
    }

    let catalog = service.catalog();
    if literals.len() == 1 {
        action_key_completions(&catalog)
    } else {
        payload_completions(&literals, &catalog)
    }
}

/// Case 1: `type` and `payload` keys for the action object.
fn action_key_completions(catalog: &CatalogSnapshot) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    let mut type_item = CompletionItem {
        label: "type".to_string(),
        kind: Some(CompletionItemKind::PROPERTY),
        preselect: Some(true),
        detail: Some("(property) type: string".to_string()),
        filter_text: Some("type: ".to_string()),
        insert_text: Some("type: ".to_string()),
        ..Default::default()
    };
    if !catalog.actions.is_empty() {
        // Snippet choice list over every known action name.
        let choices: Vec<String> = catalog
            .actions
            .iter()
            .map(|action| format!("'{}'", strip_quotes(&action.name)))
            .collect();
        type_item.insert_text = Some(format!("type: ${{1|{}|}},$0", choices.join(",")));
        type_item.insert_text_format = Some(InsertTextFormat::SNIPPET);
    }
    items.push(type_item);

    items.push(CompletionItem {
        label: "payload".to_string(),
        kind: Some(CompletionItemKind::PROPERTY),
        preselect: Some(true),
        detail: Some("(property) payload: object".to_string()),
        filter_text: Some("payload: ".to_string()),
        insert_text: Some("payload: ".to_string()),
        ..Default::default()
    });

    items
}

/// Case 2: properties of the expected payload type at the cursor's
/// nesting depth.
fn payload_completions(
    literals: &[ObjectLiteral],
    catalog: &CatalogSnapshot,
) -> Vec<CompletionItem> {
    let Some(payload_ty) = resolve_payload_type(literals, catalog) else {
        return Vec::new();
    };

    // Walk from the payload object down to the literal the user is typing
    // in, following the property that encloses the innermost literal at
    // each level.
    let innermost = match literals.last() {
        Some(literal) => literal,
        None => return Vec::new(),
    };
    let inner_range = innermost.syntax().text_range();

    let mut current = payload_ty;
    for level in &literals[1..literals.len() - 1] {
        let Some(key) = level
            .properties()
            .find(|prop| prop.syntax().text_range().contains_range(inner_range))
            .and_then(|prop| prop.name_text())
        else {
            return Vec::new();
        };
        let Some(next_ty) = current
            .as_object()
            .and_then(|obj| obj.prop(strip_quotes(&key)))
            .map(|prop| prop.ty.clone())
        else {
            return Vec::new();
        };
        current = next_ty;
    }

    let Some(shape) = current.as_object() else {
        return Vec::new();
    };

    shape
        .props
        .iter()
        .map(|prop| CompletionItem {
            label: prop.name.clone(),
            kind: Some(CompletionItemKind::PROPERTY),
            preselect: Some(true),
            detail: Some(format!("(property) {}: {}", prop.name, prop.ty)),
            filter_text: Some(format!("{}: ", prop.name)),
            insert_text: Some(format!("{}: ", prop.name)),
            ..Default::default()
        })
        .collect()
}

/// Resolve the payload type of the action the user is dispatching, from the
/// `type` property of the action object.
fn resolve_payload_type(
    literals: &[ObjectLiteral],
    catalog: &CatalogSnapshot,
) -> Option<Ty> {
    let action = literals.first()?;
    let type_prop = action.prop("type")?;
    let ObjectProp::Assign(assign) = type_prop else {
        return None;
    };
    let initializer = assign.initializer()?;
    let Expr::Literal(literal) = initializer else {
        return None;
    };
    if !literal.is_string() {
        return None;
    }
    let text = literal.text();
    let wanted = strip_quotes(&text);
    let schema = catalog
        .actions
        .iter()
        .find(|schema| strip_quotes(&schema.name) == wanted)?;
    schema.payload.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_analysis::vfs::MemoryVfs;
    use flux_analysis::{ProgramHost, WorkspaceConfig};
    use std::path::PathBuf;
    use std::sync::Arc;

    const MODEL: &str = r#"
export default {
  namespace: 'app',
  reducers: {
    add(state, { payload }: { payload: { id: number; user: { name: string } } }) {
      return state;
    },
  },
};
"#;

    fn service() -> Arc<ModelService> {
        let vfs = MemoryVfs::new();
        vfs.insert("/ws/src/models/app.ts", MODEL);
        let config = WorkspaceConfig {
            src_root: PathBuf::from("/ws/src"),
            ..WorkspaceConfig::default()
        };
        let mut host = ProgramHost::new(config, Box::new(vfs.clone()));
        host.add_files(&[PathBuf::from("/ws/src/models/app.ts")]);
        ModelService::new(&mut host)
    }

    fn completions_at(source: &str, line: u32, character: u32) -> Vec<CompletionItem> {
        compute_completions(source, &Position::new(line, character), &service())
    }

    #[test]
    fn no_completions_outside_dispatch() {
        let source = "other({ })";
        let items = completions_at(source, 0, 8);
        assert!(items.is_empty());
    }

    #[test]
    fn no_completions_before_action_object_typed() {
        // Inside the parens, but no `{` yet.
        let source = "dispatch()";
        let items = completions_at(source, 0, 9);
        assert!(items.is_empty());
    }

    #[test]
    fn action_object_offers_type_and_payload() {
        let source = "dispatch({  })";
        let items = completions_at(source, 0, 11);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["type", "payload"]);

        // The type item carries a snippet choice list of catalog names.
        let type_item = &items[0];
        assert_eq!(type_item.insert_text_format, Some(InsertTextFormat::SNIPPET));
        let insert = type_item.insert_text.as_deref().unwrap();
        assert!(insert.contains("'app/add'"), "got: {insert}");
    }

    #[test]
    fn payload_object_offers_expected_properties() {
        let source = "dispatch({ type: 'app/add', payload: {  } })";
        let cursor = source.rfind('}').unwrap() as u32 - 3;
        let items = completions_at(source, 0, cursor);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["id", "user"]);
        assert_eq!(
            items[0].detail.as_deref(),
            Some("(property) id: number")
        );
    }

    #[test]
    fn nested_payload_object_offers_nested_properties() {
        let source = "dispatch({ type: 'app/add', payload: { user: {  } } })";
        let offset = source.find("{  }").unwrap() as u32 + 2;
        let items = completions_at(source, 0, offset);
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["name"]);
        assert_eq!(
            items[0].detail.as_deref(),
            Some("(property) name: string")
        );
    }

    #[test]
    fn unresolvable_action_type_offers_nothing_in_payload() {
        let source = "dispatch({ type: 'nope/missing', payload: {  } })";
        let cursor = source.rfind('}').unwrap() as u32 - 3;
        let items = completions_at(source, 0, cursor);
        assert!(items.is_empty());
    }
}
