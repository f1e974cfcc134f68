//! Signature help inside dispatch calls.
//!
//! Active only while the cursor sits within the dispatch call's sole
//! argument. Synthesizes a pseudo call signature
//! `dispatch({ type: <resolved-or-placeholder>; <payload fields> }): any`
//! with one parameter entry per payload field, the active one tracked by
//! how many properties the user has already typed.

use tower_lsp::lsp_types::{
    ParameterInformation, ParameterLabel, Position, SignatureHelp, SignatureInformation,
};

use flux_analysis::dispatch::{action_literals, is_dispatch_call};
use flux_analysis::models::{ActionSchema, ModelService};
use flux_analysis::node_path::node_path;
use flux_parser::ast::expr::{CallExpr, Expr, ObjectLiteral, ObjectProp};
use flux_parser::ast::strip_quotes;
use flux_parser::ast::AstNode;
use flux_types::Ty;
use rowan::TextSize;

use crate::analysis::{analyze_document, position_to_offset};

/// Compute signature help at the given position.
pub fn compute_signature_help(
    source: &str,
    position: &Position,
    service: &ModelService,
) -> Option<SignatureHelp> {
    let offset = position_to_offset(source, position)?;
    let analysis = analyze_document(source);
    let root = analysis.parse.syntax();
    let path = node_path(&root, offset as u32);

    // Innermost enclosing dispatch call.
    let call_index = path.iter().rposition(is_dispatch_call)?;
    let call = CallExpr::cast(path[call_index].clone())?;

    // Only active while the cursor is within the argument parentheses.
    let arg_list = call.arg_list()?;
    let arg_range = arg_list.syntax().text_range();
    let cursor = TextSize::from(offset as u32);
    if cursor <= arg_range.start() || cursor >= arg_range.end() {
        return None;
    }

    let literals = action_literals(&path).unwrap_or_default();
    let catalog = service.catalog();
    let schema = literals
        .first()
        .and_then(|action| resolve_schema(action, &catalog.actions));

    let (label, parameters) = match schema {
        Some(schema) => {
            let name = strip_quotes(&schema.name).to_string();
            let payload_fields = payload_parameters(schema.payload.as_ref());
            let payload_text = schema
                .payload
                .as_ref()
                .map(|ty| ty.to_string())
                .unwrap_or_else(|| "none".to_string());
            (
                format!(
                    "dispatch({{ type: '{}'; payload: {} }}): any",
                    name, payload_text
                ),
                payload_fields,
            )
        }
        None => (
            "dispatch({ type: string; payload?: object }): any".to_string(),
            Vec::new(),
        ),
    };

    // Active parameter: number of payload properties already typed before
    // the cursor, when the user is inside the payload object.
    let active_parameter = literals
        .get(1)
        .map(|payload| typed_properties_before(payload, cursor))
        .unwrap_or(0);

    Some(SignatureHelp {
        signatures: vec![SignatureInformation {
            label,
            documentation: None,
            parameters: Some(parameters),
            active_parameter: None,
        }],
        active_signature: Some(0),
        active_parameter: Some(active_parameter),
    })
}

fn resolve_schema<'a>(
    action: &ObjectLiteral,
    actions: &'a [ActionSchema],
) -> Option<&'a ActionSchema> {
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
    let wanted = strip_quotes(&text).to_string();
    actions
        .iter()
        .find(|schema| strip_quotes(&schema.name) == wanted)
}

fn payload_parameters(payload: Option<&Ty>) -> Vec<ParameterInformation> {
    let Some(Ty::Object(shape)) = payload else {
        return Vec::new();
    };
    shape
        .props
        .iter()
        .map(|prop| ParameterInformation {
            label: ParameterLabel::Simple(format!("{}: {}", prop.name, prop.ty)),
            documentation: None,
        })
        .collect()
}

fn typed_properties_before(payload: &ObjectLiteral, cursor: TextSize) -> u32 {
    payload
        .properties()
        .filter(|prop| prop.syntax().text_range().end() <= cursor)
        .count() as u32
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
    add(state, { payload }: { payload: { id: number; label: string } }) {
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

    fn help_at(source: &str, character: u32) -> Option<SignatureHelp> {
        compute_signature_help(source, &Position::new(0, character), &service())
    }

    #[test]
    fn resolved_action_signature() {
        let source = "dispatch({ type: 'app/add', payload: {  } })";
        let cursor = source.find("payload").unwrap() as u32;
        let help = help_at(source, cursor).expect("signature help");
        let signature = &help.signatures[0];
        assert_eq!(
            signature.label,
            "dispatch({ type: 'app/add'; payload: {id: number, label: string} }): any"
        );
        let params = signature.parameters.as_ref().unwrap();
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn placeholder_signature_without_resolvable_type() {
        let source = "dispatch({  })";
        let help = help_at(source, 11).expect("signature help");
        assert_eq!(
            help.signatures[0].label,
            "dispatch({ type: string; payload?: object }): any"
        );
    }

    #[test]
    fn inactive_outside_argument() {
        let source = "dispatch({ type: 'app/add' });";
        assert!(help_at(source, 1).is_none());
        // Past the closing paren.
        assert!(help_at(source, source.len() as u32).is_none());
    }

    #[test]
    fn active_parameter_advances_past_typed_properties() {
        let source = "dispatch({ type: 'app/add', payload: { id: 1,  } })";
        // Cursor after `id: 1,` inside the payload object.
        let cursor = source.find("1,").unwrap() as u32 + 2;
        let help = help_at(source, cursor).expect("signature help");
        assert_eq!(help.active_parameter, Some(1));
    }
}
