//! Model discovery and the action catalog.
//!
//! A model is a default-exported object literal with `namespace`, `state`,
//! `reducers`, and `effects` properties. The catalog is the flattened list
//! of action schemas inferred from every model's handlers. It is rebuilt
//! wholesale on any models-directory change and swapped atomically, so
//! readers never observe a half-built catalog.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use rustc_hash::FxHashMap;

use flux_common::span::Span;
use flux_parser::ast::expr::{Expr, ObjectLiteral, ObjectProp};
use flux_parser::ast::item::Param;
use flux_parser::ast::strip_quotes;
use flux_parser::ast::AstNode;
use flux_types::semantics::node_span;
use flux_types::{FileSemantics, Ty};

use crate::config::WorkspaceConfig;
use crate::host::{Program, ProgramHost, SourceUnit};
use crate::overlay;

/// Whether an action schema came from a reducer or an effect handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Reducer,
    Effect,
}

/// The inferred contract of one reducer/effect handler.
#[derive(Debug, Clone)]
pub struct ActionSchema {
    /// JSON-quoted action name, `"<namespace>/<handler>"`. Quoting matches
    /// how literal string tokens appear in source, so later comparisons are
    /// plain quote-stripped text equality.
    pub name: String,
    /// The `payload` facet of the handler's action parameter type. `None`
    /// when the handler takes no payload.
    pub payload: Option<Ty>,
    /// Whether dispatch calls must supply a payload.
    pub required: bool,
    /// Span of the handler declaration (for go-to-definition).
    pub decl_span: Span,
    /// Real path of the owning model file.
    pub file: PathBuf,
    pub kind: HandlerKind,
}

/// One extracted model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Namespace with quotes stripped.
    pub namespace: String,
    pub reducers: Vec<ActionSchema>,
    pub effects: Vec<ActionSchema>,
    /// Real path of the model file.
    pub file: PathBuf,
}

/// An immutable catalog snapshot: all models plus the flattened schema
/// list, in file-then-declaration order.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub models: Vec<ModelInfo>,
    pub actions: Vec<ActionSchema>,
}

/// Builds and owns the action catalog.
///
/// On construction it discovers model files, registers them as host roots,
/// extracts once, and subscribes to host file changes: any non-overlay
/// change under the models directory triggers a full re-extraction.
/// Overlay-marker paths are excluded to avoid re-extraction churn on every
/// keystroke; the catalog follows saved model content.
pub struct ModelService {
    state: Mutex<Arc<CatalogSnapshot>>,
    config: WorkspaceConfig,
}

impl ModelService {
    /// Create the service, wire it to the host, and run the initial
    /// extraction.
    pub fn new(host: &mut ProgramHost) -> Arc<ModelService> {
        let config = host.config().clone();

        let model_paths = discover_model_files(&config.src_root, &config);
        if !model_paths.is_empty() {
            host.add_files(&model_paths);
        }

        let service = Arc::new(ModelService {
            state: Mutex::new(Arc::new(CatalogSnapshot::default())),
            config,
        });

        let weak: Weak<ModelService> = Arc::downgrade(&service);
        host.subscribe_file_change(Box::new(move |event, program| {
            let Some(service) = weak.upgrade() else { return };
            if overlay::is_overlay_file_name(&event.path) {
                return;
            }
            if !service.config.is_model_path(&event.path) {
                return;
            }
            service.extract(program);
        }));

        let program = host.program();
        service.extract(&program);
        service
    }

    /// The current catalog snapshot.
    pub fn catalog(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.state.lock().unwrap())
    }

    /// The extracted models.
    pub fn models(&self) -> Vec<ModelInfo> {
        self.catalog().models.clone()
    }

    /// The flattened action schemas.
    pub fn actions(&self) -> Vec<ActionSchema> {
        self.catalog().actions.clone()
    }

    /// Rebuild the catalog wholesale from a program snapshot and swap it in.
    pub fn extract(&self, program: &Program) {
        // Group candidate units by real path, preferring the overlay
        // version so both compiled units never yield duplicate schemas.
        let mut chosen: FxHashMap<PathBuf, Arc<SourceUnit>> = FxHashMap::default();
        for unit in program.files() {
            if !self.config.is_model_path(&unit.path) {
                continue;
            }
            let real = unit.real_path();
            let is_overlay = overlay::is_overlay_file_name(&unit.path);
            let replace = match chosen.get(&real) {
                Some(existing) => {
                    is_overlay && !overlay::is_overlay_file_name(&existing.path)
                }
                None => true,
            };
            if replace {
                chosen.insert(real, Arc::clone(unit));
            }
        }

        let mut paths: Vec<PathBuf> = chosen.keys().cloned().collect();
        paths.sort();

        let mut models = Vec::new();
        for path in paths {
            if let Some(model) = extract_model(&chosen[&path]) {
                models.push(model);
            }
        }

        let mut actions = Vec::new();
        for model in &models {
            actions.extend(model.reducers.iter().cloned());
            actions.extend(model.effects.iter().cloned());
        }

        let snapshot = Arc::new(CatalogSnapshot { models, actions });
        *self.state.lock().unwrap() = snapshot;
    }
}

/// Recursively discover model files under the source root.
///
/// Returns absolute paths, sorted for determinism. Hidden directories are
/// skipped. A missing source root yields an empty list (the host simply has
/// no models yet).
pub fn discover_model_files(src_root: &Path, config: &WorkspaceConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    discover_recursive(src_root, config, &mut files);
    files.sort();
    files
}

fn discover_recursive(dir: &Path, config: &WorkspaceConfig, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            discover_recursive(&path, config, files);
        } else if config.is_source_file(&path) && config.is_model_path(&path) {
            files.push(path);
        }
    }
}

/// Extract one model from a compiled unit.
///
/// Files without a default-exported object literal are silently skipped:
/// absence of a proper model is not an error worth surfacing.
fn extract_model(unit: &SourceUnit) -> Option<ModelInfo> {
    let file = unit.parse.tree();
    let assign = file.export_assign()?;
    let obj = match assign.expr()? {
        Expr::ObjectLiteral(obj) => obj,
        _ => return None,
    };

    let namespace = obj
        .prop("namespace")
        .and_then(|prop| match prop {
            ObjectProp::Assign(assign) => assign.initializer(),
            _ => None,
        })
        .and_then(|init| match init {
            Expr::Literal(lit) if lit.is_string() => {
                Some(strip_quotes(&lit.text()).to_string())
            }
            _ => None,
        })
        .unwrap_or_default();

    let real = overlay::to_real_file_name(&unit.path);
    let reducers = extract_handlers(
        &obj,
        "reducers",
        1,
        &namespace,
        &unit.semantics,
        &real,
        HandlerKind::Reducer,
    );
    let effects = extract_handlers(
        &obj,
        "effects",
        0,
        &namespace,
        &unit.semantics,
        &real,
        HandlerKind::Effect,
    );

    Some(ModelInfo {
        namespace,
        reducers,
        effects,
        file: real,
    })
}

/// Extract the handlers of a `reducers`/`effects` sub-object.
///
/// Reducers receive the action as their SECOND parameter, effects as their
/// FIRST; `param_index` selects accordingly.
fn extract_handlers(
    model: &ObjectLiteral,
    key: &str,
    param_index: usize,
    namespace: &str,
    semantics: &FileSemantics,
    file: &Path,
    kind: HandlerKind,
) -> Vec<ActionSchema> {
    let Some(ObjectProp::Assign(prop)) = model.prop(key) else {
        return Vec::new();
    };
    let Some(Expr::ObjectLiteral(handlers)) = prop.initializer() else {
        return Vec::new();
    };

    let mut schemas = Vec::new();
    for handler in handlers.properties() {
        let (name, param, decl_span) = match &handler {
            ObjectProp::Method(method) => {
                let Some(name) = method.name() else { continue };
                let param = method
                    .param_list()
                    .and_then(|list| list.param(param_index));
                (name.text(), param, node_span(method.syntax()))
            }
            ObjectProp::Assign(assign) => {
                let Some(name) = assign.name() else { continue };
                let param = match assign.initializer() {
                    Some(Expr::ArrowFn(arrow)) => {
                        arrow.param_list().and_then(|list| list.param(param_index))
                    }
                    Some(Expr::FunctionExpr(func)) => {
                        func.param_list().and_then(|list| list.param(param_index))
                    }
                    _ => continue,
                };
                (name.text(), param, node_span(assign.syntax()))
            }
            _ => continue,
        };

        let handler_name = strip_quotes(&name).to_string();
        let action_name = format!("{}/{}", namespace, handler_name);
        let quoted = serde_json::to_string(&action_name)
            .unwrap_or_else(|_| format!("\"{}\"", action_name));

        let (payload, required) = payload_facet(param.as_ref(), semantics);

        schemas.push(ActionSchema {
            name: quoted,
            payload,
            required,
            decl_span,
            file: file.to_path_buf(),
            kind,
        });
    }
    schemas
}

/// Derive the payload facet and required flag from a handler's action
/// parameter.
///
/// - no parameter: no payload facet
/// - `any` (or unannotated) parameter: payload `any`, never required
/// - object-typed parameter: the `payload` property's type; required unless
///   the parameter is optional/defaulted or the property itself is optional
/// - anything else: no payload facet
fn payload_facet(param: Option<&Param>, semantics: &FileSemantics) -> (Option<Ty>, bool) {
    let Some(param) = param else {
        return (None, false);
    };
    let action_ty = param
        .annotation()
        .and_then(|annotation| annotation.ty())
        .map(|ty| semantics.lower(&ty))
        .unwrap_or(Ty::Any);

    match action_ty {
        Ty::Any => (Some(Ty::Any), false),
        Ty::Object(obj) => match obj.prop("payload") {
            Some(prop) => {
                let required =
                    !param.is_optional() && !param.has_default() && !prop.optional;
                (Some(prop.ty.clone()), required)
            }
            None => (None, false),
        },
        _ => (None, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ProgramHost;
    use crate::vfs::MemoryVfs;

    const MODEL: &str = r#"
export default {
  namespace: 'app',
  state: {},
  reducers: {
    add(state, { payload }: { payload: { id: number } }) {
      return state;
    },
    reset(state) {
      return state;
    },
  },
  effects: {
    *save({ payload }: { payload: { id: number; draft?: boolean } }, { call, put }) {
      yield put({ type: 'add', payload });
    },
  },
};
"#;

    fn service_with_models(files: &[(&str, &str)]) -> (ProgramHost, Arc<ModelService>) {
        let vfs = MemoryVfs::new();
        for (path, text) in files {
            vfs.insert(*path, *text);
        }
        let config = WorkspaceConfig {
            src_root: PathBuf::from("/ws/src"),
            ..WorkspaceConfig::default()
        };
        let mut host = ProgramHost::new(config, Box::new(vfs.clone()));
        host.add_files(
            &files
                .iter()
                .map(|(p, _)| PathBuf::from(*p))
                .collect::<Vec<_>>(),
        );
        let service = ModelService::new(&mut host);
        (host, service)
    }

    #[test]
    fn extracts_model_namespace_and_schemas() {
        let (_host, service) = service_with_models(&[("/ws/src/models/app.ts", MODEL)]);
        let catalog = service.catalog();

        assert_eq!(catalog.models.len(), 1);
        let model = &catalog.models[0];
        assert_eq!(model.namespace, "app");
        assert_eq!(model.reducers.len(), 2);
        assert_eq!(model.effects.len(), 1);

        let names: Vec<&str> = catalog.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["\"app/add\"", "\"app/reset\"", "\"app/save\""]);
    }

    #[test]
    fn reducer_payload_from_second_parameter() {
        let (_host, service) = service_with_models(&[("/ws/src/models/app.ts", MODEL)]);
        let catalog = service.catalog();
        let add = catalog
            .actions
            .iter()
            .find(|a| a.name == "\"app/add\"")
            .expect("app/add");
        assert!(add.required);
        assert_eq!(
            add.payload.as_ref().map(|t| t.to_string()).as_deref(),
            Some("{id: number}")
        );
        assert_eq!(add.kind, HandlerKind::Reducer);
    }

    #[test]
    fn handler_without_action_param_has_no_payload_facet() {
        let (_host, service) = service_with_models(&[("/ws/src/models/app.ts", MODEL)]);
        let catalog = service.catalog();
        let reset = catalog
            .actions
            .iter()
            .find(|a| a.name == "\"app/reset\"")
            .expect("app/reset");
        assert!(reset.payload.is_none());
        assert!(!reset.required);
    }

    #[test]
    fn effect_payload_from_first_parameter() {
        let (_host, service) = service_with_models(&[("/ws/src/models/app.ts", MODEL)]);
        let catalog = service.catalog();
        let save = catalog
            .actions
            .iter()
            .find(|a| a.name == "\"app/save\"")
            .expect("app/save");
        assert_eq!(save.kind, HandlerKind::Effect);
        assert_eq!(
            save.payload.as_ref().map(|t| t.to_string()).as_deref(),
            Some("{id: number, draft?: boolean}")
        );
    }

    #[test]
    fn non_model_files_are_skipped() {
        let (_host, service) = service_with_models(&[
            ("/ws/src/models/app.ts", MODEL),
            ("/ws/src/models/helpers.ts", "export const helper = () => 1;"),
            ("/ws/src/models/weird.ts", "export default 42;"),
        ]);
        let catalog = service.catalog();
        assert_eq!(catalog.models.len(), 1);
    }

    #[test]
    fn catalog_rebuilds_on_model_file_change() {
        let vfs = MemoryVfs::new();
        vfs.insert("/ws/src/models/app.ts", MODEL);
        let config = WorkspaceConfig {
            src_root: PathBuf::from("/ws/src"),
            ..WorkspaceConfig::default()
        };
        let mut host = ProgramHost::new(config, Box::new(vfs.clone()));
        host.add_files(&[PathBuf::from("/ws/src/models/app.ts")]);
        let service = ModelService::new(&mut host);
        assert_eq!(service.catalog().actions.len(), 3);

        // A saved change to the model file triggers re-extraction.
        vfs.insert(
            "/ws/src/models/app.ts",
            "export default { namespace: 'app', reducers: { only(state) {} } };",
        );
        host.handle_fs_event(
            crate::host::FsEventKind::Modified,
            PathBuf::from("/ws/src/models/app.ts"),
        );

        let catalog = service.catalog();
        assert_eq!(catalog.actions.len(), 1);
        assert_eq!(catalog.actions[0].name, "\"app/only\"");
    }

    #[test]
    fn overlay_changes_do_not_rebuild_catalog() {
        let (mut host, service) =
            service_with_models(&[("/ws/src/models/app.ts", MODEL)]);
        assert_eq!(service.catalog().actions.len(), 3);

        // Keystroke-level overlay churn leaves the catalog untouched.
        host.update_overlay(
            Path::new("/ws/src/models/app.ts"),
            "export default { namespace: 'app', reducers: {} };",
        );
        assert_eq!(service.catalog().actions.len(), 3);
    }

    #[test]
    fn arrow_function_handlers_are_extracted() {
        let source = r#"
export default {
  namespace: 'ui',
  reducers: {
    toggle: (state, action: { payload: boolean }) => state,
  },
};
"#;
        let (_host, service) = service_with_models(&[("/ws/src/models/ui.ts", source)]);
        let catalog = service.catalog();
        assert_eq!(catalog.actions.len(), 1);
        let toggle = &catalog.actions[0];
        assert_eq!(toggle.name, "\"ui/toggle\"");
        assert_eq!(
            toggle.payload.as_ref().map(|t| t.to_string()).as_deref(),
            Some("boolean")
        );
        assert!(toggle.required);
    }

    #[test]
    fn optional_payload_property_clears_required() {
        let source = r#"
export default {
  namespace: 'app',
  reducers: {
    save(state, action: { payload?: { id: number } }) {},
  },
};
"#;
        let (_host, service) = service_with_models(&[("/ws/src/models/app.ts", source)]);
        let catalog = service.catalog();
        let save = &catalog.actions[0];
        assert!(save.payload.is_some());
        assert!(!save.required);
    }

    #[test]
    fn unannotated_param_is_any_and_optional() {
        let source = r#"
export default {
  namespace: 'app',
  reducers: {
    add(state, action) {},
  },
};
"#;
        let (_host, service) = service_with_models(&[("/ws/src/models/app.ts", source)]);
        let catalog = service.catalog();
        let add = &catalog.actions[0];
        assert_eq!(add.payload, Some(Ty::Any));
        assert!(!add.required);
    }

    #[test]
    fn models_across_files_are_sorted_by_path() {
        let other = "export default { namespace: 'b', reducers: { go(state) {} } };";
        let first = "export default { namespace: 'a', reducers: { go(state) {} } };";
        let (_host, service) = service_with_models(&[
            ("/ws/src/models/b.ts", other),
            ("/ws/src/models/a.ts", first),
        ]);
        let catalog = service.catalog();
        let names: Vec<&str> = catalog.actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["\"a/go\"", "\"b/go\""]);
    }
}
