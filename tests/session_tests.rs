//! Interactive sessions and document imports against real files.

use std::fs;

use iimport::{
    import::{default_alias, Resolver},
    Dispatch, ErrorKind, Host, Importer, Module, Session, Settings,
};

#[derive(Default)]
struct Namespace {
    modules: Vec<(String, Module)>,
}

impl Host for Namespace {
    fn bind(&mut self, alias: &str, module: Module) {
        self.modules.push((alias.to_string(), module));
    }
}

const LIBRARY: &str = "\
# %%
import math
# %%
%def hyp(a, b) -> c
%def sq(x) -> y
y = x * x
%end
c = math.sqrt(sq(a) + sq(b))
%end
# %%
%- print(hyp(3, 4))
";

fn settings_for(dir: &std::path::Path) -> Settings {
    let mut settings = Settings::default();
    settings.import.search_paths = vec![dir.to_path_buf()];
    settings
}

#[test]
fn import_resolves_dashed_file_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("geometry-utils.py"), LIBRARY).unwrap();

    let importer = Importer::from_settings(&settings_for(dir.path())).unwrap();
    let module = importer.import("geometry_utils", None).unwrap();
    assert_eq!(module.alias, "geometry_utils");
    assert_eq!(module.procedure_names(), vec!["sq", "hyp"]);
    assert!(module.text.contains("import math"));
    assert!(!module.text.contains("print(hyp(3, 4))"));
}

#[test]
fn missing_import_lists_every_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(vec![dir.path().to_path_buf()], "py");
    let err = resolver.resolve("pkg.nowhere_to_be_found").unwrap_err();
    let ErrorKind::DocumentNotFound { name, searched } = err.kind() else {
        panic!("expected DocumentNotFound");
    };
    assert_eq!(name, "pkg.nowhere_to_be_found");
    assert!(searched[0].ends_with("nowhere_to_be_found.py"));
    assert!(searched[1].ends_with("nowhere-to-be-found.py"));
    assert!(searched[2].ends_with("nowhere to be found.py"));
}

#[test]
fn broken_document_fails_the_import() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.py"), "%def f() -> x\nx = 1\n").unwrap();
    let importer = Importer::from_settings(&settings_for(dir.path())).unwrap();
    let err = importer.import("broken", None).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnterminatedDefinition { .. }));
}

#[test]
fn session_commands_bind_into_the_host() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("geometry.py"), LIBRARY).unwrap();
    let mut session = Session::new(&settings_for(dir.path())).unwrap();
    let mut ns = Namespace::default();

    assert_eq!(
        session.dispatch("x = 1", &mut ns).unwrap(),
        Dispatch::NotACommand
    );
    let done = session.dispatch("%iimport geometry as geo", &mut ns).unwrap();
    assert_eq!(
        done,
        Dispatch::Imported {
            alias: "geo".into(),
            procedures: vec!["sq".into(), "hyp".into()],
        }
    );
    assert_eq!(ns.modules[0].0, "geo");

    let err = session.dispatch("%iimport_enabled maybe", &mut ns).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::InvalidCommand { .. }));
}

#[test]
fn frames_span_cells_in_an_enabled_session() {
    let mut session = Session::new(&Settings::default()).unwrap();
    session.set_enabled(true);
    assert!(session.enabled());

    assert_eq!(session.run_cell("%def double(n) -> m"), "# %def double(n) -> m");
    assert_eq!(session.run_cell("m = n * 2"), "m = n * 2");
    let closing = session.run_cell("%end\nprint(m)");
    let lines: Vec<_> = closing.lines().collect();
    assert_eq!(lines[0], "# %end");
    assert_eq!(lines[1], "def double(n):");
    assert_eq!(lines.last(), Some(&"print(m)"));
}

#[test]
fn skip_block_state_carries_between_cells() {
    let mut session = Session::new(&Settings::default()).unwrap();
    session.run_cell("%/*");
    assert_eq!(session.run_cell("%def hidden() -> h"), "%def hidden() -> h");
    assert_eq!(session.run_cell("%*/"), "# %*/");
}

#[test]
fn aliases_are_normalized() {
    assert_eq!(default_alias("Data.Prep-Step,2"), "data_prep_step_2");
}
