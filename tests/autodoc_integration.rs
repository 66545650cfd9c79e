use autodoc::{
    call_args, Autodoc, AutodocConfig, CallArgs, FunctionMeta, MarkerPolicy, Object, SyncOutcome,
    Value,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHAPES: &str = r#"
def area(width: int, height: int) -> int:
    """Rectangle area."""
    result = width * height
    return result

def scale(points, factor=2, *, label=None):
    scaled = [p * factor for p in points]
    return scaled

def describe(mapping):
    print(mapping)
"#;

fn write_shapes(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("shapes.py");
    fs::write(&path, SHAPES).unwrap();
    path
}

fn autodoc_in(dir: &TempDir) -> Autodoc {
    Autodoc::new(AutodocConfig::default().with_output_dir(dir.path().join("typings")))
}

fn interface(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join("typings").join("shapes.pyi")).unwrap()
}

fn area(args: &CallArgs) -> i64 {
    let width = args.positional(0).and_then(Value::as_int).unwrap_or(0);
    let height = args
        .positional(1)
        .or_else(|| args.keyword("height"))
        .and_then(Value::as_int)
        .unwrap_or(0);
    (width * height) as i64
}

#[test]
fn test_introspected_function_is_documented() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    let meta = FunctionMeta::from_file(&source, "area").unwrap();
    let observed = autodoc_in(&dir).observe(meta, area);

    assert_eq!(observed.call(&call_args!(3, 4)), 12);

    let content = interface(&dir);
    assert!(content.contains("`shapes.py`"));
    assert!(content.contains("from typing import Any\n"));
    assert!(content.contains("def area(width: int, height: int) -> int:\n"));
    assert!(content.contains("    \"\"\"Rectangle area.\n\n    Args:\n"));
    assert!(content.contains("        result (int)\n"));
}

#[test]
fn test_repeated_calls_leave_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    let observed = autodoc_in(&dir).observe(FunctionMeta::from_file(&source, "area").unwrap(), area);

    observed.call(&call_args!(3, 4));
    let first = interface(&dir);
    for n in 0..5i64 {
        assert_eq!(observed.call(&call_args!(n, n + 1)), area(&call_args!(n, n + 1)));
    }
    let after = interface(&dir);

    assert_eq!(first.len(), after.len());
    assert_eq!(first, after);
}

#[test]
fn test_call_site_order_does_not_matter() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    let observed = autodoc_in(&dir).observe(FunctionMeta::from_file(&source, "area").unwrap(), area);

    let args = CallArgs::new().kwarg("height", 4).arg(3);
    assert_eq!(observed.call(&args), 12);

    let content = interface(&dir);
    assert!(content.contains("def area(width: int, height: int) -> int:\n"));
    let width_at = content.find(">>> width").unwrap();
    let height_at = content.find(">>> height").unwrap();
    assert!(width_at < height_at);
}

#[test]
fn test_container_shapes() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    let autodoc = autodoc_in(&dir);

    let scale = autodoc.observe(
        FunctionMeta::from_file(&source, "scale").unwrap(),
        |args: &CallArgs| -> Vec<i64> {
            let factor = args.keyword("factor").and_then(Value::as_int).unwrap_or(2);
            match args.positional(0) {
                Some(Value::List(items)) => items
                    .iter()
                    .filter_map(Value::as_int)
                    .map(|p| (p * factor) as i64)
                    .collect(),
                _ => Vec::new(),
            }
        },
    );
    assert_eq!(scale.call(&call_args!(vec![1, 2, 3]; factor = 3)), vec![3, 6, 9]);

    let describe = autodoc.observe(
        FunctionMeta::from_file(&source, "describe").unwrap(),
        |_: &CallArgs| (),
    );
    let mut mapping = std::collections::BTreeMap::new();
    mapping.insert("a", Value::Int(1));
    mapping.insert("b", Value::Str("x".to_string()));
    describe.call(&call_args!(mapping));

    let content = interface(&dir);
    assert!(content.contains("def scale(points: list[int], factor: int) -> list[int]:\n"));
    assert!(content.contains("        scaled (list[int])\n"));
    assert!(content.contains("def describe(mapping: dict[str, Any]) -> None:\n"));
    assert!(content.contains("        >>> mapping\n        {'a': 1, 'b': 'x'}\n"));
}

#[test]
fn test_failed_call_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    let observed = autodoc_in(&dir).observe(
        FunctionMeta::from_file(&source, "area").unwrap(),
        |_: &CallArgs| -> Result<i64, String> { Err("negative width".to_string()) },
    );

    assert_eq!(
        observed.try_call(&call_args!(-1, 4)),
        Err("negative width".to_string())
    );
    assert!(!dir.path().join("typings").join("shapes.pyi").exists());
}

#[test]
fn test_result_is_returned_even_when_store_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    fs::write(dir.path().join("typings"), "a file, not a directory").unwrap();

    let autodoc = autodoc_in(&dir);
    let meta = FunctionMeta::from_file(&source, "area").unwrap();
    assert_eq!(
        autodoc.document(&meta, &call_args!(3, 4), &Value::Int(12)),
        SyncOutcome::Failed
    );
    assert_eq!(autodoc.observe(meta, area).call(&call_args!(3, 4)), 12);
}

#[test]
fn test_foreign_classes_are_imported() {
    let dir = TempDir::new().unwrap();
    let autodoc = autodoc_in(&dir);
    let meta = FunctionMeta::builder("shift", Path::new("shapes.py"))
        .param("point")
        .local("moved")
        .build()
        .unwrap();
    let observed = autodoc.observe(meta, |_: &CallArgs| {
        Object::new("Point")
            .module("geometry")
            .repr("<geometry.Point object at 0x7f3a2c1d90>")
    });

    observed.call(&call_args!(Object::new("Point").module("geometry")));

    let content = interface(&dir);
    assert!(content.contains("from geometry import Point\n"));
    assert!(content.contains("def shift(point: Point) -> Point:\n"));
    assert!(content.contains("        <Point>\n"));
    assert!(!content.contains("0x7f3a2c1d90"));
}

#[test]
fn test_signature_marker_ignores_name_mentions() {
    let dir = TempDir::new().unwrap();
    let config = AutodocConfig::default()
        .with_output_dir(dir.path().join("typings"))
        .with_marker(MarkerPolicy::Signature);
    let autodoc = Autodoc::new(config);

    let first = FunctionMeta::builder("area_of", "shapes.py")
        .param("area")
        .build()
        .unwrap();
    let second = FunctionMeta::builder("area", "shapes.py")
        .param("side")
        .build()
        .unwrap();

    assert_eq!(
        autodoc.document(&first, &call_args!(2), &Value::Int(2)),
        SyncOutcome::Created
    );
    assert_eq!(
        autodoc.document(&second, &call_args!(2), &Value::Int(4)),
        SyncOutcome::Appended
    );
}

#[test]
fn test_varying_argument_classes_leave_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let autodoc = autodoc_in(&dir);
    let meta = FunctionMeta::builder("shift", "shapes.py")
        .param("item")
        .local("moved")
        .build()
        .unwrap();
    let observed = autodoc.observe(meta, |args: &CallArgs| args.positional(0).cloned());

    observed.call(&call_args!(Object::new("Point").module("geometry")));
    let before = interface(&dir);
    observed.call(&call_args!(Object::new("Vector").module("geometry")));
    observed.call(&call_args!(Object::new("Cell").module("shapes")));
    let after = interface(&dir);

    assert_eq!(before.len(), after.len());
    assert!(after.contains("from geometry import Point\n"));
    assert!(!after.contains("Vector"));
    assert!(!after.contains("class Cell:"));
}

#[test]
fn test_panicking_call_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_shapes(&dir);
    let observed = autodoc_in(&dir).observe(
        FunctionMeta::from_file(&source, "area").unwrap(),
        |_: &CallArgs| -> i64 { panic!("width must be positive") },
    );

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        observed.call(&call_args!(-1, 4))
    }));

    assert!(result.is_err());
    assert!(!dir.path().join("typings").join("shapes.pyi").exists());
}

#[test]
fn test_class_named_like_a_prefix_is_still_imported() {
    let dir = TempDir::new().unwrap();
    let autodoc = autodoc_in(&dir);
    let load = FunctionMeta::builder("load", "shapes.py").param("cloud").build().unwrap();
    let draw = FunctionMeta::builder("draw", "shapes.py").param("p").build().unwrap();

    autodoc.document(
        &load,
        &call_args!(Object::new("PointCloud").module("geometry")),
        &Value::None,
    );
    autodoc.document(
        &draw,
        &call_args!(Object::new("Point").module("geometry")),
        &Value::None,
    );

    let content = interface(&dir);
    assert!(content.contains("from geometry import PointCloud\n"));
    assert!(content.contains("from geometry import Point\n"));
    assert!(content.contains("def draw(p: Point) -> None:\n"));
}
