// tests/fixture_layout.rs
use std::fs;
use std::process::Command;
use std::rc::Rc;

use tessera::Fixture;
use tessera_layout::{Config, Direction, UNDEFINED};

fn layout(source: &str, width: f32, height: f32, direction: Direction) -> String {
    layout_with_config(source, Rc::new(Config::new()), width, height, direction)
}

fn layout_with_config(source: &str, config: Rc<Config>, width: f32, height: f32, direction: Direction) -> String {
    let mut fixture = Fixture::parse(source, config).unwrap();
    let root = fixture.root;
    fixture.tree.calculate_layout(root, width, height, direction).unwrap();
    fixture.render()
}

#[test]
fn test_baseline_fixture() {
    let source = "\
node width=150 flex-direction=row align-items=baseline
  node width=50 height=50
  node width=50 height=40 baseline=0.5
";
    insta::assert_snapshot!(layout(source, UNDEFINED, UNDEFINED, Direction::Ltr), @r"
    0 0 150 70
      0 0 50 50
      50 30 50 40
    ");
}

#[test]
fn test_grow_fixture() {
    let source = "\
node flex-direction=row width=300 height=100
  node flex-grow=1 flex-basis=0
  node flex-grow=1 flex-basis=0
";
    insta::assert_snapshot!(layout(source, UNDEFINED, UNDEFINED, Direction::Ltr), @r"
    0 0 300 100
      0 0 150 100
      150 0 150 100
    ");
}

#[test]
fn test_wrap_fixture() {
    let source = "\
node flex-direction=row flex-wrap=wrap width=100
  node width=40 height=20
  node width=40 height=20
  node width=40 height=20
";
    insta::assert_snapshot!(layout(source, UNDEFINED, UNDEFINED, Direction::Ltr), @r"
    0 0 100 40
      0 0 40 20
      40 0 40 20
      0 20 40 20
    ");
}

#[test]
fn test_absolute_fixture() {
    let source = "\
node width=200 height=200
  node position=absolute left=10 top=20 width=50 height=30
  node position=absolute right=10 bottom=10 width=50 height=30
";
    insta::assert_snapshot!(layout(source, UNDEFINED, UNDEFINED, Direction::Ltr), @r"
    0 0 200 200
      10 20 50 30
      140 160 50 30
    ");
}

#[test]
fn test_rtl_fixture() {
    let source = "\
node flex-direction=row width=300 height=100
  node width=50 height=50
  node width=50 height=50
";
    insta::assert_snapshot!(layout(source, UNDEFINED, UNDEFINED, Direction::Rtl), @r"
    0 0 300 100
      250 0 50 50
      200 0 50 50
    ");
}

#[test]
fn test_start_margin_follows_direction() {
    let source = "node width=100 height=100 margin-start=10%\n";
    assert_eq!(layout(source, 100.0, 100.0, Direction::Ltr), "10 0 100 100\n");
    assert_eq!(layout(source, 100.0, 100.0, Direction::Rtl), "0 0 100 100\n");
}

#[test]
fn test_text_rounding_fixture() {
    let config = Rc::new(Config::new());
    config.set_point_scale_factor(2.0).unwrap();
    let output = layout_with_config("node measure=10.2x10.2\n", config, UNDEFINED, UNDEFINED, Direction::Ltr);
    assert_eq!(output, "0 0 10.5 10.5\n");
}

#[test]
fn test_cli_prints_layout() {
    let path = std::env::temp_dir().join(format!("tessera-cli-{}.layout", std::process::id()));
    fs::write(&path, "node flex-direction=row\n  node flex-grow=1\n  node width=30\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tessera"))
        .arg(&path)
        .args(["--width", "100", "--height", "40"])
        .output()
        .unwrap();
    fs::remove_file(&path).unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0 0 100 40\n  0 0 70 40\n  70 0 30 40\n");
}

#[test]
fn test_cli_rejects_missing_fixture() {
    let output = Command::new(env!("CARGO_BIN_EXE_tessera"))
        .arg("does-not-exist.layout")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Fixture not found"));
}
