//! Tests for the published design: traversal, lookups and rendering

use archdsl::domain::{ElementKind, ErrorKind};
use archdsl::eval::{build, build_with, Design};
use archdsl::{EvalError, Settings};

fn shop() -> Design {
    build(|dsl| {
        dsl.workspace_described("Shop", "Online shop", |dsl| {
            dsl.version("2.1");
            dsl.enterprise("Acme");
            dsl.person("Customer", |dsl| dsl.external());
            dsl.software_system("Checkout", |dsl| {
                dsl.tag("critical", &[]);
                dsl.container("Api", |dsl| {
                    dsl.component("Cart", |_| {});
                    dsl.component("Payment", |_| {});
                });
                dsl.container("Db", |_| {});
            });
            dsl.deployment_node("Prod", |dsl| {
                dsl.container_instance("Api", |dsl| {
                    dsl.health_check("ping", |dsl| dsl.url("https://shop.example.com/health"));
                });
            });
        })
    })
    .into_result()
    .expect("valid design")
}

// ============================================================
// Traversal
// ============================================================

#[test]
fn given_design_when_iterating_then_preorder_follows_declaration_order() {
    // Arrange
    let design = shop();

    // Act
    let names: Vec<_> = design
        .iter()
        .map(|(_, slot)| slot.node.name().to_string())
        .collect();

    // Assert
    assert_eq!(
        names,
        vec!["Shop", "Customer", "Checkout", "Api", "Cart", "Payment", "Db", "Prod", "Api", "ping"]
    );
    assert_eq!(design.len(), 10);
}

#[test]
fn given_design_when_iterating_postorder_then_workspace_comes_last() {
    let design = shop();

    let kinds: Vec<_> = design.iter_postorder().map(|(_, slot)| slot.node.kind()).collect();

    assert_eq!(kinds.first(), Some(&ElementKind::Person));
    assert_eq!(kinds.last(), Some(&ElementKind::Workspace));
}

#[test]
fn given_design_when_collecting_leaves_then_returns_elements_without_children() {
    let design = shop();

    assert_eq!(
        design.leaf_names(),
        vec!["Customer", "Cart", "Payment", "Db", "ping"]
    );
    assert_eq!(design.depth(), 4);
}

// ============================================================
// Lookups
// ============================================================

#[test]
fn given_same_name_for_different_kinds_when_finding_then_kind_disambiguates() {
    let design = shop();

    let container = design.find(ElementKind::Container, "Api").unwrap();
    let instance = design.find(ElementKind::ContainerInstance, "Api").unwrap();

    assert_ne!(container, instance);
    let checkout = design.find(ElementKind::SoftwareSystem, "Checkout").unwrap();
    assert_eq!(design.parent(container), Some(checkout));
    assert_eq!(design.parent(design.root()), None);
    assert!(design.find(ElementKind::Person, "Checkout").is_none());
}

#[test]
fn given_workspace_when_reading_then_header_fields_are_set() {
    let design = shop();

    let workspace = design.workspace().unwrap();
    assert_eq!(workspace.name, "Shop");
    assert_eq!(workspace.description, "Online shop");
    assert_eq!(workspace.version.as_deref(), Some("2.1"));
    assert_eq!(workspace.enterprise.as_ref().map(|e| e.name.as_str()), Some("Acme"));
}

// ============================================================
// Rendering
// ============================================================

#[test]
fn given_design_when_displayed_then_renders_one_line_per_element() {
    let design = shop();

    let rendered = design.to_string();
    let lines: Vec<_> = rendered.lines().collect();

    assert_eq!(lines.len(), 10, "{rendered}");
    assert_eq!(lines[0], "workspace \"Shop\" v2.1 enterprise=\"Acme\"");
    assert!(lines[1].ends_with("person \"Customer\" [external]"), "{rendered}");
    assert!(lines[2].ends_with("software system \"Checkout\" tags=critical"), "{rendered}");
    assert!(
        lines[9].ends_with("health check \"ping\" url=https://shop.example.com/health"),
        "{rendered}"
    );
}

// ============================================================
// Build outcome
// ============================================================

#[test]
fn given_diagnostics_in_strict_mode_when_converting_then_build_error_carries_them() {
    // Act
    let err = build(|dsl| {
        dsl.workspace(|dsl| {
            dsl.tag("misplaced", &[]);
            dsl.url("nope nope");
        })
    })
    .into_result()
    .unwrap_err();

    // Assert
    let diagnostics = err.diagnostics().expect("build error");
    assert_eq!(diagnostics.len(), 2);
    assert!(matches!(err, EvalError::Build { count: 2, .. }));
    assert!(err.to_string().starts_with("build failed with 2 diagnostic(s)"));
}

#[test]
fn given_diagnostics_in_lenient_mode_when_converting_then_design_is_returned() {
    let settings = Settings {
        strict: false,
        ..Settings::default()
    };

    let output = build_with(settings, |dsl| {
        dsl.workspace_named("W", |dsl| dsl.external());
    });

    assert_eq!(output.diagnostics.count(ErrorKind::IncompatibleContext), 1);
    assert_eq!(output.into_result().unwrap().workspace().unwrap().name, "W");
}

#[test]
fn given_lenient_mode_without_workspace_when_converting_then_build_error() {
    let settings = Settings {
        strict: false,
        ..Settings::default()
    };

    let err = build_with(settings, |dsl| dsl.tag("orphan", &[]))
        .into_result()
        .unwrap_err();

    assert_eq!(err.diagnostics().map(|d| d.len()), Some(1));
}
