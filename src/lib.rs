//! archdsl: a declarative builder engine for typed software architecture models.
//!
//! Nested closures declare a workspace and its elements; attribute calls
//! decorate whichever element is currently being built. Calls that are not
//! legal for the current element are recorded as diagnostics and the build
//! carries on, so a single run reports every defect.
//!
//! ```
//! use archdsl::eval::build;
//!
//! let design = build(|dsl| {
//!     dsl.workspace_described("Shop", "Online shop", |dsl| {
//!         dsl.version("1.0");
//!         dsl.enterprise("Acme");
//!         dsl.person("Customer", |dsl| {
//!             dsl.external();
//!         });
//!         dsl.software_system("Checkout", |dsl| {
//!             dsl.tag("critical", &["payments"]);
//!             dsl.url("https://example.com/checkout");
//!             dsl.properties(|dsl| dsl.prop("team", "red"));
//!         });
//!     });
//! })
//! .into_result()
//! .expect("valid design");
//!
//! assert_eq!(design.workspace().map(|ws| ws.name.as_str()), Some("Shop"));
//! assert_eq!(design.children(design.root()).len(), 2);
//! ```

pub mod config;
pub mod domain;
pub mod eval;
pub mod tree_traits;
pub mod util;

pub use config::Settings;
pub use domain::{DomainError, ElementKind, ErrorKind, Location, Node};
pub use eval::{build, build_with, BuildOutput, Design, DslArg, EvalError, Evaluator};
